//! Render a small markdown-ish text file to a paginated PDF.

use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod layout;
pub mod pdf;

pub use layout::{normalize_lines, paginate, wrap, Page, PageLayout, PlacedLine};
pub use pdf::{escape_text, render, write_pdf};

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Lay out `source` and return the PDF bytes.
pub fn render_document(source: &str, layout: &PageLayout) -> Vec<u8> {
    let lines = normalize_lines(source, layout.wrap_width);
    let pages = paginate(&lines, layout);
    log::debug!("{} lines over {} page(s)", lines.len(), pages.len());
    render(&pages, layout)
}

/// Read `input`, render it, and write the PDF to `output`. Returns the number
/// of bytes written.
pub fn convert_file(input: &Path, output: &Path, layout: &PageLayout) -> Result<usize, PdfError> {
    let source = std::fs::read_to_string(input).map_err(|source| PdfError::Read {
        path: input.to_path_buf(),
        source,
    })?;
    let bytes = render_document(&source, layout);
    write_pdf(&bytes, output)?;
    log::info!("Rendered {} to {}", input.display(), output.display());
    Ok(bytes.len())
}
