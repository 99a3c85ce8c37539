//! Minimal PDF 1.4 writer: one Helvetica font, one text content stream per page.

use std::fmt::Write as _;
use std::path::Path;

use crate::layout::{Page, PageLayout};
use crate::PdfError;

/// Escape a string for a PDF literal string and map it to WinAnsi.
///
/// The bullet becomes the WinAnsi code `\225`; any other non-ASCII character is
/// replaced with `?`.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '(' => out.push_str("\\("),
            ')' => out.push_str("\\)"),
            '\u{2022}' => out.push_str("\\225"),
            c if c.is_ascii() => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

fn content_stream(page: &Page, layout: &PageLayout) -> String {
    let mut stream = String::new();
    stream.push_str("BT\n");
    let _ = writeln!(stream, "/F1 {} Tf", layout.font_size);
    for line in page {
        let _ = writeln!(
            stream,
            "1 0 0 1 {:.2} {:.2} Tm ({}) Tj",
            line.x,
            line.y,
            escape_text(&line.text)
        );
    }
    stream.push_str("ET\n");
    stream
}

/// Build the object bodies, numbered from 1 in order.
///
/// Layout: font, then a (content, page) pair per page, then the page tree and
/// the catalog last.
pub fn build_objects(pages: &[Page], layout: &PageLayout) -> Vec<String> {
    let font_obj = 1;
    let page_count = pages.len();
    let pages_obj = 2 + 2 * page_count;
    let catalog_obj = pages_obj + 1;

    let mut objects = Vec::with_capacity(catalog_obj);
    objects.push("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string());

    let mut kids = Vec::with_capacity(page_count);
    for (i, page) in pages.iter().enumerate() {
        let content_obj = 2 + 2 * i;
        let page_obj = content_obj + 1;

        let stream = content_stream(page, layout);
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            stream.len(),
            stream
        ));
        objects.push(format!(
            "<< /Type /Page /Parent {pages_obj} 0 R /MediaBox [0 0 {} {}] \
             /Resources << /Font << /F1 {font_obj} 0 R >> >> /Contents {content_obj} 0 R >>",
            layout.page_width, layout.page_height
        ));
        kids.push(format!("{page_obj} 0 R"));
    }

    objects.push(format!(
        "<< /Type /Pages /Kids [{}] /Count {page_count} >>",
        kids.join(" ")
    ));
    objects.push(format!("<< /Type /Catalog /Pages {pages_obj} 0 R >>"));
    objects
}

/// Serialize objects with an xref table and trailer. The catalog must be the
/// last object.
pub fn serialize(objects: &[String]) -> Vec<u8> {
    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());

    for (idx, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        let _ = write!(out, "{} 0 obj\n{}\nendobj\n", idx + 1, body);
    }

    let xref_start = out.len();
    let _ = write!(out, "xref\n0 {}\n", objects.len() + 1);
    out.push_str("0000000000 65535 f \n");
    for offset in offsets {
        let _ = write!(out, "{offset:010} 00000 n \n");
    }
    let _ = write!(
        out,
        "trailer\n<< /Size {} /Root {} 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        objects.len(),
        xref_start
    );
    out.into_bytes()
}

/// Render laid-out pages to PDF bytes.
pub fn render(pages: &[Page], layout: &PageLayout) -> Vec<u8> {
    serialize(&build_objects(pages, layout))
}

/// Write PDF bytes to `path`, creating missing parent directories.
pub fn write_pdf(bytes: &[u8], path: &Path) -> Result<(), PdfError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| PdfError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, bytes).map_err(|source| PdfError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::PlacedLine;

    #[test]
    fn escapes_delimiters_and_bullets() {
        assert_eq!(escape_text(r"a\b (c)"), r"a\\b \(c\)");
        assert_eq!(escape_text("\u{2022} item"), r"\225 item");
        assert_eq!(escape_text("caf\u{e9}"), "caf?");
    }

    #[test]
    fn object_numbering() {
        let layout = PageLayout::default();
        let pages = vec![Vec::new(), Vec::new()];
        let objects = build_objects(&pages, &layout);
        assert_eq!(objects.len(), 7);
        assert!(objects[2].contains("/Parent 6 0 R"));
        assert!(objects[2].contains("/Contents 2 0 R"));
        assert!(objects[4].contains("/Contents 4 0 R"));
        assert_eq!(objects[5], "<< /Type /Pages /Kids [3 0 R 5 0 R] /Count 2 >>");
        assert_eq!(objects[6], "<< /Type /Catalog /Pages 6 0 R >>");
    }

    #[test]
    fn content_stream_positions_text() {
        let layout = PageLayout::default();
        let page = vec![PlacedLine {
            x: 72.0,
            y: 750.0,
            text: "Hi (there)".into(),
        }];
        let stream = content_stream(&page, &layout);
        assert_eq!(
            stream,
            "BT\n/F1 12 Tf\n1 0 0 1 72.00 750.00 Tm (Hi \\(there\\)) Tj\nET\n"
        );
    }

    #[test]
    fn stream_length_matches_payload() {
        let layout = PageLayout::default();
        let page = vec![PlacedLine {
            x: 72.0,
            y: 750.0,
            text: "x".into(),
        }];
        let objects = build_objects(&[page], &layout);
        let body = &objects[1];
        let start = body.find("stream\n").unwrap() + "stream\n".len();
        let end = body.rfind("\nendstream").unwrap();
        let declared: usize = body["<< /Length ".len()..body.find(" >>").unwrap()]
            .parse()
            .unwrap();
        assert_eq!(end - start, declared);
    }

    #[test]
    fn xref_offsets_point_at_objects() {
        let objects = vec!["<< /A 1 >>".to_string(), "<< /Type /Catalog >>".to_string()];
        let bytes = serialize(&objects);
        let text = String::from_utf8(bytes).unwrap();

        let xref = text.find("xref\n").unwrap();
        let entries: Vec<usize> = text[xref..]
            .lines()
            .skip(3)
            .take(2)
            .map(|l| l[..10].parse().unwrap())
            .collect();
        assert!(text[entries[0]..].starts_with("1 0 obj\n"));
        assert!(text[entries[1]..].starts_with("2 0 obj\n"));
        assert!(text.contains(&format!("startxref\n{xref}\n")));
        assert!(text.contains("/Size 3 /Root 2 0 R"));
        assert!(text.ends_with("%%EOF\n"));
    }
}
