use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use simple_logger::SimpleLogger;
use text_pdf::{convert_file, PageLayout};

#[derive(Parser)]
#[command(name = "text-pdf")]
#[command(about = "Render a markdown-ish text file to PDF")]
struct Cli {
    /// Source text file
    #[arg(default_value = "docs/tech-stack.md")]
    input: PathBuf,

    /// Output PDF path
    #[arg(short, long, default_value = "docs/tech-stack.pdf")]
    output: PathBuf,

    /// Log level: off, error, warn, info, debug, trace
    #[arg(long, default_value = "warn")]
    log_level: LevelFilter,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    SimpleLogger::new().with_level(cli.log_level).init()?;

    let written = convert_file(&cli.input, &cli.output, &PageLayout::default())
        .with_context(|| format!("converting {}", cli.input.display()))?;
    println!("Wrote {} ({written} bytes)", cli.output.display());
    Ok(())
}
