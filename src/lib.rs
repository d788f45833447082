//! # src2pdf Library
//!
//! Walks a project directory, picks source files by extension and lays them
//! out in one landscape PDF: a title, an optional folder tree page, one block
//! per file with long lines wrapped, and a closing summary page.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use src2pdf::{Config, run_src2pdf};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut config = Config::new(std::env::current_dir()?);
//!     config.output_path = "code_collection.pdf".into();
//!     config.include_tree = true;
//!
//!     let summary = run_src2pdf(config).await?;
//!     println!("{} files written", summary.processed);
//!     Ok(())
//! }
//! ```
//!
//! Any [`PageSink`] can stand in for the PDF backend through
//! [`convert_directory`].

pub mod cli;
pub mod error;
pub mod filewalker;
pub mod font;
pub mod pdf;
pub mod tree;
pub mod utils;
pub mod wrap;
pub mod writer;

pub use cli::Config;
pub use error::Error;
pub use filewalker::{FileEntry, collect_files};
pub use font::{FontAsset, FontSource};
pub use pdf::{PageGeometry, PageSink, PdfSink, Row, RowKind};
pub use tree::render_tree;
pub use wrap::wrap;
pub use writer::{AssemblySummary, DocumentWriter, FileOutcome};

use log::info;

/// Generate a PDF from the source files under `config.source_directory`.
pub async fn run_src2pdf(config: Config) -> anyhow::Result<AssemblySummary> {
    config.validate()?;

    let font = config.font.load().await?;
    let sink = PdfSink::new(&config.title, &font, PageGeometry::default())?;

    convert_directory(&config, sink).await
}

/// Collects files and writes them through `sink`.
pub async fn convert_directory<S: PageSink>(
    config: &Config,
    sink: S,
) -> anyhow::Result<AssemblySummary> {
    config.validate()?;

    let user_excluded = config.exclusions.len();
    let entries = collect_files(
        &config.source_directory,
        &config.extensions,
        &config.effective_exclusions(),
    )?;
    info!(
        "Found {} files to process ({} paths excluded)",
        entries.len(),
        user_excluded
    );

    let writer = DocumentWriter::new(sink, PageGeometry::default(), config.max_line_width)?;
    let summary = writer.assemble(config, &entries).await?;

    info!(
        "Successfully processed {} of {} files",
        summary.processed, summary.total
    );
    Ok(summary)
}
