use crate::cli::Config;
use crate::error::{Error, Result};
use crate::filewalker::FileEntry;
use crate::pdf::{PageGeometry, PageSink, Row, RowKind};
use crate::tree::render_tree;
use crate::wrap::wrap;
use chrono::Utc;
use content_inspector::{ContentType, inspect};
use log::{debug, info, warn};
use memmap2::MmapOptions;
use std::fs::File as StdFile;
use std::path::Path;

/// Files longer than this many characters are cut down to [`TRUNCATE_KEEP`].
pub const TRUNCATE_THRESHOLD: usize = 100_000;
pub const TRUNCATE_KEEP: usize = 50_000;
pub const TRUNCATION_MARKER: &str = "... [File truncated due to size] ...";

/// Bytes decoded per file: enough to hold more than [`TRUNCATE_THRESHOLD`]
/// characters of any UTF-8 text.
const DECODE_LIMIT: usize = TRUNCATE_THRESHOLD * 4 + 4;

const TAB: &str = "    ";

/// Row heights and spacing, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub title_height: f32,
    pub header_height: f32,
    pub header_gap: f32,
    pub line_height: f32,
    pub file_spacing: f32,
    pub summary_height: f32,
    /// A file block never starts closer than this to the bottom edge.
    pub lookahead: f32,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            title_height: 10.0,
            header_height: 7.0,
            header_gap: 1.0,
            line_height: 4.0,
            file_spacing: 5.0,
            summary_height: 5.0,
            lookahead: 40.0,
        }
    }
}

/// Result of writing one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Written,
    Skipped { reason: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblySummary {
    pub processed: usize,
    pub skipped: usize,
    pub total: usize,
}

/// Pagination cursor for one run.
#[derive(Debug, Clone, Copy, Default)]
struct DocumentState {
    /// Top of the next row, measured from the top of the page.
    cursor: f32,
    /// Pages begun so far; zero until the first row is placed.
    pages: usize,
    /// The next file block must open a fresh page.
    needs_break: bool,
}

/// Lays files out row by row and hands the rows to a [`PageSink`].
pub struct DocumentWriter<S: PageSink> {
    sink: S,
    geometry: PageGeometry,
    layout: Layout,
    max_line_width: usize,
    state: DocumentState,
}

impl<S: PageSink> DocumentWriter<S> {
    pub fn new(sink: S, geometry: PageGeometry, max_line_width: usize) -> Result<Self> {
        if max_line_width == 0 {
            return Err(Error::InvalidConfiguration(
                "line width must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            sink,
            geometry,
            layout: Layout::default(),
            max_line_width,
            state: DocumentState::default(),
        })
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Writes the whole document for `entries` and saves it to
    /// `config.output_path`.
    ///
    /// Unreadable files are counted as skipped; only sink and output
    /// failures end the run.
    pub async fn assemble(
        mut self,
        config: &Config,
        entries: &[FileEntry],
    ) -> Result<AssemblySummary> {
        self.write_title(&config.title)?;

        if config.include_tree {
            match render_tree(&config.source_directory) {
                Ok(tree) => self.write_tree(&tree)?,
                Err(err) => warn!("Could not render folder tree: {err:#}"),
            }
        }

        let mut summary = AssemblySummary {
            total: entries.len(),
            ..Default::default()
        };

        for (i, entry) in entries.iter().enumerate() {
            info!(
                "Processing {}/{}: {}",
                i + 1,
                entries.len(),
                entry.relative_path.display()
            );
            match self.write_entry(entry)? {
                FileOutcome::Written => summary.processed += 1,
                FileOutcome::Skipped { reason } => {
                    warn!(
                        "Skipping {}: {reason}",
                        entry.relative_path.display()
                    );
                    summary.skipped += 1;
                }
            }
        }

        self.write_summary(&summary, &config.source_directory)?;
        self.finish(&config.output_path).await?;
        Ok(summary)
    }

    pub fn write_title(&mut self, title: &str) -> Result<()> {
        self.emit(RowKind::Title, title, self.layout.title_height)
    }

    /// Puts the folder tree on pages of its own.
    pub fn write_tree(&mut self, tree: &str) -> Result<()> {
        self.new_page()?;
        self.emit(RowKind::Heading, "Folder structure", self.layout.header_height)?;
        for line in split_lines(tree) {
            for row in wrap(line, self.max_line_width)? {
                self.emit(RowKind::Tree, &row, self.layout.line_height)?;
            }
        }
        self.state.needs_break = true;
        Ok(())
    }

    /// Writes one file block: header, wrapped content, spacer.
    ///
    /// Read failures come back as [`FileOutcome::Skipped`] with nothing drawn.
    pub fn write_entry(&mut self, entry: &FileEntry) -> Result<FileOutcome> {
        let content = match read_source(&entry.absolute_path) {
            Ok(Some(content)) => content,
            Ok(None) => {
                return Ok(FileOutcome::Skipped {
                    reason: "binary content".to_string(),
                });
            }
            Err(err) => {
                return Ok(FileOutcome::Skipped {
                    reason: err.to_string(),
                });
            }
        };

        if self.state.needs_break
            || (self.state.pages > 0
                && self.state.cursor > self.geometry.height - self.layout.lookahead)
        {
            self.new_page()?;
        }

        let header = format!("File: {}", entry.relative_path.display());
        self.emit(RowKind::FileHeader, &header, self.layout.header_height)?;
        self.state.cursor += self.layout.header_gap;

        let (body, truncated) = truncate(&content);
        for line in split_lines(body) {
            self.write_line(line)?;
        }
        if truncated {
            debug!(
                "Truncated {} after {TRUNCATE_KEEP} characters",
                entry.relative_path.display()
            );
            self.emit(RowKind::Blank, "", self.layout.line_height)?;
            self.emit(RowKind::Notice, TRUNCATION_MARKER, self.layout.line_height)?;
        }

        self.state.cursor += self.layout.file_spacing;
        Ok(FileOutcome::Written)
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        let line = line.replace('\t', TAB);
        if line.trim().is_empty() {
            return self.emit(RowKind::Blank, "", self.layout.line_height);
        }
        if line.chars().count() <= self.max_line_width {
            return self.emit(RowKind::Code, &line, self.layout.line_height);
        }
        for (i, row) in wrap(&line, self.max_line_width)?.iter().enumerate() {
            let kind = if i == 0 {
                RowKind::Code
            } else {
                RowKind::Continuation
            };
            self.emit(kind, row, self.layout.line_height)?;
        }
        Ok(())
    }

    pub fn write_summary(&mut self, summary: &AssemblySummary, source: &Path) -> Result<()> {
        self.new_page()?;
        let lines = [
            format!(
                "Processed {} of {} files from {}",
                summary.processed,
                summary.total,
                source.display()
            ),
            format!("Skipped {} files", summary.skipped),
            format!(
                "Generated by src2pdf on {}",
                Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
            ),
        ];
        for line in &lines {
            self.emit(RowKind::Summary, line, self.layout.summary_height)?;
        }
        Ok(())
    }

    /// Renders the document and writes it to `output` in one go.
    pub async fn finish(self, output: &Path) -> Result<()> {
        let bytes = self.sink.render()?;
        tokio::fs::write(output, bytes)
            .await
            .map_err(|source| Error::OutputWrite {
                path: output.to_path_buf(),
                source,
            })?;
        info!("PDF saved to {}", output.display());
        Ok(())
    }

    fn new_page(&mut self) -> Result<()> {
        self.sink.begin_page()?;
        self.state.pages += 1;
        self.state.needs_break = false;
        self.state.cursor = self.geometry.margin;
        Ok(())
    }

    /// Places a row at the cursor, breaking the page first if it would overflow.
    fn emit(&mut self, kind: RowKind, text: &str, height: f32) -> Result<()> {
        if self.state.pages == 0 || self.state.cursor + height > self.geometry.content_bottom() {
            self.new_page()?;
        }
        self.sink.draw_row(&Row {
            kind,
            text,
            top: self.state.cursor,
            height,
        })?;
        self.state.cursor += height;
        Ok(())
    }
}

/// Cuts over-long content down to its first [`TRUNCATE_KEEP`] characters.
fn truncate(content: &str) -> (&str, bool) {
    if content.chars().count() <= TRUNCATE_THRESHOLD {
        return (content, false);
    }
    let end = content
        .char_indices()
        .nth(TRUNCATE_KEEP)
        .map(|(idx, _)| idx)
        .unwrap_or(content.len());
    (&content[..end], true)
}

/// Reads a file as text, replacing invalid UTF-8. `None` means binary.
fn read_source(path: &Path) -> Result<Option<String>> {
    let read_err = |source| Error::FileRead {
        path: path.to_path_buf(),
        source,
    };

    let file = StdFile::open(path).map_err(read_err)?;
    if file.metadata().map_err(read_err)?.len() == 0 {
        return Ok(Some(String::new()));
    }

    // SAFETY: read-only map, dropped before this function returns.
    let mmap = unsafe { MmapOptions::new().map(&file) }.map_err(read_err)?;

    let sample_size = std::cmp::min(8192, mmap.len());
    if inspect(&mmap[..sample_size]) == ContentType::BINARY {
        return Ok(None);
    }

    // Anything past this many bytes is over the threshold and gets cut anyway.
    let end = std::cmp::min(DECODE_LIMIT, mmap.len());
    Ok(Some(String::from_utf8_lossy(&mmap[..end]).into_owned()))
}

/// Splits on every line boundary Unicode text uses, `\r\n` counting once.
/// A trailing terminator does not produce an extra empty line.
fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if !is_line_break(ch) {
            continue;
        }
        lines.push(&text[start..idx]);
        start = idx + ch.len_utf8();
        if ch == '\r' {
            if let Some(&(next, '\n')) = chars.peek() {
                chars.next();
                start = next + 1;
            }
        }
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

fn is_line_break(ch: char) -> bool {
    matches!(
        ch,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}
