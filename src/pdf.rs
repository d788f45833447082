//! Page sinks: the paginated output the document writer draws into.
//!
//! Layout (what goes where, when to break pages) lives in the writer; a sink
//! only turns positioned rows into pages. [`PdfSink`] is the real one.

use crate::error::{Error, Result};
use crate::font::FontAsset;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerIndex,
    PdfLayerReference, PdfPageIndex, Rect, Rgb,
};
use std::io::Cursor;

/// A4 landscape, 10 mm margins. All lengths in millimetres, measured from
/// the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            width: 297.0,
            height: 210.0,
            margin: 10.0,
        }
    }
}

impl PageGeometry {
    /// Lowest y a row may reach before the page is full.
    pub fn content_bottom(&self) -> f32 {
        self.height - self.margin
    }
}

/// What a row is, which decides how a sink styles it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Title,
    Heading,
    FileHeader,
    Code,
    Continuation,
    Notice,
    Tree,
    Summary,
    Blank,
}

/// A single line of output placed on the current page.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    pub kind: RowKind,
    pub text: &'a str,
    /// Distance of the row's top edge from the top of the page.
    pub top: f32,
    pub height: f32,
}

/// Receiver for the writer's draw commands.
pub trait PageSink {
    /// Starts a new page; subsequent rows land on it.
    fn begin_page(&mut self) -> Result<()>;

    fn draw_row(&mut self, row: &Row<'_>) -> Result<()>;

    /// Serializes the finished document.
    fn render(self) -> Result<Vec<u8>>
    where
        Self: Sized;
}

const BODY_SIZE: f32 = 8.0;
const TITLE_SIZE: f32 = 14.0;
const PT_TO_MM: f32 = 0.352_778;
/// Advance width of a monospaced glyph, as a fraction of the font size.
const MONO_ADVANCE: f32 = 0.6;
const TEXT_PADDING: f32 = 1.0;

/// Renders rows into a PDF with `printpdf`.
pub struct PdfSink {
    doc: PdfDocumentReference,
    font: IndirectFontRef,
    geometry: PageGeometry,
    /// The page `PdfDocument::new` creates up front, until it is claimed.
    initial_page: Option<(PdfPageIndex, PdfLayerIndex)>,
    layer: Option<PdfLayerReference>,
}

impl PdfSink {
    pub fn new(title: &str, font: &FontAsset, geometry: PageGeometry) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(
            title,
            Mm(geometry.width),
            Mm(geometry.height),
            "content",
        );

        let font = match font {
            FontAsset::TrueType(bytes) => doc.add_external_font(Cursor::new(bytes.as_slice())),
            FontAsset::Builtin => doc.add_builtin_font(BuiltinFont::Courier),
        }
        .map_err(|e| Error::FontUnavailable {
            origin: "font data".to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            doc,
            font,
            geometry,
            initial_page: Some((page, layer)),
            layer: None,
        })
    }

    fn layer(&mut self) -> Result<&PdfLayerReference> {
        if self.layer.is_none() {
            self.begin_page()?;
        }
        self.layer
            .as_ref()
            .ok_or_else(|| Error::Render("no active page".to_string()))
    }
}

fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb(Rgb::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        None,
    ))
}

/// Background and text colours per row kind.
fn palette(kind: RowKind) -> (Option<Color>, Color) {
    match kind {
        RowKind::FileHeader => (Some(rgb(70, 130, 180)), rgb(255, 255, 255)),
        RowKind::Code => (Some(rgb(245, 245, 245)), rgb(0, 0, 0)),
        RowKind::Continuation => (Some(rgb(240, 240, 250)), rgb(0, 0, 0)),
        RowKind::Notice => (None, rgb(160, 20, 20)),
        RowKind::Tree => (None, rgb(40, 40, 40)),
        RowKind::Title | RowKind::Heading | RowKind::Summary | RowKind::Blank => {
            (None, rgb(0, 0, 0))
        }
    }
}

impl PageSink for PdfSink {
    fn begin_page(&mut self) -> Result<()> {
        let (page, layer) = match self.initial_page.take() {
            Some(initial) => initial,
            None => self.doc.add_page(
                Mm(self.geometry.width),
                Mm(self.geometry.height),
                "content",
            ),
        };
        self.layer = Some(self.doc.get_page(page).get_layer(layer));
        Ok(())
    }

    fn draw_row(&mut self, row: &Row<'_>) -> Result<()> {
        let geometry = self.geometry;
        let font = self.font.clone();
        let layer = self.layer()?;

        let bottom = geometry.height - row.top - row.height;
        let (background, foreground) = palette(row.kind);

        if let Some(fill) = background {
            layer.set_fill_color(fill);
            layer.add_rect(Rect::new(
                Mm(geometry.margin),
                Mm(bottom),
                Mm(geometry.width - geometry.margin),
                Mm(bottom + row.height),
            ));
        }

        if row.text.is_empty() {
            return Ok(());
        }

        let size = match row.kind {
            RowKind::Title => TITLE_SIZE,
            _ => BODY_SIZE,
        };
        let x = match row.kind {
            RowKind::Title => {
                let text_width = row.text.chars().count() as f32 * size * MONO_ADVANCE * PT_TO_MM;
                ((geometry.width - text_width) / 2.0).max(geometry.margin)
            }
            _ => geometry.margin + TEXT_PADDING,
        };
        // Centre the cap height inside the row.
        let baseline = bottom + (row.height - size * 0.7 * PT_TO_MM) / 2.0;

        layer.set_fill_color(foreground);
        layer.use_text(row.text, size, Mm(x), Mm(baseline), &font);
        Ok(())
    }

    fn render(self) -> Result<Vec<u8>> {
        self.doc
            .save_to_bytes()
            .map_err(|e| Error::Render(e.to_string()))
    }
}
