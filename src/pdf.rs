//! Serialization of [`RenderedDocument`]s with `printpdf`.
//!
//! Text is set in the PDF base-14 Helvetica faces, so no font files are
//! needed at runtime. Coordinates are flipped from the document model's
//! top-left origin to the PDF bottom-left origin here and nowhere else.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::BufWriter;

use lopdf::{Object, StringFormat};
use printpdf::{
    BuiltinFont, Color, CustomPdfConformance, Image, IndirectFontRef, Line, Mm, OffsetDateTime,
    PdfConformance, PdfDocument, PdfLayerReference, Point, Rgb,
};

use crate::document::{Cell, ImageItem, Item, RenderedDocument};
use crate::error::PdfError;
use crate::layout::{FillColor, HorizontalAlignment};
use crate::logo::DEFAULT_IMAGE_DPI;
use crate::metrics::{text_width_mm, MM_PER_PT};

/// Horizontal gap between a cell border and left/right aligned text.
const CELL_PADDING_MM: f64 = 1.0;
/// Stroke width of cell borders, in points (0.2 mm).
const BORDER_THICKNESS_PT: f64 = 0.567;
/// Distance from the vertical middle of a line to its baseline, as a share of the font size.
const BASELINE_SHIFT: f64 = 0.3;
const LAYER_NAME: &str = "Layer 1";

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

fn pdf_error(err: impl std::fmt::Debug) -> PdfError {
    PdfError::new(format!("{:?}", err))
}

fn rgb(fill: FillColor) -> Color {
    let FillColor(r, g, b) = fill;
    Color::Rgb(Rgb::new(
        f64::from(r) / 255.0,
        f64::from(g) / 255.0,
        f64::from(b) / 255.0,
        None,
    ))
}

fn black() -> Color {
    Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None))
}

fn rectangle(x: f64, bottom: f64, width: f64, height: f64, fill: bool, stroke: bool) -> Line {
    let corners = [
        (x, bottom),
        (x + width, bottom),
        (x + width, bottom + height),
        (x, bottom + height),
    ];
    Line {
        points: corners
            .iter()
            .map(|&(px, py)| (Point::new(Mm(px), Mm(py)), false))
            .collect(),
        is_closed: true,
        has_fill: fill,
        has_stroke: stroke,
        is_clipping_path: false,
    }
}

fn text_x(cell: &Cell, line: &str) -> f64 {
    let width = text_width_mm(line, cell.font.size_pt, cell.font.is_bold());
    match cell.align {
        HorizontalAlignment::Left => cell.x + CELL_PADDING_MM,
        HorizontalAlignment::Center => cell.x + (cell.width - width) / 2.0,
        HorizontalAlignment::Right => cell.x + cell.width - CELL_PADDING_MM - width,
    }
}

fn draw_cell(layer: &PdfLayerReference, fonts: &Fonts, page_height: f64, cell: &Cell) {
    let bottom = page_height - cell.y - cell.height;

    if let Some(fill) = cell.fill {
        layer.set_fill_color(rgb(fill));
        layer.add_shape(rectangle(cell.x, bottom, cell.width, cell.height, true, false));
        layer.set_fill_color(black());
    }
    if cell.border {
        layer.add_shape(rectangle(cell.x, bottom, cell.width, cell.height, false, true));
    }

    let font = if cell.font.is_bold() {
        &fonts.bold
    } else {
        &fonts.regular
    };
    let shift = BASELINE_SHIFT * cell.font.size_pt * MM_PER_PT;
    let single = cell.lines.len() == 1;
    for (index, line) in cell.lines.iter().enumerate() {
        if line.is_empty() {
            continue;
        }
        let middle = if single {
            cell.height / 2.0
        } else {
            cell.line_height * (index as f64 + 0.5)
        };
        let baseline = page_height - (cell.y + middle + shift);
        layer.use_text(
            line.clone(),
            cell.font.size_pt,
            Mm(text_x(cell, line)),
            Mm(baseline),
            font,
        );
    }
}

fn draw_image(layer: &PdfLayerReference, page_height: f64, item: &ImageItem) {
    let (natural_width, natural_height) = item.logo.natural_size_mm();
    let image = Image::from_dynamic_image(&item.logo.to_dynamic_image());
    image.add_to_layer(
        layer.clone(),
        Some(Mm(item.x)),
        Some(Mm(page_height - item.y - item.height)),
        None,
        Some(item.width / natural_width),
        Some(item.height / natural_height),
        Some(DEFAULT_IMAGE_DPI),
    );
}

impl RenderedDocument {
    /// Serializes the document into PDF bytes.
    ///
    /// Equal documents produce equal bytes: the creation and modification
    /// dates are pinned to the Unix epoch and the trailer `/ID` is derived
    /// from the title and page count.
    pub fn to_pdf_bytes(&self) -> Result<Vec<u8>, PdfError> {
        let geometry = *self.geometry();
        let (doc, first_page, first_layer) = PdfDocument::new(
            self.title(),
            Mm(geometry.width_mm),
            Mm(geometry.height_mm),
            LAYER_NAME,
        );
        let doc = doc.with_conformance(PdfConformance::Custom(CustomPdfConformance {
            requires_icc_profile: false,
            requires_xmp_metadata: false,
            ..Default::default()
        }))
        .with_creation_date(OffsetDateTime::unix_epoch())
        .with_mod_date(OffsetDateTime::unix_epoch());

        let fonts = Fonts {
            regular: doc
                .add_builtin_font(BuiltinFont::Helvetica)
                .map_err(pdf_error)?,
            bold: doc
                .add_builtin_font(BuiltinFont::HelveticaBold)
                .map_err(pdf_error)?,
        };

        for (index, page) in self.pages().iter().enumerate() {
            let (page_index, layer_index) = if index == 0 {
                (first_page, first_layer)
            } else {
                doc.add_page(Mm(geometry.width_mm), Mm(geometry.height_mm), LAYER_NAME)
            };
            let layer = doc.get_page(page_index).get_layer(layer_index);
            layer.set_outline_thickness(BORDER_THICKNESS_PT);
            layer.set_outline_color(black());
            layer.set_fill_color(black());

            for item in page.items() {
                match item {
                    Item::Cell(cell) => draw_cell(&layer, &fonts, geometry.height_mm, cell),
                    Item::Image(image) => draw_image(&layer, geometry.height_mm, image),
                }
            }
        }

        let mut bytes = Vec::new();
        let mut writer = BufWriter::new(&mut bytes);
        doc.save(&mut writer).map_err(pdf_error)?;
        writer.into_inner().map_err(pdf_error)?;
        self.pin_document_id(&bytes)
    }

    /// Replaces the random trailer `/ID` written by `printpdf` with one that
    /// depends only on the document.
    fn pin_document_id(&self, bytes: &[u8]) -> Result<Vec<u8>, PdfError> {
        let mut hasher = DefaultHasher::new();
        self.title().hash(&mut hasher);
        self.pages().len().hash(&mut hasher);
        let id = format!("{:016X}", hasher.finish());

        let mut pdf = lopdf::Document::load_mem(bytes).map_err(pdf_error)?;
        pdf.trailer.set(
            "ID",
            Object::Array(vec![
                Object::String(id.clone().into_bytes(), StringFormat::Literal),
                Object::String(id.into_bytes(), StringFormat::Literal),
            ]),
        );

        let mut out = Vec::with_capacity(bytes.len());
        pdf.save_to(&mut out).map_err(pdf_error)?;
        Ok(out)
    }
}
