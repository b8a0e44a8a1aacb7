//! In-memory paginated documents and the cursor used to fill them.
//!
//! A [`RenderedDocument`] is a list of pages holding absolutely positioned
//! items, with coordinates in millimetres measured from the top-left page
//! corner. It carries everything needed to produce the PDF bytes later on, so
//! it can be compared, inspected in tests, or serialized with
//! [`RenderedDocument::to_pdf_bytes`].

use crate::layout::{FillColor, FontSpec, HorizontalAlignment, PageGeometry};
use crate::logo::LogoAsset;

/// A rectangular cell with optional border and fill and one or more text lines.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width of the box.
    pub width: f64,
    /// Height of the box.
    pub height: f64,
    /// Text lines, top to bottom.
    pub lines: Vec<String>,
    /// Height of one text line. A single line is centered in the box.
    pub line_height: f64,
    /// Font of the text.
    pub font: FontSpec,
    /// Horizontal alignment of the text.
    pub align: HorizontalAlignment,
    /// Whether the box outline is stroked.
    pub border: bool,
    /// Background fill, if any.
    pub fill: Option<FillColor>,
}

impl Cell {
    /// The cell's text with lines joined by `\n`.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// A placed image.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageItem {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Rendered width.
    pub width: f64,
    /// Rendered height.
    pub height: f64,
    /// Image data.
    pub logo: LogoAsset,
}

/// Anything drawn on a page.
#[derive(Clone, Debug, PartialEq)]
pub enum Item {
    /// A text cell.
    Cell(Cell),
    /// An image.
    Image(ImageItem),
}

/// One page of a rendered document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    items: Vec<Item>,
}

impl Page {
    /// Items in drawing order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Text cells in drawing order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.items.iter().filter_map(|item| match item {
            Item::Cell(cell) => Some(cell),
            Item::Image(_) => None,
        })
    }

    /// Images in drawing order.
    pub fn images(&self) -> impl Iterator<Item = &ImageItem> {
        self.items.iter().filter_map(|item| match item {
            Item::Image(image) => Some(image),
            Item::Cell(_) => None,
        })
    }
}

/// A finished document, ready to be serialized.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedDocument {
    title: String,
    geometry: PageGeometry,
    pages: Vec<Page>,
}

impl RenderedDocument {
    /// Document title, written to the PDF metadata.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Page size and margins shared by every page.
    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Pages in order.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Every text cell of every page, in drawing order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.pages.iter().flat_map(Page::cells)
    }
}

type HeaderFactory = dyn Fn(usize) -> Vec<Item>;

/// Builder for [`PageWriter`]s sharing a page geometry and header.
pub struct DocumentBuilder {
    geometry: PageGeometry,
    title: String,
    header_height: f64,
    header: Option<Box<HeaderFactory>>,
}

impl DocumentBuilder {
    /// Creates a builder for pages of `geometry`.
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            title: String::new(),
            header_height: 0.0,
            header: None,
        }
    }

    /// Sets the document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Reserves `height` millimetres below the top margin on every page and
    /// fills it with the items returned by `header` for the (1-based) page number.
    pub fn with_header<F>(mut self, height: f64, header: F) -> Self
    where
        F: Fn(usize) -> Vec<Item> + 'static,
    {
        self.header_height = height;
        self.header = Some(Box::new(header));
        self
    }

    /// Opens the first page and returns the writer.
    pub fn build(self) -> PageWriter {
        let mut writer = PageWriter {
            builder: self,
            pages: Vec::new(),
            cursor_y: 0.0,
            body_items: 0,
        };
        writer.start_page();
        writer
    }
}

/// Vertical cursor over a growing list of pages.
pub struct PageWriter {
    builder: DocumentBuilder,
    pages: Vec<Page>,
    cursor_y: f64,
    body_items: usize,
}

impl PageWriter {
    fn body_top(&self) -> f64 {
        self.builder.geometry.margins.top + self.builder.header_height
    }

    fn body_bottom(&self) -> f64 {
        self.builder.geometry.height_mm - self.builder.geometry.margins.bottom
    }

    fn start_page(&mut self) {
        let mut page = Page::default();
        if let Some(header) = &self.builder.header {
            page.items = header(self.pages.len() + 1);
        }
        self.pages.push(page);
        self.cursor_y = self.body_top();
        self.body_items = 0;
    }

    /// Page geometry of the document being written.
    pub fn geometry(&self) -> &PageGeometry {
        &self.builder.geometry
    }

    /// Current vertical position.
    pub fn cursor_y(&self) -> f64 {
        self.cursor_y
    }

    /// Starts a new page unless a block of `height` still fits on this one.
    ///
    /// A block taller than an empty page is drawn anyway and overflows.
    pub fn ensure_space(&mut self, height: f64) {
        if self.body_items > 0 && self.cursor_y + height > self.body_bottom() {
            self.start_page();
        }
    }

    /// Moves the cursor down by `height`.
    pub fn advance(&mut self, height: f64) {
        self.cursor_y += height;
    }

    /// Adds an item to the current page.
    pub fn push(&mut self, item: Item) {
        self.body_items += 1;
        if let Some(page) = self.pages.last_mut() {
            page.items.push(item);
        }
    }

    /// Closes the writer and returns the document.
    pub fn finish(self) -> RenderedDocument {
        RenderedDocument {
            title: self.builder.title,
            geometry: self.builder.geometry,
            pages: self.pages,
        }
    }
}
