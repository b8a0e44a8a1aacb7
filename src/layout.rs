//! Static description of the documents produced for each record.
//!
//! A [`LayoutSpec`] is plain configuration: page geometry, a header region
//! reserved for the logo, and an ordered list of [`Section`]s whose cells are
//! bound to record fields through [`Binding`]s. Layouts never look at data;
//! the renderer in [`crate::render`] walks them once per record.

use log::warn;

use crate::error::{ConfigurationWarning, LayoutError};
use crate::format::FieldFormat;

/// Horizontal alignment of text inside its cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HorizontalAlignment {
    /// Left aligned content.
    #[default]
    Left,
    /// Center aligned content.
    Center,
    /// Right aligned content.
    Right,
}

/// Weight of the built-in Helvetica face.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FontWeight {
    /// Regular weight.
    #[default]
    Regular,
    /// Bold weight.
    Bold,
}

/// Font used for a run of cells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontSpec {
    /// Face weight.
    pub weight: FontWeight,
    /// Size in points.
    pub size_pt: f64,
}

impl FontSpec {
    /// Regular weight at `size_pt`.
    pub const fn regular(size_pt: f64) -> Self {
        Self {
            weight: FontWeight::Regular,
            size_pt,
        }
    }

    /// Bold weight at `size_pt`.
    pub const fn bold(size_pt: f64) -> Self {
        Self {
            weight: FontWeight::Bold,
            size_pt,
        }
    }

    /// Returns true for the bold face.
    pub fn is_bold(&self) -> bool {
        self.weight == FontWeight::Bold
    }
}

/// Solid fill colour for cell backgrounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FillColor(pub u8, pub u8, pub u8);

/// Light grey used behind table headers.
pub const HEADER_FILL: FillColor = FillColor(230, 230, 230);

/// Where a section starts horizontally.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Anchor {
    /// Flush with the left margin.
    #[default]
    LeftMargin,
    /// Centered on the page.
    Centered,
    /// At an absolute distance from the left page edge, in millimetres.
    Offset(f64),
}

/// Page margins in millimetres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Margins {
    /// Top margin; the header region starts here.
    pub top: f64,
    /// Right margin.
    pub right: f64,
    /// Bottom margin.
    pub bottom: f64,
    /// Left margin.
    pub left: f64,
}

impl Margins {
    /// The same margin on every side.
    pub const fn all(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

/// Physical page size and margins.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageGeometry {
    /// Page width in millimetres.
    pub width_mm: f64,
    /// Page height in millimetres.
    pub height_mm: f64,
    /// Page margins.
    pub margins: Margins,
}

impl PageGeometry {
    /// A4 in portrait orientation.
    pub const fn a4_portrait(margins: Margins) -> Self {
        Self {
            width_mm: 210.0,
            height_mm: 297.0,
            margins,
        }
    }

    /// A4 in landscape orientation.
    pub const fn a4_landscape(margins: Margins) -> Self {
        Self {
            width_mm: 297.0,
            height_mm: 210.0,
            margins,
        }
    }

    /// Width available between the left and right margins.
    pub fn content_width(&self) -> f64 {
        self.width_mm - self.margins.left - self.margins.right
    }

    /// Resolves the x coordinate at which a block of `width` starts.
    pub fn start_x(&self, anchor: Anchor, width: f64) -> f64 {
        match anchor {
            Anchor::LeftMargin => self.margins.left,
            Anchor::Centered => (self.width_mm - width) / 2.0,
            Anchor::Offset(x) => x,
        }
    }
}

/// Fixed placement of the logo inside the header region.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LogoPlacement {
    /// Distance from the left page edge.
    pub x_mm: f64,
    /// Distance from the top page edge.
    pub y_mm: f64,
    /// Rendered width; the height follows the image's aspect ratio.
    pub width_mm: f64,
}

/// Region at the top of every page reserved for the logo.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeaderRegion {
    /// Height of the region below the top margin.
    pub height_mm: f64,
    /// Where the logo goes, if one is supplied.
    pub logo: LogoPlacement,
}

/// Source of the text printed in one cell.
#[derive(Clone, Debug, PartialEq)]
pub enum Binding {
    /// An empty cell.
    Blank,
    /// Fixed text.
    Literal(String),
    /// A record field, converted with `format`.
    Field {
        /// Column name in the input table.
        name: String,
        /// Conversion applied to the raw value.
        format: FieldFormat,
    },
    /// Several fields joined by single spaces, skipping blank ones.
    Joined(Vec<String>),
    /// `prefix` followed by the inner binding; empty when the inner text is empty.
    Prefixed(String, Box<Binding>),
    /// Stacked lines; blank lines are dropped.
    Lines(Vec<Binding>),
}

impl Binding {
    /// Fixed text.
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal(text.into())
    }

    /// Plain text field.
    pub fn text(name: impl Into<String>) -> Self {
        Self::with_format(name, FieldFormat::Text)
    }

    /// Currency field.
    pub fn money(name: impl Into<String>) -> Self {
        Self::with_format(name, FieldFormat::Money)
    }

    /// Date field without fallback.
    pub fn date(name: impl Into<String>) -> Self {
        Self::with_format(name, FieldFormat::date())
    }

    /// Field with an explicit format.
    pub fn with_format(name: impl Into<String>, format: FieldFormat) -> Self {
        Self::Field {
            name: name.into(),
            format,
        }
    }

    /// Space-joined derived field.
    pub fn joined<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Joined(names.into_iter().map(Into::into).collect())
    }

    /// Prefixed binding.
    pub fn prefixed(prefix: impl Into<String>, inner: Binding) -> Self {
        Self::Prefixed(prefix.into(), Box::new(inner))
    }
}

/// Free-standing lines of text spanning the content width.
#[derive(Clone, Debug, PartialEq)]
pub struct TextBlock {
    /// Lines, top to bottom. Blank lines keep their height.
    pub lines: Vec<Binding>,
    /// Font for every line.
    pub font: FontSpec,
    /// Alignment inside the content width.
    pub align: HorizontalAlignment,
    /// Height of each line in millimetres.
    pub line_height: f64,
}

impl TextBlock {
    /// A block of `lines` in `font`.
    pub fn new(lines: Vec<Binding>, font: FontSpec) -> Self {
        Self {
            lines,
            font,
            align: HorizontalAlignment::Left,
            line_height: 6.0,
        }
    }

    /// Sets the alignment and returns the updated block.
    pub fn with_alignment(mut self, align: HorizontalAlignment) -> Self {
        self.align = align;
        self
    }

    /// Sets the line height and returns the updated block.
    pub fn with_line_height(mut self, line_height: f64) -> Self {
        self.line_height = line_height;
        self
    }
}

/// Two columns of `label: value` rows.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelValueBlock {
    /// Rows, top to bottom.
    pub rows: Vec<(String, Binding)>,
    /// Width of the label column.
    pub label_width: f64,
    /// Width of the value column.
    pub value_width: f64,
    /// Font of the labels.
    pub label_font: FontSpec,
    /// Font of the values.
    pub value_font: FontSpec,
    /// Height of each row.
    pub row_height: f64,
    /// Horizontal start of the block.
    pub anchor: Anchor,
    /// Whether each cell gets a border.
    pub border: bool,
}

impl LabelValueBlock {
    /// A block with the given column widths and no rows.
    pub fn new(label_width: f64, value_width: f64) -> Self {
        Self {
            rows: Vec::new(),
            label_width,
            value_width,
            label_font: FontSpec::bold(10.0),
            value_font: FontSpec::regular(10.0),
            row_height: 6.0,
            anchor: Anchor::LeftMargin,
            border: false,
        }
    }

    /// Appends a row and returns the updated block.
    pub fn with_row(mut self, label: impl Into<String>, value: Binding) -> Self {
        self.rows.push((label.into(), value));
        self
    }

    /// Sets the anchor and returns the updated block.
    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    /// Enables cell borders and returns the updated block.
    pub fn with_border(mut self, border: bool) -> Self {
        self.border = border;
        self
    }

    fn total_width(&self) -> f64 {
        self.label_width + self.value_width
    }
}

/// One column of a [`TableSection`].
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    /// Header text.
    pub header: String,
    /// Width in millimetres.
    pub width: f64,
    /// Source of the data cell.
    pub binding: Binding,
    /// Longest text the data cell may hold, in characters.
    pub max_chars: Option<usize>,
    /// Alignment of the data cell.
    pub align: HorizontalAlignment,
}

/// A table with one header row and one data row.
#[derive(Clone, Debug, PartialEq)]
pub struct TableSection {
    /// Name used in diagnostics.
    pub title: String,
    /// Columns, left to right.
    pub columns: Vec<Column>,
    /// Fill behind the header row, if any.
    pub header_fill: Option<FillColor>,
    /// Font of the header row.
    pub header_font: FontSpec,
    /// Font of the data row.
    pub body_font: FontSpec,
    /// Height of the header row.
    pub header_height: f64,
    /// Height of one text line in the data row.
    pub row_height: f64,
    /// Horizontal start of the table.
    pub anchor: Anchor,
}

impl TableSection {
    /// Starts building a table.
    pub fn builder(title: impl Into<String>) -> TableBuilder {
        TableBuilder::new(title)
    }

    /// Column widths, left to right.
    pub fn widths(&self) -> Vec<f64> {
        self.columns.iter().map(|column| column.width).collect()
    }

    /// Sum of all column widths.
    pub fn total_width(&self) -> f64 {
        self.columns.iter().map(|column| column.width).sum()
    }
}

/// Builder for [`TableSection`] values.
///
/// Widths, headers, bindings and (optionally) maximum lengths and alignments
/// are supplied as parallel lists; [`TableBuilder::build`] rejects lists whose
/// lengths disagree.
#[derive(Clone, Debug)]
pub struct TableBuilder {
    title: String,
    widths: Vec<f64>,
    headers: Vec<String>,
    bindings: Vec<Binding>,
    max_chars: Vec<Option<usize>>,
    aligns: Vec<HorizontalAlignment>,
    header_fill: Option<FillColor>,
    header_font: FontSpec,
    body_font: FontSpec,
    header_height: f64,
    row_height: f64,
    anchor: Anchor,
}

impl TableBuilder {
    /// Creates a builder for a table named `title`.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            widths: Vec::new(),
            headers: Vec::new(),
            bindings: Vec::new(),
            max_chars: Vec::new(),
            aligns: Vec::new(),
            header_fill: Some(HEADER_FILL),
            header_font: FontSpec::bold(12.0),
            body_font: FontSpec::regular(10.0),
            header_height: 10.0,
            row_height: 10.0,
            anchor: Anchor::LeftMargin,
        }
    }

    /// Column widths in millimetres.
    pub fn widths(mut self, widths: &[f64]) -> Self {
        self.widths = widths.to_vec();
        self
    }

    /// Header texts.
    pub fn headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.headers = headers.into_iter().map(Into::into).collect();
        self
    }

    /// Data cell bindings.
    pub fn bindings(mut self, bindings: Vec<Binding>) -> Self {
        self.bindings = bindings;
        self
    }

    /// Maximum data cell lengths; leave unset for no truncation.
    pub fn max_chars(mut self, max_chars: &[Option<usize>]) -> Self {
        self.max_chars = max_chars.to_vec();
        self
    }

    /// Data cell alignments; defaults to centered.
    pub fn aligns(mut self, aligns: &[HorizontalAlignment]) -> Self {
        self.aligns = aligns.to_vec();
        self
    }

    /// Fill behind the header row.
    pub fn header_fill(mut self, fill: Option<FillColor>) -> Self {
        self.header_fill = fill;
        self
    }

    /// Header and body fonts.
    pub fn fonts(mut self, header: FontSpec, body: FontSpec) -> Self {
        self.header_font = header;
        self.body_font = body;
        self
    }

    /// Header row height and data line height.
    pub fn row_heights(mut self, header: f64, row: f64) -> Self {
        self.header_height = header;
        self.row_height = row;
        self
    }

    /// Horizontal start of the table.
    pub fn anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    fn check_len(&self, found: usize, what: &'static str) -> Result<(), LayoutError> {
        if found == self.widths.len() {
            Ok(())
        } else {
            Err(LayoutError::ColumnCountMismatch {
                section: self.title.clone(),
                widths: self.widths.len(),
                found,
                what,
            })
        }
    }

    /// Validates the parallel lists and assembles the table.
    pub fn build(self) -> Result<TableSection, LayoutError> {
        if self.widths.is_empty() {
            return Err(LayoutError::NoColumns { section: self.title });
        }
        self.check_len(self.headers.len(), "headers")?;
        self.check_len(self.bindings.len(), "bindings")?;
        if !self.max_chars.is_empty() {
            self.check_len(self.max_chars.len(), "maximum lengths")?;
        }
        if !self.aligns.is_empty() {
            self.check_len(self.aligns.len(), "alignments")?;
        }

        let columns = self
            .widths
            .iter()
            .zip(self.headers)
            .zip(self.bindings)
            .enumerate()
            .map(|(index, ((width, header), binding))| Column {
                header,
                width: *width,
                binding,
                max_chars: self.max_chars.get(index).copied().flatten(),
                align: self
                    .aligns
                    .get(index)
                    .copied()
                    .unwrap_or(HorizontalAlignment::Center),
            })
            .collect();

        Ok(TableSection {
            title: self.title,
            columns,
            header_fill: self.header_fill,
            header_font: self.header_font,
            body_font: self.body_font,
            header_height: self.header_height,
            row_height: self.row_height,
            anchor: self.anchor,
        })
    }
}

/// A single bordered row closing a table, typically carrying the totals.
#[derive(Clone, Debug, PartialEq)]
pub struct TotalsSection {
    /// Name used in diagnostics.
    pub title: String,
    /// Cell widths, left to right.
    pub widths: Vec<f64>,
    /// Cell bindings, one per width.
    pub bindings: Vec<Binding>,
    /// Font of the row.
    pub font: FontSpec,
    /// Row height.
    pub row_height: f64,
    /// Horizontal start of the row.
    pub anchor: Anchor,
}

impl TotalsSection {
    /// Creates a totals row, rejecting binding lists that do not match the widths.
    pub fn new(
        title: impl Into<String>,
        widths: Vec<f64>,
        bindings: Vec<Binding>,
    ) -> Result<Self, LayoutError> {
        let title = title.into();
        if widths.is_empty() {
            return Err(LayoutError::NoColumns { section: title });
        }
        if widths.len() != bindings.len() {
            return Err(LayoutError::ColumnCountMismatch {
                section: title,
                widths: widths.len(),
                found: bindings.len(),
                what: "bindings",
            });
        }
        Ok(Self {
            title,
            widths,
            bindings,
            font: FontSpec::bold(10.0),
            row_height: 10.0,
            anchor: Anchor::LeftMargin,
        })
    }

    /// Mirrors the geometry of `table` so the row lines up underneath it.
    pub fn under(table: &TableSection, bindings: Vec<Binding>) -> Result<Self, LayoutError> {
        let mut totals = Self::new(format!("{} totals", table.title), table.widths(), bindings)?;
        totals.font = FontSpec::bold(table.body_font.size_pt);
        totals.row_height = table.row_height;
        totals.anchor = table.anchor;
        Ok(totals)
    }

    /// Sum of all cell widths.
    pub fn total_width(&self) -> f64 {
        self.widths.iter().sum()
    }
}

/// One block of a document, drawn top to bottom.
#[derive(Clone, Debug, PartialEq)]
pub enum Section {
    /// Free-standing text lines.
    Text(TextBlock),
    /// Label/value pairs.
    LabelValue(LabelValueBlock),
    /// Header row plus one data row.
    Table(TableSection),
    /// Closing totals row.
    Totals(TotalsSection),
    /// Vertical gap in millimetres.
    Spacer(f64),
}

impl Section {
    fn title(&self) -> &str {
        match self {
            Self::Text(_) => "text",
            Self::LabelValue(_) => "label/value",
            Self::Table(table) => &table.title,
            Self::Totals(totals) => &totals.title,
            Self::Spacer(_) => "spacer",
        }
    }

    /// Horizontal extent of the section, if it has a fixed one.
    pub fn fixed_width(&self) -> Option<f64> {
        match self {
            Self::LabelValue(block) => Some(block.total_width()),
            Self::Table(table) => Some(table.total_width()),
            Self::Totals(totals) => Some(totals.total_width()),
            Self::Text(_) | Self::Spacer(_) => None,
        }
    }
}

/// Column-width summary of one section, as printed by `check-layout`.
#[derive(Clone, Debug, PartialEq)]
pub struct WidthReport {
    /// Section name.
    pub section: String,
    /// Sum of the section's widths.
    pub total_mm: f64,
    /// Printable width of the page.
    pub available_mm: f64,
}

impl WidthReport {
    /// Whether the section is wider than the printable area.
    pub fn overflows(&self) -> bool {
        self.total_mm > self.available_mm + 1e-9
    }
}

/// Complete description of one document variant.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutSpec {
    name: String,
    title: String,
    page: PageGeometry,
    header: HeaderRegion,
    sections: Vec<Section>,
    identity_fields: Vec<String>,
}

impl LayoutSpec {
    /// Creates an empty layout.
    pub fn new(name: impl Into<String>, page: PageGeometry, header: HeaderRegion) -> Self {
        Self {
            name: name.into(),
            title: String::from("Invoice"),
            page,
            header,
            sections: Vec::new(),
            identity_fields: Vec::new(),
        }
    }

    /// Sets the document title and returns the updated layout.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Appends a section and returns the updated layout.
    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    /// Sets the fields that identify a record in filenames and failure reports.
    pub fn with_identity_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.identity_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Layout name, e.g. `invoice-landscape`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Title written into the PDF metadata.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Page geometry.
    pub fn page(&self) -> &PageGeometry {
        &self.page
    }

    /// Header region.
    pub fn header(&self) -> &HeaderRegion {
        &self.header
    }

    /// Sections, top to bottom.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Identity fields, most significant first.
    pub fn identity_fields(&self) -> &[String] {
        &self.identity_fields
    }

    /// Width summary of every section with a fixed width.
    pub fn width_report(&self) -> Vec<WidthReport> {
        let available = self.page.content_width();
        self.sections
            .iter()
            .filter_map(|section| {
                section.fixed_width().map(|total| WidthReport {
                    section: section.title().to_owned(),
                    total_mm: total,
                    available_mm: available,
                })
            })
            .collect()
    }

    /// Returns (and logs) the advisory findings for this layout.
    pub fn validate(&self) -> Vec<ConfigurationWarning> {
        let warnings: Vec<_> = self
            .width_report()
            .into_iter()
            .filter(WidthReport::overflows)
            .map(|report| ConfigurationWarning::WidthOverflow {
                section: report.section,
                total_mm: report.total_mm,
                available_mm: report.available_mm,
            })
            .collect();

        for warning in &warnings {
            warn!("layout `{}`: {}", self.name, warning);
        }
        warnings
    }
}

/// The document variants shipped with the crate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LayoutVariant {
    /// Single invoice on A4 portrait.
    InvoicePortrait,
    /// Invoice on A4 landscape with the wide product table.
    #[default]
    InvoiceLandscape,
    /// Instalment statement on A4 portrait.
    Statement,
}

impl LayoutVariant {
    /// Every variant, in display order.
    pub const ALL: [LayoutVariant; 3] = [
        LayoutVariant::InvoicePortrait,
        LayoutVariant::InvoiceLandscape,
        LayoutVariant::Statement,
    ];

    /// Stable name of the variant.
    pub fn name(self) -> &'static str {
        match self {
            Self::InvoicePortrait => "invoice-portrait",
            Self::InvoiceLandscape => "invoice-landscape",
            Self::Statement => "statement",
        }
    }

    /// Builds the layout for this variant.
    pub fn layout(self) -> Result<LayoutSpec, LayoutError> {
        match self {
            Self::InvoicePortrait => variants::invoice_portrait(),
            Self::InvoiceLandscape => variants::invoice_landscape(),
            Self::Statement => variants::statement(),
        }
    }
}

impl std::str::FromStr for LayoutVariant {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|variant| variant.name() == value)
            .ok_or_else(|| format!("unknown layout `{value}`"))
    }
}

mod variants {
    use super::*;

    const IDENTITY: [&str; 2] = ["Customer_Account_Number", "Sub_Ref_No"];
    const DUE_UPON_RECEIPT: &str = "Due Upon Receipt";

    fn address_lines(prefix: &str, contact: &str) -> Binding {
        Binding::Lines(vec![
            Binding::text(contact),
            Binding::text(format!("{prefix}_Company")),
            Binding::text(format!("{prefix}_St_Address")),
            Binding::joined([
                format!("{prefix}_City"),
                format!("{prefix}_State"),
                format!("{prefix}_Zip"),
            ]),
        ])
    }

    fn bill_to() -> Binding {
        address_lines("Bill_to", "Bill_To_Contact_name")
    }

    fn ship_to() -> Binding {
        address_lines("Ship_to", "Ship_to_Contact_name")
    }

    fn money_columns() -> Vec<Binding> {
        ["Material_Amount", "Postage", "Tax", "Paid_Amount", "Amount_Due"]
            .into_iter()
            .map(Binding::money)
            .collect()
    }

    fn portrait_products() -> Result<TableSection, LayoutError> {
        let mut bindings = vec![Binding::text("Pub_desc"), Binding::text("Quantity")];
        bindings.extend(money_columns());
        TableSection::builder("Products")
            .widths(&[50.0, 14.0, 25.0, 25.0, 22.0, 27.0, 27.0])
            .headers(["Description", "Qty", "Sales", "S & H", "Tax", "Payment", "Amount Due"])
            .bindings(bindings)
            .max_chars(&[Some(28), Some(5), None, None, None, None, None])
            .aligns(&[
                HorizontalAlignment::Left,
                HorizontalAlignment::Center,
                HorizontalAlignment::Right,
                HorizontalAlignment::Right,
                HorizontalAlignment::Right,
                HorizontalAlignment::Right,
                HorizontalAlignment::Right,
            ])
            .fonts(FontSpec::bold(9.0), FontSpec::regular(9.0))
            .row_heights(8.0, 8.0)
            .build()
    }

    fn portrait_totals(products: &TableSection) -> Result<TotalsSection, LayoutError> {
        let mut bindings = vec![Binding::literal("Total Due"), Binding::Blank];
        bindings.extend(money_columns());
        TotalsSection::under(products, bindings)
    }

    fn portrait_geometry() -> PageGeometry {
        PageGeometry::a4_portrait(Margins::all(10.0))
    }

    fn portrait_header() -> HeaderRegion {
        HeaderRegion {
            height_mm: 25.0,
            logo: LogoPlacement {
                x_mm: 10.0,
                y_mm: 8.0,
                width_mm: 33.0,
            },
        }
    }

    pub(super) fn invoice_portrait() -> Result<LayoutSpec, LayoutError> {
        let addresses = TableSection::builder("Addresses")
            .widths(&[95.0, 95.0])
            .headers(["Bill To", "Ship To"])
            .bindings(vec![bill_to(), ship_to()])
            .aligns(&[HorizontalAlignment::Left, HorizontalAlignment::Left])
            .fonts(FontSpec::bold(10.0), FontSpec::regular(10.0))
            .row_heights(8.0, 5.0)
            .build()?;
        let products = portrait_products()?;
        let totals = portrait_totals(&products)?;

        let details = LabelValueBlock::new(35.0, 60.0)
            .with_row("Invoice #:", Binding::text("Sub_Ref_No"))
            .with_row("Account #:", Binding::text("Customer_Account_Number"))
            .with_row("Order #:", Binding::text("Order"))
            .with_row("Purchase Order:", Binding::text("PO_Num"))
            .with_row("Order Date:", Binding::date("Order_date"))
            .with_row(
                "Due Date:",
                Binding::with_format("DueDate", FieldFormat::date_or(DUE_UPON_RECEIPT)),
            )
            .with_row(
                "Terms:",
                Binding::with_format("Term", FieldFormat::Suffix(" days".into())),
            );

        Ok(LayoutSpec::new("invoice-portrait", portrait_geometry(), portrait_header())
            .with_title("Invoice")
            .with_identity_fields(IDENTITY)
            .with_section(Section::Text(
                TextBlock::new(vec![Binding::literal("INVOICE")], FontSpec::bold(18.0))
                    .with_alignment(HorizontalAlignment::Right)
                    .with_line_height(10.0),
            ))
            .with_section(Section::LabelValue(details))
            .with_section(Section::Spacer(4.0))
            .with_section(Section::Table(addresses))
            .with_section(Section::Spacer(6.0))
            .with_section(Section::Table(products))
            .with_section(Section::Totals(totals))
            .with_section(Section::Spacer(8.0))
            .with_section(Section::Text(
                TextBlock::new(
                    vec![Binding::literal("Thank you for your business.")],
                    FontSpec::regular(10.0),
                )
                .with_alignment(HorizontalAlignment::Center),
            )))
    }

    pub(super) fn invoice_landscape() -> Result<LayoutSpec, LayoutError> {
        let page = PageGeometry::a4_landscape(Margins::all(15.0));
        let header = HeaderRegion {
            height_mm: 22.0,
            logo: LogoPlacement {
                x_mm: 15.0,
                y_mm: 10.0,
                width_mm: 30.0,
            },
        };

        let invoice_details = Binding::Lines(vec![
            Binding::prefixed("Invoice #: ", Binding::text("Sub_Ref_No")),
            Binding::prefixed("Invoice Date: ", Binding::date("Order_date")),
            Binding::prefixed("Effort #: ", Binding::text("Effort_No")),
            Binding::prefixed("Seats: ", Binding::text("Num_of_Seats")),
            Binding::prefixed("Delivery: ", Binding::text("Delivery_Code")),
        ]);
        let header_block = TableSection::builder("Header")
            .widths(&[89.0, 89.0, 89.0])
            .headers(["Bill To", "Ship To", "Invoice"])
            .bindings(vec![bill_to(), ship_to(), invoice_details])
            .aligns(&[HorizontalAlignment::Left; 3])
            .fonts(FontSpec::bold(11.0), FontSpec::regular(10.0))
            .row_heights(8.0, 5.0)
            .build()?;

        let account = TableSection::builder("Account")
            .widths(&[46.0, 37.0, 35.0, 26.0, 30.0, 37.0])
            .headers([
                "Cust. Acct. #",
                "Order #",
                "Purchase Order",
                "Term",
                "Order Date",
                "Due Date",
            ])
            .bindings(vec![
                Binding::text("Customer_Account_Number"),
                Binding::text("Order"),
                Binding::text("PO_Num"),
                Binding::with_format("Term", FieldFormat::Suffix("d".into())),
                Binding::date("Order_date"),
                Binding::with_format("DueDate", FieldFormat::date_or(DUE_UPON_RECEIPT)),
            ])
            .max_chars(&[Some(12), Some(8), Some(6), None, None, None])
            .build()?;

        let mut product_bindings = vec![
            Binding::text("Curr_Promo_Code"),
            Binding::text("SalesCode"),
            Binding::text("Sub_Ref_No"),
            Binding::text("Pub_Code"),
            Binding::text("Quantity"),
            Binding::text("Pub_desc"),
            Binding::date("Expire_Date"),
        ];
        product_bindings.extend(money_columns());
        let products = TableSection::builder("Products")
            .widths(&[20.0, 18.0, 22.0, 18.0, 12.0, 45.0, 22.0, 22.0, 22.0, 20.0, 22.0, 24.0])
            .headers([
                "Promo Code",
                "Sales Code",
                "Sub Ref #",
                "Pub Code",
                "Qty",
                "Description",
                "Expires",
                "Sales",
                "S & H",
                "Tax",
                "Payment",
                "Amount Due",
            ])
            .bindings(product_bindings)
            .max_chars(&[
                Some(8),
                Some(8),
                Some(10),
                Some(8),
                Some(5),
                Some(28),
                None,
                None,
                None,
                None,
                None,
                None,
            ])
            .fonts(FontSpec::bold(8.0), FontSpec::regular(8.0))
            .row_heights(8.0, 8.0)
            .build()?;

        let mut total_bindings = vec![Binding::Blank; 5];
        total_bindings.push(Binding::literal("Total Due"));
        total_bindings.push(Binding::Blank);
        total_bindings.extend(money_columns());
        let totals = TotalsSection::under(&products, total_bindings)?;

        Ok(LayoutSpec::new("invoice-landscape", page, header)
            .with_title("Invoice")
            .with_identity_fields(IDENTITY)
            .with_section(Section::Text(
                TextBlock::new(vec![Binding::literal("INVOICE")], FontSpec::bold(18.0))
                    .with_alignment(HorizontalAlignment::Center)
                    .with_line_height(10.0),
            ))
            .with_section(Section::Table(header_block))
            .with_section(Section::Spacer(5.0))
            .with_section(Section::Table(account))
            .with_section(Section::Spacer(5.0))
            .with_section(Section::Table(products))
            .with_section(Section::Totals(totals)))
    }

    pub(super) fn statement() -> Result<LayoutSpec, LayoutError> {
        let account = LabelValueBlock::new(40.0, 55.0)
            .with_row("Account #:", Binding::text("Customer_Account_Number"))
            .with_row("Group ID:", Binding::text("Group_ID"))
            .with_row("Effort #:", Binding::text("Effort_No"))
            .with_row("Statement Date:", Binding::date("Order_date"))
            .with_row("Instalment:", Binding::text("Instalment"))
            .with_row("Instalment Due:", Binding::text("Instalment_Due"))
            .with_row("Group Outstanding:", Binding::money("GroupOutst"))
            .with_border(true);
        let bill_to_block = TableSection::builder("Bill To")
            .widths(&[95.0])
            .headers(["Bill To"])
            .bindings(vec![bill_to()])
            .aligns(&[HorizontalAlignment::Left])
            .fonts(FontSpec::bold(10.0), FontSpec::regular(10.0))
            .row_heights(8.0, 5.0)
            .build()?;
        let products = portrait_products()?;
        let totals = portrait_totals(&products)?;

        Ok(LayoutSpec::new("statement", portrait_geometry(), portrait_header())
            .with_title("Statement")
            .with_identity_fields(IDENTITY)
            .with_section(Section::Text(
                TextBlock::new(vec![Binding::literal("STATEMENT")], FontSpec::bold(18.0))
                    .with_alignment(HorizontalAlignment::Right)
                    .with_line_height(10.0),
            ))
            .with_section(Section::LabelValue(account))
            .with_section(Section::Spacer(4.0))
            .with_section(Section::Table(bill_to_block))
            .with_section(Section::Spacer(6.0))
            .with_section(Section::Table(products))
            .with_section(Section::Totals(totals)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipped_variants_fit_their_pages() {
        for variant in LayoutVariant::ALL {
            let layout = variant.layout().expect("variant builds");
            assert!(layout.validate().is_empty(), "{} overflows", variant.name());
        }
    }

    #[test]
    fn landscape_account_table_matches_reference_widths() {
        let layout = LayoutVariant::InvoiceLandscape.layout().unwrap();
        let account = layout
            .sections()
            .iter()
            .find_map(|section| match section {
                Section::Table(table) if table.title == "Account" => Some(table),
                _ => None,
            })
            .expect("account table");
        assert_eq!(account.widths(), vec![46.0, 37.0, 35.0, 26.0, 30.0, 37.0]);
        assert_eq!(account.total_width(), 211.0);
        assert_eq!(layout.page().content_width(), 267.0);
    }

    #[test]
    fn landscape_product_table_has_twelve_columns_and_totals() {
        let layout = LayoutVariant::InvoiceLandscape.layout().unwrap();
        let mut tables = layout.sections().iter().filter_map(|section| match section {
            Section::Table(table) if table.title == "Products" => Some(table),
            _ => None,
        });
        assert_eq!(tables.next().map(|table| table.columns.len()), Some(12));
        assert!(matches!(layout.sections().last(), Some(Section::Totals(_))));
    }

    #[test]
    fn overflowing_widths_are_reported_not_rejected() {
        let table = TableSection::builder("Wide")
            .widths(&[150.0, 150.0])
            .headers(["A", "B"])
            .bindings(vec![Binding::text("A"), Binding::text("B")])
            .build()
            .expect("wide tables are allowed");
        let layout = LayoutSpec::new(
            "wide",
            PageGeometry::a4_landscape(Margins::all(15.0)),
            HeaderRegion {
                height_mm: 0.0,
                logo: LogoPlacement {
                    x_mm: 0.0,
                    y_mm: 0.0,
                    width_mm: 10.0,
                },
            },
        )
        .with_section(Section::Table(table));

        let warnings = layout.validate();
        assert_eq!(
            warnings,
            vec![ConfigurationWarning::WidthOverflow {
                section: "Wide".into(),
                total_mm: 300.0,
                available_mm: 267.0,
            }]
        );
    }

    #[test]
    fn mismatched_bindings_are_rejected() {
        let err = TableSection::builder("Broken")
            .widths(&[10.0, 20.0, 30.0])
            .headers(["A", "B", "C"])
            .bindings(vec![Binding::text("A")])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            LayoutError::ColumnCountMismatch {
                section: "Broken".into(),
                widths: 3,
                found: 1,
                what: "bindings",
            }
        );
    }

    #[test]
    fn totals_row_must_match_widths() {
        assert!(TotalsSection::new("T", vec![10.0, 10.0], vec![Binding::Blank]).is_err());
    }

    #[test]
    fn variants_parse_from_names() {
        for variant in LayoutVariant::ALL {
            assert_eq!(variant.name().parse::<LayoutVariant>(), Ok(variant));
        }
        assert!("poster".parse::<LayoutVariant>().is_err());
    }
}
