//! Error types shared by the loading, rendering and export stages.
//!
//! Failures are scoped: [`FieldFormatError`] and [`PdfError`] only ever affect
//! a single record and surface as a [`RenderFailure`], while [`ExportError`]
//! and [`InputError`] concern the batch as a whole.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A cell value that could not be converted into the format its column asks for.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum FieldFormatError {
    /// A money column held something that is not a number.
    #[error("field `{field}` is not a monetary amount: {value:?}")]
    NotNumeric {
        /// Name of the offending field.
        field: String,
        /// Raw value as read from the table.
        value: String,
    },
    /// A money column held a number too large to print to the cent.
    #[error("field `{field}` is out of range for a monetary amount: {value:?}")]
    OutOfRange {
        /// Name of the offending field.
        field: String,
        /// Raw value as read from the table.
        value: String,
    },
}

/// A rendered document could not be serialized to PDF bytes.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("failed to write PDF: {message}")]
pub struct PdfError {
    message: String,
}

impl PdfError {
    pub(crate) fn new(message: impl fmt::Display) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Why a single record did not produce a document.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum RenderCause {
    /// A bound field could not be formatted.
    #[error(transparent)]
    Field(#[from] FieldFormatError),
    /// The finished document could not be serialized.
    #[error(transparent)]
    Pdf(#[from] PdfError),
}

/// Failure confined to one record. The batch carries on without it.
#[derive(Clone, Debug, PartialEq, Error)]
#[error("record {identity} (row {row}) failed: {cause}")]
pub struct RenderFailure {
    /// Value of the record's identifying field, or `row N` when it has none.
    pub identity: String,
    /// 1-based row number of the record in its source table.
    pub row: usize,
    /// Underlying cause.
    #[source]
    pub cause: RenderCause,
}

/// Problems detected while assembling a layout.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// A table was given lists of differing lengths.
    #[error("table `{section}` has {widths} column widths but {found} {what}")]
    ColumnCountMismatch {
        /// Title of the table section.
        section: String,
        /// Number of column widths.
        widths: usize,
        /// Number of entries in the mismatched list.
        found: usize,
        /// Which list disagreed (`headers`, `bindings`, ...).
        what: &'static str,
    },
    /// A table was declared without any columns.
    #[error("table `{section}` has no columns")]
    NoColumns {
        /// Title of the table section.
        section: String,
    },
}

/// Advisory findings about a layout. Rendering still proceeds.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigurationWarning {
    /// The columns of a table add up to more than the printable width.
    WidthOverflow {
        /// Title of the section.
        section: String,
        /// Sum of the column widths in millimetres.
        total_mm: f64,
        /// Printable width of the page in millimetres.
        available_mm: f64,
    },
}

impl fmt::Display for ConfigurationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WidthOverflow {
                section,
                total_mm,
                available_mm,
            } => write!(
                f,
                "column widths of `{}` sum to {:.1}mm but only {:.1}mm are available",
                section, total_mm, available_mm
            ),
        }
    }
}

/// The logo could not be used.
#[derive(Debug, Error)]
pub enum LogoError {
    /// The file could not be read.
    #[error("failed to read logo {path}")]
    Io {
        /// Path of the logo file.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// No bytes were supplied.
    #[error("logo data is empty")]
    Empty,
    /// The bytes are not an image the decoder understands.
    #[error("failed to decode logo image")]
    Decode(#[source] image::ImageError),
    /// The image decoded to zero pixels in one dimension.
    #[error("logo has degenerate dimensions {width}x{height}")]
    Degenerate {
        /// Decoded width in pixels.
        width: u32,
        /// Decoded height in pixels.
        height: u32,
    },
}

/// Reading the input table failed.
#[derive(Debug, Error)]
pub enum InputError {
    /// The file could not be opened or read.
    #[error("failed to read {path}")]
    Io {
        /// Path of the input file.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The CSV data is malformed.
    #[error("invalid CSV data")]
    Csv(#[from] csv::Error),
    /// The workbook could not be opened or parsed.
    #[error("failed to read spreadsheet {path}")]
    Spreadsheet {
        /// Path of the workbook.
        path: PathBuf,
        /// Underlying workbook error.
        #[source]
        source: calamine::Error,
    },
    /// The workbook does not contain the requested sheet (or any sheet).
    #[error("worksheet `{0}` not found")]
    MissingSheet(String),
    /// The extension does not name a supported table format.
    #[error("unsupported input format `{0}` (expected csv, xlsx, xlsm, xlsb, xls or ods)")]
    UnsupportedFormat(String),
}

/// Writing the archive container failed. This aborts the whole batch.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The exporter has already produced its archive.
    #[error("exporter already finished")]
    AlreadyFinished,
    /// The zip writer reported an error.
    #[error("failed to write archive entry `{name}`")]
    Archive {
        /// Entry (or `<finish>`) being written.
        name: String,
        /// Underlying zip error.
        #[source]
        source: zip::result::ZipError,
    },
    /// Copying document bytes into the archive failed.
    #[error("failed to write archive entry `{name}`")]
    Io {
        /// Entry being written.
        name: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Not a single record of the batch produced a document.
#[derive(Debug, Error)]
#[error("none of the {total} records could be rendered")]
pub struct BatchFailure {
    /// Number of records that were attempted.
    pub total: usize,
    /// Per-record failures, in input order.
    pub failures: Vec<RenderFailure>,
    /// The (empty) archive, for callers that still want to hand it out.
    pub archive: Vec<u8>,
}
