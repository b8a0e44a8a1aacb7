//! Core entry point for the invoice_batch crate.
//!
//! Billing records are loaded with [`input`], rendered one document per record
//! against a [`layout::LayoutSpec`] by [`render`], serialized with
//! [`document::RenderedDocument::to_pdf_bytes`] and bundled into a zip archive
//! by [`export`].

pub mod dates;
pub mod document;
pub mod error;
pub mod export;
pub mod format;
pub mod input;
pub mod layout;
pub mod logo;
pub mod metrics;
mod pdf;
pub mod record;
pub mod render;

pub use error::{
    BatchFailure, ConfigurationWarning, ExportError, FieldFormatError, InputError, LayoutError,
    LogoError, PdfError, RenderFailure,
};
pub use export::{export, BatchOutcome, BatchStatus, Compression, ExportOptions, Exporter};
pub use layout::{LayoutSpec, LayoutVariant};
pub use logo::LogoAsset;
pub use record::{Record, Value};
pub use render::render;
