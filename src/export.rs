//! Batch export: one PDF per record, bundled into a zip archive.
//!
//! Per-record failures never abort the batch. They are logged, collected and
//! reported next to the success tally in the [`BatchOutcome`]. Only a failure
//! of the archive container itself surfaces as an [`ExportError`].

use std::collections::HashSet;
use std::fmt;
use std::io::{Cursor, Write};

use log::{info, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{BatchFailure, ExportError, RenderFailure};
use crate::layout::LayoutSpec;
use crate::logo::LogoAsset;
use crate::record::Record;
use crate::render::{identity, render};

/// How documents are stored inside the archive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Compression {
    /// Deflate every entry.
    #[default]
    Deflated,
    /// Store entries uncompressed.
    Stored,
}

impl Compression {
    fn method(self) -> CompressionMethod {
        match self {
            Compression::Deflated => CompressionMethod::Deflated,
            Compression::Stored => CompressionMethod::Stored,
        }
    }
}

/// Settings of one export run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportOptions {
    /// First component of every archive filename.
    pub prefix: String,
    /// Compression of the archive entries.
    pub compression: Compression,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            prefix: "invoice".to_string(),
            compression: Compression::Deflated,
        }
    }
}

impl ExportOptions {
    /// Replaces the filename prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Replaces the compression method.
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }
}

/// Hands out archive filenames that never repeat within one batch.
#[derive(Debug)]
pub struct FilenameAllocator {
    prefix: String,
    taken: HashSet<String>,
}

fn sanitize(text: &str) -> String {
    let options = sanitize_filename::Options {
        replacement: "_",
        ..Default::default()
    };
    let cleaned = sanitize_filename::sanitize_with_options(text.trim(), options);
    cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

impl FilenameAllocator {
    /// Creates an allocator for names starting with `prefix`.
    pub fn new(prefix: &str) -> Self {
        let prefix = sanitize(prefix);
        Self {
            prefix: if prefix.is_empty() {
                "document".to_string()
            } else {
                prefix
            },
            taken: HashSet::new(),
        }
    }

    /// Returns `<prefix>_<identity fields>.pdf`, or `<prefix>_row<N>.pdf` when
    /// all identity fields are blank. Repeated names get a `_2`, `_3`, ...
    /// suffix.
    pub fn allocate(&mut self, record: &Record, identity_fields: &[String]) -> String {
        let parts: Vec<String> = identity_fields
            .iter()
            .map(|field| sanitize(&record.text(field)))
            .filter(|part| !part.is_empty())
            .collect();
        let stem = if parts.is_empty() {
            format!("{}_row{}", self.prefix, record.row())
        } else {
            format!("{}_{}", self.prefix, parts.join("_"))
        };

        let mut candidate = format!("{stem}.pdf");
        let mut index = 2;
        while !self.taken.insert(candidate.clone()) {
            candidate = format!("{stem}_{index}.pdf");
            index += 1;
        }
        candidate
    }
}

/// One document written to the archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Filename inside the archive.
    pub name: String,
    /// PDF bytes.
    pub bytes: Vec<u8>,
}

/// Overall result of a batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchStatus {
    /// Every record produced a document.
    Complete,
    /// Some records failed.
    Partial,
    /// No document was produced.
    NoneSucceeded,
}

/// Archive and tally of a finished batch.
#[derive(Debug)]
pub struct BatchOutcome {
    archive: Vec<u8>,
    entries: Vec<ArchiveEntry>,
    total: usize,
    failures: Vec<RenderFailure>,
}

impl BatchOutcome {
    /// The finished zip archive.
    pub fn archive(&self) -> &[u8] {
        &self.archive
    }

    /// Consumes the outcome and returns the archive bytes.
    pub fn into_archive(self) -> Vec<u8> {
        self.archive
    }

    /// Documents in the order they were written.
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// Number of records attempted.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of documents produced.
    pub fn succeeded(&self) -> usize {
        self.entries.len()
    }

    /// Failed records in input order.
    pub fn failures(&self) -> &[RenderFailure] {
        &self.failures
    }

    /// [`BatchStatus::NoneSucceeded`] when no document was written,
    /// [`BatchStatus::Partial`] when some records failed, otherwise
    /// [`BatchStatus::Complete`].
    pub fn status(&self) -> BatchStatus {
        if self.succeeded() == 0 {
            BatchStatus::NoneSucceeded
        } else if self.failures.is_empty() {
            BatchStatus::Complete
        } else {
            BatchStatus::Partial
        }
    }

    /// `succeeded/total succeeded`, as shown to the user.
    pub fn summary(&self) -> String {
        format!("{}/{} succeeded", self.succeeded(), self.total)
    }

    /// Turns a batch without a single document into a [`BatchFailure`].
    pub fn into_result(self) -> Result<Self, BatchFailure> {
        match self.status() {
            BatchStatus::NoneSucceeded => Err(BatchFailure {
                total: self.total,
                failures: self.failures,
                archive: self.archive,
            }),
            _ => Ok(self),
        }
    }
}

impl fmt::Display for BatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

/// Lifecycle of an [`Exporter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExporterState {
    /// No record pushed yet.
    Idle,
    /// Records are being rendered.
    Processing,
    /// The archive has been produced.
    Done,
}

/// Renders records one at a time into a zip archive.
pub struct Exporter<'a> {
    layout: &'a LayoutSpec,
    logo: Option<&'a LogoAsset>,
    options: SimpleFileOptions,
    state: ExporterState,
    zip: Option<ZipWriter<Cursor<Vec<u8>>>>,
    names: FilenameAllocator,
    entries: Vec<ArchiveEntry>,
    failures: Vec<RenderFailure>,
    total: usize,
}

impl<'a> Exporter<'a> {
    /// Creates an idle exporter sharing `layout` and `logo` across all records.
    pub fn new(
        layout: &'a LayoutSpec,
        logo: Option<&'a LogoAsset>,
        options: &ExportOptions,
    ) -> Self {
        Self {
            layout,
            logo,
            options: SimpleFileOptions::default()
                .compression_method(options.compression.method())
                .last_modified_time(zip::DateTime::default())
                .unix_permissions(0o644),
            state: ExporterState::Idle,
            zip: Some(ZipWriter::new(Cursor::new(Vec::new()))),
            names: FilenameAllocator::new(&options.prefix),
            entries: Vec::new(),
            failures: Vec::new(),
            total: 0,
        }
    }

    /// Where the exporter is in its lifecycle.
    pub fn state(&self) -> ExporterState {
        self.state
    }

    fn render_pdf(&self, record: &Record) -> Result<Vec<u8>, RenderFailure> {
        let document = render(record, self.layout, self.logo)?;
        document.to_pdf_bytes().map_err(|err| RenderFailure {
            identity: identity(record, self.layout),
            row: record.row(),
            cause: err.into(),
        })
    }

    /// Renders `record` and appends it to the archive.
    ///
    /// A record that fails to render is recorded and skipped.
    pub fn push(&mut self, record: &Record) -> Result<(), ExportError> {
        if self.state == ExporterState::Done {
            return Err(ExportError::AlreadyFinished);
        }
        self.state = ExporterState::Processing;
        self.total += 1;

        let bytes = match self.render_pdf(record) {
            Ok(bytes) => bytes,
            Err(failure) => {
                warn!("{}; skipping record", failure);
                self.failures.push(failure);
                return Ok(());
            }
        };

        let name = self.names.allocate(record, self.layout.identity_fields());
        let zip = self.zip.as_mut().ok_or(ExportError::AlreadyFinished)?;
        zip.start_file(name.as_str(), self.options)
            .map_err(|source| ExportError::Archive {
                name: name.clone(),
                source,
            })?;
        zip.write_all(&bytes).map_err(|source| ExportError::Io {
            name: name.clone(),
            source,
        })?;
        self.entries.push(ArchiveEntry { name, bytes });
        Ok(())
    }

    /// Closes the archive and returns the outcome.
    pub fn finish(&mut self) -> Result<BatchOutcome, ExportError> {
        let zip = self.zip.take().ok_or(ExportError::AlreadyFinished)?;
        self.state = ExporterState::Done;
        let archive = zip
            .finish()
            .map_err(|source| ExportError::Archive {
                name: "<finish>".to_string(),
                source,
            })?
            .into_inner();

        let outcome = BatchOutcome {
            archive,
            entries: std::mem::take(&mut self.entries),
            total: self.total,
            failures: std::mem::take(&mut self.failures),
        };
        info!(
            "Exported {} with layout `{}`",
            outcome.summary(),
            self.layout.name()
        );
        Ok(outcome)
    }
}

/// Renders every record with `layout` and bundles the documents into one archive.
pub fn export(
    records: &[Record],
    layout: &LayoutSpec,
    logo: Option<&LogoAsset>,
    options: &ExportOptions,
) -> Result<BatchOutcome, ExportError> {
    let mut exporter = Exporter::new(layout, logo, options);
    for record in records {
        exporter.push(record)?;
    }
    exporter.finish()
}
