use std::error::Error;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use invoice_batch::input::read_table;
use invoice_batch::{export, Compression, ExportOptions, LayoutVariant, LogoAsset};
use log::info;
use tempfile::NamedTempFile;

/// Renders billing tables into zipped PDF invoices.
///
/// Logging goes to stderr and defaults to `info`; set `RUST_LOG` to change it.
#[derive(Parser)]
#[command(author, version, about = "Batch invoice renderer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render every row of a billing table into one zip archive.
    #[command(name = "export")]
    Export(ExportArgs),

    /// Print the column width report of a layout.
    #[command(name = "check-layout", aliases = ["check_layout"])]
    CheckLayout {
        /// Layout to check (invoice-portrait, invoice-landscape or statement).
        #[arg(long, default_value = "invoice-landscape")]
        layout: LayoutVariant,
    },
}

#[derive(Args)]
struct ExportArgs {
    /// Billing table (.csv, .xlsx, .xlsm, .xlsb, .xls or .ods).
    #[arg(long, env = "INVOICE_BATCH_INPUT")]
    input: PathBuf,

    /// Archive to write.
    #[arg(long, env = "INVOICE_BATCH_OUTPUT", default_value = "invoices.zip")]
    output: PathBuf,

    /// Logo placed in the header of every page.
    #[arg(long, env = "INVOICE_BATCH_LOGO")]
    logo: Option<PathBuf>,

    /// Layout variant (invoice-portrait, invoice-landscape or statement).
    #[arg(long, default_value = "invoice-landscape")]
    layout: LayoutVariant,

    /// Worksheet to read instead of the first one.
    #[arg(long)]
    sheet: Option<String>,

    /// First component of every document filename.
    #[arg(long, default_value = "invoice")]
    prefix: String,

    /// Store documents without compression.
    #[arg(long)]
    store: bool,

    /// Write the archive even when no record could be rendered.
    #[arg(long)]
    keep_empty: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Export(args) => run_export(args),
        Commands::CheckLayout { layout } => run_check_layout(layout),
    };

    if let Err(err) = result {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

fn run_export(args: ExportArgs) -> Result<()> {
    let layout = args
        .layout
        .layout()
        .with_context(|| format!("layout `{}` is invalid", args.layout.name()))?;
    let warnings = layout.validate();
    if !warnings.is_empty() {
        info!(
            "Layout `{}` has {} width warning(s); rendering anyway",
            layout.name(),
            warnings.len()
        );
    }

    let records = read_table(&args.input, args.sheet.as_deref())
        .with_context(|| format!("failed to load {}", args.input.display()))?;
    let logo = args
        .logo
        .as_deref()
        .and_then(LogoAsset::load_or_skip);

    let compression = if args.store {
        Compression::Stored
    } else {
        Compression::Deflated
    };
    let options = ExportOptions::default()
        .with_prefix(args.prefix)
        .with_compression(compression);

    let outcome = export(&records, &layout, logo.as_ref(), &options)
        .context("failed to build the archive")?;

    println!("{}", outcome.summary());
    for failure in outcome.failures() {
        println!("  {}", failure);
    }

    let archive = match outcome.into_result() {
        Ok(outcome) => outcome.into_archive(),
        Err(failure) if args.keep_empty => failure.archive,
        Err(failure) => return Err(failure).context("no archive written"),
    };

    write_atomically(&args.output, &archive)?;
    info!("Wrote {}", args.output.display());
    Ok(())
}

fn run_check_layout(variant: LayoutVariant) -> Result<()> {
    let layout = variant
        .layout()
        .with_context(|| format!("layout `{}` is invalid", variant.name()))?;

    println!("{} ({})", layout.name(), layout.title());
    for report in layout.width_report() {
        println!(
            "  {:<16} {:>7.1}mm of {:>6.1}mm{}",
            report.section,
            report.total_mm,
            report.available_mm,
            if report.overflows() { "  overflow" } else { "" }
        );
    }

    let warnings = layout.validate();
    if warnings.is_empty() {
        println!("no warnings");
    }
    for warning in warnings {
        println!("warning: {}", warning);
    }
    Ok(())
}

/// Writes `bytes` to a temporary file next to `path` and moves it into place,
/// so an interrupted run never leaves a truncated archive behind.
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create a temporary file in {}", dir.display()))?;
    file.write_all(bytes)
        .with_context(|| format!("failed to write {}", path.display()))?;
    file.persist(path)
        .with_context(|| format!("failed to move the archive to {}", path.display()))?;
    Ok(())
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
