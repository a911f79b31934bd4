use clap::{Args, Parser, Subcommand};
use color_eyre::{Report, Result};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bim_ingest::error::{ExportError, FailureKind, ParseError};
use bim_ingest::export::{default_output_path, export_csv, write_json, ExportOptions};
use bim_ingest::format::detect_format_with_content;
use bim_ingest::parser::ParserFactory;

/// Bytes read from a file for content sniffing.
const SNIFF_LEN: u64 = 64;

#[derive(Parser, Debug)]
#[command(name = "bim-ingest")]
#[command(about = "BIM Ingest - normalize BIM models into a canonical JSON document")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a BIM file and write its JSON document to <FILE>.json
    Parse(ParseArgs),
    /// Print the detected format of a file
    Detect {
        /// Path to the BIM file
        file: PathBuf,
    },
}

#[derive(Args, Debug)]
struct ParseArgs {
    /// Path to the BIM file
    #[arg(required = true)]
    file: PathBuf,

    /// Write the JSON document here instead of <FILE>.json
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Also export a CSV quantity sheet
    #[arg(long, value_name = "FILE")]
    csv: Option<PathBuf>,

    /// Add discipline keys to the JSON document
    #[arg(long)]
    with_disciplines: bool,

    /// Write single-line JSON
    #[arg(long)]
    compact: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Parse(args) => run_parse(&args),
        Command::Detect { file } => run_detect(&file),
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();
}

fn run_parse(args: &ParseArgs) -> Result<()> {
    let mut parser = ParserFactory::for_path(&args.file).map_err(report)?;
    info!(file = %args.file.display(), format = %parser.format(), "parsing");

    parser.parse(&args.file).map_err(report)?;

    let metadata = parser.metadata();
    info!(
        total_elements = metadata.total_elements,
        file_hash = %metadata.file_hash,
        "parse successful"
    );
    for (discipline, count) in &metadata.elements_by_discipline {
        debug!(%discipline, count, "elements by discipline");
    }

    let options = ExportOptions {
        include_disciplines: args.with_disciplines,
    };
    let document = parser.export_to_json_with(options);
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.file));
    write_json(&document, &output, !args.compact).map_err(report_export)?;
    info!(path = %output.display(), "wrote JSON document");
    println!("Output written to: {}", output.display());

    if let Some(csv_path) = &args.csv {
        export_csv(parser.elements(), csv_path).map_err(report_export)?;
        info!(path = %csv_path.display(), "wrote CSV quantity sheet");
        println!("Exported to CSV: {}", csv_path.display());
    }

    Ok(())
}

fn run_detect(file: &Path) -> Result<()> {
    let head = read_head(file);
    let format = detect_format_with_content(file, &head);
    debug!(file = %file.display(), sniffed_bytes = head.len(), "detected format");
    println!("{format}");
    Ok(())
}

/// First bytes of `path`, or nothing when it cannot be read.
fn read_head(path: &Path) -> Vec<u8> {
    let mut head = Vec::new();
    if let Ok(file) = File::open(path) {
        if let Err(e) = file.take(SNIFF_LEN).read_to_end(&mut head) {
            debug!(file = %path.display(), error = %e, "could not read file head");
            head.clear();
        }
    }
    head
}

/// Logs a core failure with its kind and turns it into a report.
fn report(err: ParseError) -> Report {
    log_failure(err.kind(), &err);
    Report::new(err)
}

fn report_export(err: ExportError) -> Report {
    log_failure(err.kind(), &err);
    Report::new(err)
}

fn log_failure(kind: FailureKind, err: &dyn std::error::Error) {
    error!(kind = %kind, "{err}");
}
