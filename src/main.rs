use std::path::PathBuf;

use badge_export::config::{PathPolicy, PipelineConfig};
use badge_export::io::media::HttpFetcher;
use badge_export::{Result, logging, pipeline};
use clap::{Parser, Subcommand, ValueEnum};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(error) = logging::init_tracing(&cli.log_level) {
        eprintln!("warning: {error}");
    }
    if let Err(error) = run(cli).await {
        tracing::error!(%error, "export aborted");
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Export(args) => execute_export(args).await,
    }
}

async fn execute_export(args: ExportArgs) -> Result<()> {
    let json = args.json;
    let config = args.into_config();
    let report = pipeline::run(&config, &HttpFetcher::new()).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{} rows exported as {} lines to {} ({} downloads, {} failed)",
            report.rows,
            report.chunks,
            report.output.display(),
            report.downloads_ok,
            report.downloads_failed
        );
    }
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Export spreadsheet contacts with their photos and QR codes as chunked CSV."
)]
struct Cli {
    /// Default log filter when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download media and write the merged CSV export.
    Export(ExportArgs),
}

#[derive(clap::Args)]
struct ExportArgs {
    /// Spreadsheet to read (.xlsx, .xls, ...). Only the first sheet is used.
    #[arg(long)]
    input: PathBuf,

    /// Directory receiving photos/, qrcodes/ and the CSV file.
    #[arg(long)]
    output_dir: PathBuf,

    /// Number of source rows merged into one CSV line.
    #[arg(long, default_value_t = 10)]
    chunk_size: usize,

    /// When media columns are rewritten to local paths.
    #[arg(long, value_enum, default_value_t = PathPolicyKind::Always)]
    path_substitution: PathPolicyKind,

    /// Names at least this long get their middle names abbreviated.
    #[arg(long, default_value_t = 18)]
    name_threshold: usize,

    #[arg(long, default_value = "photo")]
    photo_column: String,

    #[arg(long, default_value = "qrcode")]
    qrcode_column: String,

    #[arg(long, default_value = "nomComplet")]
    name_column: String,

    /// File name of the CSV export inside the output directory.
    #[arg(long, default_value = "output.csv")]
    output_name: String,

    /// Print the run report as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum PathPolicyKind {
    Always,
    OnSuccess,
}

impl From<PathPolicyKind> for PathPolicy {
    fn from(kind: PathPolicyKind) -> Self {
        match kind {
            PathPolicyKind::Always => PathPolicy::Always,
            PathPolicyKind::OnSuccess => PathPolicy::OnSuccess,
        }
    }
}

impl ExportArgs {
    fn into_config(self) -> PipelineConfig {
        PipelineConfig {
            input: self.input,
            output_dir: self.output_dir,
            output_name: self.output_name,
            chunk_size: self.chunk_size,
            path_policy: self.path_substitution.into(),
            name_threshold: self.name_threshold,
            photo_column: self.photo_column,
            qrcode_column: self.qrcode_column,
            name_column: self.name_column,
        }
    }
}
