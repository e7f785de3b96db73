use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use gene_annotator::app::App;
use gene_annotator::config::{ConfigLoader, ResolvedConfig};
use gene_annotator::ensembl::EnsemblHttpClient;
use gene_annotator::error::GannotError;
use gene_annotator::fetch::{FetchClient, FixedDelay};
use gene_annotator::ncbi::NcbiHttpClient;
use gene_annotator::output::{JsonOutput, OutputMode, StderrProgress};
use gene_annotator::uniprot::UniprotHttpClient;

#[derive(Parser)]
#[command(name = "gannot")]
#[command(about = "Annotate Ensembl gene ids with merged Ensembl/UniProt/NCBI records")]
#[command(version, author)]
struct Cli {
    #[arg(long, global = true)]
    non_interactive: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Resolve and merge annotations for a batch of gene ids")]
    Annotate(AnnotateArgs),
    #[command(about = "Show the effective configuration")]
    Config(ConfigArgs),
}

#[derive(Args)]
struct AnnotateArgs {
    ids: Vec<String>,

    #[arg(long)]
    input: Option<PathBuf>,

    #[arg(long)]
    config: Option<String>,
}

#[derive(Args)]
struct ConfigArgs {
    #[arg(long)]
    config: Option<String>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(gannot) = report.downcast_ref::<GannotError>() {
            return ExitCode::from(map_exit_code(gannot));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &GannotError) -> u8 {
    match error {
        GannotError::InvalidGeneId(_)
        | GannotError::EmptyBatch
        | GannotError::BatchTooLarge { .. }
        | GannotError::ConfigRead(_)
        | GannotError::ConfigParse(_)
        | GannotError::InputRead(_) => 2,
        GannotError::TransportExhausted { .. } | GannotError::HttpInit(_) => 3,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.non_interactive {
        OutputMode::NonInteractive
    } else {
        OutputMode::Interactive
    };

    match cli.command {
        Commands::Annotate(args) => run_annotate(args, output_mode),
        Commands::Config(args) => run_config(args),
    }
}

fn run_annotate(args: AnnotateArgs, output_mode: OutputMode) -> miette::Result<()> {
    let settings = ConfigLoader::resolve(args.config.as_deref())?;

    let (ids, from_file) = match &args.input {
        Some(path) => (read_id_file(path)?, true),
        None => (args.ids, false),
    };

    let app = build_app(settings)?;
    // ids on the command line get a hard limit; file batches are truncated
    if !from_file {
        app.validate_batch_size(ids.len())?;
    }

    let batch = match output_mode {
        OutputMode::NonInteractive => app.annotate(&ids, &JsonOutput)?,
        OutputMode::Interactive => app.annotate(&ids, &StderrProgress)?,
    };
    JsonOutput::print_batch(&batch).into_diagnostic()?;
    Ok(())
}

fn run_config(args: ConfigArgs) -> miette::Result<()> {
    let settings = ConfigLoader::resolve(args.config.as_deref())?;
    JsonOutput::print_config(&settings.report()).into_diagnostic()?;
    Ok(())
}

fn build_app(
    settings: ResolvedConfig,
) -> miette::Result<App<EnsemblHttpClient, UniprotHttpClient, NcbiHttpClient>> {
    let limiter = Arc::new(FixedDelay::new(settings.request_delay));
    let fetch = FetchClient::new(settings.retry, settings.request_timeout, limiter)?;
    let ensembl = EnsemblHttpClient::new(fetch.clone());
    let uniprot = UniprotHttpClient::new(fetch.clone());
    let ncbi = NcbiHttpClient::new(fetch);
    Ok(App::new(settings, ensembl, uniprot, ncbi))
}

fn read_id_file(path: &Path) -> Result<Vec<String>, GannotError> {
    let content = std::fs::read_to_string(path)
        .map_err(|_| GannotError::InputRead(path.to_path_buf()))?;
    Ok(content
        .lines()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect())
}
