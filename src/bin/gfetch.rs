use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use genome_fetch::app::{App, RunOptions, RunOutcome};
use genome_fetch::config::ConfigLoader;
use genome_fetch::domain::OrganismName;
use genome_fetch::error::GfetchError;
use genome_fetch::output::{JsonOutput, LogSink, OutputMode, render_fetch_summary, render_search};
use genome_fetch::query::{DEFAULT_STATUS, QueryFilter, StatusFilter};
use genome_fetch::remote::HttpRemoteStore;

#[derive(Parser)]
#[command(name = "gfetch")]
#[command(about = "Search the NCBI prokaryote genome report and download chromosome files")]
#[command(version)]
struct Cli {
    #[arg(help = "'search' or 'fetch'")]
    action: String,

    #[arg(
        short,
        long,
        num_args = 2,
        value_names = ["GENUS", "SPECIES"],
        help = "Scientific name, case insensitive; must occur somewhere in the listed name"
    )]
    name: Option<Vec<String>>,

    #[arg(
        short,
        long,
        default_value = DEFAULT_STATUS,
        help = "Assembly statuses to keep, space separated, underscores for spaces"
    )]
    status: String,

    #[arg(short, long, default_value = "genomes", help = "Directory to download genomes to")]
    outdir: Utf8PathBuf,

    #[arg(short, long, help = "List every manifest column in search output")]
    verbose: bool,

    #[arg(long)]
    config: Option<String>,

    #[arg(long)]
    dry_run: bool,

    #[arg(long)]
    non_interactive: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<GfetchError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &GfetchError) -> u8 {
    match error {
        GfetchError::InvalidAction(_)
        | GfetchError::InvalidName(_)
        | GfetchError::InvalidStatus(_)
        | GfetchError::ConfigRead(_)
        | GfetchError::ConfigParse(_) => 2,
        GfetchError::Transfer(_) | GfetchError::Status { .. } => 3,
        GfetchError::PartialFetch { .. } => 4,
        _ => 1,
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

    let name = match cli.name.as_deref() {
        Some([genus, species]) => Some(OrganismName::new(genus, species).into_diagnostic()?),
        Some(other) => {
            return Err(GfetchError::InvalidName(other.join(" "))).into_diagnostic();
        }
        None => None,
    };
    let status = cli.status.parse::<StatusFilter>().into_diagnostic()?;
    let filter = QueryFilter::new(name, status);
    let options = RunOptions {
        verbose: cli.verbose,
        dry_run: cli.dry_run,
    };

    let config = ConfigLoader::resolve(cli.config.as_deref()).into_diagnostic()?;
    let store = HttpRemoteStore::new(&config).into_diagnostic()?;
    let app = App::new(store, config);

    let outcome = match output_mode {
        OutputMode::NonInteractive => app
            .execute(&cli.action, &filter, &cli.outdir, options, &JsonOutput)
            .into_diagnostic()?,
        OutputMode::Interactive => app
            .execute(&cli.action, &filter, &cli.outdir, options, &LogSink)
            .into_diagnostic()?,
    };

    match output_mode {
        OutputMode::NonInteractive => JsonOutput::print_outcome(&outcome).into_diagnostic()?,
        OutputMode::Interactive => match &outcome {
            RunOutcome::Search(result) => print!("{}", render_search(result)),
            RunOutcome::Fetch(report) => print!("{}", render_fetch_summary(report)),
        },
    }

    if let RunOutcome::Fetch(report) = &outcome {
        if !report.is_complete() {
            return Err(GfetchError::PartialFetch {
                failed: report.problems(),
                total: report.items.len(),
            })
            .into_diagnostic();
        }
    }
    Ok(())
}
