//! telstat - Summarize daily application telemetry into an analytics report

use clap::Parser;
use telstat::{
    cli::{Cli, ReleaseMode},
    output::{get_formatter, write_report},
    pipeline::Pipeline,
};
use telstat_core::error::Result;
use telstat_logs::DataLoader;
use telstat_releases::{FileReleaseSource, GithubReleaseFetcher, NoReleases, ReleaseSource};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build the release source selected on the command line
fn release_source(mode: ReleaseMode) -> Result<Box<dyn ReleaseSource>> {
    Ok(match mode {
        ReleaseMode::Github(repo) => Box::new(GithubReleaseFetcher::new(&repo)?),
        ReleaseMode::File(path) => Box::new(FileReleaseSource::new(path)),
        ReleaseMode::Skip => {
            info!("Skipping release fetch");
            Box::new(NoReleases)
        }
    })
}

async fn run(cli: Cli) -> Result<()> {
    cli.validate()?;

    let show_progress = !cli.quiet && is_terminal::is_terminal(std::io::stdout());
    let loader = DataLoader::new(cli.log_dir.clone()).with_progress(show_progress);
    let pipeline = Pipeline::new(loader, release_source(cli.release_mode())?);

    let report = pipeline.run().await?;

    let output_path = cli.output_path();
    write_report(&output_path, &report).await?;

    if cli.summary {
        let formatter = get_formatter(cli.json, cli.summary_days);
        println!("{}", formatter.format_report(&report)?);
    }

    info!("Done!");
    Ok(())
}

#[tokio::main]
async fn main() {
    // Parse CLI arguments first to check for quiet flag
    let cli = Cli::parse();

    // Initialize logging. The --quiet flag should override RUST_LOG.
    let filter = if cli.quiet {
        tracing_subscriber::EnvFilter::new("warn")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("telstat=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run(cli).await {
        error!("{e}");
        std::process::exit(1);
    }
}
