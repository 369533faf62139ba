// bsmstats entry point.
//
// 1. Parse arguments, initialize tracing (stderr, so stdout stays clean)
// 2. Load and validate config, apply the --club override
// 3. Load the roster and league baselines, derive rows
// 4. Filter, sort, render to stdout

mod cli;
mod render;

use std::io::Write;

use anyhow::{ensure, Context};
use bsmstats_baseball::{sort_rows, FilterOptions, RowFilter, StatsEngine};
use bsmstats_core::config;
use bsmstats_core::fetch::HttpFetcher;
use clap::Parser;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();
    init_tracing()?;

    let kind = args.dataset;
    if let Some(column) = &args.sort {
        ensure!(
            kind.columns().contains(&column.as_str()),
            "unknown {kind} column `{column}`; expected one of: {}",
            kind.columns().join(", ")
        );
    }

    let mut config = match &args.config {
        Some(path) => config::load_config_file(path),
        None => config::load_config(),
    }
    .context("failed to load configuration")?;
    if let Some(club) = args.club {
        config.source.club_id = club;
        config::validate(&config).context("invalid --club")?;
    }
    info!(
        base_url = %config.source.base_url,
        club = config.source.club_id,
        proxies = config.transport.proxies.len(),
        "config loaded"
    );

    let fetcher =
        HttpFetcher::from_config(&config.transport).context("failed to build HTTP client")?;
    let mut engine = StatsEngine::new(fetcher, &config.source);
    let rows = engine
        .load_and_derive(kind)
        .await
        .with_context(|| format!("failed to load {kind} statistics"))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if args.list_filters {
        render::render_filter_options(&FilterOptions::from_rows(&rows), &mut out)?;
        return Ok(());
    }

    let filter = RowFilter::new(args.league.as_deref(), args.season.as_deref());
    let mut rows = filter.apply(rows);
    if let Some(column) = &args.sort {
        sort_rows(&mut rows, kind, column, !args.desc);
    }
    info!(%kind, rows = rows.len(), "rendering");

    render::render(&rows, kind, args.format, &mut out)?;
    out.flush()?;
    Ok(())
}

fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("bsmstats=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
