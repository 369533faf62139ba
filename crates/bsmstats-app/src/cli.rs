// Command-line arguments.

use std::path::PathBuf;

use bsmstats_baseball::DatasetKind;
use clap::{Parser, ValueEnum};

/// Derived batting and pitching statistics (OPS+, wRC+, FIP, ERA+, WAR) for a club roster
#[derive(Debug, Parser)]
#[command(name = "bsmstats", version)]
pub struct Args {
    /// Dataset to load: `batting` or `pitching`
    pub dataset: DatasetKind,

    /// Club id (overrides `source.club_id` from the config file)
    #[arg(long)]
    pub club: Option<u32>,

    /// Only rows with this league acronym (`all` for every league)
    #[arg(long)]
    pub league: Option<String>,

    /// Only rows from this season (`all` for every season)
    #[arg(long)]
    pub season: Option<String>,

    /// Column to sort by, e.g. `WAR` or `IP`
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort descending instead of ascending
    #[arg(long, requires = "sort")]
    pub desc: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Print the league and season values the filters accept, then exit
    #[arg(long)]
    pub list_filters: bool,

    /// Path to the config file (default: config/bsmstats.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Csv,
    Json,
}
