// Dataset strategies: batting and pitching share one pipeline and differ in
// columns, endpoints, aggregation, row mapping and sort keys.

use std::fmt;
use std::str::FromStr;

use crate::baseline::{
    aggregate_batting, aggregate_pitching, BattingBaseline, LeagueBaseline, PitchingBaseline,
};
use crate::coerce::{innings_sort_key, numeric_sort_key};
use crate::normalize::{normalize_batting, normalize_pitching, DerivedPlayerRow};
use crate::record::{LeagueId, RawPlayerStat};

/// Maps a cell's display text to an ordering key.
pub type SortKey = fn(&str) -> f64;

pub const BATTING_COLUMNS: &[&str] = &[
    "Name", "League", "Acronym", "Season", "Age", "G", "AB", "R", "RBI", "H", "2B", "3B", "HR",
    "BB", "K", "AVG", "OBP", "SLG", "OPS", "OPS+", "wRC+", "WAR",
];

pub const PITCHING_COLUMNS: &[&str] = &[
    "Name", "League", "Acronym", "Season", "Age", "G", "GS", "IP", "BF", "H", "R", "ER", "HR",
    "BB", "IBB", "HBP", "SO", "WP", "BK", "CG", "W", "L", "SV", "ERA", "WHIP", "FIP", "ERA+",
    "WAR",
];

// ---------------------------------------------------------------------------
// DatasetKind
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DatasetKind {
    Batting,
    Pitching,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 2] = [DatasetKind::Batting, DatasetKind::Pitching];

    /// Path segment used by the feed (`.../statistics/{kind}.json`).
    pub fn as_str(self) -> &'static str {
        match self {
            DatasetKind::Batting => "batting",
            DatasetKind::Pitching => "pitching",
        }
    }

    pub fn config(self) -> &'static dyn DatasetConfig {
        match self {
            DatasetKind::Batting => &BattingDataset,
            DatasetKind::Pitching => &PitchingDataset,
        }
    }

    pub fn columns(self) -> &'static [&'static str] {
        self.config().columns()
    }

    pub fn club_url(self, base_url: &str, club_id: u32) -> String {
        format!(
            "{}/clubs/{club_id}/statistics/{}.json",
            base_url.trim_end_matches('/'),
            self.as_str()
        )
    }

    pub fn league_url(self, base_url: &str, league: &LeagueId) -> String {
        format!(
            "{}/league_groups/{league}/statistics/{}.json",
            base_url.trim_end_matches('/'),
            self.as_str()
        )
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown dataset `{0}` (expected `batting` or `pitching`)")]
pub struct UnknownDataset(String);

impl FromStr for DatasetKind {
    type Err = UnknownDataset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "batting" => Ok(DatasetKind::Batting),
            "pitching" => Ok(DatasetKind::Pitching),
            _ => Err(UnknownDataset(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Strategy trait
// ---------------------------------------------------------------------------

/// Everything that differs between the batting and pitching datasets.
pub trait DatasetConfig: Send + Sync {
    fn kind(&self) -> DatasetKind;

    fn columns(&self) -> &'static [&'static str];

    /// Baseline over a league's full player list.
    fn aggregate(&self, rows: &[RawPlayerStat]) -> LeagueBaseline;

    /// All-zero baseline used for leagues that have none.
    fn empty_baseline(&self) -> LeagueBaseline;

    fn map_row(&self, row: &RawPlayerStat, baseline: &LeagueBaseline) -> DerivedPlayerRow;

    /// Ordering key for columns that should not sort as plain text.
    fn sort_key(&self, column: &str) -> Option<SortKey>;
}

pub struct BattingDataset;

impl DatasetConfig for BattingDataset {
    fn kind(&self) -> DatasetKind {
        DatasetKind::Batting
    }

    fn columns(&self) -> &'static [&'static str] {
        BATTING_COLUMNS
    }

    fn aggregate(&self, rows: &[RawPlayerStat]) -> LeagueBaseline {
        LeagueBaseline::Batting(aggregate_batting(rows))
    }

    fn empty_baseline(&self) -> LeagueBaseline {
        LeagueBaseline::Batting(BattingBaseline::EMPTY)
    }

    fn map_row(&self, row: &RawPlayerStat, baseline: &LeagueBaseline) -> DerivedPlayerRow {
        let lg = match baseline {
            LeagueBaseline::Batting(b) => b,
            LeagueBaseline::Pitching(_) => &BattingBaseline::EMPTY,
        };
        normalize_batting(row, lg)
    }

    fn sort_key(&self, column: &str) -> Option<SortKey> {
        match column {
            "OPS" | "OPS+" | "wRC+" | "WAR" => Some(numeric_sort_key),
            _ => None,
        }
    }
}

pub struct PitchingDataset;

impl DatasetConfig for PitchingDataset {
    fn kind(&self) -> DatasetKind {
        DatasetKind::Pitching
    }

    fn columns(&self) -> &'static [&'static str] {
        PITCHING_COLUMNS
    }

    fn aggregate(&self, rows: &[RawPlayerStat]) -> LeagueBaseline {
        LeagueBaseline::Pitching(aggregate_pitching(rows))
    }

    fn empty_baseline(&self) -> LeagueBaseline {
        LeagueBaseline::Pitching(PitchingBaseline::EMPTY)
    }

    fn map_row(&self, row: &RawPlayerStat, baseline: &LeagueBaseline) -> DerivedPlayerRow {
        let lg = match baseline {
            LeagueBaseline::Pitching(p) => p,
            LeagueBaseline::Batting(_) => &PitchingBaseline::EMPTY,
        };
        normalize_pitching(row, lg)
    }

    fn sort_key(&self, column: &str) -> Option<SortKey> {
        match column {
            "IP" => Some(innings_sort_key),
            "FIP" | "ERA+" | "WAR" => Some(numeric_sort_key),
            _ => None,
        }
    }
}
