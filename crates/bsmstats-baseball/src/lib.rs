//! Derived sabermetrics for club rosters: league baselines, per-player
//! OPS+/wRC+/WAR for hitters and ERA/FIP/ERA+/WAR for pitchers, plus the
//! table helpers used to present them.

pub mod baseline;
pub mod cache;
pub mod coerce;
pub mod dataset;
pub mod formulas;
pub mod normalize;
pub mod orchestrator;
pub mod record;
pub mod table;

pub use baseline::{BattingBaseline, LeagueBaseline, PitchingBaseline};
pub use cache::{BaselineCache, CachedRoster, RosterCache};
pub use coerce::{LooseValue, SENTINEL};
pub use dataset::{DatasetConfig, DatasetKind, UnknownDataset};
pub use normalize::{Cell, DerivedPlayerRow};
pub use orchestrator::{BaselineReport, DatasetError, StatsEngine};
pub use record::{LeagueId, RawPlayerStat, StatsEnvelope};
pub use table::{sort_rows, FilterOptions, RowFilter};
