// Player normalizer: a player's raw line plus the league baseline become a
// finished table row with OPS+, wRC+, FIP, ERA+ and WAR.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::baseline::{BattingBaseline, PitchingBaseline};
use crate::coerce::{LooseValue, SENTINEL};
use crate::dataset::DatasetKind;
use crate::formulas::{on_base_plus_slugging, BattingCounts, PitchingTotals};
use crate::record::{LeagueId, RawPlayerStat, StatValues};

/// Replacement level for hitters: 20 runs below average per 600 PA.
pub const REPLACEMENT_RUNS_PER_600_PA: f64 = -20.0;
/// Fixed runs-per-win used by the offensive WAR approximation.
pub const OFFENSIVE_RUNS_PER_WIN: f64 = 10.0;

// ---------------------------------------------------------------------------
// Cells and rows
// ---------------------------------------------------------------------------

/// One rendered table value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Passed through from the feed (names, AVG, IP, ...).
    Text(String),
    /// Counting stat.
    Number(f64),
    /// Rate stat printed with a fixed number of decimals.
    Fixed(f64, usize),
    /// Index stat such as OPS+ or wRC+.
    Int(i64),
    /// Not computable; rendered as the sentinel.
    Missing,
}

impl Cell {
    fn fixed_or_missing(value: Option<f64>, places: usize) -> Cell {
        value.map_or(Cell::Missing, |v| Cell::Fixed(v, places))
    }

    fn int_or_missing(value: Option<i64>) -> Cell {
        value.map_or(Cell::Missing, Cell::Int)
    }

    fn passthrough(value: &LooseValue) -> Cell {
        value.as_display().map_or(Cell::Missing, Cell::Text)
    }

    fn count(value: &LooseValue) -> Cell {
        Cell::Number(StatValues::count(value))
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Numeric value of the cell, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(n) | Cell::Fixed(n, _) => Some(*n),
            Cell::Int(i) => Some(*i as f64),
            Cell::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            Cell::Missing => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Number(n) => f.write_str(&crate::coerce::format_number(*n)),
            Cell::Fixed(n, places) => write!(f, "{n:.places$}"),
            Cell::Int(i) => write!(f, "{i}"),
            Cell::Missing => f.write_str(SENTINEL),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Cell::Text(s) => serializer.serialize_str(s),
            Cell::Number(n) => serializer.serialize_f64(*n),
            Cell::Fixed(..) => {
                // Serialise the rounded value that is displayed.
                let shown = self.to_string().parse::<f64>().unwrap_or(f64::NAN);
                serializer.serialize_f64(shown)
            }
            Cell::Int(i) => serializer.serialize_i64(*i),
            Cell::Missing => serializer.serialize_none(),
        }
    }
}

/// A finished row: one cell per column of its dataset kind.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedPlayerRow {
    kind: DatasetKind,
    league_id: Option<LeagueId>,
    cells: Vec<Cell>,
}

impl DerivedPlayerRow {
    fn new(kind: DatasetKind, league_id: Option<LeagueId>, cells: Vec<Cell>) -> Self {
        debug_assert_eq!(cells.len(), kind.columns().len());
        Self {
            kind,
            league_id,
            cells,
        }
    }

    pub fn kind(&self) -> DatasetKind {
        self.kind
    }

    pub fn league_id(&self) -> Option<&LeagueId> {
        self.league_id.as_ref()
    }

    pub fn columns(&self) -> &'static [&'static str] {
        self.kind.columns()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn get(&self, column: &str) -> Option<&Cell> {
        let idx = self.columns().iter().position(|c| *c == column)?;
        self.cells.get(idx)
    }

    /// Display text for `column`; empty when the column does not exist.
    pub fn display(&self, column: &str) -> String {
        self.get(column).map(Cell::to_string).unwrap_or_default()
    }
}

impl Serialize for DerivedPlayerRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (column, cell) in self.columns().iter().zip(&self.cells) {
            map.serialize_entry(column, cell)?;
        }
        map.end()
    }
}

fn first_present(preferred: Option<&LooseValue>, fallback: &LooseValue) -> Cell {
    let value = preferred.filter(|v| !v.is_absent()).unwrap_or(fallback);
    Cell::Text(value.display_or_sentinel())
}

/// Name, League, Acronym, Season, Age. Pitching rows prefer the game-class
/// season and age group when the league carries one.
fn identity_cells(row: &RawPlayerStat, prefer_game_class: bool) -> Vec<Cell> {
    let league = &row.league;
    let game_class = league.game_class.as_ref().filter(|_| prefer_game_class);
    vec![
        Cell::Text(row.display_name()),
        Cell::Text(league.name.display_or_sentinel()),
        Cell::Text(league.acronym.display_or_sentinel()),
        first_present(game_class.map(|gc| &gc.season), &league.season),
        first_present(
            game_class.map(|gc| &gc.human_age_group_short),
            &league.human_age_group_short,
        ),
    ]
}

// ---------------------------------------------------------------------------
// Batting
// ---------------------------------------------------------------------------

/// Derived batting columns; `None` is the sentinel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BattingDerived {
    pub ops: Option<f64>,
    pub ops_plus: Option<i64>,
    pub wrc_plus: Option<i64>,
    pub war: Option<f64>,
}

/// Offensive WAR approximation from OPS+.
///
/// `RAA = (OPS+ - 100) / 100 * lgR/PA * PA`, replacement runs are
/// `-20 * PA / 600`, and the sum is divided by a fixed 10 runs per win.
pub fn offensive_war(ops_plus: i64, lg_runs_per_pa: f64, pa: f64) -> f64 {
    let raa = ((ops_plus as f64 - 100.0) / 100.0) * lg_runs_per_pa * pa;
    let replacement_runs = REPLACEMENT_RUNS_PER_600_PA * (pa / 600.0);
    (raa + replacement_runs) / OFFENSIVE_RUNS_PER_WIN
}

pub fn derive_batting(values: &StatValues, lg: &BattingBaseline) -> BattingDerived {
    let counts = BattingCounts::from_values(values);
    let pa = counts.plate_appearances();

    let ops = Some(on_base_plus_slugging(values)).filter(|o| o.is_finite());

    let woba = counts.simplified_woba();
    let wrc_plus =
        (lg.lg_woba > 0.0 && woba > 0.0).then(|| (100.0 * woba / lg.lg_woba).round() as i64);

    let ops_plus = ops
        .filter(|&o| o > 0.0 && lg.lg_ops > 0.0)
        .map(|o| (100.0 * o / lg.lg_ops).round() as i64);

    let war = ops_plus
        .filter(|_| lg.lg_runs_per_pa > 0.0 && pa > 0.0)
        .map(|ops_plus| offensive_war(ops_plus, lg.lg_runs_per_pa, pa));

    BattingDerived {
        ops,
        ops_plus,
        wrc_plus,
        war,
    }
}

pub fn normalize_batting(row: &RawPlayerStat, lg: &BattingBaseline) -> DerivedPlayerRow {
    let v = &row.values;
    let derived = derive_batting(v, lg);

    let mut cells = identity_cells(row, false);
    cells.extend([
        Cell::count(&v.games),
        Cell::count(&v.at_bats),
        Cell::count(&v.runs),
        Cell::count(&v.runs_batted_in),
        Cell::count(&v.hits),
        Cell::count(&v.doubles),
        Cell::count(&v.triples),
        Cell::count(&v.homeruns),
        Cell::count(&v.base_on_balls),
        Cell::count(&v.strikeouts),
        Cell::passthrough(&v.batting_average),
        Cell::passthrough(&v.on_base_percentage),
        Cell::passthrough(&v.slugging_percentage),
        Cell::fixed_or_missing(derived.ops, 3),
        Cell::int_or_missing(derived.ops_plus),
        Cell::int_or_missing(derived.wrc_plus),
        Cell::fixed_or_missing(derived.war, 2),
    ]);

    DerivedPlayerRow::new(DatasetKind::Batting, row.league_id(), cells)
}

// ---------------------------------------------------------------------------
// Pitching
// ---------------------------------------------------------------------------

/// Derived pitching columns; `None` is the sentinel.
///
/// Zero innings makes every column the sentinel. FIP and WAR also need a
/// defined league baseline; ERA+ needs a positive league ERA.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PitchingDerived {
    pub era: Option<f64>,
    pub fip: Option<f64>,
    pub era_plus: Option<i64>,
    pub war: Option<f64>,
}

/// FIP-based WAR: runs saved above a replacement pitcher over the innings
/// pitched, divided by the league's runs per win.
pub fn pitching_war(fip: f64, innings: f64, lg: &PitchingBaseline) -> f64 {
    let runs_above_replacement = (lg.replacement_ra9 - fip) * (innings / 9.0);
    runs_above_replacement / lg.runs_per_win
}

pub fn derive_pitching(values: &StatValues, lg: &PitchingBaseline) -> PitchingDerived {
    let totals = PitchingTotals::from_values(values);
    let Some(era) = totals.era() else {
        return PitchingDerived::default();
    };

    let fip = totals
        .fip_raw()
        .filter(|_| lg.is_defined())
        .map(|raw| raw + lg.fip_constant);

    let era_plus =
        (lg.lg_era > 0.0 && era > 0.0).then(|| (100.0 * lg.lg_era / era).round() as i64);

    let war = fip
        .filter(|_| lg.is_defined())
        .map(|fip| pitching_war(fip, totals.innings, lg));

    PitchingDerived {
        era: Some(era),
        fip,
        era_plus,
        war,
    }
}

pub fn normalize_pitching(row: &RawPlayerStat, lg: &PitchingBaseline) -> DerivedPlayerRow {
    let v = &row.values;
    let derived = derive_pitching(v, lg);

    // The feed's own ERA is shown when present; ERA+ always uses ours.
    let era_cell = match derived.era {
        None => Cell::Missing,
        Some(era) => v
            .earned_runs_average
            .as_display()
            .map_or(Cell::Fixed(era, 2), Cell::Text),
    };

    let mut cells = identity_cells(row, true);
    cells.extend([
        Cell::count(&v.games),
        Cell::count(&v.games_started),
        Cell::passthrough(&v.innings_pitched),
        Cell::count(&v.batters_faced),
        Cell::count(&v.hits),
        Cell::count(&v.runs),
        Cell::count(&v.earned_runs),
        Cell::count(&v.homeruns),
        Cell::count(&v.base_on_balls_allowed),
        Cell::count(&v.intentional_base_on_balls),
        Cell::count(&v.hit_by_pitches),
        Cell::count(&v.strikeouts),
        Cell::count(&v.wild_pitches),
        Cell::count(&v.balks),
        Cell::count(&v.complete_games),
        Cell::count(&v.wins),
        Cell::count(&v.losses),
        Cell::count(&v.saves),
        era_cell,
        Cell::passthrough(&v.walks_and_hits_per_innings_pitched),
        Cell::fixed_or_missing(derived.fip, 2),
        Cell::int_or_missing(derived.era_plus),
        Cell::fixed_or_missing(derived.war, 2),
    ]);

    DerivedPlayerRow::new(DatasetKind::Pitching, row.league_id(), cells)
}
