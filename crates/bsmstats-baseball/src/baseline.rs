// League baselines: one aggregation pass over a league's full player list.
//
// A baseline is "undefined" when the league has no plate appearances
// (batting) or no innings (pitching). Undefined baselines are all zero and
// every column that depends on them renders as the sentinel.

use crate::formulas::{on_base_plus_slugging, BattingCounts, PitchingTotals};
use crate::record::RawPlayerStat;

/// Runs per 9 innings at which one win costs 10 runs.
pub const REFERENCE_R9: f64 = 4.5;
/// Runs-per-win scale at `REFERENCE_R9`.
pub const BASE_RUNS_PER_WIN: f64 = 10.0;
pub const MIN_RUNS_PER_WIN: f64 = 8.0;
pub const MAX_RUNS_PER_WIN: f64 = 12.0;
/// Replacement-level pitchers allow 20% more runs than league average.
pub const REPLACEMENT_RA9_FACTOR: f64 = 1.20;

// ---------------------------------------------------------------------------
// Baseline types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BattingBaseline {
    /// League wOBA: sum of wOBA numerators over sum of AB + BB.
    pub lg_woba: f64,
    /// PA-weighted league OPS.
    pub lg_ops: f64,
    pub lg_runs_per_pa: f64,
    /// Aggregate AB + BB; zero means the baseline is undefined.
    pub total_pa: f64,
}

impl BattingBaseline {
    pub const EMPTY: BattingBaseline = BattingBaseline {
        lg_woba: 0.0,
        lg_ops: 0.0,
        lg_runs_per_pa: 0.0,
        total_pa: 0.0,
    };

    pub fn is_defined(&self) -> bool {
        self.total_pa > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchingBaseline {
    pub lg_era: f64,
    pub lg_r9: f64,
    /// Added to raw FIP so that league FIP equals league ERA.
    pub fip_constant: f64,
    pub runs_per_win: f64,
    pub replacement_ra9: f64,
    /// Aggregate innings; zero means the baseline is undefined.
    pub total_ip: f64,
}

impl PitchingBaseline {
    /// Undefined baseline. Runs per win still sits at the reference scale.
    pub const EMPTY: PitchingBaseline = PitchingBaseline {
        lg_era: 0.0,
        lg_r9: 0.0,
        fip_constant: 0.0,
        runs_per_win: BASE_RUNS_PER_WIN,
        replacement_ra9: 0.0,
        total_ip: 0.0,
    };

    pub fn is_defined(&self) -> bool {
        self.total_ip > 0.0
    }
}

impl Default for PitchingBaseline {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Baseline for one league in one dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LeagueBaseline {
    Batting(BattingBaseline),
    Pitching(PitchingBaseline),
}

impl LeagueBaseline {
    pub fn is_defined(&self) -> bool {
        match self {
            LeagueBaseline::Batting(b) => b.is_defined(),
            LeagueBaseline::Pitching(p) => p.is_defined(),
        }
    }
}

// ---------------------------------------------------------------------------
// Batting aggregation
// ---------------------------------------------------------------------------

/// Running sums for a batting baseline.
#[derive(Debug, Clone, Copy, Default)]
pub struct BattingAccumulator {
    woba_sum: f64,
    woba_den: f64,
    ops_sum: f64,
    ops_den: f64,
    total_runs: f64,
    total_pa: f64,
}

impl BattingAccumulator {
    pub fn push(&mut self, row: &RawPlayerStat) {
        let counts = BattingCounts::from_values(&row.values);
        let pa = counts.plate_appearances();

        if pa > 0.0 {
            self.woba_sum += counts.woba_numerator();
            self.woba_den += pa;
        }

        let ops = on_base_plus_slugging(&row.values);
        if pa > 0.0 && ops.is_finite() {
            self.ops_sum += ops * pa;
            self.ops_den += pa;
        }

        self.total_runs += counts.runs;
        self.total_pa += pa;
    }

    pub fn finish(&self) -> BattingBaseline {
        BattingBaseline {
            lg_woba: ratio(self.woba_sum, self.woba_den),
            lg_ops: ratio(self.ops_sum, self.ops_den),
            lg_runs_per_pa: ratio(self.total_runs, self.total_pa),
            total_pa: self.total_pa,
        }
    }
}

/// Aggregate a league's batting rows into its baseline.
pub fn aggregate_batting(rows: &[RawPlayerStat]) -> BattingBaseline {
    let mut acc = BattingAccumulator::default();
    for row in rows {
        acc.push(row);
    }
    acc.finish()
}

// ---------------------------------------------------------------------------
// Pitching aggregation
// ---------------------------------------------------------------------------

/// Runs per win scaled by the league's run environment, clamped to
/// `[8, 12]`. A zero R/9 uses the reference environment.
pub fn runs_per_win(lg_r9: f64) -> f64 {
    let r9 = if lg_r9 > 0.0 { lg_r9 } else { REFERENCE_R9 };
    (BASE_RUNS_PER_WIN * (r9 / REFERENCE_R9).sqrt()).clamp(MIN_RUNS_PER_WIN, MAX_RUNS_PER_WIN)
}

/// Baseline from league pitching totals.
pub fn pitching_baseline(totals: &PitchingTotals) -> PitchingBaseline {
    let (Some(lg_era), Some(lg_r9), Some(fip_raw)) = (totals.era(), totals.ra9(), totals.fip_raw())
    else {
        return PitchingBaseline::EMPTY;
    };

    let replacement_base = if lg_r9 > 0.0 { lg_r9 } else { lg_era };
    PitchingBaseline {
        lg_era,
        lg_r9,
        fip_constant: lg_era - fip_raw,
        runs_per_win: runs_per_win(lg_r9),
        replacement_ra9: replacement_base * REPLACEMENT_RA9_FACTOR,
        total_ip: totals.innings,
    }
}

/// Aggregate a league's pitching rows into its baseline.
pub fn aggregate_pitching(rows: &[RawPlayerStat]) -> PitchingBaseline {
    let mut totals = PitchingTotals::default();
    for row in rows {
        totals.add(&PitchingTotals::from_values(&row.values));
    }
    pitching_baseline(&totals)
}

fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}
