// Table helpers over derived rows: league/season filtering, the option
// lists a filter UI offers, and column sorting.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::coerce::SENTINEL;
use crate::dataset::DatasetKind;
use crate::normalize::DerivedPlayerRow;

const ANY: &str = "all";

/// Exact-match filter on the Acronym and Season columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowFilter {
    pub acronym: Option<String>,
    pub season: Option<String>,
}

impl RowFilter {
    /// `"all"` (any case) and blank values mean no constraint.
    pub fn new(acronym: Option<&str>, season: Option<&str>) -> Self {
        fn constraint(value: Option<&str>) -> Option<String> {
            let value = value?.trim();
            (!value.is_empty() && !value.eq_ignore_ascii_case(ANY)).then(|| value.to_string())
        }
        Self {
            acronym: constraint(acronym),
            season: constraint(season),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.acronym.is_none() && self.season.is_none()
    }

    pub fn matches(&self, row: &DerivedPlayerRow) -> bool {
        let ok = |want: &Option<String>, column: &str| {
            want.as_deref().map_or(true, |w| row.display(column) == w)
        };
        ok(&self.acronym, "Acronym") && ok(&self.season, "Season")
    }

    pub fn apply(&self, rows: Vec<DerivedPlayerRow>) -> Vec<DerivedPlayerRow> {
        if self.is_empty() {
            return rows;
        }
        rows.into_iter().filter(|row| self.matches(row)).collect()
    }
}

/// Values a filter can usefully be set to for a set of rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    /// Distinct non-empty acronyms, ascending.
    pub acronyms: Vec<String>,
    /// Distinct seasons other than the sentinel, newest first.
    pub seasons: Vec<String>,
}

impl FilterOptions {
    pub fn from_rows(rows: &[DerivedPlayerRow]) -> Self {
        let acronyms: BTreeSet<String> = rows
            .iter()
            .map(|r| r.display("Acronym"))
            .filter(|a| !a.is_empty())
            .collect();

        let mut seasons: Vec<String> = rows
            .iter()
            .map(|r| r.display("Season"))
            .filter(|s| !s.is_empty() && s != SENTINEL)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        seasons.sort_by(|a, b| compare_plain(b, a));

        Self {
            acronyms: acronyms.into_iter().collect(),
            seasons,
        }
    }
}

/// Stable sort on `column`.
///
/// Columns with a dataset sort key compare by that key. Other columns
/// compare numerically when both cells parse as numbers; numeric cells sort
/// ahead of text, and text compares case-insensitively. Descending reverses
/// the whole order.
pub fn sort_rows(
    rows: &mut Vec<DerivedPlayerRow>,
    kind: DatasetKind,
    column: &str,
    ascending: bool,
) {
    let key_fn = kind.config().sort_key(column);

    let mut keyed: Vec<(SortValue, DerivedPlayerRow)> = rows
        .drain(..)
        .map(|row| {
            let text = row.display(column);
            let key = match key_fn {
                Some(f) => SortValue::Key(f(text.trim())),
                None => SortValue::plain(text),
            };
            (key, row)
        })
        .collect();

    keyed.sort_by(|(a, _), (b, _)| {
        let order = a.compare(b);
        if ascending {
            order
        } else {
            order.reverse()
        }
    });

    rows.extend(keyed.into_iter().map(|(_, row)| row));
}

enum SortValue {
    Key(f64),
    Number(f64),
    /// Case-folded text, then the raw text to break ties.
    Text(String, String),
}

impl SortValue {
    fn plain(text: String) -> Self {
        match parse_finite(&text) {
            Some(n) => SortValue::Number(n),
            None => {
                let raw = text.trim().to_string();
                SortValue::Text(raw.to_lowercase(), raw)
            }
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortValue::Key(a), SortValue::Key(b))
            | (SortValue::Number(a), SortValue::Number(b)) => a.total_cmp(b),
            (SortValue::Number(_), SortValue::Text(..)) => Ordering::Less,
            (SortValue::Text(..), SortValue::Number(_)) => Ordering::Greater,
            (SortValue::Text(a, raw_a), SortValue::Text(b, raw_b)) => {
                a.cmp(b).then_with(|| raw_a.cmp(raw_b))
            }
            // A column either has a key for every row or for none.
            (SortValue::Key(_), _) => Ordering::Less,
            (_, SortValue::Key(_)) => Ordering::Greater,
        }
    }
}

fn parse_finite(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn compare_plain(a: &str, b: &str) -> Ordering {
    SortValue::plain(a.to_string()).compare(&SortValue::plain(b.to_string()))
}
