// Numeric coercion for loosely-typed feed fields.
//
// The upstream feed sends counting stats as numbers, numeric strings, null,
// or not at all. `LooseValue` captures that at the boundary and
// `coerce_number` is the only place that turns it into an `f64`.

use serde::Deserialize;
use serde_json::Value;

/// Marker rendered for any value that cannot be computed.
pub const SENTINEL: &str = "-";

/// A raw stat field exactly as the feed delivered it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum LooseValue {
    #[default]
    Absent,
    Number(f64),
    Text(String),
}

impl From<Value> for LooseValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Number(n) => n.as_f64().map_or(LooseValue::Absent, LooseValue::Number),
            Value::String(s) => LooseValue::Text(s),
            _ => LooseValue::Absent,
        }
    }
}

impl From<f64> for LooseValue {
    fn from(n: f64) -> Self {
        LooseValue::Number(n)
    }
}

impl From<&str> for LooseValue {
    fn from(s: &str) -> Self {
        LooseValue::Text(s.to_string())
    }
}

impl LooseValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, LooseValue::Absent)
    }

    /// Parsed numeric value, if it is finite.
    pub fn as_finite(&self) -> Option<f64> {
        let n = match self {
            LooseValue::Absent => return None,
            LooseValue::Number(n) => *n,
            LooseValue::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        n.is_finite().then_some(n)
    }

    /// Text as shown to the user; `None` when absent.
    pub fn as_display(&self) -> Option<String> {
        match self {
            LooseValue::Absent => None,
            LooseValue::Number(n) => Some(format_number(*n)),
            LooseValue::Text(s) => Some(s.clone()),
        }
    }

    /// Display text, or the sentinel when absent.
    pub fn display_or_sentinel(&self) -> String {
        self.as_display().unwrap_or_else(|| SENTINEL.to_string())
    }
}

/// Parse `value` as a float, falling back to `default` for anything that is
/// absent, unparseable, NaN or infinite.
pub fn coerce_number(value: &LooseValue, default: f64) -> f64 {
    value.as_finite().unwrap_or(default)
}

/// Integral values print without a fractional part.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{n:.0}")
    } else {
        format!("{n}")
    }
}

// ---------------------------------------------------------------------------
// Innings pitched
// ---------------------------------------------------------------------------

/// Parse baseball innings notation: "12.1" is 12 1/3, "12.2" is 12 2/3.
/// The digit after the dot counts outs, so any digit other than 1 or 2 adds
/// nothing. Returns `None` unless the text is `digits` or `digits.digit`.
fn parse_innings(display: &str) -> Option<f64> {
    let s = display.trim();
    let (whole, frac) = match s.split_once('.') {
        Some((whole, frac)) => (whole, Some(frac)),
        None => (s, None),
    };
    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let thirds = match frac {
        None => 0.0,
        Some(f) if f.len() == 1 => match f.as_bytes()[0] {
            b'1' => 1.0 / 3.0,
            b'2' => 2.0 / 3.0,
            b if b.is_ascii_digit() => 0.0,
            _ => return None,
        },
        Some(_) => return None,
    };
    whole.parse::<f64>().ok().map(|w| w + thirds)
}

/// Innings pitched as a float; unparseable input counts as zero innings.
pub fn innings_to_float(display: &str) -> f64 {
    parse_innings(display).unwrap_or(0.0)
}

/// Same as [`innings_to_float`] for a raw feed field.
pub fn innings_value(value: &LooseValue) -> f64 {
    value
        .as_display()
        .map_or(0.0, |display| innings_to_float(&display))
}

/// Ordering key for the innings column. Unparseable values (including the
/// sentinel) sort below every real innings count.
pub fn innings_sort_key(display: &str) -> f64 {
    parse_innings(display).unwrap_or(f64::NEG_INFINITY)
}

/// Ordering key for numeric-looking derived columns: unparseable text is 0.
pub fn numeric_sort_key(display: &str) -> f64 {
    display
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const EPS: f64 = 1e-9;

    #[test]
    fn coerce_numbers_and_numeric_strings() {
        assert_eq!(coerce_number(&LooseValue::Number(7.0), 0.0), 7.0);
        assert_eq!(coerce_number(&"0.312".into(), 0.0), 0.312);
        assert_eq!(coerce_number(&" 42 ".into(), 0.0), 42.0);
        assert_eq!(coerce_number(&".300".into(), 0.0), 0.3);
    }

    #[test]
    fn coerce_falls_back_to_default() {
        assert_eq!(coerce_number(&LooseValue::Absent, 0.0), 0.0);
        assert_eq!(coerce_number(&"abc".into(), 3.0), 3.0);
        assert_eq!(coerce_number(&"".into(), 0.0), 0.0);
        assert_eq!(coerce_number(&"NaN".into(), 1.0), 1.0);
        assert_eq!(coerce_number(&"inf".into(), 0.0), 0.0);
        assert!(coerce_number(&LooseValue::Absent, f64::NAN).is_nan());
    }

    #[test]
    fn loose_value_from_json() {
        assert_eq!(LooseValue::from(json!(null)), LooseValue::Absent);
        assert_eq!(LooseValue::from(json!(true)), LooseValue::Absent);
        assert_eq!(LooseValue::from(json!([1])), LooseValue::Absent);
        assert_eq!(LooseValue::from(json!(12)), LooseValue::Number(12.0));
        assert_eq!(LooseValue::from(json!("1.5")), LooseValue::Text("1.5".into()));
    }

    #[test]
    fn display_keeps_feed_text() {
        assert_eq!(LooseValue::from(".285").display_or_sentinel(), ".285");
        assert_eq!(LooseValue::Number(12.0).display_or_sentinel(), "12");
        assert_eq!(LooseValue::Number(0.5).display_or_sentinel(), "0.5");
        assert_eq!(LooseValue::Absent.display_or_sentinel(), SENTINEL);
    }

    #[test]
    fn innings_thirds() {
        assert!((innings_to_float("12.1") - (12.0 + 1.0 / 3.0)).abs() < EPS);
        assert!((innings_to_float("12.2") - (12.0 + 2.0 / 3.0)).abs() < EPS);
        assert_eq!(innings_to_float("12"), 12.0);
        assert_eq!(innings_to_float("12.0"), 12.0);
        assert_eq!(innings_to_float(" 7.1 "), 7.0 + 1.0 / 3.0);
    }

    #[test]
    fn innings_other_digits_add_nothing() {
        assert_eq!(innings_to_float("5.5"), 5.0);
        assert_eq!(innings_to_float("5.9"), 5.0);
    }

    #[test]
    fn innings_rejects_malformed() {
        assert_eq!(innings_to_float("abc"), 0.0);
        assert_eq!(innings_to_float(""), 0.0);
        assert_eq!(innings_to_float("-"), 0.0);
        assert_eq!(innings_to_float("12.12"), 0.0);
        assert_eq!(innings_to_float(".1"), 0.0);
        assert_eq!(innings_to_float("-3.1"), 0.0);
        assert_eq!(innings_to_float("12."), 0.0);
    }

    #[test]
    fn innings_from_numeric_field() {
        assert!((innings_value(&LooseValue::Number(9.2)) - (9.0 + 2.0 / 3.0)).abs() < EPS);
        assert_eq!(innings_value(&LooseValue::Number(10.0)), 10.0);
        assert_eq!(innings_value(&LooseValue::Absent), 0.0);
    }

    #[test]
    fn innings_sort_key_sends_garbage_low() {
        assert_eq!(innings_sort_key("-"), f64::NEG_INFINITY);
        assert!(innings_sort_key("0.0") > innings_sort_key("-"));
        assert!(innings_sort_key("9.2") < innings_sort_key("10.0"));
    }

    #[test]
    fn numeric_sort_key_defaults_to_zero() {
        assert_eq!(numeric_sort_key("1.25"), 1.25);
        assert_eq!(numeric_sort_key("-0.40"), -0.4);
        assert_eq!(numeric_sort_key("-"), 0.0);
        assert_eq!(numeric_sort_key(""), 0.0);
    }
}
