use std::fmt;

use chrono::NaiveDateTime;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A raw data value as it arrives from a trace column or a layout attribute.
///
/// Deserializes untagged from JSON, so `[1, "a", null, true, [2, 3]]` maps onto
/// `Number`, `Text`, `Null`, `Bool` and `Array`. `Date` is only produced by Rust
/// callers handing in already-parsed timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Datum {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Array(Vec<Datum>),
    Date(NaiveDateTime),
}

impl Datum {
    pub fn is_array(&self) -> bool {
        matches!(self, Datum::Array(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Datum::Null)
    }
}

impl Default for Datum {
    fn default() -> Self {
        Datum::Null
    }
}

impl From<f64> for Datum {
    fn from(v: f64) -> Self {
        Datum::Number(v)
    }
}

impl From<i32> for Datum {
    fn from(v: i32) -> Self {
        Datum::Number(v as f64)
    }
}

impl From<bool> for Datum {
    fn from(v: bool) -> Self {
        Datum::Bool(v)
    }
}

impl From<&str> for Datum {
    fn from(v: &str) -> Self {
        Datum::Text(v.to_string())
    }
}

impl From<String> for Datum {
    fn from(v: String) -> Self {
        Datum::Text(v)
    }
}

impl From<NaiveDateTime> for Datum {
    fn from(v: NaiveDateTime) -> Self {
        Datum::Date(v)
    }
}

impl<T: Into<Datum>> From<Vec<T>> for Datum {
    fn from(v: Vec<T>) -> Self {
        Datum::Array(v.into_iter().map(Into::into).collect())
    }
}

/// Formats a number the way a script runtime stringifies it: integers without a
/// trailing `.0`, no negative zero, and named infinities. Magnitudes from 1e21
/// up or below 1e-6 switch to exponent notation with a signed exponent.
pub fn number_to_string(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        if v > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if v == 0.0 {
        "0".to_string()
    } else if v.abs() >= 1e21 || v.abs() < 1e-6 {
        let exp = format!("{v:e}");
        match exp.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
            _ => exp,
        }
    } else {
        format!("{v}")
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datum::Null => write!(f, "null"),
            Datum::Bool(b) => write!(f, "{b}"),
            Datum::Number(v) => write!(f, "{}", number_to_string(*v)),
            Datum::Text(s) => write!(f, "{s}"),
            Datum::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Datum::Date(d) => write!(f, "{}", d.format("%Y-%m-%d %H:%M:%S%.f")),
        }
    }
}

/// Parses a numeric string literal, returning `None` for blanks, non-finite
/// results and anything that is not a complete number.
pub fn parse_numeric_str(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }

    let radix = [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)]
        .into_iter()
        .find_map(|(prefix, radix)| trimmed.strip_prefix(prefix).map(|rest| (rest, radix)));
    if let Some((digits, radix)) = radix {
        return u64::from_str_radix(digits, radix).ok().map(|v| v as f64);
    }

    // Rust accepts spellings like "inf" and "NaN" that we treat as non-numeric
    if trimmed
        .chars()
        .any(|c| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')))
    {
        return None;
    }

    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// True for finite numbers and for strings holding a finite numeric literal.
pub fn is_numeric(d: &Datum) -> bool {
    match d {
        Datum::Number(v) => v.is_finite(),
        Datum::Text(s) => parse_numeric_str(s).is_some(),
        _ => false,
    }
}

/// Converts a numeric-looking datum to its value.
pub fn to_number(d: &Datum) -> Option<f64> {
    match d {
        Datum::Number(v) if v.is_finite() => Some(*v),
        Datum::Text(s) => parse_numeric_str(s),
        _ => None,
    }
}

lazy_static! {
    static ref JUNK: Regex = Regex::new(r#"^['"%,$#\s]+|[, ]|['"%,$#\s]+$"#).unwrap();
}

/// Normalizes a raw scalar into a finite number, or `None` (BADNUM).
///
/// Strings are stripped of currency, percent, quote and thousands punctuation
/// before parsing, so `"$1,234.5"` and `" 12% "` both clean to numbers.
pub fn clean_number(d: &Datum) -> Option<f64> {
    match d {
        Datum::Text(s) => parse_numeric_str(&JUNK.replace_all(s, "")),
        _ => to_number(d),
    }
}

/// Like [`clean_number`], but date-like values convert to epoch milliseconds.
pub fn clean_datum(d: &Datum) -> Option<f64> {
    match d {
        Datum::Date(dt) => Some(dt.and_utc().timestamp_millis() as f64),
        _ => clean_number(d),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_clean_number_strips_punctuation() {
        assert_eq!(clean_number(&"$1,234.5".into()), Some(1234.5));
        assert_eq!(clean_number(&" 12% ".into()), Some(12.0));
        assert_eq!(clean_number(&"'7'".into()), Some(7.0));
        assert_eq!(clean_number(&"1 000".into()), Some(1000.0));
        assert_eq!(clean_number(&"abc".into()), None);
        assert_eq!(clean_number(&"".into()), None);
        assert_eq!(clean_number(&Datum::Null), None);
        assert_eq!(clean_number(&Datum::Bool(true)), None);
        assert_eq!(clean_number(&Datum::Number(f64::INFINITY)), None);
        assert_eq!(clean_number(&Datum::Number(f64::NAN)), None);
    }

    #[test]
    fn test_is_numeric() {
        assert!(is_numeric(&" 12 ".into()));
        assert!(is_numeric(&"1e3".into()));
        assert!(is_numeric(&"0x10".into()));
        assert!(is_numeric(&".5".into()));
        assert!(!is_numeric(&"   ".into()));
        assert!(!is_numeric(&"Infinity".into()));
        assert!(!is_numeric(&"inf".into()));
        assert!(!is_numeric(&"12px".into()));
        assert!(!is_numeric(&Datum::Bool(false)));
    }

    #[test]
    fn test_clean_datum_dates() {
        let dt = NaiveDate::from_ymd_opt(2000, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(clean_datum(&dt.into()), Some(946_684_800_000.0));
        assert_eq!(clean_datum(&"3".into()), Some(3.0));
    }

    #[test]
    fn test_display_matches_script_strings() {
        assert_eq!(Datum::Number(1.0).to_string(), "1");
        assert_eq!(Datum::Number(-0.0).to_string(), "0");
        assert_eq!(Datum::Number(2.5).to_string(), "2.5");
        assert_eq!(Datum::from(vec![1, 2]).to_string(), "1,2");
        assert_eq!(Datum::Bool(true).to_string(), "true");
        assert_eq!(Datum::Number(1e21).to_string(), "1e+21");
        assert_eq!(Datum::Number(-2.5e22).to_string(), "-2.5e+22");
        assert_eq!(Datum::Number(1e-7).to_string(), "1e-7");
        assert_eq!(Datum::Number(1e20).to_string(), "100000000000000000000");
        assert_eq!(Datum::Number(1e-6).to_string(), "0.000001");
    }

    #[test]
    fn test_deserialize_untagged() {
        let values: Vec<Datum> = serde_json::from_str(r#"[1, "a", null, true, [2, "b"]]"#).unwrap();
        assert_eq!(
            values,
            vec![
                Datum::Number(1.0),
                Datum::Text("a".to_string()),
                Datum::Null,
                Datum::Bool(true),
                Datum::Array(vec![Datum::Number(2.0), Datum::Text("b".to_string())]),
            ]
        );
    }
}
