//! Date parsing, formatting and calendar arithmetic on epoch milliseconds.
//!
//! Date axes keep every calculated and linearized value as UTC milliseconds.
//! Strings only appear at the edges: parsing raw data, rendering range values
//! back into the layout, and producing tick labels.

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::constants::{ONEDAY, ONEHOUR, ONEMIN, ONESEC, THREEDAYS};
use crate::datum::{number_to_string, Datum};
use crate::error::AxisError;

/// Calendar system used to interpret date strings.
///
/// Only the proleptic Gregorian calendar is supported; layouts naming any other
/// calendar are rejected when the axis is built.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Calendar {
    #[default]
    Gregorian,
}

impl Calendar {
    pub fn parse(name: &str) -> Result<Self, AxisError> {
        if name.is_empty() {
            return Ok(Calendar::Gregorian);
        }
        name.parse::<Calendar>()
            .map_err(|_| AxisError::UnsupportedCalendar(name.to_string()))
    }
}

/// Granularity a date tick label is rounded to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DateRound {
    Year,
    Month,
    Day,
    Minute,
    Second,
    /// Seconds with this many fractional digits (at most 4).
    Fraction(u8),
}

impl DateRound {
    /// One step finer, used to give hover labels extra precision.
    pub fn finer(self) -> Self {
        match self {
            DateRound::Year => DateRound::Month,
            DateRound::Month => DateRound::Day,
            DateRound::Day => DateRound::Minute,
            DateRound::Minute => DateRound::Second,
            DateRound::Second | DateRound::Fraction(_) => DateRound::Fraction(4),
        }
    }
}

/// Locale-dependent patterns used when no explicit tick format is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateFormats {
    pub year: String,
    pub month: String,
    pub day_month: String,
    pub day_month_year: String,
}

impl Default for DateFormats {
    fn default() -> Self {
        Self {
            year: "%Y".to_string(),
            month: "%b %Y".to_string(),
            day_month: "%b %-d".to_string(),
            day_month_year: "%b %-d, %Y".to_string(),
        }
    }
}

lazy_static! {
    static ref DATETIME_REGEXP: Regex = Regex::new(
        r"^\s*(-?\d\d\d\d|\d\d)(-(\d?\d)(-(\d?\d)([ Tt]([01]?\d|2[0-3])(:([0-5]\d)(:([0-5]\d(\.\d+)?))?(Z|z|[+\-]\d\d(:?\d\d)?)?)?)?)?)?\s*$"
    )
    .unwrap();
    static ref FRAC_SECONDS: Regex = Regex::new(r"%(\d?)f").unwrap();

    /// First year of the window two-digit years are mapped into.
    static ref YFIRST: i32 = Utc::now().year() - 70;

    pub static ref MIN_MS: f64 = ymd_to_ms(-9999, 1, 1).unwrap_or(f64::MIN);
    pub static ref MAX_MS: f64 = ymd_to_ms(9999, 12, 31)
        .map(|ms| ms + ONEDAY - 0.0001)
        .unwrap_or(f64::MAX);
}

fn ymd_to_ms(y: i32, m: u32, d: u32) -> Option<f64> {
    let date = NaiveDate::from_ymd_opt(y, m, d)?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp_millis() as f64)
}

fn ms_to_utc(ms: f64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms.floor() as i64)
}

fn mod_f64(v: f64, d: f64) -> f64 {
    v.rem_euclid(d)
}

fn lpad(v: impl ToString, len: usize) -> String {
    format!("{:0>len$}", v.to_string())
}

/// Parses a date-time string into epoch milliseconds.
pub fn parse_date_str(s: &str) -> Option<f64> {
    let caps = DATETIME_REGEXP.captures(s)?;
    let year_str = caps.get(1)?.as_str();
    let y: i32 = if year_str.len() == 2 {
        let short: i32 = year_str.parse().ok()?;
        (short + 2000 - *YFIRST).rem_euclid(100) + *YFIRST
    } else {
        year_str.parse().ok()?
    };

    let num = |caps: &Captures<'_>, i: usize, dflt: u32| -> Option<u32> {
        match caps.get(i) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(dflt),
        }
    };
    let m = num(&caps, 3, 1)?;
    let d = num(&caps, 5, 1)?;
    let hour = num(&caps, 7, 0)?;
    let minute = num(&caps, 9, 0)?;
    let second: f64 = match caps.get(11) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0.0,
    };

    let day_ms = ymd_to_ms(y, m, d)?;
    Some(day_ms + hour as f64 * ONEHOUR + minute as f64 * ONEMIN + second * ONESEC)
}

/// Converts a date string, a bare year number or a timestamp to epoch milliseconds.
///
/// Numbers are interpreted through their string form, so `2020` is the year 2020,
/// not 2020 ms after the epoch.
pub fn date_time_to_ms(d: &Datum, _calendar: Calendar) -> Option<f64> {
    let ms = match d {
        Datum::Date(dt) => Some(dt.and_utc().timestamp_millis() as f64),
        Datum::Text(s) => parse_date_str(s),
        Datum::Number(v) if v.is_finite() => parse_date_str(&number_to_string(*v)),
        _ => None,
    }?;
    (ms >= *MIN_MS && ms <= *MAX_MS).then_some(ms)
}

pub fn is_date_time(d: &Datum, calendar: Calendar) -> bool {
    date_time_to_ms(d, calendar).is_some()
}

/// Renders milliseconds as `YYYY-MM-DD[ HH:MM[:SS[.ffff]]]`.
///
/// `r` is the span the value has to be resolved within: time of day is only
/// included below 90 days, seconds below 3 hours and sub-millisecond digits
/// below 5 minutes, and in each case only when nonzero.
pub fn ms_to_date_time(ms: f64, r: f64) -> Option<String> {
    if !(ms >= *MIN_MS && ms <= *MAX_MS) {
        return None;
    }

    let msec_tenths = (mod_f64(ms + 0.05, 1.0) * 10.0).floor();
    let ms_rounded = (ms - msec_tenths / 10.0).round();
    let d = DateTime::from_timestamp_millis(ms_rounded as i64)?;

    let date_str = d.format("%Y-%m-%d").to_string();
    let (h, m) = if r < 90.0 * ONEDAY {
        (d.hour(), d.minute())
    } else {
        (0, 0)
    };
    let s = if r < 3.0 * ONEHOUR { d.second() } else { 0 };
    let msec10 = if r < 5.0 * ONEMIN {
        d.timestamp_subsec_millis() as u64 * 10 + msec_tenths as u64
    } else {
        0
    };

    Some(include_time(date_str, h, m, s, msec10))
}

fn include_time(mut date_str: String, h: u32, m: u32, s: u32, mut msec10: u64) -> String {
    if h != 0 || m != 0 || s != 0 || msec10 != 0 {
        date_str.push_str(&format!(" {}:{}", lpad(h, 2), lpad(m, 2)));
        if s != 0 || msec10 != 0 {
            date_str.push_str(&format!(":{}", lpad(s, 2)));
            if msec10 != 0 {
                let mut digits = 4;
                while msec10 % 10 == 0 {
                    digits -= 1;
                    msec10 /= 10;
                }
                date_str.push_str(&format!(".{}", lpad(msec10, digits)));
            }
        }
    }
    date_str
}

/// Accepts date strings, timestamps in milliseconds and `Datum::Date`,
/// returning `None` (with a warning) for anything else.
pub fn clean_date(d: &Datum, calendar: Calendar) -> Option<f64> {
    match d {
        Datum::Number(v) if v.is_finite() => {
            // a bare year in number form reads as milliseconds here
            Some(*v).filter(|v| *v >= *MIN_MS && *v <= *MAX_MS)
        }
        Datum::Null => None,
        _ => {
            let ms = date_time_to_ms(d, calendar);
            if ms.is_none() {
                log::warn!("unrecognized date: {d}");
            }
            ms
        }
    }
}

/// Adds `months` calendar months to `ms`, keeping the time of day.
///
/// Day-of-month overflow rolls back to the end of the target month, so
/// Jan 31 plus one month is the last day of February. Returns NaN if the
/// result leaves the supported date range.
pub fn increment_month(ms: f64, months: i64) -> f64 {
    let time_ms = mod_f64(ms, ONEDAY);
    let day_start = (ms - time_ms).round();

    let Some(shifted) = ms_to_utc(day_start + THREEDAYS) else {
        return f64::NAN;
    };
    let Some(total) = (shifted.year() as i64 * 12 + shifted.month0() as i64).checked_add(months)
    else {
        return f64::NAN;
    };
    let Ok(year) = i32::try_from(total.div_euclid(12)) else {
        return f64::NAN;
    };
    let Some(first) = NaiveDate::from_ymd_opt(year, total.rem_euclid(12) as u32 + 1, 1) else {
        return f64::NAN;
    };
    let Some(target) = first.checked_add_signed(Duration::days(shifted.day() as i64 - 1)) else {
        return f64::NAN;
    };
    match target.and_hms_opt(0, 0, 0) {
        Some(dt) => dt.and_utc().timestamp_millis() as f64 + time_ms - THREEDAYS,
        None => f64::NAN,
    }
}

const MAXSECONDS: [f64; 5] = [59.0, 59.9, 59.99, 59.999, 59.9999];

/// `HH:MM[:SS[.ffff]]` for the time-of-day part of `x`.
fn format_time(x: f64, tr: DateRound) -> String {
    let time_part = mod_f64(x + 0.05, ONEDAY);
    let mut time_str = format!(
        "{}:{}",
        lpad((time_part / ONEHOUR).floor(), 2),
        lpad(mod_f64((time_part / ONEMIN).floor(), 60.0), 2)
    );

    let digits = match tr {
        DateRound::Minute => return time_str,
        DateRound::Fraction(n) => n.min(4) as usize,
        _ => 0,
    };
    let sec = mod_f64(x / ONESEC, 60.0).min(MAXSECONDS[digits]);
    let mut sec_str = format!("{:.*}", digits, 100.0 + sec)[1..].to_string();
    if digits > 0 {
        sec_str = sec_str
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string();
    }
    time_str.push(':');
    time_str.push_str(&sec_str);
    time_str
}

/// Formats `x` with a strftime-style pattern.
///
/// `%{n}f` renders fractional seconds with up to `n` (default 6) digits and
/// `%q` the quarter of the year.
pub fn mod_date_format(fmt: &str, x: f64) -> Result<String, AxisError> {
    let fmt = FRAC_SECONDS.replace_all(fmt, |caps: &Captures<'_>| {
        let digits = caps[1].parse::<usize>().unwrap_or(6).clamp(1, 6);
        let frac = format!("{:.*}", digits, (x / 1000.0) % 1.0 + 2.0);
        let frac = frac[2..].trim_end_matches('0');
        if frac.is_empty() {
            "0".to_string()
        } else {
            frac.to_string()
        }
    });

    let invalid = |reason: &str| AxisError::InvalidTickFormat {
        format: fmt.to_string(),
        reason: reason.to_string(),
    };
    let d = ms_to_utc(x + 0.05).ok_or_else(|| invalid("date out of range"))?;
    let fmt = fmt.replace("%q", &((d.month0() / 3) + 1).to_string());

    if StrftimeItems::new(&fmt).any(|item| matches!(item, Item::Error)) {
        return Err(invalid("unrecognized directive"));
    }
    let mut out = String::new();
    write!(out, "{}", d.format(&fmt)).map_err(|_| invalid("could not render"))?;
    Ok(out)
}

/// Formats a date tick value.
///
/// Without an explicit `fmt` the result may contain a `\n`: the part before it
/// is the tick label proper and the part after it is the "head" (the coarser
/// date context, such as the year) that is shown only when it changes.
pub fn format_date(
    x: f64,
    fmt: Option<&str>,
    tr: DateRound,
    formats: &DateFormats,
) -> Result<String, AxisError> {
    if let Some(fmt) = fmt {
        return mod_date_format(fmt, x);
    }
    match tr {
        DateRound::Year => mod_date_format(&formats.year, x),
        DateRound::Month => mod_date_format(&formats.month, x),
        DateRound::Day => Ok(format!(
            "{}\n{}",
            mod_date_format(&formats.day_month, x)?,
            mod_date_format(&formats.year, x)?
        )),
        _ => Ok(format!(
            "{}\n{}",
            format_time(x, tr),
            mod_date_format(&formats.day_month_year, x)?
        )),
    }
}
