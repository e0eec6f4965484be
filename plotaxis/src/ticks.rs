//! Tick spacing, tick enumeration and tick label rounding.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::axis::Axis;
use crate::classify::AxisType;
use crate::constants::{
    DATE_TICK0, DATE_TICK0_SUNDAY, MAX_TICKS, ONEAVGMONTH, ONEAVGYEAR, ONEDAY, ONEHOUR, ONEMIN,
    ONESEC,
};
use crate::dates::{increment_month, DateRound, MAX_MS, MIN_MS};
use crate::datum::{number_to_string, to_number, Datum};
use crate::error::AxisError;
use crate::format::{tick_label_with_text, tick_text_in_walk, ExponentFormat, TickLabel};
use crate::registry::AxisLetter;

/// Which digits get a tick within each decade of a log axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DigitSet {
    /// Every digit 1-9 (`D1`).
    All,
    /// Only 2 and 5 (`D2`).
    TwoFive,
}

impl DigitSet {
    fn log_table(&self) -> &'static [f64] {
        match self {
            DigitSet::All => &ROUND_LOG1,
            DigitSet::TwoFive => &ROUND_LOG2,
        }
    }
}

/// Tick spacing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dtick {
    /// Uniform step in linearized units (milliseconds on date axes, decades on log axes).
    Linear(f64),
    /// Calendar months on date axes.
    Months(u32),
    /// Uniform step in data units on a log axis.
    LogLinear(f64),
    /// Digit ticks within each decade on a log axis.
    LogDigits(DigitSet),
}

impl Dtick {
    pub fn as_linear(&self) -> Option<f64> {
        match self {
            Dtick::Linear(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Dtick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dtick::Linear(v) => write!(f, "{}", number_to_string(*v)),
            Dtick::Months(n) => write!(f, "M{n}"),
            Dtick::LogLinear(v) => write!(f, "L{}", number_to_string(*v)),
            Dtick::LogDigits(DigitSet::All) => write!(f, "D1"),
            Dtick::LogDigits(DigitSet::TwoFive) => write!(f, "D2"),
        }
    }
}

impl FromStr for Dtick {
    type Err = AxisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AxisError::InvalidDtick(s.to_string());
        let positive = |v: &str| {
            v.trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && *v > 0.0)
                .ok_or_else(invalid)
        };
        match s {
            "D1" => Ok(Dtick::LogDigits(DigitSet::All)),
            "D2" => Ok(Dtick::LogDigits(DigitSet::TwoFive)),
            _ if s.starts_with('M') => s[1..]
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .map(Dtick::Months)
                .ok_or_else(invalid),
            _ if s.starts_with('L') => positive(&s[1..]).map(Dtick::LogLinear),
            _ => positive(s).map(Dtick::Linear),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum DtickRepr {
    Number(f64),
    Text(String),
}

impl Serialize for Dtick {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Dtick::Linear(v) => DtickRepr::Number(*v),
            other => DtickRepr::Text(other.to_string()),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Dtick {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = match DtickRepr::deserialize(deserializer)? {
            DtickRepr::Number(v) => number_to_string(v),
            DtickRepr::Text(s) => s,
        };
        s.parse().map_err(serde::de::Error::custom)
    }
}

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
pub enum TickMode {
    #[default]
    Auto,
    Linear,
    Array,
}

/// How precisely tick labels are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum TickRound {
    /// Category and log digit ticks, no rounding.
    None,
    /// Digits past the decimal point.
    Digits(i32),
    Date(DateRound),
}

const ROUND_BASE10: [f64; 3] = [2.0, 5.0, 10.0];
const ROUND_BASE24: [f64; 5] = [1.0, 2.0, 3.0, 6.0, 12.0];
const ROUND_BASE60: [f64; 6] = [1.0, 2.0, 5.0, 10.0, 15.0, 30.0];
const ROUND_DAYS: [f64; 5] = [1.0, 2.0, 3.0, 7.0, 14.0];
/// `log10` of 1-9 (and the 1 of the next decade), slightly widened at the low end.
const ROUND_LOG1: [f64; 11] = [
    -0.046, 0.0, 0.301, 0.477, 0.602, 0.699, 0.778, 0.845, 0.903, 0.954, 1.0,
];
const ROUND_LOG2: [f64; 5] = [-0.301, 0.0, 0.301, 0.699, 1.0];

/// Smallest element of the sorted `set` above `v`, or with `reverse` the largest
/// element at most `v`. Clamps to the ends of the set.
pub fn round_up(v: f64, set: &[f64], reverse: bool) -> f64 {
    let (mut low, mut high) = (0usize, set.len() - 1);
    let mut guard = 0;
    while low < high && guard < 100 {
        guard += 1;
        let mid = if reverse {
            (low + high).div_ceil(2)
        } else {
            (low + high) / 2
        };
        if set[mid] <= v {
            low = if reverse { mid } else { mid + 1 };
        } else {
            high = if reverse { mid - 1 } else { mid };
        }
    }
    set[low]
}

fn round_dtick(rough: f64, base: f64, set: &[f64]) -> f64 {
    base * round_up(rough / base, set, false)
}

fn get_base(rough: f64) -> f64 {
    10f64.powf(rough.log10().floor())
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// `x + d` with the floating-point noise of the addition rounded away.
fn increment(x: f64, d: f64) -> f64 {
    let v = x + d;
    let mag = x.abs().max(d.abs());
    if mag == 0.0 || !v.is_finite() {
        return v;
    }
    let digits = 14 - mag.log10().floor() as i32;
    if (1..=22).contains(&digits) {
        let p = 10f64.powi(digits);
        (v * p).round() / p
    } else {
        v
    }
}

/// The default date `tick0`; day-based ticks start on a Sunday, or a Monday when
/// the tick format shows week numbers.
fn date_tick0(tickformat: Option<&str>, day_ticks: bool) -> f64 {
    if !day_ticks {
        DATE_TICK0
    } else if tickformat.is_some_and(|f| f.contains("%U") || f.contains("%V") || f.contains("%W"))
    {
        DATE_TICK0 + 2.0 * ONEDAY
    } else {
        DATE_TICK0_SUNDAY
    }
}

/// Picks a "nice" tick spacing near `rough` and the matching `tick0`.
pub fn auto_ticks(axis: &mut Axis, rough: f64) {
    let (tick0, dtick) = match axis.axis_type {
        AxisType::Date => {
            let rough_x2 = 2.0 * rough;
            let mut tick0 = date_tick0(None, false);
            let dtick = if rough_x2 > ONEAVGYEAR {
                let years = rough / ONEAVGYEAR;
                let months = 12.0 * round_dtick(years, get_base(years), &ROUND_BASE10);
                Dtick::Months(months.round().max(1.0) as u32)
            } else if rough_x2 > ONEAVGMONTH {
                let months = round_dtick(rough / ONEAVGMONTH, 1.0, &ROUND_BASE24);
                Dtick::Months(months as u32)
            } else if rough_x2 > ONEDAY {
                tick0 = date_tick0(axis.tick_config.tickformat.as_deref(), true);
                Dtick::Linear(round_dtick(rough, ONEDAY, &ROUND_DAYS))
            } else if rough_x2 > ONEHOUR {
                Dtick::Linear(round_dtick(rough, ONEHOUR, &ROUND_BASE24))
            } else if rough_x2 > ONEMIN {
                Dtick::Linear(round_dtick(rough, ONEMIN, &ROUND_BASE60))
            } else if rough_x2 > ONESEC {
                Dtick::Linear(round_dtick(rough, ONESEC, &ROUND_BASE60))
            } else {
                Dtick::Linear(round_dtick(rough, get_base(rough), &ROUND_BASE10))
            };
            (tick0, dtick)
        }
        AxisType::Log => {
            let [r0, r1] = axis.range;
            let dtick = if rough > 0.7 {
                // only powers of 10
                Dtick::Linear(rough.ceil())
            } else if (r1 - r0).abs() < 1.0 {
                // less than a decade, tick linearly in data space
                let nt = 1.5 * ((r1 - r0) / rough).abs();
                let rough = (10f64.powf(r1) - 10f64.powf(r0)).abs() / nt;
                Dtick::LogLinear(round_dtick(rough, get_base(rough), &ROUND_BASE10))
            } else if rough > 0.3 {
                Dtick::LogDigits(DigitSet::TwoFive)
            } else {
                Dtick::LogDigits(DigitSet::All)
            };
            (0.0, dtick)
        }
        AxisType::Category | AxisType::Multicategory => {
            let step = round_dtick(rough, get_base(rough), &ROUND_BASE10);
            (0.0, Dtick::Linear(step.ceil().max(1.0)))
        }
        AxisType::Linear | AxisType::Undetermined => (
            0.0,
            Dtick::Linear(round_dtick(rough, get_base(rough), &ROUND_BASE10)),
        ),
    };

    axis.ticks.tick0 = tick0;
    axis.ticks.dtick = match dtick {
        Dtick::Linear(d) | Dtick::LogLinear(d) if !(d.is_finite() && d > 0.0) => {
            log::warn!("auto dtick for {} came out as {d}, using 1", axis.id);
            Dtick::Linear(1.0)
        }
        _ => dtick,
    };
}

fn increment_months(x: f64, months: i64, reverse: bool) -> f64 {
    increment_month(x, if reverse { months.saturating_neg() } else { months })
}

/// Advances one tick step from `x` (backwards when `reverse`).
pub fn tick_increment(x: f64, dtick: Dtick, reverse: bool) -> f64 {
    let sign = if reverse { -1.0 } else { 1.0 };
    match dtick {
        Dtick::Linear(d) => increment(x, sign * d),
        Dtick::Months(n) => increment_months(x, n as i64, reverse),
        Dtick::LogLinear(d) => (10f64.powf(x) + sign * d).log10(),
        Dtick::LogDigits(set) => {
            let x2 = x + sign * 0.01;
            let frac = round_up(x2.rem_euclid(1.0), set.log_table(), reverse);
            x2.floor() + round1(10f64.powf(frac)).log10()
        }
    }
}

/// Range expanded by a hair so ticks rounding onto the ends survive float error.
fn expanded_range(range: [f64; 2]) -> [f64; 2] {
    let [r0, r1] = range;
    [r0 * 1.0001 - r1 * 0.0001, r1 * 1.0001 - r0 * 0.0001]
}

/// The first tick on the grid at or past the start of the range.
pub fn tick_first(axis: &Axis) -> f64 {
    let reverse = axis.is_reversed();
    let s_round = |v: f64| if reverse { v.floor() } else { v.ceil() };
    let r0 = expanded_range(axis.range)[0];
    let tick0 = axis.ticks.tick0;

    match axis.ticks.dtick {
        Dtick::Linear(d) => {
            let tmin = s_round((r0 - tick0) / d) * d + tick0;
            if axis.axis_type.is_categorical() {
                tmin.clamp(0.0, (axis.categories.len() as f64 - 1.0).max(0.0))
            } else {
                tmin
            }
        }
        Dtick::Months(n) => {
            let mut t0 = tick0;
            for _ in 0..10 {
                let t1 = increment_months(t0, n as i64, reverse);
                if (t1 - r0) * (t0 - r0) <= 0.0 {
                    return if reverse { t0.min(t1) } else { t0.max(t1) };
                }
                let mult = (r0 - (t0 + t1) / 2.0) / (t1 - t0);
                let steps = (mult.round().abs() as i64).max(1);
                t0 = increment_months(
                    t0,
                    steps.saturating_mul(n as i64),
                    if mult < 0.0 { !reverse } else { reverse },
                );
            }
            log::warn!("tick_first did not converge for {}", axis.id);
            t0
        }
        Dtick::LogLinear(d) => (s_round((10f64.powf(r0) - tick0) / d) * d + tick0).log10(),
        Dtick::LogDigits(set) => {
            let frac = round_up(r0.rem_euclid(1.0), set.log_table(), reverse);
            r0.floor() + round1(10f64.powf(frac)).log10()
        }
    }
}

pub(crate) fn is_si_format(format: Option<ExponentFormat>) -> bool {
    matches!(format, Some(ExponentFormat::Si | ExponentFormat::B))
}

pub(crate) fn beyond_si(exponent: i32) -> bool {
    !(-15..=14).contains(&exponent)
}

/// Label digits past the decimal point for a numeric step `dtick`, and the common
/// exponent for values up to `maxend` (0 when none is pulled out). A `None` format
/// means exponents are hidden.
pub(crate) fn numeric_tick_round(
    dtick: f64,
    maxend: f64,
    min_exponent: i32,
    format: Option<ExponentFormat>,
) -> (i32, i32) {
    let tickround = 2 - (dtick.log10() + 0.01).floor() as i32;
    let range_exp = (maxend.log10() + 0.01).floor();
    if !range_exp.is_finite() || range_exp.abs() <= min_exponent as f64 {
        return (tickround, 0);
    }
    let range_exp = range_exp as i32;
    let exponent = if is_si_format(format) && !beyond_si(range_exp) {
        3 * ((range_exp - 1) as f64 / 3.0).round() as i32
    } else {
        range_exp
    };
    (tickround, exponent)
}

fn date_str_len(axis: &Axis, ms: f64) -> usize {
    match axis.l2r(ms) {
        Datum::Text(s) => s.trim_start_matches('-').len(),
        _ => 0,
    }
}

/// Derives the label precision and the common exponent for the current tick grid.
pub fn auto_tick_round(axis: &mut Axis) {
    let dtick = axis.ticks.dtick;
    axis.ticks.tick_exponent = 0;

    axis.ticks.tickround = match (axis.axis_type, dtick) {
        (AxisType::Category | AxisType::Multicategory, _) => TickRound::None,
        (AxisType::Date, Dtick::Months(n)) => {
            let tick0 = match axis.l2r(axis.ticks.tick0) {
                Datum::Text(s) => s.trim_start_matches('-').to_string(),
                _ => String::new(),
            };
            let round = if tick0.len() > 10 || tick0.get(5..) != Some("01-01") {
                DateRound::Day
            } else if n % 12 == 0 {
                DateRound::Year
            } else {
                DateRound::Month
            };
            TickRound::Date(round)
        }
        (AxisType::Date, _) => {
            let d = dtick.as_linear().unwrap_or(1.0);
            let tick0_len = date_str_len(axis, axis.ticks.tick0);
            let round = if (d >= ONEDAY && tick0_len <= 10) || d >= 15.0 * ONEDAY {
                DateRound::Day
            } else if (d >= ONEMIN && tick0_len <= 16) || d >= ONEHOUR {
                DateRound::Minute
            } else if (d >= ONESEC && tick0_len <= 19) || d >= ONEMIN {
                DateRound::Second
            } else {
                let tick1_len = date_str_len(axis, axis.ticks.tick0 + d);
                let digits = tick0_len.max(tick1_len) as i64 - 20;
                DateRound::Fraction(if digits < 0 { 4 } else { digits.min(4) as u8 })
            };
            TickRound::Date(round)
        }
        (_, Dtick::Linear(d) | Dtick::LogLinear(d)) => {
            let [r0, r1] = axis.range.map(|r| axis.l2c(r));
            let config = &axis.tick_config;
            let (tickround, exponent) = numeric_tick_round(
                d,
                r0.abs().max(r1.abs()),
                config.min_exponent,
                Some(config.exponent_format),
            );
            axis.ticks.tick_exponent = exponent;
            TickRound::Digits(tickround)
        }
        _ => TickRound::None,
    };
}

/// Resolves `tick0`/`dtick` for the current range (auto or from the config) and
/// the label rounding that goes with them.
pub fn prep_ticks(axis: &mut Axis) {
    let config = &axis.tick_config;
    if config.mode == TickMode::Auto || config.dtick.is_none() {
        let length = axis.scale.length;
        let mut nt = if config.nticks > 0 {
            config.nticks as f64
        } else if axis.axis_type.is_categorical() {
            length / (config.font_size * 1.2).max(15.0)
        } else {
            let min_px = match axis.letter() {
                AxisLetter::Y => 40.0,
                AxisLetter::X => 80.0,
            };
            (length / min_px).clamp(4.0, 9.0) + 1.0
        };
        // array ticks only use the spacing for label precision
        if config.mode == TickMode::Array {
            nt *= 100.0;
        }
        let [r0, r1] = axis.range;
        auto_ticks(axis, (r1 - r0).abs() / nt);
    } else if let Some(dtick) = config.dtick {
        axis.ticks.dtick = dtick;
        axis.ticks.tick0 = config.tick0.unwrap_or(match axis.axis_type {
            AxisType::Date => DATE_TICK0,
            _ => 0.0,
        });
    }

    // stay above the precision date ticks can be rendered at
    if axis.axis_type == AxisType::Date {
        if let Dtick::Linear(d) = axis.ticks.dtick {
            if d < 0.1 {
                axis.ticks.dtick = Dtick::Linear(0.1);
            }
        }
    }

    auto_tick_round(axis);
}

/// Linearized position of a `tickvals` entry; category axes accept labels or indices.
pub(crate) fn tickval_to_l(axis: &Axis, val: &Datum) -> Option<f64> {
    if axis.axis_type.is_categorical() {
        axis.lookup_category(val).or_else(|| to_number(val))
    } else {
        axis.d2l(val)
    }
}

fn array_ticks(axis: &mut Axis) -> Result<Vec<TickLabel>, AxisError> {
    let [e0, e1] = expanded_range(axis.range);
    let (tick_min, tick_max) = (e0.min(e1), e0.max(e1));

    // array ticks on log axes show the full number
    if axis.axis_type == AxisType::Log && !matches!(axis.ticks.dtick, Dtick::LogLinear(_)) {
        let low = axis.range[0].min(axis.range[1]).floor();
        axis.ticks.dtick = Dtick::LogLinear(10f64.powf(low - 1.0));
    }

    let config = &axis.tick_config;
    let mut out = vec![];
    for (i, val) in config.tickvals.iter().enumerate() {
        let Some(vali) = tickval_to_l(axis, val).filter(|v| *v > tick_min && *v < tick_max) else {
            continue;
        };
        let label = match config.ticktext.get(i) {
            Some(text) => tick_label_with_text(axis, vali, text.clone()),
            None => tick_text_in_walk(axis, vali, &mut None)?,
        };
        out.push(label);
    }

    axis.ticks.tmin = out.first().map(|t| t.x);
    axis.ticks.tmax = out.last().map(|t| t.x);
    Ok(out)
}

/// Enumerates the ticks across the current range, with their labels.
///
/// The walk is capped at 1000 ticks and stops early if a step fails to advance.
pub fn calc_ticks(axis: &mut Axis) -> Result<Vec<TickLabel>, AxisError> {
    prep_ticks(axis);

    if axis.tick_config.mode == TickMode::Array {
        return array_ticks(axis);
    }

    let reverse = axis.is_reversed();
    let mut end_tick = expanded_range(axis.range)[1];
    let tmin = tick_first(axis);
    axis.ticks.tmin = Some(tmin);
    axis.ticks.tmax = None;

    if (reverse && tmin < end_tick) || (!reverse && tmin > end_tick) {
        return Ok(vec![]);
    }

    if axis.axis_type.is_categorical() {
        let last = axis.categories.len() as f64 - 0.5;
        end_tick = if reverse {
            end_tick.max(-0.5)
        } else {
            end_tick.min(last)
        };
    }

    let dtick = axis.ticks.dtick;
    let mut values = vec![];
    let mut x = tmin;
    let mut prev = None;
    while if reverse { x >= end_tick } else { x <= end_tick } {
        if values.len() >= MAX_TICKS {
            log::warn!("tick walk on {} stopped at {MAX_TICKS} ticks", axis.id);
            break;
        }
        if prev == Some(x) {
            break;
        }
        values.push(x);
        prev = Some(x);
        x = tick_increment(x, dtick, reverse);
    }
    if axis.axis_type == AxisType::Date {
        values.retain(|v| *v >= *MIN_MS && *v <= *MAX_MS);
    }
    axis.ticks.tmax = values.last().copied();

    let axis: &Axis = axis;
    let mut date_head = Some(String::new());
    values
        .into_iter()
        .map(|x| tick_text_in_walk(axis, x, &mut date_head))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::PlotSize;
    use crate::dates::parse_date_str;
    use crate::registry::AxisId;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    fn axis(axis_type: AxisType, range: [f64; 2]) -> Axis {
        let mut axis = Axis::new(AxisId::new(AxisLetter::X, 1), axis_type);
        axis.range = range;
        axis.set_scale(&PlotSize {
            l: 0.0,
            t: 0.0,
            w: 400.0,
            h: 400.0,
        })
        .unwrap();
        axis
    }

    #[rstest]
    #[case(1.5, false, 2.0)]
    #[case(2.0, false, 5.0)]
    #[case(2.1, false, 5.0)]
    #[case(11.0, false, 10.0)]
    #[case(4.0, true, 2.0)]
    #[case(5.0, true, 5.0)]
    fn test_round_up(#[case] v: f64, #[case] reverse: bool, #[case] expected: f64) {
        assert_eq!(round_up(v, &ROUND_BASE10, reverse), expected);
    }

    #[rstest]
    #[case(27.0, 50.0)]
    #[case(0.27, 0.5)]
    #[case(1.0, 2.0)]
    #[case(0.9, 1.0)]
    #[case(600.0, 1000.0)]
    fn test_linear_auto_ticks(#[case] rough: f64, #[case] expected: f64) {
        let mut axis = axis(AxisType::Linear, [0.0, 100.0]);
        auto_ticks(&mut axis, rough);
        assert_approx_eq!(f64, axis.ticks.dtick.as_linear().unwrap(), expected);
        assert_eq!(axis.ticks.tick0, 0.0);
    }

    #[test]
    fn test_zero_rough_spacing_gives_unit_dtick() {
        let mut axis = axis(AxisType::Linear, [0.0, 100.0]);
        auto_ticks(&mut axis, 0.0);
        assert_eq!(axis.ticks.dtick, Dtick::Linear(1.0));
    }

    #[test]
    fn test_log_auto_ticks() {
        let mut log = axis(AxisType::Log, [0.0, 5.0]);
        auto_ticks(&mut log, 1.2);
        assert_eq!(log.ticks.dtick, Dtick::Linear(2.0));
        auto_ticks(&mut log, 0.5);
        assert_eq!(log.ticks.dtick, Dtick::LogDigits(DigitSet::TwoFive));
        auto_ticks(&mut log, 0.2);
        assert_eq!(log.ticks.dtick, Dtick::LogDigits(DigitSet::All));

        // 10..50 is under a decade
        let mut short = axis(AxisType::Log, [1.0, 50f64.log10()]);
        auto_ticks(&mut short, 0.1);
        assert!(matches!(short.ticks.dtick, Dtick::LogLinear(_)));
    }

    #[test]
    fn test_date_auto_ticks() {
        let mut date = axis(AxisType::Date, [0.0, ONEAVGYEAR]);
        auto_ticks(&mut date, 1.5 * ONEAVGMONTH);
        assert_eq!(date.ticks.dtick, Dtick::Months(2));
        assert_eq!(date.ticks.tick0, DATE_TICK0);

        auto_ticks(&mut date, 3.0 * ONEAVGYEAR);
        assert_eq!(date.ticks.dtick, Dtick::Months(60));

        auto_ticks(&mut date, 1.5 * ONEDAY);
        assert_eq!(date.ticks.dtick, Dtick::Linear(2.0 * ONEDAY));
        assert_eq!(date.ticks.tick0, DATE_TICK0_SUNDAY);

        auto_ticks(&mut date, 40.0 * ONEMIN);
        assert_eq!(date.ticks.dtick, Dtick::Linear(ONEHOUR));

        auto_ticks(&mut date, 0.004 * ONESEC);
        assert_eq!(date.ticks.dtick, Dtick::Linear(5.0));
    }

    #[test]
    fn test_category_auto_ticks() {
        let mut cat = axis(AxisType::Category, [-0.5, 2.5]);
        auto_ticks(&mut cat, 0.3);
        assert_eq!(cat.ticks.dtick, Dtick::Linear(1.0));
        auto_ticks(&mut cat, 3.0);
        assert_eq!(cat.ticks.dtick, Dtick::Linear(5.0));
    }

    #[test]
    fn test_month_increments_follow_calendar() {
        let start = parse_date_str("2001-01-31").unwrap();
        let mut x = start;
        for _ in 0..4 {
            x = tick_increment(x, Dtick::Months(3), false);
        }
        assert_eq!(x, parse_date_str("2002-01-31").unwrap());
        assert_eq!(tick_increment(x, Dtick::Months(12), true), start);
    }

    #[test]
    fn test_huge_month_step_ends_the_walk() {
        let start = parse_date_str("2000-01-01").unwrap();
        assert!(tick_increment(start, Dtick::Months(2_147_480_000), false).is_nan());
        assert!(tick_increment(start, Dtick::Months(u32::MAX), true).is_nan());

        let mut date = axis(AxisType::Date, [0.0, ONEAVGYEAR]);
        date.tick_config.mode = TickMode::Linear;
        date.tick_config.dtick = Some(Dtick::Months(2_147_480_000));
        let ticks = calc_ticks(&mut date).unwrap();
        assert!(ticks.len() <= 1);
    }

    #[test]
    fn test_digit_increments() {
        let mut x = 0.0;
        let mut seen = vec![];
        for _ in 0..3 {
            x = tick_increment(x, Dtick::LogDigits(DigitSet::TwoFive), false);
            seen.push(10f64.powf(x));
        }
        assert_approx_eq!(f64, seen[0], 2.0, epsilon = 1e-9);
        assert_approx_eq!(f64, seen[1], 5.0, epsilon = 1e-9);
        assert_approx_eq!(f64, seen[2], 10.0, epsilon = 1e-9);

        let back = tick_increment(1.0, Dtick::LogDigits(DigitSet::All), true);
        assert_approx_eq!(f64, 10f64.powf(back), 9.0, epsilon = 1e-9);
    }

    #[test]
    fn test_increment_removes_float_noise() {
        assert_eq!(tick_increment(0.1, Dtick::Linear(0.2), false), 0.3);
        assert_eq!(tick_increment(0.7, Dtick::Linear(0.1), true), 0.6);
    }

    #[test]
    fn test_tick_first() {
        let mut lin = axis(AxisType::Linear, [0.3, 10.0]);
        lin.ticks.dtick = Dtick::Linear(2.0);
        assert_eq!(tick_first(&lin), 2.0);

        lin.range = [10.0, 0.3];
        assert_eq!(tick_first(&lin), 10.0);

        let mut cat = axis(AxisType::Category, [-5.0, 2.0]);
        cat.categories.insert(crate::axis::Category::Label("a".to_string()));
        cat.ticks.dtick = Dtick::Linear(1.0);
        assert_eq!(tick_first(&cat), 0.0);

        let mut date = axis(
            AxisType::Date,
            [parse_date_str("2003-05-20").unwrap(), parse_date_str("2004-01-01").unwrap()],
        );
        date.ticks.tick0 = DATE_TICK0;
        date.ticks.dtick = Dtick::Months(3);
        assert_eq!(tick_first(&date), parse_date_str("2003-07-01").unwrap());
    }

    #[test]
    fn test_dtick_strings() {
        assert_eq!("M3".parse::<Dtick>().unwrap(), Dtick::Months(3));
        assert_eq!("L0.5".parse::<Dtick>().unwrap(), Dtick::LogLinear(0.5));
        assert_eq!("D2".parse::<Dtick>().unwrap(), Dtick::LogDigits(DigitSet::TwoFive));
        assert_eq!("5".parse::<Dtick>().unwrap(), Dtick::Linear(5.0));
        assert!(matches!("X4".parse::<Dtick>(), Err(AxisError::InvalidDtick(_))));
        assert!("0".parse::<Dtick>().is_err());
        assert!("M0".parse::<Dtick>().is_err());

        let parsed: Vec<Dtick> = serde_json::from_str(r#"[2, "M12", "D1"]"#).unwrap();
        assert_eq!(
            parsed,
            vec![Dtick::Linear(2.0), Dtick::Months(12), Dtick::LogDigits(DigitSet::All)]
        );
        assert_eq!(serde_json::to_string(&Dtick::LogLinear(2.0)).unwrap(), "\"L2\"");
    }

    #[test]
    fn test_auto_tick_round() {
        let mut lin = axis(AxisType::Linear, [0.0, 20000.0]);
        lin.ticks.dtick = Dtick::Linear(5000.0);
        auto_tick_round(&mut lin);
        assert_eq!(lin.ticks.tickround, TickRound::Digits(-1));
        assert_eq!(lin.ticks.tick_exponent, 3);

        lin.range = [0.0, 1.0];
        lin.ticks.dtick = Dtick::Linear(0.2);
        auto_tick_round(&mut lin);
        assert_eq!(lin.ticks.tickround, TickRound::Digits(3));
        assert_eq!(lin.ticks.tick_exponent, 0);

        let mut date = axis(AxisType::Date, [0.0, ONEAVGYEAR]);
        date.ticks.tick0 = DATE_TICK0;
        date.ticks.dtick = Dtick::Months(12);
        auto_tick_round(&mut date);
        assert_eq!(date.ticks.tickround, TickRound::Date(DateRound::Year));
        date.ticks.dtick = Dtick::Months(3);
        auto_tick_round(&mut date);
        assert_eq!(date.ticks.tickround, TickRound::Date(DateRound::Month));
        date.ticks.dtick = Dtick::Linear(ONEHOUR);
        auto_tick_round(&mut date);
        assert_eq!(date.ticks.tickround, TickRound::Date(DateRound::Minute));
        date.ticks.dtick = Dtick::Linear(100.0);
        auto_tick_round(&mut date);
        assert_eq!(date.ticks.tickround, TickRound::Date(DateRound::Fraction(1)));
    }

    #[test]
    fn test_calc_ticks_linear() {
        let mut lin = axis(AxisType::Linear, [-0.5, 10.5]);
        let ticks = calc_ticks(&mut lin).unwrap();
        let values: Vec<f64> = ticks.iter().map(|t| t.x).collect();
        assert_eq!(values, vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(ticks[1].text, "2");
        assert_eq!(lin.ticks.tmin, Some(0.0));
        assert_eq!(lin.ticks.tmax, Some(10.0));
    }

    #[test]
    fn test_calc_ticks_is_bounded() {
        let mut lin = axis(AxisType::Linear, [0.0, 1e6]);
        lin.tick_config.mode = TickMode::Linear;
        lin.tick_config.dtick = Some(Dtick::Linear(1.0));
        let ticks = calc_ticks(&mut lin).unwrap();
        assert_eq!(ticks.len(), MAX_TICKS);
    }

    #[test]
    fn test_calc_ticks_categories() {
        let mut cat = axis(AxisType::Category, [-0.5, 2.5]);
        cat.make_calcdata(&["a".into(), "b".into(), "c".into()]);
        let ticks = calc_ticks(&mut cat).unwrap();
        let text: Vec<&str> = ticks.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(text, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_array_ticks() {
        let mut lin = axis(AxisType::Linear, [0.0, 10.0]);
        lin.tick_config.mode = TickMode::Array;
        lin.tick_config.tickvals = vec![1.into(), 5.into(), 20.into()];
        lin.tick_config.ticktext = vec!["one".to_string()];
        let ticks = calc_ticks(&mut lin).unwrap();
        assert_eq!(ticks.len(), 2);
        assert_eq!(ticks[0].text, "one");
        assert_eq!(ticks[1].text, "5");
    }
}
