//! Tick and hover label text.
//!
//! [`tick_text`] renders a single value the way the axis labels its ticks: numbers
//! rounded to the tick precision with an optional common exponent, dates with a
//! "head" line carrying the coarser date context, category labels, and the
//! configured prefix/suffix.

pub mod d3;

use serde::{Deserialize, Serialize};

use crate::axis::{Axis, Category};
use crate::classify::AxisType;
use crate::constants::MINUS_SIGN;
use crate::dates::{format_date, DateRound};
use crate::datum::number_to_string;
use crate::error::AxisError;
use crate::registry::AxisLetter;
use crate::ticks::{
    beyond_si, is_si_format, numeric_tick_round, tickval_to_l, DigitSet, Dtick, TickMode,
    TickRound,
};

use self::d3::NumberFormat;

const SI_PREFIXES: [&str; 10] = ["f", "p", "n", "μ", "m", "", "k", "M", "G", "T"];

/// How a common exponent is written.
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
pub enum ExponentFormat {
    /// Plain digits, no exponent.
    #[serde(rename = "none")]
    #[strum(serialize = "none")]
    None,
    /// `1.2e+6`
    #[serde(rename = "e")]
    #[strum(serialize = "e")]
    LowerE,
    /// `1.2E+6`
    #[serde(rename = "E")]
    #[strum(serialize = "E")]
    UpperE,
    /// `1.2×10^6`
    #[serde(rename = "power")]
    #[strum(serialize = "power")]
    Power,
    /// `1.2M`
    #[serde(rename = "SI")]
    #[strum(serialize = "SI")]
    Si,
    /// Like SI, with `B` instead of `G` for 10^9.
    #[default]
    #[serde(rename = "B")]
    #[strum(serialize = "B")]
    B,
}

impl ExponentFormat {
    fn marker(&self) -> Option<char> {
        match self {
            ExponentFormat::LowerE => Some('e'),
            ExponentFormat::UpperE => Some('E'),
            _ => None,
        }
    }
}

/// Which ticks show a prefix, suffix or exponent.
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
pub enum ShowAttr {
    #[default]
    All,
    First,
    Last,
    None,
}

/// A positioned, styled tick label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickLabel {
    /// Linearized tick position.
    pub x: f64,
    pub dx: f64,
    pub dy: f64,
    pub text: String,
    /// Outer level of a multicategory tick.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text2: Option<String>,
    pub font_size: f64,
    pub font_family: String,
    pub font_color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExponentDisplay {
    /// Hover labels always carry their exponent.
    Never,
    Hidden,
    Shown,
}

pub(crate) fn tick_label_with_text(axis: &Axis, x: f64, text: String) -> TickLabel {
    let config = &axis.tick_config;
    TickLabel {
        x,
        dx: 0.0,
        dy: 0.0,
        text,
        text2: None,
        font_size: config.font_size,
        font_family: config.font_family.clone(),
        font_color: config.font_color.clone(),
    }
}

/// Formats the linearized value `x` as a tick label, or as a hover label with
/// extra precision when `hover` is set.
pub fn tick_text(axis: &Axis, x: f64, hover: bool) -> Result<TickLabel, AxisError> {
    tick_text_impl(axis, x, hover, &mut None)
}

/// Tick label inside a tick walk: the date head is appended only when it differs
/// from the previous tick's, tracked through `date_head`. `None` always appends it.
pub(crate) fn tick_text_in_walk(
    axis: &Axis,
    x: f64,
    date_head: &mut Option<String>,
) -> Result<TickLabel, AxisError> {
    tick_text_impl(axis, x, false, date_head)
}

fn tick_text_impl(
    axis: &Axis,
    x: f64,
    hover: bool,
    date_head: &mut Option<String>,
) -> Result<TickLabel, AxisError> {
    let config = &axis.tick_config;
    let mut out = tick_label_with_text(axis, x, String::new());
    let array_mode = config.mode == TickMode::Array;
    let extra_precision = hover || array_mode;

    if array_mode {
        if let Some(text) = array_tick_text(axis, x) {
            out.text = text;
            return Ok(out);
        }
    }

    let is_hidden = |show: ShowAttr| {
        if hover {
            return show == ShowAttr::None;
        }
        match show {
            ShowAttr::All => false,
            ShowAttr::First => axis.ticks.tmin != Some(x),
            ShowAttr::Last => axis.ticks.tmax != Some(x),
            ShowAttr::None => true,
        }
    };

    let exponent = if hover {
        ExponentDisplay::Never
    } else if config.exponent_format != ExponentFormat::None && is_hidden(config.show_exponent) {
        ExponentDisplay::Hidden
    } else {
        ExponentDisplay::Shown
    };

    match axis.axis_type {
        AxisType::Date => format_date_tick(axis, &mut out, hover, extra_precision, date_head)?,
        AxisType::Log => format_log(axis, &mut out, extra_precision, exponent)?,
        AxisType::Category => format_category(axis, &mut out),
        AxisType::Multicategory => format_multicategory(axis, &mut out, hover),
        AxisType::Linear | AxisType::Undetermined => {
            format_linear(axis, &mut out, extra_precision, exponent)?
        }
    }

    if !config.prefix.is_empty() && !is_hidden(config.show_prefix) {
        out.text.insert_str(0, &config.prefix);
    }
    if !config.suffix.is_empty() && !is_hidden(config.show_suffix) {
        out.text.push_str(&config.suffix);
    }
    Ok(out)
}

/// The `ticktext` entry of the `tickvals` entry at `x`, if any.
fn array_tick_text(axis: &Axis, x: f64) -> Option<String> {
    let config = &axis.tick_config;
    let min_diff = (axis.range[1] - axis.range[0]).abs() / 10000.0;
    config
        .tickvals
        .iter()
        .zip(&config.ticktext)
        .find(|(val, _)| tickval_to_l(axis, val).is_some_and(|v| (x - v).abs() < min_diff))
        .map(|(_, text)| text.clone())
}

fn format_date_tick(
    axis: &Axis,
    out: &mut TickLabel,
    hover: bool,
    extra_precision: bool,
    date_head: &mut Option<String>,
) -> Result<(), AxisError> {
    let config = &axis.tick_config;
    let fmt = match (hover, &config.hoverformat) {
        (true, Some(fmt)) => Some(fmt.as_str()),
        _ => config.tickformat.as_deref(),
    };
    let mut tr = match axis.ticks.tickround {
        TickRound::Date(tr) => tr,
        _ => DateRound::Day,
    };
    if extra_precision {
        tr = tr.finer();
    }

    let formatted = format_date(out.x, fmt, tr, &axis.date_formats)?;
    let (mut date_str, mut head) = match formatted.split_once('\n') {
        Some((date, head)) => (date.to_string(), Some(head.to_string())),
        None => (formatted, None),
    };

    if extra_precision {
        // drop a time part that extra precision left at midnight
        match head.take() {
            Some(h) if date_str == "00:00:00" || date_str == "00:00" => date_str = h,
            other => {
                head = other;
                if date_str.len() == 8 {
                    if let Some(trimmed) = date_str.strip_suffix(":00") {
                        date_str = trimmed.to_string();
                    }
                }
            }
        }
    }

    if let Some(head) = head.filter(|h| !h.is_empty()) {
        if hover {
            date_str = if tr == DateRound::Day {
                format!("{date_str}, {head}")
            } else if date_str.is_empty() {
                head
            } else {
                format!("{head}, {date_str}")
            };
        } else {
            match date_head {
                Some(prev) if *prev == head => {}
                Some(prev) => {
                    date_str = format!("{date_str}<br>{head}");
                    *prev = head;
                }
                None => date_str = format!("{date_str}<br>{head}"),
            }
        }
    }

    out.text = date_str;
    Ok(())
}

fn format_log(
    axis: &Axis,
    out: &mut TickLabel,
    extra_precision: bool,
    exponent: ExponentDisplay,
) -> Result<(), AxisError> {
    let config = &axis.tick_config;
    let x = out.x;
    let hide = exponent == ExponentDisplay::Hidden;
    let dtick = match axis.ticks.dtick {
        Dtick::LogLinear(d) => Dtick::LogLinear(d),
        _ if extra_precision => Dtick::LogLinear(3.0),
        other => other,
    };

    match dtick {
        Dtick::LogLinear(_) => {
            out.text = num_format(10f64.powf(x), axis, hide, extra_precision)?;
        }
        _ if config.tickformat.is_some() => {
            out.text = num_format(10f64.powf(x), axis, hide, extra_precision)?;
        }
        Dtick::LogDigits(_) if (x + 0.01).rem_euclid(1.0) >= 0.1 => {
            out.text = number_to_string(10f64.powf(x.rem_euclid(1.0)).round());
            out.font_size *= 0.75;
        }
        Dtick::Linear(_) | Dtick::LogDigits(_) => {
            let p = x.round() as i32;
            let format = config.exponent_format;
            if format == ExponentFormat::Power || (is_si_format(Some(format)) && beyond_si(p)) {
                out.text = match p {
                    0 => "1".to_string(),
                    1 => "10".to_string(),
                    _ if p > 1 => format!("10<sup>{p}</sup>"),
                    _ => format!("10<sup>{MINUS_SIGN}{}</sup>", p.unsigned_abs()),
                };
                out.font_size *= 1.25;
            } else if let Some(marker) = format.marker().filter(|_| p.abs() > 2) {
                let sign = if p > 0 { '+' } else { MINUS_SIGN };
                out.text = format!("1{marker}{sign}{}", p.unsigned_abs());
            } else {
                out.text = num_format(10f64.powf(x), axis, false, true)?;
                if axis.ticks.dtick == Dtick::LogDigits(DigitSet::All)
                    && axis.letter() == AxisLetter::Y
                {
                    out.dy -= out.font_size / 6.0;
                }
            }
        }
        Dtick::Months(_) => return Err(AxisError::InvalidDtick(dtick.to_string())),
    }

    // keep 10s clear of the 9s before them
    if axis.ticks.dtick == Dtick::LogDigits(DigitSet::All) && out.text.starts_with(['0', '1']) {
        match axis.letter() {
            AxisLetter::Y => out.dx -= out.font_size / 4.0,
            AxisLetter::X => {
                let dir = if axis.range[1] > axis.range[0] { 1.0 } else { -1.0 };
                let shift = if x < 0.0 { 0.5 } else { 0.25 };
                out.dy += out.font_size / 2.0;
                out.dx += dir * out.font_size * shift;
            }
        }
    }
    Ok(())
}

fn category_at(axis: &Axis, x: f64) -> Option<&Category> {
    let i = x.round();
    if !i.is_finite() || i < 0.0 {
        return None;
    }
    axis.categories.get_index(i as usize)
}

fn format_category(axis: &Axis, out: &mut TickLabel) {
    out.text = category_at(axis, out.x).map_or_else(String::new, ToString::to_string);
}

fn format_multicategory(axis: &Axis, out: &mut TickLabel, hover: bool) {
    let (outer, inner) = match category_at(axis, out.x) {
        Some(Category::Pair(outer, inner)) => (outer.clone(), inner.clone()),
        Some(Category::Label(label)) => (String::new(), label.clone()),
        None => (String::new(), String::new()),
    };
    if hover {
        out.text = format!("{outer} - {inner}");
    } else {
        out.text = inner;
        out.text2 = Some(outer);
    }
}

fn format_linear(
    axis: &Axis,
    out: &mut TickLabel,
    extra_precision: bool,
    exponent: ExponentDisplay,
) -> Result<(), AxisError> {
    let hide = match exponent {
        ExponentDisplay::Never => false,
        ExponentDisplay::Hidden => true,
        // with every exponent shown, zero still goes without one
        ExponentDisplay::Shown => {
            axis.tick_config.show_exponent == ShowAttr::All
                && axis
                    .ticks
                    .dtick
                    .as_linear()
                    .is_some_and(|d| (out.x / d).abs() < 1e-6)
        }
    };
    out.text = num_format(out.x, axis, hide, extra_precision)?;
    Ok(())
}

/// Renders a number at the axis tick precision.
///
/// With `hover` the precision and exponent are re-derived for this value alone,
/// four digits finer than a tick step of the value's own size.
fn num_format(
    v: f64,
    axis: &Axis,
    hide_exponent: bool,
    hover: bool,
) -> Result<String, AxisError> {
    let config = &axis.tick_config;
    let format = (!hide_exponent).then_some(config.exponent_format);
    let mut tick_round = match axis.ticks.tickround {
        TickRound::Digits(d) => d,
        _ => 0,
    };
    let mut exponent = axis.ticks.tick_exponent;
    let mut tickformat = config.tickformat.as_deref();

    if hover {
        let (dtick, maxend) = if config.show_exponent == ShowAttr::None {
            let [r0, r1] = axis.range.map(|r| axis.l2c(r));
            (axis.ticks.dtick, r0.abs().max(r1.abs()))
        } else {
            let size = if v.is_finite() && v != 0.0 { v.abs() } else { 1.0 };
            (Dtick::Linear(size), size)
        };
        let (round, exp) = match dtick {
            Dtick::Linear(d) | Dtick::LogLinear(d) => {
                numeric_tick_round(d, maxend, config.min_exponent, format)
            }
            _ => (0, 0),
        };
        tick_round = round + 4;
        exponent = exp;
        if config.hoverformat.is_some() {
            tickformat = config.hoverformat.as_deref();
        }
    }

    if let Some(tickformat) = tickformat {
        let formatted = NumberFormat::with_separators(&axis.separators)
            .with_minus(MINUS_SIGN)
            .format(tickformat, v)?;
        return Ok(formatted.replace('-', &MINUS_SIGN.to_string()));
    }

    if format == Some(ExponentFormat::None) {
        exponent = 0;
    }

    // rounding increment
    let e = 10f64.powi(-tick_round) / 2.0;
    let mut is_neg = v < 0.0;
    let abs = v.abs();
    let mut text = if abs < e {
        is_neg = false;
        "0".to_string()
    } else {
        let mut w = abs + e;
        let mut round = tick_round;
        if exponent != 0 {
            w *= 10f64.powi(-exponent);
            round += exponent;
        }
        let digits = if round == 0 {
            w.floor().to_string()
        } else if round < 0 {
            let whole = format!("{:.0}", w.round());
            let keep = (whole.len() as i32 + round).max(0) as usize;
            format!("{}{}", &whole[..keep], "0".repeat(round.unsigned_abs() as usize))
        } else {
            let s = w.to_string();
            match s.find('.') {
                Some(dp) => {
                    let end = (dp + 1 + round as usize).min(s.len());
                    let cut = &s[..end];
                    cut.trim_end_matches('0').trim_end_matches('.').to_string()
                }
                None => s,
            }
        };
        num_separate(&digits, &axis.separators, config.separate_thousands)
    };

    if let (true, Some(mut fmt)) = (exponent != 0, format) {
        if is_si_format(Some(fmt)) && beyond_si(exponent) {
            fmt = ExponentFormat::Power;
        }
        let signed = if exponent < 0 {
            format!("{MINUS_SIGN}{}", exponent.unsigned_abs())
        } else if fmt != ExponentFormat::Power {
            format!("+{exponent}")
        } else {
            exponent.to_string()
        };
        match fmt {
            ExponentFormat::LowerE | ExponentFormat::UpperE => {
                text.push(fmt.marker().unwrap_or('e'));
                text.push_str(&signed);
            }
            ExponentFormat::Power => text.push_str(&format!("×10<sup>{signed}</sup>")),
            ExponentFormat::B if exponent == 9 => text.push('B'),
            ExponentFormat::Si | ExponentFormat::B => {
                if exponent % 3 == 0 {
                    if let Some(prefix) = SI_PREFIXES.get((exponent / 3 + 5) as usize) {
                        text.push_str(prefix);
                    }
                }
            }
            ExponentFormat::None => {}
        }
    }

    if is_neg {
        text.insert(0, MINUS_SIGN);
    }
    Ok(text)
}

/// Applies the decimal point and thousands separator of `separators` to a plain
/// decimal string. Four-digit integers stay unseparated unless
/// `separate_thousands` is set.
pub fn num_separate(value: &str, separators: &str, separate_thousands: bool) -> String {
    let mut chars = separators.chars();
    let decimal = chars.next().unwrap_or('.');
    let thousands = chars.next();
    let (int_part, frac_part) = match value.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (value, None),
    };

    let mut out = String::with_capacity(value.len() + value.len() / 3 + 1);
    match thousands {
        Some(sep) if frac_part.is_some() || int_part.len() > 4 || separate_thousands => {
            let len = int_part.chars().count();
            for (i, c) in int_part.chars().enumerate() {
                if i > 0 && (len - i) % 3 == 0 {
                    out.push(sep);
                }
                out.push(c);
            }
        }
        _ => out.push_str(int_part),
    }
    if let Some(frac_part) = frac_part {
        out.push(decimal);
        out.push_str(frac_part);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::PlotSize;
    use crate::constants::ONEDAY;
    use crate::dates::parse_date_str;
    use crate::datum::Datum;
    use crate::registry::AxisId;
    use crate::ticks::calc_ticks;
    use rstest::rstest;

    fn axis(axis_type: AxisType, range: [f64; 2], dtick: Dtick) -> Axis {
        let mut axis = Axis::new(AxisId::new(AxisLetter::X, 1), axis_type);
        axis.range = range;
        axis.set_scale(&PlotSize::default()).unwrap();
        axis.tick_config.mode = TickMode::Linear;
        axis.tick_config.dtick = Some(dtick);
        crate::ticks::prep_ticks(&mut axis);
        axis
    }

    fn text(axis: &Axis, x: f64) -> String {
        tick_text(axis, x, false).unwrap().text
    }

    #[rstest]
    #[case("1234", ".,", false, "1234")]
    #[case("12345", ".,", false, "12,345")]
    #[case("1234", ".,", true, "1,234")]
    #[case("1234.5", ".,", false, "1,234.5")]
    #[case("1234567.25", ",.", false, "1.234.567,25")]
    #[case("12345", ".", false, "12345")]
    fn test_num_separate(
        #[case] value: &str,
        #[case] separators: &str,
        #[case] thousands: bool,
        #[case] expected: &str,
    ) {
        assert_eq!(num_separate(value, separators, thousands), expected);
    }

    #[test]
    fn test_linear_labels() {
        let lin = axis(AxisType::Linear, [0.0, 10.0], Dtick::Linear(0.5));
        assert_eq!(text(&lin, 2.5), "2.5");
        assert_eq!(text(&lin, 3.0), "3");
        assert_eq!(text(&lin, -1.5), "\u{2212}1.5");
        assert_eq!(text(&lin, 0.0), "0");
    }

    #[rstest]
    #[case(ExponentFormat::B, "15k")]
    #[case(ExponentFormat::Si, "15k")]
    #[case(ExponentFormat::UpperE, "1.5E+4")]
    #[case(ExponentFormat::Power, "1.5×10<sup>4</sup>")]
    #[case(ExponentFormat::None, "15,000")]
    fn test_exponent_formats(#[case] format: ExponentFormat, #[case] expected: &str) {
        let mut lin = axis(AxisType::Linear, [0.0, 20000.0], Dtick::Linear(5000.0));
        lin.tick_config.exponent_format = format;
        crate::ticks::prep_ticks(&mut lin);
        assert_eq!(text(&lin, 15000.0), expected);
        // zero never carries the exponent
        assert_eq!(text(&lin, 0.0), "0");
    }

    #[test]
    fn test_billions_use_b() {
        let lin = axis(AxisType::Linear, [0.0, 5e9], Dtick::Linear(1e9));
        assert_eq!(text(&lin, 2e9), "2B");
    }

    #[test]
    fn test_show_exponent_first() {
        let mut lin = axis(AxisType::Linear, [0.0, 20000.0], Dtick::Linear(5000.0));
        lin.tick_config.show_exponent = ShowAttr::First;
        lin.ticks.tmin = Some(5000.0);
        assert_eq!(text(&lin, 5000.0), "5k");
        assert_eq!(text(&lin, 10000.0), "10");
    }

    #[test]
    fn test_prefix_and_suffix() {
        let mut lin = axis(AxisType::Linear, [0.0, 10.0], Dtick::Linear(1.0));
        lin.tick_config.prefix = "$".to_string();
        lin.tick_config.suffix = " USD".to_string();
        lin.tick_config.show_suffix = ShowAttr::Last;
        lin.ticks.tmax = Some(10.0);
        assert_eq!(text(&lin, 4.0), "$4");
        assert_eq!(text(&lin, 10.0), "$10 USD");
        assert_eq!(tick_text(&lin, 4.0, true).unwrap().text, "$4 USD");
    }

    #[test]
    fn test_hover_adds_precision() {
        let lin = axis(AxisType::Linear, [0.0, 10.0], Dtick::Linear(1.0));
        assert_eq!(text(&lin, 1.23456), "1.23");
        assert_eq!(tick_text(&lin, 1.23456, true).unwrap().text, "1.23456");
    }

    #[test]
    fn test_tickformat_and_hoverformat() {
        let mut lin = axis(AxisType::Linear, [0.0, 1.0], Dtick::Linear(0.2));
        lin.tick_config.tickformat = Some(".0%".to_string());
        lin.tick_config.hoverformat = Some(".2f".to_string());
        assert_eq!(text(&lin, 0.4), "40%");
        assert_eq!(text(&lin, -0.4), "\u{2212}40%");
        assert_eq!(tick_text(&lin, 0.456, true).unwrap().text, "0.46");

        lin.tick_config.tickformat = Some("%Y".to_string());
        assert!(matches!(
            tick_text(&lin, 0.4, false),
            Err(AxisError::InvalidTickFormat { .. })
        ));
    }

    #[test]
    fn test_log_labels() {
        let log = axis(AxisType::Log, [0.0, 6.0], Dtick::Linear(1.0));
        assert_eq!(text(&log, 0.0), "1");
        assert_eq!(text(&log, 2.0), "100");
        assert_eq!(text(&log, 3.0), "1000");
        assert_eq!(text(&log, 4.0), "10k");
        assert_eq!(text(&log, 6.0), "1M");

        let mut power = log.clone();
        power.tick_config.exponent_format = ExponentFormat::Power;
        let label = tick_text(&power, 3.0, false).unwrap();
        assert_eq!(label.text, "10<sup>3</sup>");
        assert_eq!(label.font_size, 15.0);
        assert_eq!(text(&power, -2.0), "10<sup>\u{2212}2</sup>");

        let mut e = log.clone();
        e.tick_config.exponent_format = ExponentFormat::LowerE;
        assert_eq!(text(&e, 4.0), "1e+4");
        assert_eq!(text(&e, 2.0), "100");
    }

    #[test]
    fn test_log_digit_labels() {
        let log = axis(AxisType::Log, [0.0, 2.0], Dtick::LogDigits(DigitSet::TwoFive));
        let minor = tick_text(&log, 5f64.log10(), false).unwrap();
        assert_eq!(minor.text, "5");
        assert_eq!(minor.font_size, 9.0);
        assert_eq!(text(&log, 1.0), "10");

        let d1 = axis(AxisType::Log, [0.0, 2.0], Dtick::LogDigits(DigitSet::All));
        let ten = tick_text(&d1, 1.0, false).unwrap();
        assert_eq!(ten.text, "10");
        assert!(ten.dy > 0.0);
    }

    #[test]
    fn test_months_on_log_axis_is_rejected() {
        let mut log = axis(AxisType::Log, [0.0, 2.0], Dtick::Linear(1.0));
        log.ticks.dtick = Dtick::Months(3);
        assert!(matches!(
            tick_text(&log, 1.0, false),
            Err(AxisError::InvalidDtick(_))
        ));
    }

    #[test]
    fn test_date_head_appears_when_it_changes() {
        let start = parse_date_str("2000-12-30").unwrap();
        let date = axis(
            AxisType::Date,
            [start, start + 5.0 * ONEDAY],
            Dtick::Linear(ONEDAY),
        );
        assert_eq!(date.ticks.tickround, TickRound::Date(DateRound::Day));

        let mut head = Some(String::new());
        let labels: Vec<String> = (0..4)
            .map(|i| {
                tick_text_in_walk(&date, start + i as f64 * ONEDAY, &mut head)
                    .unwrap()
                    .text
            })
            .collect();
        assert_eq!(
            labels,
            vec!["Dec 30<br>2000", "Dec 31", "Jan 1<br>2001", "Jan 2"]
        );

        // outside a walk the head is always there
        assert_eq!(text(&date, start + ONEDAY), "Dec 31<br>2000");
        assert_eq!(tick_text(&date, start, true).unwrap().text, "Dec 30, 2000");
    }

    #[test]
    fn test_date_hover_keeps_time() {
        let start = parse_date_str("2000-01-01").unwrap();
        let date = axis(AxisType::Date, [start, start + ONEDAY], Dtick::Linear(3600000.0));
        let x = parse_date_str("2000-01-01 06:30").unwrap();
        assert_eq!(tick_text(&date, x, true).unwrap().text, "Jan 1, 2000, 06:30");
    }

    #[test]
    fn test_category_labels() {
        let mut cat = axis(AxisType::Category, [-0.5, 1.5], Dtick::Linear(1.0));
        cat.make_calcdata(&["apples".into(), "pears".into()]);
        assert_eq!(text(&cat, 1.0), "pears");
        assert_eq!(text(&cat, 5.0), "");

        let mut multi = axis(AxisType::Multicategory, [-0.5, 1.5], Dtick::Linear(1.0));
        let column: Vec<Datum> = vec![vec!["2020", "2020"].into(), vec!["q1", "q2"].into()];
        multi.setup_multicategory(&[column.as_slice()]);
        let label = tick_text(&multi, 1.0, false).unwrap();
        assert_eq!(label.text, "q2");
        assert_eq!(label.text2.as_deref(), Some("2020"));
        assert_eq!(tick_text(&multi, 1.0, true).unwrap().text, "2020 - q2");
    }

    #[test]
    fn test_array_mode_uses_ticktext() {
        let mut lin = axis(AxisType::Linear, [0.0, 10.0], Dtick::Linear(1.0));
        lin.tick_config.mode = TickMode::Array;
        lin.tick_config.tickvals = vec![2.into(), 4.into()];
        lin.tick_config.ticktext = vec!["two".to_string()];
        assert_eq!(text(&lin, 2.0), "two");
        assert_eq!(text(&lin, 4.0), "4");
    }

    #[test]
    fn test_calc_ticks_labels_dates() {
        let start = parse_date_str("2000-01-01").unwrap();
        let end = parse_date_str("2001-01-01").unwrap();
        let mut date = axis(AxisType::Date, [start, end], Dtick::Months(3));
        let labels: Vec<String> = calc_ticks(&mut date)
            .unwrap()
            .into_iter()
            .map(|t| t.text)
            .collect();
        assert_eq!(
            labels,
            vec!["Jan 2000", "Apr 2000", "Jul 2000", "Oct 2000", "Jan 2001"]
        );
    }
}
