//! d3-style number formatting for explicit `tickformat` / `hoverformat` strings.
//!
//! The general form of a format specifier is:
//!
//! ```text
//! [[fill]align][sign][symbol][0][width][,][.precision][~][type]
//! ```
//!
//! Supported types are `e E f g r s % d b o x X`. Without a type the value is
//! rendered like `~g` with 12 significant digits. The decimal point and the group
//! delimiter come from the layout `separators`, and negative numbers use a
//! configurable minus character.
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::AxisError;

lazy_static! {
    static ref FORMAT_SPEC: Regex =
        Regex::new(r"^(?:(.)?([<>=^]))?([+\- ])?([$#])?(0)?(\d+)?(,)?(\.\d+)?(~)?([A-Za-z%])?$")
            .unwrap();
}

const PREFIXES: [&str; 17] = [
    "y", "z", "a", "f", "p", "n", "µ", "m", "", "k", "M", "G", "T", "P", "E", "Z", "Y",
];

/// Formats numbers according to d3 format specifiers.
#[derive(Debug, Clone)]
pub struct NumberFormat {
    decimal: char,
    group_delimiter: char,
    minus: char,
}

#[derive(Debug)]
struct FormatSpec<'a> {
    fill: &'a str,
    align: &'a str,
    sign: &'a str,
    symbol: &'a str,
    zero: bool,
    width: usize,
    grouping: bool,
    precision: usize,
    trim: bool,
    format_type: &'a str,
}

impl<'a> FormatSpec<'a> {
    fn parse(pattern: &'a str) -> Result<Self, AxisError> {
        let invalid = |reason: &str| AxisError::InvalidTickFormat {
            format: pattern.to_string(),
            reason: reason.to_string(),
        };
        let c = FORMAT_SPEC
            .captures(pattern)
            .ok_or_else(|| invalid("not a number format specifier"))?;
        let text = |i: usize| c.get(i).map(|m| m.as_str());

        let width = match text(6) {
            Some(w) => w.parse().map_err(|_| invalid("width is too large"))?,
            None => 0,
        };
        let precision = match text(8) {
            Some(p) => Some(
                p[1..]
                    .parse::<usize>()
                    .map_err(|_| invalid("precision is too large"))?,
            ),
            None => None,
        };

        let mut spec = Self {
            fill: text(1).unwrap_or(" "),
            align: text(2).unwrap_or(">"),
            sign: text(3).unwrap_or("-"),
            symbol: text(4).unwrap_or(""),
            zero: text(5).is_some(),
            width,
            grouping: text(7).is_some(),
            precision: 6,
            trim: text(9).is_some(),
            format_type: text(10).unwrap_or(""),
        };

        // zero fill pads between the sign and the digits
        if spec.zero || (spec.fill == "0" && spec.align == "=") {
            spec.zero = true;
            spec.fill = "0";
            spec.align = "=";
        }

        spec.precision = match spec.format_type {
            "" => {
                spec.trim = true;
                precision.unwrap_or(12).clamp(1, 21)
            }
            "g" | "r" | "s" => precision.unwrap_or(6).clamp(1, 21),
            "e" | "E" | "f" | "%" => precision.unwrap_or(6).min(20),
            "d" | "b" | "o" | "x" | "X" => 0,
            other => return Err(invalid(&format!("unknown format type `{other}`"))),
        };
        Ok(spec)
    }
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self::new()
    }
}

impl NumberFormat {
    pub fn new() -> Self {
        Self {
            decimal: '.',
            group_delimiter: ',',
            minus: '-',
        }
    }

    /// Builds a formatter from a layout `separators` string: the first character is
    /// the decimal point, the second the group delimiter.
    pub fn with_separators(separators: &str) -> Self {
        let mut chars = separators.chars();
        let decimal = chars.next().unwrap_or('.');
        let group_delimiter = chars.next().unwrap_or(',');
        Self {
            decimal,
            group_delimiter,
            minus: '-',
        }
    }

    pub fn with_minus(mut self, minus: char) -> Self {
        self.minus = minus;
        self
    }

    /// Splits `value` into the digits of its `significant_digits` leading
    /// significant figures and the decimal exponent of the first one, so
    /// `1.23` with 2 digits gives `("12", 0)`.
    fn decompose(value: f64, significant_digits: usize) -> (String, i32) {
        let precision = significant_digits.saturating_sub(1);
        let formatted = format!("{value:.precision$e}");
        let (mantissa, exponent) = formatted.split_once('e').unwrap_or((&formatted, "0"));
        let exponent = exponent.parse().unwrap_or(0);
        (mantissa.replace('.', ""), exponent)
    }

    /// Digits of `coefficient` placed so the first one sits at `10^exponent`.
    fn place_digits(coefficient: &str, exponent: i32) -> String {
        let i = exponent + 1;
        let n = coefficient.len() as i32;
        if i >= n {
            format!("{coefficient}{}", "0".repeat((i - n) as usize))
        } else if i > 0 {
            format!("{}.{}", &coefficient[..i as usize], &coefficient[i as usize..])
        } else {
            format!("0.{}{coefficient}", "0".repeat(i.unsigned_abs() as usize))
        }
    }

    /// Scales the value into the range of an SI prefix and returns the prefix.
    fn format_si_prefix(value: f64, precision: usize) -> (String, &'static str) {
        let (coefficient, exponent) = Self::decompose(value, precision);
        let prefix_exponent = (exponent as f64 / 3.0).floor().clamp(-8.0, 8.0) as i32;
        let digits = Self::place_digits(&coefficient, exponent - prefix_exponent * 3);
        (digits, PREFIXES[(8 + prefix_exponent) as usize])
    }

    /// Exponent notation with an explicit exponent sign, as in `1.5e+3`.
    fn format_exponent(value: f64, precision: usize, marker: &str) -> String {
        let formatted = format!("{value:.precision$e}");
        let (mantissa, exponent) = formatted.split_once('e').unwrap_or((&formatted, "0"));
        match exponent.strip_prefix('-') {
            Some(abs) => format!("{mantissa}{marker}-{abs}"),
            None => format!("{mantissa}{marker}+{exponent}"),
        }
    }

    /// `precision` significant digits, switching to exponent notation for very
    /// large or small values.
    fn format_general(value: f64, precision: usize) -> String {
        if value == 0.0 {
            return format!("{:.*}", precision - 1, 0.0);
        }
        let (_, exponent) = Self::decompose(value, precision);
        if exponent < -6 || exponent >= precision as i32 {
            Self::format_exponent(value, precision - 1, "e")
        } else {
            format!("{:.*}", (precision as i32 - 1 - exponent).max(0) as usize, value)
        }
    }

    /// Drops insignificant trailing zeros of the mantissa.
    fn trim_insignificant(value: &str) -> String {
        let end = value
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(value.len());
        let (mantissa, rest) = value.split_at(end);
        if !mantissa.contains('.') {
            return value.to_string();
        }
        let trimmed = mantissa.trim_end_matches('0').trim_end_matches('.');
        format!("{trimmed}{rest}")
    }

    /// Groups the digits of `value` by three.
    ///
    /// With `width > 0` the result is cut down to `width` characters, keeping a
    /// leading digit rather than a leading delimiter.
    fn group_value(&self, value: &str, width: usize) -> String {
        let digits: Vec<char> = value.chars().rev().collect();
        let mut grouped: Vec<char> = Vec::with_capacity(digits.len() * 4 / 3 + 1);
        for (i, group) in digits.chunks(3).enumerate() {
            if i > 0 {
                grouped.push(self.group_delimiter);
            }
            grouped.extend_from_slice(group);
        }

        if width > 0 && grouped.len() > width {
            let keep = if grouped[width - 1] == self.group_delimiter {
                width + 1
            } else {
                width
            };
            grouped.truncate(keep);
        }
        grouped.into_iter().rev().collect()
    }

    /// Formats `input` according to the d3 format specifier `pattern`.
    pub fn format(&self, pattern: &str, input: f64) -> Result<String, AxisError> {
        let spec = FormatSpec::parse(pattern)?;
        let abs = input.abs();
        let mut value_is_negative = input < 0.0 || (input == 0.0 && input.is_sign_negative());

        let mut si_prefix = "";
        let unit = if spec.format_type == "%" { "%" } else { "" };

        let mut value = match spec.format_type {
            "%" => format!("{:.*}", spec.precision, abs * 100.0),
            "f" => format!("{:.*}", spec.precision, abs),
            "e" | "E" => Self::format_exponent(abs, spec.precision, spec.format_type),
            "g" | "" => Self::format_general(abs, spec.precision),
            "r" => {
                let (coefficient, exponent) = Self::decompose(abs, spec.precision);
                Self::place_digits(&coefficient, exponent)
            }
            "s" => {
                let (digits, prefix) = Self::format_si_prefix(abs, spec.precision);
                si_prefix = prefix;
                digits
            }
            "b" => format!("{:b}", abs.round() as u64),
            "o" => format!("{:o}", abs.round() as u64),
            "x" => format!("{:x}", abs.round() as u64),
            "X" => format!("{:X}", abs.round() as u64),
            _ => format!("{:.0}", abs.round()),
        };

        if spec.trim {
            value = Self::trim_insignificant(&value);
        }

        // a negative value that rounds to zero loses its sign unless one is forced
        let mantissa_is_zero = value
            .chars()
            .take_while(|c| !matches!(c, 'e' | 'E'))
            .all(|c| !c.is_ascii_digit() || c == '0');
        if value_is_negative && mantissa_is_zero && spec.sign != "+" {
            value_is_negative = false;
        }

        let sign_prefix = if value_is_negative {
            self.minus.to_string()
        } else {
            match spec.sign {
                "+" => "+".to_string(),
                " " => " ".to_string(),
                _ => String::new(),
            }
        };

        let leading_part = match (spec.symbol, spec.format_type) {
            ("#", "b") => "0b",
            ("#", "o") => "0o",
            ("#", "x" | "X") => "0x",
            ("$", _) => "$",
            _ => "",
        };

        // split off everything after the integer digits, localizing the decimal point
        let split = value
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(value.len());
        let decimal_part: String = value[split..]
            .chars()
            .map(|c| if c == '.' { self.decimal } else { c })
            .collect();
        value.truncate(split);

        let prefix = format!("{sign_prefix}{leading_part}");
        let suffix = format!("{decimal_part}{si_prefix}{unit}");

        if spec.grouping && !spec.zero {
            value = self.group_value(&value, 0);
        }

        let length = prefix.chars().count() + value.chars().count() + suffix.chars().count();
        let mut pad_count = spec.width.saturating_sub(length);

        // zero fill is grouped together with the digits
        if spec.grouping && spec.zero {
            let padded = format!("{}{value}", "0".repeat(pad_count));
            let width = if pad_count > 0 {
                spec.width.saturating_sub(prefix.chars().count() + suffix.chars().count())
            } else {
                0
            };
            value = self.group_value(&padded, width);
            pad_count = 0;
        }

        let padding = spec.fill.repeat(pad_count);
        Ok(match spec.align {
            "<" => format!("{prefix}{value}{suffix}{padding}"),
            "=" => format!("{prefix}{padding}{value}{suffix}"),
            "^" => {
                let left = spec.fill.repeat(pad_count / 2);
                let right = spec.fill.repeat(pad_count - pad_count / 2);
                format!("{left}{prefix}{value}{suffix}{right}")
            }
            _ => format!("{padding}{prefix}{value}{suffix}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(".1f", 0.06, "0.1")]
    #[case(".2f", 1234567.891, "1234567.89")]
    #[case(",.2f", 1234567.891, "1,234,567.89")]
    #[case(".0%", 0.123, "12%")]
    #[case(".1%", 0.23456, "23.5%")]
    #[case(".2s", 42e6, "42M")]
    #[case("~s", 1500.0, "1.5k")]
    #[case(".3s", 0.0123, "12.3m")]
    #[case(".1e", 1500.0, "1.5e+3")]
    #[case(".2e", 0.00123, "1.23e-3")]
    #[case("d", 41.6, "42")]
    #[case(",d", 1234567.0, "1,234,567")]
    #[case("#x", 48879.0, "0xbeef")]
    #[case("b", 3.0, "11")]
    #[case("+10.0f", 255.0, "      +255")]
    #[case(".^20d", 12.0, ".........12.........")]
    #[case("08,d", 1234.0, "0,001,234")]
    #[case("$,.2f", 1234.5, "$1,234.50")]
    #[case(".3r", 1234.5, "1230")]
    #[case(".3g", 0.000012345, "0.0000123")]
    #[case(".2g", 1.0e9, "1.0e+9")]
    #[case("", 0.30000000000000004, "0.3")]
    #[case(".3~f", 2.5, "2.5")]
    fn test_format(#[case] pattern: &str, #[case] value: f64, #[case] expected: &str) {
        assert_eq!(NumberFormat::new().format(pattern, value).unwrap(), expected);
    }

    #[test]
    fn test_negative_values() {
        let num = NumberFormat::new().with_minus('\u{2212}');
        assert_eq!(num.format(".1f", -2.75).unwrap(), "\u{2212}2.8");
        assert_eq!(num.format(".1f", -0.01).unwrap(), "0.0");
        assert_eq!(num.format("+.1f", -0.01).unwrap(), "\u{2212}0.0");
        assert_eq!(num.format(".0%", -0.42).unwrap(), "\u{2212}42%");
    }

    #[test]
    fn test_custom_separators() {
        let num = NumberFormat::with_separators(",.");
        assert_eq!(num.format(",.2f", 1234.5).unwrap(), "1.234,50");
        assert_eq!(num.format(".1f", 0.5).unwrap(), "0,5");
    }

    #[test]
    fn test_invalid_patterns() {
        let num = NumberFormat::new();
        assert!(matches!(
            num.format("%Y-%m", 1.0),
            Err(AxisError::InvalidTickFormat { .. })
        ));
        assert!(num.format(".2q", 1.0).is_err());
    }
}
