use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::constants::MAX_SAMPLES;
use crate::dates::{is_date_time, Calendar};
use crate::datum::{is_numeric, Datum};

/// The kind of coordinate system an axis uses.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
pub enum AxisType {
    /// Not yet known; resolved from the first trace with data on the axis.
    #[default]
    #[serde(rename = "-")]
    #[strum(serialize = "-")]
    Undetermined,
    #[serde(rename = "linear")]
    #[strum(serialize = "linear")]
    Linear,
    #[serde(rename = "log")]
    #[strum(serialize = "log")]
    Log,
    #[serde(rename = "date")]
    #[strum(serialize = "date")]
    Date,
    #[serde(rename = "category")]
    #[strum(serialize = "category")]
    Category,
    #[serde(rename = "multicategory")]
    #[strum(serialize = "multicategory")]
    Multicategory,
}

impl AxisType {
    pub fn is_categorical(&self) -> bool {
        matches!(self, AxisType::Category | AxisType::Multicategory)
    }

    /// Linear and undetermined axes are the ones `rangemode` applies to.
    pub fn is_linear_like(&self) -> bool {
        matches!(self, AxisType::Linear | AxisType::Undetermined)
    }
}

/// How numeric-looking strings are counted when deciding between category
/// and linear.
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
pub enum AutotypeNumbers {
    #[default]
    #[serde(rename = "convert types")]
    #[strum(serialize = "convert types")]
    ConvertTypes,
    #[serde(rename = "strict")]
    #[strum(serialize = "strict")]
    Strict,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClassifyOptions {
    pub calendar: Calendar,
    pub no_multicategory: bool,
    pub autotype_numbers: AutotypeNumbers,
}

/// Guesses the axis type that suits a data column.
pub fn classify(data: &[Datum], opts: &ClassifyOptions) -> AxisType {
    if data.is_empty() {
        return AxisType::Undetermined;
    }

    if !opts.no_multicategory && is_multicategory(data) {
        return AxisType::Multicategory;
    }

    let flattened: Vec<Datum>;
    let data = if opts.no_multicategory && data[0].is_array() {
        flattened = data
            .iter()
            .flat_map(|d| match d {
                Datum::Array(items) => items.clone(),
                other => vec![other.clone()],
            })
            .collect();
        &flattened[..]
    } else {
        data
    };

    if more_dates(data, opts.calendar) {
        AxisType::Date
    } else if more_categories(data, opts.autotype_numbers) {
        AxisType::Category
    } else if data.iter().any(is_numeric) {
        AxisType::Linear
    } else {
        AxisType::Undetermined
    }
}

fn is_multicategory(data: &[Datum]) -> bool {
    data.len() >= 2 && data[0].is_array() && data[1].is_array()
}

/// Evenly strided sample of at most ~1000 distinct values.
fn distinct_sample(data: &[Datum]) -> impl Iterator<Item = &Datum> {
    let len = data.len();
    let inc = ((len as f64 - 1.0) / MAX_SAMPLES).max(1.0);
    let mut seen = HashSet::new();
    let mut f = 0.0;
    std::iter::from_fn(move || {
        while f < len as f64 {
            let i = (f.round() as usize).min(len - 1);
            f += inc;
            if seen.insert(data[i].to_string()) {
                return Some(&data[i]);
            }
        }
        None
    })
}

fn more_dates(data: &[Datum], calendar: Calendar) -> bool {
    let (mut dates, mut nums) = (0, 0);
    for d in distinct_sample(data) {
        if is_date_time(d, calendar) {
            dates += 1;
        }
        if is_numeric(d) {
            nums += 1;
        }
    }
    dates > nums * 2
}

fn more_categories(data: &[Datum], autotype_numbers: AutotypeNumbers) -> bool {
    let (mut cats, mut nums) = (0, 0);
    for d in distinct_sample(data) {
        let numeric = match autotype_numbers {
            AutotypeNumbers::ConvertTypes => is_numeric(d),
            AutotypeNumbers::Strict => matches!(d, Datum::Number(v) if v.is_finite()),
        };
        match d {
            Datum::Bool(_) => cats += 1,
            _ if numeric => nums += 1,
            Datum::Text(_) => cats += 1,
            _ => {}
        }
    }
    cats > nums * 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn data(values: serde_json::Value) -> Vec<Datum> {
        serde_json::from_value(values).unwrap()
    }

    #[rstest]
    #[case(serde_json::json!([]), AxisType::Undetermined)]
    #[case(serde_json::json!(["2020-01-01", "2021-06-15", "2019-12-31", 4]), AxisType::Date)]
    #[case(serde_json::json!([1, 2, 3, "a", "b"]), AxisType::Linear)]
    #[case(serde_json::json!(["a", "b", "c", 1]), AxisType::Category)]
    #[case(serde_json::json!([true, false]), AxisType::Category)]
    #[case(serde_json::json!([null, null]), AxisType::Undetermined)]
    #[case(serde_json::json!([["a", "a"], ["x", "y"]]), AxisType::Multicategory)]
    #[case(serde_json::json!([2000, 2001, 2002]), AxisType::Linear)]
    fn test_classify(#[case] values: serde_json::Value, #[case] expected: AxisType) {
        assert_eq!(classify(&data(values), &ClassifyOptions::default()), expected);
    }

    #[test]
    fn test_repeated_values_count_once() {
        // one distinct string against two distinct numbers
        let mut values = vec![Datum::from("a"); 50];
        values.push(1.into());
        values.push(2.into());
        assert_eq!(classify(&values, &ClassifyOptions::default()), AxisType::Linear);
    }

    #[test]
    fn test_strict_numbers() {
        let values = data(serde_json::json!(["1", "2", "3"]));
        assert_eq!(classify(&values, &ClassifyOptions::default()), AxisType::Linear);
        let strict = ClassifyOptions {
            autotype_numbers: AutotypeNumbers::Strict,
            ..Default::default()
        };
        assert_eq!(classify(&values, &strict), AxisType::Category);
    }

    #[test]
    fn test_no_multicategory_flattens() {
        let values = data(serde_json::json!([["a", "b"], ["c", "d"]]));
        let opts = ClassifyOptions {
            no_multicategory: true,
            ..Default::default()
        };
        assert_eq!(classify(&values, &opts), AxisType::Category);

        // scalars next to the arrays still vote
        let mixed = data(serde_json::json!([["a", "b"], 1, 2, 3, 4]));
        assert_eq!(classify(&mixed, &opts), AxisType::Linear);
    }

    #[test]
    fn test_large_arrays_are_sampled() {
        let values: Vec<Datum> = (0..100_000).map(|i| Datum::Number(i as f64)).collect();
        assert_eq!(classify(&values, &ClassifyOptions::default()), AxisType::Linear);
        assert_eq!(distinct_sample(&values).count(), 1001);
    }

    #[test]
    fn test_axis_type_strings() {
        assert_eq!(AxisType::Undetermined.to_string(), "-");
        assert_eq!("multicategory".parse::<AxisType>().unwrap(), AxisType::Multicategory);
        assert_eq!(serde_json::to_string(&AxisType::Log).unwrap(), "\"log\"");
    }
}
