//! The axis model shared by every stage of the pipeline.
//!
//! An [`Axis`] carries its configuration (type, range, tick settings), the working
//! state built up while data flows through it (categories, extent candidates) and
//! the pixel mapping derived by [`Axis::set_scale`]. The conversion family lives in
//! [`convert`].

pub mod convert;

use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::autorange::Extreme;
use crate::classify::AxisType;
use crate::constants::DEFAULT_FONT_SIZE;
use crate::dates::{Calendar, DateFormats};
use crate::datum::{number_to_string, Datum};
use crate::format::{ExponentFormat, ShowAttr};
use crate::registry::{AxisId, AxisLetter};
use crate::ticks::{Dtick, TickMode, TickRound};

/// Whether the range is computed from the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoRange {
    #[default]
    On,
    Off,
    /// Autorange once with the range flipped, then behave like `On`.
    Reversed,
}

impl AutoRange {
    pub fn is_on(&self) -> bool {
        !matches!(self, AutoRange::Off)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum AutoRangeRepr {
    Flag(bool),
    Named(String),
}

impl Serialize for AutoRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AutoRange::On => AutoRangeRepr::Flag(true),
            AutoRange::Off => AutoRangeRepr::Flag(false),
            AutoRange::Reversed => AutoRangeRepr::Named("reversed".to_string()),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AutoRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match AutoRangeRepr::deserialize(deserializer)? {
            AutoRangeRepr::Flag(true) => Ok(AutoRange::On),
            AutoRangeRepr::Flag(false) => Ok(AutoRange::Off),
            AutoRangeRepr::Named(s) if s == "reversed" => Ok(AutoRange::Reversed),
            AutoRangeRepr::Named(s) => Err(serde::de::Error::custom(format!(
                "invalid autorange `{s}`, expected true, false or \"reversed\""
            ))),
        }
    }
}

/// Constraint applied to autoranged linear axes.
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
pub enum RangeMode {
    #[default]
    Normal,
    ToZero,
    NonNegative,
}

/// A distinct category label. Multicategory axes register `(outer, inner)` pairs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Category {
    Label(String),
    Pair(String, String),
}

impl Category {
    /// The label a single datum registers under; `None` for nulls and nested arrays.
    pub fn from_datum(d: &Datum) -> Option<Self> {
        label_of(d).map(Category::Label)
    }

    pub fn pair(outer: &Datum, inner: &Datum) -> Option<Self> {
        Some(Category::Pair(label_of(outer)?, label_of(inner)?))
    }

    pub fn to_datum(&self) -> Datum {
        match self {
            Category::Label(s) => Datum::Text(s.clone()),
            Category::Pair(a, b) => Datum::Array(vec![a.as_str().into(), b.as_str().into()]),
        }
    }
}

fn label_of(d: &Datum) -> Option<String> {
    match d {
        Datum::Text(s) => Some(s.clone()),
        Datum::Number(v) => Some(number_to_string(*v)),
        Datum::Bool(_) | Datum::Date(_) => Some(d.to_string()),
        Datum::Null | Datum::Array(_) => None,
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Label(s) => write!(f, "{s}"),
            Category::Pair(a, b) => write!(f, "{a} - {b}"),
        }
    }
}

/// Pixel geometry of the plotting area, excluding margins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotSize {
    pub l: f64,
    pub t: f64,
    pub w: f64,
    pub h: f64,
}

impl Default for PlotSize {
    fn default() -> Self {
        Self {
            l: 80.0,
            t: 100.0,
            w: 540.0,
            h: 270.0,
        }
    }
}

/// The affine map `pixel = b + m * linearized` and the axis span it lives in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScaleParams {
    pub offset: f64,
    pub length: f64,
    pub m: f64,
    pub b: f64,
}

/// Caller-provided tick settings.
#[derive(Debug, Clone, PartialEq)]
pub struct TickConfig {
    pub mode: TickMode,
    /// Target tick count; 0 lets the pixel heuristic decide.
    pub nticks: usize,
    pub tick0: Option<f64>,
    pub dtick: Option<Dtick>,
    pub tickvals: Vec<Datum>,
    pub ticktext: Vec<String>,
    pub tickformat: Option<String>,
    pub hoverformat: Option<String>,
    pub prefix: String,
    pub suffix: String,
    pub show_prefix: ShowAttr,
    pub show_suffix: ShowAttr,
    pub show_exponent: ShowAttr,
    pub exponent_format: ExponentFormat,
    pub separate_thousands: bool,
    pub min_exponent: i32,
    pub font_size: f64,
    pub font_family: String,
    pub font_color: String,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            mode: TickMode::Auto,
            nticks: 0,
            tick0: None,
            dtick: None,
            tickvals: vec![],
            ticktext: vec![],
            tickformat: None,
            hoverformat: None,
            prefix: String::new(),
            suffix: String::new(),
            show_prefix: ShowAttr::All,
            show_suffix: ShowAttr::All,
            show_exponent: ShowAttr::All,
            exponent_format: ExponentFormat::B,
            separate_thousands: false,
            min_exponent: 3,
            font_size: DEFAULT_FONT_SIZE,
            font_family: "\"Open Sans\", verdana, arial, sans-serif".to_string(),
            font_color: "#444".to_string(),
        }
    }
}

/// Tick grid resolved for the current range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickState {
    pub tick0: f64,
    pub dtick: Dtick,
    pub tickround: TickRound,
    /// Common exponent pulled out of every label, 0 for none.
    pub tick_exponent: i32,
    pub tmin: Option<f64>,
    pub tmax: Option<f64>,
}

impl Default for TickState {
    fn default() -> Self {
        Self {
            tick0: 0.0,
            dtick: Dtick::Linear(1.0),
            tickround: TickRound::None,
            tick_exponent: 0,
            tmin: None,
            tmax: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Axis {
    pub id: AxisId,
    pub axis_type: AxisType,
    pub calendar: Calendar,
    /// Linearized bounds; `range[0] > range[1]` means the axis is reversed.
    pub range: [f64; 2],
    pub autorange: AutoRange,
    pub rangemode: RangeMode,
    /// Fraction of the plot area the axis spans.
    pub domain: [f64; 2],
    pub categories: IndexSet<Category>,
    /// Seeded from `categoryarray` and re-registered at every calc reset.
    pub initial_categories: Vec<Category>,
    pub min: Vec<Extreme>,
    pub max: Vec<Extreme>,
    pub scale: ScaleParams,
    pub plot_size: PlotSize,
    pub tick_config: TickConfig,
    pub ticks: TickState,
    pub separators: String,
    pub date_formats: DateFormats,
}

impl Axis {
    pub fn new(id: AxisId, axis_type: AxisType) -> Self {
        let mut axis = Self {
            id,
            axis_type,
            calendar: Calendar::Gregorian,
            range: [0.0, 1.0],
            autorange: AutoRange::On,
            rangemode: RangeMode::Normal,
            domain: [0.0, 1.0],
            categories: IndexSet::new(),
            initial_categories: vec![],
            min: vec![],
            max: vec![],
            scale: ScaleParams::default(),
            plot_size: PlotSize::default(),
            tick_config: TickConfig::default(),
            ticks: TickState::default(),
            separators: ".,".to_string(),
            date_formats: DateFormats::default(),
        };
        axis.clean_range([None, None]);
        axis
    }

    pub fn letter(&self) -> AxisLetter {
        self.id.letter
    }

    pub fn is_reversed(&self) -> bool {
        self.range[0] > self.range[1]
    }

    /// Clears the extent candidates before a fresh accumulation pass.
    pub fn reset_extremes(&mut self) {
        self.min.clear();
        self.max.clear();
    }

    /// Empties the category list and re-registers the initial categories.
    pub fn reset_categories(&mut self) {
        self.categories.clear();
        for c in self.initial_categories.clone() {
            self.categories.insert(c);
        }
    }
}
