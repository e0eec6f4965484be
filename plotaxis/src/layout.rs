//! The caller-facing layout: serde models of the JSON layout object and the
//! axis-specific defaulting that turns an [`AxisLayout`] into an [`Axis`].

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::axis::{AutoRange, Axis, Category, PlotSize, RangeMode};
use crate::classify::{AutotypeNumbers, AxisType};
use crate::dates::{clean_date, Calendar};
use crate::datum::{clean_number, Datum};
use crate::error::AxisError;
use crate::format::{ExponentFormat, ShowAttr};
use crate::registry::AxisId;
use crate::ticks::{Dtick, TickMode};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Font {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// One `xaxis*` / `yaxis*` entry of the layout, as provided by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisLayout {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub axis_type: Option<AxisType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<Vec<Datum>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autorange: Option<AutoRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rangemode: Option<RangeMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlaying: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autotypenumbers: Option<AutotypeNumbers>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categoryarray: Option<Vec<Datum>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickmode: Option<TickMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nticks: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick0: Option<Datum>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dtick: Option<Dtick>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickvals: Option<Vec<Datum>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticktext: Option<Vec<Datum>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickformat: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hoverformat: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickprefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticksuffix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showtickprefix: Option<ShowAttr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showticksuffix: Option<ShowAttr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showexponent: Option<ShowAttr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exponentformat: Option<ExponentFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub separatethousands: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minexponent: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickfont: Option<Font>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margin {
    pub l: f64,
    pub r: f64,
    pub t: f64,
    pub b: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            l: 80.0,
            r: 80.0,
            t: 100.0,
            b: 80.0,
        }
    }
}

/// The figure layout: overall size, margins, number separators and the
/// cartesian axes keyed by id. Attributes not modeled here are kept in `other`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "LayoutRepr")]
pub struct Layout {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
    pub separators: String,
    pub axes: IndexMap<AxisId, AxisLayout>,
    pub other: IndexMap<String, serde_json::Value>,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            width: 700.0,
            height: 450.0,
            margin: Margin::default(),
            separators: ".,".to_string(),
            axes: IndexMap::new(),
            other: IndexMap::new(),
        }
    }
}

#[derive(Deserialize)]
struct LayoutRepr {
    width: Option<f64>,
    height: Option<f64>,
    #[serde(default)]
    margin: Margin,
    separators: Option<String>,
    #[serde(flatten)]
    rest: IndexMap<String, serde_json::Value>,
}

impl TryFrom<LayoutRepr> for Layout {
    type Error = AxisError;

    fn try_from(repr: LayoutRepr) -> Result<Self, Self::Error> {
        let dflt = Layout::default();
        let mut axes = IndexMap::new();
        let mut other = IndexMap::new();
        for (key, value) in repr.rest {
            match AxisId::from_name(&key) {
                Ok(id) => {
                    axes.insert(id, serde_json::from_value(value)?);
                }
                Err(_) => {
                    other.insert(key, value);
                }
            }
        }
        Ok(Self {
            width: repr.width.unwrap_or(dflt.width),
            height: repr.height.unwrap_or(dflt.height),
            margin: repr.margin,
            separators: repr
                .separators
                .filter(|s| !s.is_empty())
                .unwrap_or(dflt.separators),
            axes,
            other,
        })
    }
}

impl Serialize for Layout {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("width", &self.width)?;
        map.serialize_entry("height", &self.height)?;
        map.serialize_entry("margin", &self.margin)?;
        map.serialize_entry("separators", &self.separators)?;
        for (id, axis) in &self.axes {
            map.serialize_entry(&id.name(), axis)?;
        }
        for (key, value) in &self.other {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Layout {
    /// The plotting area inside the margins.
    pub fn plot_size(&self) -> PlotSize {
        PlotSize {
            l: self.margin.l,
            t: self.margin.t,
            w: self.width - self.margin.l - self.margin.r,
            h: self.height - self.margin.t - self.margin.b,
        }
    }
}

/// Common default for `showexponent`, `showtickprefix` and `showticksuffix`: the
/// value the explicitly set ones agree on, if they all agree.
pub fn show_attr_default(attrs: [Option<ShowAttr>; 3]) -> Option<ShowAttr> {
    let mut set = attrs.iter().flatten();
    let first = *set.next()?;
    set.all(|a| *a == first).then_some(first)
}

fn check_dtick(dtick: Dtick, axis_type: AxisType) -> Result<Dtick, AxisError> {
    let valid = match dtick {
        Dtick::Linear(_) => true,
        Dtick::Months(_) => axis_type == AxisType::Date,
        Dtick::LogLinear(_) | Dtick::LogDigits(_) => axis_type == AxisType::Log,
    };
    if valid {
        Ok(dtick)
    } else {
        Err(AxisError::InvalidDtick(format!(
            "{dtick} on a {axis_type} axis"
        )))
    }
}

fn valid_domain(domain: [f64; 2]) -> Result<[f64; 2], AxisError> {
    let [d0, d1] = domain;
    if (0.0..=1.0).contains(&d0) && (0.0..=1.0).contains(&d1) && d0 <= d1 {
        Ok(domain)
    } else {
        Err(AxisError::invalid_layout(
            "domain",
            format!("[{d0}, {d1}] is not an increasing pair within [0, 1]"),
        ))
    }
}

impl Axis {
    /// Builds an axis from its layout entry, applying the defaults for every
    /// attribute the caller left out. The axis type is taken as given; an
    /// undetermined type should be resolved beforehand.
    pub fn from_layout(id: AxisId, axis_in: &AxisLayout, layout: &Layout) -> Result<Self, AxisError> {
        let axis_type = axis_in.axis_type.unwrap_or_default();
        let mut axis = Axis::new(id, axis_type);
        axis.calendar = Calendar::parse(axis_in.calendar.as_deref().unwrap_or(""))?;
        axis.separators = layout.separators.clone();
        axis.rangemode = axis_in.rangemode.unwrap_or_default();
        if let Some(domain) = axis_in.domain {
            axis.domain = valid_domain(domain)?;
        }

        if axis_type == AxisType::Category {
            axis.initial_categories = axis_in
                .categoryarray
                .iter()
                .flatten()
                .filter_map(Category::from_datum)
                .collect();
            axis.reset_categories();
        }

        let range = match axis_in.range.as_deref() {
            Some([r0, r1]) => Some([axis.r2l(r0), axis.r2l(r1)]),
            Some(other) => {
                return Err(AxisError::invalid_layout(
                    "range",
                    format!("expected 2 bounds, got {}", other.len()),
                ))
            }
            None => None,
        };
        let has_range = range.is_some_and(|[r0, r1]| r0.is_some() && r1.is_some());
        axis.autorange = axis_in.autorange.unwrap_or(if has_range {
            AutoRange::Off
        } else {
            AutoRange::On
        });
        axis.clean_range(range.unwrap_or([None, None]));
        if axis.autorange == AutoRange::Reversed && !axis.is_reversed() {
            axis.range.reverse();
        }

        let config = &mut axis.tick_config;
        config.mode = axis_in.tickmode.unwrap_or(if axis_in.tickvals.is_some() {
            TickMode::Array
        } else if axis_in.dtick.is_some() {
            TickMode::Linear
        } else {
            TickMode::Auto
        });
        config.nticks = axis_in.nticks.unwrap_or(0);
        config.dtick = axis_in
            .dtick
            .map(|dtick| check_dtick(dtick, axis_type))
            .transpose()?;
        config.tick0 = axis_in.tick0.as_ref().and_then(|tick0| match axis_type {
            AxisType::Date => clean_date(tick0, Calendar::Gregorian),
            _ => clean_number(tick0),
        });
        config.tickvals = axis_in.tickvals.clone().unwrap_or_default();
        config.ticktext = axis_in
            .ticktext
            .iter()
            .flatten()
            .map(|t| match t {
                Datum::Text(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();
        config.tickformat = axis_in.tickformat.clone().filter(|f| !f.is_empty());
        config.hoverformat = axis_in.hoverformat.clone().filter(|f| !f.is_empty());

        config.prefix = axis_in.tickprefix.clone().unwrap_or_default();
        config.suffix = axis_in.ticksuffix.clone().unwrap_or_default();
        let show_dflt = show_attr_default([
            axis_in.showexponent,
            axis_in.showtickprefix,
            axis_in.showticksuffix,
        ])
        .unwrap_or_default();
        config.show_exponent = axis_in.showexponent.unwrap_or(show_dflt);
        config.show_prefix = axis_in.showtickprefix.unwrap_or(show_dflt);
        config.show_suffix = axis_in.showticksuffix.unwrap_or(show_dflt);
        config.exponent_format = axis_in.exponentformat.unwrap_or_default();
        config.separate_thousands = axis_in.separatethousands.unwrap_or(false);
        config.min_exponent = axis_in.minexponent.unwrap_or(config.min_exponent);

        if let Some(font) = &axis_in.tickfont {
            if let Some(size) = font.size.filter(|s| *s > 0.0) {
                config.font_size = size;
            }
            if let Some(family) = &font.family {
                config.font_family = family.clone();
            }
            if let Some(color) = &font.color {
                config.font_color = color.clone();
            }
        }

        axis.set_scale(&layout.plot_size())?;
        Ok(axis)
    }
}
