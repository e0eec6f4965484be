//! JSON figures (`{"data": [...], "layout": {...}}`) and the full axis pass over them.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::autorange::{ExpandOptions, Pad};
use crate::axis::{AutoRange, Axis, ScaleParams};
use crate::classify::{classify, AxisType, ClassifyOptions};
use crate::dates::Calendar;
use crate::datum::Datum;
use crate::error::AxisError;
use crate::format::TickLabel;
use crate::layout::Layout;
use crate::pipeline::{CalcAxis, TickedAxis};
use crate::registry::{get_subplots, id_sort, subplots_containing_axis, AxisId, AxisLetter, SubplotId};
use crate::ticks::Dtick;

const DEFAULT_MARKER_SIZE: f64 = 6.0;

/// `true`, `false` or `"legendonly"`. Only `true` traces are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visible {
    #[default]
    Shown,
    Hidden,
    LegendOnly,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum VisibleRepr {
    Flag(bool),
    Named(String),
}

impl Serialize for Visible {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Visible::Shown => VisibleRepr::Flag(true),
            Visible::Hidden => VisibleRepr::Flag(false),
            Visible::LegendOnly => VisibleRepr::Named("legendonly".to_string()),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Visible {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match VisibleRepr::deserialize(deserializer)? {
            VisibleRepr::Flag(true) => Ok(Visible::Shown),
            VisibleRepr::Flag(false) => Ok(Visible::Hidden),
            VisibleRepr::Named(s) if s == "legendonly" => Ok(Visible::LegendOnly),
            VisibleRepr::Named(s) => Err(serde::de::Error::custom(format!(
                "invalid visible `{s}`, expected true, false or \"legendonly\""
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MarkerSize {
    Uniform(f64),
    PerPoint(Vec<Option<f64>>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Marker {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<MarkerSize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    V,
    H,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceType {
    #[default]
    Scatter,
    Bar,
}

/// A cartesian trace. Only the attributes that influence its axes are modeled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Trace {
    #[serde(rename = "type")]
    pub trace_type: TraceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<Vec<Datum>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<Vec<Datum>>,
    pub x0: f64,
    pub dx: f64,
    pub y0: f64,
    pub dy: f64,
    pub xaxis: AxisId,
    pub yaxis: AxisId,
    pub visible: Visible,
    pub orientation: Orientation,
    pub marker: Marker,
}

impl Default for Trace {
    fn default() -> Self {
        Self {
            trace_type: TraceType::Scatter,
            name: None,
            x: None,
            y: None,
            x0: 0.0,
            dx: 1.0,
            y0: 0.0,
            dy: 1.0,
            xaxis: AxisId::new(AxisLetter::X, 1),
            yaxis: AxisId::new(AxisLetter::Y, 1),
            visible: Visible::Shown,
            orientation: Orientation::V,
            marker: Marker::default(),
        }
    }
}

/// Number of points in a column; multicategory columns hold `[outer, inner]`.
fn point_count(column: &[Datum]) -> usize {
    match column {
        [Datum::Array(outer), Datum::Array(inner)] => outer.len().min(inner.len()),
        _ => column.len(),
    }
}

impl Trace {
    pub fn is_visible(&self) -> bool {
        self.visible == Visible::Shown
    }

    pub fn axis(&self, letter: AxisLetter) -> AxisId {
        match letter {
            AxisLetter::X => self.xaxis,
            AxisLetter::Y => self.yaxis,
        }
    }

    /// The data column along `letter`, if present and not empty.
    pub fn column(&self, letter: AxisLetter) -> Option<&[Datum]> {
        match letter {
            AxisLetter::X => self.x.as_deref(),
            AxisLetter::Y => self.y.as_deref(),
        }
        .filter(|c| !c.is_empty())
    }

    fn step(&self, letter: AxisLetter) -> (f64, f64) {
        match letter {
            AxisLetter::X => (self.x0, self.dx),
            AxisLetter::Y => (self.y0, self.dy),
        }
    }

    /// The letter of the axis bars grow along.
    fn value_letter(&self) -> AxisLetter {
        match self.orientation {
            Orientation::V => AxisLetter::Y,
            Orientation::H => AxisLetter::X,
        }
    }

    /// Calculated values along `letter`, generated from `<letter>0`/`d<letter>`
    /// when the trace has no column on that side.
    fn calcdata(&self, calc: &mut CalcAxis, letter: AxisLetter) -> Vec<Option<f64>> {
        if let Some(column) = self.column(letter) {
            return calc.make_calcdata(column);
        }
        let len = self.column(letter.other()).map_or(0, point_count);
        let (v0, dv) = self.step(letter);
        calc.make_calcdata_from_step(v0, dv, len)
    }

    fn expand_options(&self, letter: AxisLetter, data: &[Option<f64>]) -> ExpandOptions {
        match self.trace_type {
            TraceType::Scatter => ExpandOptions {
                ppad: Some(match &self.marker.size {
                    Some(MarkerSize::Uniform(size)) => Pad::Uniform(size / 2.0),
                    Some(MarkerSize::PerPoint(sizes)) => Pad::PerPoint(
                        sizes.iter().map(|s| s.unwrap_or(0.0) / 2.0).collect(),
                    ),
                    None => Pad::Uniform(DEFAULT_MARKER_SIZE / 2.0),
                }),
                padded: true,
                ..Default::default()
            },
            TraceType::Bar if letter == self.value_letter() => ExpandOptions {
                tozero: true,
                padded: true,
                ..Default::default()
            },
            TraceType::Bar => ExpandOptions {
                vpad: Some(Pad::Uniform(min_gap(data) / 2.0)),
                ..Default::default()
            },
        }
    }
}

/// Smallest spacing between distinct positions, 1 when there is none.
fn min_gap(data: &[Option<f64>]) -> f64 {
    let mut values: Vec<f64> = data.iter().flatten().copied().filter(|v| v.is_finite()).collect();
    values.sort_by(f64::total_cmp);
    values
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|d| *d > 0.0)
        .fold(None, |acc: Option<f64>, d| Some(acc.map_or(d, |a| a.min(d))))
        .unwrap_or(1.0)
}

/// The computed state of one axis, as reported to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisReport {
    #[serde(rename = "type")]
    pub axis_type: AxisType,
    pub range: [Datum; 2],
    pub autorange: AutoRange,
    pub tick0: Datum,
    pub dtick: Dtick,
    pub ticks: Vec<TickLabel>,
    pub scale: ScaleParams,
    pub subplots: Vec<SubplotId>,
}

impl AxisReport {
    fn new(axis: &TickedAxis, subplots: &[SubplotId]) -> Self {
        Self {
            axis_type: axis.axis_type,
            range: axis.range.map(|r| axis.l2r(r)),
            autorange: axis.autorange,
            tick0: match axis.axis_type {
                AxisType::Date => axis.l2r(axis.ticks.tick0),
                _ => Datum::Number(axis.ticks.tick0),
            },
            dtick: axis.ticks.dtick,
            ticks: axis.labels().to_vec(),
            scale: axis.scale,
            subplots: subplots_containing_axis(subplots, &axis.id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FigureAxes {
    /// Keyed by layout name (`xaxis`, `yaxis2`, ...), sorted by id.
    pub axes: IndexMap<String, AxisReport>,
    pub subplots: Vec<SubplotId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

impl Figure {
    pub fn from_json(json: &str) -> Result<Self, AxisError> {
        Ok(serde_json::from_str(json)?)
    }

    fn traces_on(&self, id: AxisId) -> impl Iterator<Item = &Trace> {
        self.data
            .iter()
            .filter(move |trace| trace.is_visible() && trace.axis(id.letter) == id)
    }

    /// Every axis the layout declares or a trace references, sorted by id.
    /// Referenced axes missing from the layout are added with defaults.
    fn collect_axes(&mut self) -> Vec<AxisId> {
        for trace in &self.data {
            for id in [trace.xaxis, trace.yaxis] {
                self.layout.axes.entry(id).or_default();
            }
        }
        let mut ids: Vec<AxisId> = self.layout.axes.keys().copied().collect();
        ids.sort_by(id_sort);
        ids
    }

    /// Resolves undetermined axis types from the first trace with data on the axis
    /// and writes the result back into the layout.
    fn auto_type(&mut self, id: AxisId) -> Result<(), AxisError> {
        let axis_in = &self.layout.axes[&id];
        if !matches!(axis_in.axis_type, None | Some(AxisType::Undetermined)) {
            return Ok(());
        }
        let opts = ClassifyOptions {
            calendar: Calendar::parse(axis_in.calendar.as_deref().unwrap_or(""))?,
            no_multicategory: false,
            autotype_numbers: axis_in.autotypenumbers.unwrap_or_default(),
        };
        let Some(column) = self.traces_on(id).find_map(|t| t.column(id.letter)) else {
            return Ok(());
        };
        let axis_type = classify(column, &opts);
        log::debug!("auto-typed {id} as {axis_type}");
        if let Some(axis_in) = self.layout.axes.get_mut(&id) {
            axis_in.axis_type = Some(axis_type);
        }
        Ok(())
    }

    fn compute_axis(&mut self, id: AxisId, subplots: &[SubplotId]) -> Result<AxisReport, AxisError> {
        let axis = Axis::from_layout(id, &self.layout.axes[&id], &self.layout)?;
        let mut calc = CalcAxis::new(axis, &self.layout.plot_size())?;

        if calc.axis_type == AxisType::Multicategory {
            let columns: Vec<&[Datum]> = self
                .traces_on(id)
                .filter_map(|t| t.column(id.letter))
                .collect();
            calc.setup_multicategory(&columns);
        }

        for trace in self.traces_on(id) {
            let data = trace.calcdata(&mut calc, id.letter);
            calc.expand(&data, &trace.expand_options(id.letter, &data));
        }

        let ticked = calc
            .auto_range(self.layout.axes.get_mut(&id))?
            .calc_ticks()?;
        Ok(AxisReport::new(&ticked, subplots))
    }

    /// Runs the full pipeline (typing, calc, autorange, ticks) for every axis.
    /// Autoranged ranges and resolved types are written back into `self.layout`.
    pub fn compute_axes(&mut self) -> Result<FigureAxes, AxisError> {
        let ids = self.collect_axes();
        let subplots = get_subplots(&self.data, &self.layout);

        let mut axes = IndexMap::new();
        for id in ids {
            self.auto_type(id)?;
            let report = self.compute_axis(id, &subplots)?;
            axes.insert(id.name(), report);
        }
        Ok(FigureAxes { axes, subplots })
    }
}
