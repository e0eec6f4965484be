//! The per-redraw axis pipeline as a chain of stage types.
//!
//! ```text
//! Axis --CalcAxis::new--> CalcAxis --auto_range--> RangedAxis --calc_ticks--> TickedAxis
//!   ^                                                                            |
//!   +------------------------------- into_axis ---------------------------------+
//! ```
//!
//! Each stage derefs to the underlying [`Axis`] for read-only access (conversions,
//! categories, scale) and only exposes the mutations that are legal at that point.

use std::ops::Deref;

use crate::autorange::{do_auto_range, expand, ExpandOptions};
use crate::axis::{Axis, PlotSize};
use crate::datum::Datum;
use crate::error::AxisError;
use crate::format::{tick_text, TickLabel};
use crate::layout::AxisLayout;
use crate::ticks::calc_ticks;

/// An axis collecting data: extents and categories were reset and the scale set
/// for the current geometry.
#[derive(Debug, Clone)]
pub struct CalcAxis {
    axis: Axis,
}

impl CalcAxis {
    pub fn new(mut axis: Axis, size: &PlotSize) -> Result<Self, AxisError> {
        axis.reset_extremes();
        axis.reset_categories();
        axis.set_scale(size)?;
        Ok(Self { axis })
    }

    /// Converts a trace column, registering any new category labels.
    pub fn make_calcdata(&mut self, data: &[Datum]) -> Vec<Option<f64>> {
        self.axis.make_calcdata(data)
    }

    pub fn make_calcdata_from_step(&self, v0: f64, dv: f64, len: usize) -> Vec<Option<f64>> {
        self.axis.make_calcdata_from_step(v0, dv, len)
    }

    /// Registers the category pairs of every multicategory column on the axis.
    /// Must run before the columns are converted.
    pub fn setup_multicategory(&mut self, columns: &[&[Datum]]) {
        self.axis.setup_multicategory(columns);
    }

    pub fn expand(&mut self, data: &[Option<f64>], opts: &ExpandOptions) {
        expand(&mut self.axis, data, opts);
    }

    /// Solves the range from the accumulated extents and re-derives the scale.
    /// The solved range is written back to `layout_in` when given.
    pub fn auto_range(mut self, layout_in: Option<&mut AxisLayout>) -> Result<RangedAxis, AxisError> {
        do_auto_range(&mut self.axis, layout_in);
        let size = self.axis.plot_size;
        self.axis.set_scale(&size)?;
        Ok(RangedAxis { axis: self.axis })
    }
}

impl Deref for CalcAxis {
    type Target = Axis;

    fn deref(&self) -> &Axis {
        &self.axis
    }
}

/// An axis with its final range and pixel mapping.
#[derive(Debug, Clone)]
pub struct RangedAxis {
    axis: Axis,
}

impl RangedAxis {
    pub fn calc_ticks(mut self) -> Result<TickedAxis, AxisError> {
        let labels = calc_ticks(&mut self.axis)?;
        Ok(TickedAxis {
            axis: self.axis,
            labels,
        })
    }
}

impl Deref for RangedAxis {
    type Target = Axis;

    fn deref(&self) -> &Axis {
        &self.axis
    }
}

/// An axis with its tick labels. Hover labels are formatted against the resolved
/// tick grid.
#[derive(Debug, Clone)]
pub struct TickedAxis {
    axis: Axis,
    labels: Vec<TickLabel>,
}

impl TickedAxis {
    pub fn labels(&self) -> &[TickLabel] {
        &self.labels
    }

    /// Hover label for a calculated value.
    pub fn hover_text(&self, v: f64) -> Result<Option<TickLabel>, AxisError> {
        self.axis
            .c2l(v, false)
            .map(|l| tick_text(&self.axis, l, true))
            .transpose()
    }

    /// Back to a plain axis for the next redraw cycle.
    pub fn into_axis(self) -> Axis {
        self.axis
    }
}

impl Deref for TickedAxis {
    type Target = Axis;

    fn deref(&self) -> &Axis {
        &self.axis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autorange::{Extreme, Pad};
    use crate::axis::AutoRange;
    use crate::classify::AxisType;
    use crate::registry::{AxisId, AxisLetter};
    use crate::ticks::Dtick;
    use float_cmp::assert_approx_eq;

    fn size(w: f64, h: f64) -> PlotSize {
        PlotSize { l: 0.0, t: 0.0, w, h }
    }

    #[test]
    fn test_stages_reset_and_solve() {
        let mut axis = Axis::new(AxisId::new(AxisLetter::X, 1), AxisType::Linear);
        axis.min = vec![Extreme::new(-100.0, 0.0)];
        axis.max = vec![Extreme::new(100.0, 0.0)];

        let mut calc = CalcAxis::new(axis, &size(110.0, 100.0)).unwrap();
        assert!(calc.min.is_empty() && calc.max.is_empty());

        let data = calc.make_calcdata(&[Datum::Number(0.0), Datum::Number(10.0)]);
        calc.expand(
            &data,
            &ExpandOptions {
                ppad: Some(Pad::Uniform(5.0)),
                ..Default::default()
            },
        );

        let mut layout_in = AxisLayout::default();
        let ranged = calc.auto_range(Some(&mut layout_in)).unwrap();
        assert_approx_eq!(f64, ranged.range[0], -0.5);
        assert_approx_eq!(f64, ranged.range[1], 10.5);
        assert_approx_eq!(f64, ranged.l2p(0.0), 5.0);
        assert_approx_eq!(f64, ranged.l2p(10.0), 105.0);
        assert_eq!(
            layout_in.range,
            Some(vec![Datum::Number(-0.5), Datum::Number(10.5)])
        );
        assert_eq!(layout_in.autorange, Some(AutoRange::On));

        let ticked = ranged.calc_ticks().unwrap();
        assert_eq!(ticked.ticks.dtick, Dtick::Linear(5.0));
        let texts: Vec<&str> = ticked.labels().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["0", "5", "10"]);

        let hover = ticked.hover_text(3.14159).unwrap().unwrap();
        assert_eq!(hover.text, "3.14159");

        let axis = ticked.into_axis();
        assert_eq!(axis.min.len(), 1);
    }

    #[test]
    fn test_categories_reset_to_initial() {
        let mut axis = Axis::new(AxisId::new(AxisLetter::Y, 1), AxisType::Category);
        axis.initial_categories = vec![crate::axis::Category::Label("z".to_string())];
        axis.register_category(&"stale".into());

        let mut calc = CalcAxis::new(axis, &size(100.0, 100.0)).unwrap();
        assert_eq!(calc.categories.len(), 1);
        let data = calc.make_calcdata(&["b".into(), "z".into(), "a".into()]);
        assert_eq!(data, vec![Some(1.0), Some(0.0), Some(2.0)]);
    }

    #[test]
    fn test_fixed_range_is_kept() {
        let mut axis = Axis::new(AxisId::new(AxisLetter::X, 1), AxisType::Linear);
        axis.autorange = AutoRange::Off;
        axis.range = [0.0, 1.0];
        let mut calc = CalcAxis::new(axis, &size(100.0, 100.0)).unwrap();
        let data = calc.make_calcdata(&[Datum::Number(50.0)]);
        calc.expand(&data, &ExpandOptions::default());
        let ranged = calc.auto_range(None).unwrap();
        assert_eq!(ranged.range, [0.0, 1.0]);
    }

    #[test]
    fn test_zero_area_geometry_is_fatal() {
        let axis = Axis::new(AxisId::new(AxisLetter::X, 1), AxisType::Linear);
        assert!(matches!(
            CalcAxis::new(axis, &size(0.0, 100.0)),
            Err(AxisError::NonFiniteScale { .. })
        ));
    }
}
