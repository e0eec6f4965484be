/*!
# Autorange

Computing an axis range from the data drawn on it happens in two steps.

## Accumulation

Every trace on the axis is folded into two lists of *extent candidates*, one per
side. A candidate `{val, pad}` says "the range must reach `val`, with `pad` pixels to
spare beyond it". A candidate is dominated when another one on the same side is at
least as extreme and needs at least as much padding; dominated candidates are never
kept, so each list is a small Pareto frontier no matter how much data flows in.

## Solving

For a range `[r0, r1]` and axis length `L`, the scale is `m = (r1 - r0) / L` data
units per pixel, and a pair of candidates `(lo, hi)` is satisfied when

```text
r0 = lo.val - m * lo.pad
r1 = hi.val + m * hi.pad
```

Substituting gives `m = (hi.val - lo.val) / (L - lo.pad - hi.pad)`. Every pair must
be satisfied at once, so the binding pair is the one with the largest `m`; that is
the pair the solver picks.
*/

use serde::Serialize;

use crate::axis::{AutoRange, Axis, RangeMode};
use crate::classify::AxisType;
use crate::constants::FP_SAFE;
use crate::layout::AxisLayout;
use crate::registry::AxisLetter;

/// One constraint on where a range boundary may sit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Extreme {
    pub val: f64,
    pub pad: f64,
    /// Adds 5% of the axis length to `pad` when solving.
    pub extrapad: bool,
}

impl Extreme {
    pub fn new(val: f64, pad: f64) -> Self {
        Self {
            val,
            pad,
            extrapad: false,
        }
    }

    fn total_pad(&self, length: f64) -> f64 {
        self.pad + if self.extrapad { 0.05 * length } else { 0.0 }
    }
}

/// The candidate frontiers produced by one call to [`find_extremes`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extremes {
    pub min: Vec<Extreme>,
    pub max: Vec<Extreme>,
}

/// A padding value that is either shared by every point or given per point.
#[derive(Debug, Clone, PartialEq)]
pub enum Pad {
    Uniform(f64),
    PerPoint(Vec<f64>),
}

impl Pad {
    /// Padding for point `i`; negative, missing and non-finite entries read as 0.
    fn at(&self, i: usize) -> f64 {
        let v = match self {
            Pad::Uniform(v) => *v,
            Pad::PerPoint(values) => values.get(i).copied().unwrap_or(0.0),
        };
        if v.is_finite() {
            v.max(0.0)
        } else {
            0.0
        }
    }

    /// A zero uniform pad counts as unset when picking fallbacks.
    fn is_set(&self) -> bool {
        !matches!(self, Pad::Uniform(v) if *v == 0.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpandOptions {
    /// Data-space padding on both sides of each point.
    pub vpad: Option<Pad>,
    pub vpadplus: Option<Pad>,
    pub vpadminus: Option<Pad>,
    /// Pixel padding on both sides, and per side in the data direction.
    pub ppad: Option<Pad>,
    pub ppadplus: Option<Pad>,
    pub ppadminus: Option<Pad>,
    /// Reserve an extra 5% of the axis length on both sides.
    pub padded: bool,
    /// Include zero (linear axes only).
    pub tozero: bool,
}

fn pick<'a>(options: &[&'a Option<Pad>]) -> Option<&'a Pad> {
    options
        .iter()
        .find_map(|p| p.as_ref().filter(|p| p.is_set()))
}

fn good_number(v: f64) -> bool {
    v.is_finite() && v.abs() < FP_SAFE
}

/// Inserts `val` into a frontier unless an existing candidate dominates it, dropping
/// the candidates it dominates. `at_least_as_extreme(a, b)` orders one side.
fn collapse(
    array: &mut Vec<Extreme>,
    new: Extreme,
    tozero: bool,
    at_least_as_extreme: fn(f64, f64) -> bool,
) {
    let dominated = array.iter().any(|v| {
        at_least_as_extreme(v.val, new.val) && v.pad >= new.pad && (v.extrapad || !new.extrapad)
    });
    if dominated {
        return;
    }
    array.retain(|v| {
        !(at_least_as_extreme(new.val, v.val) && v.pad <= new.pad && (new.extrapad || !v.extrapad))
    });

    let clip_at_zero = tozero && new.val == 0.0;
    array.push(Extreme {
        val: new.val,
        pad: if clip_at_zero { 0.0 } else { new.pad },
        extrapad: !clip_at_zero && new.extrapad,
    });
}

fn collapse_min(array: &mut Vec<Extreme>, new: Extreme, tozero: bool) {
    collapse(array, new, tozero, |a, b| a <= b);
}

fn collapse_max(array: &mut Vec<Extreme>, new: Extreme, tozero: bool) {
    collapse(array, new, tozero, |a, b| a >= b);
}

/// Whether increasing data values run toward decreasing pixels.
fn pixels_flipped(axis: &Axis) -> bool {
    if axis.scale.m != 0.0 {
        axis.scale.m < 0.0
    } else {
        (axis.letter() == AxisLetter::Y) != axis.is_reversed()
    }
}

/// Computes the extent candidates for a column of calculated values.
pub fn find_extremes(axis: &Axis, data: &[Option<f64>], opts: &ExpandOptions) -> Extremes {
    let mut extremes = Extremes::default();
    let tozero = opts.tozero && axis.axis_type.is_linear_like();
    let is_log = axis.axis_type == AxisType::Log;

    let (plus, minus) = if pixels_flipped(axis) {
        (&opts.ppadminus, &opts.ppadplus)
    } else {
        (&opts.ppadplus, &opts.ppadminus)
    };
    let ppadplus = pick(&[plus, &opts.ppad]);
    let ppadminus = pick(&[minus, &opts.ppad]);
    let vpadplus = pick(&[&opts.vpadplus, &opts.vpad]);
    let vpadminus = pick(&[&opts.vpadminus, &opts.vpad]);
    let pad_at = |pad: Option<&Pad>, i: usize| pad.map_or(0.0, |p| p.at(i));

    let has_array_option = [ppadplus, ppadminus, vpadplus, vpadminus]
        .iter()
        .any(|p| matches!(p, Some(Pad::PerPoint(_))));

    // Without per-point pads only the two extreme values can matter
    let reduced: [Option<f64>; 2];
    let data = if has_array_option {
        data
    } else {
        let (mut vmin, mut vmax) = (f64::INFINITY, f64::NEG_INFINITY);
        for v in data.iter().flatten().copied() {
            if v < vmin && (if is_log { v > 0.0 } else { v > -FP_SAFE }) {
                vmin = v;
            }
            if v > vmax && v < FP_SAFE {
                vmax = v;
            }
        }
        reduced = [Some(vmin), Some(vmax)];
        &reduced[..]
    };

    let mut add_item = |i: usize| {
        let Some(di) = data[i].filter(|v| v.is_finite()) else {
            return;
        };

        let mut vmin = di - pad_at(vpadminus, i);
        let vmax = di + pad_at(vpadplus, i);
        // never let a data-space pad span more than a decade on log axes
        if is_log && vmin < vmax / 10.0 {
            vmin = vmax / 10.0;
        }

        let (mut dmin, mut dmax) = (
            axis.c2l(vmin, false).unwrap_or(f64::NAN),
            axis.c2l(vmax, false).unwrap_or(f64::NAN),
        );
        if tozero {
            dmin = dmin.min(0.0);
            dmax = dmax.max(0.0);
        }

        if good_number(dmin) {
            let new = Extreme {
                val: dmin,
                pad: pad_at(ppadminus, i),
                extrapad: opts.padded,
            };
            collapse_min(&mut extremes.min, new, tozero);
        }
        if good_number(dmax) {
            let new = Extreme {
                val: dmax,
                pad: pad_at(ppadplus, i),
                extrapad: opts.padded,
            };
            collapse_max(&mut extremes.max, new, tozero);
        }
    };

    // Check a few points at both ends first, monotonic data settles the frontier there
    let len = data.len();
    let head = len.min(6);
    for i in 0..head {
        add_item(i);
    }
    for i in (head..len).rev() {
        add_item(i);
    }

    extremes
}

/// Folds a column of calculated values into the axis' extent candidates.
///
/// Does nothing when the axis is not autoranging or the column is empty.
pub fn expand(axis: &mut Axis, data: &[Option<f64>], opts: &ExpandOptions) {
    if !axis.autorange.is_on() || data.is_empty() {
        return;
    }
    let tozero = opts.tozero && axis.axis_type.is_linear_like();
    let extremes = find_extremes(axis, data, opts);
    for e in extremes.min {
        collapse_min(&mut axis.min, e, tozero);
    }
    for e in extremes.max {
        collapse_max(&mut axis.max, e, tozero);
    }
}

/// Solves the best-fit range for the accumulated candidates, in linearized units.
///
/// A `Reversed` autorange flag is consumed here and becomes `On`. Returns the current
/// range unchanged when no candidates have been accumulated.
pub fn get_auto_range(axis: &mut Axis) -> [f64; 2] {
    if axis.min.is_empty() || axis.max.is_empty() {
        return axis.range;
    }

    let minmin = axis.min.iter().map(|e| e.val).fold(f64::INFINITY, f64::min);
    let maxmax = axis.max.iter().map(|e| e.val).fold(f64::NEG_INFINITY, f64::max);

    let reverse = axis.autorange == AutoRange::Reversed || axis.is_reversed();
    if axis.autorange == AutoRange::Reversed {
        axis.autorange = AutoRange::On;
    }

    let linear = axis.axis_type.is_linear_like();
    let tozero = linear && axis.rangemode == RangeMode::ToZero;
    let nonnegative = linear && axis.rangemode == RangeMode::NonNegative;
    let length = axis.scale.length;
    let pad_of = |e: &Extreme| e.total_pad(length);

    let mut new_range = if minmin == maxmax {
        let v = minmin;
        if tozero {
            if v < 0.0 {
                [v - 1.0, 0.0]
            } else {
                [0.0, v + 1.0]
            }
        } else if nonnegative {
            [(v - 1.0).max(0.0), (v + 1.0).max(1.0)]
        } else {
            [v - 1.0, v + 1.0]
        }
    } else {
        let mut mbest = 0.0;
        let mut best: Option<(Extreme, Extreme)> = None;
        for minpt in &axis.min {
            for maxpt in &axis.max {
                let dv = maxpt.val - minpt.val;
                if dv <= 0.0 {
                    continue;
                }
                let dp = length - pad_of(minpt) - pad_of(maxpt);
                if dp > 0.0 {
                    if dv / dp > mbest {
                        mbest = dv / dp;
                        best = Some((*minpt, *maxpt));
                    }
                } else if length > 0.0 && dv / length > mbest {
                    // the pads alone overflow the axis, keep the bare data in view
                    mbest = dv / length;
                    best = Some((Extreme::new(minpt.val, 0.0), Extreme::new(maxpt.val, 0.0)));
                }
            }
        }

        match best {
            None => [minmin.min(maxmax), minmin.max(maxmax)],
            Some((mut minbest, mut maxbest)) => {
                if tozero {
                    if minbest.val >= 0.0 {
                        minbest = Extreme::new(0.0, 0.0);
                    }
                    if maxbest.val <= 0.0 {
                        maxbest = Extreme::new(0.0, 0.0);
                    }
                } else if nonnegative {
                    if minbest.val - mbest * pad_of(&minbest) < 0.0 {
                        minbest = Extreme::new(0.0, 0.0);
                    }
                    if maxbest.val <= 0.0 {
                        maxbest = Extreme::new(1.0, 0.0);
                    }
                }

                let dp = length - pad_of(&minbest) - pad_of(&maxbest);
                let mbest = if dp > 0.0 {
                    (maxbest.val - minbest.val) / dp
                } else {
                    0.0
                };
                [
                    minbest.val - mbest * pad_of(&minbest),
                    maxbest.val + mbest * pad_of(&maxbest),
                ]
            }
        }
    };

    if new_range[0] == new_range[1] {
        new_range = [new_range[0] - 1.0, new_range[0] + 1.0];
    }
    if reverse {
        new_range.reverse();
    }
    new_range
}

/// Runs the solver and installs the result on the axis.
///
/// When the caller keeps a separate input layout for the axis, the solved range and
/// the (possibly downgraded) autorange flag are written back to it.
pub fn do_auto_range(axis: &mut Axis, layout_in: Option<&mut AxisLayout>) {
    if !axis.autorange.is_on() || axis.min.is_empty() || axis.max.is_empty() {
        return;
    }
    axis.range = get_auto_range(axis);
    log::debug!("autoranged {} to {:?}", axis.id, axis.range);

    if let Some(layout_in) = layout_in {
        layout_in.range = Some(vec![axis.l2r(axis.range[0]), axis.l2r(axis.range[1])]);
        layout_in.autorange = Some(axis.autorange);
    }
}
