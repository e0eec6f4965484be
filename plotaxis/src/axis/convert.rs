//! Conversions between the four coordinate spaces of an axis.
//!
//! - `d`: raw data, as it appears in a trace column or layout attribute
//! - `c`: calculated values (numbers, epoch ms for dates, indices for categories)
//! - `l`: linearized values, `log10(c)` on log axes and `c` otherwise
//! - `p`: pixels from the start of the axis
//!
//! `r` is the space ranges are written in; for every axis type it is `l`, except that
//! dates are rendered back as strings at the layout boundary.

use indexmap::IndexSet;

use super::{Axis, Category, PlotSize, RangeMode};
use crate::classify::AxisType;
use crate::constants::{DFLT_RANGE_X, DFLT_RANGE_Y, FP_SAFE, LOG_CLIP, ONESEC};
use crate::dates::{clean_date, date_time_to_ms, ms_to_date_time, MAX_MS, MIN_MS};
use crate::datum::{clean_number, to_number, Datum};
use crate::error::AxisError;
use crate::registry::AxisLetter;

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

impl Axis {
    /// Parses a date datum, falling back to treating numbers as milliseconds.
    fn dt2ms(&self, d: &Datum) -> Option<f64> {
        date_time_to_ms(d, self.calendar).or_else(|| {
            to_number(d).filter(|v| *v >= *MIN_MS && *v <= *MAX_MS)
        })
    }

    fn to_log(&self, v: f64, clip: bool) -> Option<f64> {
        if v > 0.0 {
            Some(v.log10())
        } else if clip {
            let [r0, r1] = self.range;
            Some(0.5 * (r0 + r1 - 2.0 * LOG_CLIP * (r0 - r1).abs()))
        } else {
            None
        }
    }

    /// Registers a category label (if new) and returns its index.
    pub fn register_category(&mut self, d: &Datum) -> Option<f64> {
        let category = Category::from_datum(d)?;
        Some(self.categories.insert_full(category).0 as f64)
    }

    /// Index of an already registered category, without registering it.
    pub fn lookup_category(&self, d: &Datum) -> Option<f64> {
        let category = match (self.axis_type, d) {
            (AxisType::Multicategory, Datum::Array(pair)) if pair.len() == 2 => {
                Category::pair(&pair[0], &pair[1])?
            }
            _ => Category::from_datum(d)?,
        };
        self.categories.get_index_of(&category).map(|i| i as f64)
    }

    pub fn d2c(&self, d: &Datum) -> Option<f64> {
        match self.axis_type {
            AxisType::Date => self.dt2ms(d),
            AxisType::Category | AxisType::Multicategory => self.lookup_category(d),
            AxisType::Linear | AxisType::Log | AxisType::Undetermined => clean_number(d),
        }
    }

    pub fn c2d(&self, v: f64) -> Datum {
        match self.axis_type {
            AxisType::Date => ms_to_date_time(v, 0.0).map_or(Datum::Null, Datum::Text),
            AxisType::Category | AxisType::Multicategory => self.category_at(v),
            _ => Datum::Number(v),
        }
    }

    /// The category nearest to a linearized value, if any.
    pub fn category_at(&self, v: f64) -> Datum {
        if !v.is_finite() || v.round() < 0.0 {
            return Datum::Null;
        }
        self.categories
            .get_index(v.round() as usize)
            .map_or(Datum::Null, Category::to_datum)
    }

    /// Calculated to linearized. With `clip`, non-positive values on a log axis land
    /// far below the current range instead of being dropped.
    pub fn c2l(&self, v: f64, clip: bool) -> Option<f64> {
        if !v.is_finite() {
            return None;
        }
        match self.axis_type {
            AxisType::Log => self.to_log(v, clip),
            _ => Some(v),
        }
    }

    pub fn l2c(&self, v: f64) -> f64 {
        match self.axis_type {
            AxisType::Log => 10f64.powf(v),
            _ => v,
        }
    }

    pub fn d2l(&self, d: &Datum) -> Option<f64> {
        match self.axis_type {
            AxisType::Log => self.to_log(clean_number(d)?, false),
            _ => self.d2c(d),
        }
    }

    pub fn l2d(&self, v: f64) -> Datum {
        self.c2d(self.l2c(v))
    }

    /// Range value to linearized. Category ranges may be given as indices or labels.
    pub fn r2l(&self, r: &Datum) -> Option<f64> {
        match self.axis_type {
            AxisType::Date => self.dt2ms(r),
            AxisType::Category | AxisType::Multicategory => {
                to_number(r).or_else(|| self.lookup_category(r))
            }
            _ => clean_number(r),
        }
    }

    pub fn l2r(&self, v: f64) -> Datum {
        match self.axis_type {
            AxisType::Date => ms_to_date_time(v, 0.0).map_or(Datum::Null, Datum::Text),
            _ => Datum::Number(v),
        }
    }

    /// Linearized to pixel, rounded to 2 decimals and clamped to
    /// `[-10 * length, 11 * length]`.
    pub fn l2p(&self, v: f64) -> f64 {
        let length = self.scale.length;
        round2(self.scale.b + self.scale.m * v).clamp(-10.0 * length, 11.0 * length)
    }

    pub fn p2l(&self, px: f64) -> f64 {
        (px - self.scale.b) / self.scale.m
    }

    pub fn c2p(&self, v: f64, clip: bool) -> Option<f64> {
        self.c2l(v, clip).map(|l| self.l2p(l))
    }

    pub fn p2c(&self, px: f64) -> f64 {
        self.l2c(self.p2l(px))
    }

    pub fn d2p(&self, d: &Datum) -> Option<f64> {
        self.d2l(d).map(|l| self.l2p(l))
    }

    pub fn p2d(&self, px: f64) -> Datum {
        self.l2d(self.p2l(px))
    }

    /// Linearized value at a fraction of the way through the range.
    pub fn fraction_to_range(&self, fraction: f64) -> f64 {
        let [r0, r1] = self.range;
        r0 + fraction * (r1 - r0)
    }

    pub fn range_to_fraction(&self, v: f64) -> f64 {
        let [r0, r1] = self.range;
        (v - r0) / (r1 - r0)
    }

    /// Whether a calculated value falls inside the current range (either orientation).
    pub fn is_pt_within_range(&self, v: f64) -> bool {
        let Some(l) = self.c2l(v, false) else {
            return false;
        };
        let [r0, r1] = self.range;
        l >= r0.min(r1) && l <= r0.max(r1)
    }

    /// Cleans a position attribute (an annotation or shape coordinate, say) into
    /// calculated space without registering categories.
    pub fn clean_pos(&self, d: &Datum) -> Option<f64> {
        match self.axis_type {
            AxisType::Date => clean_date(d, self.calendar),
            AxisType::Category | AxisType::Multicategory => {
                self.lookup_category(d).or_else(|| to_number(d))
            }
            _ => clean_number(d),
        }
    }

    fn default_range(&self) -> [f64; 2] {
        if self.axis_type == AxisType::Date {
            // 2000-01-01 through 2001-01-01
            return [946_684_800_000.0, 978_307_200_000.0];
        }
        let mut dflt = match self.letter() {
            AxisLetter::X => DFLT_RANGE_X,
            AxisLetter::Y => DFLT_RANGE_Y,
        };
        if matches!(self.rangemode, RangeMode::ToZero | RangeMode::NonNegative) {
            dflt[0] = 0.0;
        }
        dflt
    }

    /// Changes the axis type. The conversions dispatch on the type, so only the
    /// state expressed in the old type's coordinates is reset. Setting the
    /// current type again leaves the axis untouched.
    pub fn set_type(&mut self, axis_type: AxisType) {
        if self.axis_type == axis_type {
            return;
        }
        self.axis_type = axis_type;
        self.reset_categories();
        self.reset_extremes();
        self.clean_range([None, None]);
    }

    /// Installs a range from possibly invalid linearized bounds.
    ///
    /// A missing bound with a valid partner becomes a tenth (low end) or ten times
    /// (high end) the partner; with neither valid the default range is used. Equal
    /// bounds are split apart.
    pub fn clean_range(&mut self, raw: [Option<f64>; 2]) {
        let finite = |v: Option<f64>| v.filter(|v| v.is_finite());
        let mut range = match (finite(raw[0]), finite(raw[1])) {
            (Some(r0), Some(r1)) => [r0, r1],
            (None, Some(r1)) => [r1 * 0.1, r1],
            (Some(r0), None) => [r0, r0 * 10.0],
            (None, None) => {
                self.range = self.default_range();
                return;
            }
        };

        for r in range.iter_mut() {
            *r = r.clamp(-FP_SAFE, FP_SAFE);
        }

        if range[0] == range[1] {
            let inc = if self.axis_type == AxisType::Date {
                ONESEC
            } else {
                (range[0] * 1e-6).abs().max(1.0)
            };
            range[0] -= inc;
            range[1] += inc;
        }
        self.range = range;
    }

    /// Recomputes the pixel mapping from the plot geometry, the domain and the range.
    pub fn set_scale(&mut self, size: &PlotSize) -> Result<(), AxisError> {
        self.plot_size = *size;
        self.clean_range(self.range.map(Some));

        let [rl0, rl1] = self.range;
        let [d0, d1] = self.domain;
        let (offset, length, m, b) = match self.letter() {
            AxisLetter::X => {
                let length = size.w * (d1 - d0);
                let m = length / (rl1 - rl0);
                (size.l + d0 * size.w, length, m, -m * rl0)
            }
            AxisLetter::Y => {
                let length = size.h * (d1 - d0);
                let m = length / (rl0 - rl1);
                (size.t + (1.0 - d1) * size.h, length, m, -m * rl1)
            }
        };

        if !m.is_finite() || !b.is_finite() || !(length > 0.0) {
            return Err(AxisError::NonFiniteScale {
                id: self.id.to_string(),
                m,
                b,
                length,
            });
        }

        self.scale.offset = offset;
        self.scale.length = length;
        self.scale.m = m;
        self.scale.b = b;
        Ok(())
    }

    /// Converts a trace column to calculated values, registering category labels.
    ///
    /// Multicategory columns are `[outer_labels, inner_labels]` and are looked up
    /// against the pairs installed by [`Axis::setup_multicategory`].
    pub fn make_calcdata(&mut self, data: &[Datum]) -> Vec<Option<f64>> {
        match self.axis_type {
            AxisType::Category => data.iter().map(|d| self.register_category(d)).collect(),
            AxisType::Multicategory => match data {
                [Datum::Array(outer), Datum::Array(inner)] => outer
                    .iter()
                    .zip(inner)
                    .map(|(o, i)| {
                        let pair = Category::pair(o, i)?;
                        self.categories.get_index_of(&pair).map(|i| i as f64)
                    })
                    .collect(),
                _ => vec![],
            },
            _ => data.iter().map(|d| self.d2c(d)).collect(),
        }
    }

    /// Calculated values `v0 + i * dv` for traces positioned by a start and step.
    pub fn make_calcdata_from_step(&self, v0: f64, dv: f64, len: usize) -> Vec<Option<f64>> {
        (0..len)
            .map(|i| Some(v0 + i as f64 * dv).filter(|v| v.is_finite()))
            .collect()
    }

    /// Registers every `(outer, inner)` pair found in the given multicategory
    /// columns, ordered by the first appearance of the outer label and then of the
    /// inner label.
    pub fn setup_multicategory(&mut self, columns: &[&[Datum]]) {
        let mut outer_seen = IndexSet::new();
        let mut inner_seen = IndexSet::new();
        let mut pairs = vec![];

        for column in columns {
            let [Datum::Array(outer), Datum::Array(inner)] = *column else {
                continue;
            };
            for (o, i) in outer.iter().zip(inner) {
                if let Some(Category::Pair(a, b)) = Category::pair(o, i) {
                    if a.is_empty() || b.is_empty() {
                        continue;
                    }
                    let ia = outer_seen.insert_full(a.clone()).0;
                    let ib = inner_seen.insert_full(b.clone()).0;
                    pairs.push((ia, ib, Category::Pair(a, b)));
                }
            }
        }

        pairs.sort_by_key(|(ia, ib, _)| (*ia, *ib));
        for (_, _, pair) in pairs {
            self.categories.insert(pair);
        }
    }
}
