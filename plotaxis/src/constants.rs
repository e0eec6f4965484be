//! Numeric constants shared by the conversion, autorange and tick code.

pub const ONESEC: f64 = 1000.0;
pub const ONEMIN: f64 = 60.0 * ONESEC;
pub const ONEHOUR: f64 = 60.0 * ONEMIN;
pub const ONEDAY: f64 = 24.0 * ONEHOUR;
pub const ONEWEEK: f64 = 7.0 * ONEDAY;
pub const ONEAVGYEAR: f64 = 365.25 * ONEDAY;
pub const ONEAVGMONTH: f64 = ONEAVGYEAR / 12.0;
pub const THREEDAYS: f64 = 3.0 * ONEDAY;

/// Candidates at or beyond this magnitude are rejected by the extent accumulator.
pub const FP_SAFE: f64 = f64::MAX / 2.0;

/// Non-positive values on a clipped log axis land this many axis lengths
/// past the low edge of the range.
pub const LOG_CLIP: f64 = 10.0;

/// Hard cap on the tick walk and on classifier samples.
pub const MAX_TICKS: usize = 1000;
pub const MAX_SAMPLES: f64 = 1000.0;

pub const DFLT_RANGE_X: [f64; 2] = [-1.0, 6.0];
pub const DFLT_RANGE_Y: [f64; 2] = [-1.0, 4.0];

/// Milliseconds of `2000-01-01` and `2000-01-02` (a Sunday), the date tick origins.
pub const DATE_TICK0: f64 = 946_684_800_000.0;
pub const DATE_TICK0_SUNDAY: f64 = DATE_TICK0 + ONEDAY;

pub const MINUS_SIGN: char = '\u{2212}';

pub const DEFAULT_FONT_SIZE: f64 = 12.0;
