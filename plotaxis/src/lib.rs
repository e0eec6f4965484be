//! Cartesian axis core: data classification, coordinate conversion, autorange,
//! tick generation and tick label formatting for 2D charts.

pub mod autorange;
pub mod axis;
pub mod classify;
pub mod constants;
pub mod dates;
pub mod datum;
pub mod error;
pub mod figure;
pub mod format;
pub mod layout;
pub mod pipeline;
pub mod registry;
pub mod ticks;

pub use axis::Axis;
pub use datum::Datum;
pub use error::AxisError;
pub use figure::Figure;
pub use layout::{AxisLayout, Layout};
pub use pipeline::{CalcAxis, RangedAxis, TickedAxis};
