//! Axis ids, axis names and the subplots that pair them.
//!
//! Ids look like `x`, `x2`, `y3`; layout names like `xaxis`, `xaxis2`, `yaxis3`.
//! Index 1 carries no numeric suffix in either form.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexSet;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::AxisError;
use crate::figure::Trace;
use crate::layout::{AxisLayout, Layout};

lazy_static! {
    static ref AX_ID_PATTERN: Regex = Regex::new(r"^([xy])([0-9]*)$").unwrap();
    static ref AX_NAME_PATTERN: Regex = Regex::new(r"^([xy])axis([2-9]|[1-9][0-9]+)?$").unwrap();
    static ref SUBPLOT_PATTERN: Regex = Regex::new(r"^x([0-9]*)y([0-9]*)$").unwrap();
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AxisLetter {
    X,
    Y,
}

impl AxisLetter {
    pub fn other(&self) -> Self {
        match self {
            AxisLetter::X => AxisLetter::Y,
            AxisLetter::Y => AxisLetter::X,
        }
    }
}

/// A cartesian axis id. Orders by letter, then index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AxisId {
    pub letter: AxisLetter,
    pub index: u32,
}

impl AxisId {
    pub fn new(letter: AxisLetter, index: u32) -> Self {
        Self {
            letter,
            index: index.max(1),
        }
    }

    /// The layout attribute name, e.g. `xaxis2`.
    pub fn name(&self) -> String {
        match self.index {
            1 => format!("{}axis", self.letter),
            n => format!("{}axis{n}", self.letter),
        }
    }

    /// Parses a layout attribute name such as `yaxis3`.
    pub fn from_name(name: &str) -> Result<Self, AxisError> {
        let caps = AX_NAME_PATTERN
            .captures(name)
            .ok_or_else(|| AxisError::InvalidAxisId(name.to_string()))?;
        let letter = caps[1]
            .parse()
            .map_err(|_| AxisError::InvalidAxisId(name.to_string()))?;
        let index = match caps.get(2) {
            Some(m) => m
                .as_str()
                .parse()
                .map_err(|_| AxisError::InvalidAxisId(name.to_string()))?,
            None => 1,
        };
        Ok(Self::new(letter, index))
    }
}

impl fmt::Display for AxisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            1 => write!(f, "{}", self.letter),
            n => write!(f, "{}{n}", self.letter),
        }
    }
}

impl FromStr for AxisId {
    type Err = AxisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        clean_id(s, None).ok_or_else(|| AxisError::InvalidAxisId(s.to_string()))
    }
}

impl Serialize for AxisId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AxisId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Normalizes an axis id: leading zeros are dropped and `x1` reads as `x`.
/// Returns `None` for anything that is not an axis id, or not of `letter` when given.
pub fn clean_id(id: &str, letter: Option<AxisLetter>) -> Option<AxisId> {
    let caps = AX_ID_PATTERN.captures(id)?;
    let axis_letter: AxisLetter = caps[1].parse().ok()?;
    if letter.is_some_and(|l| l != axis_letter) {
        return None;
    }
    let digits = caps[2].trim_start_matches('0');
    let index = if digits.is_empty() {
        1
    } else {
        digits.parse().ok()?
    };
    Some(AxisId::new(axis_letter, index))
}

pub fn id_sort(a: &AxisId, b: &AxisId) -> Ordering {
    a.cmp(b)
}

/// A cartesian subplot, written `x2y3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubplotId {
    pub x: AxisId,
    pub y: AxisId,
}

impl SubplotId {
    pub fn new(x: AxisId, y: AxisId) -> Self {
        Self { x, y }
    }

    pub fn contains(&self, axis: &AxisId) -> bool {
        self.x == *axis || self.y == *axis
    }
}

impl fmt::Display for SubplotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.x, self.y)
    }
}

impl FromStr for SubplotId {
    type Err = AxisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AxisError::InvalidAxisId(s.to_string());
        let caps = SUBPLOT_PATTERN.captures(s).ok_or_else(invalid)?;
        let x = clean_id(&format!("x{}", &caps[1]), None).ok_or_else(invalid)?;
        let y = clean_id(&format!("y{}", &caps[2]), None).ok_or_else(invalid)?;
        Ok(Self { x, y })
    }
}

impl Serialize for SubplotId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Layout names of the axes in `layout`, sorted by id, optionally only those of `letter`.
pub fn list_names(layout: &Layout, letter: Option<AxisLetter>) -> Vec<String> {
    list_ids(layout, letter).iter().map(AxisId::name).collect()
}

pub fn list_ids(layout: &Layout, letter: Option<AxisLetter>) -> Vec<AxisId> {
    let mut ids: Vec<AxisId> = layout
        .axes
        .keys()
        .filter(|id| letter.is_none() || letter == Some(id.letter))
        .copied()
        .collect();
    ids.sort_by(id_sort);
    ids
}

pub fn axis_from_id<'a>(layout: &'a Layout, id: &AxisId) -> Option<&'a AxisLayout> {
    layout.axes.get(id)
}

fn anchor_of(axis: &AxisLayout, letter: AxisLetter) -> Option<AxisId> {
    axis.anchor
        .as_deref()
        .and_then(|anchor| clean_id(anchor, Some(letter)))
}

/// All cartesian subplots of a figure, sorted by x index then y index.
///
/// Subplots come from the axis pairs of visible traces, then from the anchors of
/// layout axes. An unanchored axis that no subplot uses yet gets paired with the
/// first axis of the other letter.
pub fn get_subplots(traces: &[Trace], layout: &Layout) -> Vec<SubplotId> {
    let mut subplots: IndexSet<SubplotId> = traces
        .iter()
        .filter(|trace| trace.is_visible())
        .map(|trace| SubplotId::new(trace.xaxis, trace.yaxis))
        .collect();

    for (id, axis) in &layout.axes {
        if let Some(anchor) = anchor_of(axis, id.letter.other()) {
            subplots.insert(match id.letter {
                AxisLetter::X => SubplotId::new(*id, anchor),
                AxisLetter::Y => SubplotId::new(anchor, *id),
            });
        }
    }

    for (id, axis) in &layout.axes {
        if axis.overlaying.is_some() || subplots.iter().any(|s| s.contains(id)) {
            continue;
        }
        let counter = AxisId::new(id.letter.other(), 1);
        subplots.insert(match id.letter {
            AxisLetter::X => SubplotId::new(*id, counter),
            AxisLetter::Y => SubplotId::new(counter, *id),
        });
    }

    let mut out: Vec<SubplotId> = subplots.into_iter().collect();
    out.sort_by_key(|s| (s.x.index, s.y.index));
    out
}

pub fn subplots_containing_axis(subplots: &[SubplotId], axis: &AxisId) -> Vec<SubplotId> {
    subplots.iter().filter(|s| s.contains(axis)).copied().collect()
}
