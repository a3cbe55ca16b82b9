//! Position-adjustment moves.
//!
//! A move is a value object holding its own parameters and exposing one
//! operation: apply to a table, given the layer's grouping and the
//! orientation axis, and return a new adjusted table. Moves compose by
//! sequential application; [`apply_moves`] runs an ordered pipeline.

mod dodge;
mod jitter;

pub use dodge::{Dodge, Empty};
pub use jitter::Jitter;

use crate::error::Result;
use crate::groupby::GroupBy;
use crate::table::Table;

/// The axis along which categorical positioning and adjustment happen.
///
/// The perpendicular axis is the "thickness" direction, untouched by
/// moves except via height jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orient {
    /// Marks are positioned along x.
    #[default]
    X,
    /// Marks are positioned along y.
    Y,
}

impl Orient {
    /// The coordinate column name for this axis.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Orient::X => "x",
            Orient::Y => "y",
        }
    }

    /// The perpendicular axis.
    #[must_use]
    pub fn cross(self) -> Orient {
        match self {
            Orient::X => Orient::Y,
            Orient::Y => Orient::X,
        }
    }
}

/// A position-adjustment move.
///
/// Closed set of variants; an orchestrator holds an ordered list of
/// these and applies them in sequence.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Move {
    /// Add random noise to mark positions.
    Jitter(Jitter),
    /// Shift and narrow grouped marks so they sit side by side.
    Dodge(Dodge),
}

impl Move {
    /// Apply this move, returning a new adjusted table.
    ///
    /// # Errors
    ///
    /// Propagates the variant's own errors (missing columns,
    /// unresolvable grouping configuration).
    pub fn apply(&self, data: &Table, groupby: &GroupBy, orient: Orient) -> Result<Table> {
        match self {
            Move::Jitter(jitter) => jitter.apply(data, groupby, orient),
            Move::Dodge(dodge) => dodge.apply(data, groupby, orient),
        }
    }
}

impl From<Jitter> for Move {
    fn from(jitter: Jitter) -> Self {
        Move::Jitter(jitter)
    }
}

impl From<Dodge> for Move {
    fn from(dodge: Dodge) -> Self {
        Move::Dodge(dodge)
    }
}

/// Apply an ordered sequence of moves.
///
/// The output of move *i* is the input of move *i + 1*; the same
/// grouping and orientation are passed to each. The first failing move
/// aborts the pipeline.
///
/// # Errors
///
/// Returns the first move error encountered.
pub fn apply_moves(
    data: &Table,
    moves: &[Move],
    groupby: &GroupBy,
    orient: Orient,
) -> Result<Table> {
    let mut current = data.clone();
    for mv in moves {
        current = mv.apply(&current, groupby, orient)?;
    }
    Ok(current)
}
