//! Dodge move: shift and narrow grouped marks so they sit side by side.

use crate::error::{Error, Result};
use crate::groupby::{GroupBy, Reducer};
use crate::moves::Orient;
use crate::table::{Table, Value};

/// Policy for group slots with no observed width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Empty {
    /// Unobserved slots are filled with the bin mean and keep their
    /// space (a visually blank box remains in the layout).
    #[default]
    Keep,
    /// Unobserved slots are excluded from normalization but still count
    /// toward the slot layout; observed marks keep their dodged width.
    Drop,
    /// Unobserved slots are never materialized; observed marks expand
    /// to fill the bin.
    Fill,
}

/// Displacement and narrowing of overlapping grouped marks.
///
/// Within each position bin (one orientation value, further split by
/// any `col`/`row` facet columns), group widths are normalized so the
/// bin's slots share the widest mark's extent, then converted to
/// per-slot offsets via an exclusive running sum re-centered on zero.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dodge {
    /// Policy for groups with no observed width.
    pub empty: Empty,
    /// Fraction of each slot carved out as empty space, in [0, 1).
    /// Applied after offsets are fixed, so box centers do not move.
    pub gap: f64,
    /// Optional override of the grouping variables.
    pub by: Option<Vec<String>>,
}

impl Dodge {
    /// Create a dodge with default policy (`Keep`, no gap).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the empty-slot policy.
    #[must_use]
    pub fn empty(mut self, empty: Empty) -> Self {
        self.empty = empty;
        self
    }

    /// Set the gap fraction.
    #[must_use]
    pub fn gap(mut self, gap: f64) -> Self {
        self.gap = gap;
        self
    }

    /// Override the grouping variables.
    #[must_use]
    pub fn by<I, S>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.by = Some(vars.into_iter().map(Into::into).collect());
        self
    }

    /// Apply the dodge, returning a new table.
    ///
    /// The orientation coordinate and `width` columns are replaced; all
    /// other columns, the row count, and the row order are preserved.
    /// Every row's adjustment comes from its group in the level
    /// cross-product; rows whose values fall outside the declared level
    /// orders receive `Null` position and width.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when a `by` override names a variable
    /// that is neither declared on the grouping nor present in the
    /// data, and [`Error::MissingColumn`] when `width` or the
    /// orientation coordinate is absent.
    pub fn apply(&self, data: &Table, groupby: &GroupBy, orient: Orient) -> Result<Table> {
        let declared = groupby.variables();
        let vars: Vec<&str> = match &self.by {
            Some(names) => {
                for name in names {
                    if !declared.contains(&name.as_str()) && !data.has_column(name) {
                        return Err(Error::Config(format!(
                            "dodge grouping variable `{name}` is neither declared nor present in the data"
                        )));
                    }
                }
                names.iter().map(String::as_str).collect()
            }
            None => declared,
        };

        let grouping = groupby.grouping_over(data, &vars);
        let fill_missing = self.empty != Empty::Fill;
        let groups = grouping.agg("width", Reducer::Max, fill_missing)?;

        let pos = orient.as_str();
        let pos_values = groups.get_f64(pos).ok_or_else(|| Error::MissingColumn {
            column: pos.to_string(),
        })?;

        let n = groups.nrow();
        let widths: Vec<Option<f64>> = (0..n)
            .map(|row| groups.value("width", row).and_then(Value::as_observed))
            .collect();

        // Position bins: orientation value plus any facet columns.
        let bin_cols: Vec<&str> = std::iter::once(pos)
            .chain(["col", "row"])
            .filter(|c| groups.has_column(c) && data.has_column(c))
            .collect();
        let mut bins: Vec<(Vec<Value>, Vec<usize>)> = Vec::new();
        for row in 0..n {
            let key: Vec<Value> = bin_cols
                .iter()
                .filter_map(|c| groups.value(c, row).cloned())
                .collect();
            match bins.iter_mut().find(|(k, _)| *k == key) {
                Some((_, members)) => members.push(row),
                None => bins.push((key, vec![row])),
            }
        }

        let mut new_widths: Vec<Option<f64>> = vec![None; n];
        let mut offsets: Vec<Option<f64>> = vec![None; n];
        for (_, members) in &bins {
            let w: Vec<Option<f64>> = members.iter().map(|&r| widths[r]).collect();
            let scaled = scale_widths(self.empty, &w);
            let offs = widths_to_offsets(&scaled);
            for ((&r, scaled_w), off) in members.iter().zip(scaled).zip(offs) {
                new_widths[r] = scaled_w;
                offsets[r] = off;
            }
        }

        // Gap shrinks boxes without moving their centers.
        if self.gap > 0.0 {
            for w in &mut new_widths {
                *w = w.map(|v| v * (1.0 - self.gap));
            }
        }

        let positions: Vec<Option<f64>> = (0..n)
            .map(|row| offsets[row].map(|off| pos_values[row] + off))
            .collect();

        // Left-merge back by group identity: each original row matches
        // the aggregate row of its own group.
        let mut slot_of_group: Vec<Option<usize>> = vec![None; grouping.len()];
        for row in 0..n {
            if let Some(index) = grouping.group_index(&groups, row) {
                slot_of_group[index] = Some(row);
            }
        }

        let mut out_pos: Vec<Value> = Vec::with_capacity(data.nrow());
        let mut out_width: Vec<Value> = Vec::with_capacity(data.nrow());
        for row in 0..data.nrow() {
            let slot = grouping
                .group_index(data, row)
                .and_then(|index| slot_of_group[index]);
            match slot {
                Some(g) => {
                    out_pos.push(positions[g].into());
                    out_width.push(new_widths[g].into());
                }
                None => {
                    out_pos.push(Value::Null);
                    out_width.push(Value::Null);
                }
            }
        }

        let mut out = data.clone();
        out.add_column(pos, out_pos);
        out.add_column("width", out_width);
        Ok(out)
    }
}

/// Normalize one bin's widths so its slots divide the widest mark.
///
/// `space` is the bin mean of observed widths (zero under `Fill`);
/// missing widths are filled with it before computing the bin maximum
/// (`scale`) and sum (`norm`). Under `Keep` the filled values carry into
/// the division so blank slots retain their share; otherwise the
/// original values (missing included) are divided, so unobserved slots
/// stay missing. An all-missing bin yields NaN throughout, which
/// propagates instead of raising.
fn scale_widths(empty: Empty, w: &[Option<f64>]) -> Vec<Option<f64>> {
    let observed: Vec<f64> = w.iter().flatten().copied().collect();
    let space = match empty {
        Empty::Fill => 0.0,
        Empty::Keep | Empty::Drop => {
            if observed.is_empty() {
                f64::NAN
            } else {
                observed.iter().sum::<f64>() / observed.len() as f64
            }
        }
    };
    let filled: Vec<f64> = w.iter().map(|o| o.unwrap_or(space)).collect();
    let scale = filled.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let norm: f64 = filled.iter().sum();

    let base: Vec<Option<f64>> = match empty {
        Empty::Keep => filled.into_iter().map(Some).collect(),
        Empty::Drop | Empty::Fill => w.to_vec(),
    };
    base.into_iter().map(|o| o.map(|v| v / norm * scale)).collect()
}

/// Exclusive running sum of slot widths, re-centered so the bin's
/// occupied span sits on zero. Missing slots contribute nothing to the
/// running sum and receive no offset.
fn widths_to_offsets(w: &[Option<f64>]) -> Vec<Option<f64>> {
    let total: f64 = w.iter().flatten().sum();
    let mut out = Vec::with_capacity(w.len());
    let mut cum = 0.0;
    let mut prev = 0.0;
    for &slot in w {
        cum += prev;
        out.push(slot.map(|v| cum + (v - total) / 2.0));
        prev = slot.unwrap_or(0.0);
    }
    out
}
