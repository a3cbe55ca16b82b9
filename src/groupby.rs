//! Cross-product grouping and per-group aggregation.
//!
//! A [`GroupBy`] captures the grouping variables for one plot layer and
//! their declared level orders. Binding it to a table yields a
//! [`Grouping`]: the full cross-product of level combinations, each
//! mapped to a unique integer group index via mixed-radix encoding.
//! The index doubles as sort key and group identity, so aggregation and
//! later lookups agree without hashing heterogeneous keys.

use crate::error::{Error, Result};
use crate::scale::ScaleSet;
use crate::table::{Table, Value};

/// Derive a deterministic level order from a data column.
///
/// Distinct non-missing values; all-numeric columns sort ascending,
/// anything else keeps first-appearance order. NaN counts as missing.
#[must_use]
pub fn categorical_order(values: &[Value]) -> Vec<Value> {
    let mut levels: Vec<Value> = Vec::new();
    for v in values {
        if v.is_null() || matches!(v, Value::Number(n) if n.is_nan()) {
            continue;
        }
        if !levels.contains(v) {
            levels.push(v.clone());
        }
    }
    if levels.iter().all(|v| matches!(v, Value::Number(_))) {
        levels.sort_by(|a, b| match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal),
            _ => std::cmp::Ordering::Equal,
        });
    }
    levels
}

/// Aggregation function applied within each group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Reducer {
    /// Maximum value.
    Max,
    /// Minimum value.
    Min,
    /// Sum of values.
    Sum,
    /// Arithmetic mean.
    Mean,
    /// Number of observed values.
    Count,
}

impl Reducer {
    /// Reduce a non-empty slice of observed values.
    ///
    /// Callers must not pass an empty slice; [`Grouping::agg`] guards
    /// this with its observed/missing split and emits `Null` instead.
    #[must_use]
    pub fn reduce(&self, values: &[f64]) -> f64 {
        match self {
            Reducer::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Reducer::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Reducer::Sum => values.iter().sum(),
            Reducer::Mean => values.iter().sum::<f64>() / values.len() as f64,
            Reducer::Count => values.len() as f64,
        }
    }
}

/// Grouping variables and their declared level orders for one plot layer.
///
/// Constructed once per layer invocation and reused read-only across
/// every move in that layer.
#[derive(Debug, Clone)]
pub struct GroupBy {
    orderings: Vec<(String, Option<Vec<Value>>)>,
}

impl GroupBy {
    /// Capture grouping variables and any explicit orders from `scales`.
    ///
    /// Variables without a declared order get one derived from the data
    /// at binding time via [`categorical_order`].
    #[must_use]
    pub fn new(variables: &[&str], scales: &ScaleSet) -> Self {
        let orderings = variables
            .iter()
            .map(|&var| (var.to_string(), scales.order(var).map(<[Value]>::to_vec)))
            .collect();
        Self { orderings }
    }

    /// Declared grouping variable names, in order.
    #[must_use]
    pub fn variables(&self) -> Vec<&str> {
        self.orderings.iter().map(|(var, _)| var.as_str()).collect()
    }

    /// Bind the declared variables to a table.
    #[must_use]
    pub fn grouping<'a>(&self, data: &'a Table) -> Grouping<'a> {
        let vars = self.variables();
        self.grouping_over(data, &vars)
    }

    /// Bind an explicit variable subset to a table.
    ///
    /// Variables not present as columns in `data` are silently skipped,
    /// so one `GroupBy` can serve tables with different facet subsets.
    #[must_use]
    pub fn grouping_over<'a>(&self, data: &'a Table, vars: &[&str]) -> Grouping<'a> {
        let mut levels = Vec::new();
        for &var in vars {
            let Some(column) = data.get(var) else { continue };
            let declared = self
                .orderings
                .iter()
                .find(|(name, _)| name == var)
                .and_then(|(_, order)| order.clone());
            let order = match declared {
                Some(order) => order,
                None => categorical_order(column),
            };
            levels.push((var.to_string(), order));
        }
        Grouping::new(data, levels)
    }

    /// Aggregate `column` over the full declared grouping.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingColumn`] if `column` is absent from `data`.
    pub fn agg(
        &self,
        data: &Table,
        column: &str,
        reducer: Reducer,
        fill_missing: bool,
    ) -> Result<Table> {
        self.grouping(data).agg(column, reducer, fill_missing)
    }
}

/// A [`GroupBy`] bound to a specific table.
///
/// Holds the resolved level order per variable plus mixed-radix strides;
/// the first variable varies slowest, matching row-major cross-product
/// order.
#[derive(Debug, Clone)]
pub struct Grouping<'a> {
    data: &'a Table,
    levels: Vec<(String, Vec<Value>)>,
    strides: Vec<usize>,
    len: usize,
}

impl<'a> Grouping<'a> {
    fn new(data: &'a Table, levels: Vec<(String, Vec<Value>)>) -> Self {
        let mut strides = vec![1usize; levels.len()];
        for i in (0..levels.len().saturating_sub(1)).rev() {
            strides[i] = strides[i + 1] * levels[i + 1].1.len();
        }
        let len = levels.iter().map(|(_, order)| order.len()).product();
        Self {
            data,
            levels,
            strides,
            len,
        }
    }

    /// The table this grouping is bound to.
    #[must_use]
    pub fn data(&self) -> &Table {
        self.data
    }

    /// Names of the bound grouping variables, in order.
    #[must_use]
    pub fn vars(&self) -> Vec<&str> {
        self.levels.iter().map(|(var, _)| var.as_str()).collect()
    }

    /// Total number of groups in the cross-product.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the cross-product is empty (some variable has no levels).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The group index of one row of `table`.
    ///
    /// `table` may be the bound table or any table carrying the grouping
    /// columns (such as an aggregate produced by [`Grouping::agg`]).
    /// Returns `None` when a value falls outside its level order; such
    /// rows belong to no group and are excluded from aggregation.
    #[must_use]
    pub fn group_index(&self, table: &Table, row: usize) -> Option<usize> {
        let mut index = 0;
        for ((var, order), stride) in self.levels.iter().zip(&self.strides) {
            let value = table.value(var, row)?;
            let rank = order.iter().position(|level| level == value)?;
            index += rank * stride;
        }
        Some(index)
    }

    /// Re-expand a group index into its level values, one per variable.
    #[must_use]
    pub fn key(&self, index: usize) -> Vec<Value> {
        debug_assert!(index < self.len);
        let mut key = Vec::with_capacity(self.levels.len());
        let mut rest = index;
        for ((_, order), stride) in self.levels.iter().zip(&self.strides) {
            let rank = rest / stride;
            rest %= stride;
            key.push(order[rank].clone());
        }
        key
    }

    /// Aggregate `column` within each group.
    ///
    /// Output rows are in ascending group-index order and carry the
    /// grouping-variable values (re-expanded from the group key) plus
    /// the aggregated column. With `fill_missing`, every group in the
    /// cross-product gets a row and unobserved groups aggregate to
    /// `Null`; otherwise only observed groups appear. Missing values in
    /// `column` are skipped before reduction, and a group with nothing
    /// observed aggregates to `Null` rather than invoking the reducer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingColumn`] if `column` is absent.
    pub fn agg(&self, column: &str, reducer: Reducer, fill_missing: bool) -> Result<Table> {
        let col = self.data.get(column).ok_or_else(|| Error::MissingColumn {
            column: column.to_string(),
        })?;

        let mut buckets: Vec<Vec<f64>> = vec![Vec::new(); self.len];
        let mut observed = vec![false; self.len];
        for row in 0..self.data.nrow() {
            let Some(index) = self.group_index(self.data, row) else {
                continue;
            };
            observed[index] = true;
            if let Some(v) = col.get(row).and_then(Value::as_observed) {
                buckets[index].push(v);
            }
        }

        let mut var_values: Vec<Vec<Value>> = vec![Vec::new(); self.levels.len()];
        let mut agg_values: Vec<Value> = Vec::new();
        for index in 0..self.len {
            if !fill_missing && !observed[index] {
                continue;
            }
            for (slot, value) in var_values.iter_mut().zip(self.key(index)) {
                slot.push(value);
            }
            let bucket = &buckets[index];
            agg_values.push(if bucket.is_empty() {
                Value::Null
            } else {
                Value::Number(reducer.reduce(bucket))
            });
        }

        let mut out = Table::new();
        for ((var, _), values) in self.levels.iter().zip(var_values) {
            out.add_column(var, values);
        }
        out.add_column(column, agg_values);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_table() -> Table {
        let mut t = Table::new();
        t.add_column_f64("x", &[0.0, 0.0, 1.0]);
        t.add_column_str("grp", &["a", "b", "b"]);
        t.add_column_f64("width", &[0.8, 0.8, 0.8]);
        t
    }

    #[test]
    fn test_categorical_order_numeric_sorts() {
        let values = vec![
            Value::Number(2.0),
            Value::Number(0.0),
            Value::Number(2.0),
            Value::Number(1.0),
        ];
        let order = categorical_order(&values);
        assert_eq!(
            order,
            vec![Value::Number(0.0), Value::Number(1.0), Value::Number(2.0)]
        );
    }

    #[test]
    fn test_categorical_order_text_first_appearance() {
        let values = vec![
            Value::Text("b".into()),
            Value::Text("a".into()),
            Value::Text("b".into()),
        ];
        let order = categorical_order(&values);
        assert_eq!(order, vec![Value::Text("b".into()), Value::Text("a".into())]);
    }

    #[test]
    fn test_categorical_order_skips_missing() {
        let values = vec![Value::Null, Value::Number(f64::NAN), Value::Number(1.0)];
        assert_eq!(categorical_order(&values), vec![Value::Number(1.0)]);
    }

    #[test]
    fn test_cross_product_size() {
        let data = toy_table();
        let groupby = GroupBy::new(&["x", "grp"], &ScaleSet::new());
        let grouping = groupby.grouping(&data);
        // x has levels {0, 1}, grp has levels {a, b}
        assert_eq!(grouping.len(), 4);
    }

    #[test]
    fn test_cross_product_includes_declared_unobserved() {
        let data = toy_table();
        let scales = ScaleSet::new().declare_str("grp", &["a", "b", "c"]);
        let groupby = GroupBy::new(&["x", "grp"], &scales);
        assert_eq!(groupby.grouping(&data).len(), 6);
    }

    #[test]
    fn test_absent_variable_skipped() {
        let data = toy_table();
        let groupby = GroupBy::new(&["x", "grp", "col"], &ScaleSet::new());
        let grouping = groupby.grouping(&data);
        assert_eq!(grouping.vars(), vec!["x", "grp"]);
        assert_eq!(grouping.len(), 4);
    }

    #[test]
    fn test_group_index_first_var_slowest() {
        let data = toy_table();
        let groupby = GroupBy::new(&["x", "grp"], &ScaleSet::new());
        let grouping = groupby.grouping(&data);
        // (x=0, grp=a) -> 0, (x=0, grp=b) -> 1, (x=1, grp=b) -> 3
        assert_eq!(grouping.group_index(&data, 0), Some(0));
        assert_eq!(grouping.group_index(&data, 1), Some(1));
        assert_eq!(grouping.group_index(&data, 2), Some(3));
    }

    #[test]
    fn test_key_round_trip() {
        let data = toy_table();
        let groupby = GroupBy::new(&["x", "grp"], &ScaleSet::new());
        let grouping = groupby.grouping(&data);
        for index in 0..grouping.len() {
            let key = grouping.key(index);
            let probe = Table::new()
                .with_column("x", vec![key[0].clone()])
                .with_column("grp", vec![key[1].clone()]);
            assert_eq!(grouping.group_index(&probe, 0), Some(index));
        }
    }

    #[test]
    fn test_value_outside_order_excluded() {
        let data = toy_table();
        let scales = ScaleSet::new().declare_str("grp", &["a"]);
        let groupby = GroupBy::new(&["x", "grp"], &scales);
        let grouping = groupby.grouping(&data);
        // rows with grp == "b" fall outside the declared order
        assert_eq!(grouping.group_index(&data, 0), Some(0));
        assert_eq!(grouping.group_index(&data, 1), None);
    }

    #[test]
    fn test_agg_observed_only() {
        let data = toy_table();
        let groupby = GroupBy::new(&["x", "grp"], &ScaleSet::new());
        let res = groupby.agg(&data, "width", Reducer::Max, false).unwrap();
        // (1, a) is unobserved and omitted
        assert_eq!(res.nrow(), 3);
        assert_eq!(res.columns(), vec!["x", "grp", "width"]);
        let widths = res.get_f64("width").unwrap();
        assert_eq!(widths, vec![0.8, 0.8, 0.8]);
    }

    #[test]
    fn test_agg_fill_missing() {
        let data = toy_table();
        let groupby = GroupBy::new(&["x", "grp"], &ScaleSet::new());
        let res = groupby.agg(&data, "width", Reducer::Max, true).unwrap();
        assert_eq!(res.nrow(), 4);
        // index 2 is (x=1, grp=a): unobserved, so Null width
        assert!(res.value("width", 2).unwrap().is_null());
        assert_eq!(res.value("grp", 2).unwrap(), &Value::Text("a".into()));
        assert_eq!(res.value("x", 2).unwrap(), &Value::Number(1.0));
    }

    #[test]
    fn test_agg_missing_column_errors() {
        let data = toy_table();
        let groupby = GroupBy::new(&["x", "grp"], &ScaleSet::new());
        let err = groupby.agg(&data, "height", Reducer::Max, false).unwrap_err();
        assert!(matches!(err, Error::MissingColumn { .. }));
    }

    #[test]
    fn test_agg_reducers() {
        let mut data = Table::new();
        data.add_column_str("grp", &["a", "a", "b"]);
        data.add_column_f64("v", &[1.0, 3.0, 5.0]);
        let groupby = GroupBy::new(&["grp"], &ScaleSet::new());

        let sums = groupby.agg(&data, "v", Reducer::Sum, false).unwrap();
        assert_eq!(sums.get_f64("v").unwrap(), vec![4.0, 5.0]);

        let means = groupby.agg(&data, "v", Reducer::Mean, false).unwrap();
        assert_eq!(means.get_f64("v").unwrap(), vec![2.0, 5.0]);

        let counts = groupby.agg(&data, "v", Reducer::Count, false).unwrap();
        assert_eq!(counts.get_f64("v").unwrap(), vec![2.0, 1.0]);

        let mins = groupby.agg(&data, "v", Reducer::Min, false).unwrap();
        assert_eq!(mins.get_f64("v").unwrap(), vec![1.0, 5.0]);
    }

    #[test]
    fn test_agg_skips_missing_values() {
        let mut data = Table::new();
        data.add_column_str("grp", &["a", "a"]);
        data.add_column("v", vec![Value::Number(2.0), Value::Null]);
        let groupby = GroupBy::new(&["grp"], &ScaleSet::new());
        let res = groupby.agg(&data, "v", Reducer::Mean, false).unwrap();
        assert_eq!(res.get_f64("v").unwrap(), vec![2.0]);
    }

    #[test]
    fn test_agg_all_missing_group_is_null() {
        let mut data = Table::new();
        data.add_column_str("grp", &["a", "b"]);
        data.add_column("v", vec![Value::Null, Value::Number(1.0)]);
        let groupby = GroupBy::new(&["grp"], &ScaleSet::new());
        let res = groupby.agg(&data, "v", Reducer::Max, false).unwrap();
        // grp=a observed but nothing to reduce
        assert!(res.value("v", 0).unwrap().is_null());
        assert_eq!(res.value("v", 1).unwrap(), &Value::Number(1.0));
    }

    #[test]
    fn test_explicit_order_used_verbatim() {
        let data = toy_table();
        let scales = ScaleSet::new().declare_str("grp", &["b", "a"]);
        let groupby = GroupBy::new(&["grp"], &scales);
        let res = groupby.agg(&data, "width", Reducer::Max, false).unwrap();
        assert_eq!(res.value("grp", 0).unwrap(), &Value::Text("b".into()));
        assert_eq!(res.value("grp", 1).unwrap(), &Value::Text("a".into()));
    }
}

// ============================================================================
// Property-based tests with proptest
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// The cross-product size equals the product of level counts,
        /// however many combinations the data actually contains.
        #[test]
        fn prop_cross_product_completeness(
            n_x in 1usize..6,
            n_grp in 1usize..6,
        ) {
            let xs: Vec<f64> = (0..n_x).map(|i| i as f64).collect();
            let grps: Vec<String> = (0..n_grp).map(|i| format!("g{i}")).collect();
            let grp_refs: Vec<&str> = grps.iter().map(String::as_str).collect();

            // one observation only, far fewer than the cross-product
            let mut data = Table::new();
            data.add_column_f64("x", &xs[..1]);
            data.add_column_str("grp", &grp_refs[..1]);

            let scales = ScaleSet::new()
                .declare_f64("x", &xs)
                .declare_str("grp", &grp_refs);
            let groupby = GroupBy::new(&["x", "grp"], &scales);
            prop_assert_eq!(groupby.grouping(&data).len(), n_x * n_grp);
        }

        /// Group index and key form a bijection over the cross-product.
        #[test]
        fn prop_index_key_bijection(
            n_x in 1usize..5,
            n_grp in 1usize..5,
            n_sub in 1usize..4,
        ) {
            let xs: Vec<f64> = (0..n_x).map(|i| i as f64).collect();
            let grps: Vec<String> = (0..n_grp).map(|i| format!("g{i}")).collect();
            let grp_refs: Vec<&str> = grps.iter().map(String::as_str).collect();
            let subs: Vec<f64> = (0..n_sub).map(|i| i as f64 * 10.0).collect();

            let scales = ScaleSet::new()
                .declare_f64("x", &xs)
                .declare_str("grp", &grp_refs)
                .declare_f64("sub", &subs);
            let groupby = GroupBy::new(&["x", "grp", "sub"], &scales);

            let mut data = Table::new();
            data.add_column_f64("x", &xs[..1]);
            data.add_column_str("grp", &grp_refs[..1]);
            data.add_column_f64("sub", &subs[..1]);
            let grouping = groupby.grouping(&data);

            for index in 0..grouping.len() {
                let key = grouping.key(index);
                let probe = Table::new()
                    .with_column("x", vec![key[0].clone()])
                    .with_column("grp", vec![key[1].clone()])
                    .with_column("sub", vec![key[2].clone()]);
                prop_assert_eq!(grouping.group_index(&probe, 0), Some(index));
            }
        }
    }
}
