//! Declared category orders.
//!
//! Stands in for the scale-resolution system at the crate boundary: for
//! each variable it either supplies an explicit ordered sequence of
//! levels or signals that no explicit order exists, in which case
//! [`crate::groupby::categorical_order`] derives one from the data.

use crate::table::Value;

/// Explicit level orders declared per variable.
///
/// An explicit order is used verbatim, including levels that never occur
/// in the data (they become valid, possibly-empty groups).
#[derive(Debug, Clone, Default)]
pub struct ScaleSet {
    orders: Vec<(String, Vec<Value>)>,
}

impl ScaleSet {
    /// Create an empty scale set (no variable has an explicit order).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an explicit level order for a variable.
    ///
    /// Re-declaring a variable replaces its previous order.
    #[must_use]
    pub fn declare(mut self, var: &str, levels: Vec<Value>) -> Self {
        match self.orders.iter_mut().find(|(name, _)| name == var) {
            Some((_, existing)) => *existing = levels,
            None => self.orders.push((var.to_string(), levels)),
        }
        self
    }

    /// Convenience: declare a text-level order.
    #[must_use]
    pub fn declare_str(self, var: &str, levels: &[&str]) -> Self {
        self.declare(var, levels.iter().map(|&s| Value::Text(s.to_string())).collect())
    }

    /// Convenience: declare a numeric-level order.
    #[must_use]
    pub fn declare_f64(self, var: &str, levels: &[f64]) -> Self {
        self.declare(var, levels.iter().map(|&v| Value::Number(v)).collect())
    }

    /// The declared order for a variable, if any.
    #[must_use]
    pub fn order(&self, var: &str) -> Option<&[Value]> {
        self.orders
            .iter()
            .find(|(name, _)| name == var)
            .map(|(_, levels)| levels.as_slice())
    }
}
