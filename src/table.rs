//! Columnar observation table.
//!
//! A schema-flexible table: an ordered list of named columns plus a row
//! count. Layers hand one of these to the move pipeline with whatever
//! columns the mark needs (`x`, `y`, `width`, grouping variables, facet
//! variables); moves adjust columns and return a new table.

/// A scalar value in a table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// A numeric value.
    Number(f64),
    /// A text value.
    Text(String),
    /// A missing value.
    Null,
}

impl Value {
    /// Get as f64, or None if not a number.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as a finite-or-NaN-free number: None for `Null`, text, and NaN.
    #[must_use]
    pub fn as_observed(&self) -> Option<f64> {
        match self {
            Value::Number(n) if !n.is_nan() => Some(*n),
            _ => None,
        }
    }

    /// Get as string, or None if not text.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Check whether this value is missing.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Option<f64>> for Value {
    fn from(v: Option<f64>) -> Self {
        match v {
            Some(n) => Value::Number(n),
            None => Value::Null,
        }
    }
}

/// A named, ordered column of values.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: Vec<Value>,
}

impl Column {
    /// Create a column from a name and values.
    #[must_use]
    pub fn new(name: &str, values: Vec<Value>) -> Self {
        Self {
            name: name.to_string(),
            values,
        }
    }

    /// Column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column values.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the column has no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A columnar table with insertion-ordered columns.
///
/// Columns keep the order they were added in, so iteration and output
/// layouts are deterministic. Replacing a column keeps its position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    /// Create a new empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`Table::add_column`].
    #[must_use]
    pub fn with_column(mut self, name: &str, values: Vec<Value>) -> Self {
        self.add_column(name, values);
        self
    }

    /// Add a column, replacing any existing column of the same name in place.
    pub fn add_column(&mut self, name: &str, values: Vec<Value>) {
        self.n_rows = self.n_rows.max(values.len());
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(col) => col.values = values,
            None => self.columns.push(Column::new(name, values)),
        }
    }

    /// Add a numeric column.
    pub fn add_column_f64(&mut self, name: &str, data: &[f64]) {
        let values: Vec<Value> = data.iter().map(|&v| Value::Number(v)).collect();
        self.add_column(name, values);
    }

    /// Add a text column.
    pub fn add_column_str(&mut self, name: &str, data: &[&str]) {
        let values: Vec<Value> = data.iter().map(|&s| Value::Text(s.to_string())).collect();
        self.add_column(name, values);
    }

    /// Get a column's values.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[Value]> {
        self.columns.iter().find(|c| c.name == name).map(Column::values)
    }

    /// Get a column as f64 values, preserving length.
    ///
    /// Missing and non-numeric entries become NaN so that positions stay
    /// aligned with row indices.
    #[must_use]
    pub fn get_f64(&self, name: &str) -> Option<Vec<f64>> {
        self.get(name)
            .map(|col| col.iter().map(|v| v.as_f64().unwrap_or(f64::NAN)).collect())
    }

    /// Get a single value.
    #[must_use]
    pub fn value(&self, name: &str, row: usize) -> Option<&Value> {
        self.get(name).and_then(|col| col.get(row))
    }

    /// Get number of rows.
    #[must_use]
    pub fn nrow(&self) -> usize {
        self.n_rows
    }

    /// Get number of columns.
    #[must_use]
    pub fn ncol(&self) -> usize {
        self.columns.len()
    }

    /// Check if a column exists.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    /// Get column names in insertion order.
    #[must_use]
    pub fn columns(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}
