/// One spreadsheet record. Columns keep the order of the header row so the
/// export lists them the way the source workbook does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    fields: Vec<(String, String)>,
}

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a row from `(column, value)` pairs. A repeated column keeps its
    /// first position and the last value.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        pairs
            .into_iter()
            .fold(Self::new(), |row, (column, value)| row.with_value(column, value))
    }

    /// Returns the value stored under `column`.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Returns the value stored under `column` when it is present and not empty.
    /// Whitespace-only values count as present.
    pub fn non_empty(&self, column: &str) -> Option<&str> {
        self.get(column).filter(|value| !value.is_empty())
    }

    /// Returns a new row where `column` holds `value`. Existing columns are
    /// replaced in place; new ones are appended.
    pub fn with_value(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == column) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((column, value)),
        }
        self
    }

    /// Iterates over `(column, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Number of columns held by the row.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Value of one merged output cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Plain text cell.
    Text(String),
    /// Multi-valued cell, rendered comma separated.
    List(Vec<String>),
}

impl FieldValue {
    /// Renders the value as a single CSV cell.
    pub fn render(&self) -> String {
        match self {
            FieldValue::Text(value) => value.clone(),
            FieldValue::List(items) => items.join(","),
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

/// One output line built from every row of a chunk, keyed by synthetic
/// column names such as `nomComplet2` or `@photo3`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedRecord {
    fields: Vec<(String, FieldValue)>,
}

impl MergedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `column`, overwriting an earlier value with the same
    /// name without moving it.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<FieldValue>) {
        let column = column.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(name, _)| *name == column) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Column names in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
