use std::collections::HashMap;

use polars::prelude::DataFrame;

/// Storage type picked for a sheet column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Boolean,
    Text,
}

/// A worksheet after loading, headers already normalized.
#[derive(Debug)]
pub struct LoadedSheet {
    pub sheet_name: String,
    pub dataframe: DataFrame,
    /// Per column, which rows held a genuine string cell. Numbers, booleans
    /// and dates in a mixed column are stored as text but are not free text.
    pub string_cells: HashMap<String, Vec<bool>>,
}

impl LoadedSheet {
    pub fn columns(&self) -> Vec<String> {
        self.dataframe
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn row_count(&self) -> usize {
        self.dataframe.height()
    }
}
