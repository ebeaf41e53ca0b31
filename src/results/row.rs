use std::collections::HashMap;
use std::sync::Arc;

use crate::types::RowValues;

/// A row from a fetched result set
///
/// Column names are shared across every row of the same result set.
#[derive(Debug, Clone, PartialEq)]
pub struct DbRow {
    /// The column names for this row
    pub column_names: Arc<Vec<String>>,
    /// The values for this row
    pub values: Vec<RowValues>,
    // name -> position, built once per row
    column_index_cache: Arc<HashMap<String, usize>>,
}

impl DbRow {
    /// Create a new database row
    ///
    /// # Arguments
    ///
    /// * `column_names` - The column names
    /// * `values` - The values for this row
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, values: Vec<RowValues>) -> Self {
        let cache = Arc::new(
            column_names
                .iter()
                .enumerate()
                .map(|(i, name)| (name.clone(), i))
                .collect::<HashMap<_, _>>(),
        );

        Self {
            column_names,
            values,
            column_index_cache: cache,
        }
    }

    /// Get the index of a column by name.
    ///
    /// DB2 folds unquoted identifiers to upper case, so an exact miss falls back
    /// to a case-insensitive search.
    #[must_use]
    pub fn get_column_index(&self, column_name: &str) -> Option<usize> {
        if let Some(&idx) = self.column_index_cache.get(column_name) {
            return Some(idx);
        }

        self.column_names
            .iter()
            .position(|col| col.eq_ignore_ascii_case(column_name))
    }

    /// Get a value from the row by column name
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&RowValues> {
        self.get_column_index(column_name)
            .and_then(|idx| self.values.get(idx))
    }

    /// Get a value from the row by column index
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&RowValues> {
        self.values.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_falls_back_to_case_insensitive() {
        let row = DbRow::new(
            Arc::new(vec!["CUSNUM".into(), "LSTNAM".into()]),
            vec![RowValues::Int(938_472), RowValues::Text("Henning".into())],
        );

        assert_eq!(row.get("CUSNUM"), Some(&RowValues::Int(938_472)));
        assert_eq!(row.get("lstnam"), Some(&RowValues::Text("Henning".into())));
        assert!(row.get("CITY").is_none());
        assert!(row.get_by_index(2).is_none());
    }
}
