mod row;

pub use row::DbRow;

use std::sync::Arc;

use crate::types::RowValues;

/// Build rows that share one column-name list, the shape drivers hand back
/// from `fetch_all`.
#[must_use]
pub fn rows_from_values(column_names: &[&str], rows: Vec<Vec<RowValues>>) -> Vec<DbRow> {
    let names: Arc<Vec<String>> = Arc::new(column_names.iter().map(|c| (*c).to_owned()).collect());
    rows.into_iter()
        .map(|values| DbRow::new(Arc::clone(&names), values))
        .collect()
}
