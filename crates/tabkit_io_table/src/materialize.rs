//! Field extraction and header-ordered row materialization.

use crate::source::CellSource;
use crate::spec::SpecHeader;
use crate::util::stringify_cell_value;

/// Text of one field of `row`; missing or unreadable fields give `""`.
pub fn extract_cell_text<R: CellSource + ?Sized>(row: &R, field_key: &str) -> String {
    stringify_cell_value(&row.cell_value(field_key))
}

/// Cells of `row` in header order, one per field key.
pub fn materialize_row<R: CellSource + ?Sized>(row: &R, header: &SpecHeader) -> Vec<String> {
    header
        .field_keys()
        .iter()
        .map(|field_key| extract_cell_text(row, field_key))
        .collect()
}

/// Lazily materialize a dataset, preserving row count and order.
pub fn materialize_all<'a, I>(
    rows: I,
    header: &'a SpecHeader,
) -> impl Iterator<Item = Vec<String>> + 'a
where
    I: IntoIterator + 'a,
    I::Item: CellSource,
    I::IntoIter: 'a,
{
    rows.into_iter().map(move |row| materialize_row(&row, header))
}
