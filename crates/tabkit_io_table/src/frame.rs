//! Polars DataFrame row source.

use std::collections::HashMap;
use std::io::Cursor;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use polars::prelude::{AnyValue, DataFrame, IpcReader, SerReader, TimeUnit};

use crate::error::{Result, TableError};
use crate::source::CellSource;
use crate::spec::{EnumCellValue, SpecHeader};

/// Decode a Polars IPC payload into a DataFrame.
pub fn derive_dataframe_from_ipc_bytes(v_ipc_df: &[u8]) -> Result<DataFrame> {
    IpcReader::new(Cursor::new(v_ipc_df))
        .finish()
        .map_err(|err| TableError::Frame(format!("Failed to read IPC DataFrame bytes: {err}")))
}

/// Row view over a DataFrame, addressed by column name.
#[derive(Debug)]
pub struct SpecFrameRows<'a> {
    df: &'a DataFrame,
    dict_col_idx: HashMap<String, usize>,
}

impl<'a> SpecFrameRows<'a> {
    pub fn new(df: &'a DataFrame) -> Self {
        let dict_col_idx = df
            .get_column_names_str()
            .into_iter()
            .enumerate()
            .map(|(n_idx, c_name)| (c_name.to_string(), n_idx))
            .collect();
        Self { df, dict_col_idx }
    }

    /// Header built from the column names, in column order.
    pub fn derive_header(&self) -> Result<SpecHeader> {
        SpecHeader::from_field_keys(
            self.df
                .get_column_names_str()
                .into_iter()
                .map(ToString::to_string),
        )
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn row(&self, n_idx_row: usize) -> SpecFrameRow<'_, 'a> {
        SpecFrameRow {
            rows: self,
            n_idx_row,
        }
    }

    /// Iterate rows top to bottom.
    pub fn iter(&self) -> impl Iterator<Item = SpecFrameRow<'_, 'a>> {
        (0..self.height()).map(|n_idx_row| self.row(n_idx_row))
    }

    fn cell_value_at(&self, n_idx_row: usize, field_key: &str) -> EnumCellValue {
        let Some(&n_idx_col) = self.dict_col_idx.get(field_key) else {
            return EnumCellValue::Absent;
        };
        if n_idx_row >= self.df.height() {
            return EnumCellValue::Absent;
        }
        match self.df.get_columns()[n_idx_col].get(n_idx_row) {
            Ok(value) => derive_cell_value_from_any_value(value),
            Err(err) => {
                log::debug!("frame cell {field_key:?}[{n_idx_row}] unreadable: {err}");
                EnumCellValue::Absent
            }
        }
    }
}

/// One DataFrame row.
#[derive(Debug, Clone, Copy)]
pub struct SpecFrameRow<'r, 'a> {
    rows: &'r SpecFrameRows<'a>,
    n_idx_row: usize,
}

impl CellSource for SpecFrameRow<'_, '_> {
    fn cell_value(&self, field_key: &str) -> EnumCellValue {
        self.rows.cell_value_at(self.n_idx_row, field_key)
    }
}

fn derive_cell_value_from_any_value(value: AnyValue<'_>) -> EnumCellValue {
    match value {
        AnyValue::Null => EnumCellValue::Absent,
        AnyValue::String(val) => EnumCellValue::Text(val.to_string()),
        AnyValue::StringOwned(val) => EnumCellValue::Text(val.to_string()),
        AnyValue::Boolean(val) => EnumCellValue::Boolean(val),
        AnyValue::UInt8(val) => EnumCellValue::from(val),
        AnyValue::UInt16(val) => EnumCellValue::from(val),
        AnyValue::UInt32(val) => EnumCellValue::from(val),
        AnyValue::UInt64(val) => EnumCellValue::from(val),
        AnyValue::Int8(val) => EnumCellValue::from(val),
        AnyValue::Int16(val) => EnumCellValue::from(val),
        AnyValue::Int32(val) => EnumCellValue::from(val),
        AnyValue::Int64(val) => EnumCellValue::from(val),
        AnyValue::Float32(val) => EnumCellValue::from(val),
        AnyValue::Float64(val) => EnumCellValue::from(val),
        AnyValue::Date(n_days) => derive_date_from_epoch_days(n_days)
            .map_or(EnumCellValue::Absent, EnumCellValue::from),
        AnyValue::Datetime(n_ticks, unit, _) | AnyValue::DatetimeOwned(n_ticks, unit, _) => {
            derive_datetime_from_epoch_ticks(n_ticks, unit)
                .map_or(EnumCellValue::Absent, EnumCellValue::from)
        }
        _ => EnumCellValue::Text(value.to_string()),
    }
}

fn derive_date_from_epoch_days(n_days: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1970, 1, 1)?.checked_add_signed(Duration::days(i64::from(n_days)))
}

/// Zoned columns store UTC instants; the UTC wall-clock time is kept.
fn derive_datetime_from_epoch_ticks(n_ticks: i64, unit: TimeUnit) -> Option<NaiveDateTime> {
    let dt = match unit {
        TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(n_ticks)),
        TimeUnit::Microseconds => DateTime::from_timestamp_micros(n_ticks),
        TimeUnit::Milliseconds => DateTime::from_timestamp_millis(n_ticks),
    }?;
    Some(dt.naive_utc())
}

#[cfg(test)]
mod tests {
    use polars::prelude::{Column, DataType, IpcWriter, SerWriter};

    use super::*;
    use crate::materialize::materialize_all;

    fn derive_frame() -> DataFrame {
        DataFrame::new(vec![
            Column::new("id".into(), [1i64, 2, 3]),
            Column::new("name".into(), [Some("a"), None, Some("c")]),
            Column::new("score".into(), [1.005f64, 2.0, -0.004]),
        ])
        .unwrap()
    }

    #[test]
    fn test_frame_rows_materialize_by_column_name() {
        let df = derive_frame();
        let rows = SpecFrameRows::new(&df);
        let header = SpecHeader::from_field_keys(["score", "name", "id", "ghost"]).unwrap();

        let l_cells: Vec<Vec<String>> = materialize_all(rows.iter(), &header).collect();
        assert_eq!(
            l_cells,
            vec![
                vec!["1.01", "a", "1", ""],
                vec!["2.00", "", "2", ""],
                vec!["0.00", "c", "3", ""],
            ]
        );
    }

    #[test]
    fn test_date_and_datetime_columns_are_temporal() {
        let df = DataFrame::new(vec![
            Column::new("day".into(), [Some(19_782i32), None])
                .cast(&DataType::Date)
                .unwrap(),
            Column::new("at_ms".into(), [1_709_209_800_000i64, 0])
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
                .unwrap(),
            Column::new("at_us".into(), [1_709_209_800_000_000i64, -1_000_000])
                .cast(&DataType::Datetime(TimeUnit::Microseconds, None))
                .unwrap(),
        ])
        .unwrap();
        let rows = SpecFrameRows::new(&df);

        let at = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap();
        assert_eq!(
            rows.row(0).cell_value("day"),
            EnumCellValue::from(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
        );
        assert_eq!(rows.row(0).cell_value("at_ms"), EnumCellValue::Temporal(at));
        assert_eq!(rows.row(0).cell_value("at_us"), EnumCellValue::Temporal(at));
        assert_eq!(rows.row(1).cell_value("day"), EnumCellValue::Absent);

        let header = SpecHeader::from_field_keys(["day", "at_ms", "at_us"]).unwrap();
        let l_cells: Vec<Vec<String>> = materialize_all(rows.iter(), &header).collect();
        assert_eq!(
            l_cells,
            vec![
                vec!["2024-02-29 00:00:00", "2024-02-29 12:30:00", "2024-02-29 12:30:00"],
                vec!["", "1970-01-01 00:00:00", "1969-12-31 23:59:59"],
            ]
        );
    }

    #[test]
    fn test_out_of_range_row_is_absent() {
        let df = derive_frame();
        let rows = SpecFrameRows::new(&df);
        assert_eq!(rows.row(99).cell_value("id"), EnumCellValue::Absent);
    }

    #[test]
    fn test_ipc_bytes_round_trip_into_rows() {
        let mut df = derive_frame();
        let mut v_ipc = Vec::new();
        IpcWriter::new(&mut v_ipc).finish(&mut df).unwrap();

        let df_read = derive_dataframe_from_ipc_bytes(&v_ipc).unwrap();
        let rows = SpecFrameRows::new(&df_read);
        assert_eq!(rows.height(), 3);
        assert_eq!(
            rows.derive_header().unwrap().field_keys(),
            ["id", "name", "score"]
        );
    }

    #[test]
    fn test_invalid_ipc_bytes_is_frame_error() {
        let err = derive_dataframe_from_ipc_bytes(b"not ipc").unwrap_err();
        assert!(matches!(err, TableError::Frame(_)));
    }
}
