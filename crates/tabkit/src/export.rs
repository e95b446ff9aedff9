//! Export and import entry points.

use std::borrow::Borrow;
use std::io::{Read, Seek, Write};

use polars::prelude::DataFrame;
use tabkit_io_csv::{
    SpecCsvReadOptions, SpecCsvReport, SpecCsvWriteOptions, read_csv_all, write_csv,
};
use tabkit_io_table::{
    CellSource, Result, SpecFieldAccessors, SpecFrameRows, SpecHeader, SpecKeyedRow,
    derive_dataframe_from_ipc_bytes,
};
use tabkit_io_xlsx::write_sheet;

use crate::spec::{EnumExportReport, EnumExportTarget, SpecExportOptions};

/// Export keyed rows (or any other `CellSource`) to `target`.
pub fn export_by_keyed_rows<R, I, W>(
    header: &SpecHeader,
    rows: I,
    target: &EnumExportTarget,
    sink: W,
    options: &SpecExportOptions,
) -> Result<EnumExportReport>
where
    R: CellSource,
    I: IntoIterator<Item = R>,
    W: Write + Seek + Send,
{
    match target {
        EnumExportTarget::Csv { encoding } => {
            write_csv(header, rows, encoding, sink, &options.csv).map(EnumExportReport::Csv)
        }
        EnumExportTarget::Workbook { kind, sheet_name } => {
            write_sheet(*kind, header, rows, sheet_name, sink, &options.sheet)
                .map(EnumExportReport::Sheet)
        }
    }
}

/// Export records whose fields are read through `accessors`.
///
/// A header key without a registered accessor yields an empty column.
pub fn export_by_records<T, B, I, W>(
    header: &SpecHeader,
    records: I,
    accessors: &SpecFieldAccessors<T>,
    target: &EnumExportTarget,
    sink: W,
    options: &SpecExportOptions,
) -> Result<EnumExportReport>
where
    B: Borrow<T>,
    I: IntoIterator<Item = B>,
    W: Write + Seek + Send,
{
    let rows = records.into_iter().map(|record| accessors.bind(record));
    export_by_keyed_rows(header, rows, target, sink, options)
}

/// Export the rows of a DataFrame, addressing cells by column name.
///
/// Without a header, every column is exported under its own name.
pub fn export_by_frame<W>(
    df: &DataFrame,
    header: Option<&SpecHeader>,
    target: &EnumExportTarget,
    sink: W,
    options: &SpecExportOptions,
) -> Result<EnumExportReport>
where
    W: Write + Seek + Send,
{
    let frame_rows = SpecFrameRows::new(df);
    let header = match header {
        Some(header) => header.clone(),
        None => frame_rows.derive_header()?,
    };
    export_by_keyed_rows(&header, frame_rows.iter(), target, sink, options)
}

/// Export a DataFrame serialized as Arrow IPC bytes.
pub fn export_by_frame_ipc<W>(
    v_ipc_df: &[u8],
    header: Option<&SpecHeader>,
    target: &EnumExportTarget,
    sink: W,
    options: &SpecExportOptions,
) -> Result<EnumExportReport>
where
    W: Write + Seek + Send,
{
    let df = derive_dataframe_from_ipc_bytes(v_ipc_df)?;
    export_by_frame(&df, header, target, sink, options)
}

/// Delimited export of keyed rows into any writer; no `Seek` needed.
pub fn export_delimited_by_keyed_rows<R, I, W>(
    header: &SpecHeader,
    rows: I,
    c_encoding: &str,
    sink: W,
    options: &SpecCsvWriteOptions,
) -> Result<SpecCsvReport>
where
    R: CellSource,
    I: IntoIterator<Item = R>,
    W: Write,
{
    write_csv(header, rows, c_encoding, sink, options)
}

/// Delimited export of records into any writer.
pub fn export_delimited_by_records<T, B, I, W>(
    header: &SpecHeader,
    records: I,
    accessors: &SpecFieldAccessors<T>,
    c_encoding: &str,
    sink: W,
    options: &SpecCsvWriteOptions,
) -> Result<SpecCsvReport>
where
    B: Borrow<T>,
    I: IntoIterator<Item = B>,
    W: Write,
{
    let rows = records.into_iter().map(|record| accessors.bind(record));
    write_csv(header, rows, c_encoding, sink, options)
}

/// Delimited export of DataFrame rows into any writer.
pub fn export_delimited_by_frame<W: Write>(
    df: &DataFrame,
    header: Option<&SpecHeader>,
    c_encoding: &str,
    sink: W,
    options: &SpecCsvWriteOptions,
) -> Result<SpecCsvReport> {
    let frame_rows = SpecFrameRows::new(df);
    let header = match header {
        Some(header) => header.clone(),
        None => frame_rows.derive_header()?,
    };
    write_csv(&header, frame_rows.iter(), c_encoding, sink, options)
}

/// Read delimited text into keyed rows, header taken from the first record.
pub fn import_delimited<R: Read>(
    source: R,
    c_encoding: &str,
    options: &SpecCsvReadOptions,
) -> Result<Vec<SpecKeyedRow>> {
    read_csv_all(source, c_encoding, options)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Cursor;

    use calamine::{Data, Reader, Xls, Xlsx, open_workbook_from_rs};
    use chrono::NaiveDate;
    use polars::prelude::Column;
    use tabkit_io_table::{EnumCellValue, Record, TableError};
    use tabkit_io_xlsx::EnumWorkbookKind;

    use super::*;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn derive_ab_rows() -> (SpecHeader, Vec<HashMap<String, EnumCellValue>>) {
        let header = SpecHeader::new([("a", "A"), ("b", "B")]).unwrap();
        let rows = [(1, "x"), (2, "y")]
            .into_iter()
            .map(|(n_a, c_b)| {
                HashMap::from([
                    ("a".to_string(), EnumCellValue::Integer(n_a)),
                    ("b".to_string(), EnumCellValue::Text(c_b.to_string())),
                ])
            })
            .collect();
        (header, rows)
    }

    fn read_sheet_texts(
        kind: EnumWorkbookKind,
        v_bytes: Vec<u8>,
        sheet_name: &str,
    ) -> Vec<Vec<String>> {
        let to_texts = |range: calamine::Range<Data>| -> Vec<Vec<String>> {
            range
                .rows()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                .collect()
        };
        match kind {
            EnumWorkbookKind::Legacy => {
                let mut workbook: Xls<_> = open_workbook_from_rs(Cursor::new(v_bytes)).unwrap();
                to_texts(workbook.worksheet_range(sheet_name).unwrap())
            }
            EnumWorkbookKind::Modern => {
                let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(v_bytes)).unwrap();
                to_texts(workbook.worksheet_range(sheet_name).unwrap())
            }
        }
    }

    struct User {
        id: u32,
        name: String,
        joined: NaiveDate,
        balance: f64,
    }

    impl Record for User {
        fn field_accessors() -> SpecFieldAccessors<Self> {
            SpecFieldAccessors::new()
                .with_accessor("getId", |user: &User| user.id)
                .with_accessor("getName", |user: &User| user.name.clone())
                .with_accessor("getJoined", |user: &User| user.joined)
                .with_accessor("getBalance", |user: &User| user.balance)
        }
    }

    fn derive_users() -> Vec<User> {
        vec![
            User {
                id: 7,
                name: "Zoë".to_string(),
                joined: NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
                balance: 2.005,
            },
            User {
                id: 8,
                name: "Li".to_string(),
                joined: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
                balance: -0.004,
            },
        ]
    }

    #[test]
    fn test_csv_round_trip_skips_first_data_row_by_default() {
        init_logger();
        let (header, rows) = derive_ab_rows();
        let mut cursor = Cursor::new(Vec::new());

        let report = export_by_keyed_rows(
            &header,
            &rows,
            &EnumExportTarget::csv_default(),
            &mut cursor,
            &SpecExportOptions::default(),
        )
        .unwrap();
        assert_eq!(report.n_rows_written(), 2);
        let v_bytes = cursor.into_inner();

        let l_rows =
            import_delimited(&v_bytes[..], "utf-8", &SpecCsvReadOptions::default()).unwrap();
        assert_eq!(l_rows.len(), 1);
        assert_eq!(l_rows[0].get("A"), Some("2"));
        assert_eq!(l_rows[0].get("B"), Some("y"));
        assert_eq!(l_rows[0].get("a"), None);

        let l_rows_all = import_delimited(
            &v_bytes[..],
            "utf-8",
            &SpecCsvReadOptions {
                if_skip_first_data_row: false,
            },
        )
        .unwrap();
        assert_eq!(l_rows_all.len(), 2);
        assert_eq!(l_rows_all[0].get("A"), Some("1"));
        assert_eq!(l_rows_all[1].get("B"), Some("y"));
    }

    #[test]
    fn test_csv_round_trip_preserves_multibyte_text_in_shift_jis() {
        let header = SpecHeader::new([("k", "キー")]).unwrap();
        let rows = vec![
            HashMap::from([("k".to_string(), EnumCellValue::from("一"))]),
            HashMap::from([("k".to_string(), EnumCellValue::from("日本語"))]),
        ];
        let mut cursor = Cursor::new(Vec::new());

        export_by_keyed_rows(
            &header,
            &rows,
            &EnumExportTarget::Csv {
                encoding: "shift_jis".to_string(),
            },
            &mut cursor,
            &SpecExportOptions::default(),
        )
        .unwrap();

        let l_rows = import_delimited(
            Cursor::new(cursor.into_inner()),
            "shift_jis",
            &SpecCsvReadOptions::default(),
        )
        .unwrap();
        assert_eq!(l_rows.len(), 1);
        assert_eq!(l_rows[0].get("キー"), Some("日本語"));
    }

    #[test]
    fn test_export_by_records_formats_cells_and_blanks_missing_accessors() {
        init_logger();
        let header = SpecHeader::new([
            ("id", "ID"),
            ("name", "Name"),
            ("nickname", "Nickname"),
            ("joined", "Joined"),
            ("balance", "Balance"),
        ])
        .unwrap();
        let users = derive_users();
        let mut cursor = Cursor::new(Vec::new());

        export_by_records(
            &header,
            &users,
            &User::field_accessors(),
            &EnumExportTarget::csv_default(),
            &mut cursor,
            &SpecExportOptions::default(),
        )
        .unwrap();

        assert_eq!(
            String::from_utf8(cursor.into_inner()).unwrap(),
            "ID,Name,Nickname,Joined,Balance\r\n\
             7,Zoë,,2024-02-29 00:00:00,2.01\r\n\
             8,Li,,2023-01-01 00:00:00,0.00\r\n"
        );
    }

    #[test]
    fn test_export_by_records_to_both_workbook_kinds() {
        let header = SpecHeader::new([("name", "Name"), ("balance", "Balance")]).unwrap();
        let users = derive_users();
        for kind in [EnumWorkbookKind::Legacy, EnumWorkbookKind::Modern] {
            let mut cursor = Cursor::new(Vec::new());
            let target = EnumExportTarget::Workbook {
                kind,
                sheet_name: "Users".to_string(),
            };

            let report = export_by_records(
                &header,
                users.iter(),
                &User::field_accessors(),
                &target,
                &mut cursor,
                &SpecExportOptions::default(),
            )
            .unwrap();

            assert_eq!(report.n_rows_written(), 2);
            assert_eq!(
                read_sheet_texts(kind, cursor.into_inner(), "Users"),
                vec![
                    vec!["Name", "Balance"],
                    vec!["Zoë", "2.01"],
                    vec!["Li", "0.00"],
                ]
            );
        }
    }

    #[test]
    fn test_export_by_frame_uses_column_names_without_header() {
        let df = DataFrame::new(vec![
            Column::new("city".into(), ["Oslo", "Lima"]),
            Column::new("temp".into(), [Some(-3.456f64), None]),
        ])
        .unwrap();
        let mut cursor = Cursor::new(Vec::new());

        let report = export_by_frame(
            &df,
            None,
            &EnumExportTarget::csv_default(),
            &mut cursor,
            &SpecExportOptions::default(),
        )
        .unwrap();

        assert_eq!(report.n_rows_written(), 2);
        assert_eq!(
            String::from_utf8(cursor.into_inner()).unwrap(),
            "city,temp\r\nOslo,-3.46\r\nLima,\r\n"
        );
    }

    /// Writer without `Seek`, standing in for a socket or stdout.
    struct ForwardOnlySink<'a> {
        v_bytes: &'a mut Vec<u8>,
    }

    impl Write for ForwardOnlySink<'_> {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.v_bytes.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_delimited_exports_stream_into_forward_only_writer() {
        let (header, rows) = derive_ab_rows();
        let mut v_out = Vec::new();
        let report = export_delimited_by_keyed_rows(
            &header,
            &rows,
            "utf-8",
            ForwardOnlySink { v_bytes: &mut v_out },
            &SpecCsvWriteOptions::default(),
        )
        .unwrap();
        assert_eq!(report.n_rows_written, 2);
        assert_eq!(String::from_utf8(v_out).unwrap(), "A,B\r\n1,x\r\n2,y\r\n");

        let header_users = SpecHeader::new([("id", "ID")]).unwrap();
        let mut v_out = Vec::new();
        export_delimited_by_records(
            &header_users,
            &derive_users(),
            &User::field_accessors(),
            "utf-8",
            ForwardOnlySink { v_bytes: &mut v_out },
            &SpecCsvWriteOptions::default(),
        )
        .unwrap();
        assert_eq!(String::from_utf8(v_out).unwrap(), "ID\r\n7\r\n8\r\n");

        let df = DataFrame::new(vec![Column::new("n".into(), [1i64, 2])]).unwrap();
        let mut v_out = Vec::new();
        export_delimited_by_frame(
            &df,
            None,
            "utf-8",
            ForwardOnlySink { v_bytes: &mut v_out },
            &SpecCsvWriteOptions::default(),
        )
        .unwrap();
        assert_eq!(String::from_utf8(v_out).unwrap(), "n\r\n1\r\n2\r\n");
    }

    #[test]
    fn test_export_by_frame_ipc_rejects_garbage() {
        let err = export_by_frame_ipc(
            b"not arrow",
            None,
            &EnumExportTarget::csv_default(),
            Cursor::new(Vec::new()),
            &SpecExportOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, TableError::Frame(_)));
    }

    #[test]
    fn test_export_rejects_empty_header() {
        let err = export_by_keyed_rows(
            &SpecHeader::default(),
            Vec::<HashMap<String, EnumCellValue>>::new(),
            &EnumExportTarget::Workbook {
                kind: EnumWorkbookKind::Modern,
                sheet_name: "s".to_string(),
            },
            Cursor::new(Vec::new()),
            &SpecExportOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, TableError::Config(_)));
    }
}
