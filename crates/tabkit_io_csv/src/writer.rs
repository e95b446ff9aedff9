//! Delimited writer: header line plus one CRLF-terminated line per row.

use std::io::{self, Write};

use csv::{Terminator, WriterBuilder};
use encoding_rs::UTF_8;
use tabkit_io_table::{
    CellSource, Result, SpecHeader, TableError, materialize_row, resolve_finalize_outcome,
};

use crate::conf::{U8_DELIMITER, V_BOM_UTF8};
use crate::spec::{SpecCsvReport, SpecCsvWriteOptions};
use crate::transcode::{TranscodingWriter, resolve_output_encoding};

type CsvSinkWriter<W> = csv::Writer<TranscodingWriter<W>>;

/// Write `header` and `rows` to `sink` as comma-separated text in `c_encoding`.
///
/// The sink is flushed and dropped before returning, on success and failure
/// alike. Header and encoding problems are raised before any byte is written.
pub fn write_csv<R, I, W>(
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
    header.validate_for_export()?;
    let encoding = resolve_output_encoding(c_encoding)?;
    log::debug!(
        "csv export started: {} columns, encoding {}",
        header.len(),
        encoding.name()
    );

    let mut transcoder = TranscodingWriter::new(sink, encoding);
    let bom = if options.if_write_bom && encoding == UTF_8 {
        transcoder
            .write_all(V_BOM_UTF8)
            .map_err(|err| TableError::io("write csv byte-order mark", err))
    } else {
        Ok(())
    };

    let mut wtr = WriterBuilder::new()
        .delimiter(U8_DELIMITER)
        .terminator(Terminator::CRLF)
        .from_writer(transcoder);
    let body = bom.and_then(|()| write_body(&mut wtr, header, rows));
    let finalize = finalize_csv_writer(wtr);
    let n_rows_written = resolve_finalize_outcome(
        body,
        finalize,
        options.finalize_policy,
        "csv export",
    )?;

    log::debug!("csv export finished: {n_rows_written} rows");
    Ok(SpecCsvReport {
        n_rows_written,
        c_encoding: encoding.name().to_string(),
    })
}

fn write_body<R, I, W>(
    wtr: &mut CsvSinkWriter<W>,
    header: &SpecHeader,
    rows: I,
) -> Result<usize>
where
    R: CellSource,
    I: IntoIterator<Item = R>,
    W: Write,
{
    wtr.write_record(header.display_labels())
        .map_err(|err| derive_csv_write_error(err, "write csv header"))?;

    let mut n_rows_written = 0;
    for row in rows {
        let l_cells = materialize_row(&row, header);
        wtr.write_record(&l_cells).map_err(|err| {
            derive_csv_write_error(err, &format!("write csv row {}", n_rows_written + 1))
        })?;
        n_rows_written += 1;
    }
    Ok(n_rows_written)
}

/// Drain the csv buffer and the transcoder, flush the sink, then drop it.
fn finalize_csv_writer<W: Write>(wtr: CsvSinkWriter<W>) -> Result<()> {
    let transcoder = wtr
        .into_inner()
        .map_err(|err| TableError::io("flush csv buffer", err.into_error()))?;
    let mut sink = transcoder
        .finish()
        .map_err(|err| TableError::io("finish csv transcoder", err))?;
    sink.flush()
        .map_err(|err| TableError::io("flush csv sink", err))?;
    drop(sink);
    Ok(())
}

fn derive_csv_write_error(err: csv::Error, c_context: &str) -> TableError {
    match err.into_kind() {
        csv::ErrorKind::Io(source) => TableError::io(c_context, source),
        kind => TableError::io(c_context, io::Error::other(format!("{kind:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use encoding_rs::GBK;
    use tabkit_io_table::{EnumCellValue, EnumFinalizePolicy};

    use super::*;

    type Row = HashMap<String, EnumCellValue>;

    fn derive_row(pairs: &[(&str, EnumCellValue)]) -> Row {
        pairs
            .iter()
            .map(|(key, val)| (key.to_string(), val.clone()))
            .collect()
    }

    fn derive_text(c_value: &str) -> EnumCellValue {
        EnumCellValue::Text(c_value.to_string())
    }

    /// Sink that shares its bytes and can fail writes or flushes on demand.
    #[derive(Clone, Default)]
    struct SharedSink {
        v_bytes: Rc<RefCell<Vec<u8>>>,
        if_fail_write: bool,
        if_fail_flush: bool,
        n_flushes: Rc<RefCell<usize>>,
    }

    impl Write for SharedSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.if_fail_write {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "write refused"));
            }
            self.v_bytes.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            *self.n_flushes.borrow_mut() += 1;
            if self.if_fail_flush {
                return Err(io::Error::other("flush refused"));
            }
            Ok(())
        }
    }

    #[test]
    fn test_write_csv_header_then_rows_with_crlf() {
        let header = SpecHeader::new([("a", "A"), ("b", "B")]).unwrap();
        let rows = vec![
            derive_row(&[("a", EnumCellValue::Integer(1)), ("b", derive_text("x"))]),
            derive_row(&[("a", EnumCellValue::Integer(2)), ("b", derive_text("y"))]),
        ];
        let mut v_out = Vec::new();

        let report =
            write_csv(&header, &rows, "utf-8", &mut v_out, &SpecCsvWriteOptions::default())
                .unwrap();

        assert_eq!(report.n_rows_written, 2);
        assert_eq!(report.c_encoding, "UTF-8");
        assert_eq!(String::from_utf8(v_out).unwrap(), "A,B\r\n1,x\r\n2,y\r\n");
    }

    #[test]
    fn test_write_csv_quotes_special_characters() {
        let header = SpecHeader::from_field_keys(["v"]).unwrap();
        let rows = vec![
            derive_row(&[("v", derive_text("a,b"))]),
            derive_row(&[("v", derive_text("say \"hi\""))]),
            derive_row(&[("v", derive_text("two\nlines"))]),
        ];
        let mut v_out = Vec::new();

        write_csv(&header, &rows, "utf-8", &mut v_out, &SpecCsvWriteOptions::default()).unwrap();

        assert_eq!(
            String::from_utf8(v_out).unwrap(),
            "v\r\n\"a,b\"\r\n\"say \"\"hi\"\"\"\r\n\"two\nlines\"\r\n"
        );
    }

    #[test]
    fn test_write_csv_empty_dataset_writes_header_only() {
        let header = SpecHeader::new([("a", "Alpha")]).unwrap();
        let mut v_out = Vec::new();

        let report = write_csv(
            &header,
            Vec::<Row>::new(),
            "utf-8",
            &mut v_out,
            &SpecCsvWriteOptions::default(),
        )
        .unwrap();

        assert_eq!(report.n_rows_written, 0);
        assert_eq!(v_out, b"Alpha\r\n");
    }

    #[test]
    fn test_write_csv_gbk_output() {
        let header = SpecHeader::new([("name", "姓名")]).unwrap();
        let rows = vec![derive_row(&[("name", derive_text("张三"))])];
        let mut v_out = Vec::new();

        let report =
            write_csv(&header, &rows, "GBK", &mut v_out, &SpecCsvWriteOptions::default()).unwrap();

        assert_eq!(report.c_encoding, "GBK");
        let (c_decoded, _, if_malformed) = GBK.decode(&v_out);
        assert!(!if_malformed);
        assert_eq!(c_decoded, "姓名\r\n张三\r\n");
    }

    #[test]
    fn test_write_csv_bom_only_for_utf8() {
        let header = SpecHeader::from_field_keys(["k"]).unwrap();
        let options = SpecCsvWriteOptions {
            if_write_bom: true,
            ..Default::default()
        };

        let mut v_utf8 = Vec::new();
        write_csv(&header, Vec::<Row>::new(), "utf-8", &mut v_utf8, &options).unwrap();
        assert_eq!(v_utf8, b"\xEF\xBB\xBFk\r\n");

        let mut v_latin = Vec::new();
        write_csv(&header, Vec::<Row>::new(), "latin1", &mut v_latin, &options).unwrap();
        assert_eq!(v_latin, b"k\r\n");
    }

    #[test]
    fn test_write_csv_rejects_bad_input_before_writing() {
        let sink = SharedSink::default();
        let header = SpecHeader::from_field_keys(["k"]).unwrap();
        let err = write_csv(
            &header,
            Vec::<Row>::new(),
            "utf-16be",
            sink.clone(),
            &SpecCsvWriteOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, TableError::Encoding(_)));

        let header_empty = SpecHeader::default();
        let err = write_csv(
            &header_empty,
            Vec::<Row>::new(),
            "utf-8",
            sink.clone(),
            &SpecCsvWriteOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, TableError::Config(_)));
        assert!(sink.v_bytes.borrow().is_empty());
    }

    #[test]
    fn test_write_csv_flush_failure_follows_finalize_policy() {
        let header = SpecHeader::from_field_keys(["k"]).unwrap();
        let rows = vec![derive_row(&[("k", derive_text("v"))])];
        let sink = SharedSink {
            if_fail_flush: true,
            ..Default::default()
        };

        let err = write_csv(
            &header,
            &rows,
            "utf-8",
            sink.clone(),
            &SpecCsvWriteOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, TableError::Finalize(_)));

        let options = SpecCsvWriteOptions {
            finalize_policy: EnumFinalizePolicy::BestEffort,
            ..Default::default()
        };
        let report = write_csv(&header, &rows, "utf-8", sink.clone(), &options).unwrap();
        assert_eq!(report.n_rows_written, 1);
        assert!(*sink.n_flushes.borrow() >= 2);
    }

    #[test]
    fn test_write_csv_body_failure_is_returned_unmasked() {
        let header = SpecHeader::from_field_keys(["k"]).unwrap();
        let c_long = "x".repeat(4096);
        let rows: Vec<Row> = (0..8)
            .map(|_| derive_row(&[("k", derive_text(&c_long))]))
            .collect();
        let sink = SharedSink {
            if_fail_write: true,
            if_fail_flush: true,
            ..Default::default()
        };

        let err = write_csv(
            &header,
            &rows,
            "utf-8",
            sink,
            &SpecCsvWriteOptions {
                finalize_policy: EnumFinalizePolicy::BestEffort,
                ..Default::default()
            },
        )
        .unwrap_err();

        match err {
            TableError::Io { context, source } => {
                assert!(context.starts_with("write csv row"));
                assert_eq!(source.kind(), io::ErrorKind::BrokenPipe);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
