//! Delimited reader: first record is the header, later records become keyed rows.

use std::io::Read;

use csv::ReaderBuilder;
use tabkit_io_table::util::validate_unique_named_columns;
use tabkit_io_table::{Result, SpecKeyedRow, TableError};

use crate::conf::U8_DELIMITER;
use crate::spec::SpecCsvReadOptions;
use crate::transcode::resolve_input_encoding;

/// Read every data record of `source` as rows keyed by the header names.
///
/// Missing trailing cells read as `""`; cells beyond the header are ignored.
/// No partial result is returned on failure.
pub fn read_csv_all<R: Read>(
    mut source: R,
    c_encoding: &str,
    options: &SpecCsvReadOptions,
) -> Result<Vec<SpecKeyedRow>> {
    let encoding = resolve_input_encoding(c_encoding)?;

    let mut v_bytes = Vec::new();
    source
        .read_to_end(&mut v_bytes)
        .map_err(|err| TableError::io("read csv source", err))?;
    drop(source);

    let (c_text, if_malformed) = encoding.decode_with_bom_removal(&v_bytes);
    if if_malformed {
        log::debug!(
            "csv import: malformed {} sequences replaced with U+FFFD",
            encoding.name()
        );
    }

    let l_blank_records = plan_record_layout(&c_text)?;

    let mut rdr = ReaderBuilder::new()
        .delimiter(U8_DELIMITER)
        .has_headers(false)
        .flexible(true)
        .from_reader(c_text.as_bytes());
    let mut records = rdr.records();
    let mut next_fields = |if_blank: bool| -> Result<Vec<String>> {
        if if_blank {
            return Ok(vec![String::new()]);
        }
        match records.next() {
            Some(record) => Ok(record
                .map_err(derive_csv_read_error)?
                .iter()
                .map(ToString::to_string)
                .collect()),
            None => Err(TableError::Parse(
                "csv record count does not match the input layout".to_string(),
            )),
        }
    };

    let mut l_layout = l_blank_records.into_iter();
    let Some(if_blank_header) = l_layout.next() else {
        return Ok(Vec::new());
    };
    let l_field_keys = next_fields(if_blank_header)?;
    validate_unique_named_columns(&l_field_keys).map_err(TableError::Parse)?;

    let n_rows_skip = usize::from(options.if_skip_first_data_row);
    let mut l_rows = Vec::new();
    for (n_idx_record, if_blank) in l_layout.enumerate() {
        let l_cells = next_fields(if_blank)?;
        if n_idx_record < n_rows_skip {
            continue;
        }
        l_rows.push(
            l_field_keys
                .iter()
                .enumerate()
                .map(|(n_idx_col, key)| {
                    (key.as_str(), l_cells.get(n_idx_col).map_or("", String::as_str))
                })
                .collect::<SpecKeyedRow>(),
        );
    }

    log::debug!(
        "csv import finished: {} columns, {} rows",
        l_field_keys.len(),
        l_rows.len()
    );
    Ok(l_rows)
}

/// One entry per physical record of `c_text`, `true` for an empty line.
///
/// The csv parser drops empty lines and is lenient with quotes; this pass
/// keeps empty lines as records and rejects a quote left open at end of
/// input or text between a closing quote and the next delimiter.
fn plan_record_layout(c_text: &str) -> Result<Vec<bool>> {
    let mut l_blank_records = Vec::new();
    let mut n_line = 1usize;
    let mut if_in_quotes = false;
    let mut if_after_quote = false;
    let mut if_field_start = true;
    let mut if_record_empty = true;

    let mut chars = c_text.chars().peekable();
    while let Some(c) = chars.next() {
        if if_in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                }
                '"' => {
                    if_in_quotes = false;
                    if_after_quote = true;
                }
                '\n' => n_line += 1,
                _ => {}
            }
            continue;
        }
        match c {
            '\r' | '\n' => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                l_blank_records.push(if_record_empty);
                n_line += 1;
                if_after_quote = false;
                if_field_start = true;
                if_record_empty = true;
            }
            ',' => {
                if_after_quote = false;
                if_field_start = true;
                if_record_empty = false;
            }
            _ if if_after_quote => {
                return Err(TableError::Parse(format!(
                    "unexpected character {c:?} after closing quote on line {n_line}"
                )));
            }
            '"' if if_field_start => {
                if_in_quotes = true;
                if_field_start = false;
                if_record_empty = false;
            }
            _ => {
                if_field_start = false;
                if_record_empty = false;
            }
        }
    }

    if if_in_quotes {
        return Err(TableError::Parse(format!(
            "quoted field opened before line {n_line} is never closed"
        )));
    }
    if !if_record_empty {
        l_blank_records.push(false);
    }
    Ok(l_blank_records)
}

fn derive_csv_read_error(err: csv::Error) -> TableError {
    if err.is_io_error() {
        return match err.into_kind() {
            csv::ErrorKind::Io(source) => TableError::io("read csv record", source),
            kind => TableError::Parse(format!("{kind:?}")),
        };
    }
    TableError::Parse(err.to_string())
}
