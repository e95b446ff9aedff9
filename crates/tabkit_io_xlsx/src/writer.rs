//! Spreadsheet writer: header row plus one text row per record, one sheet per call.

use std::io::{Seek, Write};

use tabkit_io_table::{
    CellSource, Result, SpecHeader, TableError, materialize_row, resolve_finalize_outcome,
};

use crate::biff::XlsBufferedEngine;
use crate::engine::SheetEngine;
use crate::spec::{EnumWorkbookKind, SpecSheetReport, SpecSheetWriteOptions};
use crate::util::{plan_column_widths, sanitize_sheet_name, validate_column_count};
use crate::xlsx::XlsxEngine;

/// Write `header` and `rows` to `sink` as a one-sheet workbook of `kind`.
///
/// Header and column-count problems are raised before any byte is written.
/// The container is serialized, the sink flushed and dropped, and the engine
/// released before returning, on success and failure alike.
pub fn write_sheet<R, I, W>(
    kind: EnumWorkbookKind,
    header: &SpecHeader,
    rows: I,
    sheet_name: &str,
    sink: W,
    options: &SpecSheetWriteOptions,
) -> Result<SpecSheetReport>
where
    R: CellSource,
    I: IntoIterator<Item = R>,
    W: Write + Seek + Send,
{
    header.validate_for_export()?;
    validate_column_count(kind, header.len())?;
    let c_sheet_name = sanitize_sheet_name(kind, sheet_name);

    match kind {
        EnumWorkbookKind::Legacy => {
            let engine = XlsBufferedEngine::new(&c_sheet_name, &options.style_set);
            write_with_engine(engine, header, rows, c_sheet_name, sink, options)
        }
        EnumWorkbookKind::Modern => {
            let if_streaming = options
                .n_rows_expected
                .is_none_or(|n_rows| n_rows >= options.n_rows_streaming_min);
            let engine = XlsxEngine::new(
                &c_sheet_name,
                &options.style_set,
                if_streaming,
                options.path_dir_temp.as_deref(),
            )?;
            write_with_engine(engine, header, rows, c_sheet_name, sink, options)
        }
    }
}

fn write_with_engine<E, R, I, W>(
    mut engine: E,
    header: &SpecHeader,
    rows: I,
    c_sheet_name: String,
    sink: W,
    options: &SpecSheetWriteOptions,
) -> Result<SpecSheetReport>
where
    E: SheetEngine,
    R: CellSource,
    I: IntoIterator<Item = R>,
    W: Write + Seek + Send,
{
    let engine_kind = engine.engine_kind();
    log::debug!(
        "sheet export started: {:?}, sheet {c_sheet_name:?}, {} columns",
        engine_kind,
        header.len()
    );

    let body = write_body(&mut engine, header, rows);
    let finalize = finalize_sheet_engine(engine, sink);
    let n_rows_written =
        resolve_finalize_outcome(body, finalize, options.finalize_policy, "sheet export")?;

    log::debug!("sheet export finished: {n_rows_written} rows");
    Ok(SpecSheetReport {
        sheet_name: c_sheet_name,
        n_rows_written,
        engine: engine_kind,
    })
}

fn write_body<E, R, I>(engine: &mut E, header: &SpecHeader, rows: I) -> Result<usize>
where
    E: SheetEngine,
    R: CellSource,
    I: IntoIterator<Item = R>,
{
    for (n_idx_col, n_width_units) in plan_column_widths(header).into_iter().enumerate() {
        engine.set_column_width(n_idx_col, n_width_units)?;
    }
    engine.write_header_row(header.display_labels())?;

    let mut n_rows_written = 0;
    for row in rows {
        let l_cells = materialize_row(&row, header);
        engine.write_data_row(n_rows_written, &l_cells)?;
        n_rows_written += 1;
    }
    Ok(n_rows_written)
}

/// Save, flush, drop the sink, then drop the engine.
///
/// The flush runs even when the save failed; the first error is returned.
fn finalize_sheet_engine<E: SheetEngine, W: Write + Seek + Send>(
    mut engine: E,
    mut sink: W,
) -> Result<()> {
    let saved = engine.save_to_writer(&mut sink);
    let flushed = sink
        .flush()
        .map_err(|err| TableError::io("flush sheet sink", err));
    drop(sink);
    drop(engine);
    saved.and(flushed)
}
