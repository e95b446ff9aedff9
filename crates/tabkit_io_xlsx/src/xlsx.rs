//! Modern engine: a one-sheet `rust_xlsxwriter` workbook.

use std::io::{Seek, Write};
use std::path::Path;

use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};
use tabkit_io_table::{Result, TableError};

use crate::engine::{SheetEngine, WriteOnlyEngine};
use crate::spec::{EnumEngineKind, EnumWorkbookKind, SpecCellFormat, SpecStyleSet};
use crate::util::{cast_col_num, cast_row_num, validate_row_index};

/// xlsx sheet builder, buffered or constant-memory.
///
/// A constant-memory worksheet flushes each finished row to a temporary file
/// and keeps only the current row in memory; the temporary files live until
/// the engine is dropped.
pub struct XlsxEngine {
    workbook: Workbook,
    fmt_header: Format,
    fmt_body: Format,
    engine_kind: EnumEngineKind,
}

impl XlsxEngine {
    pub fn new(
        sheet_name: &str,
        style_set: &SpecStyleSet,
        if_streaming: bool,
        path_dir_temp: Option<&Path>,
    ) -> Result<Self> {
        let mut workbook = Workbook::new();
        if let Some(path_dir) = path_dir_temp {
            workbook.set_tempdir(path_dir).map_err(derive_xlsx_error)?;
        }

        let worksheet = if if_streaming {
            workbook.add_worksheet_with_constant_memory()
        } else {
            workbook.add_worksheet()
        };
        worksheet.set_name(sheet_name).map_err(derive_xlsx_error)?;

        Ok(Self {
            workbook,
            fmt_header: derive_rust_xlsx_format(&style_set.header),
            fmt_body: derive_rust_xlsx_format(&style_set.body),
            engine_kind: if if_streaming {
                EnumEngineKind::StreamingXlsx
            } else {
                EnumEngineKind::BufferedXlsx
            },
        })
    }

    fn worksheet(&mut self) -> Result<&mut Worksheet> {
        self.workbook
            .worksheet_from_index(0)
            .map_err(derive_xlsx_error)
    }
}

impl SheetEngine for XlsxEngine {
    fn engine_kind(&self) -> EnumEngineKind {
        self.engine_kind
    }

    fn set_column_width(&mut self, n_idx_col: usize, n_width_units: usize) -> Result<()> {
        let n_col = cast_col_num(n_idx_col)?;
        self.worksheet()?
            .set_column_width(n_col, n_width_units as f64 / 256.0)
            .map_err(derive_xlsx_error)?;
        Ok(())
    }

    fn write_header_row(&mut self, l_labels: &[String]) -> Result<()> {
        let fmt_header = self.fmt_header.clone();
        write_text_row(self.worksheet()?, 0, l_labels, &fmt_header)
    }

    fn write_data_row(&mut self, n_idx_row_data: usize, l_cells: &[String]) -> Result<()> {
        validate_row_index(EnumWorkbookKind::Modern, n_idx_row_data)?;
        let fmt_body = self.fmt_body.clone();
        write_text_row(self.worksheet()?, n_idx_row_data + 1, l_cells, &fmt_body)
    }

    fn save_to_writer<W: Write + Seek + Send>(&mut self, sink: &mut W) -> Result<()> {
        self.workbook
            .save_to_writer(sink)
            .map_err(derive_xlsx_error)
    }
}

impl WriteOnlyEngine for XlsxEngine {}

fn write_text_row(
    worksheet: &mut Worksheet,
    n_idx_row: usize,
    l_cells: &[String],
    format: &Format,
) -> Result<()> {
    let n_row = cast_row_num(n_idx_row)?;
    for (n_idx_col, c_text) in l_cells.iter().enumerate() {
        let n_col = cast_col_num(n_idx_col)?;
        if c_text.is_empty() {
            worksheet
                .write_blank(n_row, n_col, format)
                .map_err(derive_xlsx_error)?;
        } else {
            worksheet
                .write_string_with_format(n_row, n_col, c_text, format)
                .map_err(derive_xlsx_error)?;
        }
    }
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////
// #region FormatConversion

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(val) = &spec.font_name {
        format = format.set_font_name(val.clone());
    }
    if let Some(val) = spec.font_size {
        format = format.set_font_size(val as f64);
    }
    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }
    if spec.italic.unwrap_or(false) {
        format = format.set_italic();
    }

    if let Some(val) = &spec.align
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }
    if let Some(val) = &spec.valign
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }

    if let Some(val) = &spec.bg_color {
        format = format.set_background_color(val.as_str());
    }
    if let Some(val) = &spec.font_color {
        format = format.set_font_color(val.as_str());
    }
    if let Some(val) = spec.border {
        format = format.set_border(derive_format_border(val));
    }

    format
}

fn derive_format_border(border: i64) -> FormatBorder {
    match border {
        1 => FormatBorder::Thin,
        2 => FormatBorder::Medium,
        3 => FormatBorder::Dashed,
        4 => FormatBorder::Dotted,
        5 => FormatBorder::Thick,
        6 => FormatBorder::Double,
        7 => FormatBorder::Hair,
        8 => FormatBorder::MediumDashed,
        9 => FormatBorder::DashDot,
        10 => FormatBorder::MediumDashDot,
        11 => FormatBorder::DashDotDot,
        12 => FormatBorder::MediumDashDotDot,
        13 => FormatBorder::SlantDashDot,
        _ => FormatBorder::None,
    }
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    match align.trim().to_ascii_lowercase().as_str() {
        "general" => Some(FormatAlign::General),
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        "fill" => Some(FormatAlign::Fill),
        "justify" => Some(FormatAlign::Justify),
        "center_across" => Some(FormatAlign::CenterAcross),
        "distributed" => Some(FormatAlign::Distributed),
        "top" => Some(FormatAlign::Top),
        "bottom" => Some(FormatAlign::Bottom),
        "vcenter" | "vertical_center" => Some(FormatAlign::VerticalCenter),
        "vjustify" | "vertical_justify" => Some(FormatAlign::VerticalJustify),
        "vdistributed" | "vertical_distributed" => Some(FormatAlign::VerticalDistributed),
        _ => None,
    }
}

/// Row/column overflow and oversized strings are limits, everything else is a backend error.
fn derive_xlsx_error(err: XlsxError) -> TableError {
    match err {
        XlsxError::RowColumnLimitError | XlsxError::MaxStringLengthExceeded => {
            TableError::Limit(format!("xlsx write error: {err}"))
        }
        other => TableError::Xlsx(format!("xlsx write error: {other}")),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
