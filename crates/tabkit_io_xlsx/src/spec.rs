//! Shared spreadsheet specification models.

use std::path::PathBuf;

use tabkit_io_table::EnumFinalizePolicy;

use crate::conf::{
    N_NCOLS_XLS_MAX, N_NCOLS_XLSX_MAX, N_NROWS_STREAMING_MIN_DEFAULT, N_NROWS_XLS_MAX,
    N_NROWS_XLSX_MAX, derive_default_style_set,
};

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Presentation attributes of one cell class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font family name.
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,
    /// Italic style.
    pub italic: Option<bool>,

    /// Horizontal alignment.
    pub align: Option<String>,
    /// Vertical alignment.
    pub valign: Option<String>,
    /// Border style for all sides.
    pub border: Option<i64>,

    /// Solid background fill color, `#RRGGBB`.
    pub bg_color: Option<String>,
    /// Font color, `#RRGGBB`.
    pub font_color: Option<String>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_name: other.font_name.clone().or_else(|| self.font_name.clone()),
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            italic: other.italic.or(self.italic),
            align: other.align.clone().or_else(|| self.align.clone()),
            valign: other.valign.clone().or_else(|| self.valign.clone()),
            border: other.border.or(self.border),
            bg_color: other.bg_color.clone().or_else(|| self.bg_color.clone()),
            font_color: other.font_color.clone().or_else(|| self.font_color.clone()),
        }
    }
}

/// Header and body styles of one output operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecStyleSet {
    /// Applied to every cell of row 0.
    pub header: SpecCellFormat,
    /// Applied to every data cell.
    pub body: SpecCellFormat,
}

impl Default for SpecStyleSet {
    fn default() -> Self {
        derive_default_style_set()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WorkbookKind

/// Physical spreadsheet container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumWorkbookKind {
    /// Excel 97-2003 `.xls` (BIFF8 in an OLE2 compound file).
    Legacy,
    /// Office Open XML `.xlsx`.
    Modern,
}

impl EnumWorkbookKind {
    /// File suffix including the dot.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Legacy => ".xls",
            Self::Modern => ".xlsx",
        }
    }

    pub fn n_rows_max(self) -> usize {
        match self {
            Self::Legacy => N_NROWS_XLS_MAX,
            Self::Modern => N_NROWS_XLSX_MAX,
        }
    }

    pub fn n_cols_max(self) -> usize {
        match self {
            Self::Legacy => N_NCOLS_XLS_MAX,
            Self::Modern => N_NCOLS_XLSX_MAX,
        }
    }
}

/// Engine that produced a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumEngineKind {
    /// In-memory BIFF8 builder.
    BufferedXls,
    /// In-memory xlsx worksheet.
    BufferedXlsx,
    /// Constant-memory xlsx worksheet spilling rows to a temp directory.
    StreamingXlsx,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WriteOptions

/// Options of one spreadsheet export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetWriteOptions {
    /// Header and body styles.
    pub style_set: SpecStyleSet,
    /// Handling of flush/close failures after a successful body write.
    pub finalize_policy: EnumFinalizePolicy,
    /// Caller's row count estimate; used only to pick the modern engine.
    pub n_rows_expected: Option<usize>,
    /// Expected row counts below this use a buffered xlsx worksheet.
    pub n_rows_streaming_min: usize,
    /// Directory for the streaming engine's temporary files.
    pub path_dir_temp: Option<PathBuf>,
}

impl Default for SpecSheetWriteOptions {
    fn default() -> Self {
        Self {
            style_set: SpecStyleSet::default(),
            finalize_policy: EnumFinalizePolicy::Strict,
            n_rows_expected: None,
            n_rows_streaming_min: N_NROWS_STREAMING_MIN_DEFAULT,
            path_dir_temp: None,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// Outcome of one spreadsheet export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetReport {
    /// Sheet name after sanitizing.
    pub sheet_name: String,
    /// Data rows written, header excluded.
    pub n_rows_written: usize,
    /// Engine that produced the sheet.
    pub engine: EnumEngineKind,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
