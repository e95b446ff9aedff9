//! Caller-facing targets, options and reports.

use std::path::PathBuf;

use tabkit_io_csv::{C_ENCODING_DEFAULT, SpecCsvReport, SpecCsvWriteOptions};
use tabkit_io_xlsx::{EnumWorkbookKind, SpecSheetReport, SpecSheetWriteOptions};

////////////////////////////////////////////////////////////////////////////////
// #region ExportTarget

/// Physical output of one export call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumExportTarget {
    /// Delimited text in a WHATWG-labelled encoding.
    Csv { encoding: String },
    /// One-sheet workbook.
    Workbook {
        kind: EnumWorkbookKind,
        sheet_name: String,
    },
}

impl EnumExportTarget {
    /// UTF-8 delimited text.
    pub fn csv_default() -> Self {
        Self::Csv {
            encoding: C_ENCODING_DEFAULT.to_string(),
        }
    }

    pub fn format(&self) -> EnumExportFormat {
        match self {
            Self::Csv { .. } => EnumExportFormat::Csv,
            Self::Workbook {
                kind: EnumWorkbookKind::Legacy,
                ..
            } => EnumExportFormat::Xls,
            Self::Workbook {
                kind: EnumWorkbookKind::Modern,
                ..
            } => EnumExportFormat::Xlsx,
        }
    }
}

/// File format of a download or saved export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumExportFormat {
    Csv,
    Xls,
    Xlsx,
}

impl EnumExportFormat {
    /// File suffix including the dot.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Csv => ".csv",
            Self::Xls => EnumWorkbookKind::Legacy.suffix(),
            Self::Xlsx => EnumWorkbookKind::Modern.suffix(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region OptionsAndReports

/// Per-format options; only the one matching the target is used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecExportOptions {
    pub csv: SpecCsvWriteOptions,
    pub sheet: SpecSheetWriteOptions,
}

/// Outcome of one export call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumExportReport {
    Csv(SpecCsvReport),
    Sheet(SpecSheetReport),
}

impl EnumExportReport {
    /// Data rows written, header excluded.
    pub fn n_rows_written(&self) -> usize {
        match self {
            Self::Csv(report) => report.n_rows_written,
            Self::Sheet(report) => report.n_rows_written,
        }
    }
}

/// A file written under the local download directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSavedExport<T> {
    /// Absolute or root-relative path of the written file.
    pub path_file: PathBuf,
    /// Public URL of the file: `<url_prefix>/<file name>`.
    pub c_url: String,
    /// Value returned by the write callback.
    pub value: T,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
