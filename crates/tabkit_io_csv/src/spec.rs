//! Delimited writer/reader options and reports.

use tabkit_io_table::EnumFinalizePolicy;

/// Options of one delimited export.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecCsvWriteOptions {
    /// Prefix UTF-8 output with a byte-order mark. Ignored for other encodings.
    pub if_write_bom: bool,
    /// Handling of flush/close failures after a successful body write.
    pub finalize_policy: EnumFinalizePolicy,
}

/// Options of one delimited import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecCsvReadOptions {
    /// Drop the first data record after the header.
    ///
    /// Enabled by default so existing imports keep returning rows from the
    /// second data record on.
    pub if_skip_first_data_row: bool,
}

impl Default for SpecCsvReadOptions {
    fn default() -> Self {
        Self {
            if_skip_first_data_row: true,
        }
    }
}

/// Outcome of one delimited export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecCsvReport {
    /// Data rows written, header excluded.
    pub n_rows_written: usize,
    /// Canonical name of the output encoding.
    pub c_encoding: String,
}
