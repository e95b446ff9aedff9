//! Write contract shared by the buffered and streaming sheet engines.

use std::io::{Seek, Write};

use tabkit_io_table::Result;

use crate::spec::EnumEngineKind;

/// One-sheet workbook builder.
///
/// Calls arrive in a fixed order: column widths, the header row, data rows
/// top to bottom, then a single `save_to_writer`.
pub trait SheetEngine {
    fn engine_kind(&self) -> EnumEngineKind;

    /// Set the width of one column, in 1/256 character units.
    fn set_column_width(&mut self, n_idx_col: usize, n_width_units: usize) -> Result<()>;

    /// Write row 0 with the header style.
    fn write_header_row(&mut self, l_labels: &[String]) -> Result<()>;

    /// Write one data row with the body style. `n_idx_row_data` is zero-based
    /// and excludes the header.
    fn write_data_row(&mut self, n_idx_row_data: usize, l_cells: &[String]) -> Result<()>;

    /// Serialize the workbook container into `sink`.
    fn save_to_writer<W: Write + Seek + Send>(&mut self, sink: &mut W) -> Result<()>;
}

/// Engines that keep written cells and can hand their text back.
pub trait SheetReadBack {
    /// Text of the cell at sheet row `n_idx_row` (row 0 is the header).
    fn cell_text(&self, n_idx_row: usize, n_idx_col: usize) -> Option<&str>;

    /// Number of sheet rows written, header included.
    fn n_rows(&self) -> usize;
}

/// Engines that spill rows and cannot read them back.
pub trait WriteOnlyEngine: SheetEngine {}
