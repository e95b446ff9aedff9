//! `tabkit_io_xlsx` v1:
//! One-sheet `.xls` / `.xlsx` export with header and body styling.
//!
//! - `conf`   : limits, palette and default style preset
//! - `spec`   : cell formats, workbook kinds, options and reports
//! - `util`   : sheet names, column widths, ceilings, colors
//! - `engine` : `SheetEngine` write contract
//! - `ole`    : OLE2 compound file container
//! - `biff`   : buffered BIFF8 engine (legacy)
//! - `xlsx`   : `rust_xlsxwriter` engine (modern)
//! - `writer` : engine selection and finalization
pub mod biff;
pub mod conf;
pub mod engine;
pub mod ole;
pub mod spec;
pub mod util;
pub mod writer;
pub mod xlsx;

pub use biff::XlsBufferedEngine;
pub use conf::derive_default_style_set;
pub use engine::{SheetEngine, SheetReadBack, WriteOnlyEngine};
pub use spec::{
    EnumEngineKind, EnumWorkbookKind, SpecCellFormat, SpecSheetReport, SpecSheetWriteOptions,
    SpecStyleSet,
};
pub use util::sanitize_sheet_name;
pub use writer::write_sheet;
pub use xlsx::XlsxEngine;
