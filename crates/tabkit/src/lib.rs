//! `tabkit` v1:
//! Caller-facing entry points of the tabular transcoding engine.
//!
//! - `conf`       : constants
//! - `spec`       : export targets, formats, options and reports
//! - `export`     : export by keyed rows / records / DataFrame, delimited import;
//!                  `export_delimited_*` take any `Write` sink
//! - `attachment` : download file name and `Content-Disposition`
//! - `save`       : local save under a download directory
pub mod attachment;
pub mod conf;
pub mod export;
pub mod save;
pub mod spec;

pub use attachment::{derive_attachment_filename, derive_content_disposition};
pub use export::{
    export_by_frame, export_by_frame_ipc, export_by_keyed_rows, export_by_records,
    export_delimited_by_frame, export_delimited_by_keyed_rows, export_delimited_by_records,
    import_delimited,
};
pub use save::save_export;
pub use spec::{
    EnumExportFormat, EnumExportReport, EnumExportTarget, SpecExportOptions, SpecSavedExport,
};

pub use tabkit_io_csv::{SpecCsvReadOptions, SpecCsvReport, SpecCsvWriteOptions};
pub use tabkit_io_table::{
    CellSource, EnumCellValue, EnumFinalizePolicy, Record, Result, SpecFieldAccessors, SpecHeader,
    SpecKeyedRow, TableError,
};
pub use tabkit_io_xlsx::{
    EnumEngineKind, EnumWorkbookKind, SpecCellFormat, SpecSheetReport, SpecSheetWriteOptions,
    SpecStyleSet,
};
