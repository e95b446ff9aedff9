//! `tabkit_io_table` v1:
//! Row model shared by the delimited and spreadsheet engines.
//!
//! - `conf`        : constants
//! - `spec`        : cell values, header, keyed rows, finalize policy
//! - `util`        : pure helper functions (stringification, naming)
//! - `source`      : `CellSource` row capability
//! - `materialize` : field extractor and row materializer
//! - `record`      : accessor registry for record types
//! - `frame`       : Polars DataFrame rows
pub mod conf;
pub mod error;
pub mod frame;
pub mod materialize;
pub mod record;
pub mod source;
pub mod spec;
pub mod util;

pub use conf::{C_PATTERN_TEMPORAL, N_SCALE_DECIMAL};
pub use error::{Result, TableError};
pub use frame::{SpecFrameRow, SpecFrameRows, derive_dataframe_from_ipc_bytes};
pub use materialize::{extract_cell_text, materialize_all, materialize_row};
pub use record::{Record, SpecFieldAccessors, SpecRecordRow};
pub use source::CellSource;
pub use spec::{EnumCellValue, EnumFinalizePolicy, SpecHeader, SpecKeyedRow};
pub use util::{
    derive_accessor_name, derive_field_key_from_accessor, format_decimal_half_up,
    resolve_finalize_outcome, stringify_cell_value,
};
