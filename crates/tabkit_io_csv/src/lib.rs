//! `tabkit_io_csv` v1:
//! Delimited text writer and reader with declared character encodings.
//!
//! - `conf`      : constants
//! - `spec`      : options and reports
//! - `transcode` : encoding resolution and UTF-8 transcoding writer
//! - `writer`    : header + rows to CSV
//! - `reader`    : CSV to keyed rows
pub mod conf;
pub mod reader;
pub mod spec;
pub mod transcode;
pub mod writer;

pub use conf::C_ENCODING_DEFAULT;
pub use reader::read_csv_all;
pub use spec::{SpecCsvReadOptions, SpecCsvReport, SpecCsvWriteOptions};
pub use transcode::{TranscodingWriter, resolve_input_encoding, resolve_output_encoding};
pub use writer::write_csv;
