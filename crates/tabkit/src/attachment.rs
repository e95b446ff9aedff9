//! Download naming: attachment file name and `Content-Disposition` value.

use crate::conf::{C_FILE_STEM_DEFAULT, C_PREFIX_CONTENT_DISPOSITION};
use crate::spec::EnumExportFormat;

/// `<stem><suffix>`; an empty or blank stem becomes `default`.
pub fn derive_attachment_filename(stem: &str, format: EnumExportFormat) -> String {
    let c_stem = stem.trim();
    let c_stem = if c_stem.is_empty() {
        C_FILE_STEM_DEFAULT
    } else {
        c_stem
    };
    format!("{c_stem}{}", format.suffix())
}

/// `attachment;fileName=<percent-encoded file name>`.
pub fn derive_content_disposition(stem: &str, format: EnumExportFormat) -> String {
    let c_filename = derive_attachment_filename(stem, format);
    format!(
        "{C_PREFIX_CONTENT_DISPOSITION}{}",
        urlencoding::encode(&c_filename)
    )
}
