//! Facade constants.

/// File stem used when the caller passes an empty one.
pub const C_FILE_STEM_DEFAULT: &str = "default";
/// Prefix of the `Content-Disposition` header value.
pub const C_PREFIX_CONTENT_DISPOSITION: &str = "attachment;fileName=";
/// Subdirectory of the save root that receives saved exports.
pub const C_DIR_DOWNLOAD: &str = "download";
