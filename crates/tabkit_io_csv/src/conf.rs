//! Delimited text constants.

/// Encoding label used when the caller does not name one.
pub const C_ENCODING_DEFAULT: &str = "utf-8";
/// Field delimiter.
pub const U8_DELIMITER: u8 = b',';
/// Replacement written for characters the target encoding cannot represent.
pub const V_UNMAPPABLE_REPLACEMENT: &[u8] = b"?";
/// UTF-8 byte-order mark.
pub const V_BOM_UTF8: &[u8] = b"\xEF\xBB\xBF";
/// Size of the transcoder output buffer in bytes.
pub const N_LEN_ENCODE_BUFFER: usize = 8 * 1024;
