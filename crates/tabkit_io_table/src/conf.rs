//! Table constants shared by the extractor and every output engine.

/// Fixed rendering pattern for temporal cells (`yyyy-MM-dd HH:mm:ss`).
pub const C_PATTERN_TEMPORAL: &str = "%Y-%m-%d %H:%M:%S";
/// Fractional digits kept when rendering floating-point cells.
pub const N_SCALE_DECIMAL: usize = 2;
/// Prefix of record accessor names (`getUserName` -> `userName`).
pub const C_PREFIX_ACCESSOR: &str = "get";

/// Text rendered for a NaN float.
pub const C_TEXT_NAN: &str = "NaN";
/// Text rendered for positive infinity.
pub const C_TEXT_POSINF: &str = "Infinity";
/// Text rendered for negative infinity.
pub const C_TEXT_NEGINF: &str = "-Infinity";
