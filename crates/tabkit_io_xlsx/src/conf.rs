//! Spreadsheet constants and default preset factories.

use crate::spec::{SpecCellFormat, SpecStyleSet};

/// Legacy (`.xls`, BIFF8) worksheet maximum row count.
pub const N_NROWS_XLS_MAX: usize = 65_536;
/// Legacy (`.xls`, BIFF8) worksheet maximum column count.
pub const N_NCOLS_XLS_MAX: usize = 256;
/// Modern (`.xlsx`) worksheet maximum row count.
pub const N_NROWS_XLSX_MAX: usize = 1_048_576;
/// Modern (`.xlsx`) worksheet maximum column count.
pub const N_NCOLS_XLSX_MAX: usize = 16_384;
/// Sheet name maximum length: UTF-16 units in `.xls`, chars in `.xlsx`.
pub const N_LEN_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const L_CHAR_SHEET_NAME_ILLEGAL: [char; 7] = ['*', ':', '?', '/', '\\', '[', ']'];
/// Substitute for illegal and control characters.
pub const CHAR_SHEET_NAME_REPLACEMENT: char = '_';
/// Name Excel keeps for its own change-history sheet.
pub const C_SHEET_NAME_RESERVED: &str = "History";
/// Sheet name used when sanitizing leaves nothing usable.
pub const C_SHEET_NAME_DEFAULT: &str = "Sheet";

/// Minimum column width in characters.
pub const N_WIDTH_COLUMN_MIN: usize = 17;
/// Column width units per character (1/256 character units).
pub const N_WIDTH_COLUMN_SCALE: usize = 256;
/// Largest column width the containers accept, in 1/256 character units.
pub const N_WIDTH_COLUMN_UNITS_MAX: usize = 255 * N_WIDTH_COLUMN_SCALE;

/// Below this expected row count the modern engine keeps the sheet in memory.
pub const N_NROWS_STREAMING_MIN_DEFAULT: usize = 1_000;

/// Fill color of the default header style (palette "light green").
pub const C_COLOR_HEADER_FILL: &str = "#CCFFCC";

/// BIFF8 default color palette, indices 8..=63, as `0xRRGGBB`.
pub const L_PALETTE_XLS_DEFAULT: [u32; 56] = [
    0x000000, 0xFFFFFF, 0xFF0000, 0x00FF00, 0x0000FF, 0xFFFF00, 0xFF00FF, 0x00FFFF, //
    0x800000, 0x008000, 0x000080, 0x808000, 0x800080, 0x008080, 0xC0C0C0, 0x808080, //
    0x9999FF, 0x993366, 0xFFFFCC, 0xCCFFFF, 0x660066, 0xFF8080, 0x0066CC, 0xCCCCFF, //
    0x000080, 0xFF00FF, 0xFFFF00, 0x00FFFF, 0x800080, 0x800000, 0x008080, 0x0000FF, //
    0x00CCFF, 0xCCFFFF, 0xCCFFCC, 0xFFFF99, 0x99CCFF, 0xFF99CC, 0xCC99FF, 0xFFCC99, //
    0x3366FF, 0x33CCCC, 0x99CC00, 0xFFCC00, 0xFF9900, 0xFF6600, 0x666699, 0x969696, //
    0x003366, 0x339966, 0x003300, 0x333300, 0x993300, 0x993366, 0x333399, 0x333333, //
];
/// Palette index of the first entry of [`L_PALETTE_XLS_DEFAULT`].
pub const N_IDX_PALETTE_XLS_FIRST: u16 = 8;

/// Build the default header/body style pair.
///
/// Both styles are centered horizontally and vertically with thin borders;
/// the header adds a bold 12pt font on a light-green solid fill.
pub fn derive_default_style_set() -> SpecStyleSet {
    let cfg_base_fmt_spec = SpecCellFormat {
        align: Some("center".to_string()),
        valign: Some("vcenter".to_string()),
        border: Some(1),
        ..Default::default()
    };

    SpecStyleSet {
        header: cfg_base_fmt_spec.with_(SpecCellFormat {
            bold: Some(true),
            font_size: Some(12),
            bg_color: Some(C_COLOR_HEADER_FILL.to_string()),
            ..Default::default()
        }),
        body: cfg_base_fmt_spec.with_(SpecCellFormat {
            bold: Some(false),
            ..Default::default()
        }),
    }
}
