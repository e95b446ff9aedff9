//! Stateless helper utilities used by both sheet engines.

use tabkit_io_table::{Result, SpecHeader, TableError};

use crate::conf::{
    C_SHEET_NAME_DEFAULT, C_SHEET_NAME_RESERVED, CHAR_SHEET_NAME_REPLACEMENT,
    L_CHAR_SHEET_NAME_ILLEGAL, L_PALETTE_XLS_DEFAULT, N_IDX_PALETTE_XLS_FIRST,
    N_LEN_SHEET_NAME_MAX, N_WIDTH_COLUMN_MIN, N_WIDTH_COLUMN_SCALE, N_WIDTH_COLUMN_UNITS_MAX,
};
use crate::spec::EnumWorkbookKind;

////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Turn `name` into a sheet name `kind` workbooks accept.
///
/// Illegal and control characters become `_`. Surrounding whitespace and
/// apostrophes are dropped, both before and after the length cut. Legacy
/// names are cut at 31 UTF-16 units (the BIFF8 string length), modern ones
/// at 31 chars. Empty results and the reserved `History` become `Sheet`.
pub fn sanitize_sheet_name(kind: EnumWorkbookKind, name: &str) -> String {
    let c_replaced: String = name
        .chars()
        .map(|c| {
            if c.is_control() || L_CHAR_SHEET_NAME_ILLEGAL.contains(&c) {
                CHAR_SHEET_NAME_REPLACEMENT
            } else {
                c
            }
        })
        .collect();

    let mut n_units = 0;
    let c_cut: String = trim_sheet_name_edges(&c_replaced)
        .chars()
        .take_while(|&c| {
            n_units += match kind {
                EnumWorkbookKind::Legacy => c.len_utf16(),
                EnumWorkbookKind::Modern => 1,
            };
            n_units <= N_LEN_SHEET_NAME_MAX
        })
        .collect();

    let c_name = trim_sheet_name_edges(&c_cut);
    if c_name.is_empty() || c_name.eq_ignore_ascii_case(C_SHEET_NAME_RESERVED) {
        return C_SHEET_NAME_DEFAULT.to_string();
    }
    c_name.to_string()
}

fn trim_sheet_name_edges(c_name: &str) -> &str {
    c_name.trim_matches(|c: char| c.is_whitespace() || c == '\'')
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ColumnPlanning

/// Column widths in 1/256 character units, one per field key.
///
/// Width is the UTF-8 byte length of the key, at least 17 characters.
pub fn plan_column_widths(header: &SpecHeader) -> Vec<usize> {
    header
        .field_keys()
        .iter()
        .map(|key| {
            (key.len().max(N_WIDTH_COLUMN_MIN) * N_WIDTH_COLUMN_SCALE)
                .min(N_WIDTH_COLUMN_UNITS_MAX)
        })
        .collect()
}

/// Reject headers wider than the container allows.
pub fn validate_column_count(kind: EnumWorkbookKind, n_cols: usize) -> Result<()> {
    if n_cols > kind.n_cols_max() {
        return Err(TableError::Config(format!(
            "{n_cols} columns exceed the {} column limit of {kind:?} workbooks.",
            kind.n_cols_max()
        )));
    }
    Ok(())
}

/// Reject a data row that would not fit under the container's row ceiling.
///
/// `n_idx_row_data` is zero-based; the header occupies one sheet row.
pub fn validate_row_index(kind: EnumWorkbookKind, n_idx_row_data: usize) -> Result<()> {
    if n_idx_row_data + 1 >= kind.n_rows_max() {
        return Err(TableError::Limit(format!(
            "data row {} exceeds the {} row limit of {kind:?} workbooks.",
            n_idx_row_data + 1,
            kind.n_rows_max()
        )));
    }
    Ok(())
}

pub fn cast_row_num(value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| TableError::Limit(format!("row index overflow: {value}")))
}

pub fn cast_col_num(value: usize) -> Result<u16> {
    u16::try_from(value).map_err(|_| TableError::Config(format!("column index overflow: {value}")))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Colors

/// Parse `#RRGGBB` (leading `#` optional) into `0xRRGGBB`.
pub fn derive_rgb_from_hex(color: &str) -> Option<u32> {
    let c_hex = color.trim();
    let c_hex = c_hex.strip_prefix('#').unwrap_or(c_hex);
    if c_hex.len() != 6 {
        return None;
    }
    u32::from_str_radix(c_hex, 16).ok()
}

/// Nearest BIFF8 default palette index for a `#RRGGBB` color.
pub fn derive_palette_index(color: &str) -> Option<u16> {
    let n_rgb = derive_rgb_from_hex(color)?;
    let split = |n: u32| {
        (
            ((n >> 16) & 0xFF) as i64,
            ((n >> 8) & 0xFF) as i64,
            (n & 0xFF) as i64,
        )
    };
    let (n_r, n_g, n_b) = split(n_rgb);

    L_PALETTE_XLS_DEFAULT
        .iter()
        .enumerate()
        .min_by_key(|(_, n_entry)| {
            let (n_r2, n_g2, n_b2) = split(**n_entry);
            (n_r - n_r2).pow(2) + (n_g - n_g2).pow(2) + (n_b - n_b2).pow(2)
        })
        .map(|(n_idx, _)| N_IDX_PALETTE_XLS_FIRST + n_idx as u16)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_sheet_name_replaces_and_trims() {
        for kind in [EnumWorkbookKind::Legacy, EnumWorkbookKind::Modern] {
            assert_eq!(sanitize_sheet_name(kind, "a/b:c"), "a_b_c");
            assert_eq!(sanitize_sheet_name(kind, "  [x]  "), "_x_");
            assert_eq!(sanitize_sheet_name(kind, "tab\there"), "tab_here");
            assert_eq!(sanitize_sheet_name(kind, " 'quoted' "), "quoted");
            assert_eq!(sanitize_sheet_name(kind, "''"), "Sheet");
            assert_eq!(sanitize_sheet_name(kind, "   "), "Sheet");
            assert_eq!(sanitize_sheet_name(kind, "history"), "Sheet");
            assert_eq!(sanitize_sheet_name(kind, "History 2024"), "History 2024");
            assert_eq!(sanitize_sheet_name(kind, &"n".repeat(40)).len(), 31);
            assert_eq!(sanitize_sheet_name(kind, "报表*2024"), "报表_2024");
        }
    }

    #[test]
    fn test_sanitize_sheet_name_cut_depends_on_kind() {
        // 15 astral chars take 30 UTF-16 units.
        let c_name = format!("{}ab", "😀".repeat(15));
        assert_eq!(
            sanitize_sheet_name(EnumWorkbookKind::Legacy, &c_name),
            format!("{}a", "😀".repeat(15))
        );
        assert_eq!(sanitize_sheet_name(EnumWorkbookKind::Modern, &c_name), c_name);

        let c_name = format!("{}'tail", "x".repeat(30));
        for kind in [EnumWorkbookKind::Legacy, EnumWorkbookKind::Modern] {
            assert_eq!(sanitize_sheet_name(kind, &c_name), "x".repeat(30));
        }
    }

    #[test]
    fn test_plan_column_widths_uses_byte_length_with_minimum() {
        let header = SpecHeader::from_field_keys([
            "id".to_string(),
            "a_rather_long_field_key".to_string(),
            "名前名前名前".to_string(),
        ])
        .unwrap();
        assert_eq!(
            plan_column_widths(&header),
            vec![17 * 256, 23 * 256, 18 * 256]
        );
    }

    #[test]
    fn test_plan_column_widths_caps_at_container_maximum() {
        let header = SpecHeader::from_field_keys(["k".repeat(300)]).unwrap();
        assert_eq!(plan_column_widths(&header), vec![255 * 256]);
    }

    #[test]
    fn test_column_and_row_ceilings() {
        assert!(validate_column_count(EnumWorkbookKind::Legacy, 256).is_ok());
        assert!(matches!(
            validate_column_count(EnumWorkbookKind::Legacy, 257),
            Err(TableError::Config(_))
        ));
        assert!(validate_column_count(EnumWorkbookKind::Modern, 16_384).is_ok());

        assert!(validate_row_index(EnumWorkbookKind::Legacy, 65_534).is_ok());
        assert!(matches!(
            validate_row_index(EnumWorkbookKind::Legacy, 65_535),
            Err(TableError::Limit(_))
        ));
    }

    #[test]
    fn test_derive_palette_index() {
        assert_eq!(derive_palette_index("#CCFFCC"), Some(42));
        assert_eq!(derive_palette_index("000000"), Some(8));
        assert_eq!(derive_palette_index("#FE0101"), Some(10));
        assert_eq!(derive_palette_index("green-ish"), None);
    }
}
