//! Stateless helpers behind the field extractor.

use std::collections::{BTreeMap, BTreeSet};

use crate::conf::{
    C_PATTERN_TEMPORAL, C_PREFIX_ACCESSOR, C_TEXT_NAN, C_TEXT_NEGINF, C_TEXT_POSINF,
    N_SCALE_DECIMAL,
};
use crate::error::{Result, TableError};
use crate::spec::{EnumCellValue, EnumFinalizePolicy};

////////////////////////////////////////////////////////////////////////////////
// #region CellStringification

/// Render a cell value as text. Total: every value maps to a string.
pub fn stringify_cell_value(value: &EnumCellValue) -> String {
    match value {
        EnumCellValue::Absent => String::new(),
        EnumCellValue::Temporal(val) => val.format(C_PATTERN_TEMPORAL).to_string(),
        EnumCellValue::Float(val) => format_decimal_half_up(*val, N_SCALE_DECIMAL),
        EnumCellValue::Integer(val) => val.to_string(),
        EnumCellValue::Boolean(val) => val.to_string(),
        EnumCellValue::Text(val) => val.clone(),
    }
}

/// Round `x` half away from zero to `n_scale` digits, in fixed-point notation.
///
/// Rounding operates on the shortest decimal text of `x`, so `2.005` gives
/// `2.01` even though its binary value sits slightly below.
pub fn format_decimal_half_up(x: f64, n_scale: usize) -> String {
    if x.is_nan() {
        return C_TEXT_NAN.to_string();
    }
    if x.is_infinite() {
        return if x.is_sign_positive() {
            C_TEXT_POSINF
        } else {
            C_TEXT_NEGINF
        }
        .to_string();
    }
    round_decimal_text_half_up(&x.to_string(), n_scale)
}

fn round_decimal_text_half_up(c_decimal: &str, n_scale: usize) -> String {
    let (if_negative, c_abs) = match c_decimal.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, c_decimal),
    };
    let (c_int, c_frac) = c_abs.split_once('.').unwrap_or((c_abs, ""));

    let mut l_digits: Vec<u8> = c_int
        .bytes()
        .chain(c_frac.bytes().chain(std::iter::repeat(b'0')).take(n_scale))
        .map(|b| b - b'0')
        .collect();

    let if_round_up = c_frac
        .as_bytes()
        .get(n_scale)
        .is_some_and(|b| *b >= b'5');
    if if_round_up {
        let mut if_carry = true;
        for digit in l_digits.iter_mut().rev() {
            if *digit == 9 {
                *digit = 0;
            } else {
                *digit += 1;
                if_carry = false;
                break;
            }
        }
        if if_carry {
            l_digits.insert(0, 1);
        }
    }

    let n_len_int = l_digits.len() - n_scale;
    let mut c_out = String::with_capacity(l_digits.len() + 2);
    if if_negative && l_digits.iter().any(|digit| *digit != 0) {
        c_out.push('-');
    }
    if n_len_int == 0 {
        c_out.push('0');
    }
    for (n_idx, digit) in l_digits.iter().enumerate() {
        if n_idx == n_len_int && n_scale > 0 {
            c_out.push('.');
        }
        c_out.push(char::from(b'0' + digit));
    }
    c_out
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region HeaderValidation

/// Validate that `columns` has no duplicated names.
pub fn validate_unique_columns(columns: &[String]) -> std::result::Result<(), String> {
    if columns.len() == columns.iter().collect::<BTreeSet<_>>().len() {
        return Ok(());
    }
    Err(derive_duplicate_report(columns, false))
}

/// Like [`validate_unique_columns`], but any number of empty names is allowed.
pub fn validate_unique_named_columns(columns: &[String]) -> std::result::Result<(), String> {
    let l_named: Vec<&String> = columns.iter().filter(|c_name| !c_name.is_empty()).collect();
    if l_named.len() == l_named.iter().collect::<BTreeSet<_>>().len() {
        return Ok(());
    }
    Err(derive_duplicate_report(columns, true))
}

fn derive_duplicate_report(columns: &[String], if_skip_empty: bool) -> String {
    let mut dict_pos: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (n_idx, c_name) in columns.iter().enumerate() {
        if if_skip_empty && c_name.is_empty() {
            continue;
        }
        dict_pos.entry(c_name).or_default().push(n_idx);
    }

    let c_msg = dict_pos
        .iter()
        .filter(|(_, l_pos)| l_pos.len() > 1)
        .map(|(c_name, l_pos)| format!("{c_name:?} x{} at indices {l_pos:?}", l_pos.len()))
        .collect::<Vec<_>>()
        .join("; ");

    format!("Duplicate field keys detected: {c_msg}")
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region AccessorNaming

/// Accessor name for a field key: `userName` -> `getUserName`.
pub fn derive_accessor_name(field_key: &str) -> String {
    let mut chars = field_key.chars();
    match chars.next() {
        Some(c_first) => format!(
            "{C_PREFIX_ACCESSOR}{}{}",
            c_first.to_uppercase(),
            chars.as_str()
        ),
        None => C_PREFIX_ACCESSOR.to_string(),
    }
}

/// Field key for an accessor name: `getUserName` -> `userName`.
///
/// Names without the `get` prefix are taken as the key itself.
pub fn derive_field_key_from_accessor(accessor_name: &str) -> String {
    let c_stem = accessor_name
        .strip_prefix(C_PREFIX_ACCESSOR)
        .filter(|rest| !rest.is_empty())
        .unwrap_or(accessor_name);

    let mut chars = c_stem.chars();
    match chars.next() {
        Some(c_first) if c_first.is_uppercase() => {
            format!("{}{}", c_first.to_lowercase(), chars.as_str())
        }
        _ => c_stem.to_string(),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Finalization

/// Combine the body outcome with the finalize outcome of one output call.
///
/// A body failure always wins; the finalize failure behind it is only logged.
pub fn resolve_finalize_outcome<T>(
    body: Result<T>,
    finalize: Result<()>,
    policy: EnumFinalizePolicy,
    c_context: &str,
) -> Result<T> {
    match (body, finalize) {
        (Ok(value), Ok(())) => Ok(value),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(err_finalize)) => {
            log::warn!("{c_context}: finalize failed after write error: {err_finalize}");
            Err(err)
        }
        (Ok(value), Err(err_finalize)) => match policy {
            EnumFinalizePolicy::Strict => Err(match err_finalize {
                TableError::Finalize(_) => err_finalize,
                other => TableError::Finalize(format!("{c_context}: {other}")),
            }),
            EnumFinalizePolicy::BestEffort => {
                log::warn!("{c_context}: finalize failure suppressed: {err_finalize}");
                Ok(value)
            }
        },
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
