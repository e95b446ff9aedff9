//! Shared table specification models.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};

use crate::error::{Result, TableError};
use crate::util::validate_unique_columns;

////////////////////////////////////////////////////////////////////////////////
// #region CellValue

/// Normalized cell value fed to the field extractor.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EnumCellValue {
    /// Missing key, null, or failed accessor.
    #[default]
    Absent,
    /// Text value, written as-is.
    Text(String),
    /// Naive local date-time.
    Temporal(NaiveDateTime),
    /// Floating-point value, rendered as fixed two-digit decimal.
    Float(f64),
    /// Integer value.
    Integer(i128),
    /// Boolean value.
    Boolean(bool),
}

impl From<String> for EnumCellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for EnumCellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<&String> for EnumCellValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<bool> for EnumCellValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<f64> for EnumCellValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<f32> for EnumCellValue {
    /// Keeps the shortest `f32` decimal text, so `2.005f32` stays `2.005`.
    fn from(value: f32) -> Self {
        Self::Float(value.to_string().parse::<f64>().unwrap_or(f64::from(value)))
    }
}

macro_rules! impl_from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for EnumCellValue {
                fn from(value: $t) -> Self {
                    Self::Integer(i128::from(value))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, i128, u8, u16, u32, u64);

impl From<usize> for EnumCellValue {
    fn from(value: usize) -> Self {
        Self::Integer(value as i128)
    }
}

impl From<isize> for EnumCellValue {
    fn from(value: isize) -> Self {
        Self::Integer(value as i128)
    }
}

impl From<NaiveDateTime> for EnumCellValue {
    fn from(value: NaiveDateTime) -> Self {
        Self::Temporal(value)
    }
}

impl From<NaiveDate> for EnumCellValue {
    fn from(value: NaiveDate) -> Self {
        Self::Temporal(value.and_time(chrono::NaiveTime::MIN))
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for EnumCellValue {
    /// Zoned values keep their local wall-clock time.
    fn from(value: DateTime<Tz>) -> Self {
        Self::Temporal(value.naive_local())
    }
}

impl<V: Into<EnumCellValue>> From<Option<V>> for EnumCellValue {
    fn from(value: Option<V>) -> Self {
        value.map_or(Self::Absent, Into::into)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region HeaderSpecification

/// Ordered `(field key, display label)` projection of a table.
///
/// Field keys are unique; their order is the column order of every output.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecHeader {
    l_field_keys: Vec<String>,
    l_display_labels: Vec<String>,
}

impl SpecHeader {
    /// Build a header from ordered `(field key, display label)` pairs.
    pub fn new<I, K, L>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, L)>,
        K: Into<String>,
        L: Into<String>,
    {
        let (l_field_keys, l_display_labels): (Vec<String>, Vec<String>) = pairs
            .into_iter()
            .map(|(key, label)| (key.into(), label.into()))
            .unzip();
        validate_unique_columns(&l_field_keys).map_err(TableError::Config)?;

        Ok(Self {
            l_field_keys,
            l_display_labels,
        })
    }

    /// Build a header whose display labels equal the field keys.
    pub fn from_field_keys<I, K>(keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self::new(keys.into_iter().map(|key| {
            let key = key.into();
            (key.clone(), key)
        }))
    }

    pub fn field_keys(&self) -> &[String] {
        &self.l_field_keys
    }

    pub fn display_labels(&self) -> &[String] {
        &self.l_display_labels
    }

    pub fn len(&self) -> usize {
        self.l_field_keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.l_field_keys.is_empty()
    }

    /// Iterate `(field key, display label)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.l_field_keys
            .iter()
            .zip(self.l_display_labels.iter())
            .map(|(key, label)| (key.as_str(), label.as_str()))
    }

    /// Reject headers that cannot drive an export.
    pub fn validate_for_export(&self) -> Result<()> {
        if self.is_empty() {
            return Err(TableError::Config(
                "header must contain at least one column for export.".to_string(),
            ));
        }
        Ok(())
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region KeyedRow

/// Ordered key to text mapping produced by the delimited reader.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecKeyedRow {
    l_entries: Vec<(String, String)>,
}

impl SpecKeyedRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n_capacity: usize) -> Self {
        Self {
            l_entries: Vec::with_capacity(n_capacity),
        }
    }

    /// Set `key` to `value`, keeping the original position of an existing key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.l_entries.iter_mut().find(|(c_key, _)| *c_key == key) {
            Some(entry) => entry.1 = value,
            None => self.l_entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.l_entries
            .iter()
            .find(|(c_key, _)| c_key == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.l_entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.l_entries.iter().map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.l_entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.l_entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.l_entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<(String, String)> {
        self.l_entries
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SpecKeyedRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Self::new();
        for (key, value) in iter {
            row.insert(key, value);
        }
        row
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FinalizePolicy

/// Handling of flush/close failures that happen after a successful body write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumFinalizePolicy {
    /// Return the finalize failure to the caller.
    #[default]
    Strict,
    /// Log the finalize failure and report success.
    BestEffort,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, NaiveTime};

    use super::*;

    #[test]
    fn test_header_keeps_pair_order() {
        let header = SpecHeader::new([("b", "Bee"), ("a", "Ay")]).unwrap();
        assert_eq!(header.field_keys(), ["b", "a"]);
        assert_eq!(header.display_labels(), ["Bee", "Ay"]);
        assert_eq!(header.iter().collect::<Vec<_>>(), [("b", "Bee"), ("a", "Ay")]);
    }

    #[test]
    fn test_header_rejects_duplicate_keys() {
        let err = SpecHeader::new([("a", "A"), ("b", "B"), ("a", "A2")]).unwrap_err();
        assert!(matches!(err, TableError::Config(_)));
        assert!(err.to_string().contains("\"a\" x2"));
    }

    #[test]
    fn test_header_allows_duplicate_labels() {
        let header = SpecHeader::new([("a", "Same"), ("b", "Same")]).unwrap();
        assert_eq!(header.len(), 2);
    }

    #[test]
    fn test_empty_header_fails_export_validation() {
        let header = SpecHeader::from_field_keys(Vec::<String>::new()).unwrap();
        assert!(header.is_empty());
        assert!(matches!(
            header.validate_for_export(),
            Err(TableError::Config(_))
        ));
    }

    #[test]
    fn test_keyed_row_insert_replaces_in_place() {
        let mut row: SpecKeyedRow = [("a", "1"), ("b", "2")].into_iter().collect();
        row.insert("a", "9");
        assert_eq!(row.iter().collect::<Vec<_>>(), [("a", "9"), ("b", "2")]);
        assert_eq!(row.get("c"), None);
    }

    #[test]
    fn test_cell_value_conversions() {
        assert_eq!(EnumCellValue::from(Option::<i32>::None), EnumCellValue::Absent);
        assert_eq!(EnumCellValue::from(Some(7u8)), EnumCellValue::Integer(7));
        assert_eq!(EnumCellValue::from(2.005f32), EnumCellValue::Float(2.005));

        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(
            EnumCellValue::from(date),
            EnumCellValue::Temporal(date.and_time(NaiveTime::MIN))
        );

        let zoned = FixedOffset::east_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 1, 2, 3, 4, 5)
            .unwrap();
        assert_eq!(
            EnumCellValue::from(zoned),
            EnumCellValue::Temporal(
                NaiveDate::from_ymd_opt(2024, 1, 2)
                    .unwrap()
                    .and_hms_opt(3, 4, 5)
                    .unwrap()
            )
        );
    }
}
