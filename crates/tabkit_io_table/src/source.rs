//! Row access capability shared by keyed rows, records and DataFrame rows.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use crate::spec::{EnumCellValue, SpecKeyedRow};

/// Produce the cell value stored under a field key.
///
/// Implementations never fail: anything unreadable is [`EnumCellValue::Absent`].
pub trait CellSource {
    fn cell_value(&self, field_key: &str) -> EnumCellValue;
}

impl<T: CellSource + ?Sized> CellSource for &T {
    fn cell_value(&self, field_key: &str) -> EnumCellValue {
        (**self).cell_value(field_key)
    }
}

impl<V, S> CellSource for HashMap<String, V, S>
where
    V: Clone + Into<EnumCellValue>,
    S: BuildHasher,
{
    fn cell_value(&self, field_key: &str) -> EnumCellValue {
        self.get(field_key)
            .map_or(EnumCellValue::Absent, |val| val.clone().into())
    }
}

impl<V> CellSource for BTreeMap<String, V>
where
    V: Clone + Into<EnumCellValue>,
{
    fn cell_value(&self, field_key: &str) -> EnumCellValue {
        self.get(field_key)
            .map_or(EnumCellValue::Absent, |val| val.clone().into())
    }
}

impl CellSource for SpecKeyedRow {
    fn cell_value(&self, field_key: &str) -> EnumCellValue {
        self.get(field_key)
            .map_or(EnumCellValue::Absent, |val| EnumCellValue::Text(val.to_string()))
    }
}
