//! Accessor registry for uniform record types.
//!
//! Each record type declares its readable fields once, as a map from field key
//! to extraction function. Extraction never fails: an unknown key or a failing
//! accessor yields [`EnumCellValue::Absent`] and a debug log line.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt::{self, Display};
use std::marker::PhantomData;

use crate::error::Result;
use crate::source::CellSource;
use crate::spec::{EnumCellValue, SpecHeader};
use crate::util::derive_field_key_from_accessor;

type FieldGetter<T> = Box<dyn Fn(&T) -> std::result::Result<EnumCellValue, String> + Send + Sync>;

/// Record types with a statically declared accessor registry.
pub trait Record: Sized {
    fn field_accessors() -> SpecFieldAccessors<Self>;
}

/// Field key to extraction function registry for records of type `T`.
pub struct SpecFieldAccessors<T> {
    l_field_keys: Vec<String>,
    dict_getters: HashMap<String, FieldGetter<T>>,
}

impl<T> Default for SpecFieldAccessors<T> {
    fn default() -> Self {
        Self {
            l_field_keys: Vec::new(),
            dict_getters: HashMap::new(),
        }
    }
}

impl<T> fmt::Debug for SpecFieldAccessors<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecFieldAccessors")
            .field("field_keys", &self.l_field_keys)
            .finish()
    }
}

impl<T> SpecFieldAccessors<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an infallible accessor under `field_key`.
    pub fn with_field<V, F>(self, field_key: impl Into<String>, getter: F) -> Self
    where
        V: Into<EnumCellValue>,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        self.insert(
            field_key.into(),
            Box::new(move |record: &T| Ok(getter(record).into())),
        )
    }

    /// Register an accessor whose failures are recovered as empty cells.
    pub fn with_fallible_field<V, E, F>(self, field_key: impl Into<String>, getter: F) -> Self
    where
        V: Into<EnumCellValue>,
        E: Display,
        F: Fn(&T) -> std::result::Result<V, E> + Send + Sync + 'static,
    {
        self.insert(
            field_key.into(),
            Box::new(move |record: &T| {
                getter(record)
                    .map(Into::into)
                    .map_err(|err| err.to_string())
            }),
        )
    }

    /// Register by accessor name: `getUserName` serves field key `userName`.
    pub fn with_accessor<V, F>(self, accessor_name: &str, getter: F) -> Self
    where
        V: Into<EnumCellValue>,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        self.with_field(derive_field_key_from_accessor(accessor_name), getter)
    }

    fn insert(mut self, field_key: String, getter: FieldGetter<T>) -> Self {
        if !self.dict_getters.contains_key(&field_key) {
            self.l_field_keys.push(field_key.clone());
        }
        self.dict_getters.insert(field_key, getter);
        self
    }

    /// Registered field keys in registration order.
    pub fn field_keys(&self) -> &[String] {
        &self.l_field_keys
    }

    pub fn contains(&self, field_key: &str) -> bool {
        self.dict_getters.contains_key(field_key)
    }

    /// Header listing every registered field, labelled by its key.
    pub fn derive_header(&self) -> Result<SpecHeader> {
        SpecHeader::from_field_keys(self.l_field_keys.iter().cloned())
    }

    /// Read one field of `record`.
    pub fn extract(&self, record: &T, field_key: &str) -> EnumCellValue {
        let Some(getter) = self.dict_getters.get(field_key) else {
            log::debug!("no accessor registered for field {field_key:?}; cell left empty");
            return EnumCellValue::Absent;
        };
        match getter(record) {
            Ok(value) => value,
            Err(err) => {
                log::debug!("accessor for field {field_key:?} failed: {err}; cell left empty");
                EnumCellValue::Absent
            }
        }
    }

    /// View `record` as a [`CellSource`] backed by this registry.
    pub fn bind<B: Borrow<T>>(&self, record: B) -> SpecRecordRow<'_, T, B> {
        SpecRecordRow {
            accessors: self,
            record,
            _marker: PhantomData,
        }
    }
}

/// One record paired with the registry that reads it.
pub struct SpecRecordRow<'a, T, B> {
    accessors: &'a SpecFieldAccessors<T>,
    record: B,
    _marker: PhantomData<fn(&T)>,
}

impl<T, B: Borrow<T>> CellSource for SpecRecordRow<'_, T, B> {
    fn cell_value(&self, field_key: &str) -> EnumCellValue {
        self.accessors.extract(self.record.borrow(), field_key)
    }
}
