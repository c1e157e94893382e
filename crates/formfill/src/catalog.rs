//! Validated pairing of a keyfile with the values to fill

use crate::keyfile::{Keyfile, KeyfileEntry};
use crate::{FillError, Result};
use form_values::{FieldType, FieldValue, FieldValues};

/// Keyfile and field values, checked against each other
///
/// Every value key is guaranteed to be a readable name of the keyfile.
#[derive(Debug)]
pub struct FieldCatalog<'a> {
    keyfile: Keyfile,
    values: &'a FieldValues,
}

impl<'a> FieldCatalog<'a> {
    /// Fails with [`FillError::UnknownField`] on the first value whose
    /// name the keyfile does not define
    pub fn new(keyfile: Keyfile, values: &'a FieldValues) -> Result<Self> {
        if let Some(unknown) = values.keys().find(|name| !keyfile.contains_readable(name)) {
            return Err(FillError::UnknownField(unknown.clone()));
        }
        Ok(Self { keyfile, values })
    }

    pub fn keyfile(&self) -> &Keyfile {
        &self.keyfile
    }

    pub fn values(&self) -> &FieldValues {
        self.values
    }

    /// Keyfile entry of an internal field name
    pub fn resolve(&self, internal_id: &str) -> Option<&KeyfileEntry> {
        self.keyfile.lookup(internal_id)
    }

    /// Value for a readable name
    pub fn value(&self, readable: &str) -> Option<&FieldValue> {
        self.values.get(readable)
    }

    /// Keyfile type of an internal field name
    pub fn field_type(&self, internal_id: &str) -> Option<FieldType> {
        self.resolve(internal_id).map(|entry| entry.field_type)
    }
}
