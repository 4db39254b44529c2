//! # Form Model
//!
//! The key/value model shared between the enclosing filter form and its
//! sub-components.

use crate::entities::EntityId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Form keys owned by the live-patching filter fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FieldKey {
    /// Selected client (LivePatchingSystem template).
    #[serde(rename = "clientId")]
    ClientId,
    /// Selected product (LivePatchingProduct template).
    #[serde(rename = "productId")]
    ProductId,
    /// Selected kernel.
    #[serde(rename = "kernelId")]
    KernelId,
}

impl FieldKey {
    /// All recognized keys.
    pub const ALL: [FieldKey; 3] = [Self::ClientId, Self::ProductId, Self::KernelId];

    /// Model key as used by the enclosing form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ClientId => "clientId",
            Self::ProductId => "productId",
            Self::KernelId => "kernelId",
        }
    }

    /// Look up a recognized key by its model name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == name)
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interpret a model value as a nullable entity id.
///
/// Select inputs hand back either numbers or decimal strings; `null`, empty
/// strings and anything else read as "no selection".
#[must_use]
pub fn parse_id(value: &Value) -> Option<EntityId> {
    match value {
        Value::Number(n) => n.as_u64().map(EntityId),
        Value::String(s) => s.trim().parse::<u64>().ok().map(EntityId),
        _ => None,
    }
}

/// Encode a nullable entity id as a model value.
#[must_use]
pub fn id_value(id: Option<EntityId>) -> Value {
    match id {
        Some(id) => Value::from(id.get()),
        None => Value::Null,
    }
}

/// Open key/value form model.
///
/// Keys not listed in [`FieldKey`] belong to the enclosing form and are
/// carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormModel {
    values: BTreeMap<String, Value>,
}

impl FormModel {
    /// Create an empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value for any key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Set a raw value, returning the previous one.
    pub fn set(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.values.insert(key.into(), value)
    }

    /// Read a recognized key as a nullable id.
    #[must_use]
    pub fn id(&self, key: FieldKey) -> Option<EntityId> {
        self.values.get(key.as_str()).and_then(parse_id)
    }

    /// Write a recognized key as a nullable id.
    pub fn set_id(&mut self, key: FieldKey, id: Option<EntityId>) -> Option<Value> {
        self.set(key.as_str(), id_value(id))
    }

    /// Iterate over all keys and values.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// Number of keys present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no key is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, Value)> for FormModel {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
