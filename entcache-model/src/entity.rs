use entcache_types::EntityKey;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{ModelError, ModelResult};

/// A cached entity: its key plus arbitrary JSON fields.
///
/// Serializes flat, so `{"id": 42, "name": "Francis"}` round-trips as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityKey,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Entity {
    /// Creates an entity with no fields besides its key.
    pub fn new(id: impl Into<EntityKey>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Builder-style field setter.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Reads an entity from a JSON object with an `id` member.
    pub fn from_value(value: Value) -> ModelResult<Self> {
        let Value::Object(mut fields) = value else {
            return Err(ModelError::NotAnObject(value.to_string()));
        };
        let id = fields.remove("id").ok_or(ModelError::MissingKey)?;
        Ok(Self {
            id: EntityKey::from_value(&id)?,
            fields,
        })
    }

    /// Returns the entity as a single JSON object, key included.
    pub fn to_value(&self) -> Value {
        let mut obj = self.fields.clone();
        obj.insert("id".into(), self.id.to_value());
        Value::Object(obj)
    }

}
