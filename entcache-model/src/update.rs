use entcache_types::EntityKey;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{ModelError, ModelResult};

/// A partial update: the entity's key and the fields that change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Update {
    pub id: EntityKey,
    pub changes: Map<String, Value>,
}

impl Update {
    pub fn new(id: impl Into<EntityKey>, changes: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            changes,
        }
    }

    /// Reads `{ "id": .., "changes": {..} }`.
    pub fn from_value(value: Value) -> ModelResult<Self> {
        if !value.is_object() {
            return Err(ModelError::NotAnObject(value.to_string()));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Reconciles this update with what the server sent back.
    ///
    /// A non-empty object body is merged over `changes` with server fields
    /// winning. Anything else means the server made no changes of its own,
    /// and the response is flagged `unchanged`.
    pub fn into_response(self, server_body: Option<Value>) -> UpdateResponse {
        match server_body {
            Some(Value::Object(body)) if !body.is_empty() => {
                let mut changes = self.changes;
                changes.extend(body);
                UpdateResponse {
                    id: self.id,
                    changes,
                    unchanged: false,
                }
            }
            _ => UpdateResponse {
                id: self.id,
                changes: self.changes,
                unchanged: true,
            },
        }
    }
}

/// Result of a saved update, as carried by `SAVE_UPDATE_ONE` success actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateResponse {
    pub id: EntityKey,
    pub changes: Map<String, Value>,
    /// True when the server returned no body; the reducer can skip diffing.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unchanged: bool,
}
