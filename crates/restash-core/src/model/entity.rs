use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::entity_id::EntityId;

/// A schemaless entity payload.
///
/// The handler is generic over resource shape, so entities are raw JSON
/// values; the only field it interprets is `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entity(Value);

impl Entity {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The entity's `id` field, if present and scalar.
    pub fn id(&self) -> Option<EntityId> {
        match self.0.get("id") {
            Some(Value::Number(n)) => n.as_i64().map(EntityId::Num),
            Some(Value::String(s)) => Some(EntityId::Str(s.clone())),
            _ => None,
        }
    }

    /// Access an arbitrary field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for Entity {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<Entity> for Value {
    fn from(entity: Entity) -> Self {
        entity.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numeric_id_extracted() {
        let entity = Entity::from(json!({ "id": 5, "title": "x" }));
        assert_eq!(entity.id(), Some(EntityId::Num(5)));
    }

    #[test]
    fn string_id_extracted() {
        let entity = Entity::from(json!({ "id": "abc" }));
        assert_eq!(entity.id(), Some(EntityId::Str("abc".to_owned())));
    }

    #[test]
    fn missing_id_is_none() {
        let entity = Entity::from(json!({ "title": "no id" }));
        assert_eq!(entity.id(), None);
    }

    #[test]
    fn field_access() {
        let entity = Entity::from(json!({ "id": 1, "title": "hello" }));
        assert_eq!(entity.get("title"), Some(&json!("hello")));
        assert_eq!(entity.get("missing"), None);
    }
}
