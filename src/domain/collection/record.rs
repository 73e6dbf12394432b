//! Collection records as held by the hosted data store.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::foundation::{CollectionId, Timestamp, UserId};

/// Name of the collection every user is given on first sign-in.
pub const DEFAULT_COLLECTION_NAME: &str = "Mira's room";

/// A stored collection record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: CollectionId,

    /// Owner id. Blank when the store omitted the field.
    #[serde(default)]
    pub user: String,

    #[serde(default)]
    pub property: CollectionProperty,

    /// Raw store timestamp. Kept unparsed so that malformed values can be
    /// ordered as the epoch instead of failing the whole record.
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Collection {
    /// Display name carried in the property payload.
    pub fn name(&self) -> String {
        self.property.name()
    }

    /// Creation time for ordering. Missing or unparseable values map to
    /// the epoch.
    pub fn created_at_or_epoch(&self) -> Timestamp {
        self.created_at
            .as_deref()
            .and_then(Timestamp::parse)
            .unwrap_or_else(Timestamp::epoch)
    }

    /// False only when the record names a different owner.
    pub fn may_belong_to(&self, owner: &UserId) -> bool {
        let user = self.user.trim();
        user.is_empty() || user == owner.as_str()
    }
}

/// Semantic payload of a collection.
///
/// Depending on the schema version the store hands it back either as a
/// structured JSON object or as a JSON-encoded string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionProperty(Value);

impl CollectionProperty {
    /// Structured payload `{"name": <name>}`.
    pub fn named(name: impl Into<String>) -> Self {
        let mut map = Map::new();
        map.insert("name".to_string(), Value::String(name.into()));
        Self(Value::Object(map))
    }

    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Extracts the trimmed display name.
    ///
    /// Never fails: a malformed JSON string, a missing `name` or an
    /// unexpected payload shape all yield an empty string.
    pub fn name(&self) -> String {
        match &self.0 {
            Value::Object(map) => name_field(map),
            Value::String(encoded) => match serde_json::from_str::<Value>(encoded) {
                Ok(Value::Object(map)) => name_field(&map),
                _ => String::new(),
            },
            _ => String::new(),
        }
    }

    /// JSON text of the payload, the form `AWSJSON` fields expect.
    ///
    /// An already-encoded payload is passed through unchanged.
    pub fn to_json_string(&self) -> String {
        match &self.0 {
            Value::String(encoded) => encoded.clone(),
            other => other.to_string(),
        }
    }
}

fn name_field(map: &Map<String, Value>) -> String {
    match map.get("name") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(name)) => name.trim().to_string(),
        Some(other) => other.to_string().trim().to_string(),
    }
}

/// Payload for creating a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCollection {
    pub user: UserId,
    pub property: CollectionProperty,
}

impl NewCollection {
    /// The default collection for `user`.
    pub fn default_for(user: UserId, default_name: &str) -> Self {
        Self {
            user,
            property: CollectionProperty::named(default_name),
        }
    }
}
