// ── Opaque entity records ──
//
// The backend owns every entity's schema. The client only relies on
// the `id` field: present means the record exists server-side, absent
// (or null) means it is a creation draft.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the identifier field shared by every resource.
pub const ID_FIELD: &str = "id";

/// Server-assigned record identifier.
///
/// Django-style backends use integers; anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl RecordId {
    /// Parse user input: all-digit strings become integer ids.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        trimmed
            .parse::<i64>()
            .map_or_else(|_| Self::Text(trimmed.to_owned()), Self::Int)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(Self::Int),
            Value::String(s) if !s.is_empty() => Some(Self::Text(s.clone())),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Self::Int(n) => Value::from(*n),
            Self::Text(s) => Value::from(s.as_str()),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

/// A single entity record: field name -> JSON value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// The record's identifier, if it has one.
    pub fn id(&self) -> Option<RecordId> {
        self.0.get(ID_FIELD).and_then(RecordId::from_value)
    }

    /// `true` if the record has not been persisted yet.
    pub fn is_draft(&self) -> bool {
        self.id().is_none()
    }

    /// Set (or replace) the identifier.
    pub fn set_id(&mut self, id: &RecordId) {
        self.0.insert(ID_FIELD.into(), id.to_value());
    }

    /// A copy of this record without its identifier, as sent on create.
    pub fn without_id(&self) -> Self {
        let mut fields = self.0.clone();
        fields.remove(ID_FIELD);
        Self(fields)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    /// Builder-style field setter.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    /// Field names in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Render one field for display: strings unquoted, null as empty.
    pub fn display_field(&self, field: &str) -> String {
        match self.0.get(field) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Record {
    type Error = Value;

    /// Only JSON objects are records; the rejected value is handed back.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(other),
        }
    }
}
