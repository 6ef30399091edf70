use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A tweet as the API or a dump file delivered it.
///
/// No schema is enforced, fields are read by convention.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tweet(Map<String, Value>);

impl Tweet {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// `id_str` when present, otherwise the numeric `id`.
    pub fn id(&self) -> Option<String> {
        match (self.0.get("id_str"), self.0.get("id")) {
            (Some(Value::String(id)), _) => Some(id.clone()),
            (_, Some(Value::Number(id))) => Some(id.to_string()),
            (_, Some(Value::String(id))) => Some(id.clone()),
            _ => None,
        }
    }

    /// `full_text` for extended tweets, `text` otherwise.
    pub fn text(&self) -> Option<&str> {
        self.0
            .get("full_text")
            .or_else(|| self.0.get("text"))
            .and_then(Value::as_str)
    }

    pub fn lang(&self) -> Option<&str> {
        self.0.get("lang").and_then(Value::as_str)
    }

    pub fn screen_name(&self) -> Option<&str> {
        self.0
            .get("user")
            .and_then(|user| user.get("screen_name"))
            .and_then(Value::as_str)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Tweet {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

impl TryFrom<Value> for Tweet {
    type Error = serde_json::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        serde_json::from_value(value)
    }
}
