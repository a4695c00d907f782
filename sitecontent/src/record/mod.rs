use crate::assets::ImageRef;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use url::Url;

/// Untyped key/value data read from one source file, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// Source identifier, the file path relative to the site root.
    pub source: String,
    /// Location of the file, used to resolve relative image references.
    pub path: PathBuf,
    /// Entry id within its collection.
    pub id: String,
    pub fields: serde_json::Map<String, serde_json::Value>,
    /// Markdown body following the front matter.
    pub body: Option<String>,
}

impl RawRecord {
    /// A record with no body whose id and path are its source identifier.
    pub fn new(source: impl Into<String>, fields: serde_json::Map<String, serde_json::Value>) -> Self {
        let source = source.into();
        RawRecord {
            path: PathBuf::from(&source),
            id: source.clone(),
            source,
            fields,
            body: None,
        }
    }

    /// Build from a JSON value; anything but an object yields no fields.
    pub fn from_value(source: impl Into<String>, value: serde_json::Value) -> Self {
        let fields = match value {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        Self::new(source, fields)
    }
}

/// A field value after coercion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TypedValue {
    String(String),
    Boolean(bool),
    Date(DateTime<Utc>),
    Url(Url),
    Image(ImageRef),
}

impl TypedValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TypedValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateTime<Utc>> {
        match self {
            TypedValue::Date(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_url(&self) -> Option<&Url> {
        match self {
            TypedValue::Url(u) => Some(u),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageRef> {
        match self {
            TypedValue::Image(i) => Some(i),
            _ => None,
        }
    }
}

/// A record that passed its collection schema. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedRecord {
    id: String,
    source: String,
    data: BTreeMap<String, TypedValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<String>,
}

impl ValidatedRecord {
    pub(crate) fn new(
        id: String,
        source: String,
        data: BTreeMap<String, TypedValue>,
        body: Option<String>,
    ) -> Self {
        ValidatedRecord {
            id,
            source,
            data,
            body,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn data(&self) -> &BTreeMap<String, TypedValue> {
        &self.data
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn get(&self, field: &str) -> Option<&TypedValue> {
        self.data.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.data.contains_key(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(TypedValue::as_str)
    }

    pub fn get_bool(&self, field: &str) -> Option<bool> {
        self.get(field).and_then(TypedValue::as_bool)
    }

    pub fn get_date(&self, field: &str) -> Option<&DateTime<Utc>> {
        self.get(field).and_then(TypedValue::as_date)
    }

    pub fn get_url(&self, field: &str) -> Option<&Url> {
        self.get(field).and_then(TypedValue::as_url)
    }

    pub fn get_image(&self, field: &str) -> Option<&ImageRef> {
        self.get(field).and_then(TypedValue::as_image)
    }

    /// Deserialize the validated fields into a caller-defined struct.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        let value = serde_json::to_value(&self.data)?;
        Ok(serde_json::from_value(value)?)
    }
}
