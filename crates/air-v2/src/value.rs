//! Parsed field values.

use crate::entity::Entity;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// Value of one field of an [`Entity`], typed by its [`FieldKind`](crate::schema::FieldKind).
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FieldValue {
    /// `null`
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// String
    Str(String),
    /// UTC timestamp
    DateTime(DateTime<Utc>),
    /// Free-form JSON
    Json(Value),
    /// Object with a fixed key set
    Record(Map<String, Value>),
    /// List of values
    List(Vec<FieldValue>),
    /// Nested entity; for foreign keys possibly an unresolved stub
    Model(Box<Entity>),
    /// Lazy field that has not been loaded yet
    Unloaded,
}

impl FieldValue {
    /// Returns true for `null`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// String content.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }

    /// Integer content.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Floating point content.
    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// Boolean content.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Timestamp content.
    #[must_use]
    pub const fn as_datetime(&self) -> Option<&DateTime<Utc>> {
        match self {
            Self::DateTime(value) => Some(value),
            _ => None,
        }
    }

    /// Free-form JSON content.
    #[must_use]
    pub const fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Record content.
    #[must_use]
    pub const fn as_record(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Record(value) => Some(value),
            _ => None,
        }
    }

    /// List content.
    #[must_use]
    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Nested entity.
    #[must_use]
    pub fn as_model(&self) -> Option<&Entity> {
        match self {
            Self::Model(entity) => Some(entity),
            _ => None,
        }
    }

    /// Mutable nested entity.
    pub fn as_model_mut(&mut self) -> Option<&mut Entity> {
        match self {
            Self::Model(entity) => Some(entity),
            _ => None,
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}
