//! Request payload encoding.
//!
//! Request structs refer to other objects through [`Reference`], which serializes as the
//! bare primary key. Datetimes serialize through `chrono` as UTC ISO-8601 with a `Z`
//! suffix and UUIDs as hyphenated strings.

use crate::entity::Entity;
use crate::model::AirModel;
use crate::Result;
use air_core::Error;
use serde::ser::Error as _;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use uuid::Uuid;

/// A reference to another object in a request payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// A raw primary key
    Id(String),
    /// A model instance; its primary key may have been cleared by a delete
    Model {
        /// Model name, used in errors
        model: &'static str,
        /// Primary key at the time the reference was taken
        pk: Option<String>,
    },
}

impl Reference {
    /// Primary key carried by the reference.
    #[must_use]
    pub fn pk(&self) -> Option<&str> {
        match self {
            Self::Id(id) => Some(id),
            Self::Model { pk, .. } => pk.as_deref(),
        }
    }

    /// Primary key carried by the reference, for use in URLs and query strings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the referenced model has no primary key.
    pub fn require_pk(&self) -> Result<&str> {
        match self {
            Self::Id(id) => Ok(id),
            Self::Model { pk: Some(pk), .. } => Ok(pk),
            Self::Model { model, pk: None } => Err(Error::InvalidArgument(format!(
                "The `{model}` provided is not JSON serializable: primary key is None"
            ))),
        }
    }
}

impl Serialize for Reference {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Id(id) => serializer.serialize_str(id),
            Self::Model { pk: Some(pk), .. } => serializer.serialize_str(pk),
            Self::Model { model, pk: None } => Err(S::Error::custom(format!(
                "The `{model}` provided is not JSON serializable: primary key is None"
            ))),
        }
    }
}

impl From<&str> for Reference {
    fn from(id: &str) -> Self {
        Self::Id(id.to_string())
    }
}

impl From<String> for Reference {
    fn from(id: String) -> Self {
        Self::Id(id)
    }
}

impl From<Uuid> for Reference {
    fn from(id: Uuid) -> Self {
        Self::Id(id.to_string())
    }
}

impl From<&Entity> for Reference {
    fn from(entity: &Entity) -> Self {
        Self::Model {
            model: entity.schema().name,
            pk: entity.pk(),
        }
    }
}

impl<T: AirModel> From<&T> for Reference {
    fn from(model: &T) -> Self {
        Self::from(model.entity())
    }
}

/// Serialize a request struct into a JSON object.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if a referenced model has no primary key or the value
/// does not serialize to an object.
pub fn to_payload<T: Serialize + ?Sized>(value: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(value).map_err(|e| Error::InvalidArgument(e.to_string()))? {
        Value::Object(map) => Ok(map),
        other => Err(Error::InvalidArgument(format!(
            "request payload must be a JSON object, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[derive(Serialize)]
    struct Assignment {
        simulation_node: Reference,
        user_data: Option<Reference>,
        #[serde(skip_serializing_if = "Option::is_none")]
        meta_data: Option<Reference>,
        created: chrono::DateTime<Utc>,
    }

    #[test]
    fn references_serialize_as_ids() {
        let node = Uuid::parse_str("3dadd54d-583c-432e-9383-a2b0b1d7f551").unwrap();
        let payload = to_payload(&Assignment {
            simulation_node: node.into(),
            user_data: None,
            meta_data: None,
            created: Utc.with_ymd_and_hms(2030, 12, 12, 22, 5, 3).unwrap(),
        })
        .unwrap();
        assert_eq!(
            Value::Object(payload),
            json!({
                "simulation_node": "3dadd54d-583c-432e-9383-a2b0b1d7f551",
                "user_data": null,
                "created": "2030-12-12T22:05:03Z"
            })
        );
    }

    #[test]
    fn deleted_models_are_not_serializable() {
        let reference = Reference::Model {
            model: "Simulation",
            pk: None,
        };
        let err = to_payload(&Assignment {
            simulation_node: reference,
            user_data: None,
            meta_data: None,
            created: Utc::now(),
        })
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "The `Simulation` provided is not JSON serializable: primary key is None"
        );
    }

    #[test]
    fn payload_must_be_an_object() {
        assert!(matches!(
            to_payload(&vec![1, 2]),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(Reference::from("abc").pk(), Some("abc"));
    }
}
