//! Dynamic v1 entities.
//!
//! An [`AirModel`] is an ordered bag of fields decoded from a JSON object. Fields whose
//! key names a related resource (for the model's [`ModelKind`]) are stored as
//! [`LazyLoaded`] references or [`LazyLoadedList`]s and fetched on first access.

use crate::endpoint::ResourceApi;
use crate::kind::ModelKind;
use crate::lazy::{LazyLoaded, LazyLoadedList};
use crate::Result;
use air_core::util::{format_iso_datetime, id_from_url, parse_iso_datetime};
use air_core::{validate_response, Error, ExpectedBody, QueryParams};
use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use tracing::debug;

/// Value held by one field of an [`AirModel`].
#[derive(Debug, Clone)]
pub enum FieldValue {
    /// Plain JSON data
    Json(Value),
    /// ISO-8601 string decoded as a UTC timestamp
    DateTime(DateTime<Utc>),
    /// Related entity that has not been fetched yet
    Reference(LazyLoaded),
    /// Related entity that has been fetched
    Model(Box<AirModel>),
    /// Collection of related entities
    List(LazyLoadedList),
}

impl FieldValue {
    /// JSON form of the value. Related entities are rendered as their identifiers and
    /// collections are never resolved.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Json(value) => value.clone(),
            Self::DateTime(value) => Value::String(format_iso_datetime(value)),
            Self::Reference(reference) => Value::String(reference.id().to_string()),
            Self::Model(model) => model.raw_id().map_or(Value::Null, Value::String),
            Self::List(list) => Value::Array(list.ids().into_iter().map(Value::String).collect()),
        }
    }

    /// String content of a plain JSON string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Json(value) => value.as_str(),
            _ => None,
        }
    }

    /// Plain JSON data.
    #[must_use]
    pub const fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Decoded timestamp.
    #[must_use]
    pub const fn as_datetime(&self) -> Option<&DateTime<Utc>> {
        match self {
            Self::DateTime(value) => Some(value),
            _ => None,
        }
    }

    /// Unresolved reference.
    #[must_use]
    pub const fn as_reference(&self) -> Option<&LazyLoaded> {
        match self {
            Self::Reference(reference) => Some(reference),
            _ => None,
        }
    }

    /// Resolved related entity.
    #[must_use]
    pub fn as_model(&self) -> Option<&AirModel> {
        match self {
            Self::Model(model) => Some(model),
            _ => None,
        }
    }

    /// Collection of related entities.
    #[must_use]
    pub const fn as_list(&self) -> Option<&LazyLoadedList> {
        match self {
            Self::List(list) => Some(list),
            _ => None,
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Json(Value::String(value.to_string()))
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Json(Value::String(value))
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Json(Value::Bool(value))
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Json(Value::from(value))
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

impl From<LazyLoaded> for FieldValue {
    fn from(value: LazyLoaded) -> Self {
        Self::Reference(value)
    }
}

impl From<AirModel> for FieldValue {
    fn from(value: AirModel) -> Self {
        Self::Model(Box::new(value))
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn scalar_id(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Identifier of one element of a relational list.
fn item_id(item: &Value) -> String {
    match item {
        Value::Object(map) => map.get("id").map(scalar_id).unwrap_or_default(),
        Value::String(text) => id_from_url(text).unwrap_or(text).to_string(),
        other => scalar_id(other),
    }
}

/// Identifier of a single relational value.
fn reference_id(value: &Value) -> String {
    match value {
        Value::String(text) if text.starts_with("http") => {
            id_from_url(text).unwrap_or(text).to_string()
        }
        Value::Object(map) => map.get("id").map(scalar_id).unwrap_or_default(),
        other => scalar_id(other),
    }
}

/// A v1 entity bound to the endpoint it was loaded through.
#[derive(Debug, Clone)]
pub struct AirModel {
    api: ResourceApi,
    fields: Vec<(String, FieldValue)>,
    deleted: bool,
}

impl AirModel {
    pub(crate) fn from_payload(api: ResourceApi, payload: Map<String, Value>) -> Self {
        let mut model = Self {
            api,
            fields: Vec::new(),
            deleted: false,
        };
        model.load(payload);
        model
    }

    /// Variant of this entity.
    #[must_use]
    pub const fn kind(&self) -> ModelKind {
        self.api.kind()
    }

    /// Endpoint the entity was loaded through.
    #[must_use]
    pub const fn endpoint(&self) -> &ResourceApi {
        &self.api
    }

    /// Returns true once the entity has been deleted.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Merge a JSON payload into the entity, binding relational keys to references.
    pub fn load(&mut self, payload: Map<String, Value>) {
        for (key, value) in payload {
            self.load_field(key, FieldValue::Json(value));
        }
    }

    fn load_field(&mut self, key: String, value: FieldValue) {
        let value = self.bind(&key, value);
        self.store_field(key, value);
    }

    fn bind(&self, key: &str, value: FieldValue) -> FieldValue {
        let raw = match value {
            FieldValue::Json(raw) => raw,
            other => return other,
        };
        if let Some(target) = self.kind().reference_target(key) {
            if is_truthy(&raw) {
                return match raw {
                    Value::Array(items) => FieldValue::List(LazyLoadedList::new(
                        items
                            .iter()
                            .map(|item| LazyLoaded::new(item_id(item), target))
                            .collect(),
                        self.api.client().clone(),
                    )),
                    other => FieldValue::Reference(LazyLoaded::new(reference_id(&other), target)),
                };
            }
        }
        if let Value::String(text) = &raw {
            if let Some(timestamp) = parse_iso_datetime(text) {
                return FieldValue::DateTime(timestamp);
            }
        }
        FieldValue::Json(raw)
    }

    fn store_field(&mut self, key: String, value: FieldValue) {
        match self.fields.iter_mut().find(|(name, _)| *name == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key, value)),
        }
    }

    fn position(&self, key: &str) -> Result<usize> {
        self.fields
            .iter()
            .position(|(name, _)| name == key)
            .ok_or_else(|| {
                Error::ModelAttribute(format!(
                    "'{}' object has no attribute '{key}'",
                    self.kind()
                ))
            })
    }

    fn ensure_live(&self) -> Result<()> {
        if self.deleted {
            Err(Error::object_deleted(self.kind().name()))
        } else {
            Ok(())
        }
    }

    pub(crate) fn ensure_kind(&self, kinds: &[ModelKind], operation: &str) -> Result<()> {
        if kinds.contains(&self.kind()) {
            Ok(())
        } else {
            Err(Error::NotSupported(format!(
                "{} does not support {operation}",
                self.kind()
            )))
        }
    }

    /// Identifier without liveness checks; used for serialization.
    pub(crate) fn raw_id(&self) -> Option<String> {
        self.fields
            .iter()
            .find(|(name, _)| name == "id")
            .and_then(|(_, value)| match value {
                FieldValue::Json(Value::Null) => None,
                FieldValue::Json(id) => Some(scalar_id(id)),
                _ => None,
            })
    }

    /// Primary key.
    ///
    /// # Errors
    ///
    /// Fails if the entity was deleted or has no `id`.
    pub fn id(&self) -> Result<String> {
        self.ensure_live()?;
        self.raw_id().ok_or_else(|| {
            Error::ModelAttribute(format!("'{}' object has no attribute 'id'", self.kind()))
        })
    }

    /// Returns true if the entity carries a field named `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.fields.iter().any(|(name, _)| name == key)
    }

    /// Field names, in the order they were first loaded.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Read a field without resolving references.
    ///
    /// # Errors
    ///
    /// Fails if the entity was deleted or has no such field.
    pub fn peek(&self, key: &str) -> Result<&FieldValue> {
        self.ensure_live()?;
        let index = self.position(key)?;
        Ok(&self.fields[index].1)
    }

    /// Read a field, fetching and caching it first if it is an unresolved reference.
    ///
    /// # Errors
    ///
    /// Fails if the entity was deleted, has no such field, or the fetch fails.
    pub async fn get(&mut self, key: &str) -> Result<&FieldValue> {
        self.ensure_live()?;
        let index = self.position(key)?;
        let pending = match &self.fields[index].1 {
            FieldValue::Reference(reference) => Some(reference.clone()),
            _ => None,
        };
        if let Some(reference) = pending {
            debug!(kind = %self.kind(), field = key, "resolving reference");
            let model = reference.resolve(self.api.client()).await?;
            self.fields[index].1 = FieldValue::Model(Box::new(model));
        }
        Ok(&self.fields[index].1)
    }

    /// Mutable access to a relational collection.
    ///
    /// # Errors
    ///
    /// Fails if the entity was deleted or the field is not a collection.
    pub fn list_mut(&mut self, key: &str) -> Result<&mut LazyLoadedList> {
        self.ensure_live()?;
        let index = self.position(key)?;
        let kind = self.kind();
        match &mut self.fields[index].1 {
            FieldValue::List(list) => Ok(list),
            _ => Err(Error::ModelAttribute(format!(
                "'{kind}' field '{key}' is not a list"
            ))),
        }
    }

    /// Assign a field.
    ///
    /// When the entity is persisted, its variant is updatable and `key` is public (not
    /// `_`-prefixed), a changed value is first written with a single-field `PATCH`.
    /// Unchanged values and private fields never reach the API.
    ///
    /// # Errors
    ///
    /// Fails if the entity was deleted or the partial update is rejected; the local
    /// value is left untouched in that case.
    pub async fn set(&mut self, key: &str, value: impl Into<FieldValue>) -> Result<()> {
        self.ensure_live()?;
        let value = self.bind(key, value.into());
        if self.kind().updatable() && !key.starts_with('_') {
            if let Some(id) = self.raw_id() {
                let current = self
                    .fields
                    .iter()
                    .find(|(name, _)| name == key)
                    .map_or(Value::Null, |(_, current)| current.to_json());
                let new = value.to_json();
                if current != new {
                    self.patch(&id, key, new).await?;
                }
            }
        }
        self.store_field(key.to_string(), value);
        Ok(())
    }

    async fn patch(&self, id: &str, key: &str, value: Value) -> Result<()> {
        let url = format!("{}{id}/", self.api.url());
        let mut body = Map::new();
        body.insert(key.to_string(), value);
        let res = self.api.client().patch(&url, Value::Object(body)).await?;
        validate_response(&res, 200, ExpectedBody::Object)
    }

    fn payload(&self, ignored: &[&str]) -> Map<String, Value> {
        self.fields
            .iter()
            .filter(|(name, _)| !name.starts_with('_') && !ignored.contains(&name.as_str()))
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect()
    }

    /// Refresh from the API, merge `fields` and replace the entity with a full `PUT`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSupported`] for variants that cannot be updated.
    pub async fn update(&mut self, fields: Map<String, Value>) -> Result<()> {
        self.ensure_live()?;
        if !self.kind().updatable() {
            return Err(Error::NotSupported(format!(
                "{} does not support updates",
                self.kind()
            )));
        }
        let id = self.id()?;
        self.refresh().await?;
        self.load(fields);

        let payload = self.payload(self.kind().ignored_update_fields());
        let url = format!("{}{id}/", self.api.url());
        let res = self.api.client().put(&url, Value::Object(payload)).await?;
        validate_response(&res, 200, ExpectedBody::Object)
    }

    /// Delete the entity. Every later field access fails.
    ///
    /// Simulations are destroyed through their control endpoint instead.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSupported`] for variants that cannot be deleted and
    /// [`Error::ObjectDeleted`] when called twice.
    pub async fn delete(&mut self) -> Result<()> {
        self.ensure_live()?;
        if self.kind() == ModelKind::Simulation {
            self.destroy().await?;
            self.deleted = true;
            return Ok(());
        }
        if !self.kind().deletable() {
            return Err(Error::NotSupported(format!(
                "{} does not support deletes",
                self.kind()
            )));
        }
        let url = format!("{}{}/", self.api.url(), self.id()?);
        let res = self.api.client().delete(&url).await?;
        validate_response(&res, 204, ExpectedBody::Ignore)?;
        self.deleted = true;
        Ok(())
    }

    /// Re-fetch the entity by primary key and reload every field.
    ///
    /// # Errors
    ///
    /// Fails if the entity was deleted, has no `id`, or the fetch fails.
    pub async fn refresh(&mut self) -> Result<()> {
        let id = self.id()?;
        let fresh = self.api.get(&id, &QueryParams::new()).await?;
        for (key, value) in fresh.fields {
            self.load_field(key, value);
        }
        Ok(())
    }

    /// JSON string of the public fields. Related entities become identifiers and
    /// collections are serialized without being resolved.
    ///
    /// # Errors
    ///
    /// Fails if the entity was deleted.
    pub fn json(&self) -> Result<String> {
        self.ensure_live()?;
        Ok(serde_json::to_string(self)?)
    }
}

impl Serialize for AirModel {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let public = self.fields.iter().filter(|(name, _)| !name.starts_with('_'));
        let mut map = serializer.serialize_map(None)?;
        for (name, value) in public {
            map.serialize_entry(name, &value.to_json())?;
        }
        map.end()
    }
}

impl fmt::Display for AirModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self.raw_id().unwrap_or_default();
        if self.deleted {
            write!(f, "<Deleted Object (<{} {id}>)>", self.kind())
        } else {
            write!(f, "<{} {id}>", self.kind())
        }
    }
}

impl From<&AirModel> for Value {
    fn from(model: &AirModel) -> Self {
        model.raw_id().map_or(Self::Null, Self::String)
    }
}
