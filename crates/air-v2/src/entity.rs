//! Runtime representation of a v2 model instance.
//!
//! An [`Entity`] pairs a static [`ModelSchema`] with the parsed field values of one remote
//! object. Foreign keys that arrived as bare identifiers are held as *stubs*: entities that
//! only know their primary key and fetch the rest of their data on first access.

use crate::api::AirApi;
use crate::mixins::Page;
use crate::parser::load_entity;
use crate::schema::{Capability, Fetch, FieldKind, FieldMeta, Identity, ModelSchema};
use crate::value::FieldValue;
use crate::Result;
use air_core::util::format_iso_datetime;
use air_core::{validate_response, Error, ExpectedBody, QueryParams, RequestBody};
use reqwest::Method;
use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::fmt;
use tracing::debug;
use validator::Validate;

/// A v2 model instance bound to the client that loaded it.
#[derive(Debug, Clone)]
pub struct Entity {
    schema: &'static ModelSchema,
    api: AirApi,
    fields: Vec<(&'static str, FieldValue)>,
    key: Option<String>,
    stub: bool,
    resolved: bool,
    scope: Option<String>,
}

impl Entity {
    pub(crate) fn new(
        api: AirApi,
        schema: &'static ModelSchema,
        fields: Vec<(&'static str, FieldValue)>,
    ) -> Self {
        Self {
            schema,
            api,
            fields,
            key: None,
            stub: false,
            resolved: true,
            scope: None,
        }
    }

    /// Unresolved entity that only knows its primary key.
    pub(crate) fn stub(api: AirApi, schema: &'static ModelSchema, pk: String) -> Self {
        let fields = match schema.identity {
            Identity::Field(name) => vec![(name, FieldValue::Str(pk.clone()))],
            Identity::Nested(name) => match schema.field(name).map(|spec| spec.kind) {
                Some(FieldKind::Model(nested) | FieldKind::Optional(&FieldKind::Model(nested))) => {
                    let owner = Self::stub(api.clone(), nested(), pk.clone());
                    vec![(name, FieldValue::Model(Box::new(owner)))]
                }
                _ => Vec::new(),
            },
        };
        Self {
            schema,
            api,
            fields,
            key: Some(pk),
            stub: true,
            resolved: false,
            scope: None,
        }
    }

    /// Schema describing this entity.
    #[must_use]
    pub const fn schema(&self) -> &'static ModelSchema {
        self.schema
    }

    /// Client used for follow-up requests.
    #[must_use]
    pub const fn api(&self) -> &AirApi {
        &self.api
    }

    /// Returns true if the entity was created from a bare foreign key.
    #[must_use]
    pub const fn is_stub(&self) -> bool {
        self.stub
    }

    /// Returns true once the entity's data has been loaded.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Primary key of the owning object for models that are only reachable through it.
    #[must_use]
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Set the owning object's primary key.
    pub fn set_scope(&mut self, scope: impl Into<String>) {
        self.scope = Some(scope.into());
    }

    /// Primary key, if the entity has one.
    ///
    /// For models identified through a nested entity (cloud-init, node instructions) this
    /// is the nested entity's primary key.
    #[must_use]
    pub fn pk(&self) -> Option<String> {
        let from_fields = match self.schema.identity {
            Identity::Field(name) => self
                .value(name)
                .and_then(FieldValue::as_str)
                .map(str::to_string),
            Identity::Nested(name) => self
                .value(name)
                .and_then(FieldValue::as_model)
                .and_then(Self::pk),
        };
        from_fields.or_else(|| self.key.clone())
    }

    fn value(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }

    pub(crate) fn field_mut(&mut self, name: &str) -> Option<&mut FieldValue> {
        self.fields
            .iter_mut()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }

    fn set_value(&mut self, name: &'static str, value: FieldValue) {
        match self.field_mut(name) {
            Some(slot) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    fn check_field(&self, name: &str) -> Result<()> {
        if self.schema.field(name).is_none() {
            return Err(Error::ModelAttribute(format!(
                "`{}` has no field `{name}`",
                self.schema.name
            )));
        }
        Ok(())
    }

    fn needs_resolution(&self, name: &str) -> bool {
        !self.resolved && name != self.schema.identity.field()
    }

    /// Read a field without issuing any request.
    ///
    /// Lazy fields that have not been loaded read as [`FieldValue::Unloaded`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModelAttribute`] if the field is not declared, or if the entity is
    /// an unresolved stub and the field is not its identifier.
    pub fn peek(&self, name: &str) -> Result<&FieldValue> {
        self.check_field(name)?;
        if self.needs_resolution(name) {
            return Err(Error::ModelAttribute(format!(
                "field `{name}` of `{}` is not loaded; resolve the object first",
                self.schema.name
            )));
        }
        self.value(name).ok_or_else(|| {
            Error::ModelAttribute(format!(
                "field `{name}` of `{}` is not loaded",
                self.schema.name
            ))
        })
    }

    /// Read a field, resolving a stub or loading a lazy field first.
    ///
    /// A stub is fetched at most once; afterwards reads are served locally until
    /// [`Entity::refresh`] is called.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModelAttribute`] for undeclared fields, or any error of the fetch.
    pub async fn get(&mut self, name: &str) -> Result<&FieldValue> {
        self.check_field(name)?;
        if self.needs_resolution(name) {
            self.resolve().await?;
        }
        if matches!(self.value(name), Some(FieldValue::Unloaded)) {
            self.load_lazy(name).await?;
        }
        self.peek(name)
    }

    /// Fetch the data of an unresolved stub. Does nothing for loaded entities.
    ///
    /// # Errors
    ///
    /// Returns any error of the fetch.
    pub async fn resolve(&mut self) -> Result<()> {
        if self.resolved {
            return Ok(());
        }
        let pk = self.require_pk("resolved")?;
        debug!(model = self.schema.name, pk = %pk, "resolving foreign key");
        let fresh = fetch(&self.api, self.schema, &pk, self.scope.as_deref()).await?;
        self.apply(fresh);
        Ok(())
    }

    async fn load_lazy(&mut self, name: &str) -> Result<()> {
        let pk = self.require_pk("loaded")?;
        debug!(model = self.schema.name, field = name, "loading lazy field");
        let mut fresh = fetch(&self.api, self.schema, &pk, self.scope.as_deref()).await?;
        if let Some(spec) = self.schema.field(name) {
            let value = fresh
                .field_mut(name)
                .map_or(FieldValue::Null, std::mem::take);
            self.set_value(spec.name, value);
        }
        Ok(())
    }

    /// Resolve a related entity and borrow it. `null` relations yield `None`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModelAttribute`] if the field does not hold an entity, or any
    /// error of the fetch.
    pub async fn related(&mut self, name: &str) -> Result<Option<&mut Entity>> {
        self.get(name).await?;
        let model = self.schema.name;
        match self.field_mut(name) {
            Some(FieldValue::Model(entity)) => {
                entity.resolve().await?;
                Ok(Some(entity.as_mut()))
            }
            Some(FieldValue::Null) => Ok(None),
            _ => Err(Error::ModelAttribute(format!(
                "field `{name}` of `{model}` does not hold a model"
            ))),
        }
    }

    /// Resolve every entity of a list field and borrow them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModelAttribute`] if the field is not a list, or any error of the
    /// fetches.
    pub async fn related_list(&mut self, name: &str) -> Result<Vec<&mut Entity>> {
        self.get(name).await?;
        let model = self.schema.name;
        let items = match self.field_mut(name) {
            Some(FieldValue::List(items)) => items,
            Some(FieldValue::Null) => return Ok(Vec::new()),
            _ => {
                return Err(Error::ModelAttribute(format!(
                    "field `{name}` of `{model}` is not a list"
                )))
            }
        };
        let mut entities = Vec::with_capacity(items.len());
        for item in items.iter_mut() {
            if let FieldValue::Model(entity) = item {
                entity.resolve().await?;
                entities.push(entity.as_mut());
            }
        }
        Ok(entities)
    }

    pub(crate) fn require_pk(&self, context: &str) -> Result<String> {
        self.pk().ok_or_else(|| {
            Error::Air(format!(
                "The {} cannot be {context}: primary key is `None`.",
                self.schema.name
            ))
        })
    }

    /// Replace every field with the values of `fresh`.
    fn apply(&mut self, fresh: Self) {
        self.fields = fresh.fields;
        self.resolved = true;
        if fresh.scope.is_some() {
            self.scope = fresh.scope;
        }
    }

    /// Reload the entity from the API.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSupported`] for loaded models without a detail API and
    /// [`Error::Air`] when the primary key is missing.
    pub async fn refresh(&mut self) -> Result<()> {
        if self.schema.fetch == Fetch::Synthetic && self.resolved {
            return Err(Error::NotSupported(format!(
                "{} does not support refresh",
                self.schema.name
            )));
        }
        let pk = self.require_pk("refreshed")?;
        let fresh = fetch(&self.api, self.schema, &pk, self.scope.as_deref()).await?;
        self.apply(fresh);
        Ok(())
    }

    fn require_capability(&self, capability: Capability) -> Result<()> {
        if self.schema.supports(capability) {
            return Ok(());
        }
        Err(Error::NotSupported(format!(
            "{} does not support {capability}",
            self.schema.name
        )))
    }

    async fn write(
        &mut self,
        context: &str,
        capability: Capability,
        method: Method,
        payload: Map<String, Value>,
    ) -> Result<()> {
        self.require_capability(capability)?;
        let pk = self.require_pk(context)?;
        let url = self.schema.detail_url(&self.api, &pk);
        let body = RequestBody::Json(Value::Object(payload));
        let res = self.api.request(method, &url, &[], body).await?;
        validate_response(&res, 200, ExpectedBody::Object)?;
        let fresh = load_entity(&self.api, self.schema, res.json()?)?;
        self.apply(fresh);
        Ok(())
    }

    /// Partially update the object (`PATCH`) and apply the server's response.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSupported`] for resources that cannot be updated and
    /// [`Error::Air`] when the primary key is missing, or any request error.
    pub async fn update(&mut self, payload: Map<String, Value>) -> Result<()> {
        self.write("updated", Capability::Patch, Method::PATCH, payload).await
    }

    /// Replace the object (`PUT`) and apply the server's response.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSupported`] for resources without full updates and
    /// [`Error::Air`] when the primary key is missing, or any request error.
    pub async fn full_update(&mut self, payload: Map<String, Value>) -> Result<()> {
        self.write("fully updated", Capability::Put, Method::PUT, payload).await
    }

    /// Validate and serialize `request`, then [`Entity::update`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] before any request if `request` is invalid.
    pub async fn update_from<R>(&mut self, request: &R) -> Result<()>
    where
        R: Serialize + Validate + Sync,
    {
        request.validate()?;
        let payload = crate::encoder::to_payload(request)?;
        self.update(payload).await
    }

    /// Validate and serialize `request`, then [`Entity::full_update`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] before any request if `request` is invalid.
    pub async fn full_update_from<R>(&mut self, request: &R) -> Result<()>
    where
        R: Serialize + Validate + Sync,
    {
        request.validate()?;
        let payload = crate::encoder::to_payload(request)?;
        self.full_update(payload).await
    }

    /// Delete the object and clear its primary key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSupported`] for resources that cannot be deleted and
    /// [`Error::Air`] when the primary key is missing (including after a previous
    /// delete), or any request error.
    pub async fn delete(&mut self) -> Result<()> {
        self.require_capability(Capability::Delete)?;
        let pk = self.require_pk("deleted")?;
        let url = self.schema.detail_url(&self.api, &pk);
        let res = self.api.delete(&url).await?;
        validate_response(&res, 204, ExpectedBody::Ignore)?;
        debug!(model = self.schema.name, pk = %pk, "deleted");
        self.set_value(self.schema.identity.field(), FieldValue::Null);
        self.key = None;
        Ok(())
    }

    /// Plain JSON representation.
    ///
    /// Foreign keys are rendered as identifiers, nested models as objects and datetimes
    /// as ISO-8601 strings. Lazy fields that were never loaded are omitted. An unresolved
    /// stub renders as its identifier field only.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for floats that JSON cannot represent.
    pub fn dict(&self) -> Result<Map<String, Value>> {
        let mut map = Map::new();
        if !self.resolved {
            map.insert(
                self.schema.identity.field().to_string(),
                self.pk().map_or(Value::Null, Value::String),
            );
            return Ok(map);
        }
        for (name, value) in &self.fields {
            if *value == FieldValue::Unloaded {
                continue;
            }
            let foreign_key = self
                .schema
                .field(name)
                .is_some_and(|spec| spec.meta == FieldMeta::ForeignKey);
            map.insert((*name).to_string(), encode_value(value, foreign_key)?);
        }
        Ok(map)
    }

    /// Compact JSON string of [`Entity::dict`].
    ///
    /// # Errors
    ///
    /// See [`Entity::dict`].
    pub fn json(&self) -> Result<String> {
        Ok(serde_json::to_string(&Value::Object(self.dict()?))?)
    }

    /// Convert into a typed model.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModelAttribute`] if the entity belongs to another model.
    pub fn into_model<T: crate::model::AirModel>(self) -> Result<T> {
        let expected = T::schema().name;
        if self.schema.name != expected {
            return Err(Error::ModelAttribute(format!(
                "expected `{expected}`, got `{}`",
                self.schema.name
            )));
        }
        Ok(T::from(self))
    }
}

fn encode_value(value: &FieldValue, foreign_key: bool) -> Result<Value> {
    Ok(match value {
        FieldValue::Null | FieldValue::Unloaded => Value::Null,
        FieldValue::Bool(flag) => Value::Bool(*flag),
        FieldValue::Int(number) => Value::Number((*number).into()),
        FieldValue::Float(number) => Number::from_f64(*number)
            .map(Value::Number)
            .ok_or_else(|| Error::InvalidArgument(format!("{number} is not JSON serializable")))?,
        FieldValue::Str(text) => Value::String(text.clone()),
        FieldValue::DateTime(datetime) => Value::String(format_iso_datetime(datetime)),
        FieldValue::Json(json) => json.clone(),
        FieldValue::Record(record) => Value::Object(record.clone()),
        FieldValue::List(items) => Value::Array(
            items
                .iter()
                .map(|item| encode_value(item, foreign_key))
                .collect::<Result<_>>()?,
        ),
        FieldValue::Model(entity) if foreign_key => entity.pk().map_or(Value::Null, Value::String),
        FieldValue::Model(entity) => Value::Object(entity.dict()?),
    })
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pk() {
            Some(pk) => write!(f, "<{} {pk}>", self.schema.name),
            None => write!(f, "<{} None>", self.schema.name),
        }
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        match (self.pk(), other.pk()) {
            (Some(left), Some(right)) if self.schema.name == other.schema.name => left == right,
            _ => std::ptr::eq(self, other),
        }
    }
}

/// Load the entity of `schema` identified by `pk` using the schema's fetch strategy.
pub(crate) async fn fetch(
    api: &AirApi,
    schema: &'static ModelSchema,
    pk: &str,
    scope: Option<&str>,
) -> Result<Entity> {
    match schema.fetch {
        Fetch::Detail | Fetch::Template(_) => {
            let res = api.get(&schema.detail_url(api, pk), &QueryParams::new()).await?;
            validate_response(&res, 200, ExpectedBody::Object)?;
            load_entity(api, schema, res.json()?)
        }
        Fetch::Synthetic => {
            let mut data = Map::new();
            data.insert(
                schema.identity.field().to_string(),
                Value::String(pk.to_string()),
            );
            load_entity(api, schema, data)
        }
        Fetch::ScopedList => {
            let scope = scope.ok_or_else(|| {
                Error::Air(format!(
                    "The {} cannot be fetched: owning simulation is unknown.",
                    schema.name
                ))
            })?;
            let mut params = QueryParams::new();
            params.push("simulation", scope);
            params.push("ids", pk);
            params.push("limit", api.page_size());
            let res = api.get(&schema.url(api), &params).await?;
            validate_response(&res, 200, ExpectedBody::Object)?;
            let page: Page = res.json()?;
            let data = page.results.into_iter().next().ok_or_else(|| {
                Error::Air(format!("{} {pk} was not found in simulation {scope}", schema.name))
            })?;
            let mut entity = load_entity(api, schema, data)?;
            entity.set_scope(scope);
            Ok(entity)
        }
    }
}
