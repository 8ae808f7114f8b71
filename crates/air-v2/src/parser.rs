//! Recursive payload parser.
//!
//! Payloads are checked field by field against a [`ModelSchema`]. Type mismatches are
//! reported as [`Error::ModelAttribute`] with the path to the offending value, e.g.
//! ``field `tags` of `Fleet`: item at index `1`: field data is of type `int`, expected `str`: 5``.

use crate::api::AirApi;
use crate::entity::Entity;
use crate::schema::{FieldDefault, FieldKind, FieldMeta, ModelSchema};
use crate::value::FieldValue;
use crate::Result;
use air_core::util::{parse_iso_datetime, to_uuid};
use air_core::Error;
use serde_json::{Map, Value};

/// Name of a JSON value's type, as used in parse errors.
fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(number) if number.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

fn mismatch(value: &Value, expected: &str) -> Error {
    Error::ModelAttribute(format!(
        "field data is of type `{}`, expected `{expected}`: {value}",
        type_name(value)
    ))
}

fn with_context(err: Error, context: &str) -> Error {
    match err {
        Error::ModelAttribute(message) => Error::ModelAttribute(format!("{context}: {message}")),
        other => other,
    }
}

fn default_value(default: FieldDefault) -> FieldValue {
    match default {
        FieldDefault::Null => FieldValue::Null,
        FieldDefault::Bool(value) => FieldValue::Bool(value),
        FieldDefault::Int(value) => FieldValue::Int(value),
        FieldDefault::Float(value) => FieldValue::Float(value),
        FieldDefault::Str(value) => FieldValue::Str(value.to_string()),
    }
}

/// Build an entity of `schema` from a JSON object.
///
/// Missing optional fields become `null`, missing lazy fields are left unloaded and
/// missing fields with a default take it. Keys the schema does not declare are ignored.
///
/// # Errors
///
/// Returns [`Error::ModelAttribute`] if a field has the wrong shape or a required field
/// is missing.
pub(crate) fn load_entity(
    api: &AirApi,
    schema: &'static ModelSchema,
    mut data: Map<String, Value>,
) -> Result<Entity> {
    let mut fields = Vec::with_capacity(schema.fields.len());
    for spec in schema.fields {
        let value = match data.remove(spec.name) {
            Some(value) => parse_field(
                api,
                &spec.kind,
                spec.meta,
                value,
                &format!("field `{}` of `{}`", spec.name, schema.name),
            )?,
            None if spec.meta == FieldMeta::Lazy => FieldValue::Unloaded,
            None if spec.is_optional() => FieldValue::Null,
            None => match spec.default {
                Some(default) => default_value(default),
                None => {
                    return Err(Error::ModelAttribute(format!(
                        "failed to instantiate `{}`: missing required field `{}`",
                        schema.name, spec.name
                    )))
                }
            },
        };
        fields.push((spec.name, value));
    }

    let mut entity = Entity::new(api.clone(), schema, fields);
    if let Some(hook) = schema.post_load {
        hook(&mut entity);
    }
    Ok(entity)
}

/// Parse one value against `kind`. Errors are prefixed with `context`.
///
/// # Errors
///
/// Returns [`Error::ModelAttribute`] if the value does not match the kind.
pub(crate) fn parse_field(
    api: &AirApi,
    kind: &FieldKind,
    meta: FieldMeta,
    value: Value,
    context: &str,
) -> Result<FieldValue> {
    parse_kind(api, kind, meta, value).map_err(|err| with_context(err, context))
}

fn parse_kind(api: &AirApi, kind: &FieldKind, meta: FieldMeta, value: Value) -> Result<FieldValue> {
    match kind {
        FieldKind::List(inner) => match value {
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| {
                    parse_field(api, inner, meta, item, &format!("item at index `{index}`"))
                })
                .collect::<Result<Vec<_>>>()
                .map(FieldValue::List),
            other => Err(mismatch(&other, "list")),
        },
        FieldKind::Optional(inner) => match value {
            Value::Null => Ok(FieldValue::Null),
            other => parse_field(api, inner, meta, other, "optional field"),
        },
        FieldKind::Model(schema) => parse_model(api, schema(), meta, value),
        FieldKind::Record(keys) => parse_record(keys, value),
        FieldKind::DateTime => match value {
            Value::String(text) => parse_iso_datetime(&text)
                .map(FieldValue::DateTime)
                .ok_or_else(|| {
                    Error::ModelAttribute(format!("field data is not a valid ISO string: {text}"))
                }),
            other => Err(Error::ModelAttribute(format!(
                "`datetime` field can not be parsed from field data of type `{}`: {other}",
                type_name(&other)
            ))),
        },
        FieldKind::Str => match value {
            Value::String(text) => Ok(FieldValue::Str(text)),
            other => Err(mismatch(&other, "str")),
        },
        FieldKind::Int => match value.as_i64() {
            Some(number) if !value.is_f64() => Ok(FieldValue::Int(number)),
            _ => Err(mismatch(&value, "int")),
        },
        FieldKind::Float => match value.as_f64() {
            Some(number) if value.is_f64() => Ok(FieldValue::Float(number)),
            _ => Err(mismatch(&value, "float")),
        },
        FieldKind::Bool => match value {
            Value::Bool(flag) => Ok(FieldValue::Bool(flag)),
            other => Err(mismatch(&other, "bool")),
        },
        FieldKind::Json => Ok(FieldValue::Json(value)),
        FieldKind::Dict => match value {
            Value::Object(_) => Ok(FieldValue::Json(value)),
            other => Err(mismatch(&other, "dict")),
        },
        FieldKind::OneOf(kinds) => {
            for arm in *kinds {
                if let Ok(parsed) = parse_kind(api, arm, meta, value.clone()) {
                    return Ok(parsed);
                }
            }
            Err(mismatch(&value, &kind.describe()))
        }
    }
}

fn parse_model(
    api: &AirApi,
    schema: &'static ModelSchema,
    meta: FieldMeta,
    value: Value,
) -> Result<FieldValue> {
    match value {
        Value::String(id) if meta == FieldMeta::ForeignKey => match to_uuid(&id) {
            Some(pk) => Ok(FieldValue::Model(Box::new(Entity::stub(
                api.clone(),
                schema,
                pk.to_string(),
            )))),
            None => Err(Error::ModelAttribute(format!(
                "`{}` can not be parsed from foreign key due to invalid UUID value: {id}",
                schema.name
            ))),
        },
        Value::Object(data) => {
            load_entity(api, schema, data).map(|e| FieldValue::Model(Box::new(e)))
        }
        other => Err(Error::ModelAttribute(format!(
            "`{}` can not be parsed from foreign key due to invalid value: {other}",
            schema.name
        ))),
    }
}

fn parse_record(keys: &[&str], value: Value) -> Result<FieldValue> {
    let record = match value {
        Value::Object(record) => record,
        other => return Err(mismatch(&other, "record")),
    };
    if let Some(unknown) = record.keys().find(|key| !keys.contains(&key.as_str())) {
        return Err(Error::ModelAttribute(format!(
            "unexpected record field `{unknown}`"
        )));
    }
    if let Some(missing) = keys.iter().find(|key| !record.contains_key(**key)) {
        return Err(Error::ModelAttribute(format!(
            "missing record field `{missing}`"
        )));
    }
    Ok(FieldValue::Record(record))
}
