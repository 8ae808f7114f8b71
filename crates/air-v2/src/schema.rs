//! Declarative field descriptors for v2 models.
//!
//! Every model is described by a static [`ModelSchema`]: its name, endpoint path, the
//! [`FieldSpec`]s the parser checks payloads against, how its primary key is derived and
//! how a bare reference to it is fetched.

use crate::api::AirApi;
use crate::entity::Entity;
use air_core::util::join_urls;
use std::fmt;

/// Accessor for a model's schema. Used instead of direct references so that models can
/// refer to each other (or to themselves) in their field tables.
pub type SchemaRef = fn() -> &'static ModelSchema;

/// Semantic type of a field.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// JSON string
    Str,
    /// JSON integer
    Int,
    /// JSON floating point number
    Float,
    /// JSON boolean
    Bool,
    /// ISO-8601 string
    DateTime,
    /// Any JSON value, kept as-is
    Json,
    /// JSON object with arbitrary keys
    Dict,
    /// Nested entity, either inline or (for foreign keys) a bare identifier
    Model(SchemaRef),
    /// Object with exactly the listed keys
    Record(&'static [&'static str]),
    /// List of values of the inner kind
    List(&'static FieldKind),
    /// `null` or a value of the inner kind
    Optional(&'static FieldKind),
    /// Value matching any of the listed kinds
    OneOf(&'static [FieldKind]),
}

impl FieldKind {
    /// Short name used in parse errors.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Str => "str".to_string(),
            Self::Int => "int".to_string(),
            Self::Float => "float".to_string(),
            Self::Bool => "bool".to_string(),
            Self::DateTime => "datetime".to_string(),
            Self::Json => "json".to_string(),
            Self::Dict => "dict".to_string(),
            Self::Model(schema) => schema().name.to_string(),
            Self::Record(_) => "record".to_string(),
            Self::List(inner) => format!("list[{}]", inner.describe()),
            Self::Optional(inner) => format!("optional[{}]", inner.describe()),
            Self::OneOf(kinds) => kinds
                .iter()
                .map(Self::describe)
                .collect::<Vec<_>>()
                .join(" | "),
        }
    }
}

/// How a field is treated beyond its type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMeta {
    /// Regular field
    Plain,
    /// Relation that may arrive as a bare identifier and serializes as one
    ForeignKey,
    /// Field that list responses may omit; loaded from the detail endpoint on access
    Lazy,
}

/// Value used for a missing field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldDefault {
    /// JSON `null`
    Null,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// String
    Str(&'static str),
}

/// One field of a model.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Field name, as used in payloads
    pub name: &'static str,
    /// Expected type
    pub kind: FieldKind,
    /// Special handling
    pub meta: FieldMeta,
    /// Value used when the payload omits the field
    pub default: Option<FieldDefault>,
}

impl FieldSpec {
    /// Plain required field.
    #[must_use]
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            meta: FieldMeta::Plain,
            default: None,
        }
    }

    /// Mark the field as a foreign key.
    #[must_use]
    pub const fn foreign_key(mut self) -> Self {
        self.meta = FieldMeta::ForeignKey;
        self
    }

    /// Mark the field as lazily loaded.
    #[must_use]
    pub const fn lazy(mut self) -> Self {
        self.meta = FieldMeta::Lazy;
        self
    }

    /// Use `default` when the payload omits the field.
    #[must_use]
    pub const fn with_default(mut self, default: FieldDefault) -> Self {
        self.default = Some(default);
        self
    }

    /// Returns true if the field accepts `null`.
    #[must_use]
    pub const fn is_optional(&self) -> bool {
        matches!(self.kind, FieldKind::Optional(_))
    }
}

/// Where a model's primary key comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    /// A string field of the model itself (usually `id`)
    Field(&'static str),
    /// The primary key of a nested entity field
    Nested(&'static str),
}

impl Identity {
    /// Name of the field carrying the identity.
    #[must_use]
    pub const fn field(self) -> &'static str {
        match self {
            Self::Field(name) | Self::Nested(name) => name,
        }
    }
}

/// How a model is fetched by primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fetch {
    /// `GET {url}{pk}/`
    Detail,
    /// `GET` on a path template under the v2 root; `{id}` is replaced by the primary key
    Template(&'static str),
    /// No detail API: the model is materialized from `{"id": pk}` and cannot be refreshed
    Synthetic,
    /// Listed through the model's endpoint, filtered by `ids` within the owning simulation
    ScopedList,
}

/// Model-level write operation offered by a resource's detail endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Partial update (`PATCH`)
    Patch,
    /// Full update (`PUT`)
    Put,
    /// Deletion (`DELETE`)
    Delete,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Patch => "update",
            Self::Put => "full update",
            Self::Delete => "delete",
        })
    }
}

/// Static description of a v2 model.
pub struct ModelSchema {
    /// Model name used in messages
    pub name: &'static str,
    /// Endpoint path under the v2 root
    pub path: &'static str,
    /// Declared fields, in payload order
    pub fields: &'static [FieldSpec],
    /// Primary key source
    pub identity: Identity,
    /// Fetch strategy
    pub fetch: Fetch,
    /// Hook run after an entity has been parsed
    pub post_load: Option<fn(&mut Entity)>,
    /// Writes the detail endpoint accepts
    pub supports: &'static [Capability],
}

impl ModelSchema {
    /// Returns true if the detail endpoint accepts `capability`.
    #[must_use]
    pub fn supports(&self, capability: Capability) -> bool {
        self.supports.contains(&capability)
    }

    /// Look up a declared field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|spec| spec.name == name)
    }

    /// Collection URL of the model's endpoint.
    #[must_use]
    pub fn url(&self, api: &AirApi) -> String {
        join_urls(&[api.base_url(), self.path])
    }

    /// URL of one instance.
    #[must_use]
    pub fn detail_url(&self, api: &AirApi, pk: &str) -> String {
        match self.fetch {
            Fetch::Template(template) => {
                join_urls(&[api.base_url(), &template.replace("{id}", pk)])
            }
            Fetch::Detail | Fetch::Synthetic | Fetch::ScopedList => {
                join_urls(&[api.base_url(), self.path, pk])
            }
        }
    }
}

impl fmt::Debug for ModelSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelSchema")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("identity", &self.identity)
            .field("fetch", &self.fetch)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELDS: &[FieldSpec] = &[
        FieldSpec::new("id", FieldKind::Str),
        FieldSpec::new("tags", FieldKind::List(&FieldKind::Str)),
        FieldSpec::new("note", FieldKind::Optional(&FieldKind::Str)),
    ];

    static WIDGET: ModelSchema = ModelSchema {
        name: "Widget",
        path: "widgets",
        fields: FIELDS,
        identity: Identity::Field("id"),
        fetch: Fetch::Detail,
        post_load: None,
        supports: &[],
    };

    static TEMPLATED: ModelSchema = ModelSchema {
        name: "Templated",
        path: "widgets/templated",
        fields: FIELDS,
        identity: Identity::Nested("widget"),
        fetch: Fetch::Template("widgets/{id}/templated"),
        post_load: None,
        supports: &[],
    };

    #[test]
    fn builder_flags() {
        let spec = FieldSpec::new("owner", FieldKind::Str).foreign_key();
        assert_eq!(spec.meta, FieldMeta::ForeignKey);
        let spec = FieldSpec::new("content", FieldKind::Str)
            .lazy()
            .with_default(FieldDefault::Str("{}"));
        assert_eq!(spec.meta, FieldMeta::Lazy);
        assert_eq!(spec.default, Some(FieldDefault::Str("{}")));
        assert!(WIDGET.field("note").unwrap().is_optional());
        assert!(WIDGET.field("missing").is_none());
    }

    #[test]
    fn kind_descriptions() {
        assert_eq!(
            FieldKind::Optional(&FieldKind::List(&FieldKind::Int)).describe(),
            "optional[list[int]]"
        );
        assert_eq!(
            FieldKind::OneOf(&[FieldKind::Str, FieldKind::List(&FieldKind::Str)]).describe(),
            "str | list[str]"
        );
    }

    #[test]
    fn detail_urls() {
        let api = AirApi::new("http://localhost").unwrap();
        assert_eq!(WIDGET.url(&api), "http://localhost/api/v2/widgets/");
        assert_eq!(
            WIDGET.detail_url(&api, "abc"),
            "http://localhost/api/v2/widgets/abc/"
        );
        assert_eq!(
            TEMPLATED.detail_url(&api, "abc"),
            "http://localhost/api/v2/widgets/abc/templated/"
        );
        assert_eq!(TEMPLATED.identity.field(), "widget");
    }
}
