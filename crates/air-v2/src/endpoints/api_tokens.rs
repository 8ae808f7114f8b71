//! Personal API tokens.

use crate::mixins::{CreateApi, DeleteApi, ListApi};
use crate::model::{air_endpoint, air_model};
use crate::schema::{Capability, Fetch, FieldKind, FieldSpec, Identity, ModelSchema};
use chrono::{DateTime, Utc};
use serde::Serialize;
use validator::Validate;

static API_TOKEN: ModelSchema = ModelSchema {
    name: "ApiToken",
    path: "api-tokens",
    fields: &[
        FieldSpec::new("id", FieldKind::Str),
        FieldSpec::new("name", FieldKind::Str),
        FieldSpec::new("created", FieldKind::DateTime),
        FieldSpec::new("expiry", FieldKind::Optional(&FieldKind::DateTime)),
    ],
    identity: Identity::Field("id"),
    fetch: Fetch::Detail,
    post_load: None,
    supports: &[Capability::Delete],
};

air_model!(
    /// An API token. The token value itself is only returned on creation.
    ApiToken,
    &API_TOKEN
);

air_endpoint!(
    /// API tokens endpoint.
    ApiTokenEndpoint,
    ApiToken
);

/// Body of [`ApiTokenEndpoint::create`](CreateApi::create).
#[derive(Debug, Clone, Serialize, Validate)]
pub struct ApiTokenCreate {
    /// Token name
    #[validate(length(min = 1))]
    pub name: String,
    /// Expiry; `None` never expires
    pub expiry: Option<DateTime<Utc>>,
}

impl ListApi for ApiTokenEndpoint {}

impl CreateApi for ApiTokenEndpoint {
    type Request = ApiTokenCreate;
}

impl DeleteApi for ApiTokenEndpoint {}
