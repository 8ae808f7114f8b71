//! Organizations.

use crate::endpoints::resource_budgets::ResourceBudget;
use crate::mixins::{GetApi, ListApi};
use crate::model::{air_endpoint, air_model, AirModel};
use crate::schema::{Fetch, FieldKind, FieldSpec, Identity, ModelSchema};

static ORGANIZATION: ModelSchema = ModelSchema {
    name: "Organization",
    path: "organizations",
    fields: &[
        FieldSpec::new("id", FieldKind::Str),
        FieldSpec::new("name", FieldKind::Str),
        FieldSpec::new("member_count", FieldKind::Int),
        FieldSpec::new("resource_budget", FieldKind::Model(ResourceBudget::schema)).foreign_key(),
    ],
    identity: Identity::Field("id"),
    fetch: Fetch::Detail,
    post_load: None,
    supports: &[],
};

air_model!(
    /// An organization of accounts sharing a resource budget.
    Organization,
    &ORGANIZATION
);

air_endpoint!(
    /// Organizations endpoint.
    OrganizationEndpoint,
    Organization
);

impl ListApi for OrganizationEndpoint {}

impl GetApi for OrganizationEndpoint {}
