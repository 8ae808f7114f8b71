//! Worker fleets.

use crate::encoder::Reference;
use crate::endpoints::organizations::Organization;
use crate::mixins::{CreateApi, DeleteApi, GetApi, ListApi, PatchApi, PutApi};
use crate::model::{air_endpoint, air_model, AirModel};
use crate::schema::{Capability, Fetch, FieldKind, FieldSpec, Identity, ModelSchema};
use crate::Result;
use serde::Serialize;
use validator::Validate;

static FLEET_WORKER: ModelSchema = ModelSchema {
    name: "FleetWorker",
    path: "workers",
    fields: &[
        FieldSpec::new("id", FieldKind::Str),
        FieldSpec::new("url", FieldKind::Str),
        FieldSpec::new("cpu", FieldKind::Int),
        FieldSpec::new("memory", FieldKind::Int),
        FieldSpec::new("storage", FieldKind::Int),
        FieldSpec::new("ip_address", FieldKind::Str),
        FieldSpec::new("port_range", FieldKind::Str),
        FieldSpec::new("region", FieldKind::Str),
        FieldSpec::new("available", FieldKind::Bool),
        FieldSpec::new("fqdn", FieldKind::Str),
        FieldSpec::new("fleet", FieldKind::Str),
        FieldSpec::new(
            "contact",
            FieldKind::OneOf(&[FieldKind::List(&FieldKind::Str), FieldKind::Str]),
        ),
        FieldSpec::new("capabilities", FieldKind::Str),
        FieldSpec::new("cpu_arch", FieldKind::Str),
    ],
    identity: Identity::Field("id"),
    fetch: Fetch::Synthetic,
    post_load: None,
    supports: &[],
};

air_model!(
    /// Worker summary embedded in fleet responses. Has no endpoint of its own.
    FleetWorker,
    &FLEET_WORKER
);

static FLEET: ModelSchema = ModelSchema {
    name: "Fleet",
    path: "fleet",
    fields: &[
        FieldSpec::new("id", FieldKind::Str),
        FieldSpec::new("name", FieldKind::Str),
        FieldSpec::new(
            "organization",
            FieldKind::Optional(&FieldKind::Model(Organization::schema)),
        )
        .foreign_key(),
        FieldSpec::new("prefix", FieldKind::Str),
        FieldSpec::new("prefix_length", FieldKind::Int),
        FieldSpec::new("gateway_ipv4", FieldKind::Optional(&FieldKind::Str)),
        FieldSpec::new("port_range", FieldKind::Str),
        FieldSpec::new("container_ipv4_network", FieldKind::Str),
        FieldSpec::new("container_prefix", FieldKind::Int),
        FieldSpec::new("labels", FieldKind::List(&FieldKind::Str)),
        FieldSpec::new("public", FieldKind::Bool),
        FieldSpec::new(
            "workers",
            FieldKind::Optional(&FieldKind::List(&FieldKind::Model(FleetWorker::schema))),
        ),
    ],
    identity: Identity::Field("id"),
    fetch: Fetch::Detail,
    post_load: None,
    supports: &[Capability::Patch, Capability::Put, Capability::Delete],
};

air_model!(
    /// A group of workers sharing network settings.
    Fleet,
    &FLEET
);

air_endpoint!(
    /// Fleets endpoint.
    FleetEndpoint,
    Fleet
);

/// Body of [`FleetEndpoint::create`](CreateApi::create) and [`Fleet::full_update`].
/// Unset fields take the API's defaults.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct FleetCreate {
    /// Fleet name
    #[validate(length(min = 1))]
    pub name: String,
    /// Owning organization
    pub organization: Reference,
    /// Worker address prefix
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Length of `prefix`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix_length: Option<i64>,
    /// Gateway address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_ipv4: Option<String>,
    /// Port range workers expose, e.g. `10000-30000`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_range: Option<String>,
    /// Network of simulation containers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_ipv4_network: Option<String>,
    /// Prefix length of `container_ipv4_network`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_prefix: Option<i64>,
    /// Labels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

impl FleetCreate {
    /// Request for a fleet `name` owned by `organization`.
    pub fn new(name: impl Into<String>, organization: impl Into<Reference>) -> Self {
        Self {
            name: name.into(),
            organization: organization.into(),
            prefix: None,
            prefix_length: None,
            gateway_ipv4: None,
            port_range: None,
            container_ipv4_network: None,
            container_prefix: None,
            labels: None,
        }
    }
}

/// Body of [`Fleet::update`]. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct FleetUpdate {
    /// New name
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub name: Option<String>,
    /// Owning organization
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<Reference>,
    /// Worker address prefix
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Length of `prefix`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix_length: Option<i64>,
    /// Gateway address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_ipv4: Option<String>,
    /// Port range workers expose
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_range: Option<String>,
    /// Network of simulation containers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_ipv4_network: Option<String>,
    /// Prefix length of `container_ipv4_network`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_prefix: Option<i64>,
    /// Labels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

impl Fleet {
    /// Partially update the fleet.
    ///
    /// # Errors
    ///
    /// Returns [`air_core::Error::Validation`] before any request if `update` is invalid,
    /// or any request error.
    pub async fn update(&mut self, update: &FleetUpdate) -> Result<()> {
        self.entity_mut().update_from(update).await
    }

    /// Update name and organization together with the given settings. The API treats
    /// this as a partial update, so unset settings keep their values.
    ///
    /// # Errors
    ///
    /// Returns [`air_core::Error::Validation`] before any request if `request` is
    /// invalid, or any request error.
    pub async fn full_update(&mut self, request: &FleetCreate) -> Result<()> {
        self.entity_mut().update_from(request).await
    }
}

impl ListApi for FleetEndpoint {}

impl CreateApi for FleetEndpoint {
    type Request = FleetCreate;
}

impl GetApi for FleetEndpoint {}

impl PatchApi for FleetEndpoint {}

impl PutApi for FleetEndpoint {}

impl DeleteApi for FleetEndpoint {}
