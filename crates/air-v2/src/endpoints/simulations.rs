//! Simulations.

use crate::encoder::Reference;
use crate::endpoints::organizations::Organization;
use crate::endpoints::workers::Worker;
use crate::mixins::{CreateApi, DeleteApi, GetApi, ListApi, PatchApi};
use crate::model::{air_endpoint, air_model, AirModel};
use crate::schema::{Capability, Fetch, FieldKind, FieldSpec, Identity, ModelSchema};
use crate::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use validator::Validate;

static SIMULATION: ModelSchema = ModelSchema {
    name: "Simulation",
    path: "simulations",
    fields: &[
        FieldSpec::new("id", FieldKind::Str),
        FieldSpec::new("title", FieldKind::Str),
        FieldSpec::new("state", FieldKind::Str),
        FieldSpec::new("sleep", FieldKind::Bool),
        FieldSpec::new("owner", FieldKind::Str),
        FieldSpec::new("cloned", FieldKind::Bool),
        FieldSpec::new("expires", FieldKind::Bool),
        FieldSpec::new("created", FieldKind::DateTime),
        FieldSpec::new("modified", FieldKind::DateTime),
        FieldSpec::new("sleep_at", FieldKind::DateTime),
        FieldSpec::new("expires_at", FieldKind::DateTime),
        FieldSpec::new(
            "organization",
            FieldKind::Optional(&FieldKind::Model(Organization::schema)),
        )
        .foreign_key(),
        FieldSpec::new(
            "preferred_worker",
            FieldKind::Optional(&FieldKind::Model(Worker::schema)),
        )
        .foreign_key(),
        FieldSpec::new("documentation", FieldKind::Optional(&FieldKind::Str)),
        FieldSpec::new("write_ok", FieldKind::Optional(&FieldKind::Bool)),
        FieldSpec::new("metadata", FieldKind::Optional(&FieldKind::Str)),
    ],
    identity: Identity::Field("id"),
    fetch: Fetch::Detail,
    post_load: None,
    supports: &[Capability::Patch, Capability::Delete],
};

air_model!(
    /// A simulation: a set of nodes and links scheduled on a worker.
    Simulation,
    &SIMULATION
);

air_endpoint!(
    /// Simulations endpoint.
    SimulationEndpoint,
    Simulation
);

/// Body of [`SimulationEndpoint::create`](CreateApi::create).
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct SimulationCreate {
    /// Simulation title
    #[validate(length(min = 1))]
    pub title: String,
    /// Owning organization
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<Reference>,
    /// Worker to schedule on, if available
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_worker: Option<Reference>,
    /// Put the simulation to sleep at this time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sleep_at: Option<DateTime<Utc>>,
    /// Delete the simulation at this time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Markdown documentation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    /// Free-form metadata, as a JSON string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
}

impl SimulationCreate {
    /// Request for a simulation titled `title`.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Body of [`Simulation::update`]. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct SimulationUpdate {
    /// New title
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub title: Option<String>,
    /// Worker to schedule on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_worker: Option<Reference>,
    /// Whether the simulation goes to sleep at `sleep_at`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sleep: Option<bool>,
    /// Sleep time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sleep_at: Option<DateTime<Utc>>,
    /// Whether the simulation is deleted at `expires_at`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<bool>,
    /// Expiry time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Markdown documentation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    /// Free-form metadata, as a JSON string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
}

impl Simulation {
    /// Partially update the simulation.
    ///
    /// # Errors
    ///
    /// Returns [`air_core::Error::Validation`] before any request if `update` is invalid,
    /// or any request error.
    pub async fn update(&mut self, update: &SimulationUpdate) -> Result<()> {
        self.entity_mut().update_from(update).await
    }
}

impl ListApi for SimulationEndpoint {}

impl CreateApi for SimulationEndpoint {
    type Request = SimulationCreate;
}

impl GetApi for SimulationEndpoint {}

impl PatchApi for SimulationEndpoint {}

impl DeleteApi for SimulationEndpoint {}
