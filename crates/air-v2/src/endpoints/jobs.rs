//! Worker jobs.

use crate::endpoints::simulations::Simulation;
use crate::endpoints::workers::Worker;
use crate::mixins::{GetApi, ListApi, PatchApi};
use crate::model::{air_endpoint, air_model, AirModel};
use crate::schema::{Capability, Fetch, FieldKind, FieldSpec, Identity, ModelSchema};
use crate::Result;
use serde::Serialize;
use validator::Validate;

static JOB: ModelSchema = ModelSchema {
    name: "Job",
    path: "jobs",
    fields: &[
        FieldSpec::new("id", FieldKind::Str),
        FieldSpec::new("category", FieldKind::Str),
        FieldSpec::new("state", FieldKind::Str),
        FieldSpec::new("created", FieldKind::DateTime),
        FieldSpec::new("last_updated", FieldKind::DateTime),
        FieldSpec::new("notes", FieldKind::Optional(&FieldKind::Str)),
        FieldSpec::new("data", FieldKind::Optional(&FieldKind::Str)),
        FieldSpec::new(
            "simulation",
            FieldKind::Optional(&FieldKind::Model(Simulation::schema)),
        )
        .foreign_key(),
        FieldSpec::new("worker", FieldKind::Optional(&FieldKind::Model(Worker::schema)))
            .foreign_key(),
    ],
    identity: Identity::Field("id"),
    fetch: Fetch::Detail,
    post_load: None,
    supports: &[Capability::Patch],
};

air_model!(
    /// A unit of work dispatched to a worker.
    Job,
    &JOB
);

air_endpoint!(
    /// Jobs endpoint.
    JobEndpoint,
    Job
);

#[derive(Serialize, Validate)]
struct JobUpdate<'a> {
    #[validate(length(min = 1))]
    state: &'a str,
}

impl Job {
    /// Move the job to `state`.
    ///
    /// # Errors
    ///
    /// Returns [`air_core::Error::Validation`] if `state` is empty, or any request error.
    pub async fn update(&mut self, state: &str) -> Result<()> {
        self.entity_mut().update_from(&JobUpdate { state }).await
    }
}

impl ListApi for JobEndpoint {}

impl GetApi for JobEndpoint {}

impl PatchApi for JobEndpoint {}
