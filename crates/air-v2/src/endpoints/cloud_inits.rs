//! Cloud-init assignments of simulation nodes.
//!
//! An assignment is identified by its node: `GET` and `PATCH` go to
//! `simulations/nodes/{node}/cloud-init/`.

use crate::encoder::{to_payload, Reference};
use crate::endpoints::nodes::Node;
use crate::endpoints::user_configs::UserConfig;
use crate::mixins::{Endpoint, GetApi, PatchApi};
use crate::model::{air_endpoint, air_model, AirModel};
use crate::schema::{Capability, Fetch, FieldKind, FieldSpec, Identity, ModelSchema};
use crate::Result;
use air_core::{validate_response, ExpectedBody};
use serde::Serialize;
use serde_json::{Map, Value};

static CLOUD_INIT: ModelSchema = ModelSchema {
    name: "CloudInit",
    path: "simulations/nodes/cloud-init",
    fields: &[
        FieldSpec::new("simulation_node", FieldKind::Model(Node::schema)).foreign_key(),
        FieldSpec::new(
            "user_data",
            FieldKind::Optional(&FieldKind::Model(UserConfig::schema)),
        )
        .foreign_key(),
        FieldSpec::new(
            "meta_data",
            FieldKind::Optional(&FieldKind::Model(UserConfig::schema)),
        )
        .foreign_key(),
        FieldSpec::new("user_data_name", FieldKind::Optional(&FieldKind::Str)),
        FieldSpec::new("meta_data_name", FieldKind::Optional(&FieldKind::Str)),
    ],
    identity: Identity::Nested("simulation_node"),
    fetch: Fetch::Template("simulations/nodes/{id}/cloud-init"),
    post_load: None,
    supports: &[Capability::Patch],
};

air_model!(
    /// User-data and meta-data configs assigned to a node.
    CloudInit,
    &CLOUD_INIT
);

air_endpoint!(
    /// Cloud-init endpoint.
    CloudInitEndpoint,
    CloudInit
);

/// One item of [`CloudInitEndpoint::bulk_assign`].
///
/// `None` leaves a config untouched, `Some(None)` clears it.
#[derive(Debug, Clone, Serialize)]
pub struct CloudInitAssignment {
    /// Node to assign to
    pub simulation_node: Reference,
    /// User-data config
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data: Option<Option<Reference>>,
    /// Meta-data config
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_data: Option<Option<Reference>>,
}

impl CloudInitAssignment {
    /// Assignment for `node` that changes nothing yet.
    pub fn new(node: impl Into<Reference>) -> Self {
        Self {
            simulation_node: node.into(),
            user_data: None,
            meta_data: None,
        }
    }
}

impl CloudInitEndpoint {
    /// Assign configs to several nodes in one request.
    ///
    /// # Errors
    ///
    /// Returns [`air_core::Error::InvalidArgument`] if a referenced model has no primary
    /// key, or an error unless the API answers `204`.
    pub async fn bulk_assign(&self, assignments: &[CloudInitAssignment]) -> Result<()> {
        let payload = assignments
            .iter()
            .map(|assignment| to_payload(assignment).map(Value::Object))
            .collect::<Result<Vec<_>>>()?;
        let url = self.api().url("simulations/nodes/cloud-init/bulk-assign");
        let res = self.api().patch(&url, Value::Array(payload)).await?;
        validate_response(&res, 204, ExpectedBody::Ignore)
    }
}

impl CloudInit {
    /// Replace both configs. `None` clears a config.
    ///
    /// # Errors
    ///
    /// Returns [`air_core::Error::InvalidArgument`] if a referenced model has no primary
    /// key, or any request error.
    pub async fn full_update(
        &mut self,
        user_data: Option<Reference>,
        meta_data: Option<Reference>,
    ) -> Result<()> {
        let mut payload = Map::new();
        for (name, reference) in [("user_data", user_data), ("meta_data", meta_data)] {
            let value = match reference {
                Some(reference) => Value::String(reference.require_pk()?.to_string()),
                None => Value::Null,
            };
            payload.insert(name.to_string(), value);
        }
        self.entity_mut().update(payload).await
    }
}

impl GetApi for CloudInitEndpoint {}

impl PatchApi for CloudInitEndpoint {}
