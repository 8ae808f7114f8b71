//! Simulation nodes.

use crate::encoder::Reference;
use crate::endpoints::cloud_inits::CloudInit;
use crate::endpoints::images::Image;
use crate::endpoints::simulations::Simulation;
use crate::endpoints::systems::System;
use crate::endpoints::workers::Worker;
use crate::mixins::{CreateApi, DeleteApi, GetApi, ListApi, PatchApi};
use crate::model::{air_endpoint, air_model, AirModel};
use crate::schema::{Capability, Fetch, FieldKind, FieldSpec, Identity, ModelSchema};
use crate::Result;
use air_core::QueryParams;
use serde::Serialize;
use serde_json::{Map, Value};
use validator::Validate;

const OPTIONAL_INT: FieldKind = FieldKind::Optional(&FieldKind::Int);
const OPTIONAL_STR: FieldKind = FieldKind::Optional(&FieldKind::Str);

static NODE: ModelSchema = ModelSchema {
    name: "Node",
    path: "simulations/nodes",
    fields: &[
        FieldSpec::new("id", FieldKind::Str),
        FieldSpec::new("name", FieldKind::Str),
        FieldSpec::new("created", FieldKind::DateTime),
        FieldSpec::new("modified", FieldKind::DateTime),
        FieldSpec::new("simulation", FieldKind::Model(Simulation::schema)).foreign_key(),
        FieldSpec::new("os", FieldKind::Optional(&FieldKind::Model(Image::schema))).foreign_key(),
        FieldSpec::new("console_port", OPTIONAL_INT),
        FieldSpec::new("serial_port", OPTIONAL_INT),
        FieldSpec::new("state", FieldKind::Str),
        FieldSpec::new("memory", FieldKind::Int),
        FieldSpec::new("storage", FieldKind::Int),
        FieldSpec::new("cpu", FieldKind::Int),
        FieldSpec::new("version", FieldKind::Int),
        FieldSpec::new("features", FieldKind::Str),
        FieldSpec::new("simx_ipv4", OPTIONAL_STR),
        FieldSpec::new("worker", FieldKind::Optional(&FieldKind::Model(Worker::schema)))
            .foreign_key(),
        FieldSpec::new("system", FieldKind::Optional(&FieldKind::Model(System::schema)))
            .foreign_key(),
        FieldSpec::new("boot_group", OPTIONAL_INT),
        FieldSpec::new("console_url", OPTIONAL_STR),
        FieldSpec::new("console_username", OPTIONAL_STR),
        FieldSpec::new("console_password", OPTIONAL_STR),
        FieldSpec::new("metadata", OPTIONAL_STR),
        FieldSpec::new("pos_x", FieldKind::Float),
        FieldSpec::new("pos_y", FieldKind::Float),
    ],
    identity: Identity::Field("id"),
    fetch: Fetch::Detail,
    post_load: None,
    supports: &[Capability::Patch, Capability::Delete],
};

air_model!(
    /// A simulated machine.
    Node,
    &NODE
);

air_endpoint!(
    /// Nodes endpoint.
    NodeEndpoint,
    Node
);

/// Body of [`NodeEndpoint::create`](CreateApi::create).
#[derive(Debug, Clone, Serialize, Validate)]
pub struct NodeCreate {
    /// Owning simulation
    pub simulation: Reference,
    /// Node name
    #[validate(length(min = 1))]
    pub name: String,
    /// Boot image
    pub os: Option<Reference>,
    /// Boot order group
    pub boot_group: Option<i64>,
    /// Feature flags, as a JSON string
    pub features: String,
    /// Canvas position
    pub pos_x: f64,
    /// Canvas position
    pub pos_y: f64,
    /// Console login
    pub console_username: Option<String>,
    /// Console password
    pub console_password: Option<String>,
    /// Free-form metadata, as a JSON string
    pub metadata: String,
    /// System node type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<Reference>,
    /// Memory in MB
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<i64>,
    /// CPU cores
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<i64>,
    /// Storage in GB
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<i64>,
}

impl NodeCreate {
    /// Request for a node named `name` in `simulation`, with the API's defaults.
    pub fn new(simulation: impl Into<Reference>, name: impl Into<String>) -> Self {
        Self {
            simulation: simulation.into(),
            name: name.into(),
            os: None,
            boot_group: Some(50),
            features: "{}".to_string(),
            pos_x: 0.0,
            pos_y: 0.0,
            console_username: None,
            console_password: None,
            metadata: "{}".to_string(),
            system: None,
            memory: None,
            cpu: None,
            storage: None,
        }
    }
}

/// Body of [`Node::update`]. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct NodeUpdate {
    /// New name
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub name: Option<String>,
    /// New state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Canvas position
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos_x: Option<f64>,
    /// Canvas position
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos_y: Option<f64>,
    /// Boot order group
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boot_group: Option<i64>,
    /// Console login
    #[serde(skip_serializing_if = "Option::is_none")]
    pub console_username: Option<String>,
    /// Console password
    #[serde(skip_serializing_if = "Option::is_none")]
    pub console_password: Option<String>,
    /// Console port
    #[serde(skip_serializing_if = "Option::is_none")]
    pub console_port: Option<i64>,
    /// Serial port
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_port: Option<i64>,
}

impl Node {
    /// Partially update the node.
    ///
    /// # Errors
    ///
    /// Returns [`air_core::Error::Validation`] before any request if `update` is invalid,
    /// or any request error.
    pub async fn update(&mut self, update: &NodeUpdate) -> Result<()> {
        self.entity_mut().update_from(update).await
    }

    /// Set or clear the agent key. Used by workers when starting nodes.
    ///
    /// # Errors
    ///
    /// Returns any request error.
    pub async fn set_agent_key(&mut self, agent_key: Option<&str>) -> Result<()> {
        let mut payload = Map::new();
        payload.insert(
            "agent_key".to_string(),
            agent_key.map_or(Value::Null, |key| Value::String(key.to_string())),
        );
        self.entity_mut().update(payload).await
    }

    /// Cloud-init assignment of the node.
    ///
    /// # Errors
    ///
    /// Returns [`air_core::Error::Air`] if the node has been deleted, or any request error.
    pub async fn cloud_init(&self) -> Result<CloudInit> {
        let pk = self.require_pk("queried")?;
        self.api()
            .cloud_inits()
            .get(&pk, &QueryParams::new())
            .await
    }
}

impl ListApi for NodeEndpoint {}

impl CreateApi for NodeEndpoint {
    type Request = NodeCreate;
}

impl GetApi for NodeEndpoint {}

impl PatchApi for NodeEndpoint {}

impl DeleteApi for NodeEndpoint {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::AirApi;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SIMULATION: &str = "3dadd54d-583c-432e-9383-a2b0b1d7f551";

    #[tokio::test]
    async fn create_sends_defaults() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2/simulations/nodes/"))
            .and(body_json(json!({
                "simulation": SIMULATION,
                "name": "leaf01",
                "os": null,
                "boot_group": 50,
                "features": "{}",
                "pos_x": 0.0,
                "pos_y": 0.0,
                "console_username": null,
                "console_password": null,
                "metadata": "{}",
                "cpu": 2
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "5b7c1cf5-7a54-4e0a-9f55-2a8a4f3a7e01",
                "name": "leaf01",
                "created": "2030-01-01T00:00:00Z",
                "modified": "2030-01-01T00:00:00Z",
                "simulation": SIMULATION,
                "os": null,
                "console_port": null,
                "serial_port": null,
                "state": "NEW",
                "memory": 1024,
                "storage": 10,
                "cpu": 2,
                "version": 1,
                "features": "{}",
                "simx_ipv4": null,
                "worker": null,
                "system": null,
                "boot_group": 50,
                "console_url": null,
                "console_username": null,
                "console_password": null,
                "metadata": "{}",
                "pos_x": 0.0,
                "pos_y": 0.0
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = AirApi::new(&server.uri()).unwrap();
        let mut request = NodeCreate::new(SIMULATION, "leaf01");
        request.cpu = Some(2);
        let node = api.nodes().create(&request).await.unwrap();
        assert_eq!(node.peek("cpu").unwrap().as_i64(), Some(2));
        assert!(node.peek("simulation").unwrap().as_model().unwrap().is_stub());
    }

    #[tokio::test]
    async fn cloud_init_uses_node_id() {
        let server = MockServer::start().await;
        let node_id = "5b7c1cf5-7a54-4e0a-9f55-2a8a4f3a7e01";
        Mock::given(method("GET"))
            .and(path(format!("/api/v2/simulations/nodes/{node_id}/cloud-init/")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "simulation_node": node_id,
                "user_data": null,
                "meta_data": null,
                "user_data_name": null,
                "meta_data_name": null
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = AirApi::new(&server.uri()).unwrap();
        let node = Node::from(crate::entity::Entity::stub(
            api.clone(),
            Node::schema(),
            node_id.to_string(),
        ));
        let cloud_init = node.cloud_init().await.unwrap();
        assert_eq!(cloud_init.pk().as_deref(), Some(node_id));
    }
}
