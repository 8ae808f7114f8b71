//! Services: ports forwarded from the worker to node interfaces.

use crate::encoder::Reference;
use crate::endpoints::interfaces::Interface;
use crate::endpoints::simulations::Simulation;
use crate::mixins::{CreateApi, DeleteApi, ListApi};
use crate::model::{air_endpoint, air_model, AirModel};
use crate::schema::{Capability, Fetch, FieldKind, FieldSpec, Identity, ModelSchema};
use serde::Serialize;
use validator::Validate;

static SERVICE: ModelSchema = ModelSchema {
    name: "Service",
    path: "simulations/nodes/interfaces/services",
    fields: &[
        FieldSpec::new("id", FieldKind::Str),
        FieldSpec::new("name", FieldKind::Str),
        FieldSpec::new("created", FieldKind::DateTime),
        FieldSpec::new("modified", FieldKind::DateTime),
        FieldSpec::new("dest_port", FieldKind::Int),
        FieldSpec::new("src_port", FieldKind::Int),
        FieldSpec::new("service_type", FieldKind::Str),
        FieldSpec::new("interface", FieldKind::Model(Interface::schema)).foreign_key(),
        FieldSpec::new("simulation", FieldKind::Model(Simulation::schema)).foreign_key(),
        FieldSpec::new("host", FieldKind::Optional(&FieldKind::Str)),
    ],
    identity: Identity::Field("id"),
    fetch: Fetch::Detail,
    post_load: None,
    supports: &[Capability::Delete],
};

air_model!(
    /// A forwarded port. `host` and `src_port` give the public side.
    Service,
    &SERVICE
);

air_endpoint!(
    /// Services endpoint.
    ServiceEndpoint,
    Service
);

/// Body of [`ServiceEndpoint::create`](CreateApi::create).
#[derive(Debug, Clone, Serialize, Validate)]
pub struct ServiceCreate {
    /// Service name
    #[validate(length(min = 1))]
    pub name: String,
    /// Port on the node
    #[validate(range(min = 1, max = 65535))]
    pub dest_port: i64,
    /// Interface to forward to
    pub interface: Reference,
    /// Service type
    pub service_type: String,
}

impl ServiceCreate {
    /// Request for an SSH service.
    pub fn new(name: impl Into<String>, dest_port: i64, interface: impl Into<Reference>) -> Self {
        Self {
            name: name.into(),
            dest_port,
            interface: interface.into(),
            service_type: "ssh".to_string(),
        }
    }
}

impl ListApi for ServiceEndpoint {}

impl CreateApi for ServiceEndpoint {
    type Request = ServiceCreate;
}

impl DeleteApi for ServiceEndpoint {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::AirApi;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const IFACE: &str = "7e6d5c4b-3a29-4180-9f7e-6d5c4b3a2918";

    #[tokio::test]
    async fn create_defaults_to_ssh() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v2/simulations/nodes/interfaces/services/"))
            .and(body_json(json!({
                "name": "oob",
                "dest_port": 22,
                "interface": IFACE,
                "service_type": "ssh"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "4d3c2b1a-0f9e-4d8c-8b7a-6f5e4d3c2b1a",
                "name": "oob",
                "created": "2030-01-01T00:00:00Z",
                "modified": "2030-01-01T00:00:00Z",
                "dest_port": 22,
                "src_port": 15022,
                "service_type": "ssh",
                "interface": IFACE,
                "simulation": "3dadd54d-583c-432e-9383-a2b0b1d7f551",
                "host": "worker01.air.nvidia.com"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = AirApi::new(&server.uri()).unwrap();
        let service = api
            .services()
            .create(&ServiceCreate::new("oob", 22, IFACE))
            .await
            .unwrap();
        assert_eq!(service.peek("src_port").unwrap().as_i64(), Some(15022));
    }

    #[tokio::test]
    async fn out_of_range_port_fails_locally() {
        let api = AirApi::new("http://localhost").unwrap();
        let err = api
            .services()
            .create(&ServiceCreate::new("oob", 70_000, IFACE))
            .await
            .unwrap_err();
        assert!(matches!(err, air_core::Error::Validation(_)));
    }
}
