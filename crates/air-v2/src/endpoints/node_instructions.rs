//! Instructions executed by the agent of a node.

use crate::encoder::{to_payload, Reference};
use crate::endpoints::nodes::Node;
use crate::mixins::Endpoint;
use crate::model::{air_endpoint, air_model, AirModel};
use crate::schema::{Fetch, FieldKind, FieldSpec, Identity, ModelSchema};
use crate::Result;
use air_core::{validate_response, ExpectedBody};
use serde::Serialize;
use serde_json::Value;
use validator::Validate;

static NODE_INSTRUCTION: ModelSchema = ModelSchema {
    name: "NodeInstruction",
    path: "simulations/nodes/instructions",
    fields: &[
        FieldSpec::new("id", FieldKind::Str),
        FieldSpec::new("node", FieldKind::Model(Node::schema)).foreign_key(),
        FieldSpec::new("instruction", FieldKind::Str),
        FieldSpec::new("state", FieldKind::Str),
        FieldSpec::new("created", FieldKind::DateTime),
        FieldSpec::new("modified", FieldKind::DateTime),
    ],
    identity: Identity::Nested("node"),
    fetch: Fetch::Synthetic,
    post_load: None,
    supports: &[],
};

air_model!(
    /// An instruction queued for a node's agent. Identified by its node.
    NodeInstruction,
    &NODE_INSTRUCTION
);

air_endpoint!(
    /// Node instructions endpoint.
    NodeInstructionEndpoint,
    NodeInstruction
);

/// How the agent runs an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Executor {
    /// Cloud-init style initialization
    Init,
    /// Write files; `data` maps paths to contents
    File,
    /// Run a shell script
    Shell,
}

/// Body of [`NodeInstructionEndpoint::create`].
#[derive(Debug, Clone, Serialize, Validate)]
pub struct NodeInstructionCreate {
    /// Executor
    pub executor: Executor,
    /// Executor input
    pub data: String,
    /// Monitor to run alongside the instruction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitor: Option<String>,
}

impl NodeInstructionEndpoint {
    /// Queue an instruction for `node`.
    ///
    /// # Errors
    ///
    /// Returns [`air_core::Error::InvalidArgument`] if `node` has no primary key, or an
    /// error unless the API answers `201`.
    pub async fn create(
        &self,
        node: impl Into<Reference> + Send,
        request: &NodeInstructionCreate,
    ) -> Result<NodeInstruction> {
        request.validate()?;
        let node = node.into();
        let url = self
            .api()
            .url(&format!("simulations/nodes/{}/instructions", node.require_pk()?));
        let payload = to_payload(request)?;
        let res = self.api().post(&url, Value::Object(payload)).await?;
        validate_response(&res, 201, ExpectedBody::Object)?;
        self.load(res.json()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::AirApi;
    use crate::entity::Entity;
    use air_core::Error;
    use serde_json::{json, Map};
    use wiremock::matchers::{any, body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const NODE: &str = "5b7c1cf5-7a54-4e0a-9f55-2a8a4f3a7e01";

    #[tokio::test]
    async fn create_posts_to_node() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/api/v2/simulations/nodes/{NODE}/instructions/")))
            .and(body_json(json!({"executor": "shell", "data": "echo hello"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "i1",
                "node": NODE,
                "instruction": "echo hello",
                "state": "pending",
                "created": "2030-01-01T00:00:00Z",
                "modified": "2030-01-01T00:00:00Z"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = AirApi::new(&server.uri()).unwrap();
        let mut instruction = api
            .node_instructions()
            .create(
                NODE,
                &NodeInstructionCreate {
                    executor: Executor::Shell,
                    data: "echo hello".to_string(),
                    monitor: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(instruction.pk().as_deref(), Some(NODE));
        assert!(matches!(
            instruction.refresh().await,
            Err(air_core::Error::NotSupported(_))
        ));
    }

    #[tokio::test]
    async fn instructions_cannot_be_updated_or_deleted() {
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&server)
            .await;

        let api = AirApi::new(&server.uri()).unwrap();
        let mut instruction = api
            .node_instructions()
            .load(
                json!({
                    "id": "i1",
                    "node": NODE,
                    "instruction": "echo hello",
                    "state": "complete",
                    "created": "2030-01-01T00:00:00Z",
                    "modified": "2030-01-01T00:00:00Z"
                })
                .as_object()
                .unwrap()
                .clone(),
            )
            .unwrap();

        let err = instruction.update(Map::new()).await.unwrap_err();
        assert_eq!(
            err,
            Error::NotSupported("NodeInstruction does not support update".to_string())
        );
        let err = instruction.delete().await.unwrap_err();
        assert_eq!(
            err,
            Error::NotSupported("NodeInstruction does not support delete".to_string())
        );
        assert_eq!(instruction.pk().as_deref(), Some(NODE));
    }

    #[test]
    fn stub_exposes_its_node() {
        let api = AirApi::new("http://localhost").unwrap();
        let stub = Entity::stub(api, NodeInstruction::schema(), NODE.to_string());
        let node = stub.peek("node").unwrap().as_model().unwrap();
        assert!(!node.is_resolved());
        assert_eq!(node.pk().as_deref(), Some(NODE));
        assert_eq!(stub.pk().as_deref(), Some(NODE));
    }
}
