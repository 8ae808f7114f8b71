//! Simulation workers.

use crate::mixins::{Endpoint, GetApi, ListApi};
use crate::model::{air_endpoint, air_model};
use crate::schema::{Fetch, FieldKind, FieldSpec, Identity, ModelSchema};
use crate::Result;
use air_core::{validate_response, ExpectedBody, QueryParams};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

static WORKER: ModelSchema = ModelSchema {
    name: "Worker",
    path: "workers",
    fields: &[
        FieldSpec::new("id", FieldKind::Str),
        FieldSpec::new("available", FieldKind::Bool),
        FieldSpec::new("capabilities", FieldKind::Str),
        FieldSpec::new(
            "contact",
            FieldKind::OneOf(&[
                FieldKind::Str,
                FieldKind::List(&FieldKind::Str),
                FieldKind::Dict,
            ]),
        ),
        FieldSpec::new("cpu", FieldKind::Int),
        FieldSpec::new("cpu_arch", FieldKind::Str),
        FieldSpec::new("created", FieldKind::DateTime),
        FieldSpec::new("fleet", FieldKind::Str),
        FieldSpec::new("fqdn", FieldKind::Str),
        FieldSpec::new("gpu", FieldKind::Int),
        FieldSpec::new("ip_address", FieldKind::Str),
        FieldSpec::new("memory", FieldKind::Int),
        FieldSpec::new("modified", FieldKind::DateTime),
        FieldSpec::new("port_range", FieldKind::Str),
        FieldSpec::new("registered", FieldKind::Bool),
        FieldSpec::new("storage", FieldKind::Int),
        FieldSpec::new("tunnel_port", FieldKind::Int),
        FieldSpec::new("vgpu", FieldKind::Int),
    ],
    identity: Identity::Field("id"),
    fetch: Fetch::Detail,
    post_load: None,
    supports: &[],
};

air_model!(
    /// A host that runs simulations.
    Worker,
    &WORKER
);

air_endpoint!(
    /// Workers endpoint. Also carries the calls a worker makes about itself.
    WorkerEndpoint,
    Worker
);

/// Body of [`WorkerEndpoint::update_inventory`]. Unset fields are not reported.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WorkerInventory {
    /// Airstrike agent version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airstrike_version: Option<String>,
    /// CPU architecture
    #[serde(skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,
    /// Docker version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docker: Option<String>,
    /// Kernel release
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kernel: Option<String>,
    /// libvirt version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub libvirt: Option<String>,
    /// Host operating system
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operating_system: Option<String>,
    /// Proxy container image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_image: Option<String>,
    /// Worker software version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_version: Option<String>,
}

impl WorkerEndpoint {
    /// Report that the calling worker is alive.
    ///
    /// # Errors
    ///
    /// Returns an error unless the API answers `200`.
    pub async fn heartbeat(&self) -> Result<()> {
        let url = self.api().url("workers/heartbeat");
        let res = self.api().get(&url, &QueryParams::new()).await?;
        validate_response(&res, 200, ExpectedBody::Ignore)?;
        debug!("worker heartbeat sent");
        Ok(())
    }

    /// Report the calling worker's software inventory.
    ///
    /// # Errors
    ///
    /// Returns an error unless the API answers `200`.
    pub async fn update_inventory(&self, inventory: &WorkerInventory) -> Result<()> {
        let url = self.api().url("workers/inventory");
        let payload = crate::encoder::to_payload(inventory)?;
        let res = self.api().put(&url, Value::Object(payload)).await?;
        validate_response(&res, 200, ExpectedBody::Ignore)
    }
}

impl ListApi for WorkerEndpoint {}

impl GetApi for WorkerEndpoint {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::AirApi;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn contact_accepts_several_shapes() {
        let api = AirApi::new("http://localhost").unwrap();
        let mut data = json!({
            "id": "w1",
            "available": true,
            "capabilities": "[\"x86\"]",
            "contact": {"email": "ops@nvidia.com"},
            "cpu": 64,
            "cpu_arch": "x86",
            "created": "2030-01-01T00:00:00Z",
            "fleet": "f1",
            "fqdn": "worker01.air.nvidia.com",
            "gpu": 0,
            "ip_address": "10.0.0.5",
            "memory": 262_144,
            "modified": "2030-01-01T00:00:00Z",
            "port_range": "10000-30000",
            "registered": true,
            "storage": 2048,
            "tunnel_port": 22,
            "vgpu": 0
        });
        let worker = api
            .workers()
            .load(data.as_object().cloned().unwrap())
            .unwrap();
        assert!(worker.peek("contact").unwrap().as_json().is_some());

        data["contact"] = json!(["ops@nvidia.com", "oncall@nvidia.com"]);
        let worker = api
            .workers()
            .load(data.as_object().cloned().unwrap())
            .unwrap();
        assert_eq!(worker.peek("contact").unwrap().as_list().unwrap().len(), 2);

        data["contact"] = json!(5);
        assert!(api.workers().load(data.as_object().cloned().unwrap()).is_err());
    }

    #[tokio::test]
    async fn inventory_omits_unset_fields() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/v2/workers/inventory/"))
            .and(body_json(json!({"kernel": "6.8.0", "worker_version": "1.2.3"})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v2/workers/heartbeat/"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let api = AirApi::new(&server.uri()).unwrap();
        let workers = api.workers();
        workers
            .update_inventory(&WorkerInventory {
                kernel: Some("6.8.0".to_string()),
                worker_version: Some("1.2.3".to_string()),
                ..WorkerInventory::default()
            })
            .await
            .unwrap();
        workers.heartbeat().await.unwrap();
    }
}
