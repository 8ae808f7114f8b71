//! Lazy resolution, writes and lifecycle of v1 entities against a mock Air API.

use air_core::{Error, QueryParams};
use air_v1::{AirApi, FieldValue, ModelKind};
use serde_json::{json, Map, Value};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected a JSON object"),
    }
}

async fn mount_get(server: &MockServer, route: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(route.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn reference_resolves_once_and_is_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/topology/xyz/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "xyz", "name": "topo"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api = AirApi::new(&server.uri(), "v1").unwrap();
    let mut sim = api
        .simulations()
        .load_model(object(json!({"id": "abc", "topology": "xyz"})));
    assert!(sim.peek("topology").unwrap().as_reference().is_some());

    let topology = sim.get("topology").await.unwrap().as_model().unwrap();
    assert_eq!(topology.kind(), ModelKind::Topology);
    assert_eq!(topology.peek("name").unwrap().as_str(), Some("topo"));

    sim.get("topology").await.unwrap();
    assert!(sim.peek("topology").unwrap().as_model().is_some());
    assert_eq!(
        sim.json().unwrap(),
        r#"{"id":"abc","topology":"xyz"}"#
    );
}

#[tokio::test]
async fn set_patches_only_changed_values() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/simulation/abc/"))
        .and(body_json(json!({"title": "new"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "abc", "title": "new"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api = AirApi::new(&server.uri(), "v1").unwrap();
    let mut sim = api
        .simulations()
        .load_model(object(json!({"id": "abc", "title": "old"})));
    sim.set("title", "new").await.unwrap();
    sim.set("title", "new").await.unwrap();
    assert_eq!(sim.peek("title").unwrap().as_str(), Some("new"));
}

#[tokio::test]
async fn rejected_patch_keeps_local_value() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/simulation/abc/"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad title"))
        .mount(&server)
        .await;

    let api = AirApi::new(&server.uri(), "v1").unwrap();
    let mut sim = api
        .simulations()
        .load_model(object(json!({"id": "abc", "title": "old"})));
    let err = sim.set("title", "new").await.unwrap_err();
    assert_eq!(err.status_code(), Some(400));
    assert_eq!(sim.peek("title").unwrap().as_str(), Some("old"));
}

#[tokio::test]
async fn update_refreshes_merges_and_puts() {
    let server = MockServer::start().await;
    mount_get(
        &server,
        "/api/v1/topology/abc/",
        json!({"id": "abc", "name": "server", "links": ["l1"], "nodes": ["n1"]}),
    )
    .await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/topology/abc/"))
        .and(body_json(json!({"id": "abc", "name": "renamed"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "abc", "name": "renamed"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api = AirApi::new(&server.uri(), "v1").unwrap();
    let mut topology = api
        .topologies()
        .load_model(object(json!({"id": "abc", "name": "stale"})));
    topology
        .update(object(json!({"name": "renamed"})))
        .await
        .unwrap();
    assert_eq!(topology.peek("name").unwrap().as_str(), Some("renamed"));
    assert!(topology.peek("nodes").unwrap().as_list().is_some());
}

#[tokio::test]
async fn refresh_matches_fresh_get() {
    let server = MockServer::start().await;
    mount_get(
        &server,
        "/api/v1/node/abc/",
        json!({"id": "abc", "name": "leaf01", "topology": "t1"}),
    )
    .await;

    let api = AirApi::new(&server.uri(), "v1").unwrap();
    let fresh = api.nodes().get("abc", &QueryParams::new()).await.unwrap();
    let mut node = api
        .nodes()
        .load_model(object(json!({"id": "abc", "name": "old"})));
    node.refresh().await.unwrap();
    assert_eq!(node.json().unwrap(), fresh.json().unwrap());
}

#[tokio::test]
async fn delete_is_one_way() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/sshkey/abc/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let api = AirApi::new(&server.uri(), "v1").unwrap();
    let mut key = api.ssh_keys().load_model(object(json!({"id": "abc"})));
    key.delete().await.unwrap();
    assert!(key.is_deleted());
    assert!(matches!(key.peek("id"), Err(Error::ObjectDeleted(_))));
    let err = key.delete().await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "SshKey object has been deleted and should no longer be referenced"
    );
}

#[tokio::test]
async fn simulation_delete_destroys() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/simulation/abc/control/"))
        .and(body_json(json!({"action": "destroy"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "success"})))
        .expect(1)
        .mount(&server)
        .await;

    let api = AirApi::new(&server.uri(), "v1").unwrap();
    let mut sim = api.simulations().load_model(object(json!({"id": "abc"})));
    sim.delete().await.unwrap();
    assert!(sim.is_deleted());
}

#[tokio::test]
async fn simulation_start_sends_load() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/simulation/abc/control/"))
        .and(body_json(json!({"action": "load"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "success"})))
        .expect(1)
        .mount(&server)
        .await;

    let api = AirApi::new(&server.uri(), "v1").unwrap();
    let sim = api.simulations().load_model(object(json!({"id": "abc"})));
    let res = sim.start().await.unwrap();
    assert_eq!(res, json!({"result": "success"}));

    let node = api.nodes().load_model(object(json!({"id": "n1"})));
    assert!(matches!(node.start().await, Err(Error::NotSupported(_))));
}

#[tokio::test]
async fn node_instructions() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/simulation-node/n1/instructions/"))
        .and(body_json(json!({"executor": "shell", "data": "line1\nline2"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!("i1")))
        .expect(1)
        .mount(&server)
        .await;
    mount_get(
        &server,
        "/api/v1/simulation-node/n1/instructions/",
        json!([{"id": "i1", "node": "n1", "executor": "shell"}]),
    )
    .await;

    let api = AirApi::new(&server.uri(), "v1").unwrap();
    let node = api
        .simulation_nodes()
        .load_model(object(json!({"id": "n1"})));
    let created = node
        .create_instructions("shell", vec!["line1", "line2"], Map::new())
        .await
        .unwrap();
    assert_eq!(created, json!({"id": "i1"}));

    let instructions = node.list_instructions(&QueryParams::new()).await.unwrap();
    assert_eq!(instructions.len(), 1);
    let owner = instructions[0].peek("node").unwrap().as_reference().unwrap();
    assert_eq!(owner.target(), ModelKind::SimulationNode);
}

#[tokio::test]
async fn image_upload_failure_still_returns_image() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/image/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "img1"})))
        .expect(1)
        .mount(&server)
        .await;

    let api = AirApi::new(&server.uri(), "v1").unwrap();
    let image = api
        .images()
        .create(object(json!({
            "name": "cumulus",
            "organization": "org1",
            "filename": "/nonexistent/air-image.qcow2"
        })))
        .await
        .unwrap();
    assert_eq!(image.id().unwrap(), "img1");
}

#[tokio::test]
async fn service_create_resolves_node_interface() {
    let server = MockServer::start().await;
    mount_get(
        &server,
        "/api/v1/node/",
        json!([
            {"id": "n1", "name": "spine", "interfaces": ["i0"]},
            {"id": "n2", "name": "server", "interfaces": ["i1", "i2"]}
        ]),
    )
    .await;
    mount_get(&server, "/api/v1/interface/i1/", json!({"id": "i1", "name": "eth0"})).await;
    mount_get(&server, "/api/v1/interface/i2/", json!({"id": "i2", "name": "eth1"})).await;
    mount_get(
        &server,
        "/api/v1/simulation-interface/",
        json!([{"id": "si1", "original": "i1"}]),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/service/"))
        .and(body_json(json!({
            "name": "ssh", "simulation": "sim1", "interface": "si1", "dest_port": 22
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "svc1"})))
        .expect(1)
        .mount(&server)
        .await;

    let api = AirApi::new(&server.uri(), "v1").unwrap();
    let service = api
        .services()
        .create(object(json!({
            "name": "ssh", "simulation": "sim1", "interface": "server:eth0", "dest_port": 22
        })))
        .await
        .unwrap();
    assert_eq!(service.id().unwrap(), "svc1");
}

#[tokio::test]
async fn service_create_unknown_interface() {
    let server = MockServer::start().await;
    mount_get(&server, "/api/v1/node/", json!([])).await;

    let api = AirApi::new(&server.uri(), "v1").unwrap();
    let err = api
        .services()
        .create(object(json!({
            "name": "ssh", "simulation": "sim1", "interface": "server:eth0"
        })))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Interface server:eth0 does not exist");
}

#[tokio::test]
async fn worker_set_available() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/worker/w1/"))
        .and(body_json(json!({"available": true})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "w1", "available": true})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api = AirApi::new(&server.uri(), "v1").unwrap();
    let mut worker = api
        .workers()
        .load_model(object(json!({"id": "w1", "available": false})));
    worker.set_available(true).await.unwrap();
    assert_eq!(
        worker.peek("available").unwrap().as_json(),
        Some(&Value::Bool(true))
    );
    assert!(matches!(
        worker.peek("available"),
        Ok(FieldValue::Json(Value::Bool(true)))
    ));
}
