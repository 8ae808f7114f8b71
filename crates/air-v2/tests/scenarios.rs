//! End-to-end request flows against a mock Air API.

use air_core::{Error, QueryParams};
use air_v2::prelude::*;
use air_v2::{AirApi, FleetCreate, NodeUpdate, Simulation};
use serde_json::{json, Map, Value};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const NODE: &str = "5b7c1cf5-7a54-4e0a-9f55-2a8a4f3a7e01";
const SIMULATION: &str = "3dadd54d-583c-432e-9383-a2b0b1d7f551";

fn node(name: &str) -> Value {
    json!({
        "id": NODE,
        "name": name,
        "created": "2030-01-01T00:00:00Z",
        "modified": "2030-01-01T00:00:00Z",
        "simulation": SIMULATION,
        "os": null,
        "console_port": null,
        "serial_port": null,
        "state": "RUNNING",
        "memory": 1024,
        "storage": 10,
        "cpu": 1,
        "version": 3,
        "features": "{}",
        "simx_ipv4": null,
        "worker": null,
        "system": null,
        "boot_group": 50,
        "console_url": null,
        "console_username": null,
        "console_password": null,
        "metadata": null,
        "pos_x": 12.5,
        "pos_y": 0.0
    })
}

fn simulation(title: &str) -> Value {
    json!({
        "id": SIMULATION,
        "title": title,
        "state": "LOADED",
        "sleep": true,
        "owner": "tester@nvidia.com",
        "cloned": false,
        "expires": true,
        "created": "2030-01-01T00:00:00Z",
        "modified": "2030-01-01T00:00:00Z",
        "sleep_at": "2030-01-02T00:00:00Z",
        "expires_at": "2030-01-03T00:00:00Z",
        "organization": null,
        "preferred_worker": null,
        "documentation": null,
        "write_ok": true,
        "metadata": null
    })
}

#[tokio::test]
async fn fleet_create_returns_the_created_fleet() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/fleet/"))
        .and(body_json(json!({"name": "f1", "organization": "org-123"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "abc",
            "name": "f1",
            "organization": null,
            "prefix": "10.0.0.0",
            "prefix_length": 16,
            "gateway_ipv4": null,
            "port_range": "10000-30000",
            "container_ipv4_network": "172.16.0.0",
            "container_prefix": 12,
            "labels": [],
            "public": false,
            "workers": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = AirApi::new(&server.uri()).unwrap();
    let fleet = api
        .fleets()
        .create(&FleetCreate::new("f1", "org-123"))
        .await
        .unwrap();
    assert_eq!(fleet.pk().as_deref(), Some("abc"));
    assert_eq!(fleet.peek("name").unwrap().as_str(), Some("f1"));
}

#[tokio::test]
async fn missing_required_arguments_fail_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let api = AirApi::new(&server.uri()).unwrap();
    let err = api
        .fleets()
        .create(&FleetCreate::new("", "org-123"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn node_partial_update_applies_server_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/api/v2/simulations/nodes/{NODE}/")))
        .respond_with(ResponseTemplate::new(200).set_body_json(node("leaf01")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(format!("/api/v2/simulations/nodes/{NODE}/")))
        .and(body_json(json!({"name": "spine01"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(node("spine01")))
        .expect(1)
        .mount(&server)
        .await;

    let api = AirApi::new(&server.uri()).unwrap();
    let mut node = api.nodes().get(NODE, &QueryParams::new()).await.unwrap();
    node.update(&NodeUpdate {
        name: Some("spine01".to_string()),
        ..NodeUpdate::default()
    })
    .await
    .unwrap();
    assert_eq!(node.peek("name").unwrap().as_str(), Some("spine01"));
    assert_eq!(node.peek("pos_x").unwrap().as_f64(), Some(12.5));
}

#[tokio::test]
async fn foreign_keys_resolve_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/api/v2/simulations/nodes/{NODE}/")))
        .respond_with(ResponseTemplate::new(200).set_body_json(node("leaf01")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/api/v2/simulations/{SIMULATION}/")))
        .respond_with(ResponseTemplate::new(200).set_body_json(simulation("lab")))
        .expect(1)
        .mount(&server)
        .await;

    let api = AirApi::new(&server.uri()).unwrap();
    let mut node = api.nodes().get(NODE, &QueryParams::new()).await.unwrap();
    for _ in 0..2 {
        let sim = node.related("simulation").await.unwrap().unwrap();
        assert_eq!(sim.get("title").await.unwrap().as_str(), Some("lab"));
    }
    assert_eq!(node.dict().unwrap()["simulation"], json!(SIMULATION));
}

#[tokio::test]
async fn simulations_are_listed_with_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/simulations/"))
        .and(query_param("state", "LOADED"))
        .and(query_param("limit", "200"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "next": null,
            "previous": null,
            "results": [simulation("lab")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = AirApi::new(&server.uri()).unwrap();
    let mut params = QueryParams::new();
    params.push("state", "LOADED");
    let sims: Vec<Simulation> = api.simulations().list(params).collect_all().await.unwrap();
    assert_eq!(sims.len(), 1);
    assert_eq!(sims[0].peek("state").unwrap().as_str(), Some("LOADED"));
}

#[tokio::test]
async fn deleted_models_cannot_be_deleted_again() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(format!("/api/v2/simulations/{SIMULATION}/")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let api = AirApi::new(&server.uri()).unwrap();
    let mut sim = api
        .simulations()
        .load(simulation("lab").as_object().cloned().unwrap())
        .unwrap();
    sim.delete().await.unwrap();
    assert!(sim.pk().is_none());
    let err = sim.delete().await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "The Simulation cannot be deleted: primary key is `None`."
    );
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected a JSON object"),
    }
}

#[test]
fn loaded_models_survive_a_json_round_trip() {
    let api = AirApi::new("http://localhost").unwrap();

    let mut data = node("leaf01");
    data["created"] = json!("2030-01-01T02:00:00+02:00");
    let node = api.nodes().load(object(data)).unwrap();
    let dict = node.dict().unwrap();
    assert_eq!(dict["created"], json!("2030-01-01T00:00:00Z"));
    assert_eq!(dict["simulation"], json!(SIMULATION));
    assert_eq!(dict["pos_x"], json!(12.5));

    let reloaded = api.nodes().load(dict.clone()).unwrap();
    assert_eq!(reloaded.entity(), node.entity());
    assert_eq!(reloaded.dict().unwrap(), dict);

    let fleet = api
        .fleets()
        .load(object(json!({
            "id": "abc",
            "name": "f1",
            "organization": null,
            "prefix": "10.0.0.0",
            "prefix_length": 16,
            "gateway_ipv4": null,
            "port_range": "10000-30000",
            "container_ipv4_network": "172.16.0.0",
            "container_prefix": 12,
            "labels": ["lab"],
            "public": false,
            "workers": [{
                "id": "w1",
                "url": "https://worker01.air.nvidia.com",
                "cpu": 64,
                "memory": 262_144,
                "storage": 2048,
                "ip_address": "10.0.0.5",
                "port_range": "10000-30000",
                "region": "us-west",
                "available": true,
                "fqdn": "worker01.air.nvidia.com",
                "fleet": "abc",
                "contact": ["ops@nvidia.com"],
                "capabilities": "[]",
                "cpu_arch": "x86"
            }]
        })))
        .unwrap();
    let dict = fleet.dict().unwrap();
    let reloaded = api.fleets().load(dict.clone()).unwrap();
    assert_eq!(reloaded.entity(), fleet.entity());
    assert_eq!(reloaded.dict().unwrap(), dict);
    assert_eq!(dict["workers"][0]["contact"], json!(["ops@nvidia.com"]));
}
