//! Service creation helpers.

use crate::api::AirApi;
use crate::model::{AirModel, FieldValue};
use crate::Result;
use air_core::{Error, QueryParams};
use serde_json::{Map, Value};
use tracing::debug;

fn value_id(value: &Value) -> Option<String> {
    match value {
        Value::String(id) => Some(id.clone()),
        Value::Object(map) => map.get("id").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

/// Rewrite a `"node:interface"` service argument into a simulation interface ID.
pub(crate) async fn resolve_interface_argument(
    api: &AirApi,
    payload: &mut Map<String, Value>,
) -> Result<()> {
    let interface = match payload.get("interface") {
        Some(Value::String(interface)) if interface.contains(':') => interface.clone(),
        _ => return Ok(()),
    };
    let simulation = payload
        .get("simulation")
        .and_then(value_id)
        .ok_or_else(|| Error::ModelAttribute("Service.create requires simulation".to_string()))?;

    let resolved = resolve_interface(api, &interface, &simulation).await?;
    payload.insert("interface".to_string(), Value::String(resolved.id()?));
    Ok(())
}

/// Find the simulation interface behind `"node_name:interface_name"` in `simulation`.
///
/// Every node of the simulation is listed and its interfaces resolved one by one until
/// the named one is found.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] for a malformed argument or an unknown interface.
pub async fn resolve_interface(
    api: &AirApi,
    interface: &str,
    simulation: &str,
) -> Result<AirModel> {
    let (node_name, interface_name) = interface.split_once(':').ok_or_else(|| {
        Error::InvalidArgument(
            "`interface` must be an Interface object or in the format of \
             \"node_name:interface_name\""
                .to_string(),
        )
    })?;

    let mut params = QueryParams::new();
    params.push("simulation", simulation);
    let nodes = api.nodes().list(&params).await?;

    let mut original = None;
    for mut node in nodes {
        if node.peek("name").ok().and_then(FieldValue::as_str) != Some(node_name) {
            continue;
        }
        let Ok(interfaces) = node.list_mut("interfaces") else {
            continue;
        };
        original = interfaces
            .resolve_all()
            .await?
            .into_iter()
            .find(|candidate| {
                candidate.peek("name").ok().and_then(FieldValue::as_str) == Some(interface_name)
            })
            .and_then(|candidate| candidate.id().ok());
        if original.is_some() {
            break;
        }
    }
    let original = original
        .ok_or_else(|| Error::InvalidArgument(format!("Interface {interface} does not exist")))?;
    debug!(interface, original = %original, "resolved topology interface");

    let mut params = QueryParams::new();
    params.push("original", &original);
    params.push("simulation", simulation);
    api.simulation_interfaces()
        .list(&params)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| Error::UnexpectedResponse {
            status_code: None,
            message: format!("No simulation interface found for {interface}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn malformed_interface_argument() {
        let api = AirApi::new("http://localhost", "v1").unwrap();
        let err = resolve_interface(&api, "eth0", "abc123").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "`interface` must be an Interface object or in the format of \
             \"node_name:interface_name\""
        );
    }

    #[tokio::test]
    async fn plain_ids_are_left_alone() {
        let api = AirApi::new("http://localhost", "v1").unwrap();
        let mut payload = Map::new();
        payload.insert("interface".to_string(), Value::from("test123"));
        resolve_interface_argument(&api, &mut payload).await.unwrap();
        assert_eq!(payload["interface"], "test123");
    }
}
