//! Simulation lifecycle actions.

use crate::kind::ModelKind;
use crate::model::AirModel;
use crate::Result;
use air_core::{validate_response, Error, ExpectedBody};
use serde_json::{Map, Value};

impl AirModel {
    /// Send a control action (`load`, `store`, `destroy`, `rebuild`, ...) to a
    /// simulation or simulation node. `extra` is merged into the request body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSupported`] for other variants, or fails unless the API
    /// answers `200` with a JSON object.
    pub async fn control(&self, action: &str, extra: Map<String, Value>) -> Result<Value> {
        self.ensure_kind(
            &[ModelKind::Simulation, ModelKind::SimulationNode],
            "control actions",
        )?;
        let mut body = extra;
        body.insert("action".to_string(), Value::String(action.to_string()));
        let url = format!("{}{}/control/", self.endpoint().url(), self.id()?);
        let res = self.endpoint().client().post(&url, Value::Object(body)).await?;
        validate_response(&res, 200, ExpectedBody::Object)?;
        res.json_value()
    }

    /// Start (load) the simulation.
    ///
    /// # Errors
    ///
    /// See [`AirModel::control`].
    pub async fn start(&self) -> Result<Value> {
        self.ensure_kind(&[ModelKind::Simulation], "start")?;
        self.control("load", Map::new()).await
    }

    /// Store (stop and save) the simulation.
    ///
    /// # Errors
    ///
    /// See [`AirModel::control`].
    pub async fn store(&self) -> Result<Value> {
        self.ensure_kind(&[ModelKind::Simulation], "store")?;
        self.control("store", Map::new()).await
    }

    /// Destroy the simulation.
    ///
    /// # Errors
    ///
    /// See [`AirModel::control`].
    pub async fn destroy(&self) -> Result<Value> {
        self.ensure_kind(&[ModelKind::Simulation], "destroy")?;
        self.control("destroy", Map::new()).await
    }

    /// Duplicate the simulation, returning the copy and the raw control response.
    ///
    /// # Errors
    ///
    /// Fails if the control request fails or the response carries no `simulation`.
    pub async fn duplicate(&self, extra: Map<String, Value>) -> Result<(Self, Value)> {
        self.ensure_kind(&[ModelKind::Simulation], "duplicate")?;
        let res = self.control("duplicate", extra).await?;
        match res.get("simulation") {
            Some(Value::Object(payload)) => {
                let copy = self.endpoint().load_model(payload.clone());
                Ok((copy, res))
            }
            _ => Err(Error::UnexpectedResponse {
                status_code: Some(200),
                message: format!(
                    "Received an unexpected response from the Air API (200): {res}"
                ),
            }),
        }
    }

    /// Create a service forwarding `dest_port` on `interface` of this simulation.
    ///
    /// `interface` is a simulation interface ID or `"node:interface"`.
    ///
    /// # Errors
    ///
    /// See [`crate::ResourceApi::create`].
    pub async fn create_service(
        &self,
        name: &str,
        interface: &str,
        dest_port: u16,
        extra: Map<String, Value>,
    ) -> Result<Self> {
        self.ensure_kind(&[ModelKind::Simulation], "services")?;
        let mut payload = extra;
        payload.insert("simulation".to_string(), Value::String(self.id()?));
        payload.insert("name".to_string(), Value::String(name.to_string()));
        payload.insert("interface".to_string(), Value::String(interface.to_string()));
        payload.insert("dest_port".to_string(), Value::from(dest_port));
        self.endpoint().client().services().create(payload).await
    }
}
