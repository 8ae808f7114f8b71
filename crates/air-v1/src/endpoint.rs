//! Generic v1 resource endpoint.

use crate::api::AirApi;
use crate::kind::ModelKind;
use crate::model::AirModel;
use crate::Result;
use air_core::{validate_response, Error, ExpectedBody, QueryParams};
use serde_json::{Map, Value};
use tracing::warn;

/// Endpoint for one resource variant: `get`, `list` and `create`.
#[derive(Debug, Clone)]
pub struct ResourceApi {
    client: AirApi,
    kind: ModelKind,
    url: String,
}

impl ResourceApi {
    /// Endpoint for `kind` rooted at `url` (with trailing slash).
    #[must_use]
    pub fn new(client: AirApi, kind: ModelKind, url: impl Into<String>) -> Self {
        Self {
            client,
            kind,
            url: url.into(),
        }
    }

    /// Variant served by this endpoint.
    #[must_use]
    pub const fn kind(&self) -> ModelKind {
        self.kind
    }

    /// Collection URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Client the endpoint issues requests through.
    #[must_use]
    pub const fn client(&self) -> &AirApi {
        &self.client
    }

    /// Wrap a JSON object into an entity bound to this endpoint.
    #[must_use]
    pub fn load_model(&self, payload: Map<String, Value>) -> AirModel {
        AirModel::from_payload(self.clone(), payload)
    }

    /// Fetch one entity.
    ///
    /// # Errors
    ///
    /// Fails unless the API answers `200` with a JSON object.
    pub async fn get(&self, id: &str, params: &QueryParams) -> Result<AirModel> {
        let url = format!("{}{id}/", self.url);
        let res = self.client.get(&url, params).await?;
        validate_response(&res, 200, ExpectedBody::Object)?;
        Ok(self.load_model(res.json()?))
    }

    /// List entities matching `params`.
    ///
    /// Fleets are served paginated; only the first page's `results` are returned.
    ///
    /// # Errors
    ///
    /// Fails unless the API answers `200` with the expected body shape.
    pub async fn list(&self, params: &QueryParams) -> Result<Vec<AirModel>> {
        let res = self.client.get(&self.url, params).await?;
        let items: Vec<Value> = if self.kind == ModelKind::Fleet {
            validate_response(&res, 200, ExpectedBody::Object)?;
            let mut page: Map<String, Value> = res.json()?;
            match page.remove("results") {
                Some(Value::Array(results)) => results,
                _ => return Err(Error::unexpected_response(res.status(), res.text())),
            }
        } else {
            validate_response(&res, 200, ExpectedBody::Array)?;
            res.json()?
        };

        items
            .into_iter()
            .map(|item| match item {
                Value::Object(map) => Ok(self.load_model(map)),
                _ => Err(Error::unexpected_response(res.status(), res.text())),
            })
            .collect()
    }

    /// Create an entity.
    ///
    /// Required keys are checked before any request. A service `interface` given as
    /// `"node:interface"` is resolved to a simulation interface first. An image
    /// `filename` is uploaded after creation; an upload failure is logged and the
    /// created image is still returned.
    ///
    /// # Errors
    ///
    /// Fails on missing keys or unless the API answers `201` with a JSON object.
    pub async fn create(&self, mut payload: Map<String, Value>) -> Result<AirModel> {
        self.kind.check_create_payload(&payload)?;
        if self.kind == ModelKind::Service {
            crate::service::resolve_interface_argument(&self.client, &mut payload).await?;
        }
        let filename = payload
            .get("filename")
            .and_then(Value::as_str)
            .map(str::to_string);

        let res = self.client.post(&self.url, Value::Object(payload)).await?;
        validate_response(&res, 201, ExpectedBody::Object)?;
        let model = self.load_model(res.json()?);

        if let (ModelKind::Image, Some(filename)) = (self.kind, filename) {
            if let Err(err) = model.upload(&filename).await {
                warn!(
                    image = %model,
                    filename = %filename,
                    error = %err,
                    "image created but upload failed"
                );
            }
        }
        Ok(model)
    }
}
