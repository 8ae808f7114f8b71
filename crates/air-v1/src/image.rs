//! Image copy and upload.

use crate::kind::ModelKind;
use crate::model::AirModel;
use crate::Result;
use air_core::{validate_response, ExpectedBody, RequestBody};
use reqwest::Method;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::info;

impl AirModel {
    /// Copy the image into `organization`.
    ///
    /// # Errors
    ///
    /// Fails unless the API answers `201` with a JSON object.
    pub async fn copy(&self, organization: &str) -> Result<Self> {
        self.ensure_kind(&[ModelKind::Image], "copy")?;
        let url = format!("{}{}/copy/", self.endpoint().url(), self.id()?);
        let mut body = Map::new();
        body.insert(
            "organization".to_string(),
            Value::String(organization.to_string()),
        );
        let res = self.endpoint().client().post(&url, Value::Object(body)).await?;
        validate_response(&res, 201, ExpectedBody::Object)?;
        Ok(self.endpoint().load_model(res.json()?))
    }

    /// Upload the image file at `path`.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or unless the API answers `204`.
    pub async fn upload(&self, path: impl AsRef<Path>) -> Result<()> {
        self.ensure_kind(&[ModelKind::Image], "upload")?;
        let url = format!("{}{}/upload/", self.endpoint().url(), self.id()?);
        let bytes = tokio::fs::read(path.as_ref()).await?;
        info!(image = %self, size = bytes.len(), "uploading image");
        let res = self
            .endpoint()
            .client()
            .request(Method::PUT, &url, &[], RequestBody::Bytes(bytes))
            .await?;
        validate_response(&res, 204, ExpectedBody::Ignore)
    }
}
