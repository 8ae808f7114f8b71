//! Simulation node instructions and power actions.

use crate::endpoint::ResourceApi;
use crate::kind::ModelKind;
use crate::model::AirModel;
use crate::Result;
use air_core::{validate_response, Error, ExpectedBody, QueryParams};
use serde_json::{Map, Value};

/// Instruction payload: a single string or lines joined with `\n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstructionData {
    /// Raw instruction text
    Text(String),
    /// Lines sent newline-joined
    Lines(Vec<String>),
}

impl InstructionData {
    fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Lines(lines) => lines.join("\n"),
        }
    }
}

impl From<&str> for InstructionData {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for InstructionData {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<String>> for InstructionData {
    fn from(value: Vec<String>) -> Self {
        Self::Lines(value)
    }
}

impl From<Vec<&str>> for InstructionData {
    fn from(value: Vec<&str>) -> Self {
        Self::Lines(value.into_iter().map(str::to_string).collect())
    }
}

impl AirModel {
    fn instructions_url(&self) -> Result<String> {
        self.ensure_kind(&[ModelKind::SimulationNode], "instructions")?;
        Ok(format!("{}{}/instructions/", self.endpoint().url(), self.id()?))
    }

    /// Queue an instruction for the node's agent. Returns `{"id": <instruction id>}`.
    ///
    /// # Errors
    ///
    /// Fails unless the API answers `201` with a JSON string.
    pub async fn create_instructions(
        &self,
        executor: &str,
        data: impl Into<InstructionData>,
        extra: Map<String, Value>,
    ) -> Result<Value> {
        let url = self.instructions_url()?;
        let mut body = extra;
        body.insert("executor".to_string(), Value::String(executor.to_string()));
        body.insert("data".to_string(), Value::String(data.into().into_text()));
        let res = self.endpoint().client().post(&url, Value::Object(body)).await?;
        validate_response(&res, 201, ExpectedBody::Str)?;
        let id: String = res.json()?;
        let mut created = Map::new();
        created.insert("id".to_string(), Value::String(id));
        Ok(Value::Object(created))
    }

    /// Instructions queued for the node.
    ///
    /// # Errors
    ///
    /// Fails unless the API answers `200` with a JSON list.
    pub async fn list_instructions(&self, params: &QueryParams) -> Result<Vec<Self>> {
        let url = self.instructions_url()?;
        let res = self.endpoint().client().get(&url, params).await?;
        validate_response(&res, 200, ExpectedBody::Array)?;
        let scoped = ResourceApi::new(
            self.endpoint().client().clone(),
            ModelKind::NodeInstruction,
            url,
        );
        let items: Vec<Value> = res.json()?;
        items
            .into_iter()
            .map(|item| match item {
                Value::Object(payload) => Ok(scoped.load_model(payload)),
                _ => Err(Error::unexpected_response(res.status(), res.text())),
            })
            .collect()
    }

    /// Delete every instruction queued for the node.
    ///
    /// # Errors
    ///
    /// Fails unless the API answers `204`.
    pub async fn delete_instructions(&self) -> Result<()> {
        let url = self.instructions_url()?;
        let res = self.endpoint().client().delete(&url).await?;
        validate_response(&res, 204, ExpectedBody::Ignore)
    }

    /// Rebuild the node from its image.
    ///
    /// # Errors
    ///
    /// See [`AirModel::control`].
    pub async fn rebuild(&self, extra: Map<String, Value>) -> Result<Value> {
        self.ensure_kind(&[ModelKind::SimulationNode], "rebuild")?;
        self.control("rebuild", extra).await
    }

    /// Power-cycle the node.
    ///
    /// # Errors
    ///
    /// See [`AirModel::control`].
    pub async fn reset(&self, extra: Map<String, Value>) -> Result<Value> {
        self.ensure_kind(&[ModelKind::SimulationNode], "reset")?;
        self.control("reset", extra).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_are_newline_joined() {
        let data = InstructionData::from(vec!["line1", "line2"]);
        assert_eq!(data.into_text(), "line1\nline2");
        assert_eq!(InstructionData::from("echo").into_text(), "echo");
    }
}
