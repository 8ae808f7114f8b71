//! User configs: cloud-init user-data and meta-data documents.

use crate::encoder::Reference;
use crate::endpoints::accounts::Account;
use crate::endpoints::organizations::Organization;
use crate::endpoints::resource_budgets::ResourceBudget;
use crate::mixins::{CreateApi, DeleteApi, GetApi, ListApi, PatchApi, PutApi};
use crate::model::{air_endpoint, air_model, AirModel};
use crate::schema::{Capability, Fetch, FieldKind, FieldSpec, Identity, ModelSchema};
use crate::Result;
use serde::Serialize;
use serde_json::{Map, Value};
use validator::Validate;

static USER_CONFIG: ModelSchema = ModelSchema {
    name: "UserConfig",
    path: "userconfigs",
    fields: &[
        FieldSpec::new("id", FieldKind::Str),
        FieldSpec::new("name", FieldKind::Str),
        FieldSpec::new("kind", FieldKind::Str),
        FieldSpec::new("owner", FieldKind::Optional(&FieldKind::Model(Account::schema)))
            .foreign_key(),
        FieldSpec::new(
            "owner_budget",
            FieldKind::Optional(&FieldKind::Model(ResourceBudget::schema)),
        )
        .foreign_key(),
        FieldSpec::new(
            "organization",
            FieldKind::Optional(&FieldKind::Model(Organization::schema)),
        )
        .foreign_key(),
        FieldSpec::new(
            "organization_budget",
            FieldKind::Optional(&FieldKind::Model(ResourceBudget::schema)),
        )
        .foreign_key(),
        FieldSpec::new("content", FieldKind::Optional(&FieldKind::Str)).lazy(),
    ],
    identity: Identity::Field("id"),
    fetch: Fetch::Detail,
    post_load: None,
    supports: &[Capability::Patch, Capability::Put, Capability::Delete],
};

air_model!(
    /// A stored cloud-init document. List responses omit `content`; it is loaded from
    /// the detail endpoint on first access.
    UserConfig,
    &USER_CONFIG
);

air_endpoint!(
    /// User configs endpoint.
    UserConfigEndpoint,
    UserConfig
);

/// Body of [`UserConfigEndpoint::create`](CreateApi::create).
#[derive(Debug, Clone, Serialize, Validate)]
pub struct UserConfigCreate {
    /// Config name
    #[validate(length(min = 1))]
    pub name: String,
    /// `cloud-init-user-data` or `cloud-init-meta-data`
    #[validate(length(min = 1))]
    pub kind: String,
    /// Document body
    pub content: String,
    /// Owning organization; `None` for a personal config
    pub organization: Option<Reference>,
}

/// Body of [`UserConfig::update`]. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct UserConfigUpdate {
    /// New name
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1))]
    pub name: Option<String>,
    /// New document body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl UserConfig {
    /// Partially update the config.
    ///
    /// # Errors
    ///
    /// Returns [`air_core::Error::Validation`] before any request if `update` is invalid,
    /// or any request error.
    pub async fn update(&mut self, update: &UserConfigUpdate) -> Result<()> {
        self.entity_mut().update_from(update).await
    }

    /// Replace name and content, keeping ownership and kind (`PUT`).
    ///
    /// # Errors
    ///
    /// Returns any error of resolving the config or of the request.
    pub async fn full_update(&mut self, name: &str, content: &str) -> Result<()> {
        self.resolve().await?;
        let current = self.dict()?;
        let mut payload = Map::new();
        payload.insert("name".to_string(), Value::String(name.to_string()));
        payload.insert("content".to_string(), Value::String(content.to_string()));
        for key in [
            "owner",
            "owner_budget",
            "kind",
            "organization",
            "organization_budget",
        ] {
            payload.insert(
                key.to_string(),
                current.get(key).cloned().unwrap_or(Value::Null),
            );
        }
        self.entity_mut().full_update(payload).await
    }
}

impl ListApi for UserConfigEndpoint {}

impl CreateApi for UserConfigEndpoint {
    type Request = UserConfigCreate;
}

impl GetApi for UserConfigEndpoint {}

impl PatchApi for UserConfigEndpoint {}

impl PutApi for UserConfigEndpoint {}

impl DeleteApi for UserConfigEndpoint {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::AirApi;
    use crate::mixins::Endpoint;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ID: &str = "0f6bd8a3-1a3e-4c35-9d7a-5f0c4f1e2b77";
    const OWNER: &str = "3dadd54d-583c-432e-9383-a2b0b1d7f551";
    const BUDGET: &str = "9a1f7c2e-4b3d-4e5f-8a6b-7c8d9e0f1a2b";

    fn config(name: &str, content: Option<&str>) -> Map<String, Value> {
        let mut data = json!({
            "id": ID,
            "name": name,
            "kind": "cloud-init-user-data",
            "owner": OWNER,
            "owner_budget": BUDGET,
            "organization": null,
            "organization_budget": null
        });
        if let Some(content) = content {
            data["content"] = json!(content);
        }
        data.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn content_is_loaded_on_access() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/api/v2/userconfigs/{ID}/")))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(config("boot", Some("#cloud-config"))),
            )
            .expect(1)
            .mount(&server)
            .await;

        let api = AirApi::new(&server.uri()).unwrap();
        let mut user_config = api.user_configs().load(config("boot", None)).unwrap();
        assert!(!user_config.dict().unwrap().contains_key("content"));
        assert_eq!(
            user_config.get("content").await.unwrap().as_str(),
            Some("#cloud-config")
        );
        assert_eq!(
            user_config.get("content").await.unwrap().as_str(),
            Some("#cloud-config")
        );
    }

    #[tokio::test]
    async fn full_update_keeps_ownership() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(format!("/api/v2/userconfigs/{ID}/")))
            .and(body_json(json!({
                "name": "renamed",
                "content": "#cloud-config\n",
                "owner": OWNER,
                "owner_budget": BUDGET,
                "kind": "cloud-init-user-data",
                "organization": null,
                "organization_budget": null
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(config("renamed", Some("#cloud-config\n"))),
            )
            .expect(1)
            .mount(&server)
            .await;

        let api = AirApi::new(&server.uri()).unwrap();
        let mut user_config = api.user_configs().load(config("boot", None)).unwrap();
        user_config
            .full_update("renamed", "#cloud-config\n")
            .await
            .unwrap();
        assert_eq!(user_config.peek("name").unwrap().as_str(), Some("renamed"));
    }
}
