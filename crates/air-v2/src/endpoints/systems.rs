//! Systems backing simulation nodes. Known by identifier only.

use crate::entity::fetch;
use crate::mixins::{Endpoint, GetApi};
use crate::model::{air_endpoint, air_model, AirModel};
use crate::schema::{Fetch, FieldKind, FieldSpec, Identity, ModelSchema};
use crate::Result;
use air_core::QueryParams;
use async_trait::async_trait;

static SYSTEM: ModelSchema = ModelSchema {
    name: "System",
    path: "systems",
    fields: &[FieldSpec::new("id", FieldKind::Str)],
    identity: Identity::Field("id"),
    fetch: Fetch::Synthetic,
    post_load: None,
    supports: &[],
};

air_model!(
    /// A system a node runs on.
    System,
    &SYSTEM
);

air_endpoint!(
    /// Systems endpoint.
    SystemEndpoint,
    System
);

#[async_trait]
impl GetApi for SystemEndpoint {
    async fn get(&self, pk: &str, _params: &QueryParams) -> Result<System> {
        fetch(self.api(), System::schema(), pk, None)
            .await
            .map(System::from)
    }
}
