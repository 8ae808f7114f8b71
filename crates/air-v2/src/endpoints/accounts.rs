//! Accounts. The API exposes no account detail endpoint, so accounts referenced by other
//! models are materialized from their identifier alone.

use crate::entity::fetch;
use crate::mixins::{Endpoint, GetApi};
use crate::model::{air_endpoint, air_model, AirModel};
use crate::schema::{Fetch, FieldKind, FieldSpec, Identity, ModelSchema};
use crate::Result;
use air_core::QueryParams;
use async_trait::async_trait;

static ACCOUNT: ModelSchema = ModelSchema {
    name: "Account",
    path: "accounts",
    fields: &[FieldSpec::new("id", FieldKind::Str)],
    identity: Identity::Field("id"),
    fetch: Fetch::Synthetic,
    post_load: None,
    supports: &[],
};

air_model!(
    /// An Air user account.
    Account,
    &ACCOUNT
);

air_endpoint!(
    /// Accounts endpoint.
    AccountEndpoint,
    Account
);

#[async_trait]
impl GetApi for AccountEndpoint {
    async fn get(&self, pk: &str, _params: &QueryParams) -> Result<Account> {
        fetch(self.api(), Account::schema(), pk, None)
            .await
            .map(Account::from)
    }
}
