//! Resource budgets of accounts and organizations.

use crate::entity::fetch;
use crate::mixins::{Endpoint, GetApi};
use crate::model::{air_endpoint, air_model, AirModel};
use crate::schema::{Fetch, FieldKind, FieldSpec, Identity, ModelSchema};
use crate::Result;
use air_core::QueryParams;
use async_trait::async_trait;

const OPTIONAL_INT: FieldKind = FieldKind::Optional(&FieldKind::Int);

static RESOURCE_BUDGET: ModelSchema = ModelSchema {
    name: "ResourceBudget",
    path: "resource_budgets",
    fields: &[
        FieldSpec::new("id", FieldKind::Str),
        FieldSpec::new("cpu", OPTIONAL_INT),
        FieldSpec::new("cpu_used", OPTIONAL_INT),
        FieldSpec::new("image_uploads", OPTIONAL_INT),
        FieldSpec::new("image_uploads_used", OPTIONAL_INT),
        FieldSpec::new("memory", OPTIONAL_INT),
        FieldSpec::new("memory_used", OPTIONAL_INT),
        FieldSpec::new("simulations", OPTIONAL_INT),
        FieldSpec::new("simulations_used", OPTIONAL_INT),
        FieldSpec::new("storage", OPTIONAL_INT),
        FieldSpec::new("storage_used", OPTIONAL_INT),
        FieldSpec::new("userconfigs", OPTIONAL_INT),
        FieldSpec::new("userconfigs_used", OPTIONAL_INT),
    ],
    identity: Identity::Field("id"),
    fetch: Fetch::Synthetic,
    post_load: None,
    supports: &[],
};

air_model!(
    /// Quotas and current usage. Budgets have no detail endpoint; a budget referenced by
    /// identifier resolves to an object with every quota unset.
    ResourceBudget,
    &RESOURCE_BUDGET
);

air_endpoint!(
    /// Resource budgets endpoint.
    ResourceBudgetEndpoint,
    ResourceBudget
);

#[async_trait]
impl GetApi for ResourceBudgetEndpoint {
    async fn get(&self, pk: &str, _params: &QueryParams) -> Result<ResourceBudget> {
        fetch(self.api(), ResourceBudget::schema(), pk, None)
            .await
            .map(ResourceBudget::from)
    }
}
