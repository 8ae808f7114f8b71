//! Links between interfaces.
//!
//! Links have no detail endpoint. They are listed per simulation and refreshed by listing
//! their simulation filtered by `ids`, so every loaded link remembers its simulation.

use crate::encoder::{to_payload, Reference};
use crate::endpoints::interfaces::Interface;
use crate::mixins::{Endpoint, Paginator};
use crate::model::{air_endpoint, air_model, AirModel};
use crate::schema::{Fetch, FieldKind, FieldSpec, Identity, ModelSchema};
use crate::Result;
use air_core::{validate_response, Error, ExpectedBody, QueryParams, RequestBody};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

static LINK: ModelSchema = ModelSchema {
    name: "Link",
    path: "simulations/nodes/interfaces/links",
    fields: &[
        FieldSpec::new("id", FieldKind::Str),
        FieldSpec::new(
            "simulation_interfaces",
            FieldKind::List(&FieldKind::Model(Interface::schema)),
        )
        .foreign_key(),
    ],
    identity: Identity::Field("id"),
    fetch: Fetch::ScopedList,
    post_load: None,
    supports: &[],
};

air_model!(
    /// A link joining simulation interfaces.
    Link,
    &LINK
);

air_endpoint!(
    /// Links endpoint.
    LinkEndpoint,
    Link
);

/// One link of [`LinkEndpoint::bulk_create`].
#[derive(Debug, Clone, Serialize)]
pub struct LinkSpec {
    /// Interfaces joined by the link
    pub simulation_interfaces: Vec<Reference>,
}

impl LinkSpec {
    /// Link joining `interfaces`.
    pub fn new<I, R>(interfaces: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Reference>,
    {
        Self {
            simulation_interfaces: interfaces.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Serialize)]
struct BulkCreate<'a> {
    simulation: &'a Reference,
    links: &'a [LinkSpec],
}

#[derive(Deserialize)]
struct BulkCreated {
    links: Vec<Map<String, Value>>,
}

#[derive(Deserialize)]
struct BulkDeleted {
    links_deleted: u64,
}

impl LinkEndpoint {
    /// List the links of `simulation`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `simulation` has no primary key.
    pub fn list(
        &self,
        simulation: impl Into<Reference>,
        mut params: QueryParams,
    ) -> Result<Paginator<Link>> {
        let simulation = simulation.into();
        let simulation = simulation.require_pk()?;
        params.push("simulation", simulation);
        params.set_default("limit", self.api().page_size());
        Ok(Paginator::new(self.api().clone(), self.url(), params).with_scope(simulation))
    }

    /// Create several links of `simulation` in one request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] before any request if `links` is empty, or an
    /// error unless the API answers `201`.
    pub async fn bulk_create(
        &self,
        simulation: impl Into<Reference>,
        links: &[LinkSpec],
    ) -> Result<Vec<Link>> {
        if links.is_empty() {
            return Err(Error::InvalidArgument(
                "links must be a non-empty list of dictionaries.".to_string(),
            ));
        }
        let simulation = simulation.into();
        let scope = simulation.require_pk()?.to_string();
        let payload = to_payload(&BulkCreate {
            simulation: &simulation,
            links,
        })?;
        let url = air_core::util::join_urls(&[&self.url(), "bulk-create"]);
        let res = self.api().post(&url, Value::Object(payload)).await?;
        validate_response(&res, 201, ExpectedBody::Object)?;
        let created: BulkCreated = res.json()?;
        debug!(simulation = %scope, links = created.links.len(), "bulk-created links");
        created
            .links
            .into_iter()
            .map(|data| {
                let mut link = self.load(data)?;
                link.set_scope(scope.clone());
                Ok(link)
            })
            .collect()
    }

    /// Delete links of `simulation`: the given ones, or all of them when `links` is
    /// `None`. Returns the number of deleted links.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] before any request if `links` is an empty
    /// slice, or an error unless the API answers `200`.
    pub async fn bulk_delete(
        &self,
        simulation: impl Into<Reference>,
        links: Option<&[Reference]>,
    ) -> Result<u64> {
        let simulation = simulation.into();
        let mut params = QueryParams::new();
        params.push("simulation", simulation.require_pk()?);
        if let Some(links) = links {
            if links.is_empty() {
                return Err(Error::InvalidArgument(
                    "If `links` is provided it must be a non-empty list.".to_string(),
                ));
            }
            let ids = links
                .iter()
                .map(Reference::require_pk)
                .collect::<Result<Vec<_>>>()?;
            params.push("ids", ids.join(","));
        }
        let url = air_core::util::join_urls(&[&self.url(), "bulk-delete"]);
        let res = self
            .api()
            .request(Method::DELETE, &url, params.pairs(), RequestBody::Empty)
            .await?;
        validate_response(&res, 200, ExpectedBody::Object)?;
        let deleted: BulkDeleted = res.json()?;
        Ok(deleted.links_deleted)
    }
}
