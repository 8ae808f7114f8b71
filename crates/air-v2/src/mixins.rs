//! Capability traits shared by v2 endpoints.
//!
//! Each resource endpoint implements [`Endpoint`] plus whichever of [`ListApi`],
//! [`CreateApi`], [`GetApi`], [`PutApi`], [`PatchApi`] and [`DeleteApi`] the API offers
//! for it. The default methods issue the request, check the status code and body shape,
//! and parse the response into the endpoint's model.

use crate::api::AirApi;
use crate::encoder::to_payload;
use crate::model::AirModel;
use crate::parser::load_entity;
use crate::Result;
use air_core::{validate_response, ExpectedBody, QueryParams};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::marker::PhantomData;
use tracing::debug;
use validator::Validate;

/// One page of a paginated list response.
#[derive(Debug, Deserialize)]
pub(crate) struct Page {
    pub(crate) count: u64,
    pub(crate) next: Option<String>,
    pub(crate) results: Vec<Map<String, Value>>,
}

/// Base of every v2 endpoint.
pub trait Endpoint: Send + Sync {
    /// Model served by the endpoint.
    type Model: AirModel;

    /// Client the endpoint issues requests through.
    fn api(&self) -> &AirApi;

    /// Collection URL.
    fn url(&self) -> String {
        <Self::Model as AirModel>::schema().url(self.api())
    }

    /// Parse a JSON object into the endpoint's model.
    ///
    /// # Errors
    ///
    /// Returns [`air_core::Error::ModelAttribute`] if the object does not match the model.
    fn load(&self, data: Map<String, Value>) -> Result<Self::Model> {
        load_entity(self.api(), <Self::Model as AirModel>::schema(), data).map(Self::Model::from)
    }
}

/// Lazy iterator over a paginated list.
///
/// Pages are requested one at a time as items are consumed. The `next` URL returned by
/// the API is followed verbatim. A paginator is finite and cannot be restarted; call
/// [`ListApi::list`] again for a fresh listing.
#[derive(Debug)]
pub struct Paginator<M> {
    api: AirApi,
    url: Option<String>,
    params: QueryParams,
    next: Option<String>,
    buffer: VecDeque<Map<String, Value>>,
    pages: usize,
    count: Option<u64>,
    scope: Option<String>,
    _model: PhantomData<fn() -> M>,
}

impl<M: AirModel> Paginator<M> {
    pub(crate) fn new(api: AirApi, url: String, params: QueryParams) -> Self {
        Self {
            api,
            url: Some(url),
            params,
            next: None,
            buffer: VecDeque::new(),
            pages: 0,
            count: None,
            scope: None,
            _model: PhantomData,
        }
    }

    /// Attach the owning object's primary key to every yielded entity.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Number of pages fetched so far.
    #[must_use]
    pub const fn pages_fetched(&self) -> usize {
        self.pages
    }

    /// Total item count reported by the last page, once a page has been fetched.
    #[must_use]
    pub const fn count(&self) -> Option<u64> {
        self.count
    }

    /// Yield the next model, fetching the next page when the current one is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if a page request fails or an item does not match the model.
    pub async fn try_next(&mut self) -> Result<Option<M>> {
        loop {
            if let Some(data) = self.buffer.pop_front() {
                let mut entity = load_entity(&self.api, M::schema(), data)?;
                if let Some(scope) = &self.scope {
                    entity.set_scope(scope.clone());
                }
                return Ok(Some(M::from(entity)));
            }

            let res = if let Some(url) = self.url.take() {
                self.api.get(&url, &self.params).await?
            } else if let Some(next) = self.next.take() {
                self.api.get(&next, &QueryParams::new()).await?
            } else {
                return Ok(None);
            };
            validate_response(&res, 200, ExpectedBody::Object)?;
            let page: Page = res.json()?;
            self.pages += 1;
            debug!(
                model = M::schema().name,
                page = self.pages,
                items = page.results.len(),
                "fetched page"
            );
            self.count = Some(page.count);
            self.next = page.next;
            self.buffer.extend(page.results);
        }
    }

    /// Drain every remaining page.
    ///
    /// # Errors
    ///
    /// See [`Paginator::try_next`].
    pub async fn collect_all(mut self) -> Result<Vec<M>> {
        let mut items = Vec::new();
        while let Some(item) = self.try_next().await? {
            items.push(item);
        }
        Ok(items)
    }
}

/// Paginated listing.
pub trait ListApi: Endpoint {
    /// List models matching `params`. `limit` defaults to the client's page size.
    fn list(&self, mut params: QueryParams) -> Paginator<Self::Model> {
        params.set_default("limit", self.api().page_size());
        Paginator::new(self.api().clone(), self.url(), params)
    }
}

/// Creation from a typed request.
#[async_trait]
pub trait CreateApi: Endpoint {
    /// Request body accepted by `create`.
    type Request: Serialize + Validate + Sync;

    /// Validate `request` locally, then `POST` it.
    ///
    /// # Errors
    ///
    /// Returns [`air_core::Error::Validation`] before any request if `request` is invalid,
    /// or an error unless the API answers `201` with an object.
    async fn create(&self, request: &Self::Request) -> Result<Self::Model> {
        request.validate()?;
        let payload = to_payload(request)?;
        let res = self.api().post(&self.url(), Value::Object(payload)).await?;
        validate_response(&res, 201, ExpectedBody::Object)?;
        self.load(res.json()?)
    }
}

/// Retrieval by primary key.
#[async_trait]
pub trait GetApi: Endpoint {
    /// `GET` one model.
    ///
    /// # Errors
    ///
    /// Returns an error unless the API answers `200` with an object.
    async fn get(&self, pk: &str, params: &QueryParams) -> Result<Self::Model> {
        let url = <Self::Model as AirModel>::schema().detail_url(self.api(), pk);
        let res = self.api().get(&url, params).await?;
        validate_response(&res, 200, ExpectedBody::Object)?;
        self.load(res.json()?)
    }
}

/// Full replacement by primary key.
#[async_trait]
pub trait PutApi: Endpoint {
    /// `PUT` a complete representation.
    ///
    /// # Errors
    ///
    /// Returns an error unless the API answers `200` with an object.
    async fn put(&self, pk: &str, payload: Map<String, Value>) -> Result<Self::Model> {
        let url = <Self::Model as AirModel>::schema().detail_url(self.api(), pk);
        let res = self.api().put(&url, Value::Object(payload)).await?;
        validate_response(&res, 200, ExpectedBody::Object)?;
        self.load(res.json()?)
    }
}

/// Partial update by primary key.
#[async_trait]
pub trait PatchApi: Endpoint {
    /// `PATCH` the given fields.
    ///
    /// # Errors
    ///
    /// Returns an error unless the API answers `200` with an object.
    async fn patch(&self, pk: &str, payload: Map<String, Value>) -> Result<Self::Model> {
        let url = <Self::Model as AirModel>::schema().detail_url(self.api(), pk);
        let res = self.api().patch(&url, Value::Object(payload)).await?;
        validate_response(&res, 200, ExpectedBody::Object)?;
        self.load(res.json()?)
    }
}

/// Deletion by primary key.
#[async_trait]
pub trait DeleteApi: Endpoint {
    /// `DELETE` one model.
    ///
    /// # Errors
    ///
    /// Returns an error unless the API answers `204`.
    async fn delete(&self, pk: &str) -> Result<()> {
        let url = <Self::Model as AirModel>::schema().detail_url(self.api(), pk);
        let res = self.api().delete(&url).await?;
        validate_response(&res, 204, ExpectedBody::Ignore)
    }
}
