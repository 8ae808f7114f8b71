//! Deferred references to other v1 entities.

use crate::api::AirApi;
use crate::kind::ModelKind;
use crate::model::AirModel;
use crate::Result;
use air_core::{Error, QueryParams};
use std::fmt;

/// An unresolved reference: the identifier of an entity and the variant it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LazyLoaded {
    id: String,
    target: ModelKind,
}

impl LazyLoaded {
    /// Create a reference to `target` entity `id`.
    #[must_use]
    pub fn new(id: impl Into<String>, target: ModelKind) -> Self {
        Self {
            id: id.into(),
            target,
        }
    }

    /// Identifier of the referenced entity.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Variant of the referenced entity.
    #[must_use]
    pub const fn target(&self) -> ModelKind {
        self.target
    }

    /// Fetch the referenced entity.
    ///
    /// # Errors
    ///
    /// Propagates any error from the detail request.
    pub async fn resolve(&self, api: &AirApi) -> Result<AirModel> {
        api.resource(self.target)
            .get(&self.id, &QueryParams::new())
            .await
    }
}

impl fmt::Display for LazyLoaded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<LazyLoaded {} {}>", self.target, self.id)
    }
}

/// One element of a [`LazyLoadedList`].
#[derive(Debug, Clone)]
pub enum ListItem {
    /// Not fetched yet
    Pending(LazyLoaded),
    /// Fetched and cached
    Loaded(AirModel),
}

impl ListItem {
    /// Identifier of the element, without resolving it.
    #[must_use]
    pub fn id(&self) -> Option<String> {
        match self {
            Self::Pending(reference) => Some(reference.id().to_string()),
            Self::Loaded(model) => model.raw_id(),
        }
    }

    /// The cached entity, if resolved.
    #[must_use]
    pub const fn as_model(&self) -> Option<&AirModel> {
        match self {
            Self::Loaded(model) => Some(model),
            Self::Pending(_) => None,
        }
    }
}

/// Ordered collection of references that resolve element by element.
///
/// Resolved elements are cached in place, both on indexed access and when the whole
/// list is resolved. [`LazyLoadedList::ids`] and [`LazyLoadedList::items`] never
/// trigger a request.
#[derive(Debug, Clone)]
pub struct LazyLoadedList {
    items: Vec<ListItem>,
    api: AirApi,
}

impl LazyLoadedList {
    /// Build a list of pending references.
    #[must_use]
    pub fn new(references: Vec<LazyLoaded>, api: AirApi) -> Self {
        Self {
            items: references.into_iter().map(ListItem::Pending).collect(),
            api,
        }
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the list has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Elements in their current state, without resolving anything.
    #[must_use]
    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    /// Identifiers of every element, without resolving anything.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        self.items.iter().filter_map(ListItem::id).collect()
    }

    /// Resolve element `index` if needed and return it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `index` is out of range, or the error of
    /// the resolving request.
    pub async fn get(&mut self, index: usize) -> Result<&AirModel> {
        let pending = match self.items.get(index) {
            Some(ListItem::Pending(reference)) => Some(reference.clone()),
            Some(ListItem::Loaded(_)) => None,
            None => {
                return Err(Error::InvalidArgument(format!(
                    "list index {index} out of range"
                )))
            }
        };
        if let Some(reference) = pending {
            let model = reference.resolve(&self.api).await?;
            self.items[index] = ListItem::Loaded(model);
        }
        match &self.items[index] {
            ListItem::Loaded(model) => Ok(model),
            ListItem::Pending(reference) => Err(Error::Air(format!(
                "{reference} could not be resolved"
            ))),
        }
    }

    /// Resolve every pending element, one request at a time, caching each in place.
    ///
    /// # Errors
    ///
    /// Stops at the first failing request; elements resolved before it stay cached.
    pub async fn resolve_all(&mut self) -> Result<Vec<&AirModel>> {
        for index in 0..self.items.len() {
            if let ListItem::Pending(reference) = &self.items[index] {
                let model = reference.resolve(&self.api).await?;
                self.items[index] = ListItem::Loaded(model);
            }
        }
        Ok(self.items.iter().filter_map(ListItem::as_model).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn references() -> Vec<LazyLoaded> {
        vec![
            LazyLoaded::new("abc", ModelKind::Interface),
            LazyLoaded::new("xyz", ModelKind::Interface),
        ]
    }

    #[test]
    fn display_names_target() {
        let reference = LazyLoaded::new("abc123", ModelKind::Topology);
        assert_eq!(reference.to_string(), "<LazyLoaded Topology abc123>");
    }

    #[tokio::test]
    async fn indexed_access_resolves_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/interface/abc/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": "abc", "name": "eth0"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let api = AirApi::new(&server.uri(), "v1").unwrap();
        let mut list = LazyLoadedList::new(references(), api);
        let first = list.get(0).await.unwrap();
        assert_eq!(first.raw_id().as_deref(), Some("abc"));
        list.get(0).await.unwrap();
        assert!(matches!(list.items()[0], ListItem::Loaded(_)));
        assert!(matches!(list.items()[1], ListItem::Pending(_)));
        assert_eq!(list.ids(), vec!["abc", "xyz"]);
    }

    #[tokio::test]
    async fn resolve_all_caches_in_place() {
        let server = MockServer::start().await;
        for id in ["abc", "xyz"] {
            Mock::given(method("GET"))
                .and(path(format!("/api/v1/interface/{id}/")))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": id})))
                .expect(1)
                .mount(&server)
                .await;
        }

        let api = AirApi::new(&server.uri(), "v1").unwrap();
        let mut list = LazyLoadedList::new(references(), api);
        assert_eq!(list.resolve_all().await.unwrap().len(), 2);
        assert_eq!(list.resolve_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn out_of_range_index() {
        let api = AirApi::new("http://localhost", "v1").unwrap();
        let mut list = LazyLoadedList::new(Vec::new(), api);
        assert!(list.is_empty());
        let err = list.get(3).await.unwrap_err();
        assert_eq!(err.error_code(), "INVALID_ARGUMENT");
    }
}
