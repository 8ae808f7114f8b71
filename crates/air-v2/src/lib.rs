//! Schema-validated v2 client for the Air network simulation API.
//!
//! Every resource is described by a static [`ModelSchema`]; responses are checked against
//! it field by field and parsed into typed models such as [`Simulation`] or [`Node`].
//! Foreign keys that arrive as bare identifiers are held as stubs and fetched on first
//! access through [`Entity::get`] or [`Entity::related`].
//!
//! Endpoints expose their operations through capability traits ([`ListApi`],
//! [`CreateApi`], [`GetApi`], [`PutApi`], [`PatchApi`], [`DeleteApi`]); bring them into
//! scope with the [`prelude`].
//!
//! ```no_run
//! use air_core::{Credentials, QueryParams};
//! use air_v2::prelude::*;
//! use air_v2::{AirApi, NodeUpdate};
//!
//! # async fn run() -> air_v2::Result<()> {
//! let api = AirApi::connect("https://air.nvidia.com", Credentials::bearer("token")).await?;
//! let mut nodes = api.nodes().list(QueryParams::new());
//! while let Some(mut node) = nodes.try_next().await? {
//!     let update = NodeUpdate {
//!         name: Some("leaf01".to_string()),
//!         ..NodeUpdate::default()
//!     };
//!     node.update(&update).await?;
//! }
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

pub mod api;
pub mod encoder;
pub mod endpoints;
pub mod entity;
pub mod mixins;
pub mod model;
mod parser;
pub mod schema;
pub mod value;

pub use api::AirApi;
pub use encoder::{to_payload, Reference};
pub use endpoints::*;
pub use entity::Entity;
pub use mixins::{CreateApi, DeleteApi, Endpoint, GetApi, ListApi, Paginator, PatchApi, PutApi};
pub use model::AirModel;
pub use schema::{
    Capability, Fetch, FieldDefault, FieldKind, FieldMeta, FieldSpec, Identity, ModelSchema,
};
pub use value::FieldValue;

/// Capability traits needed to call endpoint operations.
pub mod prelude {
    pub use crate::mixins::{CreateApi, DeleteApi, Endpoint, GetApi, ListApi, PatchApi, PutApi};
    pub use crate::model::AirModel;
}

/// Result alias reusing the shared Air error type.
pub type Result<T> = air_core::Result<T>;
