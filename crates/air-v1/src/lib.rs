//! Lazy-loading v1 client for the Air network simulation API.
//!
//! Responses are decoded into [`AirModel`] entities whose relational fields stay
//! unresolved ([`LazyLoaded`], [`LazyLoadedList`]) until first accessed. Writes are
//! explicit: [`AirModel::set`] issues a single-field `PATCH` when the value changed,
//! [`AirModel::update`] replaces the whole object.
//!
//! ```no_run
//! use air_core::{Credentials, QueryParams};
//! use air_v1::AirApi;
//!
//! # async fn run() -> air_v1::Result<()> {
//! let api = AirApi::connect(
//!     "https://air.nvidia.com/api/",
//!     "v1",
//!     Credentials::bearer("token"),
//! )
//! .await?;
//! let mut sim = api.simulations().get("abc123", &QueryParams::new()).await?;
//! let topology = sim.get("topology").await?;
//! println!("{topology:?}");
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

pub mod api;
pub mod endpoint;
pub mod image;
pub mod kind;
pub mod lazy;
pub mod model;
pub mod service;
pub mod simulation;
pub mod simulation_node;
pub mod worker;

pub use api::AirApi;
pub use endpoint::ResourceApi;
pub use kind::ModelKind;
pub use lazy::{LazyLoaded, LazyLoadedList, ListItem};
pub use model::{AirModel, FieldValue};
pub use simulation_node::InstructionData;

/// Result alias reusing the shared Air error type.
pub type Result<T> = air_core::Result<T>;
