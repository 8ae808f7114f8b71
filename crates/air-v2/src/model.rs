//! Typed model wrappers.
//!
//! Every v2 resource is a newtype around [`Entity`] generated by `air_model!`. The wrapper
//! dereferences to the entity, so field access, refresh and delete are shared, while
//! resource-specific operations live on the wrapper.

use crate::entity::Entity;
use crate::schema::ModelSchema;
use std::fmt;

/// A typed v2 model.
pub trait AirModel: From<Entity> + fmt::Display + Send + Sync {
    /// Static schema of the model.
    fn schema() -> &'static ModelSchema;

    /// Borrow the underlying entity.
    fn entity(&self) -> &Entity;

    /// Mutably borrow the underlying entity.
    fn entity_mut(&mut self) -> &mut Entity;

    /// Unwrap the underlying entity.
    fn into_entity(self) -> Entity;
}

/// Declare a model newtype over [`Entity`] bound to a static schema.
macro_rules! air_model {
    ($(#[$meta:meta])* $name:ident, $schema:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name($crate::entity::Entity);

        impl $crate::model::AirModel for $name {
            fn schema() -> &'static $crate::schema::ModelSchema {
                $schema
            }

            fn entity(&self) -> &$crate::entity::Entity {
                &self.0
            }

            fn entity_mut(&mut self) -> &mut $crate::entity::Entity {
                &mut self.0
            }

            fn into_entity(self) -> $crate::entity::Entity {
                self.0
            }
        }

        impl From<$crate::entity::Entity> for $name {
            fn from(entity: $crate::entity::Entity) -> Self {
                Self(entity)
            }
        }

        impl std::ops::Deref for $name {
            type Target = $crate::entity::Entity;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl std::ops::DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

/// Declare an endpoint struct serving one model.
macro_rules! air_endpoint {
    ($(#[$meta:meta])* $name:ident, $model:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            api: $crate::api::AirApi,
        }

        impl $name {
            /// Endpoint bound to `api`.
            #[must_use]
            pub const fn new(api: $crate::api::AirApi) -> Self {
                Self { api }
            }
        }

        impl $crate::mixins::Endpoint for $name {
            type Model = $model;

            fn api(&self) -> &$crate::api::AirApi {
                &self.api
            }
        }
    };
}

pub(crate) use air_endpoint;
pub(crate) use air_model;
