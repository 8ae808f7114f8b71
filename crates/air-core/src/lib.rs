//! # air-core
//!
//! Core types and utilities shared by the Air SDK client generations.
//!
//! This crate provides the HTTP transport, response validation, error taxonomy and
//! configuration used by both the `air-v1` and `air-v2` crates.
//!
//! ## Modules
//!
//! - [`error`] - Error types and conversions
//! - [`config`] - Client configuration and defaults
//! - [`client`] - HTTP transport with bearer authentication and timeouts
//! - [`response`] - Response validation
//! - [`auth`] - Credentials accepted by the login flow
//! - [`query`] - Query parameter builder
//! - [`util`] - URL, datetime and log redaction helpers

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod query;
pub mod response;
pub mod util;

// Re-export commonly used types
pub use auth::Credentials;
pub use client::{HttpClient, RequestBody};
pub use config::AirClientConfig;
pub use error::{Error, Result};
pub use query::QueryParams;
pub use response::{validate_response, ExpectedBody, HttpResponse};
