//! # ProfileLink Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - The Redis `TimedStore` backend and backend selection
//! - The HTTP client and the HTTP profile source (JSON and HTML pages)
//! - Configuration loading and logging bootstrap
//! - [`ProfileLinkContext`], which wires everything together
//!
//! ## Architecture
//! - Implements traits defined in `profilelink-core` and
//!   `profilelink-common`
//! - Contains all "impure" code (network, environment, files)

pub mod config;
pub mod context;
pub mod errors;
pub mod http;
pub mod integrations;
pub mod observability;
pub mod store;

pub use context::ProfileLinkContext;
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use integrations::HttpProfileSource;
pub use store::{open_store, RedisStore};
