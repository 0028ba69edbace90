//! Configuration loading
//!
//! Reads [`profilelink_domain::Config`] from the environment or from a
//! JSON/TOML file and validates it before handing it out.

pub mod loader;

pub use loader::{load, load_from_env, load_from_file, probe_config_paths};
