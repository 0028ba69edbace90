//! Profile source over HTTP
//!
//! Fetches `<base_url>/in/<username>` with the caller's session cookie and
//! hands back either the structured JSON payload or fragments extracted
//! from the HTML page.

mod client;
mod extract;

pub use client::HttpProfileSource;
pub use extract::extract_fragments;
