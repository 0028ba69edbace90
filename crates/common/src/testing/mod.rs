//! Testing utilities and helpers
//!
//! - **[`mocks`]**: Mock implementations of the crate's seams
//!   ([`OAuthClientTrait`](crate::auth::OAuthClientTrait) and
//!   [`TimedStore`](crate::cache::TimedStore))
//! - Clock re-exports so downstream tests can drive TTLs deterministically
//!
//! ## Usage
//!
//! ```rust
//! use profilelink_common::testing::{MockClock, MockOAuthClient};
//!
//! let clock = MockClock::new();
//! clock.advance(std::time::Duration::from_secs(5));
//!
//! let oauth = MockOAuthClient::new();
//! assert_eq!(oauth.exchange_calls(), 0);
//! ```

pub mod mocks;

pub use mocks::{MockOAuthClient, MockStore};

pub use crate::time::{Clock, MockClock, SystemClock};
