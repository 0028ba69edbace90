//! Key/value storage with per-key expiry.
//!
//! One [`TimedStore`] instance backs two unrelated concerns: short-lived
//! security state (PKCE verifiers, refresh-token rotation claims) and the
//! profile cache. Callers keep them apart by key namespace.
//!
//! # Contract
//!
//! - Every operation is atomic per key.
//! - [`TimedStore::take`] reads and deletes in one indivisible step, so two
//!   concurrent consumers of the same key cannot both observe the value.
//! - Backend failures surface as [`StoreError`], never as a silent miss.
//!   Whether a failure degrades to a miss is the caller's decision.
//!
//! # Backends
//!
//! - [`MemoryStore`]: in-process, clock-injectable, used in tests and single
//!   instance deployments.
//! - A Redis backend lives in `profilelink-infra`.

mod memory;
mod stats;
mod store;
mod typed;

pub use memory::MemoryStore;
pub use stats::StoreStats;
pub use store::{StoreError, StoreHealth, StoreResult, TimedStore};
pub use typed::TypedStore;
