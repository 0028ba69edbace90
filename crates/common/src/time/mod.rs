//! Time abstraction for testability
//!
//! Store backends, the OAuth flow and the profile cache all read time through
//! [`Clock`] so TTL expiry and token liveness can be exercised with
//! [`MockClock`] instead of sleeping.

mod clock;

pub use clock::{Clock, MockClock, SystemClock};
