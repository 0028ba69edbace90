//! Shared test helpers for `profilelink-core` integration tests.
//!
//! These helpers provide reusable fixtures and lightweight mocks so that
//! flow and pipeline tests can focus on behaviour instead of boilerplate.

#![allow(dead_code)]

pub mod profile_source;

use chrono::{TimeZone, Utc};
use profilelink_common::time::MockClock;
use profilelink_domain::Credential;

/// Clock pinned to a whole-second instant so epoch-millis round trips are
/// exact.
pub fn fixed_clock() -> MockClock {
    MockClock::starting_at(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap())
}

pub fn credential() -> Credential {
    Credential::parse_session_cookie("li_at=AQEDAR-test; JSESSIONID=\"ajax:42\"").unwrap()
}

/// Structured payload captured from a real profile, trimmed to the fields we
/// read.
pub const STRUCTURED_PROFILE: &str = include_str!("../fixtures/structured_profile.json");
