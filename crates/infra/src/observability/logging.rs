use std::sync::OnceLock;
use std::time::Duration;

use profilelink_domain::{LoggingSettings, ProfileLinkError};
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static INITIALISED: OnceLock<bool> = OnceLock::new();

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `settings.level`. Returns `false` when a subscriber
/// was already installed, by this function or by someone else; calling it
/// again is harmless.
pub fn init(settings: &LoggingSettings) -> bool {
    *INITIALISED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&settings.level))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let registry = tracing_subscriber::registry().with(filter);
        let installed = if settings.json {
            registry.with(tracing_subscriber::fmt::layer().json()).try_init()
        } else {
            registry.with(tracing_subscriber::fmt::layer().with_target(true)).try_init()
        };

        match installed {
            Ok(()) => {
                info!(level = %settings.level, json = settings.json, "logging initialised");
                true
            }
            Err(_) => false,
        }
    })
}

/// Stable label for an error, suitable for log fields.
#[inline]
pub fn error_label(error: &ProfileLinkError) -> &'static str {
    match error {
        ProfileLinkError::InvalidState => "invalid_state",
        ProfileLinkError::InvalidResponse(_) => "invalid_response",
        ProfileLinkError::Auth { .. } => "auth",
        ProfileLinkError::StoreUnavailable(_) => "store_unavailable",
        ProfileLinkError::EmptyProfile => "empty_profile",
        ProfileLinkError::FetchFailed(_) => "fetch_failed",
        ProfileLinkError::Timeout { .. } => "timeout",
        ProfileLinkError::Cancelled => "cancelled",
        ProfileLinkError::TokenConsumed => "token_consumed",
        ProfileLinkError::InvalidInput(_) => "invalid_input",
        ProfileLinkError::Config(_) => "config",
        ProfileLinkError::Internal(_) => "internal",
    }
}

/// Log the outcome of a logical operation with structured fields.
///
/// Caller mistakes and expected rejections log at `warn`; infrastructure
/// and internal failures log at `error`. `operation` must not carry
/// sensitive values.
pub fn log_operation<T>(
    operation: &str,
    elapsed: Duration,
    result: &Result<T, ProfileLinkError>,
) {
    let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

    match result {
        Ok(_) => info!(operation, duration_ms, "operation_success"),
        Err(err) if is_infrastructure_failure(err) => error!(
            operation,
            duration_ms,
            error_type = error_label(err),
            error = %err,
            detail = err.diagnostic(),
            "operation_failure"
        ),
        Err(err) => warn!(
            operation,
            duration_ms,
            error_type = error_label(err),
            error = %err,
            "operation_failure"
        ),
    }
}

fn is_infrastructure_failure(error: &ProfileLinkError) -> bool {
    matches!(
        error,
        ProfileLinkError::StoreUnavailable(_)
            | ProfileLinkError::Internal(_)
            | ProfileLinkError::Config(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        let settings = LoggingSettings::default();
        let first = init(&settings);
        let second = init(&settings);
        assert_eq!(first, second);
    }

    #[test]
    fn labels_are_stable() {
        assert_eq!(error_label(&ProfileLinkError::InvalidState), "invalid_state");
        assert_eq!(error_label(&ProfileLinkError::auth(429, "slow down")), "auth");
        assert_eq!(
            error_label(&ProfileLinkError::timeout("profile fetch", Duration::from_secs(1))),
            "timeout"
        );
        assert_eq!(error_label(&ProfileLinkError::TokenConsumed), "token_consumed");
    }

    #[test]
    fn infrastructure_failures_are_separated() {
        assert!(is_infrastructure_failure(&ProfileLinkError::StoreUnavailable("down".into())));
        assert!(!is_infrastructure_failure(&ProfileLinkError::EmptyProfile));
        assert!(!is_infrastructure_failure(&ProfileLinkError::auth(401, "")));
    }

    #[test]
    fn log_operation_accepts_any_outcome() {
        log_operation("get_profile", Duration::from_millis(3), &Ok::<_, ProfileLinkError>(()));
        log_operation::<()>(
            "get_profile",
            Duration::from_millis(3),
            &Err(ProfileLinkError::StoreUnavailable("down".into())),
        );
        log_operation::<()>("begin_auth", Duration::ZERO, &Err(ProfileLinkError::InvalidState));
    }

    #[test]
    fn log_operation_saturates_huge_durations() {
        log_operation("get_profile", Duration::MAX, &Ok::<_, ProfileLinkError>(()));
        log_operation::<()>("refresh_token", Duration::MAX, &Err(ProfileLinkError::Cancelled));
    }
}
