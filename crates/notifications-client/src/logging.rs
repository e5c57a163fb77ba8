//! Log output for producers that do not install their own subscriber.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor an explicit directive is given.
pub const DEFAULT_LOG_FILTER: &str = "notifications_client=info";

/// Installs a global fmt subscriber.
///
/// `filter` takes precedence over `RUST_LOG`. Returns `false` if a global
/// subscriber was already set, in which case nothing changes.
pub fn init(filter: Option<&str>) -> bool {
    let filter = match filter {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init()
        .is_ok()
}
