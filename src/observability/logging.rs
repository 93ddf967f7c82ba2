//! Structured logging.
//!
//! # Responsibilities
//! - Install a `tracing` subscriber for callers that have none
//!
//! # Design Decisions
//! - Uses the tracing crate for structured logging throughout
//! - `RUST_LOG` wins over the configured level
//! - Initialization is idempotent; a second call leaves the first subscriber

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::InterceptConfig;

/// Install the global subscriber. Returns false when one already exists.
pub fn init_logging(level: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(level = %level, "Logging initialized");
    }
    installed
}

/// Install the global subscriber at the level named by `[observability]`.
pub fn init_logging_from(config: &InterceptConfig) -> bool {
    init_logging(&config.observability.log_level)
}

fn default_directives(level: &str) -> String {
    let level = level.to_ascii_lowercase();
    format!("page_intercept={level},tower_http={level}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        let _ = init_logging("debug");
        assert!(!init_logging("info"));
        assert!(!init_logging_from(&InterceptConfig::default()));
    }

    #[test]
    fn test_default_directives_follow_configured_level() {
        let mut config = InterceptConfig::default();
        config.observability.log_level = "WARN".into();
        assert_eq!(
            default_directives(&config.observability.log_level),
            "page_intercept=warn,tower_http=warn"
        );
        assert!(EnvFilter::try_new(default_directives("trace")).is_ok());
    }
}
