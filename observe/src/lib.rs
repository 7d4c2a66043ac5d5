//! Subscriber setup for binaries. Libraries in this workspace only emit
//! events; installing a subscriber is the application's call.

use tracing_subscriber::EnvFilter;

/// Default directives when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,waymark_core=debug,waymark_runtime=debug";

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize a simple stdout tracing subscriber for development
pub fn init_stdout_tracing() {
    tracing_subscriber::fmt().with_env_filter(filter()).init();
}

/// Same as [`init_stdout_tracing`] but one JSON object per line, including
/// the `Intent` span fields.
pub fn init_json_tracing() {
    tracing_subscriber::fmt()
        .json()
        .with_current_span(true)
        .with_env_filter(filter())
        .init();
}

/// Non-panicking variant for tests and embedders that may already have a
/// global subscriber. Returns `false` if one was installed before.
pub fn try_init_stdout_tracing() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_test_writer()
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        assert!(DEFAULT_FILTER.parse::<EnvFilter>().is_ok());
    }

    #[test]
    fn test_second_init_is_reported() {
        let _ = try_init_stdout_tracing();
        assert!(!try_init_stdout_tracing());
        tracing::debug!("subscriber installed");
    }
}
