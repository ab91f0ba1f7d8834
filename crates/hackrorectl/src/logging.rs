//! Logging setup for hackrorectl
//!
//! Diagnostics go to stderr so stdout stays clean for `--json`.
//! Filter priority: RUST_LOG, then --verbose, then logging.level.

use tracing_subscriber::EnvFilter;

pub fn filter_directive(config_level: &str, verbose: bool) -> String {
    if verbose {
        "debug".to_string()
    } else {
        config_level.to_string()
    }
}

/// Install the global subscriber. A second call is a no-op.
pub fn init(config_level: &str, verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter_directive(config_level, verbose)))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_wins_over_config() {
        assert_eq!(filter_directive("warn", true), "debug");
        assert_eq!(filter_directive("hackrore_common=info", false), "hackrore_common=info");
    }
}
