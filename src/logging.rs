//! Logging configuration for the wmiq CLI.
//!
//! Logs go to stderr so stdout carries only query results.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "wmiq=debug"
    } else {
        "warn"
    }
}

/// Initializes stderr logging.
///
/// `RUST_LOG` takes precedence over the `--verbose` default.
pub fn init_stderr_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    // A subscriber may already be set when embedded; keep it
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
    fn test_default_filter() {
        assert_eq!(default_filter(false), "warn");
        assert_eq!(default_filter(true), "wmiq=debug");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_stderr_logging(false);
        init_stderr_logging(true);
    }
}
