//! Logging for the `undertaker` CLI.
//!
//! Events go to stderr so command output on stdout stays machine-readable.
//! The HTTP stack behind the email transport is kept at `warn` unless
//! tracing everything.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Crates whose events are only interesting when tracing.
const NOISY_TARGETS: &[&str] = &["reqwest", "hyper", "rustls"];

/// Verbosity level for logging output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Saved, sent and failed actions.
    #[default]
    Normal,
    /// Adds store and export details.
    Verbose,
    /// Everything, including the HTTP stack.
    Trace,
}

impl Verbosity {
    /// Level for events from this crate.
    #[must_use]
    pub fn to_level_filter(&self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    #[must_use]
    pub fn filter_directives(&self) -> String {
        let mut directives = format!("undertaker={}", self.to_level_filter());
        let dependencies = if *self == Self::Trace {
            Level::TRACE
        } else {
            Level::WARN
        };
        for target in NOISY_TARGETS {
            directives.push_str(&format!(",{target}={dependencies}"));
        }
        directives
    }

    /// Whether events carry their target and a timestamp.
    fn is_detailed(self) -> bool {
        matches!(self, Self::Verbose | Self::Trace)
    }
}

/// Install the stderr subscriber.
///
/// `RUST_LOG` wins over `verbosity` when set. Calling this twice is a no-op.
///
/// # Examples
///
/// ```no_run
/// use undertaker::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::Verbose);
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.filter_directives()));

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbosity.is_detailed())
        .with_file(false)
        .with_line_number(false);

    let registry = tracing_subscriber::registry().with(env_filter);
    let _ = if verbosity.is_detailed() {
        registry.with(layer).try_init()
    } else {
        registry.with(layer.without_time()).try_init()
    };
}

/// Route `warn` and above into the test harness output.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_to_level() {
        assert_eq!(Verbosity::Quiet.to_level_filter(), Level::ERROR);
        assert_eq!(Verbosity::Normal.to_level_filter(), Level::INFO);
        assert_eq!(Verbosity::Verbose.to_level_filter(), Level::DEBUG);
        assert_eq!(Verbosity::Trace.to_level_filter(), Level::TRACE);
    }

    #[test]
    fn test_filter_directives_quiet_http_stack() {
        assert_eq!(
            Verbosity::Normal.filter_directives(),
            "undertaker=INFO,reqwest=WARN,hyper=WARN,rustls=WARN"
        );
        assert_eq!(
            Verbosity::Trace.filter_directives(),
            "undertaker=TRACE,reqwest=TRACE,hyper=TRACE,rustls=TRACE"
        );
    }

    #[test]
    fn test_filter_directives_parse() {
        for verbosity in [
            Verbosity::Quiet,
            Verbosity::Normal,
            Verbosity::Verbose,
            Verbosity::Trace,
        ] {
            assert!(EnvFilter::try_new(verbosity.filter_directives()).is_ok());
        }
    }

    #[test]
    fn test_detail_follows_verbosity() {
        assert!(!Verbosity::Quiet.is_detailed());
        assert!(!Verbosity::Normal.is_detailed());
        assert!(Verbosity::Verbose.is_detailed());
        assert!(Verbosity::Trace.is_detailed());
    }

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging(Verbosity::Quiet);
        init_logging(Verbosity::Trace);
    }
}
