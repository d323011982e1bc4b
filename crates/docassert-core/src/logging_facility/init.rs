//! Subscriber installation for the assertion library
//!
//! Test suites call [`init`] once to see the `load_*`, `compare` and
//! `assert_*` events. `RUST_LOG` wins over the profile's default filter.

use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Output profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable lines through the test writer, debug and up
    Development,
    /// JSON lines for CI log collection, info and up
    Production,
    /// No output; events are read back through `init_test_capture()`
    Test,
}

impl Profile {
    /// Filter directive used when `RUST_LOG` is unset, `None` for `Test`
    pub fn default_directive(self) -> Option<&'static str> {
        match self {
            Profile::Development => Some("docassert_core=debug"),
            Profile::Production => Some("docassert_core=info"),
            Profile::Test => None,
        }
    }

    fn filter(self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.default_directive().unwrap_or("off")))
    }
}

static INIT_ONCE: Once = Once::new();

/// Install the global subscriber for `profile`.
///
/// Only the first call in a process has any effect, and it is a no-op when
/// another subscriber is already installed.
///
/// ```
/// use docassert_core::logging_facility::{init, Profile};
///
/// init(Profile::Development);
/// ```
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| {
        let builder = tracing_subscriber::fmt().with_env_filter(profile.filter());
        let _ = match profile {
            Profile::Development => builder.with_test_writer().finish().try_init(),
            Profile::Production => builder.json().finish().try_init(),
            Profile::Test => tracing_subscriber::registry().try_init(),
        };
    });
}
