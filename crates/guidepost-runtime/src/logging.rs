#![forbid(unsafe_code)]

//! Structured logging setup.
//!
//! The engine only emits `tracing` events; installing a subscriber is the
//! host's call. With the `tracing-json` feature, [`init_json_logging`]
//! installs a JSON formatter filtered by the `GUIDEPOST_LOG` environment
//! variable (same syntax as `RUST_LOG`, default `info`).
//!
//! Targets used by the engine:
//!
//! | target               | what                                      |
//! |----------------------|-------------------------------------------|
//! | `guidepost.tour`     | open/close, key commands                  |
//! | `guidepost.nav`      | index changes                             |
//! | `guidepost.pipeline` | show-step runs, hooks, failures           |
//! | `guidepost.scroll`   | scroll animations                         |
//! | `guidepost.watch`    | resize debounce, mutation observation     |
//! | `guidepost.geometry` | reducer dispatches                        |

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "GUIDEPOST_LOG";

/// Install a global JSON subscriber.
///
/// Returns an error if a global subscriber is already set.
#[cfg(feature = "tracing-json")]
pub fn init_json_logging() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
}
