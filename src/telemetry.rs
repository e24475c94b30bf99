//! Telemetry initialization.
//!
//! Controlled by `BYLINE_LOG` (tracing filter syntax):
//! - unset → warnings only
//! - e.g. `BYLINE_LOG=debug` or `BYLINE_LOG=byline::stats=trace`
//!
//! `BYLINE_LOG_FORMAT=json` switches to JSON events on stderr for machine
//! consumption. All diagnostics go to stderr so stdout stays parseable.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber. Call once, from `main`.
pub fn init() {
    use tracing_subscriber::layer::SubscriberExt as _;
    use tracing_subscriber::util::SubscriberInitExt as _;

    let filter = EnvFilter::try_from_env("BYLINE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let json = std::env::var("BYLINE_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .init();
    }
}
