use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber. Filtered by `RUST_LOG` (default `info`).
///
/// Output is JSON lines unless `LOG_FORMAT=pretty`, which is meant for a
/// local terminal. Later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let pretty = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("pretty"));
    let registry = tracing_subscriber::registry().with(filter);
    let _ = if pretty {
        registry.with(fmt::layer().pretty()).try_init()
    } else {
        registry.with(fmt::layer().json()).try_init()
    };
}
