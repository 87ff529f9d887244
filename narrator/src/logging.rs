use tracing_subscriber::{EnvFilter, fmt};

/// Initialize logging to stderr, leaving stdout to the event stream.
///
/// `RUST_LOG` overrides the default `info` level.
///
/// ```
/// use narrator::init_logging;
///
/// init_logging();
/// ```
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
