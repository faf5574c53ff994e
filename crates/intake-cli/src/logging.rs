//! Log output setup

use tracing_subscriber::EnvFilter;

/// Install the global subscriber
///
/// Filtering follows `RUST_LOG`, defaulting to `info`. Logs go to stderr so
/// command output on stdout stays machine-readable.
pub fn init(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = result {
        eprintln!("logging already initialized: {e}");
    }
}
