use std::io;

use tracing_subscriber::EnvFilter;

/// Installs the stderr subscriber. `RUST_LOG` is honoured unless `verbose`
/// forces debug output; otherwise only warnings are shown.
pub fn init(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}
