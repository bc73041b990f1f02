//! Diagnostic logging for the `sigcli` tool. Library code only emits `tracing` events.

use tracing_subscriber::{EnvFilter, fmt, prelude::*, registry};

/// Default filter directive for the given verbosity flags. `RUST_LOG` takes precedence.
fn default_directive(verbose: bool, quiet: bool) -> &'static str {
    match (verbose, quiet) {
        (true, _) => "sigcli=debug",
        (false, true) => "error",
        (false, false) => "warn",
    }
}

/// Install a stderr subscriber. A second call is a no-op.
pub fn init(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .without_time();

    // already set by an embedding binary or an earlier call
    let _ = registry().with(filter).with(layer).try_init();
}
