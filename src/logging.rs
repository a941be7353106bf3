use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Directive used when `RUST_LOG` is not set.
pub fn default_directive(debug: bool) -> &'static str {
    if debug {
        "slotmachine=debug,slotmachine_client=debug,warn"
    } else {
        "warn"
    }
}

/// Initialize tracing for the command-line front end.
///
/// Logs go to stderr so stdout stays clean for `--json` output. Returns `false`
/// if a global subscriber was already installed.
pub fn init_tracing(debug: bool) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .compact();

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(target: "system", "Tracing initialized");
    }
    installed
}
