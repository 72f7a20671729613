use tracing_subscriber::EnvFilter;

/// Diagnostics go to stderr so they never mix with the rendered line.
///
/// `--debug` turns on this crate's debug output; otherwise `RUST_LOG` decides,
/// and with neither set nothing is emitted.
pub fn init_logging(debug: bool) {
    let filter = if debug {
        Some(EnvFilter::new("pace_statusline=debug"))
    } else {
        EnvFilter::try_from_default_env().ok()
    };
    let Some(filter) = filter else {
        return;
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
