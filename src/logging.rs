use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber used by the command line tool.
///
/// `RUST_LOG` overrides the default filter. Logs go to stderr so the PNG on
/// stdout stays clean.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("chartlayout=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
