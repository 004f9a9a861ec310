use tracing_subscriber::EnvFilter;

/// Diagnostics go to stderr. `RUST_LOG` wins when set; otherwise `info`,
/// or `debug` for this crate with `-v`.
pub fn init(verbose: bool) {
    let default = if verbose { "info,cardex=debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // a second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
