use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const LOG_ENV: &str = "DEPGRAPH_LOG";

/// Installs the global subscriber. `DEPGRAPH_LOG` takes precedence over the
/// verbosity flags.
pub fn init_tracing(verbose: u8, quiet: bool) {
    let default_level = match (quiet, verbose) {
        (true, _) => "depgraph=error",
        (false, 0) => "depgraph=warn",
        (false, 1) => "depgraph=info",
        (false, _) => "depgraph=debug",
    };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .try_init();
}
