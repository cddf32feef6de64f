use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/**
    Initialize console logging.

    `RUST_LOG` takes precedence; otherwise this crate logs at `info`,
    or `debug` when verbose.
*/
pub fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let default_directive = if verbose {
        "stirrproxy=debug,tower_http=debug,info"
    } else {
        "stirrproxy=info,warn"
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_level(true))
        .try_init()?;

    Ok(())
}
