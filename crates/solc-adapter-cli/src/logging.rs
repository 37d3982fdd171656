//! Tracing subscriber setup.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static TRACING_INIT: Once = Once::new();

/// Installs a stderr subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `verbose` selects `debug` and the
/// default is `info`. Safe to call multiple times.
pub fn init(verbose: bool) {
    TRACING_INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(if verbose {
                "solc_adapter=debug,solc_adapter_cli=debug"
            } else {
                "info"
            })
        });

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(verbose)
                    .with_level(true),
            )
            .with(filter)
            .init();
    });
}
