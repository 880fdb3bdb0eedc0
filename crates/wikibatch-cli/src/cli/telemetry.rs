//! Log output for the binary.
//!
//! Events go to stderr so stdout carries nothing but the JSON result. The
//! filter comes from `RUST_LOG` and defaults to `info`; `RUST_LOG=wikibatch=debug`
//! shows cache hits and batch sizes, `trace` every request.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_telemetry() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
                .compact(),
        )
        .try_init()?;
    Ok(())
}
