pub mod concurrent;
pub mod config;
pub mod console;
pub mod error;
pub mod single;
pub mod validation;

pub use concurrent::run_concurrent;
pub use config::ProbeConfig;
pub use console::Console;
pub use error::ProbeError;
pub use single::run_single;

/// Install the stderr log subscriber; `RUST_LOG` overrides the default `info` filter
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
