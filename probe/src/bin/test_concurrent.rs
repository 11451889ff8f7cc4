use speech_probe::{init_tracing, run_concurrent, Console, ProbeConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = ProbeConfig::from_env()?;
    info!(
        "Load testing {} with {} requests, {} workers, timeout {}s",
        config.url(),
        config.request_count,
        config.workers(),
        config.concurrent_timeout_secs
    );

    let outcomes = run_concurrent(&config, &Console::stdout()).await?;
    info!(
        failed = outcomes.iter().filter(|o| !o.is_success()).count(),
        "concurrent probe finished"
    );
    Ok(())
}
