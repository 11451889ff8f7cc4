use speech_probe::{init_tracing, run_single, Console, ProbeConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = ProbeConfig::from_env()?;
    info!("Probing {} (timeout {}s)", config.url(), config.single_timeout_secs);

    let result = run_single(&config, &Console::stdout()).await?;
    info!(state = ?result.state(), "single probe finished");
    Ok(())
}
