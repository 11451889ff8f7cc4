//! Single-request streaming probe.
//!
//! Sends one request, prints every chunk as it arrives and a summary once
//! the stream is exhausted. The first failure ends the run; there are no
//! retries.

use std::time::Instant;

use speech_core::{ChunkTracker, ProbeResult, StreamSummary};
use stream_client::{ClientError, ClientOptions, StreamClient};
use tracing::{info, warn};

use crate::config::ProbeConfig;
use crate::console::Console;
use crate::error::{client_error_result, ProbeError};
use crate::validation::validate_config;

/// Run the single-request probe.
///
/// `Err` only for an invalid configuration; a failed request is reported on
/// the console and returned as its `ProbeResult`.
pub async fn run_single(config: &ProbeConfig, console: &Console) -> Result<ProbeResult, ProbeError> {
    validate_config(config)?;

    console.line(format!("🚀 Connecting to {}...", config.url()));
    console.line(format!("📋 Payload: {}", config.payload.to_pretty_json()));

    let client = match StreamClient::new(
        &config.base_url(),
        ClientOptions {
            timeout: config.single_timeout(),
        },
    ) {
        Ok(client) => client,
        Err(e) => return Ok(report_failure(console, config, e)),
    };

    let started = Instant::now();
    let mut stream = match client.open(&config.payload).await {
        Ok(stream) => {
            console.line(format!("📡 Status Code: {}", stream.status()));
            stream
        }
        Err(ClientError::Status { status, body }) => {
            console.line(format!("📡 Status Code: {status}"));
            console.line(format!("❌ Error: {body}"));
            warn!(status, "speech endpoint rejected the request");
            return Ok(ProbeResult::HttpError { status });
        }
        Err(e) => return Ok(report_failure(console, config, e)),
    };

    console.line("🎧 Receiving stream...");
    let mut tracker = ChunkTracker::new(started);
    loop {
        match stream.next_chunk().await {
            Ok(Some(chunk)) => {
                let Some(event) = tracker.record(chunk.len(), Instant::now()) else {
                    continue;
                };
                if event.first {
                    console.line(format!(
                        "⚡️ Time to First Byte (Latency): {:.2} ms",
                        event.elapsed.as_secs_f64() * 1000.0
                    ));
                }
                console.line(format!(
                    "   📦 Chunk {}: {} bytes (T+{:.2}s)",
                    event.index,
                    event.size,
                    event.elapsed.as_secs_f64()
                ));
            }
            Ok(None) => break,
            Err(e) => return Ok(report_failure(console, config, e)),
        }
    }

    let summary = tracker.finish(Instant::now());
    info!(
        request_id = stream.request_id(),
        bytes = summary.bytes,
        chunks = summary.chunks,
        "stream complete"
    );
    print_summary(console, &summary);

    Ok(ProbeResult::Success { summary })
}

fn print_summary(console: &Console, summary: &StreamSummary) {
    console.line("");
    console.line("✅ Stream Complete!");
    console.line("📊 Summary:");
    console.line(format!("   - Total Time: {:.2}s", summary.total.as_secs_f64()));
    console.line(format!("   - Total Size: {} bytes", summary.bytes));
    console.line(format!("   - Chunks: {}", summary.chunks));
    if let Some(avg) = summary.avg_chunk_size() {
        console.line(format!("   - Avg Chunk Size: {avg:.1} bytes"));
    }
}

fn report_failure(console: &Console, config: &ProbeConfig, err: ClientError) -> ProbeResult {
    warn!(error = %err, "single probe failed");
    console.line("");
    match &err {
        ClientError::Connect { .. } => {
            console.line(format!(
                "❌ Connection Refused. Is the server running on {}?",
                config.target()
            ));
        }
        ClientError::Timeout { after } => {
            console.line(format!("❌ Timeout: no data for {:.1}s", after.as_secs_f64()));
        }
        _ => console.line(format!("❌ Exception: {err}")),
    }
    client_error_result(err)
}
