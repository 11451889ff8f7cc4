// Configuration for the speech stream probes

use std::time::Duration;

use anyhow::Context;
use speech_core::SpeechPayload;
use stream_client::SPEECH_STREAM_PATH;

#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub host: String,
    pub port: u16,
    pub single_timeout_secs: u64,
    pub concurrent_timeout_secs: u64,
    pub request_count: usize,
    /// Worker limit for the concurrent probe; `None` runs every request at once
    pub concurrency: Option<usize>,
    pub payload: SpeechPayload,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4123,
            single_timeout_secs: 30,
            concurrent_timeout_secs: 60,
            request_count: 5,
            concurrency: None,
            payload: SpeechPayload::default(),
        }
    }
}

impl ProbeConfig {
    /// Fixed defaults plus the optional `PROBE_PAYLOAD_FILE` (environment or `.env`).
    pub fn from_env() -> anyhow::Result<Self> {
        let _ = dotenv::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from the defaults, reading overrides through `lookup`.
    ///
    /// Host, port, request count, timeouts and concurrency are constants of
    /// the probes and never come from `lookup`. `PROBE_PAYLOAD_FILE` names a
    /// JSON file replacing the request body; an unreadable file is an error.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(path) = lookup("PROBE_PAYLOAD_FILE").filter(|p| !p.trim().is_empty()) {
            config.payload = SpeechPayload::from_file(path.trim())
                .context("PROBE_PAYLOAD_FILE could not be used")?;
        }
        Ok(config)
    }

    /// host:port, as shown in connection-refused messages
    pub fn target(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn url(&self) -> String {
        format!("{}{}", self.base_url(), SPEECH_STREAM_PATH)
    }

    pub fn single_timeout(&self) -> Duration {
        Duration::from_secs(self.single_timeout_secs)
    }

    pub fn concurrent_timeout(&self) -> Duration {
        Duration::from_secs(self.concurrent_timeout_secs)
    }

    /// Number of requests allowed in flight at once
    pub fn workers(&self) -> usize {
        let limit = self.concurrency.unwrap_or(self.request_count);
        limit.clamp(1, self.request_count.max(1))
    }
}
