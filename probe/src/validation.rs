use speech_core::validate_payload;

use crate::config::ProbeConfig;
use crate::error::ProbeError;

/// Upper bound on requests for one concurrent run
const MAX_REQUESTS: usize = 1000;

/// Validate a probe configuration before any request is sent
pub fn validate_config(config: &ProbeConfig) -> Result<(), ProbeError> {
    if config.host.trim().is_empty() {
        return Err(ProbeError::InvalidConfig("Host cannot be empty".to_string()));
    }
    if config.request_count == 0 {
        return Err(ProbeError::InvalidConfig(
            "Request count must be at least 1".to_string(),
        ));
    }
    if config.request_count > MAX_REQUESTS {
        return Err(ProbeError::InvalidConfig(format!(
            "Request count too large (max {})",
            MAX_REQUESTS
        )));
    }
    if config.concurrency == Some(0) {
        return Err(ProbeError::InvalidConfig(
            "Concurrency must be at least 1".to_string(),
        ));
    }
    if config.single_timeout_secs == 0 || config.concurrent_timeout_secs == 0 {
        return Err(ProbeError::InvalidConfig(
            "Timeouts must be at least 1 second".to_string(),
        ));
    }

    validate_payload(&config.payload)?;

    Ok(())
}
