use speech_core::{PayloadError, ProbeResult};
use stream_client::ClientError;
use thiserror::Error;

/// Probe error types
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid payload: {0}")]
    Payload(#[from] PayloadError),
}

/// Turn a transport failure into the result recorded for that request
pub fn client_error_result(err: ClientError) -> ProbeResult {
    match err {
        ClientError::Connect { target } => ProbeResult::ConnectionError { target },
        ClientError::Timeout { after } => ProbeResult::Timeout { after },
        ClientError::Status { status, .. } => ProbeResult::HttpError { status },
        other => ProbeResult::OtherError {
            message: other.to_string(),
        },
    }
}
