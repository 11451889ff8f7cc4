mod payload;
mod report;
mod stats;
mod stream;

use std::time::Duration;

pub use payload::{validate_payload, PayloadError, SpeechPayload};
pub use report::{render_summary, render_table, REPORT_WIDTH};
pub use stats::{LatencySummary, TtfbStats};
pub use stream::{ChunkEvent, ChunkTracker, RequestState, StreamSummary};

/// How a single probe request ended
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeResult {
    Success { summary: StreamSummary },
    /// The endpoint answered with anything other than 200
    HttpError { status: u16 },
    /// Nothing was listening at `target` (host:port)
    ConnectionError { target: String },
    Timeout { after: Duration },
    OtherError { message: String },
}

impl ProbeResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn state(&self) -> RequestState {
        match self {
            Self::Success { .. } => RequestState::Completed,
            Self::HttpError { .. } => RequestState::Failed,
            Self::ConnectionError { .. } | Self::Timeout { .. } | Self::OtherError { .. } => {
                RequestState::Errored
            }
        }
    }

    pub fn summary(&self) -> Option<&StreamSummary> {
        match self {
            Self::Success { summary } => Some(summary),
            _ => None,
        }
    }

    /// Short description of a failure, `None` on success
    pub fn error_text(&self) -> Option<String> {
        match self {
            Self::Success { .. } => None,
            Self::HttpError { status } => Some(format!("Status {status}")),
            Self::ConnectionError { target } => Some(format!("Connection refused ({target})")),
            Self::Timeout { after } => Some(format!("Timed out after {:.1}s", after.as_secs_f64())),
            Self::OtherError { message } => Some(message.clone()),
        }
    }
}

/// Result of one request in a concurrent run, keyed by its submission index
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOutcome {
    pub id: usize,
    pub result: ProbeResult,
}

impl RequestOutcome {
    pub fn new(id: usize, result: ProbeResult) -> Self {
        Self { id, result }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_success()
    }

    pub fn state(&self) -> RequestState {
        self.result.state()
    }

    /// Time to first byte; absent for failures and for empty successful streams
    pub fn ttfb(&self) -> Option<Duration> {
        self.result.summary().and_then(|s| s.ttfb)
    }

    pub fn total(&self) -> Option<Duration> {
        self.result.summary().map(|s| s.total)
    }

    pub fn bytes(&self) -> u64 {
        self.result.summary().map(|s| s.bytes).unwrap_or(0)
    }

    pub fn error_text(&self) -> Option<String> {
        self.result.error_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn success(ttfb_ms: u64, total_ms: u64) -> ProbeResult {
        ProbeResult::Success {
            summary: StreamSummary {
                ttfb: Some(Duration::from_millis(ttfb_ms)),
                total: Duration::from_millis(total_ms),
                bytes: 1024,
                chunks: 4,
            },
        }
    }

    #[test]
    fn test_success_outcome_accessors() {
        let outcome = RequestOutcome::new(3, success(40, 900));
        assert!(outcome.is_success());
        assert_eq!(outcome.state(), RequestState::Completed);
        assert_eq!(outcome.ttfb(), Some(Duration::from_millis(40)));
        assert_eq!(outcome.total(), Some(Duration::from_millis(900)));
        assert_eq!(outcome.bytes(), 1024);
        assert_eq!(outcome.error_text(), None);
    }

    #[test]
    fn test_http_error_is_failed_with_status_text() {
        let outcome = RequestOutcome::new(1, ProbeResult::HttpError { status: 500 });
        assert!(!outcome.is_success());
        assert_eq!(outcome.state(), RequestState::Failed);
        assert_eq!(outcome.ttfb(), None);
        assert_eq!(outcome.total(), None);
        assert!(outcome.error_text().unwrap().contains("500"));
    }

    #[test]
    fn test_transport_errors_are_errored() {
        let refused = ProbeResult::ConnectionError {
            target: "127.0.0.1:4123".to_string(),
        };
        assert_eq!(refused.state(), RequestState::Errored);
        assert!(refused.error_text().unwrap().contains("127.0.0.1:4123"));

        let timeout = ProbeResult::Timeout {
            after: Duration::from_secs(60),
        };
        assert_eq!(timeout.state(), RequestState::Errored);
        assert_eq!(timeout.error_text().unwrap(), "Timed out after 60.0s");

        let other = ProbeResult::OtherError {
            message: "body closed early".to_string(),
        };
        assert_eq!(other.state(), RequestState::Errored);
        assert_eq!(other.error_text().unwrap(), "body closed early");
    }

    #[test]
    fn test_terminal_state_for_every_result() {
        let results = [
            success(1, 2),
            ProbeResult::HttpError { status: 404 },
            ProbeResult::OtherError {
                message: "x".to_string(),
            },
        ];
        assert!(results.iter().all(|r| r.state().is_terminal()));
    }
}
