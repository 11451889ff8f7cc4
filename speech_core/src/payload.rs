//! Request body sent to the speech streaming endpoint.
//!
//! The service treats most of these knobs as opaque: the probes forward them
//! verbatim and never interpret the audio that comes back.

use std::{fs, path::Path};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum input length accepted before a request is even attempted
const MAX_INPUT_LENGTH: usize = 5000;

const DEFAULT_INPUT: &str = "Hey Homesoul\u{2014}good to see you. Hope today\u{2019}s treating you gently. \
Take a breath, settle in, and let\u{2019}s make something cool together. \
I\u{2019}m right here, tuned in, steady, and ready whenever you are.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechPayload {
    pub input: String,
    pub voice: String,
    pub response_format: String,
    pub speed: f32,
    pub stream_format: String,
    pub exaggeration: f32,
    pub cfg_weight: f32,
    pub temperature: f32,
    pub streaming_chunk_size: u32,
    pub streaming_strategy: String,
    pub streaming_buffer_size: u32,
    pub streaming_quality: String,
}

impl Default for SpeechPayload {
    fn default() -> Self {
        Self {
            input: DEFAULT_INPUT.to_string(),
            voice: "homesoul".to_string(),
            response_format: "wav".to_string(),
            speed: 1.0,
            stream_format: "audio".to_string(),
            exaggeration: 0.25,
            cfg_weight: 1.0,
            temperature: 0.5,
            streaming_chunk_size: 50,
            streaming_strategy: "sentence".to_string(),
            streaming_buffer_size: 1,
            streaming_quality: "balanced".to_string(),
        }
    }
}

impl SpeechPayload {
    /// Load a payload from a JSON file. Fields the file omits keep their defaults.
    pub fn from_file<P: AsRef<Path>>(p: P) -> anyhow::Result<Self> {
        let text = fs::read_to_string(p.as_ref())
            .with_context(|| format!("Failed to load {}", p.as_ref().display()))?;
        let payload: SpeechPayload = serde_json::from_str(&text)
            .with_context(|| format!("{} is not a valid payload", p.as_ref().display()))?;
        Ok(payload)
    }

    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("<unserializable payload: {e}>"))
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum PayloadError {
    #[error("Input cannot be empty")]
    EmptyInput,

    #[error("Input too long ({len} characters, max {max})")]
    InputTooLong { len: usize, max: usize },

    #[error("Invalid value for {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Validate a payload before it is sent
pub fn validate_payload(payload: &SpeechPayload) -> Result<(), PayloadError> {
    if payload.input.trim().is_empty() {
        return Err(PayloadError::EmptyInput);
    }
    let len = payload.input.chars().count();
    if len > MAX_INPUT_LENGTH {
        return Err(PayloadError::InputTooLong {
            len,
            max: MAX_INPUT_LENGTH,
        });
    }
    if payload.speed <= 0.0 || payload.speed.is_nan() {
        return Err(PayloadError::InvalidField {
            field: "speed",
            reason: format!("must be positive, got {}", payload.speed),
        });
    }
    if payload.temperature < 0.0 || payload.temperature.is_nan() {
        return Err(PayloadError::InvalidField {
            field: "temperature",
            reason: format!("must not be negative, got {}", payload.temperature),
        });
    }
    if payload.streaming_chunk_size == 0 {
        return Err(PayloadError::InvalidField {
            field: "streaming_chunk_size",
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(())
}
