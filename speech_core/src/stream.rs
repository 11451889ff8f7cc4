//! Per-request streaming bookkeeping.
//!
//! A [`ChunkTracker`] follows one streaming read from request start to stream
//! exhaustion. It only counts; it never looks inside the audio bytes. Chunk
//! boundaries are whatever the transport delivered.

use std::time::{Duration, Instant};

/// Lifecycle of a single probe request.
///
/// `Started -> Streaming -> Completed`, `Started -> Failed` on a non-200
/// status, or any state to `Errored` on a transport fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Started,
    Streaming,
    Completed,
    Failed,
    Errored,
}

impl RequestState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Errored)
    }
}

/// One non-empty chunk as observed by the tracker
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkEvent {
    /// 1-based position in the stream
    pub index: usize,
    pub size: usize,
    /// Time since the request started
    pub elapsed: Duration,
    /// True for the chunk that defined time-to-first-byte
    pub first: bool,
}

/// Totals for one finished stream
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamSummary {
    pub ttfb: Option<Duration>,
    pub total: Duration,
    pub bytes: u64,
    pub chunks: usize,
}

impl StreamSummary {
    pub fn avg_chunk_size(&self) -> Option<f64> {
        if self.chunks == 0 {
            return None;
        }
        Some(self.bytes as f64 / self.chunks as f64)
    }
}

#[derive(Debug, Clone)]
pub struct ChunkTracker {
    started: Instant,
    ttfb: Option<Duration>,
    bytes: u64,
    chunks: usize,
}

impl ChunkTracker {
    pub fn new(started: Instant) -> Self {
        Self {
            started,
            ttfb: None,
            bytes: 0,
            chunks: 0,
        }
    }

    pub fn started(&self) -> Instant {
        self.started
    }

    pub fn state(&self) -> RequestState {
        if self.chunks == 0 {
            RequestState::Started
        } else {
            RequestState::Streaming
        }
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    pub fn chunks(&self) -> usize {
        self.chunks
    }

    /// Account for a chunk of `len` bytes received at `now`.
    ///
    /// Empty chunks are ignored and yield `None`.
    pub fn record(&mut self, len: usize, now: Instant) -> Option<ChunkEvent> {
        if len == 0 {
            return None;
        }
        let elapsed = now.saturating_duration_since(self.started);
        let first = self.ttfb.is_none();
        if first {
            self.ttfb = Some(elapsed);
        }
        self.bytes += len as u64;
        self.chunks += 1;

        Some(ChunkEvent {
            index: self.chunks,
            size: len,
            elapsed,
            first,
        })
    }

    /// Close the stream at `now` and produce its summary.
    pub fn finish(self, now: Instant) -> StreamSummary {
        let mut total = now.saturating_duration_since(self.started);
        // ttfb <= total even if the caller hands in an older instant
        if let Some(ttfb) = self.ttfb {
            total = total.max(ttfb);
        }
        StreamSummary {
            ttfb: self.ttfb,
            total,
            bytes: self.bytes,
            chunks: self.chunks,
        }
    }
}
