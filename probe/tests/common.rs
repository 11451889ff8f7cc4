//! Common utilities for integration tests: an in-process mock of the
//! speech streaming endpoint.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use speech_probe::ProbeConfig;
use tokio::net::TcpListener;

/// How the mock answers each request
#[derive(Clone)]
pub enum MockBehavior {
    /// 200 with one body chunk per entry, each sent after `delay`
    Stream { chunks: Vec<usize>, delay: Duration },
    /// Fixed non-200 status with a short text body
    Status(u16),
    /// Hold the response headers back for `delay`
    Stall(Duration),
    /// Odd-numbered hits get a 500, even ones stream `chunks`
    FailOddHits { chunks: Vec<usize>, delay: Duration },
}

#[derive(Clone)]
struct MockState {
    behavior: MockBehavior,
    hits: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    bodies: Arc<Mutex<Vec<serde_json::Value>>>,
}

pub struct MockServer {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    bodies: Arc<Mutex<Vec<serde_json::Value>>>,
}

impl MockServer {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn bodies(&self) -> Vec<serde_json::Value> {
        self.bodies.lock().unwrap().clone()
    }

    /// Probe configuration pointed at this mock
    pub fn config(&self) -> ProbeConfig {
        ProbeConfig {
            host: self.addr.ip().to_string(),
            port: self.addr.port(),
            single_timeout_secs: 5,
            concurrent_timeout_secs: 5,
            ..Default::default()
        }
    }
}

/// Start the mock on an ephemeral local port
pub async fn spawn_mock(behavior: MockBehavior) -> MockServer {
    let state = MockState {
        behavior,
        hits: Arc::new(AtomicUsize::new(0)),
        in_flight: Arc::new(AtomicUsize::new(0)),
        max_in_flight: Arc::new(AtomicUsize::new(0)),
        bodies: Arc::new(Mutex::new(Vec::new())),
    };
    let hits = state.hits.clone();
    let max_in_flight = state.max_in_flight.clone();
    let bodies = state.bodies.clone();

    let app = Router::new()
        .route("/v1/audio/speech/stream", post(speech_stream))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockServer {
        addr,
        hits,
        max_in_flight,
        bodies,
    }
}

/// A local port with nothing listening on it
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

async fn speech_stream(State(state): State<MockState>, Json(body): Json<serde_json::Value>) -> Response {
    let hit = state.hits.fetch_add(1, Ordering::SeqCst) + 1;
    state.bodies.lock().unwrap().push(body);

    match state.behavior.clone() {
        MockBehavior::Stream { chunks, delay } => streaming_response(&state, chunks, delay),
        MockBehavior::Status(code) => (
            StatusCode::from_u16(code).unwrap(),
            format!("mock failure {code}"),
        )
            .into_response(),
        MockBehavior::Stall(delay) => {
            tokio::time::sleep(delay).await;
            streaming_response(&state, vec![16], Duration::ZERO)
        }
        MockBehavior::FailOddHits { chunks, delay } => {
            if hit % 2 == 1 {
                (StatusCode::INTERNAL_SERVER_ERROR, "odd hit").into_response()
            } else {
                streaming_response(&state, chunks, delay)
            }
        }
    }
}

fn streaming_response(state: &MockState, chunks: Vec<usize>, delay: Duration) -> Response {
    let now = state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    state.max_in_flight.fetch_max(now, Ordering::SeqCst);
    let in_flight = state.in_flight.clone();

    let stream = async_stream::stream! {
        for size in chunks {
            tokio::time::sleep(delay).await;
            yield Ok::<_, std::io::Error>(Bytes::from(vec![0u8; size]));
        }
        in_flight.fetch_sub(1, Ordering::SeqCst);
    };

    Response::builder()
        .status(StatusCode::OK)
        .header("content-type", "audio/wav")
        .body(Body::from_stream(stream))
        .unwrap()
}
