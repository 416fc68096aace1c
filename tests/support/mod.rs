// In-process HTTP stub for black-box client tests. An axum router bound
// to an ephemeral port answers each request with the next canned
// response and records what it received. The server runs on its own
// tokio runtime thread so the blocking client under test can call it.

#![allow(dead_code)]

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::thread;
use tokio::sync::oneshot;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body is not JSON")
    }
}

#[derive(Default)]
struct StubState {
    responses: Mutex<VecDeque<(u16, String)>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

async fn answer(
    State(state): State<Arc<StubState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let headers = headers
        .iter()
        .map(|(k, v)| {
            (
                k.as_str().to_string(),
                String::from_utf8_lossy(v.as_bytes()).into_owned(),
            )
        })
        .collect();
    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.to_string(),
        target: uri.to_string(),
        headers,
        body,
    });

    let next = state.responses.lock().unwrap().pop_front();
    match next {
        Some((status, body)) => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, [(header::CONTENT_TYPE, "application/json")], Body::from(body)).into_response()
        }
        None => (StatusCode::INTERNAL_SERVER_ERROR, "no canned response left").into_response(),
    }
}

pub struct StubServer {
    pub base_url: String,
    state: Arc<StubState>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl StubServer {
    /// Serve `responses` in order, one per request.
    pub fn spawn(responses: Vec<(u16, String)>) -> Self {
        let state = Arc::new(StubState {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        });
        let app = Router::new().fallback(answer).with_state(Arc::clone(&state));

        let listener =
            std::net::TcpListener::bind("127.0.0.1:0").expect("failed to bind ephemeral port");
        listener.set_nonblocking(true).unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let handle = thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("failed to build test runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).unwrap();
                axum::serve(listener, app)
                    .with_graceful_shutdown(async {
                        let _ = shutdown_rx.await;
                    })
                    .await
                    .unwrap();
            });
        });

        StubServer {
            base_url: format!("http://{}", addr),
            state,
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn json(status: u16, body: serde_json::Value) -> (u16, String) {
        (status, body.to_string())
    }

    /// Stop the server and return everything it received.
    pub fn finish(mut self) -> Vec<RecordedRequest> {
        self.stop();
        self.requests()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    fn stop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// An address nothing listens on.
pub fn dead_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// A real transport error, produced by calling an address nothing listens on.
pub fn transport_error() -> reqwest::Error {
    reqwest::blocking::Client::builder()
        .no_proxy()
        .build()
        .unwrap()
        .get(dead_base_url())
        .send()
        .unwrap_err()
}
