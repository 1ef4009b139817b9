//! HTTP server standing in for style servers in tests. Every request has to be announced with
//! [`Mock::expect`] first, and stays pending until the test decides how to answer it. This gives
//! tests full control over the order in which concurrent downloads complete.

use http_body_util::Full;
use hyper::{
    HeaderMap, Request, Response, header::USER_AGENT, server::conn::http1, service::Service,
};
use hyper_util::rt::TokioIo;
use std::{
    collections::HashMap,
    future::Future,
    net::SocketAddr,
    pin::Pin,
    sync::{Arc, Mutex},
};
use tokio::{net::TcpListener, sync::oneshot};

pub use hyper::{StatusCode, body::Bytes};

enum Reply {
    Payload(Bytes),
    Status(StatusCode),
}

#[derive(Default)]
struct State {
    /// Expectations made with [`Mock::expect`], waiting for their requests.
    expectations: HashMap<String, oneshot::Receiver<Reply>>,

    /// Headers of each request, in the order they came.
    headers: Vec<HeaderMap>,

    unexpected: Vec<String>,
}

pub struct Mock {
    pub port: u16,
    state: Arc<Mutex<State>>,
}

impl Mock {
    /// Create new [`Mock`], and bind it to a random port.
    pub async fn bind() -> Self {
        let state = Arc::new(Mutex::new(State::default()));

        let addr = SocketAddr::from(([127, 0, 0, 1], 0));
        let listener = TcpListener::bind(addr).await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let state_clone = state.clone();
        tokio::spawn(async move {
            loop {
                let (stream, _) = listener.accept().await.unwrap();
                let io = TokioIo::new(stream);

                let state = state_clone.clone();
                tokio::task::spawn(async move {
                    if let Err(error) = http1::Builder::new()
                        .serve_connection(io, MockRequest { state })
                        .await
                    {
                        log::debug!("Connection closed: {error}.");
                    }
                });
            }
        });

        Self { port, state }
    }

    /// Full URL of `path` on this server.
    pub fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{path}", self.port)
    }

    pub async fn expect(&self, path: impl Into<String>) -> Expectation {
        let path = path.into();
        log::info!("Expecting '{path}'.");
        let (tx, rx) = oneshot::channel();
        self.state.lock().unwrap().expectations.insert(path, rx);
        Expectation { tx }
    }

    /// Headers of all requests received so far.
    pub fn received_headers(&self) -> Vec<HeaderMap> {
        self.state.lock().unwrap().headers.clone()
    }

    /// User-Agent headers of all requests received so far.
    pub fn received_user_agents(&self) -> Vec<Option<String>> {
        self.received_headers()
            .iter()
            .map(|headers| {
                headers
                    .get(USER_AGENT)
                    .and_then(|value| value.to_str().ok())
                    .map(str::to_owned)
            })
            .collect()
    }
}

impl Drop for Mock {
    fn drop(&mut self) {
        if !std::thread::panicking() && !self.state.lock().unwrap().unexpected.is_empty() {
            panic!("there are unexpected requests");
        }
    }
}

/// Answer to a request announced with [`Mock::expect`]. Can be given before or after the
/// request actually comes.
pub struct Expectation {
    tx: oneshot::Sender<Reply>,
}

impl Expectation {
    pub async fn respond(self, payload: impl Into<Bytes>) {
        log::info!("Responding.");
        // Client might have given up already.
        let _ = self.tx.send(Reply::Payload(payload.into()));
    }

    pub async fn respond_with_status(self, status: StatusCode) {
        log::info!("Responding with {status}.");
        let _ = self.tx.send(Reply::Status(status));
    }
}

struct MockRequest {
    state: Arc<Mutex<State>>,
}

impl Service<Request<hyper::body::Incoming>> for MockRequest {
    type Response = Response<Full<Bytes>>;
    type Error = hyper::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, request: Request<hyper::body::Incoming>) -> Self::Future {
        log::info!("Incoming request '{}'.", request.uri());
        let state = self.state.clone();
        Box::pin(async move {
            let expectation = {
                let mut state = state.lock().unwrap();
                state.headers.push(request.headers().clone());
                state.expectations.remove(request.uri().path())
            };

            let Some(rx) = expectation else {
                log::warn!("Unexpected '{}'.", request.uri());
                state
                    .lock()
                    .unwrap()
                    .unexpected
                    .push(request.uri().to_string());
                return Ok(status(StatusCode::IM_A_TEAPOT));
            };

            match rx.await {
                Ok(Reply::Payload(payload)) => Ok(Response::new(Full::new(payload))),
                Ok(Reply::Status(code)) => Ok(status(code)),
                Err(_) => {
                    log::debug!("Expectation dropped without an answer.");
                    Ok(status(StatusCode::INTERNAL_SERVER_ERROR))
                }
            }
        })
    }
}

fn status(code: StatusCode) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = code;
    response
}
