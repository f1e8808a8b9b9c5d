//! Shared utilities for integration testing.
//!
//! The mock backend runs axum on its own tokio runtime so the blocking
//! client under test can be driven from plain `#[test]` functions.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::Router;
use tokio::net::TcpListener;
use tokio::runtime::Runtime;

/// One request as seen by the backend. Header names are lowercase.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: String,
}

#[derive(Default)]
struct Shared {
    echo: bool,
    replies: Mutex<VecDeque<(u16, String)>>,
    last_reply: Mutex<Option<(u16, String)>>,
    received: Mutex<Vec<Recorded>>,
}

/// In-process HTTP backend. Shuts down when dropped.
pub struct MockBackend {
    addr: SocketAddr,
    shared: Arc<Shared>,
    _runtime: Runtime,
}

impl MockBackend {
    /// Replies 200 with the request body (or `{}` when empty).
    pub fn echo() -> Self {
        Self::start(Shared {
            echo: true,
            ..Shared::default()
        })
    }

    /// Replies with `replies` in order, repeating the last one once exhausted.
    pub fn scripted(replies: &[(u16, &str)]) -> Self {
        Self::start(Shared {
            replies: Mutex::new(replies.iter().map(|(s, b)| (*s, b.to_string())).collect()),
            ..Shared::default()
        })
    }

    fn start(shared: Shared) -> Self {
        let runtime = Runtime::new().unwrap();
        let shared = Arc::new(shared);

        let listener = runtime.block_on(TcpListener::bind("127.0.0.1:0")).unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().fallback(capture).with_state(Arc::clone(&shared));
        runtime.spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            shared,
            _runtime: runtime,
        }
    }

    /// Base URL, e.g. `http://127.0.0.1:41234`.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn received(&self) -> Vec<Recorded> {
        self.shared.received.lock().unwrap().clone()
    }
}

async fn capture(
    State(shared): State<Arc<Shared>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    let headers = headers
        .iter()
        .map(|(name, value)| (name.as_str().to_string(), value.to_str().unwrap_or_default().to_string()))
        .collect();

    shared.received.lock().unwrap().push(Recorded {
        method: method.to_string(),
        path: uri.path().to_string(),
        headers,
        body: body.clone(),
    });

    if shared.echo {
        let reply = if body.is_empty() { "{}".to_string() } else { body };
        return (StatusCode::OK, reply);
    }

    let next = shared.replies.lock().unwrap().pop_front();
    let mut last = shared.last_reply.lock().unwrap();
    if let Some(reply) = next {
        *last = Some(reply);
    }
    let (status, body) = last.clone().unwrap_or((200, "{}".to_string()));
    (StatusCode::from_u16(status).unwrap(), body)
}
