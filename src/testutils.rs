use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::post,
};
use serde_json::Value;
use tokio::net::TcpListener;

/// What the mock Langflow replies with.
#[derive(Clone)]
pub enum Reply {
    Json(StatusCode, Value),
    Text(StatusCode, String),
    Delay(Duration, Value),
    /// 307 back to the same path, forever.
    RedirectToSelf,
}

/// One request as seen by the mock.
#[derive(Clone, Debug)]
pub struct Seen {
    pub path: String,
    pub headers: HeaderMap,
    pub body: Value,
}

#[derive(Clone)]
struct MockState {
    reply: Reply,
    seen: Arc<Mutex<Vec<Seen>>>,
}

pub struct MockLangflow {
    pub base_url: String,
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl MockLangflow {
    /// Serve `reply` for every run request on an ephemeral local port.
    pub async fn start(reply: Reply) -> Self {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            reply,
            seen: seen.clone(),
        };
        let app = Router::new()
            .route("/lf/{langflow_id}/api/v1/run/{flow_id}", post(run))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            seen,
        }
    }

    pub fn requests(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    pub fn hits(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

async fn run(
    State(state): State<MockState>,
    uri: axum::http::Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let body = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let path = uri.path().to_string();
    state.seen.lock().unwrap().push(Seen {
        path: path.clone(),
        headers,
        body,
    });
    match state.reply {
        Reply::Json(status, v) => (status, Json(v)).into_response(),
        Reply::Text(status, s) => (status, s).into_response(),
        Reply::Delay(d, v) => {
            tokio::time::sleep(d).await;
            Json(v).into_response()
        }
        Reply::RedirectToSelf => Redirect::temporary(&path).into_response(),
    }
}

/// A local URL nothing listens on.
pub fn closed_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
