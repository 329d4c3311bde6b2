//! In-process relay used by the fetch and refresh tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use reqwest::header::{ACCEPT, CONTENT_TYPE};

use crate::core::config::FeedConfig;

pub const PLAIN_FIXTURE: &str = include_str!("../../../fixtures/datex2_plain.xml");
pub const TEST_FEED_URL: &str = "https://nap.dgt.es/datex2/v3/dgt/SituationPublication/datex2_v36.xml";

#[derive(Debug, Clone, Copy)]
pub enum TestFeed {
    Body(&'static str),
    Status(u16),
    Stall(Duration),
    /// Serves `body` for the first `successes` requests, then `status`.
    FailAfter {
        body: &'static str,
        successes: usize,
        status: u16,
    },
}

#[derive(Clone)]
struct RelayState {
    feed: TestFeed,
    request_count: Arc<AtomicUsize>,
    last_accept: Arc<Mutex<Option<String>>>,
    last_quest: Arc<Mutex<Option<String>>>,
}

pub struct TestServer {
    base_url: String,
    state: RelayState,
    join_handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub fn feed_config(&self, request_timeout: Duration) -> FeedConfig {
        FeedConfig {
            feed_url: TEST_FEED_URL.to_string(),
            relay_url: format!("{}/proxy?quest=", self.base_url),
            request_timeout,
        }
    }

    pub fn request_count(&self) -> usize {
        self.state.request_count.load(Ordering::SeqCst)
    }

    pub fn last_accept(&self) -> Option<String> {
        self.state
            .last_accept
            .lock()
            .expect("lock must not be poisoned")
            .clone()
    }

    pub fn last_quest(&self) -> Option<String> {
        self.state
            .last_quest
            .lock()
            .expect("lock must not be poisoned")
            .clone()
    }

    pub fn abort(&self) {
        self.join_handle.abort();
    }
}

async fn relay_handler(
    State(state): State<RelayState>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let counter = state.request_count.fetch_add(1, Ordering::SeqCst);
    *state.last_accept.lock().expect("lock must not be poisoned") = headers
        .get(ACCEPT)
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string);
    *state.last_quest.lock().expect("lock must not be poisoned") = params.get("quest").cloned();

    match state.feed {
        TestFeed::Body(body) => xml_response(body),
        TestFeed::Status(code) => status_response(code),
        TestFeed::Stall(delay) => {
            tokio::time::sleep(delay).await;
            xml_response(PLAIN_FIXTURE)
        }
        TestFeed::FailAfter {
            body,
            successes,
            status,
        } => {
            if counter < successes {
                xml_response(body)
            } else {
                status_response(status)
            }
        }
    }
}

fn xml_response(body: &'static str) -> Response {
    let mut response = Response::new(axum::body::Body::from(body));
    *response.status_mut() = StatusCode::OK;
    response.headers_mut().insert(
        CONTENT_TYPE,
        "application/xml".parse().expect("header must parse"),
    );
    response
}

fn status_response(code: u16) -> Response {
    let mut response = Response::new(axum::body::Body::from("relay failure"));
    *response.status_mut() =
        StatusCode::from_u16(code).expect("test status code must be valid");
    response
}

pub async fn spawn_test_server(feed: TestFeed) -> TestServer {
    let state = RelayState {
        feed,
        request_count: Arc::new(AtomicUsize::new(0)),
        last_accept: Arc::new(Mutex::new(None)),
        last_quest: Arc::new(Mutex::new(None)),
    };
    let app = Router::new()
        .route("/proxy", get(relay_handler))
        .with_state(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let address = listener.local_addr().expect("local addr should exist");
    let join_handle = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server should run");
    });
    TestServer {
        base_url: format!("http://{address}"),
        state,
        join_handle,
    }
}
