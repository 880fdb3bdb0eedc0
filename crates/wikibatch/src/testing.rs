//! In-memory transport and endpoint doubles shared by the unit tests.

use crate::{
    endpoint::Endpoint,
    error::{Error, Result},
    query::Query,
    transport::{HttpRequest, HttpResponse, Session, Transport},
};
use bytes::Bytes;
use core::time::Duration;
use serde_json::{Value, json};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

/// What the mock answers for one request.
#[derive(Debug, Clone)]
pub(crate) struct Reply {
    pub delay: Duration,
    pub status: u16,
    pub body: Bytes,
    /// Fail below the HTTP layer with this reason instead of answering.
    pub failure: Option<String>,
}

impl Reply {
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self {
            delay: Duration::ZERO,
            status: 200,
            body: body.into(),
            failure: None,
        }
    }

    pub fn status(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            ..Self::ok(body)
        }
    }

    /// A connection-level failure: `send` returns an error, not a status.
    pub fn fail(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Self::ok(Bytes::new())
        }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

type Responder = dyn Fn(&HttpRequest) -> Reply + Send + Sync;

struct State {
    responder: Box<Responder>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    live_sessions: AtomicUsize,
}

/// Scripted [`Transport`] that counts calls, tracks the peak number of
/// concurrent requests, and tracks sessions that were never released.
#[derive(Clone)]
pub(crate) struct MockTransport {
    state: Arc<State>,
}

impl MockTransport {
    pub fn new(responder: impl Fn(&HttpRequest) -> Reply + Send + Sync + 'static) -> Self {
        Self {
            state: Arc::new(State {
                responder: Box::new(responder),
                calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                peak_in_flight: AtomicUsize::new(0),
                live_sessions: AtomicUsize::new(0),
            }),
        }
    }

    /// Answers every request with `200` and its own URI as the body.
    pub fn echo() -> Self {
        Self::new(|request| Reply::ok(request.uri.clone()))
    }

    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.state.peak_in_flight.load(Ordering::SeqCst)
    }

    pub fn live_sessions(&self) -> usize {
        self.state.live_sessions.load(Ordering::SeqCst)
    }
}

impl Transport for MockTransport {
    type Session = MockSession;

    fn open(&self) -> Result<MockSession> {
        self.state.live_sessions.fetch_add(1, Ordering::SeqCst);
        Ok(MockSession {
            state: Arc::clone(&self.state),
        })
    }
}

pub(crate) struct MockSession {
    state: Arc<State>,
}

impl Drop for MockSession {
    fn drop(&mut self) {
        self.state.live_sessions.fetch_sub(1, Ordering::SeqCst);
    }
}

struct InFlight<'a>(&'a State);

impl<'a> InFlight<'a> {
    fn enter(state: &'a State) -> Self {
        let now = state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        state.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        Self(state)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Session for MockSession {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.state.calls.fetch_add(1, Ordering::SeqCst);
        let _in_flight = InFlight::enter(&self.state);

        let reply = (self.state.responder)(&request);
        if reply.delay.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(reply.delay).await;
        }

        if let Some(reason) = reply.failure {
            return Err(Error::transport(reason));
        }
        Ok(HttpResponse {
            status: reply.status,
            body: reply.body,
        })
    }
}

/// Sends the rendered query string as the request URI.
pub(crate) struct EchoEndpoint;

impl Endpoint for EchoEndpoint {
    fn request(&self, query: &Query) -> Result<HttpRequest> {
        Ok(HttpRequest::get(query.as_str()))
    }
}

/// The `query` parameter of a SPARQL `GET` request.
pub(crate) fn sparql_query_of(request: &HttpRequest) -> String {
    let (_, qs) = request.uri.split_once('?').unwrap_or_default();
    form_urlencoded::parse(qs.as_bytes())
        .find(|(name, _)| name == "query")
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default()
}

/// A SPARQL JSON results payload with literal terms.
pub(crate) fn sparql_json(vars: &[&str], rows: &[&[(&str, &str)]]) -> Bytes {
    let bindings: Vec<Value> = rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|(var, value)| {
                    (
                        (*var).to_string(),
                        json!({ "type": "literal", "value": value }),
                    )
                })
                .collect::<serde_json::Map<_, _>>()
                .into()
        })
        .collect();

    Bytes::from(
        json!({
            "head": { "vars": vars },
            "results": { "bindings": bindings },
        })
        .to_string(),
    )
}
