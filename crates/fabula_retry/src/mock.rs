//! Scripted transport for tests.
//!
//! Replays canned replies instead of touching the network and records every
//! attempt, so callers can assert on attempt counts and timing.

use crate::{Transport, TransportFailure};
use async_trait::async_trait;
use fabula_core::{RemoteResponse, RequestDescriptor};
use serde_json::Value;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;
use tokio::time::Instant;

/// One canned reply.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Respond with a status, headers and body
    Response(RemoteResponse),
    /// Fail the attempt at transport level
    Failure(TransportFailure),
}

impl Reply {
    /// Response with a status and an empty body.
    pub fn status(status: u16) -> Self {
        Reply::Response(RemoteResponse::with_body(status, Vec::new()))
    }

    /// Response with a status and a text body.
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Reply::Response(RemoteResponse::with_body(status, body.into().into_bytes()))
    }

    /// Response with a status and a JSON body.
    pub fn json(status: u16, body: Value) -> Self {
        Reply::Response(RemoteResponse::with_body(status, body.to_string().into_bytes()))
    }

    /// Response with a status and raw bytes.
    pub fn bytes(status: u16, body: Vec<u8>) -> Self {
        Reply::Response(RemoteResponse::with_body(status, body))
    }

    /// Response with a status, one header and an empty body.
    pub fn with_header(status: u16, name: &str, value: &str) -> Self {
        let headers = BTreeMap::from([(name.to_string(), value.to_string())]);
        Reply::Response(RemoteResponse::new(status, headers, Vec::new()))
    }

    /// Attempt times out.
    pub fn timeout() -> Self {
        Reply::Failure(TransportFailure::Timeout)
    }

    /// Connection cannot be established.
    pub fn connect_failure() -> Self {
        Reply::Failure(TransportFailure::Connect("connection refused".to_string()))
    }

    /// Server drops the connection before answering.
    pub fn disconnect() -> Self {
        Reply::Failure(TransportFailure::Disconnected(
            "connection closed before message completed".to_string(),
        ))
    }

    /// Unclassified local failure.
    pub fn other(message: impl Into<String>) -> Self {
        Reply::Failure(TransportFailure::Other(message.into()))
    }
}

#[derive(Debug)]
struct Route {
    pattern: String,
    replies: VecDeque<Reply>,
    repeat_last: bool,
}

impl Route {
    fn next(&mut self) -> Option<Reply> {
        if self.repeat_last && self.replies.len() == 1 {
            self.replies.front().cloned()
        } else {
            self.replies.pop_front()
        }
    }
}

/// A recorded attempt.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Descriptor passed to the transport
    pub descriptor: RequestDescriptor,
    /// (Possibly paused) tokio time of the attempt
    pub at: Instant,
}

/// Transport replaying scripted replies, matched by URL substring.
///
/// Routes are tried in insertion order; the first route whose pattern occurs
/// in the URL and still has a reply wins. An empty pattern matches every URL.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    /// Transport with no routes; every attempt fails as unexpected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replay `replies` in order for any URL.
    pub fn sequence(replies: Vec<Reply>) -> Self {
        Self::new().on("", replies)
    }

    /// Answer every attempt with `reply`.
    pub fn always(reply: Reply) -> Self {
        Self::new().on_always("", reply)
    }

    /// Add a route replaying `replies` once each for URLs containing `pattern`.
    pub fn on(self, pattern: &str, replies: Vec<Reply>) -> Self {
        self.push_route(pattern, replies.into(), false)
    }

    /// Add a route answering every matching attempt with `reply`.
    pub fn on_always(self, pattern: &str, reply: Reply) -> Self {
        self.push_route(pattern, VecDeque::from([reply]), true)
    }

    fn push_route(self, pattern: &str, replies: VecDeque<Reply>, repeat_last: bool) -> Self {
        self.routes
            .lock()
            .expect("scripted transport lock poisoned")
            .push(Route {
                pattern: pattern.to_string(),
                replies,
                repeat_last,
            });
        self
    }

    /// Number of attempts seen so far.
    pub fn call_count(&self) -> usize {
        self.requests
            .lock()
            .expect("scripted transport lock poisoned")
            .len()
    }

    /// Number of attempts whose URL contains `pattern`.
    pub fn calls_to(&self, pattern: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.descriptor.url().contains(pattern))
            .count()
    }

    /// Every attempt seen so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .expect("scripted transport lock poisoned")
            .clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, descriptor: &RequestDescriptor) -> Result<RemoteResponse, TransportFailure> {
        self.requests
            .lock()
            .expect("scripted transport lock poisoned")
            .push(RecordedRequest {
                descriptor: descriptor.clone(),
                at: Instant::now(),
            });

        let reply = {
            let mut routes = self.routes.lock().expect("scripted transport lock poisoned");
            routes
                .iter_mut()
                .filter(|route| descriptor.url().contains(&route.pattern))
                .find_map(Route::next)
        };

        match reply {
            Some(Reply::Response(response)) => Ok(response),
            Some(Reply::Failure(failure)) => Err(failure),
            None => Err(TransportFailure::Other(format!(
                "no scripted reply for {}",
                descriptor.url()
            ))),
        }
    }
}
