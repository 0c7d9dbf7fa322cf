#![allow(dead_code)]

use dnswatch::query::SearchRequest;
use dnswatch::{SearchTransport, Sleeper, TransportError, TransportResponse};
use serde_json::{json, Value};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// What the mock store does for a given domain.
#[derive(Clone)]
pub enum Reply {
    Hits(Vec<(&'static str, &'static str)>),
    Status(u16, &'static str),
    /// 200 with this exact body.
    Body(&'static str),
    Down,
}

/// In-memory stand-in for the search endpoint, keyed by the wildcard the
/// request carries. Unknown domains get zero hits.
#[derive(Default)]
pub struct MockStore {
    replies: HashMap<String, Reply>,
    requests: RefCell<Vec<Value>>,
    calls: Cell<u32>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, domain: &str, reply: Reply) -> Self {
        self.replies.insert(format!("*{domain}*"), reply);
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.get()
    }

    pub fn requests(&self) -> Vec<Value> {
        self.requests.borrow().clone()
    }

    pub fn wildcards(&self) -> Vec<String> {
        self.requests
            .borrow()
            .iter()
            .map(|r| wildcard_of(r).to_string())
            .collect()
    }
}

pub fn wildcard_of(request: &Value) -> &str {
    request["query"]["bool"]["must"][1]["wildcard"]["destination.address"]
        .as_str()
        .unwrap_or_default()
}

impl SearchTransport for MockStore {
    fn send(&self, request: &SearchRequest) -> Result<TransportResponse, TransportError> {
        self.calls.set(self.calls.get() + 1);
        let value = serde_json::to_value(request).expect("request serializes");
        let key = wildcard_of(&value).to_string();
        self.requests.borrow_mut().push(value);

        match self.replies.get(&key).cloned().unwrap_or(Reply::Hits(vec![])) {
            Reply::Hits(hits) => Ok(TransportResponse {
                status: 200,
                body: hits_body(&hits),
            }),
            Reply::Status(status, body) => Ok(TransportResponse {
                status,
                body: body.to_string(),
            }),
            Reply::Body(body) => Ok(TransportResponse {
                status: 200,
                body: body.to_string(),
            }),
            Reply::Down => Err(TransportError("connection refused".into())),
        }
    }
}

pub fn hits_body(hits: &[(&str, &str)]) -> String {
    let hits: Vec<Value> = hits
        .iter()
        .map(|(timestamp, message)| {
            json!({
                "_index": "logs-cph-bind9-2024.01.01",
                "_source": {"@timestamp": timestamp, "message": message}
            })
        })
        .collect();
    json!({"took": 1, "hits": {"total": {"value": hits.len()}, "hits": hits}}).to_string()
}

#[derive(Default)]
pub struct RecordingSleeper {
    pauses: RefCell<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.borrow().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.pauses.borrow_mut().push(duration);
    }
}

/// Data rows of a results file, header skipped.
pub fn read_rows(path: &Path) -> Vec<Vec<String>> {
    csv::ReaderBuilder::new()
        .from_path(path)
        .expect("results file opens")
        .records()
        .map(|record| {
            record
                .expect("row parses")
                .iter()
                .map(str::to_string)
                .collect()
        })
        .collect()
}
