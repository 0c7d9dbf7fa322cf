use anyhow::Result;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::query::{Hit, SearchRequest, SearchResponse};
use crate::recorder::ResultRecorder;
use crate::retry::{RetryPolicy, Sleeper};
use crate::transport::{SearchTransport, TransportResponse};

pub const DEFAULT_ERROR_PAUSE: Duration = Duration::from_secs(5);

/// What one domain search came to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Hit(Vec<Hit>),
    NoHit,
    /// Every attempt failed at the network level.
    TransientFailure { attempts: u32 },
    /// The store answered with a non-200 status.
    ApiError { status: u16, body: String },
    /// A 200 response whose body did not decode, or whose hits were all
    /// missing `@timestamp` or `message`.
    MalformedResponse { reason: String },
}

impl SearchOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, SearchOutcome::Hit(_))
    }
}

pub struct QueryExecutor<T, S> {
    transport: T,
    sleeper: S,
    client_ip: String,
    retry: RetryPolicy,
    error_pause: Duration,
    max_hits: Option<u32>,
}

impl<T: SearchTransport, S: Sleeper> QueryExecutor<T, S> {
    pub fn new(transport: T, sleeper: S, client_ip: impl Into<String>) -> Self {
        Self {
            transport,
            sleeper,
            client_ip: client_ip.into(),
            retry: RetryPolicy::default(),
            error_pause: DEFAULT_ERROR_PAUSE,
            max_hits: None,
        }
    }

    pub fn from_config(transport: T, sleeper: S, config: &Config) -> Self {
        Self::new(transport, sleeper, config.client_ip.clone())
            .with_retry(config.retry)
            .with_error_pause(config.error_pause)
            .with_max_hits(config.max_hits)
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_error_pause(mut self, pause: Duration) -> Self {
        self.error_pause = pause;
        self
    }

    pub fn with_max_hits(mut self, max_hits: Option<u32>) -> Self {
        self.max_hits = max_hits;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    /// Search one domain and write each hit to `recorder` before returning.
    /// Only recorder failures surface as errors.
    pub fn check_domain(
        &self,
        domain: &str,
        recorder: &mut ResultRecorder,
    ) -> Result<SearchOutcome> {
        let outcome = self.search(domain);

        if let SearchOutcome::Hit(hits) = &outcome {
            for hit in hits {
                info!(
                    action = "hit",
                    component = "query_executor",
                    domain = %hit.domain,
                    timestamp = %hit.timestamp,
                    "Hit found"
                );
                recorder.append(hit)?;
            }
        }

        Ok(outcome)
    }

    /// Run the search for `domain`, retrying network failures under the
    /// retry policy. Never fails: every problem maps to an outcome.
    pub fn search(&self, domain: &str) -> SearchOutcome {
        let request = SearchRequest::for_domain(&self.client_ip, domain, self.max_hits);
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!(
                action = "query",
                component = "query_executor",
                domain,
                attempt,
                "Sending search request"
            );

            let err = match self.transport.send(&request) {
                Ok(response) => return self.interpret(domain, response),
                Err(err) => err,
            };

            if !self.retry.should_retry(attempt) {
                error!(
                    action = "exhausted",
                    component = "query_executor",
                    domain,
                    attempts = attempt,
                    error = %err,
                    "Max retries reached, giving up on domain"
                );
                return SearchOutcome::TransientFailure { attempts: attempt };
            }

            warn!(
                action = "retry",
                component = "query_executor",
                domain,
                attempt,
                max_attempts = self.retry.max_attempts,
                delay_secs = self.retry.delay.as_secs(),
                error = %err,
                "Network error, retrying"
            );
            self.sleeper.sleep(self.retry.delay);
        }
    }

    fn interpret(&self, domain: &str, response: TransportResponse) -> SearchOutcome {
        if response.status != 200 {
            warn!(
                action = "query",
                component = "query_executor",
                domain,
                status = response.status,
                body = %response.body,
                "Search request failed"
            );
            self.sleeper.sleep(self.error_pause);
            return SearchOutcome::ApiError {
                status: response.status,
                body: response.body,
            };
        }

        match SearchResponse::parse(&response.body) {
            Ok(parsed) => {
                let decoded = parsed.into_hits(domain);

                for rejected in &decoded.rejected {
                    warn!(
                        action = "parse",
                        component = "query_executor",
                        domain,
                        position = rejected.position,
                        error = %rejected.reason,
                        "Skipping incomplete hit"
                    );
                }

                if !decoded.hits.is_empty() {
                    SearchOutcome::Hit(decoded.hits)
                } else if let Some(first) = decoded.rejected.first() {
                    SearchOutcome::MalformedResponse {
                        reason: format!(
                            "{} hit(s) unusable, first: {}",
                            decoded.rejected.len(),
                            first.reason
                        ),
                    }
                } else {
                    debug!(action = "query", component = "query_executor", domain, "No hits");
                    SearchOutcome::NoHit
                }
            }
            Err(e) => {
                warn!(
                    action = "parse",
                    component = "query_executor",
                    domain,
                    error = %e,
                    "Unreadable search response"
                );
                SearchOutcome::MalformedResponse {
                    reason: e.to_string(),
                }
            }
        }
    }
}
