//! The catalog transport boundary.
//!
//! The network call itself lives outside this crate. [`CatalogTransport`]
//! is the seam: implementations perform the HTTP exchange and hand back the
//! response body as an already-parsed [`serde_json::Value`] document, or one
//! of the three transport failures. Timeouts, status handling, and any
//! retry/backoff policy belong to the implementation; the core never retries.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

/// Failures of a single catalog exchange.
///
/// Callers need to tell these apart: a timeout may be worth re-running, an
/// unexpected status usually is not, and an unparseable body points at a
/// server-side problem.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransportError {
    /// The exchange did not complete within the configured duration.
    #[error("timed out executing a request: {url}")]
    Timeout {
        /// The URL the request was sent to.
        url: String,
    },

    /// The catalog answered with a non-success status.
    #[error("unexpected response code {code} from: {url}")]
    UnexpectedStatus {
        /// The URL the request was sent to.
        url: String,
        /// The HTTP status code received.
        code: u16,
    },

    /// The response body could not be parsed into a JSON document.
    #[error("invalid response body from: {url}: {detail}")]
    InvalidPayload {
        /// The URL the request was sent to.
        url: String,
        /// Parser diagnostic for the body.
        detail: String,
    },
}

/// Performs catalog exchanges and returns parsed documents.
pub trait CatalogTransport {
    /// Fetches the document at `url` via GET.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the exchange times out, the catalog
    /// answers with a non-success status, or the body is not valid JSON.
    fn fetch(&self, url: &str, timeout: Duration) -> Result<Value, TransportError>;

    /// Posts `body` to `url` and returns the response document.
    ///
    /// # Errors
    ///
    /// Same failure taxonomy as [`CatalogTransport::fetch`].
    fn submit(&self, url: &str, body: &Value, timeout: Duration) -> Result<Value, TransportError>;
}

/// In-memory transport serving canned documents, for tests.
///
/// Unknown URLs answer with `UnexpectedStatus { code: 404 }`. Submitted
/// bodies are recorded for assertion.
#[derive(Debug, Default)]
pub struct MockCatalogTransport {
    responses: BTreeMap<String, Result<Value, TransportError>>,
    submissions: Mutex<Vec<(String, Value)>>,
}

impl MockCatalogTransport {
    /// Creates a transport with no canned responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cans a successful response document for `url`.
    #[must_use]
    pub fn respond(mut self, url: impl Into<String>, document: Value) -> Self {
        self.responses.insert(url.into(), Ok(document));
        self
    }

    /// Cans a transport failure for `url`.
    #[must_use]
    pub fn fail(mut self, url: impl Into<String>, error: TransportError) -> Self {
        self.responses.insert(url.into(), Err(error));
        self
    }

    /// Bodies submitted so far, in request order.
    #[must_use]
    pub fn submissions(&self) -> Vec<(String, Value)> {
        self.submissions.lock().expect("mock transport lock").clone()
    }

    fn lookup(&self, url: &str) -> Result<Value, TransportError> {
        self.responses
            .get(url)
            .cloned()
            .unwrap_or_else(|| {
                Err(TransportError::UnexpectedStatus {
                    url: url.to_owned(),
                    code: 404,
                })
            })
    }
}

impl CatalogTransport for MockCatalogTransport {
    fn fetch(&self, url: &str, _timeout: Duration) -> Result<Value, TransportError> {
        self.lookup(url)
    }

    fn submit(&self, url: &str, body: &Value, _timeout: Duration) -> Result<Value, TransportError> {
        self.submissions
            .lock()
            .expect("mock transport lock")
            .push((url.to_owned(), body.clone()));
        self.lookup(url)
    }
}
