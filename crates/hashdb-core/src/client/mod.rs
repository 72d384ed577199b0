//! High-level catalog queries.
//!
//! [`CatalogClient`] composes a [`ClientConfig`], a [`CatalogTransport`],
//! and the validators: each query method builds the endpoint URL, performs
//! one exchange, validates the returned document record by record, and
//! returns accepted records together with the per-record rejections. A
//! rejection is never fatal here; callers own the pass/fail threshold.

use serde_json::json;
use tracing::{debug, warn};

use crate::catalog::{
    validate_algorithms, validate_hashes, validate_hits, Algorithm, HashResolution, HitStatistic,
    RejectionReason,
};
use crate::config::ClientConfig;
use crate::transport::{CatalogTransport, TransportError};

/// A validated batch: accepted records plus the rejections for the same
/// page, both in input order.
pub type Validated<T> = (Vec<T>, Vec<RejectionReason>);

/// Typed client over a catalog transport.
#[derive(Debug)]
pub struct CatalogClient<T> {
    config: ClientConfig,
    transport: T,
}

impl<T: CatalogTransport> CatalogClient<T> {
    /// Creates a client from a configuration and a transport.
    #[must_use]
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    /// The configuration this client was built with.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetches every algorithm definition the catalog serves.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the exchange fails; per-record
    /// validation failures are returned, not raised.
    pub fn fetch_algorithms(&self) -> Result<Validated<Algorithm>, TransportError> {
        let url = format!("{}/hash", self.config.api_url);
        let doc = self.transport.fetch(&url, self.config.timeout())?;
        Ok(self.report(&url, validate_algorithms(&doc)))
    }

    /// Resolves one hash value under the given algorithm.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the exchange fails.
    pub fn resolve_hash(
        &self,
        algorithm: &str,
        hash: u64,
    ) -> Result<Validated<HashResolution>, TransportError> {
        let url = format!("{}/hash/{algorithm}/{hash}", self.config.api_url);
        let doc = self.transport.fetch(&url, self.config.timeout())?;
        Ok(self.report(&url, validate_hashes(&doc)))
    }

    /// Fetches every resolution a module exports under an algorithm and
    /// permutation.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the exchange fails.
    pub fn fetch_module(
        &self,
        module: &str,
        algorithm: &str,
        permutation: &str,
    ) -> Result<Validated<HashResolution>, TransportError> {
        let url = format!(
            "{}/module/{module}/{algorithm}/{permutation}",
            self.config.api_url
        );
        let doc = self.transport.fetch(&url, self.config.timeout())?;
        Ok(self.report(&url, validate_hashes(&doc)))
    }

    /// Asks the catalog which algorithms the given hash values hit.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the exchange fails.
    pub fn hunt(&self, hashes: &[u64]) -> Result<Validated<HitStatistic>, TransportError> {
        let url = format!("{}/hunt", self.config.api_url);
        let body = json!({ "hashes": hashes });
        let doc = self.transport.submit(&url, &body, self.config.timeout())?;
        Ok(self.report(&url, validate_hits(&doc)))
    }

    /// Logs a page's rejections and passes the batch through.
    fn report<R>(&self, url: &str, batch: Validated<R>) -> Validated<R> {
        let (accepted, rejected) = batch;
        debug!(
            url = %url,
            accepted = accepted.len(),
            rejected = rejected.len(),
            "catalog page validated"
        );
        for reason in &rejected {
            warn!(url = %url, %reason, "rejected catalog record");
        }
        (accepted, rejected)
    }
}
