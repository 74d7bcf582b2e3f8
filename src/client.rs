//! HTTP client for the Yandex geocoder API.

use futures::stream::{self, StreamExt};
use serde_json::Value;
use tracing::{debug, error};

use crate::error::{Error, Result};

/// Default geocoding endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://geocode-maps.yandex.ru/1.x/";

/// Stable identifier assigned to each batch request when the batch is built.
///
/// Completed responses are correlated back to their originating input row
/// through this id, never through the formatted address text, so two rows
/// that format to the identical address cannot collide.
pub type RequestId = usize;

/// Client for the geocoder HTTP API.
///
/// Issues `GET <endpoint>?format=json&geocode=<address>` requests, either
/// singly or as a batch of concurrent fetches.
#[derive(Debug, Clone)]
pub struct GeocodeClient {
    http: reqwest::Client,
    endpoint: String,
    max_in_flight: Option<usize>,
}

impl GeocodeClient {
    /// Create a client against the default endpoint with unbounded
    /// batch concurrency.
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            max_in_flight: None,
        }
    }

    /// Set a custom endpoint URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Cap the number of concurrently in-flight batch requests.
    ///
    /// Without a cap every request in a batch is launched simultaneously,
    /// which is fine for small batches but a scalability ceiling for large
    /// CSV inputs.
    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = Some(max_in_flight.max(1));
        self
    }

    /// Fetch the raw geocoder response for a single formatted address.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Network`] on connection failures and non-2xx
    /// statuses, and [`Error::MalformedResponse`] when the body is not
    /// valid JSON. Whether that aborts the run is the caller's decision:
    /// single-address mode propagates, batch mode drops the one request.
    pub async fn fetch_one(&self, address: &str) -> Result<Value> {
        debug!(address, "fetching geocode");
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[("format", "json"), ("geocode", address)])
            .send()
            .await
            .map_err(|e| Error::network(format!("request for {address:?} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::network(format!(
                "geocoder returned {status} for {address:?}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| Error::malformed_response(format!("invalid JSON body for {address:?}: {e}")))
    }

    /// Fetch a whole batch concurrently, one request per entry.
    ///
    /// Results are yielded as requests complete, so **completion order is
    /// not input order**; callers must treat the returned set as unordered
    /// and correlate through the [`RequestId`]. A failure in one request
    /// never cancels or fails the others — each failed fetch is logged and
    /// excluded from the result. No retries, no timeout beyond the
    /// transport defaults.
    pub async fn fetch_batch(&self, requests: Vec<(RequestId, String)>) -> Vec<(RequestId, Value)> {
        let in_flight = self.max_in_flight.unwrap_or(requests.len()).max(1);
        debug!(
            requests = requests.len(),
            in_flight, "launching batch fetch"
        );

        let mut pending = stream::iter(requests.into_iter().map(|(id, address)| async move {
            let result = self.fetch_one(&address).await;
            (id, address, result)
        }))
        .buffer_unordered(in_flight);

        let mut completed = Vec::new();
        while let Some((id, address, result)) = pending.next().await {
            match result {
                Ok(payload) => completed.push((id, payload)),
                Err(e) => error!(address = %address, "dropping failed fetch: {e}"),
            }
        }
        completed
    }
}

impl Default for GeocodeClient {
    fn default() -> Self {
        Self::new()
    }
}
