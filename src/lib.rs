//! # geobatch
//!
//! Resolve free-text addresses to geographic coordinates through the Yandex
//! geocoder HTTP API, singly or as a batch of concurrent fetches driven by a
//! CSV file.
//!
//! ## Features
//!
//! - **Single-address mode**: format, fetch and print the matches for one
//!   address
//! - **Batch mode**: one concurrent request per CSV row, results written
//!   back to a CSV with the original columns preserved
//! - **Failure isolation**: one failed fetch or malformed result never
//!   aborts the rest of a batch
//! - **Stable correlation**: responses are matched back to input rows by a
//!   request id assigned up front, so duplicate addresses cannot collide
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use geobatch::Geocoder;
//!
//! # async fn run() -> geobatch::Result<()> {
//! let geocoder = Geocoder::new();
//!
//! // Resolve one address
//! let records = geocoder.resolve("Baramzy, Troitskaya 3").await?;
//! for record in &records {
//!     println!("{};{}", record.coordinate, record.resolved_address);
//! }
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod batch;
pub mod client;
pub mod error;
pub mod format;
pub mod output;
pub mod parser;

// Re-export main API
pub use batch::{BatchCoordinator, BatchEntry, BatchSummary};
pub use client::{DEFAULT_ENDPOINT, GeocodeClient, RequestId};
pub use error::{Error, Result};
pub use format::AddressFormat;
pub use parser::GeoRecord;

use std::path::Path;

/// Main entry point for geocoding.
///
/// Holds the configured HTTP client and address format, and exposes the two
/// modes of operation: resolving a single address and running a CSV batch.
///
/// # Examples
///
/// ```rust,no_run
/// use std::path::Path;
/// use geobatch::{Geocoder, GeocoderConfig};
///
/// # async fn run() -> geobatch::Result<()> {
/// let config = GeocoderConfig::builder()
///     .max_in_flight(16)
///     .build();
/// let geocoder = Geocoder::with_config(config);
///
/// let summary = geocoder
///     .run_batch(Path::new("addresses.csv"), Path::new("output_addresses.csv"))
///     .await?;
/// println!("{} records written", summary.records_written);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Geocoder {
    config: GeocoderConfig,
    client: GeocodeClient,
}

impl Geocoder {
    /// Create a geocoder with the default configuration.
    pub fn new() -> Self {
        Self::with_config(GeocoderConfig::default())
    }

    /// Create a geocoder with a custom configuration.
    pub fn with_config(config: GeocoderConfig) -> Self {
        let mut client = GeocodeClient::new().with_endpoint(&config.endpoint);
        if let Some(max_in_flight) = config.max_in_flight {
            client = client.with_max_in_flight(max_in_flight);
        }
        Self { config, client }
    }

    /// Resolve a single raw address: format it, fetch the response and
    /// parse it into records.
    ///
    /// # Errors
    ///
    /// Returns an error when the fetch fails; in single-address mode there
    /// is no other request the failure could be isolated to. Parsing never
    /// fails — an unusable response yields an empty record list.
    pub async fn resolve(&self, raw_address: &str) -> Result<Vec<GeoRecord>> {
        let address = self.config.address_format.format(raw_address);
        let payload = self.client.fetch_one(&address).await?;
        Ok(parser::parse_response(&payload))
    }

    /// Geocode a whole input CSV concurrently and write the output file.
    ///
    /// # Errors
    ///
    /// Returns an error on CSV read/write failures. Individual fetch
    /// failures are logged and drop only that address's rows.
    pub async fn run_batch(&self, input: &Path, output: &Path) -> Result<BatchSummary> {
        BatchCoordinator::new(self.client.clone(), self.config.address_format.clone())
            .run(input, output)
            .await
    }

    /// Get the configuration used by this instance.
    pub fn config(&self) -> &GeocoderConfig {
        &self.config
    }
}

impl Default for Geocoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for the geocoder.
#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    /// Geocoding service endpoint URL.
    pub endpoint: String,

    /// Qualifiers prepended to every raw address.
    pub address_format: AddressFormat,

    /// Cap on concurrently in-flight batch requests; `None` launches the
    /// whole batch at once.
    pub max_in_flight: Option<usize>,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            address_format: AddressFormat::default(),
            max_in_flight: None,
        }
    }
}

impl GeocoderConfig {
    /// Create a new configuration builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use geobatch::{AddressFormat, GeocoderConfig};
    ///
    /// let config = GeocoderConfig::builder()
    ///     .address_format(AddressFormat::new().with_city("Slobodskoy"))
    ///     .max_in_flight(8)
    ///     .build();
    /// ```
    pub fn builder() -> GeocoderConfigBuilder {
        GeocoderConfigBuilder::new()
    }
}

/// Builder for [`GeocoderConfig`].
#[derive(Debug, Clone, Default)]
pub struct GeocoderConfigBuilder {
    endpoint: Option<String>,
    address_format: Option<AddressFormat>,
    max_in_flight: Option<usize>,
}

impl GeocoderConfigBuilder {
    /// Create a new configuration builder with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the geocoding endpoint URL.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the address format.
    pub fn address_format(mut self, format: AddressFormat) -> Self {
        self.address_format = Some(format);
        self
    }

    /// Cap the number of concurrently in-flight batch requests.
    pub fn max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = Some(max_in_flight);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> GeocoderConfig {
        GeocoderConfig {
            endpoint: self
                .endpoint
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            address_format: self.address_format.unwrap_or_default(),
            max_in_flight: self.max_in_flight,
        }
    }
}
