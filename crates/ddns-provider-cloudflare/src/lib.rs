// # Cloudflare DNS Provider
//
// This crate provides the Cloudflare implementation of `DnsProvider` for the
// DDNS system.
//
// ## Behavior
//
// - One HTTP request per call (plus one per extra page when listing)
// - Every response is read through the v4 envelope
//   `{ success, errors: [{code, message}], result, result_info }`
// - `success: false` becomes `Error::Api` carrying every error message
// - Transport failures become `Error::Http`
// - HTTP timeout configured (30 seconds)
// - Dry-run mode: reads are performed, the PATCH is logged and skipped
// - NO retry, NO backoff, NO caching between calls
//
// ## Security Requirements
//
// - API token NEVER appears in logs or Debug output
// - Client construction fails fast if the token is empty
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List Zones: GET `/zones`
// - Zone Details: GET `/zones/:zone_id`
// - List DNS Records: GET `/zones/:zone_id/dns_records`
// - Patch DNS Record: PATCH `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use ddns_core::traits::{DnsProvider, DnsRecord, Zone};
use ddns_core::{Error, Result};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Page size used when listing zones
const ZONES_PER_PAGE: u32 = 50;

/// Page size used when listing DNS records
const RECORDS_PER_PAGE: u32 = 100;

/// Settings for a [`CloudflareClient`]
#[derive(Clone)]
pub struct CloudflareConfig {
    /// API token with Zone:Read and DNS:Edit permissions
    /// ⚠️ NEVER log this value
    pub api_token: String,

    /// API base URL, without trailing slash
    pub base_url: String,

    /// Per-request timeout
    pub timeout: Duration,

    /// If true, perform reads but skip record updates
    pub dry_run: bool,
}

impl CloudflareConfig {
    /// Settings for the public API in live mode
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            base_url: CLOUDFLARE_API_BASE.to_string(),
            timeout: DEFAULT_HTTP_TIMEOUT,
            dry_run: false,
        }
    }

    /// Point the client at a different API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

// Custom Debug implementation that hides the API token
impl fmt::Debug for CloudflareConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudflareConfig")
            .field("api_token", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

/// Cloudflare API v4 client
///
/// Stateless apart from its settings and the pooled HTTP client.
#[derive(Debug)]
pub struct CloudflareClient {
    config: CloudflareConfig,
    client: reqwest::Client,
}

/// A message from the envelope's `errors` or `messages` list
#[derive(Debug, Clone, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct ResultInfo {
    #[serde(default)]
    total_pages: u32,
}

/// Response envelope shared by every endpoint
#[derive(Debug, Deserialize)]
struct Envelope {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    #[serde(default)]
    result: Value,
    #[serde(default)]
    result_info: Option<ResultInfo>,
}

impl Envelope {
    fn into_result<T: DeserializeOwned>(self) -> Result<T> {
        Ok(serde_json::from_value(self.result)?)
    }
}

impl CloudflareClient {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// - `Error::InvalidInput` if the token is empty
    /// - `Error::Http` if the HTTP client cannot be built
    pub fn new(config: CloudflareConfig) -> Result<Self> {
        if config.api_token.is_empty() {
            return Err(Error::invalid_input("Cloudflare API token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        if config.dry_run {
            tracing::warn!("Cloudflare provider running in DRY-RUN mode - no changes will be made");
        }

        Ok(Self { config, client })
    }

    /// Whether record updates are skipped
    pub fn is_dry_run(&self) -> bool {
        self.config.dry_run
    }

    /// Send one request and unwrap the envelope
    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Envelope> {
        let url = format!("{}{}", self.config.base_url, path);
        tracing::debug!(method = %method, url = %url, "Cloudflare API request");

        let mut request = self
            .client
            .request(method, &url)
            .bearer_auth(&self.config.api_token)
            .query(query);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::http(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::http(format!("Failed to read response: {}", e)))?;

        match serde_json::from_slice::<Envelope>(&body) {
            Ok(envelope) if !envelope.success => Err(Error::api(format!(
                "Unable to get API response: {}",
                join_errors(&envelope.errors, status)
            ))),
            Ok(envelope) if status.is_success() => Ok(envelope),
            Ok(_) => Err(status_error(status, path, "")),
            Err(e) if status.is_success() => Err(Error::Json(e)),
            Err(_) => Err(status_error(status, path, &String::from_utf8_lossy(&body))),
        }
    }

    /// Fetch every page of a list endpoint, preserving provider order
    async fn get_all<T: DeserializeOwned>(&self, path: &str, per_page: u32) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut page: u32 = 1;

        loop {
            let query = [("page", page.to_string()), ("per_page", per_page.to_string())];
            let envelope = self.send(Method::GET, path, &query, None).await?;
            let total_pages = envelope
                .result_info
                .as_ref()
                .map_or(1, |info| info.total_pages);

            let batch: Vec<T> = envelope.into_result()?;
            let exhausted = batch.is_empty();
            items.extend(batch);

            if exhausted || page >= total_pages {
                break;
            }
            page += 1;
        }

        Ok(items)
    }
}

#[async_trait]
impl DnsProvider for CloudflareClient {
    /// ```http
    /// GET /zones?page=1&per_page=50
    /// Authorization: Bearer <token>
    /// ```
    async fn list_zones(&self) -> Result<Vec<Zone>> {
        let zones: Vec<Zone> = self.get_all("/zones", ZONES_PER_PAGE).await?;
        tracing::debug!("Listed {} zones", zones.len());
        Ok(zones)
    }

    async fn get_zone(&self, zone_id: &str) -> Result<Zone> {
        self.send(Method::GET, &format!("/zones/{}", zone_id), &[], None)
            .await?
            .into_result()
    }

    /// ```http
    /// GET /zones/:zone_id/dns_records?page=1&per_page=100
    /// Authorization: Bearer <token>
    /// ```
    async fn list_records(&self, zone: &Zone) -> Result<Vec<DnsRecord>> {
        let path = format!("/zones/{}/dns_records", zone.id);
        let mut records: Vec<DnsRecord> = self.get_all(&path, RECORDS_PER_PAGE).await?;

        // Newer API responses omit the owning zone on each record
        for record in &mut records {
            if record.zone_id.is_empty() {
                record.zone_id.clone_from(&zone.id);
            }
            if record.zone_name.is_empty() {
                record.zone_name.clone_from(&zone.name);
            }
        }

        tracing::debug!("{}: Listed {} DNS records", zone.name, records.len());
        Ok(records)
    }

    /// ```http
    /// PATCH /zones/:zone_id/dns_records/:record_id
    /// { "content": "203.0.113.7" }
    /// ```
    async fn update_record_address(&self, record: &DnsRecord, address: &str) -> Result<()> {
        let path = format!("/zones/{}/dns_records/{}", record.zone_id, record.id);
        let payload = serde_json::json!({ "content": address });

        if self.config.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send PATCH request to {} with payload: {}",
                path,
                payload
            );
            return Ok(());
        }

        self.send(Method::PATCH, &path, &[], Some(&payload)).await?;
        tracing::debug!("DNS record updated successfully: {} -> {}", record.name, address);
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }
}

/// Concatenate envelope errors into one message
fn join_errors(errors: &[ApiMessage], status: StatusCode) -> String {
    if errors.is_empty() {
        return format!("no error details (status {})", status);
    }

    errors
        .iter()
        .map(|e| format!("{} (code {})", e.message, e.code))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Describe a non-2xx response whose body is not an envelope
fn status_error(status: StatusCode, path: &str, body: &str) -> Error {
    match status.as_u16() {
        401 | 403 => Error::api(format!(
            "Authentication failed: Invalid API token or insufficient permissions. Status: {}",
            status
        )),
        404 => Error::api(format!("Not found: {}. Status: {}", path, status)),
        429 => Error::api(format!(
            "Rate limit exceeded. Please retry later. Status: {}",
            status
        )),
        500..=599 => Error::api(format!("Cloudflare server error: {} - {}", status, body)),
        _ => Error::api(format!("Unexpected response: {} - {}", status, body)),
    }
}
