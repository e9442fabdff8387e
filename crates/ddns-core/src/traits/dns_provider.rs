// # DNS Provider Trait
//
// Defines the interface for reading zones/records and writing record
// addresses via a provider API.
//
// ## Implementations
//
// - Cloudflare: `ddns-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::DnsProvider;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//
//     let zones = provider.list_zones().await?;
//     let records = provider.list_records(&zones[0]).await?;
//     provider.update_record_address(&records[0], "203.0.113.7").await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A DNS zone owned by the account
///
/// Sourced entirely from the provider and never modified locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Provider-specific zone identifier
    pub id: String,
    /// Zone name (e.g. `example.com`)
    pub name: String,
}

/// A single DNS record as reported by the provider
///
/// `content` is the address value being reconciled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Provider-specific record identifier
    pub id: String,
    /// Identifier of the owning zone
    #[serde(default)]
    pub zone_id: String,
    /// Name of the owning zone
    #[serde(default)]
    pub zone_name: String,
    /// Fully-qualified record name
    pub name: String,
    /// Record type (`A`, `AAAA`, `CNAME`, ...)
    #[serde(rename = "type")]
    pub record_type: String,
    /// Record value
    pub content: String,
    /// Time-to-live in seconds (1 = automatic)
    #[serde(default)]
    pub ttl: u32,
}

/// Trait for DNS provider implementations
///
/// Every method is a plain request/response against the provider: no
/// retries, no backoff, no caching between calls. Any failure is returned
/// as an error and aborts the reconciliation run.
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// List every zone visible to the credential
    async fn list_zones(&self) -> Result<Vec<Zone>, crate::Error>;

    /// Fetch a single zone by identifier
    async fn get_zone(&self, zone_id: &str) -> Result<Zone, crate::Error>;

    /// List every DNS record in `zone`, in provider order
    async fn list_records(&self, zone: &Zone) -> Result<Vec<DnsRecord>, crate::Error>;

    /// Replace exactly the address field of `record`
    ///
    /// Success is inferred from the provider's response envelope; the
    /// record is not re-fetched.
    async fn update_record_address(
        &self,
        record: &DnsRecord,
        address: &str,
    ) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
