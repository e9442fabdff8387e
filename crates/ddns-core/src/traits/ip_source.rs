// # IP Source Trait
//
// Defines the interface for looking up the machine's public address.
//
// ## Implementations
//
// - HTTP lookup service: `ddns-ip-http` crate
//
// Sources are not expected to cache; the resolve-once contract lives in
// [`crate::resolver::PublicAddressResolver`].

use async_trait::async_trait;

/// Trait for public address sources
///
/// The returned address is treated as an opaque string: no format
/// validation is performed by callers.
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Fetch the current public address
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The address as reported by the source
    /// - `Err(Error)`: If the lookup failed (fatal for the run)
    async fn current(&self) -> Result<String, crate::Error>;

    /// Get the source name (for logging/debugging)
    fn source_name(&self) -> &'static str;
}
