// # Public Address Resolver
//
// Resolve-once cache in front of an [`IpSource`].
//
// ## Contract
//
// - The first successful lookup is cached for the lifetime of the resolver
//   (one run); it is never invalidated.
// - A failed lookup is not cached; the error propagates and ends the run.
// - Nothing is fetched until `resolve()` is first awaited.

use crate::traits::IpSource;
use crate::Result;
use tokio::sync::OnceCell;
use tracing::debug;

/// Resolve-once public address cache
pub struct PublicAddressResolver {
    source: Box<dyn IpSource>,
    cached: OnceCell<String>,
}

impl PublicAddressResolver {
    /// Wrap an address source
    pub fn new(source: Box<dyn IpSource>) -> Self {
        Self {
            source,
            cached: OnceCell::new(),
        }
    }

    /// Return the public address, looking it up on first use only
    pub async fn resolve(&self) -> Result<String> {
        let address = self
            .cached
            .get_or_try_init(|| async {
                let address = self.source.current().await?;
                debug!(
                    source = self.source.source_name(),
                    "Resolved public address: {}", address
                );
                Ok::<_, crate::Error>(address)
            })
            .await?;

        Ok(address.clone())
    }

    /// The cached address, if one has been resolved
    pub fn cached(&self) -> Option<&str> {
        self.cached.get().map(String::as_str)
    }
}
