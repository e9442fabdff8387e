//! Core reconciliation engine
//!
//! The Reconciler is responsible for:
//! - Matching configured zones against the provider's zones
//! - Matching configured entries against each zone's records
//! - Choosing the desired address (override or public address)
//! - Writing back only the records whose address differs
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐        ┌──────────────┐        ┌─────────────┐
//! │   Config    │──────▶ │  Reconciler  │──────▶ │ DnsProvider │
//! └─────────────┘        └──────────────┘        │ (read/write)│
//!                               ▲                └─────────────┘
//!                               │
//!                   ┌───────────────────────┐
//!                   │ PublicAddressResolver │
//!                   └───────────────────────┘
//! ```
//!
//! ## Run Flow
//!
//! 1. List zones once
//! 2. For each configured zone (declared order): find it by exact name, or
//!    warn and skip
//! 3. List the zone's records
//! 4. For each configured entry (declared order): find the first record with
//!    the exact target name, or warn and skip
//! 5. Update the record if its content differs from the desired address
//!
//! Zones and records are processed strictly one at a time. Any provider or
//! address error aborts the remaining run.

use crate::config::{Config, DnsEntry, ZoneConfig};
use crate::error::{Error, Result};
use crate::resolver::PublicAddressResolver;
use crate::traits::{DnsProvider, DnsRecord, IpSource, Zone};
use std::fmt;
use tracing::{debug, info, warn};

/// A record whose address was rewritten during the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordUpdate {
    /// Fully-qualified record name
    pub name: String,
    /// Content before the update
    pub previous: String,
    /// Content written
    pub current: String,
}

/// What happened to the entries of one zone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneChanges {
    /// Records written, in entry order
    pub updated: Vec<RecordUpdate>,
    /// Records that already held the desired address
    pub unchanged: Vec<String>,
    /// Target names with no matching record
    pub missing: Vec<String>,
}

impl ZoneChanges {
    pub fn is_up_to_date(&self) -> bool {
        self.updated.is_empty()
    }
}

/// Outcome of one configured zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneOutcome {
    /// The account has no zone with this name
    NotFound,
    /// The zone was found and its entries reconciled
    Reconciled(ZoneChanges),
}

/// Per-zone entry of a [`RunSummary`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneReport {
    /// Configured zone name
    pub name: String,
    pub outcome: ZoneOutcome,
}

impl ZoneReport {
    /// Number of records written in this zone
    pub fn updated_records(&self) -> usize {
        match &self.outcome {
            ZoneOutcome::Reconciled(changes) => changes.updated.len(),
            ZoneOutcome::NotFound => 0,
        }
    }
}

/// Result of a full reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// One report per configured zone, in declared order
    pub zones: Vec<ZoneReport>,
}

impl RunSummary {
    /// Number of zones with at least one record written
    pub fn updated_zones(&self) -> usize {
        self.zones
            .iter()
            .filter(|zone| zone.updated_records() > 0)
            .count()
    }

    /// Number of records written across all zones
    pub fn updated_records(&self) -> usize {
        self.zones.iter().map(ZoneReport::updated_records).sum()
    }

    /// Configured zones the account does not own
    pub fn zones_not_found(&self) -> impl Iterator<Item = &str> {
        self.zones
            .iter()
            .filter(|zone| zone.outcome == ZoneOutcome::NotFound)
            .map(|zone| zone.name.as_str())
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.updated_zones() {
            0 => write!(f, "All zones up to date."),
            n => write!(
                f,
                "Updated {} DNS records in {} zones.",
                self.updated_records(),
                n
            ),
        }
    }
}

/// Core reconciler
///
/// Holds the provider and the resolve-once address cache for a single run.
/// Create a fresh reconciler per run; the cached address is never
/// invalidated.
pub struct Reconciler {
    /// DNS provider for reading zones/records and writing addresses
    provider: Box<dyn DnsProvider>,

    /// Default desired-address source
    resolver: PublicAddressResolver,
}

impl Reconciler {
    /// Create a reconciler from a provider and a public address source
    pub fn new(provider: Box<dyn DnsProvider>, ip_source: Box<dyn IpSource>) -> Self {
        Self::with_resolver(provider, PublicAddressResolver::new(ip_source))
    }

    /// Create a reconciler around an existing resolver
    pub fn with_resolver(provider: Box<dyn DnsProvider>, resolver: PublicAddressResolver) -> Self {
        Self { provider, resolver }
    }

    /// Run one full reconciliation pass over `config`
    ///
    /// # Returns
    ///
    /// - `Ok(RunSummary)`: Every zone was processed (some may be not found)
    /// - `Err(Error)`: A provider or address lookup failed; the run stopped
    pub async fn run(&self, config: &Config) -> Result<RunSummary> {
        let zones = self.provider.list_zones().await?;
        debug!(
            provider = self.provider.provider_name(),
            "Account has {} zones",
            zones.len()
        );

        let mut summary = RunSummary::default();

        for zone_config in &config.zones {
            let zone = match find_zone(&zones, &zone_config.name) {
                Ok(zone) => zone,
                Err(e) => {
                    warn!("{}: Zone does not exist under given account ({})", zone_config.name, e);
                    summary.zones.push(ZoneReport {
                        name: zone_config.name.clone(),
                        outcome: ZoneOutcome::NotFound,
                    });
                    continue;
                }
            };

            let changes = self.reconcile_zone(zone, zone_config).await?;
            summary.zones.push(ZoneReport {
                name: zone_config.name.clone(),
                outcome: ZoneOutcome::Reconciled(changes),
            });
        }

        Ok(summary)
    }

    /// Reconcile the configured entries of one resolved zone
    pub async fn reconcile_zone(&self, zone: &Zone, zone_config: &ZoneConfig) -> Result<ZoneChanges> {
        let mut records = self.provider.list_records(zone).await?;
        let mut changes = ZoneChanges::default();

        for entry in &zone_config.dns_entries {
            let target = entry.record_name(&zone.name);

            let record = match find_record_mut(&mut records, entry, &target) {
                Ok(record) => record,
                Err(e) => {
                    // Creating absent records is not supported
                    warn!("{}: {}, skipping", zone.name, e);
                    changes.missing.push(target);
                    continue;
                }
            };

            let desired = match &entry.desired_address {
                Some(address) => address.clone(),
                None => self.resolver.resolve().await?,
            };

            if record.content == desired {
                debug!("{}: Already points to {}", record.name, desired);
                changes.unchanged.push(target);
                continue;
            }

            info!(
                "{}: Updating IP from {} to {}.",
                record.name, record.content, desired
            );
            self.provider.update_record_address(record, &desired).await?;

            let previous = std::mem::replace(&mut record.content, desired.clone());
            changes.updated.push(RecordUpdate {
                name: target,
                previous,
                current: desired,
            });
        }

        if changes.is_up_to_date() {
            info!("{}: All DNS records up to date.", zone.name);
        } else {
            info!("{}: Updated {} DNS records.", zone.name, changes.updated.len());
        }

        Ok(changes)
    }
}

/// First zone whose name equals `name` exactly
fn find_zone<'a>(zones: &'a [Zone], name: &str) -> Result<&'a Zone> {
    zones
        .iter()
        .find(|zone| zone.name == name)
        .ok_or_else(|| Error::zone_not_found(name))
}

/// First record (in provider order) satisfying `entry`
fn find_record_mut<'a>(
    records: &'a mut [DnsRecord],
    entry: &DnsEntry,
    target: &str,
) -> Result<&'a mut DnsRecord> {
    records
        .iter_mut()
        .find(|record| entry.matches(target, &record.name, &record.record_type))
        .ok_or_else(|| Error::record_not_found(target))
}
