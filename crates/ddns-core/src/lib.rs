// # ddns-core
//
// Core library for keeping DNS records in sync with the public address.
//
// ## Architecture Overview
//
// This library provides the core functionality for one-shot DNS syncing:
// - **IpSource**: Trait for looking up the current public address
// - **DnsProvider**: Trait for listing zones/records and updating addresses
// - **PublicAddressResolver**: Resolve-once cache over an `IpSource`
// - **Reconciler**: Compares desired records with observed ones and writes
//   only the differences
// - **Config**: Validated user configuration (zones and record entries)
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from provider and
//    address-source implementations
// 2. **Single Pass**: One sequential run per process; scheduling is external
// 3. **Minimal Writes**: A record is written only when its address differs
// 4. **Library-First**: All core functionality can be used as a library

pub mod traits;
pub mod engine;
pub mod resolver;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{DnsProvider, DnsRecord, IpSource, Zone};
pub use engine::{Reconciler, RecordUpdate, RunSummary, ZoneChanges, ZoneOutcome, ZoneReport};
pub use resolver::PublicAddressResolver;
pub use config::{Config, DnsEntry, ZoneConfig};
pub use error::{ConfigError, Error, Result, Violation, ViolationKind};
