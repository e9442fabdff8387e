//! Test doubles and common utilities for reconciliation contract tests
//!
//! The doubles record every call so tests can assert on exactly which
//! provider operations a run performed.

#![allow(dead_code)]

use ddns_core::error::{Error, Result};
use ddns_core::traits::{DnsProvider, DnsRecord, IpSource, Zone};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A write issued through [`MockDnsProvider::update_record_address`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCall {
    pub record_id: String,
    pub record_name: String,
    pub address: String,
}

#[derive(Default)]
struct ProviderState {
    zones: Vec<Zone>,
    records: HashMap<String, Vec<DnsRecord>>,
    list_zones_calls: usize,
    list_records_calls: Vec<String>,
    updates: Vec<UpdateCall>,
    fail_update_of: Option<String>,
}

/// An in-memory DnsProvider that tracks calls
///
/// Clones share state, so a test can keep one handle while the reconciler
/// owns another. Successful updates are applied to the stored records,
/// which makes back-to-back runs observe the previous run's writes.
#[derive(Clone, Default)]
pub struct MockDnsProvider {
    state: Arc<Mutex<ProviderState>>,
}

impl MockDnsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a zone with its records
    pub fn with_zone(self, zone: Zone, records: Vec<DnsRecord>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.records.insert(zone.id.clone(), records);
            state.zones.push(zone);
        }
        self
    }

    /// Make updates of the named record fail with an API error
    pub fn failing_update_of(self, record_name: &str) -> Self {
        self.state.lock().unwrap().fail_update_of = Some(record_name.to_string());
        self
    }

    pub fn list_zones_calls(&self) -> usize {
        self.state.lock().unwrap().list_zones_calls
    }

    /// Zone ids whose records were listed, in call order
    pub fn list_records_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().list_records_calls.clone()
    }

    pub fn updates(&self) -> Vec<UpdateCall> {
        self.state.lock().unwrap().updates.clone()
    }

    pub fn update_call_count(&self) -> usize {
        self.state.lock().unwrap().updates.len()
    }

    /// Current content of a record by id
    pub fn content_of(&self, record_id: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .records
            .values()
            .flatten()
            .find(|record| record.id == record_id)
            .map(|record| record.content.clone())
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn list_zones(&self) -> Result<Vec<Zone>> {
        let mut state = self.state.lock().unwrap();
        state.list_zones_calls += 1;
        Ok(state.zones.clone())
    }

    async fn get_zone(&self, zone_id: &str) -> Result<Zone> {
        let state = self.state.lock().unwrap();
        state
            .zones
            .iter()
            .find(|zone| zone.id == zone_id)
            .cloned()
            .ok_or_else(|| Error::api(format!("Could not route to /zones/{zone_id}")))
    }

    async fn list_records(&self, zone: &Zone) -> Result<Vec<DnsRecord>> {
        let mut state = self.state.lock().unwrap();
        state.list_records_calls.push(zone.id.clone());
        Ok(state.records.get(&zone.id).cloned().unwrap_or_default())
    }

    async fn update_record_address(&self, record: &DnsRecord, address: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();

        if state.fail_update_of.as_deref() == Some(record.name.as_str()) {
            return Err(Error::api("Unable to get API response: Record is locked"));
        }

        state.updates.push(UpdateCall {
            record_id: record.id.clone(),
            record_name: record.name.clone(),
            address: address.to_string(),
        });

        if let Some(stored) = state
            .records
            .values_mut()
            .flatten()
            .find(|stored| stored.id == record.id)
        {
            stored.content = address.to_string();
        }

        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// An IpSource returning a fixed address and counting lookups
#[derive(Clone)]
pub struct StaticIpSource {
    address: Option<String>,
    calls: Arc<AtomicUsize>,
}

impl StaticIpSource {
    pub fn new(address: &str) -> Self {
        Self {
            address: Some(address.to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A source whose lookup always fails
    pub fn unreachable() -> Self {
        Self {
            address: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpSource for StaticIpSource {
    async fn current(&self) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.address
            .clone()
            .ok_or_else(|| Error::address("Request failed: connection refused"))
    }

    fn source_name(&self) -> &'static str {
        "static"
    }
}

pub fn zone(id: &str, name: &str) -> Zone {
    Zone {
        id: id.to_string(),
        name: name.to_string(),
    }
}

/// An `A` record in `zone`
pub fn a_record(zone: &Zone, id: &str, name: &str, content: &str) -> DnsRecord {
    typed_record(zone, id, name, "A", content)
}

pub fn typed_record(
    zone: &Zone,
    id: &str,
    name: &str,
    record_type: &str,
    content: &str,
) -> DnsRecord {
    DnsRecord {
        id: id.to_string(),
        zone_id: zone.id.clone(),
        zone_name: zone.name.clone(),
        name: name.to_string(),
        record_type: record_type.to_string(),
        content: content.to_string(),
        ttl: 1,
    }
}

/// Provider with zone `example.com` holding apex and `www` A records
pub fn example_provider(apex: &str, www: &str) -> MockDnsProvider {
    let example = zone("zone-example", "example.com");
    let records = vec![
        a_record(&example, "rec-apex", "example.com", apex),
        a_record(&example, "rec-www", "www.example.com", www),
    ];
    MockDnsProvider::new().with_zone(example, records)
}
