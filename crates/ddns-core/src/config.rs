//! Configuration types for the DDNS system
//!
//! The user configuration is a JSON document:
//!
//! ```json
//! {
//!   "apiToken": "<token>",
//!   "zones": [
//!     { "name": "example.com", "dnsEntries": ["", "www", { "name": "vpn", "ip": "10.0.0.1" }] }
//!   ]
//! }
//! ```
//!
//! Entries are either a bare string (subdomain shorthand) or an object with
//! optional `name`, `ip` and `type` fields. Both forms are normalized into a
//! single [`DnsEntry`].
//!
//! Validation walks the parsed document explicitly so that every violation
//! is reported with its property path instead of stopping at the first one.

use crate::error::{ConfigError, Violation};
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};

/// Directory under `~/.config` holding the configuration file
const CONFIG_DIR_NAME: &str = "cloudflare-ddns";

/// Configuration file name
const CONFIG_FILE_NAME: &str = "config.json";

/// Root of user intent, loaded once per run
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    /// Provider API token
    /// ⚠️ NEVER log this value
    pub api_token: String,

    /// Zones to reconcile, in declared order
    pub zones: Vec<ZoneConfig>,
}

// Custom Debug implementation that hides the API token
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_token", &"<REDACTED>")
            .field("zones", &self.zones)
            .finish()
    }
}

impl Config {
    /// Create a configuration from already-typed parts
    pub fn new(api_token: impl Into<String>, zones: Vec<ZoneConfig>) -> Self {
        Self {
            api_token: api_token.into(),
            zones,
        }
    }

    /// Default location: `$HOME/.config/cloudflare-ddns/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| {
            home.join(".config")
                .join(CONFIG_DIR_NAME)
                .join(CONFIG_FILE_NAME)
        })
    }

    /// Read, parse and validate the configuration file at `path`
    ///
    /// Reads exactly one file; performs no network access.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(path, &text)
    }

    /// Parse and validate a configuration document held in memory
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Self::parse(Path::new("<inline>"), text)
    }

    fn parse(path: &Path, text: &str) -> Result<Self, ConfigError> {
        let document: Value = serde_json::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_value(&document).map_err(|violations| ConfigError::Invalid {
            path: path.to_path_buf(),
            violations,
        })
    }

    /// Validate a parsed document, collecting every violation
    pub fn from_value(document: &Value) -> Result<Self, Vec<Violation>> {
        let mut violations = Vec::new();

        let Some(root) = document.as_object() else {
            return Err(vec![Violation::wrong_type("config", "an object")]);
        };

        let api_token = required_string(root, "apiToken", "apiToken", &mut violations);

        let zones = match required_array(root, "zones", "zones", &mut violations) {
            Some(items) => items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| ZoneConfig::from_value(i, item, &mut violations))
                .collect(),
            None => Vec::new(),
        };

        if !violations.is_empty() {
            return Err(violations);
        }

        Ok(Self {
            api_token: api_token.unwrap_or_default(),
            zones,
        })
    }
}

/// One configured zone and the records to keep in sync under it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneConfig {
    /// Zone name as the provider reports it (e.g. `example.com`)
    pub name: String,

    /// Records to reconcile, in declared order
    pub dns_entries: Vec<DnsEntry>,
}

impl ZoneConfig {
    pub fn new(name: impl Into<String>, dns_entries: Vec<DnsEntry>) -> Self {
        Self {
            name: name.into(),
            dns_entries,
        }
    }

    fn from_value(index: usize, value: &Value, violations: &mut Vec<Violation>) -> Option<Self> {
        let at = format!("zone[{index}]");
        let Some(obj) = value.as_object() else {
            violations.push(Violation::wrong_type(at, "an object"));
            return None;
        };

        let name = required_string(obj, "name", &format!("{at}.name"), violations);
        let entries = required_array(obj, "dnsEntries", &format!("{at}.dnsEntries"), violations);

        let dns_entries: Vec<DnsEntry> = entries
            .map(|items| {
                items
                    .iter()
                    .enumerate()
                    .filter_map(|(j, item)| {
                        DnsEntry::from_value(&format!("{at}.dnsEntries[{j}]"), item, violations)
                    })
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            name: name?,
            dns_entries,
        })
    }
}

/// A desired record within a zone
///
/// `subdomain: None` targets the zone apex; `desired_address: None` means
/// "use the resolved public address".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DnsEntry {
    /// Label(s) in front of the zone name
    pub subdomain: Option<String>,

    /// Explicit address overriding the public address
    pub desired_address: Option<String>,

    /// Restrict matching to records of this type (e.g. `A`, `AAAA`)
    pub record_type: Option<String>,
}

impl DnsEntry {
    /// Entry for the bare zone apex
    pub fn apex() -> Self {
        Self::default()
    }

    /// Entry for `subdomain.<zone>`; an empty subdomain is the apex
    pub fn subdomain(subdomain: impl Into<String>) -> Self {
        Self {
            subdomain: non_empty(subdomain.into()),
            ..Self::default()
        }
    }

    /// Pin this entry to an explicit address
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.desired_address = non_empty(address.into());
        self
    }

    /// Only match records of the given type
    pub fn with_record_type(mut self, record_type: impl Into<String>) -> Self {
        self.record_type = non_empty(record_type.into());
        self
    }

    /// Fully-qualified record name this entry targets within `zone_name`
    pub fn record_name(&self, zone_name: &str) -> String {
        match &self.subdomain {
            Some(subdomain) => format!("{subdomain}.{zone_name}"),
            None => zone_name.to_string(),
        }
    }

    /// Whether a provider record with this name and type satisfies the entry
    ///
    /// Name comparison is exact and case-sensitive.
    pub fn matches(&self, target_name: &str, record_name: &str, record_type: &str) -> bool {
        record_name == target_name
            && self
                .record_type
                .as_deref()
                .is_none_or(|wanted| wanted == record_type)
    }

    fn from_value(at: &str, value: &Value, violations: &mut Vec<Violation>) -> Option<Self> {
        match value {
            Value::String(subdomain) => Some(Self::subdomain(subdomain.as_str())),
            Value::Object(obj) => {
                let before = violations.len();
                let subdomain = optional_string(obj, "name", at, violations);
                let desired_address = optional_string(obj, "ip", at, violations);
                let record_type = optional_string(obj, "type", at, violations);

                (violations.len() == before).then_some(Self {
                    subdomain,
                    desired_address,
                    record_type,
                })
            }
            _ => {
                violations.push(Violation::wrong_type(at, "a string or an object"));
                None
            }
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

/// A string that must be present and non-empty
fn required_string(
    obj: &Map<String, Value>,
    key: &str,
    field: &str,
    violations: &mut Vec<Violation>,
) -> Option<String> {
    match obj.get(key) {
        None | Some(Value::Null) => {
            violations.push(Violation::missing(field));
            None
        }
        Some(Value::String(s)) if s.is_empty() => {
            violations.push(Violation::missing(field));
            None
        }
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            violations.push(Violation::wrong_type(field, "a string"));
            None
        }
    }
}

fn required_array<'a>(
    obj: &'a Map<String, Value>,
    key: &str,
    field: &str,
    violations: &mut Vec<Violation>,
) -> Option<&'a Vec<Value>> {
    match obj.get(key) {
        None | Some(Value::Null) => {
            violations.push(Violation::missing(field));
            None
        }
        Some(Value::Array(items)) => Some(items),
        Some(_) => {
            violations.push(Violation::wrong_type(field, "an array"));
            None
        }
    }
}

/// A string that may be absent, null or empty (all meaning "unset")
fn optional_string(
    obj: &Map<String, Value>,
    key: &str,
    at: &str,
    violations: &mut Vec<Violation>,
) -> Option<String> {
    match obj.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => non_empty(s.clone()),
        Some(_) => {
            violations.push(Violation::wrong_type(format!("{at}.{key}"), "a string or null"));
            None
        }
    }
}
