// # ddns-sync - One-shot DNS sync runner
//
// This is a THIN integration layer: all reconciliation logic lives in
// ddns-core. Each invocation performs a single pass and exits; schedule it
// externally (cron, systemd timer).
//
// The runner is responsible for:
// 1. Reading process settings from environment variables
// 2. Initializing logging and the runtime
// 3. Loading the user configuration file
// 4. Wiring the Cloudflare client and the HTTP address source
// 5. Running the reconciler and reporting a summary
//
// ## Settings
//
// - `DDNS_CONFIG`: Path to the JSON config
//   (default `$HOME/.config/cloudflare-ddns/config.json`)
// - `DDNS_LOG_LEVEL`: trace, debug, info, warn, error (default info)
// - `DDNS_MODE`: live or dry-run (default live)
// - `DDNS_IP_SOURCE_URL`: Public address lookup endpoint (default https://api.ipify.org)
// - `DDNS_API_BASE_URL`: Cloudflare API root (default https://api.cloudflare.com/client/v4)
// - `DDNS_RUN_TIMEOUT_SECS`: Optional deadline for the whole run, 1..=3600
//
// ## Example
//
// ```bash
// export DDNS_CONFIG=/etc/cloudflare-ddns/config.json
// export DDNS_MODE=dry-run
//
// ddns-sync
// ```
//
// Exit code is 0 when the run completes (including "nothing to update") and
// 1 on any unrecovered error.

use anyhow::{Context, Result};
use ddns_core::{Config, Reconciler, RunSummary};
use ddns_ip_http::{DEFAULT_IP_SERVICE, HttpIpSource};
use ddns_provider_cloudflare::{CLOUDFLARE_API_BASE, CloudflareClient, CloudflareConfig};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Process exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncExitCode {
    /// Run completed (whether or not anything changed)
    Success = 0,
    /// Settings, config, provider or address lookup failure
    Failure = 1,
}

impl From<SyncExitCode> for ExitCode {
    fn from(code: SyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Process settings
#[derive(Debug)]
struct Settings {
    config_path: Option<PathBuf>,
    log_level: String,
    mode: String,
    ip_source_url: String,
    api_base_url: String,
    run_timeout_secs: Option<String>,
}

impl Settings {
    /// Load settings from environment variables
    fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load settings through `lookup`, falling back to defaults
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            config_path: lookup("DDNS_CONFIG")
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .or_else(Config::default_path),
            log_level: lookup("DDNS_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            mode: lookup("DDNS_MODE").unwrap_or_else(|| "live".to_string()),
            ip_source_url: lookup("DDNS_IP_SOURCE_URL")
                .unwrap_or_else(|| DEFAULT_IP_SERVICE.to_string()),
            api_base_url: lookup("DDNS_API_BASE_URL")
                .unwrap_or_else(|| CLOUDFLARE_API_BASE.to_string()),
            run_timeout_secs: lookup("DDNS_RUN_TIMEOUT_SECS"),
        }
    }

    /// Validate the settings
    fn validate(&self) -> Result<()> {
        if self.config_path.is_none() {
            anyhow::bail!(
                "Could not determine the home directory. \
                Set the config location via: export DDNS_CONFIG=/path/to/config.json"
            );
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "DDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        match self.mode.to_lowercase().as_str() {
            "live" | "dry-run" => {}
            _ => anyhow::bail!(
                "DDNS_MODE '{}' is not valid. Valid modes: live, dry-run",
                self.mode
            ),
        }

        for (name, url) in [
            ("DDNS_IP_SOURCE_URL", &self.ip_source_url),
            ("DDNS_API_BASE_URL", &self.api_base_url),
        ] {
            if !url.starts_with("https://") && !url.starts_with("http://") {
                anyhow::bail!("{} must use HTTP or HTTPS scheme. Got: {}", name, url);
            }
        }

        if let Some(ref raw) = self.run_timeout_secs {
            let secs: u64 = raw
                .parse()
                .with_context(|| format!("DDNS_RUN_TIMEOUT_SECS must be a number. Got: {}", raw))?;
            if !(1..=3600).contains(&secs) {
                anyhow::bail!(
                    "DDNS_RUN_TIMEOUT_SECS must be between 1 and 3600 seconds. Got: {}",
                    secs
                );
            }
        }

        Ok(())
    }

    fn log_level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    fn dry_run(&self) -> bool {
        self.mode.eq_ignore_ascii_case("dry-run")
    }

    fn run_timeout(&self) -> Option<Duration> {
        self.run_timeout_secs
            .as_deref()
            .and_then(|raw| raw.parse().ok())
            .map(Duration::from_secs)
    }
}

fn main() -> ExitCode {
    let settings = Settings::from_env();

    if let Err(e) = settings.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return SyncExitCode::Failure.into();
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(settings.log_level())
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return SyncExitCode::Failure.into();
    }

    // Single pass, no parallel fan-out
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return SyncExitCode::Failure.into();
        }
    };

    let result = rt.block_on(run(&settings));
    report(result).into()
}

/// Perform one reconciliation pass
async fn run(settings: &Settings) -> Result<RunSummary> {
    let config_path = settings
        .config_path
        .as_ref()
        .context("No configuration path")?;

    let config = Config::load(config_path).map_err(ddns_core::Error::from)?;
    info!(
        "Configuration loaded from {}: {} zone(s)",
        config_path.display(),
        config.zones.len()
    );

    let provider = CloudflareClient::new(
        CloudflareConfig::new(config.api_token.clone())
            .with_base_url(settings.api_base_url.as_str())
            .with_dry_run(settings.dry_run()),
    )?;
    let ip_source = HttpIpSource::new(settings.ip_source_url.as_str())?;
    let reconciler = Reconciler::new(Box::new(provider), Box::new(ip_source));

    let summary = match settings.run_timeout() {
        Some(limit) => tokio::time::timeout(limit, reconciler.run(&config))
            .await
            .map_err(|_| anyhow::anyhow!("Run did not finish within {:?}", limit))??,
        None => reconciler.run(&config).await?,
    };

    Ok(summary)
}

/// Log the outcome and pick the exit code
fn report(result: Result<RunSummary>) -> SyncExitCode {
    match result {
        Ok(summary) => {
            info!("{}", summary);
            SyncExitCode::Success
        }
        Err(e) => {
            error!("Failed to update DNS records: {:#}", e);
            SyncExitCode::Failure
        }
    }
}
