use std::{net::SocketAddr, path::PathBuf, time::Duration};

use anyhow::{anyhow, Context};
use marketpulse_core::ProviderConfig;

pub struct Config {
    pub listen_addr: SocketAddr,
    /// Upstream quote providers in priority order.
    pub providers: Vec<ProviderConfig>,
    pub history_url: Option<String>,
    pub calendar_file: Option<PathBuf>,
    /// Symbols kept subscribed at high priority for the server's lifetime.
    pub watchlist: Vec<String>,
    pub cors_allow: Vec<String>,
    /// Upper bound on how long a quote request waits for a first fetch.
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = std::env::var("MP_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .context("Invalid MP_LISTEN_ADDR")?;
        let provider_timeout_ms = std::env::var("MP_PROVIDER_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok());
        let providers = parse_providers(
            &std::env::var("MP_PROVIDERS")
                .unwrap_or_else(|_| "PRIMARY=http://127.0.0.1:9100".into()),
            provider_timeout_ms,
        )?;
        let history_url = std::env::var("MP_HISTORY_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());
        let calendar_file = std::env::var("MP_CALENDAR_FILE").ok().map(PathBuf::from);
        let watchlist = split_list(&std::env::var("MP_WATCHLIST").unwrap_or_default());
        let cors_allow = split_list(
            &std::env::var("MP_CORS_ALLOW_ORIGINS").unwrap_or_else(|_| "*".into()),
        );
        let timeout_ms: u64 = std::env::var("MP_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|_| "30000".into())
            .parse()
            .unwrap_or(30000);
        Ok(Self {
            listen_addr,
            providers,
            history_url,
            calendar_file,
            watchlist,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
        })
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse `ID=url,ID=url,...`. Earlier entries get a lower priority number and
/// are tried first.
pub fn parse_providers(raw: &str, timeout_ms: Option<u64>) -> anyhow::Result<Vec<ProviderConfig>> {
    let providers = split_list(raw)
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let (id, url) = entry
                .split_once('=')
                .ok_or_else(|| anyhow!("Invalid MP_PROVIDERS entry '{}', expected ID=url", entry))?;
            let priority = u8::try_from((i + 1) * 10).unwrap_or(u8::MAX);
            let mut provider = ProviderConfig::new(id.trim().to_uppercase(), url.trim(), priority);
            provider.timeout_ms = timeout_ms;
            Ok(provider)
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    if providers.is_empty() {
        return Err(anyhow!("MP_PROVIDERS must name at least one provider"));
    }
    Ok(providers)
}
