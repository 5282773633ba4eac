use crate::config_types::AccountToml;
use crate::config_types::BillingProviderToml;
use crate::config_types::BillingToml;
use crate::config_types::CollectorsToml;
use crate::config_types::InfraToml;
use crate::config_types::MetricsToml;
use crate::config_types::Theme;
use crate::config_types::WaifuToml;
use crate::error::PulseErr;
use crate::error::Result;
use serde::Deserialize;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

pub(crate) const CONFIG_TOML_FILE: &str = "config.toml";

/// Default poll intervals, chosen so the cheapest source is also the most
/// frequent one.
const DEFAULT_CLAUDE_INTERVAL: Duration = Duration::from_secs(300);
const DEFAULT_BILLING_INTERVAL: Duration = Duration::from_secs(3_600);
const DEFAULT_INFRA_INTERVAL: Duration = Duration::from_secs(60);
const DEFAULT_SYSTEM_INTERVAL: Duration = Duration::from_secs(30);
const DEFAULT_FASTFETCH_INTERVAL: Duration = Duration::from_secs(3_600);

/// Snapshots older than this render with a staleness annotation.
const DEFAULT_SNAPSHOT_TTL: Duration = Duration::from_secs(1_800);

const DEFAULT_WAIFU_MAX_SIZE_MB: u64 = 50;
const DEFAULT_WAIFU_TTL: Duration = Duration::from_secs(86_400);
const DEFAULT_MAX_SESSIONS: usize = 20;
const DEFAULT_METRICS_CAPACITY: usize = 60;

/// Session id used when neither `--session-id` nor `PPULSE_SESSION_ID` is
/// set. A stable literal rather than a pid-derived value so repeated
/// invocations from the same place share one cached image.
pub const DEFAULT_SESSION_ID: &str = "default";

/// One monitored LLM account, validated.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountConfig {
    pub label: String,
    /// "subscription" or "api"; anything else was rejected at load.
    pub is_api: bool,
    pub api_key_env: Option<String>,
    pub credentials_file: Option<PathBuf>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BillingProviderConfig {
    pub label: String,
    pub endpoint: String,
    pub api_key_env: Option<String>,
    pub budget_usd: Option<f64>,
    pub dashboard_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InfraConfig {
    pub mesh_enabled: bool,
    pub mesh_label: String,
    pub mesh_dashboard_url: Option<String>,
    pub kube_contexts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaifuConfig {
    pub enabled: bool,
    pub category: String,
    pub source_url: Option<String>,
    /// `0` disables the size cap entirely.
    pub max_size_mb: u64,
    pub ttl: Duration,
    pub max_sessions: usize,
}

/// Application configuration loaded from disk and merged with overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory holding `{collector}.json` snapshots, the daemon pid file,
    /// and logs. Owned exclusively by the cache store.
    pub cache_dir: PathBuf,

    /// Directory holding cached images; `{cache_dir}/waifu` by default.
    pub waifu_cache_dir: PathBuf,

    pub theme: Theme,

    pub session_id: String,

    pub claude_interval: Duration,
    pub billing_interval: Duration,
    pub infra_interval: Duration,
    pub system_interval: Duration,
    pub fastfetch_interval: Duration,
    pub snapshot_ttl: Duration,

    pub accounts: Vec<AccountConfig>,
    pub billing_budget_usd: Option<f64>,
    pub billing_providers: Vec<BillingProviderConfig>,
    pub infra: InfraConfig,
    pub waifu: WaifuConfig,

    pub fastfetch_enabled: bool,
    pub metrics_capacity: usize,

    /// Replace real collectors with deterministic mocks.
    pub use_mocks: bool,
    pub mock_accounts: usize,
    pub mock_seed: u64,

    /// Terminal size overrides for the one-shot surfaces.
    pub term_width: Option<u16>,
    pub term_height: Option<u16>,
}

/// Optional overrides from the CLI, applied on top of `config.toml`.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
    pub theme: Option<Theme>,
    pub session_id: Option<String>,
    pub waifu_enabled: Option<bool>,
    pub fastfetch_enabled: Option<bool>,
    pub use_mocks: Option<bool>,
    pub mock_accounts: Option<usize>,
    pub mock_seed: Option<u64>,
    pub term_width: Option<u16>,
    pub term_height: Option<u16>,
}

/// Raw deserialization of `config.toml`; every field optional so a missing
/// or empty file is valid.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigToml {
    pub cache_dir: Option<PathBuf>,
    pub theme: Option<Theme>,
    pub collectors: Option<CollectorsToml>,
    #[serde(default)]
    pub accounts: Vec<AccountToml>,
    pub billing: Option<BillingToml>,
    pub infra: Option<InfraToml>,
    pub waifu: Option<WaifuToml>,
    pub metrics: Option<MetricsToml>,
    pub fastfetch_enabled: Option<bool>,
}

impl Config {
    /// Load `config.toml` (from the override path or the default location),
    /// enforce types, and merge with CLI overrides.
    pub fn load(overrides: ConfigOverrides) -> Result<Self> {
        let config_path = match &overrides.config_path {
            Some(path) => path.clone(),
            None => find_ppulse_home()?.join(CONFIG_TOML_FILE),
        };
        let cfg = load_config_toml(&config_path)?;
        Self::from_base_config_with_overrides(cfg, overrides)
    }

    pub fn from_base_config_with_overrides(
        cfg: ConfigToml,
        overrides: ConfigOverrides,
    ) -> Result<Self> {
        let cache_dir = overrides
            .cache_dir
            .or(cfg.cache_dir)
            .or_else(default_cache_dir)
            .ok_or_else(|| {
                PulseErr::ConfigInvalid("could not determine a cache directory".to_string())
            })?;
        let waifu_cache_dir = cache_dir.join("waifu");

        let session_id = overrides
            .session_id
            .or_else(|| std::env::var("PPULSE_SESSION_ID").ok().filter(|s| !s.is_empty()))
            .unwrap_or_else(|| DEFAULT_SESSION_ID.to_string());

        let collectors = cfg.collectors.unwrap_or_default();
        let interval = |secs: Option<u64>, default: Duration| {
            secs.map(Duration::from_secs).unwrap_or(default)
        };

        let accounts = cfg
            .accounts
            .into_iter()
            .enumerate()
            .map(|(idx, account)| validate_account(idx, account))
            .collect::<Result<Vec<_>>>()?;
        if accounts.len() > crate::snapshot::MAX_ACCOUNTS {
            return Err(PulseErr::ConfigInvalid(format!(
                "at most {} accounts are supported, got {}",
                crate::snapshot::MAX_ACCOUNTS,
                accounts.len()
            )));
        }

        let billing = cfg.billing.unwrap_or_default();
        let billing_providers = billing
            .providers
            .into_iter()
            .enumerate()
            .map(|(idx, provider)| validate_provider(idx, provider))
            .collect::<Result<Vec<_>>>()?;

        let infra_toml = cfg.infra.unwrap_or_default();
        let infra = InfraConfig {
            mesh_enabled: infra_toml.mesh_enabled.unwrap_or(true),
            mesh_label: infra_toml.mesh_label.unwrap_or_else(|| "ts".to_string()),
            mesh_dashboard_url: infra_toml.mesh_dashboard_url,
            kube_contexts: infra_toml.kube_contexts,
        };

        let waifu_toml = cfg.waifu.unwrap_or_default();
        let waifu = WaifuConfig {
            enabled: overrides
                .waifu_enabled
                .or(waifu_toml.enabled)
                .unwrap_or(false),
            category: waifu_toml.category.unwrap_or_else(|| "scenery".to_string()),
            source_url: waifu_toml.source_url,
            max_size_mb: waifu_toml.max_size_mb.unwrap_or(DEFAULT_WAIFU_MAX_SIZE_MB),
            ttl: waifu_toml
                .ttl_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_WAIFU_TTL),
            max_sessions: waifu_toml.max_sessions.unwrap_or(DEFAULT_MAX_SESSIONS),
        };
        if waifu.max_sessions == 0 {
            return Err(PulseErr::ConfigInvalid(
                "waifu.max_sessions must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            cache_dir,
            waifu_cache_dir,
            theme: overrides.theme.or(cfg.theme).unwrap_or_default(),
            session_id,
            claude_interval: interval(collectors.claude_interval_secs, DEFAULT_CLAUDE_INTERVAL),
            billing_interval: interval(collectors.billing_interval_secs, DEFAULT_BILLING_INTERVAL),
            infra_interval: interval(collectors.infra_interval_secs, DEFAULT_INFRA_INTERVAL),
            system_interval: interval(collectors.system_interval_secs, DEFAULT_SYSTEM_INTERVAL),
            fastfetch_interval: interval(
                collectors.fastfetch_interval_secs,
                DEFAULT_FASTFETCH_INTERVAL,
            ),
            snapshot_ttl: interval(collectors.snapshot_ttl_secs, DEFAULT_SNAPSHOT_TTL),
            accounts,
            billing_budget_usd: billing.budget_usd,
            billing_providers,
            infra,
            waifu,
            fastfetch_enabled: overrides
                .fastfetch_enabled
                .or(cfg.fastfetch_enabled)
                .unwrap_or(true),
            metrics_capacity: cfg
                .metrics
                .unwrap_or_default()
                .history_capacity
                .unwrap_or(DEFAULT_METRICS_CAPACITY),
            use_mocks: overrides.use_mocks.unwrap_or(false),
            mock_accounts: overrides.mock_accounts.unwrap_or(2),
            mock_seed: overrides.mock_seed.unwrap_or(0),
            term_width: overrides.term_width,
            term_height: overrides.term_height,
        })
    }
}

fn validate_account(idx: usize, account: AccountToml) -> Result<AccountConfig> {
    let label = account
        .label
        .filter(|l| !l.is_empty())
        .ok_or_else(|| PulseErr::ConfigInvalid(format!("accounts[{idx}]: label is required")))?;
    let is_api = match account.kind.as_deref() {
        None | Some("subscription") => false,
        Some("api") => true,
        Some(other) => {
            return Err(PulseErr::ConfigInvalid(format!(
                "accounts[{idx}]: unknown kind `{other}` (expected `subscription` or `api`)"
            )));
        }
    };
    Ok(AccountConfig {
        label,
        is_api,
        api_key_env: account.api_key_env,
        credentials_file: account.credentials_file,
        base_url: account.base_url,
    })
}

fn validate_provider(idx: usize, provider: BillingProviderToml) -> Result<BillingProviderConfig> {
    let label = provider.label.filter(|l| !l.is_empty()).ok_or_else(|| {
        PulseErr::ConfigInvalid(format!("billing.providers[{idx}]: label is required"))
    })?;
    let endpoint = provider.endpoint.filter(|e| !e.is_empty()).ok_or_else(|| {
        PulseErr::ConfigInvalid(format!("billing.providers[{idx}]: endpoint is required"))
    })?;
    Ok(BillingProviderConfig {
        label,
        endpoint,
        api_key_env: provider.api_key_env,
        budget_usd: provider.budget_usd,
        dashboard_url: provider.dashboard_url,
    })
}

fn load_config_toml(path: &Path) -> Result<ConfigToml> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("{} not found, using defaults", path.display());
            return Ok(ConfigToml::default());
        }
        Err(err) => return Err(err.into()),
    };
    toml::from_str(&contents)
        .map_err(|err| PulseErr::ConfigInvalid(format!("{}: {err}", path.display())))
}

/// Directory holding `config.toml`. Honors `PPULSE_HOME` to allow users
/// (and tests) to override the default location.
pub fn find_ppulse_home() -> Result<PathBuf> {
    if let Ok(val) = std::env::var("PPULSE_HOME")
        && !val.is_empty()
    {
        return Ok(PathBuf::from(val));
    }
    let base = dirs::config_dir().ok_or_else(|| {
        PulseErr::ConfigInvalid("could not find a config directory".to_string())
    })?;
    Ok(base.join("ppulse"))
}

fn default_cache_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|base| base.join("ppulse"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn load_str(toml: &str, overrides: ConfigOverrides) -> Result<Config> {
        let cfg: ConfigToml = toml::from_str(toml).expect("parse test toml");
        Config::from_base_config_with_overrides(cfg, overrides)
    }

    fn overrides_with_cache_dir() -> ConfigOverrides {
        ConfigOverrides {
            cache_dir: Some(PathBuf::from("/tmp/ppulse-test")),
            ..Default::default()
        }
    }

    #[test]
    fn empty_config_gets_defaults() {
        let config = load_str("", overrides_with_cache_dir()).expect("load");
        assert_eq!(config.theme, Theme::Full);
        assert_eq!(config.claude_interval, Duration::from_secs(300));
        assert_eq!(config.snapshot_ttl, Duration::from_secs(1_800));
        assert_eq!(config.metrics_capacity, 60);
        assert_eq!(
            config.waifu_cache_dir,
            PathBuf::from("/tmp/ppulse-test/waifu")
        );
        assert!(!config.waifu.enabled);
        assert!(config.fastfetch_enabled);
    }

    #[test]
    fn accounts_are_validated() {
        let toml = r#"
            [[accounts]]
            label = "personal"
            kind = "subscription"

            [[accounts]]
            label = "work"
            kind = "api"
            api_key_env = "WORK_API_KEY"
        "#;
        let config = load_str(toml, overrides_with_cache_dir()).expect("load");
        assert_eq!(config.accounts.len(), 2);
        assert!(!config.accounts[0].is_api);
        assert!(config.accounts[1].is_api);
    }

    #[test]
    fn unknown_account_kind_is_rejected() {
        let toml = r#"
            [[accounts]]
            label = "personal"
            kind = "enterprise"
        "#;
        let err = load_str(toml, overrides_with_cache_dir()).expect_err("should fail");
        assert!(matches!(err, PulseErr::ConfigInvalid(_)));
    }

    #[test]
    fn more_than_five_accounts_rejected() {
        let mut toml = String::new();
        for i in 0..6 {
            toml.push_str(&format!("[[accounts]]\nlabel = \"a{i}\"\n"));
        }
        let err = load_str(&toml, overrides_with_cache_dir()).expect_err("should fail");
        assert!(matches!(err, PulseErr::ConfigInvalid(_)));
    }

    #[test]
    fn provider_requires_endpoint() {
        let toml = r#"
            [[billing.providers]]
            label = "anthropic"
        "#;
        let err = load_str(toml, overrides_with_cache_dir()).expect_err("should fail");
        assert!(matches!(err, PulseErr::ConfigInvalid(_)));
    }

    #[test]
    fn cli_overrides_win_over_file() {
        let toml = r#"
            theme = "minimal"
            fastfetch_enabled = true

            [waifu]
            enabled = true
        "#;
        let config = load_str(
            toml,
            ConfigOverrides {
                cache_dir: Some(PathBuf::from("/tmp/ppulse-test")),
                theme: Some(Theme::Monitoring),
                waifu_enabled: Some(false),
                fastfetch_enabled: Some(false),
                ..Default::default()
            },
        )
        .expect("load");
        assert_eq!(config.theme, Theme::Monitoring);
        assert!(!config.waifu.enabled);
        assert!(!config.fastfetch_enabled);
    }

    #[test]
    fn zero_max_sessions_is_rejected() {
        let toml = r#"
            [waifu]
            max_sessions = 0
        "#;
        let err = load_str(toml, overrides_with_cache_dir()).expect_err("should fail");
        assert!(matches!(err, PulseErr::ConfigInvalid(_)));
    }
}
