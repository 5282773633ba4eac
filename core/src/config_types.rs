//! Types used to deserialize `config.toml` and their validated forms.
//!
//! Sub-structs here are kept in their own module to avoid bloating
//! `config.rs`. All TOML-facing structs are fully optional; defaults are
//! applied during the merge in [`crate::config::Config`].

use serde::Deserialize;
use serde::Serialize;
use std::path::PathBuf;

/// Display preset selected via config or `--theme`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Status line and section summaries only.
    Minimal,

    /// Everything the terminal size allows, including imagery.
    #[default]
    Full,

    /// Metrics-forward: full metrics and sparklines, no imagery.
    Monitoring,
}

/// One monitored LLM account.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AccountToml {
    pub label: Option<String>,

    /// "subscription" or "api".
    pub kind: Option<String>,

    /// Environment variable holding a bearer token for this account.
    pub api_key_env: Option<String>,

    /// OAuth credentials file. Defaults to `~/.claude/.credentials.json`
    /// for subscription accounts when `api_key_env` is unset.
    pub credentials_file: Option<PathBuf>,

    /// Usage API base URL override, mainly for tests.
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BillingToml {
    /// Overall monthly budget across providers.
    pub budget_usd: Option<f64>,

    #[serde(default)]
    pub providers: Vec<BillingProviderToml>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BillingProviderToml {
    pub label: Option<String>,

    /// HTTP endpoint answering the month-to-date cost document.
    pub endpoint: Option<String>,

    /// Environment variable holding the provider API key.
    pub api_key_env: Option<String>,

    pub budget_usd: Option<f64>,
    pub dashboard_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InfraToml {
    /// Poll `tailscale status` for the mesh section.
    pub mesh_enabled: Option<bool>,

    /// Short label shown in front of the mesh summary, e.g. "ts".
    pub mesh_label: Option<String>,

    pub mesh_dashboard_url: Option<String>,

    /// kubectl contexts to poll, one cluster record each.
    #[serde(default)]
    pub kube_contexts: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WaifuToml {
    pub enabled: Option<bool>,

    /// Image category requested from the source, e.g. "scenery".
    pub category: Option<String>,

    /// HTTP endpoint serving a random image for a category.
    pub source_url: Option<String>,

    /// Total size cap for the image directory. `0` disables the cap.
    pub max_size_mb: Option<u64>,

    pub ttl_secs: Option<u64>,

    /// Sessions kept before least-recently-used eviction kicks in.
    pub max_sessions: Option<usize>,
}

/// Per-collector poll intervals and the shared snapshot TTL, in seconds.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CollectorsToml {
    pub claude_interval_secs: Option<u64>,
    pub billing_interval_secs: Option<u64>,
    pub infra_interval_secs: Option<u64>,
    pub system_interval_secs: Option<u64>,
    pub fastfetch_interval_secs: Option<u64>,

    /// Age beyond which rendering surfaces annotate a snapshot as stale.
    pub snapshot_ttl_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MetricsToml {
    /// Ring-buffer capacity for the system-metrics history.
    pub history_capacity: Option<usize>,
}
