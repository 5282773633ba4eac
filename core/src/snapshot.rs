//! The snapshot data model: one envelope per collector run, persisted as
//! `{cache_dir}/{collector}.json`.
//!
//! On disk the envelope is `{collector, timestamp, data}`. The `collector`
//! field doubles as the payload discriminator, so `data` decodes into the
//! matching typed payload; unknown collectors keep their raw JSON for
//! forward compatibility. Consumers ignore unknown fields inside payloads.

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use serde::de::Error as _;
use std::collections::BTreeMap;

/// Collector names that map to typed payloads.
pub const COLLECTOR_CLAUDE: &str = "claude";
pub const COLLECTOR_BILLING: &str = "billing";
pub const COLLECTOR_INFRA: &str = "infra";
pub const COLLECTOR_SYSTEM: &str = "system";
pub const COLLECTOR_FASTFETCH: &str = "fastfetch";

/// Hard cap on accounts carried by one quota payload.
pub const MAX_ACCOUNTS: usize = 5;

/// Persisted output of one collector run.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub collector: String,
    pub timestamp: DateTime<Utc>,
    pub payload: Payload,
}

/// Tag-union of every payload shape a collector can produce.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Quota(QuotaPayload),
    Billing(BillingPayload),
    Infra(InfraPayload),
    System(SystemPayload),
    HostFacts(HostFactsPayload),
    /// Collector this build does not know; kept verbatim.
    Unknown(serde_json::Value),
}

impl Payload {
    /// The collector name a payload variant belongs under, if fixed.
    pub fn collector_name(&self) -> Option<&'static str> {
        match self {
            Payload::Quota(_) => Some(COLLECTOR_CLAUDE),
            Payload::Billing(_) => Some(COLLECTOR_BILLING),
            Payload::Infra(_) => Some(COLLECTOR_INFRA),
            Payload::System(_) => Some(COLLECTOR_SYSTEM),
            Payload::HostFacts(_) => Some(COLLECTOR_FASTFETCH),
            Payload::Unknown(_) => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct RawSnapshot {
    collector: String,
    timestamp: DateTime<Utc>,
    data: serde_json::Value,
}

impl Serialize for Snapshot {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let data = match &self.payload {
            Payload::Quota(p) => serde_json::to_value(p),
            Payload::Billing(p) => serde_json::to_value(p),
            Payload::Infra(p) => serde_json::to_value(p),
            Payload::System(p) => serde_json::to_value(p),
            Payload::HostFacts(p) => serde_json::to_value(p),
            Payload::Unknown(v) => Ok(v.clone()),
        }
        .map_err(serde::ser::Error::custom)?;
        RawSnapshot {
            collector: self.collector.clone(),
            timestamp: self.timestamp,
            data,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Snapshot {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawSnapshot::deserialize(deserializer)?;
        let payload = match raw.collector.as_str() {
            COLLECTOR_CLAUDE => Payload::Quota(decode(raw.data).map_err(D::Error::custom)?),
            COLLECTOR_BILLING => Payload::Billing(decode(raw.data).map_err(D::Error::custom)?),
            COLLECTOR_INFRA => Payload::Infra(decode(raw.data).map_err(D::Error::custom)?),
            COLLECTOR_SYSTEM => Payload::System(decode(raw.data).map_err(D::Error::custom)?),
            COLLECTOR_FASTFETCH => Payload::HostFacts(decode(raw.data).map_err(D::Error::custom)?),
            _ => Payload::Unknown(raw.data),
        };
        Ok(Snapshot {
            collector: raw.collector,
            timestamp: raw.timestamp,
            payload,
        })
    }
}

fn decode<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> serde_json::Result<T> {
    serde_json::from_value(value)
}

impl Snapshot {
    /// Wrap a payload under its canonical collector name, stamped now.
    pub fn new(collector: impl Into<String>, payload: Payload) -> Self {
        Self {
            collector: collector.into(),
            timestamp: Utc::now(),
            payload,
        }
    }
}

// ---------------------------------------------------------------------------
// Quota
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Subscription,
    Api,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Ok,
    AuthFailed,
    RateLimited,
    Error,
}

/// One utilization window, e.g. the rolling 5-hour or 7-day bucket.
/// `used_percent` may exceed 100 when the provider reports an overage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageWindow {
    pub used_percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resets_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimitWindow {
    pub requests_remaining: u64,
    pub requests_limit: u64,
    pub tokens_remaining: u64,
    pub tokens_limit: u64,
}

/// Pay-as-you-go spend beyond the subscription allowance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraUsage {
    pub used_usd: f64,
    pub cap_usd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotaAccount {
    pub label: String,
    pub kind: AccountKind,
    pub status: AccountStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub five_hour: Option<UsageWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seven_day: Option<UsageWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<RateLimitWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_usage: Option<ExtraUsage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuotaPayload {
    pub accounts: Vec<QuotaAccount>,
}

impl QuotaPayload {
    /// Build a payload, truncating past the supported account cap.
    pub fn new(mut accounts: Vec<QuotaAccount>) -> Self {
        if accounts.len() > MAX_ACCOUNTS {
            tracing::warn!(
                "quota payload carries {} accounts, truncating to {MAX_ACCOUNTS}",
                accounts.len()
            );
            accounts.truncate(MAX_ACCOUNTS);
        }
        Self { accounts }
    }
}

// ---------------------------------------------------------------------------
// Billing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderStatus {
    Ok,
    AuthFailed,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingProvider {
    pub label: String,
    pub status: ProviderStatus,
    pub current_month_usd: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast_usd: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_usd: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_month_usd: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillingTotal {
    pub current_usd: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast_usd: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_usd: Option<f64>,
}

/// One point of the daily spend history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendPoint {
    pub date: NaiveDate,
    pub usd: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillingHistory {
    pub total: Vec<SpendPoint>,
    #[serde(default)]
    pub by_provider: BTreeMap<String, Vec<SpendPoint>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BillingPayload {
    pub providers: Vec<BillingProvider>,
    pub total: BillingTotal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<BillingHistory>,
}

// ---------------------------------------------------------------------------
// Infrastructure
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshNode {
    pub hostname: String,
    pub online: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ram_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disk_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshStatus {
    pub label: String,
    pub online: u32,
    pub total: u32,
    #[serde(default)]
    pub nodes: Vec<MeshNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterHealth {
    Healthy,
    Degraded,
    Offline,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterStatus {
    pub name: String,
    pub platform: String,
    pub health: ClusterHealth,
    pub nodes_total: u32,
    pub nodes_ready: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pods_running: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pods_total: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InfraPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesh: Option<MeshStatus>,
    #[serde(default)]
    pub clusters: Vec<ClusterStatus>,
}

// ---------------------------------------------------------------------------
// System metrics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SystemSample {
    pub timestamp: DateTime<Utc>,
    pub cpu_percent: f64,
    pub ram_percent: f64,
    pub disk_percent: f64,
    pub load_avg: f64,
}

/// The entire in-memory history, persisted whole on every cycle so the
/// daemon can reload it after a restart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemPayload {
    pub samples: Vec<SystemSample>,
}

impl SystemPayload {
    pub fn latest(&self) -> Option<&SystemSample> {
        self.samples.last()
    }
}

// ---------------------------------------------------------------------------
// Host facts (fastfetch)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostFact {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostFactsPayload {
    pub facts: Vec<HostFact>,
}
