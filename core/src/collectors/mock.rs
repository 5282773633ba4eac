//! Deterministic fake collectors for demos, screenshots, and end-to-end
//! tests. Given the same seed they produce byte-identical payloads, so
//! snapshot-based assertions stay stable.

use crate::collector::Collector;
use crate::error::Result;
use crate::snapshot::AccountKind;
use crate::snapshot::AccountStatus;
use crate::snapshot::BillingHistory;
use crate::snapshot::BillingPayload;
use crate::snapshot::BillingProvider;
use crate::snapshot::BillingTotal;
use crate::snapshot::COLLECTOR_BILLING;
use crate::snapshot::COLLECTOR_CLAUDE;
use crate::snapshot::COLLECTOR_INFRA;
use crate::snapshot::COLLECTOR_SYSTEM;
use crate::snapshot::ClusterHealth;
use crate::snapshot::ClusterStatus;
use crate::snapshot::ExtraUsage;
use crate::snapshot::HostFact;
use crate::snapshot::HostFactsPayload;
use crate::snapshot::InfraPayload;
use crate::snapshot::MeshNode;
use crate::snapshot::MeshStatus;
use crate::snapshot::Payload;
use crate::snapshot::QuotaAccount;
use crate::snapshot::QuotaPayload;
use crate::snapshot::SpendPoint;
use crate::snapshot::SystemPayload;
use crate::snapshot::SystemSample;
use crate::snapshot::UsageWindow;
use chrono::Duration as ChronoDuration;
use chrono::Utc;
use futures::future::BoxFuture;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub struct MockCollector {
    name: &'static str,
    interval: Duration,
    payload: Payload,
}

impl MockCollector {
    pub fn new(name: &'static str, interval: Duration, accounts: usize, seed: u64) -> Self {
        Self {
            name,
            interval,
            payload: mock_payload(name, accounts, seed),
        }
    }
}

impl Collector for MockCollector {
    fn name(&self) -> &'static str {
        self.name
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn collect(&self, _cancel: CancellationToken) -> BoxFuture<'_, Result<Payload>> {
        let payload = self.payload.clone();
        Box::pin(async move { Ok(payload) })
    }
}

/// Deterministic payload for a collector name. Each collector gets its own
/// rng stream derived from the seed so adding an account does not reshuffle
/// unrelated sections.
pub fn mock_payload(name: &str, accounts: usize, seed: u64) -> Payload {
    match name {
        COLLECTOR_CLAUDE => Payload::Quota(mock_quota(accounts, seed)),
        COLLECTOR_BILLING => Payload::Billing(mock_billing(seed)),
        COLLECTOR_INFRA => Payload::Infra(mock_infra(seed)),
        COLLECTOR_SYSTEM => Payload::System(mock_system(seed)),
        _ => Payload::HostFacts(mock_host_facts()),
    }
}

fn mock_quota(accounts: usize, seed: u64) -> QuotaPayload {
    let mut rng = StdRng::seed_from_u64(seed);
    let labels = ["personal", "work", "team", "research", "spare"];
    let accounts = (0..accounts.clamp(1, labels.len()))
        .map(|i| {
            let five_hour = rng.random_range(5.0..95.0_f64).round();
            let seven_day = rng.random_range(5.0..80.0_f64).round();
            QuotaAccount {
                label: labels[i].to_string(),
                kind: if i % 2 == 0 {
                    AccountKind::Subscription
                } else {
                    AccountKind::Api
                },
                status: AccountStatus::Ok,
                five_hour: Some(UsageWindow {
                    used_percent: five_hour,
                    resets_at: Some(Utc::now() + ChronoDuration::hours(3)),
                }),
                seven_day: Some(UsageWindow {
                    used_percent: seven_day,
                    resets_at: Some(Utc::now() + ChronoDuration::days(4)),
                }),
                rate_limit: None,
                extra_usage: (i % 2 == 1).then(|| ExtraUsage {
                    used_usd: rng.random_range(0.0..40.0_f64).round(),
                    cap_usd: 50.0,
                }),
            }
        })
        .collect();
    QuotaPayload::new(accounts)
}

fn mock_billing(seed: u64) -> BillingPayload {
    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(1));
    let providers: Vec<BillingProvider> = [("anthropic", 90.0), ("openai", 40.0), ("aws", 12.0)]
        .into_iter()
        .map(|(label, scale)| {
            let current = rng.random_range(0.5_f64..1.5) * scale;
            BillingProvider {
                label: label.to_string(),
                status: crate::snapshot::ProviderStatus::Ok,
                current_month_usd: (current * 100.0).round() / 100.0,
                forecast_usd: Some((current * 1.3 * 100.0).round() / 100.0),
                budget_usd: Some(scale * 2.0),
                previous_month_usd: Some((current * 0.9 * 100.0).round() / 100.0),
                dashboard_url: Some(format!("https://console.{label}.example/billing")),
            }
        })
        .collect();
    let current_usd: f64 = providers.iter().map(|p| p.current_month_usd).sum();
    let forecast_usd: f64 = providers.iter().filter_map(|p| p.forecast_usd).sum();
    let start = Utc::now().date_naive() - ChronoDuration::days(13);
    let total_history: Vec<SpendPoint> = (0..14)
        .map(|day| SpendPoint {
            date: start + ChronoDuration::days(day),
            usd: (rng.random_range(2.0..9.0_f64) * 100.0).round() / 100.0,
        })
        .collect();
    BillingPayload {
        providers,
        total: BillingTotal {
            current_usd: (current_usd * 100.0).round() / 100.0,
            forecast_usd: Some((forecast_usd * 100.0).round() / 100.0),
            budget_usd: Some(300.0),
        },
        history: Some(BillingHistory {
            total: total_history,
            by_provider: Default::default(),
        }),
    }
}

fn mock_infra(seed: u64) -> InfraPayload {
    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(2));
    let hosts = ["gateway", "nas", "media", "builder", "pihole"];
    let nodes: Vec<MeshNode> = hosts
        .iter()
        .enumerate()
        .map(|(i, host)| MeshNode {
            hostname: (*host).to_string(),
            // One node sleeps; the rest are up.
            online: i != 3,
            cpu_percent: Some(rng.random_range(2.0..60.0_f64).round()),
            ram_percent: Some(rng.random_range(10.0..70.0_f64).round()),
            disk_percent: Some(rng.random_range(20.0..75.0_f64).round()),
            tags: if i == 0 {
                vec!["exit-node".to_string()]
            } else {
                Vec::new()
            },
            os: Some("linux".to_string()),
            last_seen: Some(Utc::now()),
        })
        .collect();
    let online = nodes.iter().filter(|n| n.online).count() as u32;
    let total = nodes.len() as u32;
    InfraPayload {
        mesh: Some(MeshStatus {
            label: "ts".to_string(),
            online,
            total,
            nodes,
            dashboard_url: Some("https://login.tailscale.com/admin/machines".to_string()),
        }),
        clusters: vec![ClusterStatus {
            name: "bitter-darkness".to_string(),
            platform: "k3s".to_string(),
            health: ClusterHealth::Healthy,
            nodes_total: 3,
            nodes_ready: 3,
            pods_running: Some(42),
            pods_total: Some(47),
            version: Some("v1.31.2+k3s1".to_string()),
            dashboard_url: None,
        }],
    }
}

fn mock_system(seed: u64) -> SystemPayload {
    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(3));
    let now = Utc::now();
    let samples = (0..60)
        .map(|i| {
            // Gentle random walk rather than white noise, so sparklines
            // look like a real host.
            let phase = (i as f64 / 9.0).sin().abs();
            SystemSample {
                timestamp: now - ChronoDuration::seconds(30 * (60 - i)),
                cpu_percent: (10.0 + 35.0 * phase + rng.random_range(0.0..8.0)).round(),
                ram_percent: (45.0 + 10.0 * phase).round(),
                disk_percent: 62.0,
                load_avg: ((0.4 + phase * 1.8) * 100.0).round() / 100.0,
            }
        })
        .collect();
    SystemPayload { samples }
}

fn mock_host_facts() -> HostFactsPayload {
    let facts = [
        ("OS", "NixOS 25.05 (Warbler)"),
        ("Kernel", "6.12.8"),
        ("CPU", "AMD Ryzen 9 7950X (32) @ 5.88 GHz"),
        ("Memory", "12.4 GiB / 62.0 GiB"),
        ("Uptime", "9 days, 4 hours"),
        ("Shell", "fish 4.0.1"),
    ]
    .into_iter()
    .map(|(label, value)| HostFact {
        label: label.to_string(),
        value: value.to_string(),
    })
    .collect();
    HostFactsPayload { facts }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn same_seed_same_payload() {
        let a = mock_payload(COLLECTOR_CLAUDE, 2, 7);
        let b = mock_payload(COLLECTOR_CLAUDE, 2, 7);
        // Timestamps differ between calls; compare the stable parts.
        let (Payload::Quota(a), Payload::Quota(b)) = (a, b) else {
            panic!("expected quota payloads");
        };
        let percents = |q: &QuotaPayload| -> Vec<f64> {
            q.accounts
                .iter()
                .filter_map(|acct| acct.five_hour.as_ref().map(|w| w.used_percent))
                .collect()
        };
        assert_eq!(percents(&a), percents(&b));
    }

    #[test]
    fn different_seed_differs() {
        let (Payload::Billing(a), Payload::Billing(b)) = (
            mock_payload(COLLECTOR_BILLING, 2, 1),
            mock_payload(COLLECTOR_BILLING, 2, 2),
        ) else {
            panic!("expected billing payloads");
        };
        assert_ne!(a.total.current_usd, b.total.current_usd);
    }

    #[test]
    fn account_count_is_clamped() {
        let Payload::Quota(quota) = mock_payload(COLLECTOR_CLAUDE, 99, 0) else {
            panic!("expected quota payload");
        };
        assert_eq!(quota.accounts.len(), 5);
        let Payload::Quota(quota) = mock_payload(COLLECTOR_CLAUDE, 0, 0) else {
            panic!("expected quota payload");
        };
        assert_eq!(quota.accounts.len(), 1);
    }

    #[test]
    fn system_history_is_full_length() {
        let Payload::System(system) = mock_payload(COLLECTOR_SYSTEM, 2, 0) else {
            panic!("expected system payload");
        };
        assert_eq!(system.samples.len(), 60);
        // Strictly ordered by timestamp.
        for pair in system.samples.windows(2) {
            assert!(pair[0].timestamp < pair[1].timestamp);
        }
    }
}
