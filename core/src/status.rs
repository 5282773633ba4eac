//! Rule-based reduction of the current snapshot set into a single severity,
//! plus per-domain substatuses for the rendering surfaces.

use crate::snapshot::BillingPayload;
use crate::snapshot::ClusterHealth;
use crate::snapshot::InfraPayload;
use crate::snapshot::QuotaPayload;
use serde::Deserialize;
use serde::Serialize;

/// Quota window utilization thresholds, percent.
pub const QUOTA_WARNING_PERCENT: f64 = 80.0;
pub const QUOTA_CRITICAL_PERCENT: f64 = 95.0;

/// Node resource threshold for a warning, percent.
pub const NODE_RESOURCE_WARNING_PERCENT: f64 = 80.0;

/// Budget fraction that triggers a warning.
pub const BUDGET_WARNING_FRACTION: f64 = 0.9;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Unknown,
    Healthy,
    Warning,
    Critical,
}

impl Severity {
    /// Glyph used by the one-line surfaces.
    pub fn glyph(self) -> &'static str {
        match self {
            Severity::Unknown => "?",
            Severity::Healthy => "●",
            Severity::Warning => "◐",
            Severity::Critical => "○",
        }
    }
}

/// Per-domain substatuses plus their maximum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusReport {
    pub quota: Severity,
    pub billing: Severity,
    pub infra: Severity,
    pub overall: Severity,
}

/// Pure reduction over whatever snapshots are currently available. A domain
/// with no snapshot contributes `Unknown`; all three missing yields an
/// overall `Unknown`.
pub fn evaluate(
    quota: Option<&QuotaPayload>,
    billing: Option<&BillingPayload>,
    infra: Option<&InfraPayload>,
) -> StatusReport {
    let quota_severity = quota.map_or(Severity::Unknown, evaluate_quota);
    let billing_severity = billing.map_or(Severity::Unknown, evaluate_billing);
    let infra_severity = infra.map_or(Severity::Unknown, evaluate_infra);
    StatusReport {
        quota: quota_severity,
        billing: billing_severity,
        infra: infra_severity,
        overall: quota_severity.max(billing_severity).max(infra_severity),
    }
}

fn evaluate_quota(quota: &QuotaPayload) -> Severity {
    let mut severity = Severity::Healthy;
    for account in &quota.accounts {
        for window in [&account.five_hour, &account.seven_day].into_iter().flatten() {
            if window.used_percent >= QUOTA_CRITICAL_PERCENT {
                return Severity::Critical;
            }
            if window.used_percent >= QUOTA_WARNING_PERCENT {
                severity = severity.max(Severity::Warning);
            }
        }
    }
    severity
}

fn evaluate_billing(billing: &BillingPayload) -> Severity {
    let Some(budget) = billing.total.budget_usd else {
        return Severity::Healthy;
    };
    let current = billing.total.current_usd;
    if current > budget {
        Severity::Critical
    } else if current > budget * BUDGET_WARNING_FRACTION {
        Severity::Warning
    } else {
        Severity::Healthy
    }
}

fn evaluate_infra(infra: &InfraPayload) -> Severity {
    let mut severity = Severity::Healthy;
    if let Some(mesh) = &infra.mesh {
        if mesh.total > 0 && mesh.online == 0 {
            return Severity::Critical;
        }
        for node in &mesh.nodes {
            let hot = [node.cpu_percent, node.ram_percent, node.disk_percent]
                .into_iter()
                .flatten()
                .any(|pct| pct >= NODE_RESOURCE_WARNING_PERCENT);
            if hot {
                severity = severity.max(Severity::Warning);
            }
        }
    }
    for cluster in &infra.clusters {
        match cluster.health {
            ClusterHealth::Offline => return Severity::Critical,
            ClusterHealth::Degraded => severity = severity.max(Severity::Warning),
            ClusterHealth::Healthy | ClusterHealth::Unknown => {}
        }
    }
    severity
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::AccountKind;
    use crate::snapshot::AccountStatus;
    use crate::snapshot::BillingTotal;
    use crate::snapshot::ClusterStatus;
    use crate::snapshot::MeshNode;
    use crate::snapshot::MeshStatus;
    use crate::snapshot::QuotaAccount;
    use crate::snapshot::UsageWindow;
    use pretty_assertions::assert_eq;

    fn quota_with(percent: f64) -> QuotaPayload {
        QuotaPayload::new(vec![QuotaAccount {
            label: "personal".to_string(),
            kind: AccountKind::Subscription,
            status: AccountStatus::Ok,
            five_hour: Some(UsageWindow {
                used_percent: percent,
                resets_at: None,
            }),
            seven_day: None,
            rate_limit: None,
            extra_usage: None,
        }])
    }

    fn billing_with(current: f64, budget: Option<f64>) -> BillingPayload {
        BillingPayload {
            providers: Vec::new(),
            total: BillingTotal {
                current_usd: current,
                forecast_usd: None,
                budget_usd: budget,
            },
            history: None,
        }
    }

    fn cluster(health: ClusterHealth) -> ClusterStatus {
        ClusterStatus {
            name: "bitter-darkness".to_string(),
            platform: "k3s".to_string(),
            health,
            nodes_total: 3,
            nodes_ready: 3,
            pods_running: None,
            pods_total: None,
            version: None,
            dashboard_url: None,
        }
    }

    #[test]
    fn severity_ordering_is_unknown_lowest() {
        assert!(Severity::Unknown < Severity::Healthy);
        assert!(Severity::Healthy < Severity::Warning);
        assert!(Severity::Warning < Severity::Critical);
    }

    #[test]
    fn all_nil_is_unknown() {
        assert_eq!(evaluate(None, None, None).overall, Severity::Unknown);
    }

    #[test]
    fn quota_thresholds() {
        let report = evaluate(Some(&quota_with(45.0)), None, None);
        assert_eq!(report.quota, Severity::Healthy);
        assert_eq!(evaluate(Some(&quota_with(80.0)), None, None).quota, Severity::Warning);
        assert_eq!(
            evaluate(Some(&quota_with(95.0)), None, None).quota,
            Severity::Critical
        );
        // Overage past 100 stays critical.
        assert_eq!(
            evaluate(Some(&quota_with(120.0)), None, None).quota,
            Severity::Critical
        );
    }

    #[test]
    fn billing_budget_thresholds() {
        let healthy = billing_with(100.0, Some(200.0));
        let warning = billing_with(185.0, Some(200.0));
        let critical = billing_with(201.0, Some(200.0));
        let no_budget = billing_with(9_999.0, None);
        assert_eq!(evaluate(None, Some(&healthy), None).billing, Severity::Healthy);
        assert_eq!(evaluate(None, Some(&warning), None).billing, Severity::Warning);
        assert_eq!(evaluate(None, Some(&critical), None).billing, Severity::Critical);
        assert_eq!(evaluate(None, Some(&no_budget), None).billing, Severity::Healthy);
    }

    #[test]
    fn offline_cluster_is_critical() {
        let infra = InfraPayload {
            mesh: None,
            clusters: vec![cluster(ClusterHealth::Healthy), cluster(ClusterHealth::Offline)],
        };
        assert_eq!(evaluate(None, None, Some(&infra)).infra, Severity::Critical);
    }

    #[test]
    fn degraded_cluster_is_warning() {
        let infra = InfraPayload {
            mesh: None,
            clusters: vec![cluster(ClusterHealth::Degraded)],
        };
        assert_eq!(evaluate(None, None, Some(&infra)).infra, Severity::Warning);
    }

    #[test]
    fn dead_mesh_is_critical() {
        let infra = InfraPayload {
            mesh: Some(MeshStatus {
                label: "ts".to_string(),
                online: 0,
                total: 5,
                nodes: Vec::new(),
                dashboard_url: None,
            }),
            clusters: Vec::new(),
        };
        assert_eq!(evaluate(None, None, Some(&infra)).infra, Severity::Critical);
    }

    #[test]
    fn hot_node_is_warning() {
        let infra = InfraPayload {
            mesh: Some(MeshStatus {
                label: "ts".to_string(),
                online: 1,
                total: 1,
                nodes: vec![MeshNode {
                    hostname: "nas".to_string(),
                    online: true,
                    cpu_percent: Some(12.0),
                    ram_percent: None,
                    disk_percent: Some(91.0),
                    tags: Vec::new(),
                    os: None,
                    last_seen: None,
                }],
                dashboard_url: None,
            }),
            clusters: Vec::new(),
        };
        assert_eq!(evaluate(None, None, Some(&infra)).infra, Severity::Warning);
    }

    #[test]
    fn overall_is_max_across_domains() {
        let report = evaluate(
            Some(&quota_with(85.0)),
            Some(&billing_with(10.0, Some(100.0))),
            None,
        );
        assert_eq!(report.overall, Severity::Warning);
        assert_eq!(report.billing, Severity::Healthy);
        assert_eq!(report.infra, Severity::Unknown);
    }
}
