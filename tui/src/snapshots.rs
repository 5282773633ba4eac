//! The snapshot view the tabs render from: every payload the cache holds,
//! with per-domain staleness, reloaded on each tick.

use ppulse_core::CacheStore;
use ppulse_core::snapshot::BillingPayload;
use ppulse_core::snapshot::COLLECTOR_BILLING;
use ppulse_core::snapshot::COLLECTOR_CLAUDE;
use ppulse_core::snapshot::COLLECTOR_FASTFETCH;
use ppulse_core::snapshot::COLLECTOR_INFRA;
use ppulse_core::snapshot::COLLECTOR_SYSTEM;
use ppulse_core::snapshot::HostFactsPayload;
use ppulse_core::snapshot::InfraPayload;
use ppulse_core::snapshot::Payload;
use ppulse_core::snapshot::QuotaPayload;
use ppulse_core::snapshot::SystemPayload;
use ppulse_core::status;
use ppulse_core::status::StatusReport;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct Loaded<T> {
    pub payload: Option<T>,
    pub stale: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SnapshotSet {
    pub quota: Loaded<QuotaPayload>,
    pub billing: Loaded<BillingPayload>,
    pub infra: Loaded<InfraPayload>,
    pub system: Loaded<SystemPayload>,
    pub facts: Loaded<HostFactsPayload>,
}

impl SnapshotSet {
    pub fn load(store: &CacheStore, ttl: Duration) -> Self {
        Self {
            quota: load_one(store, COLLECTOR_CLAUDE, ttl, |payload| match payload {
                Payload::Quota(quota) => Some(quota),
                _ => None,
            }),
            billing: load_one(store, COLLECTOR_BILLING, ttl, |payload| match payload {
                Payload::Billing(billing) => Some(billing),
                _ => None,
            }),
            infra: load_one(store, COLLECTOR_INFRA, ttl, |payload| match payload {
                Payload::Infra(infra) => Some(infra),
                _ => None,
            }),
            system: load_one(store, COLLECTOR_SYSTEM, ttl, |payload| match payload {
                Payload::System(system) => Some(system),
                _ => None,
            }),
            facts: load_one(store, COLLECTOR_FASTFETCH, ttl, |payload| match payload {
                Payload::HostFacts(facts) => Some(facts),
                _ => None,
            }),
        }
    }

    pub fn status(&self) -> StatusReport {
        status::evaluate(
            self.quota.payload.as_ref(),
            self.billing.payload.as_ref(),
            self.infra.payload.as_ref(),
        )
    }
}

fn load_one<T>(
    store: &CacheStore,
    collector: &str,
    ttl: Duration,
    extract: impl Fn(Payload) -> Option<T>,
) -> Loaded<T> {
    match store.get(collector, ttl) {
        Ok(Some(cached)) => Loaded {
            stale: !cached.fresh,
            payload: extract(cached.snapshot.payload),
        },
        Ok(None) => Loaded {
            payload: None,
            stale: false,
        },
        Err(err) => {
            tracing::warn!("unreadable snapshot for {collector}: {err}");
            Loaded {
                payload: None,
                stale: false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ppulse_core::collectors::mock_payload;
    use ppulse_core::snapshot::Snapshot;
    use ppulse_core::status::Severity;
    use tempfile::TempDir;

    #[test]
    fn loads_everything_the_mocks_write() {
        let dir = TempDir::new().expect("tempdir");
        let store = CacheStore::new(dir.path());
        for name in ["claude", "billing", "infra", "system", "fastfetch"] {
            store
                .set(name, &Snapshot::new(name, mock_payload(name, 2, 0)))
                .expect("seed");
        }
        let set = SnapshotSet::load(&store, Duration::from_secs(3_600));
        assert!(set.quota.payload.is_some());
        assert!(set.billing.payload.is_some());
        assert!(set.infra.payload.is_some());
        assert!(set.system.payload.is_some());
        assert!(set.facts.payload.is_some());
        assert!(set.status().overall >= Severity::Healthy);
    }

    #[test]
    fn empty_store_is_all_none() {
        let dir = TempDir::new().expect("tempdir");
        let set = SnapshotSet::load(&CacheStore::new(dir.path()), Duration::from_secs(60));
        assert!(set.quota.payload.is_none());
        assert_eq!(set.status().overall, Severity::Unknown);
    }
}
