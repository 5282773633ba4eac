//! One-line module strings for the starship prompt. Plain text, no color
//! (the prompt framework styles them); a trailing ` ?` marks a stale
//! snapshot, and a missing cache yields an empty string so the prompt
//! module collapses.

use ppulse_core::CacheStore;
use ppulse_core::snapshot::COLLECTOR_BILLING;
use ppulse_core::snapshot::COLLECTOR_CLAUDE;
use ppulse_core::snapshot::COLLECTOR_INFRA;
use ppulse_core::snapshot::ClusterHealth;
use ppulse_core::snapshot::Payload;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StarshipModule {
    Claude,
    Billing,
    Infra,
}

pub fn starship_line(store: &CacheStore, module: StarshipModule, ttl: Duration) -> String {
    let collector = match module {
        StarshipModule::Claude => COLLECTOR_CLAUDE,
        StarshipModule::Billing => COLLECTOR_BILLING,
        StarshipModule::Infra => COLLECTOR_INFRA,
    };
    let cached = match store.get(collector, ttl) {
        Ok(Some(cached)) => cached,
        Ok(None) => return String::new(),
        Err(err) => {
            tracing::debug!("starship read for {collector} failed: {err}");
            return String::new();
        }
    };
    let line = match (&module, &cached.snapshot.payload) {
        (StarshipModule::Claude, Payload::Quota(quota)) => {
            let worst = quota
                .accounts
                .iter()
                .filter_map(|account| {
                    account
                        .five_hour
                        .as_ref()
                        .map(|window| (account.label.as_str(), window.used_percent))
                })
                .max_by(|a, b| a.1.total_cmp(&b.1));
            match worst {
                Some((label, percent)) => format!("{label} {percent:.0}%"),
                None => return String::new(),
            }
        }
        (StarshipModule::Billing, Payload::Billing(billing)) => {
            format!("${:.0}", billing.total.current_usd)
        }
        (StarshipModule::Infra, Payload::Infra(infra)) => {
            if let Some(mesh) = &infra.mesh {
                format!("{} {}/{}", mesh.label, mesh.online, mesh.total)
            } else if !infra.clusters.is_empty() {
                let healthy = infra
                    .clusters
                    .iter()
                    .filter(|cluster| cluster.health == ClusterHealth::Healthy)
                    .count();
                format!("k8s {healthy}/{}", infra.clusters.len())
            } else {
                return String::new();
            }
        }
        _ => return String::new(),
    };
    if cached.fresh {
        line
    } else {
        format!("{line} ?")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ppulse_core::collectors::mock_payload;
    use ppulse_core::snapshot::Snapshot;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn seeded_store(dir: &TempDir) -> CacheStore {
        let store = CacheStore::new(dir.path());
        for name in ["claude", "billing", "infra"] {
            let snapshot = Snapshot::new(name, mock_payload(name, 2, 3));
            store.set(name, &snapshot).expect("seed");
        }
        store
    }

    #[test]
    fn missing_cache_is_empty_output() {
        let dir = TempDir::new().expect("tempdir");
        let store = CacheStore::new(dir.path());
        assert_eq!(
            starship_line(&store, StarshipModule::Claude, Duration::from_secs(60)),
            ""
        );
    }

    #[test]
    fn fresh_modules_have_no_suffix() {
        let dir = TempDir::new().expect("tempdir");
        let store = seeded_store(&dir);
        for module in [
            StarshipModule::Claude,
            StarshipModule::Billing,
            StarshipModule::Infra,
        ] {
            let line = starship_line(&store, module, Duration::from_secs(3_600));
            assert!(!line.is_empty());
            assert!(!line.ends_with(" ?"), "{line}");
        }
    }

    #[test]
    fn stale_snapshot_gains_question_suffix() {
        let dir = TempDir::new().expect("tempdir");
        let store = seeded_store(&dir);
        // Zero TTL: everything on disk is stale by definition.
        let line = starship_line(&store, StarshipModule::Claude, Duration::ZERO);
        assert!(!line.is_empty());
        assert!(line.ends_with(" ?"), "{line}");
    }

    #[test]
    fn billing_line_is_whole_dollars() {
        let dir = TempDir::new().expect("tempdir");
        let store = seeded_store(&dir);
        let line = starship_line(&store, StarshipModule::Billing, Duration::from_secs(3_600));
        assert!(line.starts_with('$'), "{line}");
        assert!(!line.contains('.'), "{line}");
    }

    #[test]
    fn infra_line_shows_mesh_ratio() {
        let dir = TempDir::new().expect("tempdir");
        let store = seeded_store(&dir);
        let line = starship_line(&store, StarshipModule::Infra, Duration::from_secs(3_600));
        assert_eq!(line, "ts 4/5");
    }
}
