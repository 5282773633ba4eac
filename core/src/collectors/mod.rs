//! Concrete collectors. Each one adapts an external source (vendor API,
//! subprocess, `/proc`) to the [`crate::collector::Collector`] contract;
//! the scheduler neither knows nor cares which is which.

mod billing;
mod claude;
mod fastfetch;
mod infra;
mod mock;
mod system;

pub use billing::BillingCollector;
pub use claude::ClaudeCollector;
pub use fastfetch::FastfetchCollector;
pub use infra::InfraCollector;
pub use mock::MockCollector;
pub use mock::mock_payload;
pub use system::SystemCollector;

use crate::cache::CacheStore;
use crate::collector::Registry;
use crate::config::Config;
use crate::error::Result;
use crate::snapshot::COLLECTOR_BILLING;
use crate::snapshot::COLLECTOR_CLAUDE;
use crate::snapshot::COLLECTOR_FASTFETCH;
use crate::snapshot::COLLECTOR_INFRA;
use crate::snapshot::COLLECTOR_SYSTEM;
use crate::snapshot::Payload;
use std::sync::Arc;
use std::time::Duration;

/// Build the collector set for this configuration. With `use_mocks` the
/// registry carries deterministic fakes under the same names, so every
/// surface downstream behaves identically.
pub fn build_registry(config: &Config, store: &CacheStore) -> Result<Registry> {
    let mut registry = Registry::new();
    if config.use_mocks {
        for name in [
            COLLECTOR_CLAUDE,
            COLLECTOR_BILLING,
            COLLECTOR_INFRA,
            COLLECTOR_SYSTEM,
            COLLECTOR_FASTFETCH,
        ] {
            registry.register(Arc::new(MockCollector::new(
                name,
                mock_interval(config, name),
                config.mock_accounts,
                config.mock_seed,
            )))?;
        }
        return Ok(registry);
    }

    if !config.accounts.is_empty() {
        registry.register(Arc::new(ClaudeCollector::new(
            config.accounts.clone(),
            config.claude_interval,
        )))?;
    }
    if !config.billing_providers.is_empty() {
        registry.register(Arc::new(BillingCollector::new(
            config.billing_providers.clone(),
            config.billing_budget_usd,
            config.billing_interval,
        )))?;
    }
    if config.infra.mesh_enabled || !config.infra.kube_contexts.is_empty() {
        registry.register(Arc::new(InfraCollector::new(
            config.infra.clone(),
            config.infra_interval,
        )))?;
    }

    // The system collector reloads its history from the persisted snapshot
    // so a daemon restart does not flatten the sparklines.
    let previous = store
        .get(COLLECTOR_SYSTEM, Duration::MAX)
        .ok()
        .flatten()
        .and_then(|cached| match cached.snapshot.payload {
            Payload::System(payload) => Some(payload),
            _ => None,
        });
    registry.register(Arc::new(SystemCollector::new(
        config.metrics_capacity,
        config.system_interval,
        previous,
    )))?;

    if config.fastfetch_enabled {
        registry.register(Arc::new(FastfetchCollector::new(config.fastfetch_interval)))?;
    }
    Ok(registry)
}

fn mock_interval(config: &Config, name: &str) -> Duration {
    match name {
        COLLECTOR_CLAUDE => config.claude_interval,
        COLLECTOR_BILLING => config.billing_interval,
        COLLECTOR_INFRA => config.infra_interval,
        COLLECTOR_SYSTEM => config.system_interval,
        _ => config.fastfetch_interval,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigOverrides;
    use crate::config::ConfigToml;
    use tempfile::TempDir;

    fn mock_config(dir: &TempDir) -> Config {
        Config::from_base_config_with_overrides(
            ConfigToml::default(),
            ConfigOverrides {
                cache_dir: Some(dir.path().to_path_buf()),
                use_mocks: Some(true),
                ..Default::default()
            },
        )
        .expect("config")
    }

    #[test]
    fn mock_registry_covers_every_collector() {
        let dir = TempDir::new().expect("tempdir");
        let config = mock_config(&dir);
        let registry =
            build_registry(&config, &CacheStore::new(dir.path())).expect("registry");
        let names: Vec<_> = registry.collectors().iter().map(|c| c.name()).collect();
        assert_eq!(
            names,
            vec!["claude", "billing", "infra", "system", "fastfetch"]
        );
    }

    #[test]
    fn real_registry_always_has_system() {
        let dir = TempDir::new().expect("tempdir");
        let config = Config::from_base_config_with_overrides(
            ConfigToml::default(),
            ConfigOverrides {
                cache_dir: Some(dir.path().to_path_buf()),
                fastfetch_enabled: Some(false),
                ..Default::default()
            },
        )
        .expect("config");
        let registry =
            build_registry(&config, &CacheStore::new(dir.path())).expect("registry");
        let names: Vec<_> = registry.collectors().iter().map(|c| c.name()).collect();
        // No accounts or providers configured; mesh polling is on by default.
        assert_eq!(names, vec!["infra", "system"]);
    }
}
