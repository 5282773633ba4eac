//! The collector contract: the interface that keeps vendor code out of the
//! scheduling core. A collector produces one named typed payload per
//! invocation; the scheduler owns when it runs and where the result lands.

use crate::error::PulseErr;
use crate::error::Result;
use crate::snapshot::Payload;
use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Per-run collection budget. Collectors must return within this or be
/// abandoned; leak prevention is best-effort.
pub const COLLECT_BUDGET: Duration = Duration::from_secs(30);

pub trait Collector: Send + Sync {
    /// Unique, stable name; doubles as the cache key.
    fn name(&self) -> &'static str;

    /// How often the scheduler should invoke this collector.
    fn interval(&self) -> Duration;

    /// Produce one payload. Implementations must watch `cancel` across
    /// network and subprocess suspension points.
    fn collect(&self, cancel: CancellationToken) -> BoxFuture<'_, Result<Payload>>;
}

/// Ordered set of registered collectors. Names are unique: registering a
/// duplicate is an error rather than a silent overwrite.
#[derive(Default)]
pub struct Registry {
    collectors: Vec<Arc<dyn Collector>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, collector: Arc<dyn Collector>) -> Result<()> {
        let name = collector.name();
        if self.collectors.iter().any(|c| c.name() == name) {
            return Err(PulseErr::DuplicateCollector(name.to_string()));
        }
        self.collectors.push(collector);
        Ok(())
    }

    pub fn collectors(&self) -> &[Arc<dyn Collector>] {
        &self.collectors
    }

    pub fn is_empty(&self) -> bool {
        self.collectors.is_empty()
    }
}
