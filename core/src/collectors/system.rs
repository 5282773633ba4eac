//! Host metrics wired into the collector contract. Special-cased relative
//! to the other collectors because it owns a time series rather than a
//! point-in-time snapshot: every run appends one sample and persists the
//! whole ring.

use crate::collector::Collector;
use crate::error::Result;
use crate::metrics::SystemSampler;
use crate::snapshot::COLLECTOR_SYSTEM;
use crate::snapshot::Payload;
use crate::snapshot::SystemPayload;
use futures::future::BoxFuture;
use std::sync::Mutex;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub struct SystemCollector {
    interval: Duration,
    sampler: Mutex<SystemSampler>,
}

impl SystemCollector {
    pub fn new(capacity: usize, interval: Duration, previous: Option<SystemPayload>) -> Self {
        let mut sampler = SystemSampler::new(capacity);
        if let Some(previous) = &previous {
            sampler.restore(previous);
        }
        Self {
            interval,
            sampler: Mutex::new(sampler),
        }
    }
}

impl Collector for SystemCollector {
    fn name(&self) -> &'static str {
        COLLECTOR_SYSTEM
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn collect(&self, _cancel: CancellationToken) -> BoxFuture<'_, Result<Payload>> {
        Box::pin(async {
            let payload = {
                let mut sampler = match self.sampler.lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                sampler.sample()
            };
            Ok(Payload::System(payload))
        })
    }
}
