//! Periodic collector invocation: a single controlling task that decides
//! which collectors are due, runs them in parallel within a pass, and
//! persists whatever finishes. Snapshots are written in the order
//! collectors finish; readers must not assume cross-snapshot ordering.

use crate::cache::CacheStore;
use crate::collector::COLLECT_BUDGET;
use crate::collector::Collector;
use crate::collector::Registry;
use crate::error::PulseErr;
use crate::error::Result;
use crate::snapshot::Snapshot;
use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

pub const PID_FILE: &str = "daemon.pid";

pub struct Scheduler {
    registry: Registry,
    store: CacheStore,
    last_run: HashMap<&'static str, Instant>,
}

impl Scheduler {
    pub fn new(registry: Registry, store: CacheStore) -> Self {
        Self {
            registry,
            store,
            last_run: HashMap::new(),
        }
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Run every collector whose deadline has passed, in parallel, joining
    /// before returning. Failures are logged and leave the previous
    /// snapshot untouched; last-run advances regardless so a persistently
    /// broken collector does not hot-loop.
    pub async fn run_pass(&mut self, cancel: &CancellationToken) {
        let now = Instant::now();
        let due: Vec<Arc<dyn Collector>> = self
            .registry
            .collectors()
            .iter()
            .filter(|collector| {
                self.last_run
                    .get(collector.name())
                    .is_none_or(|last| *last + collector.interval() <= now)
            })
            .cloned()
            .collect();
        if due.is_empty() {
            return;
        }

        let tasks: Vec<_> = due
            .iter()
            .map(|collector| {
                let collector = Arc::clone(collector);
                let store = self.store.clone();
                let cancel = cancel.child_token();
                tokio::spawn(async move { run_collector(collector, store, cancel).await })
            })
            .collect();
        for task in tasks {
            if let Err(err) = task.await {
                tracing::warn!("collector task panicked: {err}");
            }
        }
        for collector in &due {
            self.last_run.insert(collector.name(), now);
        }
    }

    /// Deadline of the next due collector, if any are registered.
    fn next_deadline(&self) -> Option<Instant> {
        self.registry
            .collectors()
            .iter()
            .map(|collector| {
                self.last_run
                    .get(collector.name())
                    .map_or_else(Instant::now, |last| *last + collector.interval())
            })
            .min()
    }

    /// Daemon loop: sleep until the earliest deadline, run a pass, repeat
    /// until the ambient token is cancelled. Guards against a second
    /// instance via the pid file.
    pub async fn run_daemon(mut self, cancel: CancellationToken) -> Result<()> {
        if self.registry.is_empty() {
            return Err(PulseErr::ConfigInvalid(
                "no collectors are configured".to_string(),
            ));
        }
        let _pid_guard = PidFile::acquire(self.store.dir())?;
        tracing::info!("daemon started, {} collectors", self.registry.collectors().len());
        loop {
            let Some(deadline) = self.next_deadline() else {
                break;
            };
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("daemon cancelled, exiting");
                    break;
                }
                _ = tokio::time::sleep_until(deadline) => {
                    self.run_pass(&cancel).await;
                }
            }
        }
        Ok(())
    }
}

/// One collector run: collect under the 30-second budget, persist on
/// success. Runs as its own task so a slow collector cannot delay the
/// others in the same pass.
async fn run_collector(
    collector: Arc<dyn Collector>,
    store: CacheStore,
    cancel: CancellationToken,
) {
    let name = collector.name();
    let started = Instant::now();
    let outcome = tokio::select! {
        _ = cancel.cancelled() => Err(PulseErr::Cancelled),
        result = tokio::time::timeout(COLLECT_BUDGET, collector.collect(cancel.clone())) => {
            match result {
                Ok(result) => result,
                Err(_) => Err(PulseErr::CollectorTimeout {
                    collector: name.to_string(),
                    budget: COLLECT_BUDGET,
                }),
            }
        }
    };
    match outcome {
        Ok(payload) => {
            let snapshot = Snapshot::new(name, payload);
            match store.set(name, &snapshot) {
                Ok(()) => tracing::debug!(
                    collector = name,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "snapshot written"
                ),
                Err(err) => tracing::error!(collector = name, "snapshot write failed: {err}"),
            }
        }
        // Previous snapshot is intentionally preserved.
        Err(err) => tracing::warn!(collector = name, "collection failed: {err}"),
    }
}

/// Pid-file guard: written on daemon start, removed on drop. Acquisition
/// fails when the recorded pid refers to a running process.
struct PidFile {
    path: PathBuf,
}

impl PidFile {
    fn acquire(cache_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(cache_dir)?;
        let path = cache_dir.join(PID_FILE);
        if let Ok(contents) = std::fs::read_to_string(&path)
            && let Ok(pid) = contents.trim().parse::<u32>()
            && pid != std::process::id()
            && pid_alive(pid)
        {
            return Err(PulseErr::AlreadyRunning(pid));
        }
        std::fs::write(&path, std::process::id().to_string())?;
        Ok(Self { path })
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

#[cfg(unix)]
fn pid_alive(pid: u32) -> bool {
    // Signal 0 probes existence without delivering anything. EPERM still
    // means the process exists, just under another uid.
    let rc = unsafe { libc::kill(pid as libc::pid_t, 0) };
    rc == 0 || std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

#[cfg(not(unix))]
fn pid_alive(_pid: u32) -> bool {
    false
}
