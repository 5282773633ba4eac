//! Host identity facts via the `fastfetch` binary, with an in-process
//! fallback when it is not installed so the banner always has something to
//! show in the info panel.

use crate::collector::Collector;
use crate::error::PulseErr;
use crate::error::Result;
use crate::snapshot::COLLECTOR_FASTFETCH;
use crate::snapshot::HostFact;
use crate::snapshot::HostFactsPayload;
use crate::snapshot::Payload;
use futures::future::BoxFuture;
use serde::Deserialize;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// Modules requested from fastfetch, in display order.
const MODULES: &str = "os:host:kernel:cpu:gpu:memory:disk:uptime:shell";

#[derive(Debug, Deserialize)]
struct FastfetchModule {
    #[serde(rename = "type")]
    kind: String,
    result: Option<serde_json::Value>,
}

pub struct FastfetchCollector {
    interval: Duration,
}

impl FastfetchCollector {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    async fn run_fastfetch(&self) -> Option<Vec<HostFact>> {
        let binary = which::which("fastfetch").ok()?;
        let output = Command::new(binary)
            .args(["--structure", MODULES, "--format", "json"])
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .await
            .ok()?;
        if !output.status.success() {
            return None;
        }
        let modules: Vec<FastfetchModule> = serde_json::from_slice(&output.stdout)
            .inspect_err(|err| tracing::warn!("fastfetch output unparsable: {err}"))
            .ok()?;
        let facts: Vec<HostFact> = modules
            .into_iter()
            .filter_map(|module| {
                let value = render_result(module.result.as_ref()?)?;
                Some(HostFact {
                    label: module.kind,
                    value,
                })
            })
            .collect();
        (!facts.is_empty()).then_some(facts)
    }
}

/// Fastfetch results are either a plain string or a module-specific object;
/// for objects, prefer the human-oriented `pretty` style fields.
fn render_result(result: &serde_json::Value) -> Option<String> {
    match result {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Object(map) => ["prettyName", "result", "name", "version"]
            .iter()
            .find_map(|field| map.get(*field).and_then(|v| v.as_str()))
            .map(str::to_string),
        _ => None,
    }
}

/// What we can cheaply say about the host without fastfetch.
fn fallback_facts() -> Vec<HostFact> {
    let info = os_info::get();
    let mut facts = vec![HostFact {
        label: "OS".to_string(),
        value: format!("{} {}", info.os_type(), info.version()),
    }];
    if let Ok(kernel) = std::fs::read_to_string("/proc/sys/kernel/osrelease") {
        facts.push(HostFact {
            label: "Kernel".to_string(),
            value: kernel.trim().to_string(),
        });
    }
    facts.push(HostFact {
        label: "Arch".to_string(),
        value: std::env::consts::ARCH.to_string(),
    });
    if let Ok(hostname) = std::fs::read_to_string("/etc/hostname") {
        facts.push(HostFact {
            label: "Host".to_string(),
            value: hostname.trim().to_string(),
        });
    }
    facts
}

impl Collector for FastfetchCollector {
    fn name(&self) -> &'static str {
        COLLECTOR_FASTFETCH
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn collect(&self, cancel: CancellationToken) -> BoxFuture<'_, Result<Payload>> {
        Box::pin(async move {
            let facts = tokio::select! {
                _ = cancel.cancelled() => return Err(PulseErr::Cancelled),
                facts = self.run_fastfetch() => facts,
            };
            let facts = facts.unwrap_or_else(fallback_facts);
            Ok(Payload::HostFacts(HostFactsPayload { facts }))
        })
    }
}
