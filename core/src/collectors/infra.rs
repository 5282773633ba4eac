//! Fleet health collector: mesh-VPN state from `tailscale status --json`
//! and cluster state from `kubectl get nodes` per configured context.
//! Missing binaries are a normal condition on a fresh workstation and
//! produce an empty payload, not an error.

use crate::collector::Collector;
use crate::config::InfraConfig;
use crate::error::PulseErr;
use crate::error::Result;
use crate::snapshot::COLLECTOR_INFRA;
use crate::snapshot::ClusterHealth;
use crate::snapshot::ClusterStatus;
use crate::snapshot::InfraPayload;
use crate::snapshot::MeshNode;
use crate::snapshot::MeshStatus;
use crate::snapshot::Payload;
use chrono::DateTime;
use chrono::Utc;
use futures::future::BoxFuture;
use serde::Deserialize;
use std::collections::HashMap;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TailscaleStatus {
    #[serde(rename = "Self")]
    self_node: Option<TailscalePeer>,
    #[serde(default)]
    peer: HashMap<String, TailscalePeer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TailscalePeer {
    host_name: String,
    #[serde(default)]
    online: bool,
    #[serde(rename = "OS")]
    os: Option<String>,
    last_seen: Option<DateTime<Utc>>,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct KubeNodeList {
    #[serde(default)]
    items: Vec<KubeNode>,
}

#[derive(Debug, Deserialize)]
struct KubeNode {
    status: KubeNodeStatus,
}

#[derive(Debug, Deserialize)]
struct KubeNodeStatus {
    #[serde(default)]
    conditions: Vec<KubeCondition>,
    #[serde(rename = "nodeInfo")]
    node_info: Option<KubeNodeInfo>,
}

#[derive(Debug, Deserialize)]
struct KubeCondition {
    #[serde(rename = "type")]
    kind: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct KubeNodeInfo {
    #[serde(rename = "kubeletVersion")]
    kubelet_version: String,
}

pub struct InfraCollector {
    config: InfraConfig,
    interval: Duration,
}

impl InfraCollector {
    pub fn new(config: InfraConfig, interval: Duration) -> Self {
        Self { config, interval }
    }

    async fn mesh_status(&self) -> Option<MeshStatus> {
        if !self.config.mesh_enabled {
            return None;
        }
        let binary = which::which("tailscale").ok()?;
        let output = run_json(Command::new(binary).args(["status", "--json"])).await?;
        let status: TailscaleStatus = match serde_json::from_slice(&output) {
            Ok(status) => status,
            Err(err) => {
                tracing::warn!("tailscale status unparsable: {err}");
                return None;
            }
        };

        let mut nodes: Vec<MeshNode> = status
            .self_node
            .into_iter()
            .chain(status.peer.into_values())
            .map(|peer| MeshNode {
                hostname: peer.host_name,
                online: peer.online,
                cpu_percent: None,
                ram_percent: None,
                disk_percent: None,
                tags: peer.tags,
                os: peer.os,
                last_seen: peer.last_seen,
            })
            .collect();
        nodes.sort_by(|a, b| a.hostname.cmp(&b.hostname));
        let online = nodes.iter().filter(|n| n.online).count() as u32;
        let total = nodes.len() as u32;
        Some(MeshStatus {
            label: self.config.mesh_label.clone(),
            online,
            total,
            nodes,
            dashboard_url: self.config.mesh_dashboard_url.clone(),
        })
    }

    async fn cluster_status(&self, context: &str) -> ClusterStatus {
        let mut cluster = ClusterStatus {
            name: context.to_string(),
            platform: "kubernetes".to_string(),
            health: ClusterHealth::Unknown,
            nodes_total: 0,
            nodes_ready: 0,
            pods_running: None,
            pods_total: None,
            version: None,
            dashboard_url: None,
        };
        let Ok(binary) = which::which("kubectl") else {
            return cluster;
        };
        let Some(output) = run_json(
            Command::new(binary).args(["--context", context, "get", "nodes", "-o", "json"]),
        )
        .await
        else {
            // kubectl reachable but the context is not: the cluster is off
            // the air as far as this workstation is concerned.
            cluster.health = ClusterHealth::Offline;
            return cluster;
        };
        let nodes: KubeNodeList = match serde_json::from_slice(&output) {
            Ok(nodes) => nodes,
            Err(err) => {
                tracing::warn!(context, "kubectl output unparsable: {err}");
                return cluster;
            }
        };

        cluster.nodes_total = nodes.items.len() as u32;
        cluster.nodes_ready = nodes
            .items
            .iter()
            .filter(|node| {
                node.status
                    .conditions
                    .iter()
                    .any(|cond| cond.kind == "Ready" && cond.status == "True")
            })
            .count() as u32;
        cluster.version = nodes
            .items
            .first()
            .and_then(|node| node.status.node_info.as_ref())
            .map(|info| info.kubelet_version.clone());
        cluster.health = if cluster.nodes_total == 0 {
            ClusterHealth::Unknown
        } else if cluster.nodes_ready == cluster.nodes_total {
            ClusterHealth::Healthy
        } else if cluster.nodes_ready == 0 {
            ClusterHealth::Offline
        } else {
            ClusterHealth::Degraded
        };
        cluster
    }
}

impl Collector for InfraCollector {
    fn name(&self) -> &'static str {
        COLLECTOR_INFRA
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    fn collect(&self, cancel: CancellationToken) -> BoxFuture<'_, Result<Payload>> {
        Box::pin(async move {
            let mesh = tokio::select! {
                _ = cancel.cancelled() => return Err(PulseErr::Cancelled),
                mesh = self.mesh_status() => mesh,
            };
            let mut clusters = Vec::with_capacity(self.config.kube_contexts.len());
            for context in &self.config.kube_contexts {
                let cluster = tokio::select! {
                    _ = cancel.cancelled() => return Err(PulseErr::Cancelled),
                    cluster = self.cluster_status(context) => cluster,
                };
                clusters.push(cluster);
            }
            Ok(Payload::Infra(InfraPayload { mesh, clusters }))
        })
    }
}

/// Run a subprocess expected to print JSON on stdout; `None` on spawn
/// failure or non-zero exit.
async fn run_json(command: &mut Command) -> Option<Vec<u8>> {
    let output = command
        .stdin(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await
        .inspect_err(|err| tracing::debug!("subprocess failed to spawn: {err}"))
        .ok()?;
    if !output.status.success() {
        tracing::debug!(
            "subprocess exited {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
        return None;
    }
    Some(output.stdout)
}
