use crate::layout::Section;
use crate::sections::SectionCtx;
use crate::sections::titled;
use ppulse_common::elapsed::format_ago;
use ppulse_core::snapshot::ClusterHealth;
use ppulse_core::snapshot::InfraPayload;
use ppulse_core::status::Severity;

const NODE_BAR_WIDTH: usize = 5;

pub fn infra_section(payload: Option<&InfraPayload>, stale: bool, ctx: &SectionCtx) -> Section {
    let title = titled(ctx, "Infrastructure", stale);
    let Some(payload) = payload else {
        return Section::no_data(title);
    };
    if payload.mesh.is_none() && payload.clusters.is_empty() {
        return Section::no_data(title);
    }

    let mut lines = Vec::new();
    if let Some(mesh) = &payload.mesh {
        let severity = if mesh.total > 0 && mesh.online == 0 {
            Severity::Critical
        } else if mesh.online < mesh.total {
            Severity::Warning
        } else {
            Severity::Healthy
        };
        lines.push(format!(
            "{}: {} online",
            mesh.label,
            ctx.palette
                .severity(severity, &format!("{}/{}", mesh.online, mesh.total))
        ));
        if ctx.features.show_node_metrics {
            for node in &mesh.nodes {
                lines.push(node_line(node, ctx));
            }
        }
    }
    for cluster in &payload.clusters {
        let severity = match cluster.health {
            ClusterHealth::Healthy => Severity::Healthy,
            ClusterHealth::Degraded => Severity::Warning,
            ClusterHealth::Offline => Severity::Critical,
            ClusterHealth::Unknown => Severity::Unknown,
        };
        let health = match cluster.health {
            ClusterHealth::Healthy => "healthy",
            ClusterHealth::Degraded => "degraded",
            ClusterHealth::Offline => "offline",
            ClusterHealth::Unknown => "unknown",
        };
        let mut line = format!(
            "k8s: {} ({})",
            cluster.name,
            ctx.palette.severity(severity, health)
        );
        if ctx.features.show_full_metrics {
            line.push_str(&format!(" {}/{} nodes", cluster.nodes_ready, cluster.nodes_total));
            if let (Some(running), Some(total)) = (cluster.pods_running, cluster.pods_total) {
                line.push_str(&format!(", {running}/{total} pods"));
            }
            if let Some(version) = &cluster.version {
                line.push_str(&ctx.palette.dim(&format!(" {version}")));
            }
        }
        lines.push(line);
    }
    Section::new(title, lines)
}

fn node_line(node: &ppulse_core::snapshot::MeshNode, ctx: &SectionCtx) -> String {
    if !node.online {
        let mut line = format!(
            "  {} {}",
            node.hostname,
            ctx.palette.severity(Severity::Warning, "offline")
        );
        if let Some(last_seen) = node.last_seen {
            line.push_str(&ctx.palette.dim(&format!(" ({})", format_ago(last_seen, ctx.now))));
        }
        return line;
    }
    let mut line = format!("  {} {}", node.hostname, ctx.palette.severity(Severity::Healthy, "up"));
    for (tag, value) in [
        ("cpu", node.cpu_percent),
        ("ram", node.ram_percent),
        ("disk", node.disk_percent),
    ] {
        if let Some(percent) = value {
            line.push_str(&format!(" {tag} {}", ctx.palette.bar(percent, NODE_BAR_WIDTH)));
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutMode;
    use crate::sections::test_support::ctx;
    use ppulse_core::snapshot::ClusterStatus;
    use ppulse_core::snapshot::MeshNode;
    use ppulse_core::snapshot::MeshStatus;
    use pretty_assertions::assert_eq;

    fn payload() -> InfraPayload {
        InfraPayload {
            mesh: Some(MeshStatus {
                label: "ts".to_string(),
                online: 4,
                total: 5,
                nodes: vec![MeshNode {
                    hostname: "nas".to_string(),
                    online: true,
                    cpu_percent: Some(12.0),
                    ram_percent: Some(40.0),
                    disk_percent: None,
                    tags: Vec::new(),
                    os: None,
                    last_seen: None,
                }],
                dashboard_url: None,
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

    #[test]
    fn compact_has_mesh_and_cluster_one_liners() {
        let payload = payload();
        let section = infra_section(Some(&payload), false, &ctx(LayoutMode::Compact));
        assert_eq!(
            section.lines,
            vec!["ts: 4/5 online", "k8s: bitter-darkness (healthy)"]
        );
    }

    #[test]
    fn wide_adds_node_lines_and_cluster_detail() {
        let payload = payload();
        let section = infra_section(Some(&payload), false, &ctx(LayoutMode::Wide));
        assert!(section.lines[1].starts_with("  nas up cpu ["));
        assert!(section.lines[2].contains("3/3 nodes, 42/47 pods"));
    }

    #[test]
    fn empty_payload_is_no_data() {
        let empty = InfraPayload::default();
        let section = infra_section(Some(&empty), false, &ctx(LayoutMode::Compact));
        assert_eq!(section.lines, vec!["(no data)"]);
    }
}
