use crate::snapshots::SnapshotSet;
use crate::tabs::section_block;
use ratatui::Frame;
use ratatui::layout::Constraint;
use ratatui::layout::Direction;
use ratatui::layout::Layout;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::style::Style;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Row;
use ratatui::widgets::Table;

pub fn draw(frame: &mut Frame, area: Rect, snapshots: &SnapshotSet) {
    let Some(infra) = &snapshots.infra.payload else {
        frame.render_widget(
            Paragraph::new("(no data)").block(section_block("Infrastructure", &snapshots.infra)),
            area,
        );
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(8)])
        .split(area);

    let node_rows: Vec<Row> = infra
        .mesh
        .as_ref()
        .map(|mesh| {
            mesh.nodes
                .iter()
                .map(|node| {
                    let state = if node.online { "up" } else { "down" };
                    let style = if node.online {
                        Style::default().fg(Color::Green)
                    } else {
                        Style::default().fg(Color::Red)
                    };
                    Row::new(vec![
                        node.hostname.clone(),
                        state.to_string(),
                        node.os.clone().unwrap_or_else(|| "--".to_string()),
                        node.tags.join(","),
                    ])
                    .style(style)
                })
                .collect()
        })
        .unwrap_or_default();
    let mesh_title = infra
        .mesh
        .as_ref()
        .map_or("Mesh".to_string(), |mesh| {
            format!("Mesh — {}/{} online", mesh.online, mesh.total)
        });
    let nodes = Table::new(
        node_rows,
        [
            Constraint::Length(18),
            Constraint::Length(6),
            Constraint::Length(10),
            Constraint::Min(10),
        ],
    )
    .header(Row::new(vec!["host", "state", "os", "tags"]).style(Style::default().fg(Color::Cyan)))
    .block(section_block(&mesh_title, &snapshots.infra));
    frame.render_widget(nodes, chunks[0]);

    let cluster_rows: Vec<Row> = infra
        .clusters
        .iter()
        .map(|cluster| {
            Row::new(vec![
                cluster.name.clone(),
                cluster.platform.clone(),
                format!("{:?}", cluster.health),
                format!("{}/{}", cluster.nodes_ready, cluster.nodes_total),
                cluster.version.clone().unwrap_or_else(|| "--".to_string()),
            ])
        })
        .collect();
    let clusters = Table::new(
        cluster_rows,
        [
            Constraint::Length(18),
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Min(10),
        ],
    )
    .header(
        Row::new(vec!["cluster", "platform", "health", "nodes", "version"])
            .style(Style::default().fg(Color::Cyan)),
    )
    .block(section_block("Clusters", &snapshots.infra));
    frame.render_widget(clusters, chunks[1]);
}
