use crate::app::severity_style;
use crate::snapshots::SnapshotSet;
use crate::tabs::section_block;
use ratatui::Frame;
use ratatui::layout::Constraint;
use ratatui::layout::Direction;
use ratatui::layout::Layout;
use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Paragraph;

pub fn draw(frame: &mut Frame, area: Rect, snapshots: &SnapshotSet) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Length(5),
            Constraint::Min(4),
        ])
        .split(area);

    let status = snapshots.status();

    let mut quota_lines: Vec<Line> = Vec::new();
    match &snapshots.quota.payload {
        Some(quota) if !quota.accounts.is_empty() => {
            for account in &quota.accounts {
                let five_hour = account
                    .five_hour
                    .as_ref()
                    .map_or("--".to_string(), |w| format!("{:.0}%", w.used_percent));
                let seven_day = account
                    .seven_day
                    .as_ref()
                    .map_or("--".to_string(), |w| format!("{:.0}%", w.used_percent));
                quota_lines.push(Line::from(vec![
                    Span::styled(account.label.clone(), severity_style(status.quota)),
                    Span::raw(format!("  5h {five_hour}  7d {seven_day}")),
                ]));
            }
        }
        _ => quota_lines.push(Line::from("(no data)")),
    }
    frame.render_widget(
        Paragraph::new(quota_lines).block(section_block("Claude", &snapshots.quota)),
        chunks[0],
    );

    let billing_lines: Vec<Line> = match &snapshots.billing.payload {
        Some(billing) => {
            let mut line = format!("${:.0} this month", billing.total.current_usd);
            if let Some(forecast) = billing.total.forecast_usd {
                line.push_str(&format!("  (forecast ${forecast:.0})"));
            }
            vec![Line::from(line)]
        }
        None => vec![Line::from("(no data)")],
    };
    frame.render_widget(
        Paragraph::new(billing_lines).block(section_block("Billing", &snapshots.billing)),
        chunks[1],
    );

    let mut infra_lines: Vec<Line> = Vec::new();
    match &snapshots.infra.payload {
        Some(infra) => {
            if let Some(mesh) = &infra.mesh {
                infra_lines.push(Line::from(format!(
                    "{}: {}/{} online",
                    mesh.label, mesh.online, mesh.total
                )));
            }
            for cluster in &infra.clusters {
                infra_lines.push(Line::from(format!(
                    "k8s {} ({:?}) {}/{} nodes",
                    cluster.name,
                    cluster.health,
                    cluster.nodes_ready,
                    cluster.nodes_total
                )));
            }
            if infra_lines.is_empty() {
                infra_lines.push(Line::from("(no data)"));
            }
        }
        None => infra_lines.push(Line::from("(no data)")),
    }
    frame.render_widget(
        Paragraph::new(infra_lines).block(section_block("Infrastructure", &snapshots.infra)),
        chunks[2],
    );
}
