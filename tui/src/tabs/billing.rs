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
use ratatui::widgets::Sparkline;
use ratatui::widgets::Table;

pub fn draw(frame: &mut Frame, area: Rect, snapshots: &SnapshotSet) {
    let Some(billing) = &snapshots.billing.payload else {
        frame.render_widget(
            Paragraph::new("(no data)").block(section_block("Billing", &snapshots.billing)),
            area,
        );
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(6)])
        .split(area);

    let rows: Vec<Row> = billing
        .providers
        .iter()
        .map(|provider| {
            Row::new(vec![
                provider.label.clone(),
                format!("${:.2}", provider.current_month_usd),
                provider
                    .forecast_usd
                    .map_or("--".to_string(), |f| format!("${f:.2}")),
                provider
                    .previous_month_usd
                    .map_or("--".to_string(), |p| format!("${p:.2}")),
                format!("{:?}", provider.status),
            ])
        })
        .collect();
    let table = Table::new(
        rows,
        [
            Constraint::Length(14),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Min(8),
        ],
    )
    .header(
        Row::new(vec!["provider", "month", "forecast", "prev", "status"])
            .style(Style::default().fg(Color::Cyan)),
    )
    .block(section_block(
        &format!("Billing — ${:.0} total", billing.total.current_usd),
        &snapshots.billing,
    ));
    frame.render_widget(table, chunks[0]);

    let history: Vec<u64> = billing
        .history
        .as_ref()
        .map(|history| {
            history
                .total
                .iter()
                .map(|point| (point.usd * 100.0).max(0.0) as u64)
                .collect()
        })
        .unwrap_or_default();
    let spark = Sparkline::default()
        .data(&history)
        .style(Style::default().fg(Color::Green))
        .block(section_block("Daily spend", &snapshots.billing));
    frame.render_widget(spark, chunks[1]);
}
