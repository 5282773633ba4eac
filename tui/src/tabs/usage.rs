use crate::snapshots::SnapshotSet;
use crate::tabs::section_block;
use ratatui::Frame;
use ratatui::layout::Constraint;
use ratatui::layout::Direction;
use ratatui::layout::Layout;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::style::Style;
use ratatui::widgets::Gauge;
use ratatui::widgets::Paragraph;

pub fn draw(frame: &mut Frame, area: Rect, snapshots: &SnapshotSet) {
    let Some(quota) = &snapshots.quota.payload else {
        frame.render_widget(
            Paragraph::new("(no data)").block(section_block("Usage", &snapshots.quota)),
            area,
        );
        return;
    };

    // Two gauges per account (5h and 7d windows).
    let constraints: Vec<Constraint> = quota
        .accounts
        .iter()
        .map(|_| Constraint::Length(5))
        .chain([Constraint::Min(0)])
        .collect();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (account, row) in quota.accounts.iter().zip(rows.iter()) {
        let block = section_block(&account.label, &snapshots.quota);
        let inner = block.inner(*row);
        frame.render_widget(block, *row);
        let windows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Min(0)])
            .split(inner);

        for (index, (label, window)) in [
            ("5h", &account.five_hour),
            ("7d", &account.seven_day),
        ]
        .into_iter()
        .enumerate()
        {
            let Some(window) = window else { continue };
            let percent = window.used_percent.clamp(0.0, 100.0) as u16;
            let color = if window.used_percent >= 95.0 {
                Color::Red
            } else if window.used_percent >= 80.0 {
                Color::Yellow
            } else {
                Color::Green
            };
            let gauge = Gauge::default()
                .gauge_style(Style::default().fg(color))
                .label(format!("{label} {:.0}%", window.used_percent))
                .percent(percent);
            frame.render_widget(gauge, windows[index]);
        }
    }
}
