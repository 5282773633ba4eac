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
use ratatui::widgets::Sparkline;

pub fn draw(frame: &mut Frame, area: Rect, snapshots: &SnapshotSet) {
    let latest = snapshots
        .system
        .payload
        .as_ref()
        .and_then(|payload| payload.latest().copied());
    let Some(latest) = latest else {
        frame.render_widget(
            Paragraph::new("(no data)").block(section_block("System", &snapshots.system)),
            area,
        );
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(5),
        ])
        .split(area);

    for (index, (label, value)) in [
        ("CPU", latest.cpu_percent),
        ("RAM", latest.ram_percent),
        ("Disk", latest.disk_percent),
    ]
    .into_iter()
    .enumerate()
    {
        let color = if value >= 90.0 {
            Color::Red
        } else if value >= 75.0 {
            Color::Yellow
        } else {
            Color::Green
        };
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(color))
            .label(format!("{value:.0}%"))
            .percent(value.clamp(0.0, 100.0) as u16)
            .block(section_block(label, &snapshots.system));
        frame.render_widget(gauge, chunks[index]);
    }

    let cpu_history: Vec<u64> = snapshots
        .system
        .payload
        .as_ref()
        .map(|payload| {
            payload
                .samples
                .iter()
                .map(|sample| sample.cpu_percent.max(0.0) as u64)
                .collect()
        })
        .unwrap_or_default();
    let spark = Sparkline::default()
        .data(&cpu_history)
        .max(100)
        .style(Style::default().fg(Color::Cyan))
        .block(section_block(
            &format!("CPU history — load {:.2}", latest.load_avg),
            &snapshots.system,
        ));
    frame.render_widget(spark, chunks[3]);
}
