//! Per-tab rendering. Each tab reads the shared [`SnapshotSet`] and draws
//! with stock ratatui widgets; no tab mutates anything.

pub mod billing;
pub mod infra;
pub mod overview;
pub mod system;
pub mod usage;

use crate::snapshots::Loaded;
use ratatui::style::Color;
use ratatui::style::Style;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;

/// Section block with a staleness marker in the title.
pub(crate) fn section_block<T>(title: &str, loaded: &Loaded<T>) -> Block<'static> {
    let title = if loaded.stale {
        format!(" {title} (stale) ")
    } else {
        format!(" {title} ")
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(title)
}
