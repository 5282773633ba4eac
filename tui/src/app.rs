use crate::snapshots::SnapshotSet;
use crate::tabs;
use crate::tui::Term;
use anyhow::Result;
use crossterm::event::Event;
use crossterm::event::EventStream;
use crossterm::event::KeyCode;
use crossterm::event::KeyEventKind;
use futures::StreamExt;
use ppulse_core::CacheStore;
use ppulse_core::config::Config;
use ppulse_core::status::Severity;
use ratatui::Frame;
use ratatui::layout::Constraint;
use ratatui::layout::Direction;
use ratatui::layout::Layout;
use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Tabs;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Cache re-read cadence while the app is idle.
const TICK: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Overview,
    Usage,
    Billing,
    Infra,
    System,
}

impl Tab {
    const ALL: [Tab; 5] = [
        Tab::Overview,
        Tab::Usage,
        Tab::Billing,
        Tab::Infra,
        Tab::System,
    ];

    fn title(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Usage => "Usage",
            Tab::Billing => "Billing",
            Tab::Infra => "Infra",
            Tab::System => "System",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|tab| *tab == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

pub struct App {
    config: Config,
    store: CacheStore,
    tab: Tab,
    snapshots: SnapshotSet,
}

impl App {
    pub fn new(config: Config, store: CacheStore) -> Self {
        let snapshots = SnapshotSet::load(&store, config.snapshot_ttl);
        Self {
            config,
            store,
            tab: Tab::Overview,
            snapshots,
        }
    }

    /// Event loop: user keys, the periodic cache re-read, and the ambient
    /// cancellation token all race; whichever fires first is handled and
    /// the screen repaints.
    pub async fn run(mut self, terminal: &mut Term, cancel: CancellationToken) -> Result<()> {
        let mut events = EventStream::new();
        let mut tick = tokio::time::interval(TICK);
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            terminal.draw(|frame| self.draw(frame))?;
            tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                _ = tick.tick() => {
                    self.refresh();
                }
                event = events.next() => {
                    let Some(event) = event else { return Ok(()) };
                    if self.handle_event(event?) {
                        return Ok(());
                    }
                }
            }
        }
    }

    fn refresh(&mut self) {
        self.snapshots = SnapshotSet::load(&self.store, self.config.snapshot_ttl);
    }

    /// Returns true when the app should exit.
    fn handle_event(&mut self, event: Event) -> bool {
        let Event::Key(key) = event else {
            return false;
        };
        if key.kind == KeyEventKind::Release {
            return false;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => self.tab = self.tab.next(),
            KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => {
                self.tab = self.tab.previous();
            }
            KeyCode::Char('r') => self.refresh(),
            KeyCode::Char(digit @ '1'..='5') => {
                let index = digit as usize - '1' as usize;
                self.tab = Tab::ALL[index];
            }
            _ => {}
        }
        false
    }

    fn draw(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(frame.area());

        let titles: Vec<Line> = Tab::ALL.iter().map(|tab| Line::from(tab.title())).collect();
        let tabs = Tabs::new(titles)
            .select(self.tab.index())
            .highlight_style(Style::default().add_modifier(Modifier::BOLD).fg(Color::Cyan));
        frame.render_widget(tabs, chunks[0]);

        match self.tab {
            Tab::Overview => tabs::overview::draw(frame, chunks[1], &self.snapshots),
            Tab::Usage => tabs::usage::draw(frame, chunks[1], &self.snapshots),
            Tab::Billing => tabs::billing::draw(frame, chunks[1], &self.snapshots),
            Tab::Infra => tabs::infra::draw(frame, chunks[1], &self.snapshots),
            Tab::System => tabs::system::draw(frame, chunks[1], &self.snapshots),
        }

        let status = self.snapshots.status();
        let footer = Line::from(vec![
            Span::styled(
                format!("{} {:?}", status.overall.glyph(), status.overall),
                severity_style(status.overall),
            ),
            Span::raw("  ·  q quit · tab switch · r refresh"),
        ]);
        frame.render_widget(ratatui::widgets::Paragraph::new(footer), chunks[2]);
    }
}

pub(crate) fn severity_style(severity: Severity) -> Style {
    match severity {
        Severity::Unknown => Style::default().fg(Color::DarkGray),
        Severity::Healthy => Style::default().fg(Color::Green),
        Severity::Warning => Style::default().fg(Color::Yellow),
        Severity::Critical => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    }
}
