// Forbid accidental stdout/stderr writes in the library portion of the
// TUI: raw mode owns the terminal while the app runs.
#![deny(clippy::print_stdout, clippy::print_stderr)]

mod app;
mod snapshots;
mod tabs;
mod tui;

use anyhow::Result;
use ppulse_core::CacheStore;
use ppulse_core::config::Config;
use tokio_util::sync::CancellationToken;

pub use app::App;

/// Run the interactive display until the user quits. The TUI is a
/// read-only consumer of the snapshot cache; the daemon keeps the data
/// flowing underneath it.
pub async fn run_main(config: Config, cancel: CancellationToken) -> Result<()> {
    let store = CacheStore::new(&config.cache_dir);
    let mut terminal = tui::enter()?;
    let app = App::new(config, store);
    let result = app.run(&mut terminal, cancel).await;
    tui::leave()?;
    result
}
