mod cli;
mod diagnose;
mod logging;
mod shell;

pub use cli::Cli;

use anyhow::Result;
use ppulse_core::CacheStore;
use ppulse_core::PulseErr;
use ppulse_core::collectors::build_registry;
use ppulse_core::config::Config;
use ppulse_core::scheduler::Scheduler;
use ppulse_render::Palette;
use ppulse_render::RenderedOutputCache;
use ppulse_render::banner::BannerOptions;
use ppulse_render::banner::render_banner;
use ppulse_render::protocol;
use ppulse_render::protocol::ProcessEnv;
use ppulse_render::starship::StarshipModule;
use ppulse_render::starship::starship_line;
use tokio_util::sync::CancellationToken;

pub async fn run_main(cli: Cli) -> Result<()> {
    if let Some(shell) = cli.shell {
        // Script emission needs no config; stdout is the product.
        print!("{}", shell::script_for(shell));
        return Ok(());
    }

    let config = Config::load(cli.config_overrides())?;
    logging::init(&config, &cli)?;
    let store = CacheStore::new(&config.cache_dir);
    let cancel = cancel_on_signals();

    if cli.daemon {
        let registry = build_registry(&config, &store)?;
        let scheduler = Scheduler::new(registry, store);
        return Ok(scheduler.run_daemon(cancel).await?);
    }
    if cli.tui {
        return ppulse_tui::run_main(config, cancel).await;
    }
    if let Some(module) = cli.starship {
        let module = match module {
            ppulse_common::StarshipModuleCliArg::Claude => StarshipModule::Claude,
            ppulse_common::StarshipModuleCliArg::Billing => StarshipModule::Billing,
            ppulse_common::StarshipModuleCliArg::Infra => StarshipModule::Infra,
        };
        let line = starship_line(&store, module, config.snapshot_ttl);
        if !line.is_empty() {
            println!("{line}");
        }
        return Ok(());
    }
    if cli.diagnose {
        print!("{}", diagnose::report(&config, &store));
        return Ok(());
    }

    // Default mode: one banner to stdout.
    if config.use_mocks {
        // Mocks feed the same cache the banner reads, so the whole path is
        // exercised end to end.
        let registry = build_registry(&config, &store)?;
        let mut scheduler = Scheduler::new(registry, store.clone());
        scheduler.run_pass(&cancel).await;
    }

    let (width, height) = terminal_size(&config);
    let chafa = protocol::chafa_on_path();
    let options = BannerOptions {
        width,
        height,
        palette: Palette::from_env(),
        protocol: protocol::detect_protocol_with_context(&ProcessEnv, chafa),
        ssh: protocol::is_ssh(&ProcessEnv),
    };
    let rendered_cache = RenderedOutputCache::new(16);
    let output = render_banner(&config, &store, Some(&rendered_cache), &options, &cancel).await?;
    print!("{}", output.text);
    if output.truncated {
        tracing::debug!("banner truncated to {height} rows");
    }
    Ok(())
}

/// Root cancellation token, cancelled by SIGINT (and SIGTERM on unix) so
/// in-flight collectors and the render path unwind promptly.
fn cancel_on_signals() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();
        #[cfg(unix)]
        {
            let mut sigterm = match tokio::signal::unix::signal(
                tokio::signal::unix::SignalKind::terminate(),
            ) {
                Ok(sigterm) => sigterm,
                Err(err) => {
                    tracing::warn!("failed to install SIGTERM handler: {err}");
                    let _ = ctrl_c.await;
                    trigger.cancel();
                    return;
                }
            };
            tokio::select! {
                _ = ctrl_c => {}
                _ = sigterm.recv() => {}
            }
        }
        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
        }
        trigger.cancel();
    });
    cancel
}

/// Explicit overrides win, then the real terminal, then a conservative
/// 80x24 so piped output still lays out sensibly.
fn terminal_size(config: &Config) -> (u16, u16) {
    let detected = crossterm::terminal::size().ok();
    let env_dim = |name: &str| -> Option<u16> {
        std::env::var(name).ok().and_then(|value| value.parse().ok())
    };
    let width = config
        .term_width
        .or(env_dim("COLUMNS"))
        .or(detected.map(|(w, _)| w))
        .unwrap_or(80);
    let height = config
        .term_height
        .or(env_dim("LINES"))
        .or(detected.map(|(_, h)| h))
        .unwrap_or(24);
    (width.max(1), height.max(1))
}

/// Exit code mapping: 2 for a second daemon, 1 for everything else fatal.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<PulseErr>()
        .map_or(1, PulseErr::exit_code)
}
