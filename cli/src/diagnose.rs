//! `--diagnose`: everything needed to understand why the banner looks the
//! way it does on this machine, in one copy-pasteable report.

use ppulse_common::elapsed::format_duration;
use ppulse_core::CacheStore;
use ppulse_core::config::Config;
use ppulse_render::protocol;
use ppulse_render::protocol::ProcessEnv;
use std::fmt::Write as _;

pub fn report(config: &Config, store: &CacheStore) -> String {
    let mut out = String::new();
    let chafa = protocol::chafa_on_path();

    let _ = writeln!(out, "ppulse {}", env!("CARGO_PKG_VERSION"));
    let _ = writeln!(out);
    let _ = writeln!(out, "terminal");
    let _ = writeln!(
        out,
        "  protocol:      {} (raw: {})",
        protocol::detect_protocol_with_context(&ProcessEnv, chafa),
        protocol::detect_protocol(&ProcessEnv, chafa)
    );
    let _ = writeln!(out, "  ssh:           {}", protocol::is_ssh(&ProcessEnv));
    let _ = writeln!(
        out,
        "  multiplexer:   {}",
        protocol::in_multiplexer(&ProcessEnv)
    );

    let _ = writeln!(out);
    let _ = writeln!(out, "binaries");
    for binary in ["chafa", "tailscale", "kubectl", "fastfetch"] {
        let location = which::which(binary)
            .map(|path| path.display().to_string())
            .unwrap_or_else(|_| "not found".to_string());
        let _ = writeln!(out, "  {binary:<12} {location}");
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "cache ({})", config.cache_dir.display());
    let _ = writeln!(out, "  session id:    {}", config.session_id);
    match store.keys() {
        Ok(keys) if keys.is_empty() => {
            let _ = writeln!(out, "  (empty — is the daemon running?)");
        }
        Ok(keys) => {
            for key in keys {
                match store.get(&key, config.snapshot_ttl) {
                    Ok(Some(cached)) => {
                        let marker = if cached.fresh { "fresh" } else { "stale" };
                        let _ = writeln!(
                            out,
                            "  {key:<12} {marker}, {} old",
                            format_duration(cached.age)
                        );
                    }
                    Ok(None) => {}
                    Err(err) => {
                        let _ = writeln!(out, "  {key:<12} unreadable: {err}");
                    }
                }
            }
        }
        Err(err) => {
            let _ = writeln!(out, "  unreadable: {err}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ppulse_core::config::ConfigOverrides;
    use ppulse_core::config::ConfigToml;
    use tempfile::TempDir;

    #[test]
    fn report_covers_the_basics() {
        let dir = TempDir::new().expect("tempdir");
        let config = Config::from_base_config_with_overrides(
            ConfigToml::default(),
            ConfigOverrides {
                cache_dir: Some(dir.path().to_path_buf()),
                ..Default::default()
            },
        )
        .expect("config");
        let report = report(&config, &CacheStore::new(dir.path()));
        assert!(report.contains("protocol:"));
        assert!(report.contains("chafa"));
        assert!(report.contains("is the daemon running"));
    }
}
