//! One-shot banner: load snapshots, evaluate status, resolve the session
//! image, compose, and hand back a single string ready for stdout.
//!
//! Image handling depends on what the renderer produced: chafa/half-block
//! output is plain lines and joins the column layout; kitty/iTerm2 blobs
//! cannot be interleaved line-wise, so they are emitted above the text and
//! the text layout reclaims the image column.

use crate::RenderedOutputCache;
use crate::error::RenderError;
use crate::image;
use crate::image::RenderRequest;
use crate::layout;
use crate::layout::LayoutFeatures;
use crate::layout::LayoutMode;
use crate::lru::RenderedKey;
use crate::protocol::ImageProtocol;
use crate::sections;
use crate::sections::SectionCtx;
use crate::style::Palette;
use chrono::Utc;
use ppulse_core::CacheStore;
use ppulse_core::ImageCache;
use ppulse_core::PulseErr;
use ppulse_core::SessionManager;
use ppulse_core::banner_key;
use ppulse_core::config::Config;
use ppulse_core::snapshot::BillingPayload;
use ppulse_core::snapshot::HostFactsPayload;
use ppulse_core::snapshot::InfraPayload;
use ppulse_core::snapshot::Payload;
use ppulse_core::snapshot::QuotaPayload;
use ppulse_core::snapshot::SystemPayload;
use ppulse_core::status;
use ppulse_core::waifu::WaifuFetcher;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct BannerOptions {
    pub width: u16,
    pub height: u16,
    pub palette: Palette,
    pub protocol: ImageProtocol,
    pub ssh: bool,
}

#[derive(Debug)]
pub struct BannerOutput {
    pub text: String,
    pub truncated: bool,
}

/// A snapshot payload plus its freshness, or nothing. Read errors degrade
/// to "no data"; the banner always renders.
struct Loaded<T> {
    payload: Option<T>,
    stale: bool,
}

impl<T> Loaded<T> {
    fn empty() -> Self {
        Self {
            payload: None,
            stale: false,
        }
    }
}

pub async fn render_banner(
    config: &Config,
    store: &CacheStore,
    rendered_cache: Option<&RenderedOutputCache>,
    options: &BannerOptions,
    cancel: &CancellationToken,
) -> ppulse_core::Result<BannerOutput> {
    if cancel.is_cancelled() {
        return Err(PulseErr::Cancelled);
    }

    let quota = load(store, config, |payload| match payload {
        Payload::Quota(quota) => Some(quota),
        _ => None,
    });
    let billing = load(store, config, |payload| match payload {
        Payload::Billing(billing) => Some(billing),
        _ => None,
    });
    let infra = load(store, config, |payload| match payload {
        Payload::Infra(infra) => Some(infra),
        _ => None,
    });
    let system = load(store, config, |payload| match payload {
        Payload::System(system) => Some(system),
        _ => None,
    });
    let facts = load(store, config, |payload| match payload {
        Payload::HostFacts(facts) => Some(facts),
        _ => None,
    });

    let report = status::evaluate(
        quota.payload.as_ref(),
        billing.payload.as_ref(),
        infra.payload.as_ref(),
    );

    let mode = layout::detect_mode(options.width, options.height);
    let features = LayoutFeatures::for_mode(mode, config.theme);
    let ctx = SectionCtx {
        features,
        palette: options.palette,
        now: Utc::now(),
    };

    let width = usize::from(options.width);
    let height = usize::from(options.height);
    let header = header_line(&report, &options.palette);
    let mut preamble: Vec<String> = vec![header];

    // Resolve the session image before planning columns: a binary blob (or
    // no image at all) releases the image column to the text panels.
    let mut image_lines: Option<Vec<String>> = None;
    let want_image =
        features.show_image && config.waifu.enabled && options.protocol != ImageProtocol::None;
    let plan_probe = layout::plan_columns(mode, width, true);
    if want_image && let Some(image_cols) = plan_probe.image {
        let image_rows = (height / 3).clamp(8, 24) as u16;
        match resolve_image(
            config,
            rendered_cache,
            options,
            image_cols as u16,
            image_rows,
            cancel,
        )
        .await
        {
            Ok(Some(rendered)) if rendered.is_text_block() => {
                image_lines = Some(rendered.output.lines().map(str::to_string).collect());
            }
            Ok(Some(rendered)) => preamble.push(rendered.output),
            Ok(None) => {}
            Err(err) => {
                tracing::debug!("banner image unavailable: {err}");
                preamble.push(options.palette.dim("(image: protocol not supported)"));
            }
        }
    }
    if cancel.is_cancelled() {
        return Err(PulseErr::Cancelled);
    }

    let body_height = height.saturating_sub(preamble.len());
    let composed = match mode {
        LayoutMode::Compact => {
            let sections_list = vec![
                sections::quota_section(quota.payload.as_ref(), quota.stale, &ctx),
                sections::billing_section(billing.payload.as_ref(), billing.stale, &ctx),
                sections::infra_section(infra.payload.as_ref(), infra.stale, &ctx),
                sections::system_section(system.payload.as_ref(), system.stale, &ctx),
            ];
            layout::compose_compact(&sections_list, width, body_height)
        }
        _ => {
            let plan = layout::plan_columns(mode, width, image_lines.is_some());
            let main = vec![
                sections::quota_section(quota.payload.as_ref(), quota.stale, &ctx),
                sections::billing_section(billing.payload.as_ref(), billing.stale, &ctx),
            ];
            let info = vec![
                sections::infra_section(infra.payload.as_ref(), infra.stale, &ctx),
                sections::system_section(system.payload.as_ref(), system.stale, &ctx),
                sections::facts_section(facts.payload.as_ref(), facts.stale, &ctx),
            ];
            let spark = match plan.sparkline {
                Some(spark_width) => vec![sections::trends_section(
                    system.payload.as_ref(),
                    billing.payload.as_ref(),
                    spark_width,
                    &ctx,
                )],
                None => Vec::new(),
            };
            layout::compose_columns(
                &plan,
                image_lines.as_deref(),
                &main,
                &info,
                &spark,
                body_height,
                features.show_borders,
            )
        }
    };

    let mut text = preamble.join("\n");
    if !composed.lines.is_empty() {
        text.push('\n');
        text.push_str(&composed.lines.join("\n"));
    }
    text.push('\n');
    Ok(BannerOutput {
        text,
        truncated: composed.truncated,
    })
}

fn header_line(report: &status::StatusReport, palette: &Palette) -> String {
    let glyph = palette.severity(report.overall, report.overall.glyph());
    let summary = match report.overall {
        status::Severity::Unknown => "no data yet",
        status::Severity::Healthy => "all systems healthy",
        status::Severity::Warning => "attention needed",
        status::Severity::Critical => "action required",
    };
    format!("{glyph} {} — {summary}", palette.title("ppulse"))
}

fn load<T>(
    store: &CacheStore,
    config: &Config,
    extract: impl Fn(Payload) -> Option<T>,
) -> Loaded<T>
where
    T: NamedPayload,
{
    match store.get(T::COLLECTOR, config.snapshot_ttl) {
        Ok(Some(cached)) => {
            let stale = !cached.fresh;
            Loaded {
                payload: extract(cached.snapshot.payload),
                stale,
            }
        }
        Ok(None) => Loaded::empty(),
        Err(err) => {
            tracing::warn!("unreadable snapshot for {}: {err}", T::COLLECTOR);
            Loaded::empty()
        }
    }
}

/// Compile-time binding of payload type to collector name, used by the
/// loader so each read names its snapshot file.
trait NamedPayload {
    const COLLECTOR: &'static str;
}

impl NamedPayload for QuotaPayload {
    const COLLECTOR: &'static str = ppulse_core::snapshot::COLLECTOR_CLAUDE;
}
impl NamedPayload for BillingPayload {
    const COLLECTOR: &'static str = ppulse_core::snapshot::COLLECTOR_BILLING;
}
impl NamedPayload for InfraPayload {
    const COLLECTOR: &'static str = ppulse_core::snapshot::COLLECTOR_INFRA;
}
impl NamedPayload for SystemPayload {
    const COLLECTOR: &'static str = ppulse_core::snapshot::COLLECTOR_SYSTEM;
}
impl NamedPayload for HostFactsPayload {
    const COLLECTOR: &'static str = ppulse_core::snapshot::COLLECTOR_FASTFETCH;
}

/// Fetch-or-reuse the session image and render it for the negotiated
/// protocol, consulting the rendered-output LRU first.
async fn resolve_image(
    config: &Config,
    rendered_cache: Option<&RenderedOutputCache>,
    options: &BannerOptions,
    cols: u16,
    rows: u16,
    cancel: &CancellationToken,
) -> Result<Option<image::Rendered>, RenderError> {
    let key = RenderedKey {
        session_id: config.session_id.clone(),
        protocol: options.protocol,
        cols,
        rows,
    };
    if let Some(cache) = rendered_cache
        && let Some(output) = cache.get(&key)
    {
        return Ok(Some(image::Rendered {
            output,
            protocol_used: options.protocol,
        }));
    }

    let bytes = match fetch_image_bytes(config, cancel).await {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return Ok(None),
        Err(err) => {
            tracing::debug!("session image fetch failed: {err}");
            return Ok(None);
        }
    };

    let request = RenderRequest {
        cols,
        rows,
        protocol: options.protocol,
        fallback_enabled: true,
        ssh: options.ssh,
    };
    let rendered = image::render(&bytes, &request).await?;
    if let Some(cache) = rendered_cache
        && rendered.protocol_used == options.protocol
    {
        cache.put(key, rendered.output.clone());
    }
    Ok(Some(rendered))
}

async fn fetch_image_bytes(
    config: &Config,
    cancel: &CancellationToken,
) -> ppulse_core::Result<Option<Vec<u8>>> {
    if let Some(source_url) = &config.waifu.source_url {
        let sessions_cache = Arc::new(ImageCache::new(
            config.waifu_cache_dir.join("sessions"),
            config.waifu.ttl,
            config.waifu.max_size_mb,
        ));
        let manager = SessionManager::new(sessions_cache, config.waifu.max_sessions);
        let fetcher = WaifuFetcher::new(source_url.clone());
        let category = config.waifu.category.clone();
        let bytes = tokio::select! {
            _ = cancel.cancelled() => return Err(PulseErr::Cancelled),
            bytes = manager.get_or_fetch(&config.session_id, &category, || async {
                fetcher.fetch(&category).await
            }) => bytes?,
        };
        return Ok(Some(bytes));
    }

    // No remote source configured: fall back to a pre-seeded category
    // image in the base cache, stale or not.
    let base = ImageCache::new(
        &config.waifu_cache_dir,
        config.waifu.ttl,
        config.waifu.max_size_mb,
    );
    Ok(base
        .get(&banner_key(&config.waifu.category))?
        .map(|(bytes, _fresh)| bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ppulse_core::config::ConfigOverrides;
    use ppulse_core::config::ConfigToml;
    use ppulse_core::config_types::Theme;
    use ppulse_core::snapshot::Snapshot;
    use ppulse_ansi::visible_width;
    use tempfile::TempDir;

    fn test_config(dir: &TempDir, theme: Theme) -> Config {
        Config::from_base_config_with_overrides(
            ConfigToml::default(),
            ConfigOverrides {
                cache_dir: Some(dir.path().to_path_buf()),
                theme: Some(theme),
                ..Default::default()
            },
        )
        .expect("config")
    }

    fn options(width: u16, height: u16) -> BannerOptions {
        BannerOptions {
            width,
            height,
            palette: Palette::new(false),
            protocol: ImageProtocol::None,
            ssh: false,
        }
    }

    fn seed_mocks(store: &CacheStore) {
        use ppulse_core::collectors::mock_payload;
        for name in ["claude", "billing", "infra", "system", "fastfetch"] {
            let snapshot = Snapshot::new(name, mock_payload(name, 1, 7));
            store.set(name, &snapshot).expect("seed");
        }
    }

    #[tokio::test]
    async fn empty_cache_still_renders_no_data_banner() {
        let dir = TempDir::new().expect("tempdir");
        let config = test_config(&dir, Theme::Full);
        let store = CacheStore::new(&config.cache_dir);
        let output = render_banner(
            &config,
            &store,
            None,
            &options(80, 24),
            &CancellationToken::new(),
        )
        .await
        .expect("render");
        assert!(output.text.contains("no data yet"));
        assert!(output.text.contains("(no data)"));
    }

    #[tokio::test]
    async fn compact_banner_respects_bounds() {
        let dir = TempDir::new().expect("tempdir");
        let config = test_config(&dir, Theme::Full);
        let store = CacheStore::new(&config.cache_dir);
        seed_mocks(&store);
        let output = render_banner(
            &config,
            &store,
            None,
            &options(80, 24),
            &CancellationToken::new(),
        )
        .await
        .expect("render");
        let lines: Vec<&str> = output.text.lines().collect();
        assert!(lines.len() <= 24, "{} lines", lines.len());
        for line in &lines {
            assert!(visible_width(line) <= 80, "too wide: {line}");
        }
        assert!(output.text.contains("this month"));
        assert!(output.text.contains("online"));
    }

    #[tokio::test]
    async fn ultra_wide_has_trends_panel() {
        let dir = TempDir::new().expect("tempdir");
        let config = test_config(&dir, Theme::Full);
        let store = CacheStore::new(&config.cache_dir);
        seed_mocks(&store);
        let output = render_banner(
            &config,
            &store,
            None,
            &options(200, 80),
            &CancellationToken::new(),
        )
        .await
        .expect("render");
        assert!(output.text.contains("Trends"));
        for line in output.text.lines() {
            assert!(visible_width(line) <= 200, "too wide: {line}");
        }
    }

    #[tokio::test]
    async fn cancelled_token_short_circuits() {
        let dir = TempDir::new().expect("tempdir");
        let config = test_config(&dir, Theme::Full);
        let store = CacheStore::new(&config.cache_dir);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = render_banner(&config, &store, None, &options(80, 24), &cancel)
            .await
            .expect_err("should cancel");
        assert!(matches!(err, PulseErr::Cancelled));
    }
}
