//! Typed snapshot data rendered into ordered text lines, one formatter
//! per domain. Formatters are pure: payload + feature flags in, a
//! [`Section`] out, `(no data)` placeholders when the snapshot is missing.

mod billing;
mod facts;
mod infra;
mod quota;
mod system;
mod trends;

pub use billing::billing_section;
pub use facts::facts_section;
pub use infra::infra_section;
pub use quota::quota_section;
pub use system::system_section;
pub use trends::trends_section;

use crate::layout::LayoutFeatures;
use crate::style::Palette;
use chrono::DateTime;
use chrono::Utc;

/// Shared formatter inputs.
#[derive(Debug, Clone, Copy)]
pub struct SectionCtx {
    pub features: LayoutFeatures,
    pub palette: Palette,
    pub now: DateTime<Utc>,
}

/// Section title with a staleness annotation when the backing snapshot
/// aged out of its TTL.
pub(crate) fn titled(ctx: &SectionCtx, title: &str, stale: bool) -> String {
    if stale {
        format!("{} {}", ctx.palette.title(title), ctx.palette.dim("(stale)"))
    } else {
        ctx.palette.title(title)
    }
}

/// `$1,234` style amounts: whole dollars, no cents noise in a status line.
pub(crate) fn usd(amount: f64) -> String {
    format!("${}", amount.round() as i64)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::layout::LayoutMode;
    use ppulse_core::config_types::Theme;

    pub fn ctx(mode: LayoutMode) -> SectionCtx {
        SectionCtx {
            features: LayoutFeatures::for_mode(mode, Theme::Full),
            palette: Palette::new(false),
            now: Utc::now(),
        }
    }
}
