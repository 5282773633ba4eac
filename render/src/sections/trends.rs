//! The dedicated sparkline panel shown in ultra-wide mode: system history
//! micro-charts plus the daily billing spend, each with a `(no data)`
//! placeholder when its series is missing.

use crate::layout::Section;
use crate::sections::SectionCtx;
use crate::sections::titled;
use crate::sparkline::sparkline;
use ppulse_core::snapshot::BillingPayload;
use ppulse_core::snapshot::SystemPayload;

/// Label column plus one sparkline per series; `width` is the panel width
/// the chart may occupy.
pub fn trends_section(
    system: Option<&SystemPayload>,
    billing: Option<&BillingPayload>,
    width: usize,
    ctx: &SectionCtx,
) -> Section {
    let title = titled(ctx, "Trends", false);
    let chart_width = width.saturating_sub(8).max(8);
    let mut lines = Vec::new();

    match system {
        Some(payload) if !payload.samples.is_empty() => {
            let series = [
                ("cpu", payload.samples.iter().map(|s| s.cpu_percent).collect::<Vec<_>>()),
                ("ram", payload.samples.iter().map(|s| s.ram_percent).collect()),
                ("load", payload.samples.iter().map(|s| s.load_avg).collect()),
            ];
            for (label, values) in series {
                lines.push(format!("{label:<5} {}", sparkline(&values, chart_width)));
            }
        }
        _ => lines.push("(no data)".to_string()),
    }

    match billing.and_then(|payload| payload.history.as_ref()) {
        Some(history) if !history.total.is_empty() => {
            let spend: Vec<f64> = history.total.iter().map(|point| point.usd).collect();
            lines.push(format!("{:<5} {}", "spend", sparkline(&spend, chart_width)));
        }
        _ => lines.push(format!("{:<5} (no data)", "spend")),
    }
    Section::new(title, lines)
}
