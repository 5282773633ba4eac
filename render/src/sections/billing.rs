use crate::layout::Section;
use crate::sections::SectionCtx;
use crate::sections::titled;
use crate::sections::usd;
use ppulse_ansi::hyperlink;
use ppulse_core::snapshot::BillingPayload;
use ppulse_core::snapshot::ProviderStatus;
use ppulse_core::status::Severity;

pub fn billing_section(payload: Option<&BillingPayload>, stale: bool, ctx: &SectionCtx) -> Section {
    let title = titled(ctx, "Billing", stale);
    let Some(payload) = payload else {
        return Section::no_data(title);
    };

    let mut lines = Vec::new();
    let mut total_line = format!("{} this month", usd(payload.total.current_usd));
    if let Some(forecast) = payload.total.forecast_usd {
        total_line.push_str(&ctx.palette.dim(&format!(" → {} forecast", usd(forecast))));
    }
    lines.push(total_line);

    if let Some(budget) = payload.total.budget_usd
        && budget > 0.0
    {
        let fraction = payload.total.current_usd / budget * 100.0;
        let severity = if payload.total.current_usd > budget {
            Severity::Critical
        } else if fraction >= 90.0 {
            Severity::Warning
        } else {
            Severity::Healthy
        };
        lines.push(format!(
            "budget {} {}",
            usd(budget),
            ctx.palette
                .severity(severity, &format!("({fraction:.0}% used)"))
        ));
    }

    if ctx.features.show_full_metrics {
        for provider in &payload.providers {
            let label = match &provider.dashboard_url {
                Some(url) if ctx.palette.enabled() => hyperlink(url, &provider.label),
                _ => provider.label.clone(),
            };
            let mut line = format!("{label} {}", usd(provider.current_month_usd));
            match provider.status {
                ProviderStatus::Ok => {
                    if let Some(previous) = provider.previous_month_usd {
                        line.push_str(&ctx.palette.dim(&format!(" (prev {})", usd(previous))));
                    }
                }
                ProviderStatus::AuthFailed => {
                    line.push_str("  ");
                    line.push_str(&ctx.palette.severity(Severity::Critical, "auth failed"));
                }
                ProviderStatus::Error => {
                    line.push_str("  ");
                    line.push_str(&ctx.palette.severity(Severity::Warning, "error"));
                }
            }
            lines.push(line);
        }
    }
    Section::new(title, lines)
}
