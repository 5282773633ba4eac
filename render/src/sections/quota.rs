use crate::layout::Section;
use crate::sections::SectionCtx;
use crate::sections::titled;
use ppulse_common::elapsed::format_until;
use ppulse_core::snapshot::AccountKind;
use ppulse_core::snapshot::AccountStatus;
use ppulse_core::snapshot::QuotaAccount;
use ppulse_core::snapshot::QuotaPayload;

const BAR_WIDTH: usize = 10;

pub fn quota_section(payload: Option<&QuotaPayload>, stale: bool, ctx: &SectionCtx) -> Section {
    let title = titled(ctx, "Claude", stale);
    let Some(payload) = payload else {
        return Section::no_data(title);
    };
    if payload.accounts.is_empty() {
        return Section::no_data(title);
    }
    let mut lines = Vec::new();
    for account in &payload.accounts {
        if ctx.features.show_full_metrics {
            full_account(account, ctx, &mut lines);
        } else {
            lines.push(summary_line(account, ctx));
        }
    }
    Section::new(title, lines)
}

/// One-line form, e.g. `personal: 45% (5h) · 12% (7d)`.
fn summary_line(account: &QuotaAccount, ctx: &SectionCtx) -> String {
    if let Some(problem) = status_note(account.status) {
        return format!("{}: {}", account.label, ctx.palette.severity(problem.1, problem.0));
    }
    let mut parts = Vec::new();
    if let Some(window) = &account.five_hour {
        parts.push(format!("{} (5h)", ctx.palette.percent(window.used_percent)));
    }
    if let Some(window) = &account.seven_day {
        parts.push(format!("{} (7d)", ctx.palette.percent(window.used_percent)));
    }
    if parts.is_empty() {
        parts.push("no usage data".to_string());
    }
    format!("{}: {}", account.label, parts.join(" · "))
}

fn full_account(account: &QuotaAccount, ctx: &SectionCtx, lines: &mut Vec<String>) {
    let kind = match account.kind {
        AccountKind::Subscription => "sub",
        AccountKind::Api => "api",
    };
    let mut header = format!("{} ({kind})", account.label);
    if let Some((note, severity)) = status_note(account.status) {
        header.push_str("  ");
        header.push_str(&ctx.palette.severity(severity, note));
    }
    lines.push(header);
    if let Some(window) = &account.five_hour {
        let mut line = format!(
            "  5h {} {}",
            ctx.palette.bar(window.used_percent, BAR_WIDTH),
            ctx.palette.percent(window.used_percent)
        );
        if let Some(resets) = window.resets_at {
            line.push_str(&ctx.palette.dim(&format!("  resets {}", format_until(resets, ctx.now))));
        }
        lines.push(line);
    }
    if let Some(window) = &account.seven_day {
        let mut line = format!(
            "  7d {} {}",
            ctx.palette.bar(window.used_percent, BAR_WIDTH),
            ctx.palette.percent(window.used_percent)
        );
        if let Some(resets) = window.resets_at {
            line.push_str(&ctx.palette.dim(&format!("  resets {}", format_until(resets, ctx.now))));
        }
        lines.push(line);
    }
    if let Some(rate) = &account.rate_limit {
        lines.push(format!(
            "  rpm {}/{}  tpm {}/{}",
            rate.requests_remaining, rate.requests_limit, rate.tokens_remaining, rate.tokens_limit
        ));
    }
    if ctx.features.show_extra_usage
        && let Some(extra) = &account.extra_usage
    {
        lines.push(format!(
            "  extra ${:.2} of ${:.0} cap",
            extra.used_usd, extra.cap_usd
        ));
    }
}

fn status_note(status: AccountStatus) -> Option<(&'static str, ppulse_core::status::Severity)> {
    use ppulse_core::status::Severity;
    match status {
        AccountStatus::Ok => None,
        AccountStatus::AuthFailed => Some(("auth failed", Severity::Critical)),
        AccountStatus::RateLimited => Some(("rate limited", Severity::Warning)),
        AccountStatus::Error => Some(("error", Severity::Warning)),
    }
}
