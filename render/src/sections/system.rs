use crate::layout::Section;
use crate::sections::SectionCtx;
use crate::sections::titled;
use ppulse_core::snapshot::SystemPayload;

const BAR_WIDTH: usize = 10;

pub fn system_section(payload: Option<&SystemPayload>, stale: bool, ctx: &SectionCtx) -> Section {
    let title = titled(ctx, "System", stale);
    let Some(latest) = payload.and_then(SystemPayload::latest) else {
        return Section::no_data(title);
    };

    if !ctx.features.show_full_metrics {
        return Section::new(
            title,
            vec![format!(
                "cpu {} · ram {} · disk {} · load {:.2}",
                ctx.palette.percent(latest.cpu_percent),
                ctx.palette.percent(latest.ram_percent),
                ctx.palette.percent(latest.disk_percent),
                latest.load_avg
            )],
        );
    }

    let lines = vec![
        format!(
            "cpu  {} {}",
            ctx.palette.bar(latest.cpu_percent, BAR_WIDTH),
            ctx.palette.percent(latest.cpu_percent)
        ),
        format!(
            "ram  {} {}",
            ctx.palette.bar(latest.ram_percent, BAR_WIDTH),
            ctx.palette.percent(latest.ram_percent)
        ),
        format!(
            "disk {} {}",
            ctx.palette.bar(latest.disk_percent, BAR_WIDTH),
            ctx.palette.percent(latest.disk_percent)
        ),
        format!("load {:.2}", latest.load_avg),
    ];
    Section::new(title, lines)
}
