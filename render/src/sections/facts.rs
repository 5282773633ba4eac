use crate::layout::Section;
use crate::sections::SectionCtx;
use crate::sections::titled;
use ppulse_core::snapshot::HostFactsPayload;

pub fn facts_section(payload: Option<&HostFactsPayload>, stale: bool, ctx: &SectionCtx) -> Section {
    let title = titled(ctx, "Host", stale);
    let Some(payload) = payload else {
        return Section::no_data(title);
    };
    if payload.facts.is_empty() {
        return Section::no_data(title);
    }
    let lines = payload
        .facts
        .iter()
        .map(|fact| format!("{}: {}", ctx.palette.accent(&fact.label), fact.value))
        .collect();
    Section::new(title, lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutMode;
    use crate::sections::test_support::ctx;
    use ppulse_core::snapshot::HostFact;
    use pretty_assertions::assert_eq;

    #[test]
    fn facts_render_label_value_pairs() {
        let payload = HostFactsPayload {
            facts: vec![
                HostFact {
                    label: "OS".to_string(),
                    value: "NixOS 25.05".to_string(),
                },
                HostFact {
                    label: "Kernel".to_string(),
                    value: "6.12.8".to_string(),
                },
            ],
        };
        let section = facts_section(Some(&payload), false, &ctx(LayoutMode::Compact));
        assert_eq!(section.lines, vec!["OS: NixOS 25.05", "Kernel: 6.12.8"]);
    }

    #[test]
    fn empty_facts_are_no_data() {
        let section = facts_section(
            Some(&HostFactsPayload::default()),
            false,
            &ctx(LayoutMode::Compact),
        );
        assert_eq!(section.lines, vec!["(no data)"]);
    }
}
