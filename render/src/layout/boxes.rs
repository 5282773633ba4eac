//! Rounded box drawing around a block of already formatted lines. The box
//! is `width` columns outside; content is truncated and padded to fit.

use ppulse_ansi::pad_visible;
use ppulse_ansi::truncate_visible;
use ppulse_ansi::visible_width;

pub fn boxed(title: &str, lines: &[String], width: usize) -> Vec<String> {
    // Too narrow for a frame; hand the lines back truncated instead.
    if width < 6 {
        return lines
            .iter()
            .map(|line| truncate_visible(line, width))
            .collect();
    }
    let inner = width - 4;
    let mut out = Vec::with_capacity(lines.len() + 2);

    // Title inlined into the top border with single-cell padding.
    let title = truncate_visible(title, width.saturating_sub(6));
    let title_width = visible_width(&title);
    let mut top = String::from("╭─");
    if title_width > 0 {
        top.push(' ');
        top.push_str(&title);
        top.push(' ');
    }
    let used = 2 + if title_width > 0 { title_width + 2 } else { 0 };
    for _ in used..width - 1 {
        top.push('─');
    }
    top.push('╮');
    out.push(top);

    for line in lines {
        let cell = pad_visible(&truncate_visible(line, inner), inner);
        out.push(format!("│ {cell} │"));
    }

    let mut bottom = String::from("╰");
    for _ in 0..width - 2 {
        bottom.push('─');
    }
    bottom.push('╯');
    out.push(bottom);
    out
}
