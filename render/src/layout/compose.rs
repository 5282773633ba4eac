//! Section composition: vertical for compact mode, line-wise interleaved
//! panels for the multi-column modes. All width math goes through the
//! ANSI-aware primitives; styled cells never distort alignment.

use crate::layout::boxes::boxed;
use crate::layout::columns::ColumnPlan;
use crate::layout::columns::SEPARATOR;
use ppulse_ansi::pad_visible;
use ppulse_ansi::truncate_visible;

/// One titled block of formatted lines, the unit every formatter emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub lines: Vec<String>,
}

impl Section {
    pub fn new(title: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            title: title.into(),
            lines,
        }
    }

    /// Placeholder for a section whose snapshot is missing or unreadable.
    pub fn no_data(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            lines: vec!["(no data)".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composed {
    pub lines: Vec<String>,
    /// Content exceeded the viewport; never an error.
    pub truncated: bool,
}

/// Compact mode: titles and indented lines stacked vertically, blank line
/// between sections, truncated to the terminal height.
pub fn compose_compact(sections: &[Section], width: usize, height: usize) -> Composed {
    let mut lines = Vec::new();
    for (index, section) in sections.iter().enumerate() {
        if index > 0 {
            lines.push(String::new());
        }
        lines.push(truncate_visible(&section.title, width));
        for line in &section.lines {
            lines.push(truncate_visible(&format!("  {line}"), width));
        }
    }
    clamp_height(lines, height)
}

/// Flatten a panel's sections into one column of lines, optionally boxed.
fn panel_lines(sections: &[Section], width: usize, borders: bool) -> Vec<String> {
    let mut lines = Vec::new();
    for (index, section) in sections.iter().enumerate() {
        if index > 0 {
            lines.push(String::new());
        }
        if borders {
            lines.extend(boxed(&section.title, &section.lines, width));
        } else {
            lines.push(truncate_visible(&section.title, width));
            for line in &section.lines {
                lines.push(truncate_visible(line, width));
            }
        }
    }
    lines
}

/// Multi-column modes: interleave the image column (when planned), the
/// main panel, the info panel, and the sparkline panel line-wise. Shorter
/// panels pad out with empty cells; the row count is the tallest panel,
/// capped at the terminal height.
pub fn compose_columns(
    plan: &ColumnPlan,
    image: Option<&[String]>,
    main: &[Section],
    info: &[Section],
    sparkline: &[Section],
    height: usize,
    borders: bool,
) -> Composed {
    let mut panels: Vec<(usize, Vec<String>)> = Vec::with_capacity(4);
    if let Some(image_width) = plan.image {
        let lines = image.map(<[String]>::to_vec).unwrap_or_default();
        panels.push((image_width, lines));
    }
    panels.push((plan.main, panel_lines(main, plan.main, borders)));
    if let Some(info_width) = plan.info {
        panels.push((info_width, panel_lines(info, info_width, borders)));
    }
    if let Some(spark_width) = plan.sparkline {
        panels.push((spark_width, panel_lines(sparkline, spark_width, borders)));
    }

    let rows = panels.iter().map(|(_, lines)| lines.len()).max().unwrap_or(0);
    let mut lines = Vec::with_capacity(rows);
    for row in 0..rows {
        let mut cells = Vec::with_capacity(panels.len());
        for (width, panel) in &panels {
            let cell = panel.get(row).map_or("", String::as_str);
            cells.push(pad_visible(&truncate_visible(cell, *width), *width));
        }
        lines.push(cells.join(SEPARATOR));
    }
    clamp_height(lines, height)
}

fn clamp_height(mut lines: Vec<String>, height: usize) -> Composed {
    let truncated = lines.len() > height;
    lines.truncate(height);
    Composed { lines, truncated }
}
