//! One-line micro-charts from block characters.

const BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Render `values` as a sparkline at most `width` characters wide, scaled
/// to the observed range. A flat series renders as the lowest block; an
/// empty series renders empty.
pub fn sparkline(values: &[f64], width: usize) -> String {
    if values.is_empty() || width == 0 {
        return String::new();
    }
    // Keep the trailing window when the series is longer than the width.
    let window = &values[values.len().saturating_sub(width)..];
    let min = window.iter().copied().fold(f64::INFINITY, f64::min);
    let max = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    window
        .iter()
        .map(|value| {
            if span <= f64::EPSILON {
                BLOCKS[0]
            } else {
                let normalized = (value - min) / span;
                let index = (normalized * (BLOCKS.len() - 1) as f64).round() as usize;
                BLOCKS[index.min(BLOCKS.len() - 1)]
            }
        })
        .collect()
}
