//! Layout mode thresholds and the progressive-density feature flags each
//! mode (and theme) unlocks.

use ppulse_core::config_types::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LayoutMode {
    Compact,
    Standard,
    Wide,
    UltraWide,
}

impl LayoutMode {
    pub fn columns(self) -> usize {
        match self {
            LayoutMode::Compact => 1,
            LayoutMode::Standard => 2,
            LayoutMode::Wide => 3,
            LayoutMode::UltraWide => 4,
        }
    }
}

/// Pure function of terminal geometry, largest mode first. Terminals
/// smaller than compact still use compact.
pub fn detect_mode(width: u16, height: u16) -> LayoutMode {
    if width >= 200 && height >= 80 {
        LayoutMode::UltraWide
    } else if width >= 160 && height >= 60 {
        LayoutMode::Wide
    } else if width >= 120 && height >= 40 {
        LayoutMode::Standard
    } else {
        LayoutMode::Compact
    }
}

/// What the section formatters are allowed to show. Modes set the
/// baseline; themes subtract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutFeatures {
    pub show_full_metrics: bool,
    pub show_node_metrics: bool,
    pub show_sparklines: bool,
    pub show_extra_usage: bool,
    pub show_borders: bool,
    pub show_image: bool,
}

impl LayoutFeatures {
    pub fn for_mode(mode: LayoutMode, theme: Theme) -> Self {
        let mut features = match mode {
            LayoutMode::UltraWide => Self {
                show_full_metrics: true,
                show_node_metrics: true,
                show_sparklines: true,
                show_extra_usage: true,
                show_borders: true,
                show_image: true,
            },
            LayoutMode::Wide => Self {
                show_full_metrics: true,
                show_node_metrics: true,
                show_sparklines: false,
                show_extra_usage: true,
                show_borders: true,
                show_image: true,
            },
            LayoutMode::Standard => Self {
                show_full_metrics: false,
                show_node_metrics: false,
                show_sparklines: false,
                show_extra_usage: false,
                show_borders: true,
                show_image: true,
            },
            LayoutMode::Compact => Self {
                show_full_metrics: false,
                show_node_metrics: false,
                show_sparklines: false,
                show_extra_usage: false,
                show_borders: false,
                show_image: false,
            },
        };
        match theme {
            Theme::Full => {}
            Theme::Minimal => {
                features.show_image = false;
                features.show_borders = false;
                features.show_sparklines = false;
            }
            Theme::Monitoring => {
                features.show_image = false;
                features.show_full_metrics = true;
                features.show_node_metrics = true;
            }
        }
        features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn thresholds_match_table() {
        assert_eq!(detect_mode(200, 80), LayoutMode::UltraWide);
        assert_eq!(detect_mode(240, 100), LayoutMode::UltraWide);
        assert_eq!(detect_mode(160, 60), LayoutMode::Wide);
        assert_eq!(detect_mode(199, 80), LayoutMode::Wide);
        assert_eq!(detect_mode(200, 79), LayoutMode::Wide);
        assert_eq!(detect_mode(120, 40), LayoutMode::Standard);
        assert_eq!(detect_mode(159, 60), LayoutMode::Standard);
        assert_eq!(detect_mode(80, 24), LayoutMode::Compact);
        assert_eq!(detect_mode(119, 40), LayoutMode::Compact);
    }

    #[test]
    fn tiny_terminals_still_get_compact() {
        assert_eq!(detect_mode(40, 10), LayoutMode::Compact);
        assert_eq!(detect_mode(0, 0), LayoutMode::Compact);
    }

    #[test]
    fn minimal_theme_strips_decoration() {
        let features = LayoutFeatures::for_mode(LayoutMode::UltraWide, Theme::Minimal);
        assert!(!features.show_image);
        assert!(!features.show_borders);
        // Density features stay mode-driven.
        assert!(features.show_full_metrics);
    }

    #[test]
    fn monitoring_theme_trades_image_for_metrics() {
        let features = LayoutFeatures::for_mode(LayoutMode::Standard, Theme::Monitoring);
        assert!(!features.show_image);
        assert!(features.show_full_metrics);
        assert!(features.show_node_metrics);
    }

    #[test]
    fn compact_has_no_decoration() {
        let features = LayoutFeatures::for_mode(LayoutMode::Compact, Theme::Full);
        assert_eq!(
            features,
            LayoutFeatures {
                show_full_metrics: false,
                show_node_metrics: false,
                show_sparklines: false,
                show_extra_usage: false,
                show_borders: false,
                show_image: false,
            }
        );
    }
}
