//! Banner styling. A thin wrapper over owo-colors that can be switched off
//! wholesale, honoring `NO_COLOR` and non-tty stdout.

use owo_colors::OwoColorize;
use ppulse_core::status::Severity;

#[derive(Debug, Clone, Copy)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Color from environment: `NO_COLOR` wins, then stdout tty detection.
    pub fn from_env() -> Self {
        if std::env::var_os("NO_COLOR").is_some() {
            return Self::new(false);
        }
        Self::new(supports_color::on(supports_color::Stream::Stdout).is_some())
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn severity(&self, severity: Severity, text: &str) -> String {
        if !self.enabled {
            return text.to_string();
        }
        match severity {
            Severity::Unknown => text.dimmed().to_string(),
            Severity::Healthy => text.green().to_string(),
            Severity::Warning => text.yellow().to_string(),
            Severity::Critical => text.red().bold().to_string(),
        }
    }

    pub fn title(&self, text: &str) -> String {
        if self.enabled {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn dim(&self, text: &str) -> String {
        if self.enabled {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn accent(&self, text: &str) -> String {
        if self.enabled {
            text.cyan().to_string()
        } else {
            text.to_string()
        }
    }

    /// Percent colored by how close it is to the quota thresholds.
    pub fn percent(&self, value: f64) -> String {
        let text = format!("{value:.0}%");
        if !self.enabled {
            return text;
        }
        if value >= ppulse_core::status::QUOTA_CRITICAL_PERCENT {
            text.red().bold().to_string()
        } else if value >= ppulse_core::status::QUOTA_WARNING_PERCENT {
            text.yellow().to_string()
        } else {
            text.green().to_string()
        }
    }

    /// Fixed-width utilization bar, e.g. `[████░░░░░░]`.
    pub fn bar(&self, percent: f64, width: usize) -> String {
        let clamped = percent.clamp(0.0, 100.0);
        let filled = ((clamped / 100.0) * width as f64).round() as usize;
        let filled = filled.min(width);
        let mut bar = String::with_capacity(width + 2);
        bar.push('[');
        for _ in 0..filled {
            bar.push('█');
        }
        for _ in filled..width {
            bar.push('░');
        }
        bar.push(']');
        if !self.enabled {
            return bar;
        }
        if clamped >= ppulse_core::status::QUOTA_CRITICAL_PERCENT {
            bar.red().to_string()
        } else if clamped >= ppulse_core::status::QUOTA_WARNING_PERCENT {
            bar.yellow().to_string()
        } else {
            bar.green().to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ppulse_ansi::strip_ansi;
    use ppulse_ansi::visible_width;
    use pretty_assertions::assert_eq;

    #[test]
    fn disabled_palette_is_plain_text() {
        let palette = Palette::new(false);
        assert_eq!(palette.severity(Severity::Critical, "down"), "down");
        assert_eq!(palette.percent(97.0), "97%");
        assert_eq!(palette.bar(50.0, 4), "[██░░]");
    }

    #[test]
    fn enabled_palette_keeps_visible_text() {
        let palette = Palette::new(true);
        let painted = palette.severity(Severity::Warning, "hot");
        assert_eq!(strip_ansi(&painted), "hot");
        assert_eq!(visible_width(&painted), 3);
    }

    #[test]
    fn bar_width_is_stable() {
        let palette = Palette::new(true);
        for percent in [0.0, 33.0, 80.0, 100.0, 140.0] {
            assert_eq!(visible_width(&palette.bar(percent, 10)), 12);
        }
    }

    #[test]
    fn bar_is_full_at_or_past_100() {
        let palette = Palette::new(false);
        assert_eq!(palette.bar(100.0, 5), "[█████]");
        assert_eq!(palette.bar(250.0, 5), "[█████]");
        assert_eq!(palette.bar(0.0, 5), "[░░░░░]");
    }
}
