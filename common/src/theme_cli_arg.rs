//! Standard type to use with the `--theme` CLI option.
//! Available when the `cli` feature is enabled for the crate.

use clap::ValueEnum;

use ppulse_core::config_types::Theme;

#[derive(Clone, Copy, Debug, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum ThemeCliArg {
    /// Status line and section summaries only, no decoration.
    Minimal,

    /// Everything the current terminal size allows, including imagery.
    Full,

    /// Metrics-forward preset: full metrics and sparklines, no imagery.
    Monitoring,
}

impl From<ThemeCliArg> for Theme {
    fn from(value: ThemeCliArg) -> Self {
        match value {
            ThemeCliArg::Minimal => Theme::Minimal,
            ThemeCliArg::Full => Theme::Full,
            ThemeCliArg::Monitoring => Theme::Monitoring,
        }
    }
}
