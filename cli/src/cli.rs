use clap::ArgGroup;
use clap::Parser;
use ppulse_common::ShellCliArg;
use ppulse_common::StarshipModuleCliArg;
use ppulse_common::ThemeCliArg;
use ppulse_core::config::ConfigOverrides;
use std::path::PathBuf;

/// Workstation status aggregator: one daemon polls your LLM quotas, cloud
/// billing, and fleet health; the banner, TUI, and starship modules render
/// whatever it cached last.
#[derive(Debug, Parser)]
#[command(version, bin_name = "ppulse")]
#[command(group(
    ArgGroup::new("mode")
        .args(["daemon", "banner", "tui", "starship", "shell", "diagnose"])
))]
pub struct Cli {
    /// Run the collector scheduler until a signal arrives.
    #[arg(long)]
    pub daemon: bool,

    /// Render one banner to stdout and exit. This is the default mode.
    #[arg(long)]
    pub banner: bool,

    /// Launch the interactive display; quit with `q`.
    #[arg(long)]
    pub tui: bool,

    /// Emit one prompt-module line and exit 0 (empty when no cache).
    #[arg(long, value_enum, value_name = "MODULE")]
    pub starship: Option<StarshipModuleCliArg>,

    /// Print the shell-integration script for the given shell.
    #[arg(long, value_enum, value_name = "SHELL")]
    pub shell: Option<ShellCliArg>,

    /// Print environment detection and cache freshness, then exit.
    #[arg(long)]
    pub diagnose: bool,

    /// Config file location (default: ~/.config/ppulse/config.toml).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the shell session identifier used for image assignment.
    #[arg(long = "session-id", value_name = "ID")]
    pub session_id: Option<String>,

    /// Override detected terminal width.
    #[arg(long = "term-width", value_name = "N")]
    pub term_width: Option<u16>,

    /// Override detected terminal height.
    #[arg(long = "term-height", value_name = "N")]
    pub term_height: Option<u16>,

    /// Enable (or with `--waifu=false` disable) the decorative image.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL")]
    pub waifu: Option<bool>,

    /// Enable or disable the host-facts section.
    #[arg(
        long = "fastfetch-enabled",
        num_args = 0..=1,
        default_missing_value = "true",
        value_name = "BOOL"
    )]
    pub fastfetch_enabled: Option<bool>,

    /// Display preset.
    #[arg(long, value_enum)]
    pub theme: Option<ThemeCliArg>,

    /// Replace real collectors with deterministic mocks.
    #[arg(long = "use-mocks")]
    pub use_mocks: bool,

    /// Number of mock accounts (1-5).
    #[arg(long = "mock-accounts", value_name = "N")]
    pub mock_accounts: Option<usize>,

    /// Seed for the mock data generator.
    #[arg(long = "mock-seed", value_name = "N")]
    pub mock_seed: Option<u64>,

    /// Log to stderr in the one-shot modes.
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl Cli {
    pub fn config_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_path: self.config.clone(),
            cache_dir: None,
            theme: self.theme.map(Into::into),
            session_id: self.session_id.clone(),
            waifu_enabled: self.waifu,
            fastfetch_enabled: self.fastfetch_enabled,
            use_mocks: self.use_mocks.then_some(true),
            mock_accounts: self.mock_accounts,
            mock_seed: self.mock_seed,
            term_width: self.term_width,
            term_height: self.term_height,
        }
    }
}
