//! Standard type to use with the `--starship` CLI option.
//! Available when the `cli` feature is enabled for the crate.

use clap::ValueEnum;

/// Which one-line prompt module to emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum StarshipModuleCliArg {
    /// LLM subscription/API quota summary.
    Claude,

    /// Cloud billing month-to-date summary.
    Billing,

    /// Mesh-VPN and cluster fleet summary.
    Infra,
}
