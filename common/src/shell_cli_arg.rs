//! Standard type to use with the `--shell` CLI option.
//! Available when the `cli` feature is enabled for the crate.

use clap::ValueEnum;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum ShellCliArg {
    Bash,
    Zsh,
    Fish,
    Nushell,
}
