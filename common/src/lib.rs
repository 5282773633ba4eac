#[cfg(feature = "elapsed")]
pub mod elapsed;

#[cfg(feature = "cli")]
mod shell_cli_arg;

#[cfg(feature = "cli")]
pub use shell_cli_arg::ShellCliArg;

#[cfg(feature = "cli")]
mod starship_cli_arg;

#[cfg(feature = "cli")]
pub use starship_cli_arg::StarshipModuleCliArg;

#[cfg(feature = "cli")]
mod theme_cli_arg;

#[cfg(feature = "cli")]
pub use theme_cli_arg::ThemeCliArg;
