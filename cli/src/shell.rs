//! Shell-integration scripts emitted by `--shell`. Each script pins a
//! session identifier for the lifetime of the shell (so the session keeps
//! one decorative image) and paints the banner on interactive startup.

use ppulse_common::ShellCliArg;

const BASH: &str = r#"# ppulse shell integration (bash)
# Add to ~/.bashrc:  eval "$(ppulse --shell bash)"
if [ -z "${PPULSE_SESSION_ID:-}" ]; then
    export PPULSE_SESSION_ID="sh-$$"
fi
if [[ $- == *i* ]]; then
    ppulse --banner
fi
"#;

const ZSH: &str = r#"# ppulse shell integration (zsh)
# Add to ~/.zshrc:  eval "$(ppulse --shell zsh)"
if [[ -z "${PPULSE_SESSION_ID:-}" ]]; then
    export PPULSE_SESSION_ID="sh-$$"
fi
if [[ -o interactive ]]; then
    ppulse --banner
fi
"#;

const FISH: &str = r#"# ppulse shell integration (fish)
# Add to ~/.config/fish/config.fish:  ppulse --shell fish | source
if not set -q PPULSE_SESSION_ID
    set -gx PPULSE_SESSION_ID "sh-$fish_pid"
end
if status is-interactive
    ppulse --banner
end
"#;

const NUSHELL: &str = r#"# ppulse shell integration (nushell)
# Add to config.nu:  ppulse --shell nushell | save -f ~/.ppulse.nu; source ~/.ppulse.nu
if ($env.PPULSE_SESSION_ID? | is-empty) {
    $env.PPULSE_SESSION_ID = $"sh-(random uuid)"
}
ppulse --banner
"#;

pub fn script_for(shell: ShellCliArg) -> &'static str {
    match shell {
        ShellCliArg::Bash => BASH,
        ShellCliArg::Zsh => ZSH,
        ShellCliArg::Fish => FISH,
        ShellCliArg::Nushell => NUSHELL,
    }
}
