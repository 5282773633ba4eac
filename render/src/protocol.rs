//! Terminal image-protocol negotiation from environment markers.
//!
//! Detection never talks to the terminal; everything is inferred from the
//! environment the shell already exports. Over SSH or inside a multiplexer
//! the binary escape protocols traverse the transport unreliably and would
//! paint garbage, so they are downgraded to text-based rendering.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageProtocol {
    /// Kitty graphics protocol (kitty, ghostty, wezterm).
    Kitty,
    /// iTerm2 inline images (OSC 1337).
    Iterm2,
    /// DEC sixel, rendered through chafa.
    Sixel,
    /// `chafa` subprocess producing character art.
    Chafa,
    /// In-process `▀` half-block rendering, works everywhere with 24-bit
    /// color.
    Halfblock,
    /// No image output at all.
    None,
}

impl ImageProtocol {
    /// Binary escape protocols that do not survive transport hops.
    fn needs_clean_transport(self) -> bool {
        matches!(
            self,
            ImageProtocol::Kitty | ImageProtocol::Iterm2 | ImageProtocol::Sixel
        )
    }
}

impl fmt::Display for ImageProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImageProtocol::Kitty => "kitty",
            ImageProtocol::Iterm2 => "iterm2",
            ImageProtocol::Sixel => "sixel",
            ImageProtocol::Chafa => "chafa",
            ImageProtocol::Halfblock => "halfblock",
            ImageProtocol::None => "none",
        };
        f.write_str(name)
    }
}

/// Environment access used by detection, injectable for tests.
pub trait EnvLookup {
    fn var(&self, name: &str) -> Option<String>;
}

/// Real process environment.
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|value| !value.is_empty())
    }
}

/// Fixed environment, mainly for tests and `--diagnose` what-if output.
impl EnvLookup for std::collections::HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned().filter(|value| !value.is_empty())
    }
}

/// Protocol the terminal itself is capable of, ignoring transport.
pub fn detect_protocol(env: &impl EnvLookup, chafa_available: bool) -> ImageProtocol {
    if let Some(term_program) = env.var("TERM_PROGRAM") {
        let lowered = term_program.to_lowercase();
        if lowered.contains("ghostty") || lowered.contains("kitty") || lowered.contains("wezterm") {
            return ImageProtocol::Kitty;
        }
        if lowered.contains("iterm") {
            return ImageProtocol::Iterm2;
        }
    }
    let term = env.var("TERM").unwrap_or_default();
    if term == "xterm-kitty" {
        return ImageProtocol::Kitty;
    }
    if env.var("KITTY_WINDOW_ID").is_some() || env.var("WEZTERM_EXECUTABLE").is_some() {
        return ImageProtocol::Kitty;
    }
    if env.var("ITERM_SESSION_ID").is_some()
        || env.var("LC_TERMINAL").is_some_and(|t| t.contains("iTerm"))
    {
        return ImageProtocol::Iterm2;
    }
    if env.var("MLTERM").is_some() || term.contains("mlterm") || term.contains("foot") {
        return ImageProtocol::Sixel;
    }
    if chafa_available {
        ImageProtocol::Chafa
    } else {
        ImageProtocol::Halfblock
    }
}

/// Like [`detect_protocol`], then degrade for hostile transports: over SSH
/// or inside tmux/screen the binary protocols fall back to chafa when
/// available, half-blocks otherwise.
pub fn detect_protocol_with_context(env: &impl EnvLookup, chafa_available: bool) -> ImageProtocol {
    let protocol = detect_protocol(env, chafa_available);
    if protocol.needs_clean_transport() && (is_ssh(env) || in_multiplexer(env)) {
        if chafa_available {
            return ImageProtocol::Chafa;
        }
        return ImageProtocol::Halfblock;
    }
    protocol
}

pub fn is_ssh(env: &impl EnvLookup) -> bool {
    env.var("SSH_CLIENT").is_some()
        || env.var("SSH_TTY").is_some()
        || env.var("SSH_CONNECTION").is_some()
}

pub fn in_multiplexer(env: &impl EnvLookup) -> bool {
    if env.var("TMUX").is_some() {
        return true;
    }
    env.var("TERM")
        .is_some_and(|term| term.starts_with("screen") || term.starts_with("tmux"))
}

/// Whether the `chafa` binary is reachable on PATH.
pub fn chafa_on_path() -> bool {
    which::which("chafa").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn term_program_wins() {
        assert_eq!(
            detect_protocol(&env(&[("TERM_PROGRAM", "ghostty")]), true),
            ImageProtocol::Kitty
        );
        assert_eq!(
            detect_protocol(&env(&[("TERM_PROGRAM", "WezTerm")]), true),
            ImageProtocol::Kitty
        );
        assert_eq!(
            detect_protocol(&env(&[("TERM_PROGRAM", "iTerm.app")]), true),
            ImageProtocol::Iterm2
        );
    }

    #[test]
    fn kitty_markers() {
        assert_eq!(
            detect_protocol(&env(&[("TERM", "xterm-kitty")]), false),
            ImageProtocol::Kitty
        );
        assert_eq!(
            detect_protocol(&env(&[("KITTY_WINDOW_ID", "1")]), false),
            ImageProtocol::Kitty
        );
        assert_eq!(
            detect_protocol(&env(&[("WEZTERM_EXECUTABLE", "/usr/bin/wezterm")]), false),
            ImageProtocol::Kitty
        );
    }

    #[test]
    fn iterm_markers() {
        assert_eq!(
            detect_protocol(&env(&[("ITERM_SESSION_ID", "w0t0p0")]), true),
            ImageProtocol::Iterm2
        );
        assert_eq!(
            detect_protocol(&env(&[("LC_TERMINAL", "iTerm2")]), true),
            ImageProtocol::Iterm2
        );
    }

    #[test]
    fn sixel_markers() {
        assert_eq!(
            detect_protocol(&env(&[("MLTERM", "3.9.0")]), true),
            ImageProtocol::Sixel
        );
        assert_eq!(
            detect_protocol(&env(&[("TERM", "foot")]), true),
            ImageProtocol::Sixel
        );
    }

    #[test]
    fn fallback_depends_on_chafa() {
        assert_eq!(
            detect_protocol(&env(&[("TERM", "xterm-256color")]), true),
            ImageProtocol::Chafa
        );
        assert_eq!(
            detect_protocol(&env(&[("TERM", "xterm-256color")]), false),
            ImageProtocol::Halfblock
        );
    }

    #[test]
    fn ssh_never_yields_binary_protocols() {
        let cases = [
            vec![("SSH_CLIENT", "192.168.1.1 50022 22"), ("TERM_PROGRAM", "ghostty")],
            vec![("SSH_TTY", "/dev/pts/3"), ("TERM", "xterm-kitty")],
            vec![("SSH_CONNECTION", "..."), ("MLTERM", "1")],
            vec![("SSH_CLIENT", "..."), ("ITERM_SESSION_ID", "w0t0p0")],
        ];
        for pairs in &cases {
            for chafa in [true, false] {
                let detected = detect_protocol_with_context(&env(pairs), chafa);
                assert!(
                    !matches!(
                        detected,
                        ImageProtocol::Kitty | ImageProtocol::Iterm2 | ImageProtocol::Sixel
                    ),
                    "{pairs:?} with chafa={chafa} yielded {detected}"
                );
            }
        }
    }

    #[test]
    fn multiplexer_downgrades_to_chafa_first() {
        let inside_tmux = env(&[("TMUX", "/tmp/tmux-1000/default,123,0"), ("TERM_PROGRAM", "kitty")]);
        assert_eq!(
            detect_protocol_with_context(&inside_tmux, true),
            ImageProtocol::Chafa
        );
        assert_eq!(
            detect_protocol_with_context(&inside_tmux, false),
            ImageProtocol::Halfblock
        );
    }

    #[test]
    fn clean_local_terminal_keeps_kitty() {
        assert_eq!(
            detect_protocol_with_context(&env(&[("TERM_PROGRAM", "ghostty")]), true),
            ImageProtocol::Kitty
        );
    }

    #[test]
    fn chafa_is_never_downgraded() {
        let over_ssh = env(&[("SSH_CLIENT", "..."), ("TERM", "xterm-256color")]);
        assert_eq!(
            detect_protocol_with_context(&over_ssh, true),
            ImageProtocol::Chafa
        );
    }
}
