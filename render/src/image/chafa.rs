//! Character-art rendering through the external `chafa` binary. Used both
//! as a protocol in its own right and as the sixel encoder for
//! sixel-capable terminals.

use crate::error::RenderError;
use std::io::Write;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

const CHAFA_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChafaFormat {
    /// Let chafa pick the best format for the detected terminal.
    Auto,
    /// Plain character symbols; survives SSH and multiplexers.
    Symbols,
    /// DEC sixel stream.
    Sixels,
}

impl ChafaFormat {
    fn as_arg(self) -> &'static str {
        match self {
            ChafaFormat::Auto => "auto",
            ChafaFormat::Symbols => "symbols",
            ChafaFormat::Sixels => "sixels",
        }
    }
}

/// Render `bytes` via a chafa subprocess. The image is handed over through
/// a temp file because chafa sniffs the format from the file contents.
pub async fn render(
    bytes: &[u8],
    cols: u16,
    rows: u16,
    format: ChafaFormat,
) -> Result<String, RenderError> {
    let binary = which::which("chafa").map_err(|_| RenderError::Protocol {
        protocol: "chafa".to_string(),
        message: "binary not found on PATH".to_string(),
    })?;

    let mut tmp = tempfile::NamedTempFile::new().map_err(|err| RenderError::Protocol {
        protocol: "chafa".to_string(),
        message: format!("temp file: {err}"),
    })?;
    tmp.write_all(bytes).map_err(|err| RenderError::Protocol {
        protocol: "chafa".to_string(),
        message: format!("temp file write: {err}"),
    })?;

    let run = Command::new(binary)
        .arg("--size")
        .arg(format!("{cols}x{rows}"))
        .arg("--format")
        .arg(format.as_arg())
        .arg(tmp.path())
        .stdin(Stdio::null())
        .stderr(Stdio::piped())
        .output();
    let output = tokio::time::timeout(CHAFA_TIMEOUT, run)
        .await
        .map_err(|_| RenderError::Protocol {
            protocol: "chafa".to_string(),
            message: "timed out".to_string(),
        })?
        .map_err(|err| RenderError::Protocol {
            protocol: "chafa".to_string(),
            message: err.to_string(),
        })?;

    if !output.status.success() {
        return Err(RenderError::Protocol {
            protocol: "chafa".to_string(),
            message: format!(
                "exited {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        });
    }
    String::from_utf8(output.stdout).map_err(|err| RenderError::Protocol {
        protocol: "chafa".to_string(),
        message: format!("non-utf8 output: {err}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn format_args() {
        assert_eq!(ChafaFormat::Auto.as_arg(), "auto");
        assert_eq!(ChafaFormat::Symbols.as_arg(), "symbols");
        assert_eq!(ChafaFormat::Sixels.as_arg(), "sixels");
    }

    #[tokio::test]
    async fn missing_binary_is_a_protocol_error() {
        if which::which("chafa").is_ok() {
            // Host has chafa installed; nothing to assert here.
            return;
        }
        let err = render(b"png-bytes", 10, 5, ChafaFormat::Auto)
            .await
            .expect_err("should fail");
        assert!(matches!(err, RenderError::Protocol { .. }));
    }
}
