use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    /// Input bytes do not decode as PNG, JPEG, or GIF. Never triggers the
    /// fallback chain: garbage in is garbage regardless of protocol.
    #[error("corrupt image: {0}")]
    Decode(String),

    /// One protocol step failed; with fallback enabled the chain advances,
    /// otherwise this surfaces to the caller.
    #[error("{protocol} rendering failed: {message}")]
    Protocol { protocol: String, message: String },

    /// Every step of the fallback chain failed.
    #[error("no image protocol succeeded")]
    Exhausted,
}
