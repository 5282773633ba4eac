use std::io;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PulseErr>;

#[derive(Error, Debug)]
pub enum PulseErr {
    /// Configuration file failed validation; fatal at startup.
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    /// A snapshot file exists but could not be decoded. The file is left in
    /// place so the operator can inspect it.
    #[error("cache entry `{key}` is corrupt: {source}")]
    CacheRead {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Writing a snapshot or image failed partway; no partial file is left
    /// under the target name.
    #[error("cache write for `{key}` failed")]
    CacheWrite {
        key: String,
        #[source]
        source: io::Error,
    },

    /// Network-shaped collector failure: connect error, 5xx, timeout.
    /// The scheduler logs it and keeps the previous snapshot.
    #[error("collector `{collector}` transient failure: {message}")]
    CollectorTransient { collector: String, message: String },

    /// The monitored service rejected our credentials.
    #[error("collector `{collector}` authentication rejected")]
    CollectorAuth { collector: String },

    /// The monitored service answered with a payload we do not understand.
    #[error("collector `{collector}` returned an unexpected payload: {message}")]
    CollectorParse { collector: String, message: String },

    /// A collector exceeded its per-run budget and was abandoned.
    #[error("collector `{collector}` timed out after {budget:?}")]
    CollectorTimeout { collector: String, budget: Duration },

    /// Two collectors registered under the same name.
    #[error("collector `{0}` is already registered")]
    DuplicateCollector(String),

    /// Another daemon instance owns the pid file.
    #[error("daemon already running (pid {0})")]
    AlreadyRunning(u32),

    /// The ambient cancellation token fired.
    #[error("cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl PulseErr {
    /// Exit code for the `ppulse` binary: configuration and runtime errors
    /// exit 1, a second daemon exits 2.
    pub fn exit_code(&self) -> i32 {
        match self {
            PulseErr::AlreadyRunning(_) => 2,
            _ => 1,
        }
    }
}
