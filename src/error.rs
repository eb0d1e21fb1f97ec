use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The profile lacks the statistics needed to sample anything.
    #[error("profile incomplete: {0}; record more typing data")]
    ProfileIncomplete(String),

    #[error("invalid synthesis config: {0}")]
    InvalidConfig(String),

    /// Replay of the final sequence still disagrees with the requested text.
    ///
    /// This means the event builder and the replay interpreter disagree about
    /// key semantics, which is a bug rather than a data problem.
    #[error("internal error: replay produced {actual:?}, expected {expected:?}")]
    ReplayMismatch { expected: String, actual: String },

    #[error("line {line}: {reason}")]
    Decode { line: usize, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
