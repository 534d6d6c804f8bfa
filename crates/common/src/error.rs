use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Structurally invalid arguments — a programming error upstream, not
    /// market noise (e.g. non-positive entry price, swing_high <= swing_low
    /// passed into level derivation).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
