use thiserror::Error;

/// Errors the engine surfaces to its caller.
///
/// Everything else (generation failures, quality rejections, empty
/// recommendation results) is recovered inside the engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("message cannot be empty")]
    EmptyMessage,

    #[error("message too long ({len} chars, max {max})")]
    MessageTooLong { len: usize, max: usize },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}
