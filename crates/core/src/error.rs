use thiserror::Error;

/// Top-level error type for the Fieldscope engine.
#[derive(Debug, Error)]
pub enum FieldscopeError {
    #[error("could not decode {name} as an image: {reason}")]
    DecodeFailed { name: String, reason: String },

    #[error("image index {index} out of range ({len} items)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("cannot {action} while in stage {stage}")]
    InvalidTransition { action: &'static str, stage: String },

    #[error("gateway error ({service}): {message}")]
    GatewayError { service: String, message: String },

    #[error("no images in the session")]
    EmptySession,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
