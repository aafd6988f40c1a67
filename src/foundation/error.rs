/// Convenience result type used across rgbd.
pub type RgbdResult<T> = Result<T, RgbdError>;

/// Error taxonomy shared by the frame-sequence encoder and the depth buffer codec.
#[derive(thiserror::Error, Debug)]
pub enum RgbdError {
    /// Invalid caller-supplied values (empty input, bad options, zero-sized images).
    #[error("validation error: {0}")]
    Validation(String),

    /// The encoder cannot accept the requested codec/size/output combination.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A pixel buffer or output buffer could not be obtained.
    #[error("allocation error: {0}")]
    Allocation(String),

    /// A single frame failed to reach the encoder.
    #[error("append error at frame {frame}: {reason}")]
    Append {
        /// 0-based index of the frame that failed.
        frame: u64,
        /// Human-readable failure description.
        reason: String,
    },

    /// Filesystem failure while preparing or writing output.
    #[error("io error: {context}: {source}")]
    Io {
        /// What was being attempted.
        context: String,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// Malformed depth data (ragged rows, short buffers, bad stride).
    #[error("decode error: {0}")]
    Decode(String),

    /// The operation was cancelled through its cancellation token.
    #[error("cancelled: {0}")]
    Cancelled(String),

    /// The media-library collaborator rejected a save.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Errors when serializing or deserializing options.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RgbdError {
    /// Build a [`RgbdError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`RgbdError::Configuration`] value.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`RgbdError::Allocation`] value.
    pub fn allocation(msg: impl Into<String>) -> Self {
        Self::Allocation(msg.into())
    }

    /// Build a [`RgbdError::Append`] value for frame `frame`.
    pub fn append(frame: u64, reason: impl Into<String>) -> Self {
        Self::Append {
            frame,
            reason: reason.into(),
        }
    }

    /// Build a [`RgbdError::Io`] value.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Build a [`RgbdError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`RgbdError::Cancelled`] value.
    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }

    /// Build a [`RgbdError::Persistence`] value.
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Build a [`RgbdError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Re-tag any error as an append failure of `frame`, keeping its message.
    ///
    /// Errors that already are [`RgbdError::Append`] pass through unchanged.
    pub(crate) fn into_append(self, frame: u64) -> Self {
        match self {
            e @ Self::Append { .. } => e,
            other => Self::append(frame, other.to_string()),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
