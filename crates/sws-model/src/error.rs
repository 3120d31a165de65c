//! Model error types.

use thiserror::Error;

use crate::kind::WindowKind;
use crate::record::WindowId;

/// Errors raised when a window record or registry invariant would be broken.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// The payload variant does not belong to the window's kind.
    #[error("payload of type {payload} does not match window kind {kind}")]
    PayloadKindMismatch {
        kind: WindowKind,
        payload: WindowKind,
    },

    /// The payload is structurally broken (ragged rows, dangling mesh indices, ...).
    #[error("invalid {kind} payload: {reason}")]
    InvalidPayload { kind: WindowKind, reason: String },

    /// Position fields must be finite and the extent non-negative.
    #[error("invalid window position: {0}")]
    InvalidPosition(String),

    /// Ids above `WindowId::MAX` cannot be registered.
    #[error("window id {0} is out of range")]
    IdOutOfRange(WindowId),

    /// A window with this id is already registered.
    #[error("window {0} is already registered")]
    DuplicateId(WindowId),

    /// No window with this id is registered.
    #[error("window {0} is not registered")]
    UnknownWindow(WindowId),

    /// A window kind name that is not part of the closed set.
    #[error("unknown window kind: {0}")]
    UnknownKind(String),
}

/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
