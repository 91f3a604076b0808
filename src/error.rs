//! Error types shared by the loader, canvas and sequence.

/// Errors reported by sequence operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SequenceError {
    /// A frame index outside `0..len` was requested.
    #[error("frame index {index} out of range for sequence of {len} frames")]
    IndexOutOfRange { index: usize, len: usize },
    /// A slot that already holds a frame was written again.
    #[error("frame slot {index} is already filled")]
    SlotAlreadyFilled { index: usize },
    /// The canvas was asked to draw before `setup()` attached a surface.
    #[error("canvas surface is not attached")]
    NotAttached,
    /// No element matched the container selector.
    #[error("no container element matches `{selector}`")]
    ContainerNotFound { selector: String },
    /// A single image resource failed to load.
    #[error("failed to load `{locator}`: {reason}")]
    Load { locator: String, reason: String },
    /// A browser API call failed.
    #[error("DOM error: {0}")]
    Dom(String),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, SequenceError>;

#[cfg(feature = "web")]
impl From<wasm_bindgen::JsValue> for SequenceError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        SequenceError::Dom(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
    }
}
