//! Text frame codec.

use crate::Frame;

/// Errors from encoding or decoding a frame.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The text is not a JSON `[string, payload]` pair.
    #[error("malformed frame: {0}")]
    MalformedFrame(#[source] serde_json::Error),
    #[error("failed to encode frame: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Serialize a frame to its JSON text form.
pub fn encode(frame: &Frame) -> Result<String, CodecError> {
    serde_json::to_string(frame).map_err(CodecError::Encode)
}

/// Parse a JSON text frame.
///
/// Anything other than a two element array whose first element is a string
/// is rejected.
pub fn decode(text: &str) -> Result<Frame, CodecError> {
    serde_json::from_str(text).map_err(CodecError::MalformedFrame)
}
