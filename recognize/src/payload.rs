use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::RecognizeError;

/// Decodes a base64-encoded capture.
///
/// Accepts either bare base64 or a data URL such as
/// `data:image/jpeg;base64,/9j/4AAQ...`.
pub fn decode_payload(encoded: &str) -> Result<Vec<u8>, RecognizeError> {
    let body = match encoded.split_once(',') {
        Some((_, body)) => body,
        None => encoded,
    };
    let body = body.trim();
    if body.is_empty() {
        return Err(RecognizeError::Decode("empty payload".to_string()));
    }
    STANDARD
        .decode(body)
        .map_err(|e| RecognizeError::Decode(e.to_string()))
}
