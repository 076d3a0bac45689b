//! Base64 image payloads from the request path.

use crate::error::FrameError;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

/// Marker separating a data-URI header from its base64 body.
const DATA_URI_MARKER: &str = ";base64,";

/// Decode a base64 image payload, with or without a data-URI header.
///
/// Accepts both `data:image/png;base64,iVBOR...` and a bare `iVBOR...`.
///
/// # Errors
///
/// Returns [`FrameError::Decode`] when the body is empty or not valid base64.
pub fn decode_base64_payload(payload: &str) -> Result<Vec<u8>, FrameError> {
    let body = payload
        .find(DATA_URI_MARKER)
        .map_or(payload, |idx| &payload[idx + DATA_URI_MARKER.len()..])
        .trim();

    if body.is_empty() {
        return Err(FrameError::Decode {
            reason: "empty base64 payload".to_string(),
        });
    }

    BASE64.decode(body).map_err(|e| FrameError::Decode {
        reason: format!("invalid base64 payload: {e}"),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_with_data_uri_header() {
        let encoded = format!("data:image/png;base64,{}", BASE64.encode(b"hello"));
        assert_eq!(decode_base64_payload(&encoded).unwrap(), b"hello");
    }

    #[test]
    fn test_decode_bare_base64() {
        let encoded = BASE64.encode([1u8, 2, 3, 255]);
        assert_eq!(decode_base64_payload(&encoded).unwrap(), vec![1, 2, 3, 255]);
    }

    #[test]
    fn test_decode_trims_whitespace() {
        let encoded = format!("  {}\n", BASE64.encode(b"abc"));
        assert_eq!(decode_base64_payload(&encoded).unwrap(), b"abc");
    }

    #[test]
    fn test_empty_body_fails() {
        assert!(decode_base64_payload("").is_err());
        assert!(decode_base64_payload("data:image/jpeg;base64,").is_err());
    }

    #[test]
    fn test_invalid_base64_fails() {
        let err = decode_base64_payload("data:image/png;base64,@@@").unwrap_err();
        assert!(err.to_string().contains("invalid base64"));
    }
}
