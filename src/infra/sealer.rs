//! Placeholder message sealing: Base64 envelopes, no confidentiality.

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::domain::{MessageSealer, SdkError};

#[derive(Debug, Default, Clone, Copy)]
pub struct Base64Sealer;

impl MessageSealer for Base64Sealer {
    fn seal(&self, plaintext: &str) -> Result<String, SdkError> {
        Ok(STANDARD.encode(plaintext.as_bytes()))
    }

    fn open(&self, sealed: &str) -> Result<String, SdkError> {
        let bytes = STANDARD
            .decode(sealed)
            .map_err(|e| SdkError::Serialization(format!("Invalid sealed payload: {e}")))?;
        String::from_utf8(bytes)
            .map_err(|e| SdkError::Serialization(format!("Sealed payload is not UTF-8: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_reverses_seal() {
        let sealer = Base64Sealer;
        let sealed = sealer.seal("meet at dawn").unwrap();
        assert_ne!(sealed, "meet at dawn");
        assert_eq!(sealer.open(&sealed).unwrap(), "meet at dawn");
    }

    #[test]
    fn test_open_rejects_garbage() {
        assert!(matches!(
            Base64Sealer.open("%%%"),
            Err(SdkError::Serialization(_))
        ));
    }
}
