//! Splitting a serialized signature into the `(r, s, v)` call arguments.

use alloy::primitives::B256;
use alloy::signers::Signature;
use thiserror::Error;

/// Serialized signature length: `r ‖ s ‖ v`.
pub const SIGNATURE_LEN: usize = 65;

/// Errors decoding a serialized signature.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// Not valid hex.
    #[error("Invalid signature hex: {0}")]
    Hex(String),

    /// Decoded to the wrong number of bytes.
    #[error("Invalid signature length: expected 65 bytes, got {0}")]
    Length(usize),

    /// Trailing byte is neither a recovery id (0/1) nor 27/28.
    #[error("Invalid recovery byte: {0}")]
    RecoveryByte(u8),
}

/// The three scalar components contracts take separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureParts {
    pub r: B256,
    pub s: B256,
    /// 27 or 28.
    pub v: u8,
}

impl SignatureParts {
    /// Parse a `0x`-prefixed (or bare) 65-byte hex signature.
    pub fn decompose(serialized: &str) -> Result<Self, SignatureError> {
        let trimmed = serialized.trim();
        let hex_part = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = alloy::hex::decode(hex_part).map_err(|e| SignatureError::Hex(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignatureError> {
        if bytes.len() != SIGNATURE_LEN {
            return Err(SignatureError::Length(bytes.len()));
        }

        let v = match bytes[64] {
            v @ (0 | 1) => v + 27,
            v @ (27 | 28) => v,
            other => return Err(SignatureError::RecoveryByte(other)),
        };

        Ok(Self {
            r: B256::from_slice(&bytes[..32]),
            s: B256::from_slice(&bytes[32..64]),
            v,
        })
    }

    pub fn from_signature(signature: &Signature) -> Self {
        Self {
            r: B256::from(signature.r()),
            s: B256::from(signature.s()),
            v: 27 + signature.v() as u8,
        }
    }

    /// Re-serialize as `0x` + 130 hex characters.
    pub fn serialize(&self) -> String {
        let mut bytes = Vec::with_capacity(SIGNATURE_LEN);
        bytes.extend_from_slice(self.r.as_slice());
        bytes.extend_from_slice(self.s.as_slice());
        bytes.push(self.v);
        alloy::hex::encode_prefixed(bytes)
    }
}

/// Serialize a signature the way `eth_signTypedData_v4` returns it.
pub fn serialize_signature(signature: &Signature) -> String {
    alloy::hex::encode_prefixed(signature.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_hex(v: u8) -> String {
        let mut bytes = vec![0x11u8; 32];
        bytes.extend(vec![0x22u8; 32]);
        bytes.push(v);
        alloy::hex::encode_prefixed(bytes)
    }

    #[test]
    fn test_decompose() {
        let parts = SignatureParts::decompose(&sample_hex(28)).unwrap();
        assert_eq!(parts.r, B256::repeat_byte(0x11));
        assert_eq!(parts.s, B256::repeat_byte(0x22));
        assert_eq!(parts.v, 28);
        assert_eq!(parts.serialize(), sample_hex(28));
    }

    #[test]
    fn test_recovery_id_normalized() {
        assert_eq!(SignatureParts::decompose(&sample_hex(0)).unwrap().v, 27);
        assert_eq!(SignatureParts::decompose(&sample_hex(1)).unwrap().v, 28);
    }

    #[test]
    fn test_wrong_length_rejected() {
        let short = &sample_hex(27)[..128];
        assert_eq!(SignatureParts::decompose(short), Err(SignatureError::Length(63)));
        assert_eq!(SignatureParts::decompose("0x"), Err(SignatureError::Length(0)));

        let long = format!("{}00", sample_hex(27));
        assert_eq!(SignatureParts::decompose(&long), Err(SignatureError::Length(66)));
    }

    #[test]
    fn test_bad_hex_rejected() {
        let bad = format!("0x{}", "zz".repeat(65));
        assert!(matches!(SignatureParts::decompose(&bad), Err(SignatureError::Hex(_))));
    }

    #[test]
    fn test_bad_recovery_byte_rejected() {
        assert_eq!(
            SignatureParts::decompose(&sample_hex(37)),
            Err(SignatureError::RecoveryByte(37))
        );
    }

    #[test]
    fn test_bare_hex_accepted() {
        let bare = sample_hex(27).trim_start_matches("0x").to_string();
        assert_eq!(SignatureParts::decompose(&bare).unwrap().v, 27);
    }
}
