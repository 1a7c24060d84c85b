//! Sealed messages for the transport channel
//!
//! Wire format, hex encoded two lowercase digits per byte:
//!
//! ```text
//! [8 bytes: random IV][N*8 bytes: TEA-ECB ciphertext][8 bytes: MAC]
//! MAC = digest(transport_key || IV || ciphertext)
//! ```
//!
//! The plaintext is zero padded to the block size before encryption. Unlike
//! cache slots, the message MAC covers the IV and is keyed with the
//! transport key itself.

use crate::engine::{CryptoEngine, MAC_SIZE};
use crate::error::CryptoError;
use crate::keys::{IV_SIZE, generate_iv};
use crate::padding::pad_to_block;
use crate::tea::BLOCK_SIZE;

/// An encrypted, authenticated transport payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecureMessage {
    /// Per-message IV
    pub iv: [u8; IV_SIZE],
    /// Padded plaintext under the transport key
    pub ciphertext: Vec<u8>,
    /// MAC over `iv || ciphertext`
    pub mac: [u8; MAC_SIZE],
}

impl SecureMessage {
    /// Seal `data` with a freshly drawn IV
    pub fn seal(engine: &CryptoEngine, data: &[u8]) -> Result<Self, CryptoError> {
        Self::seal_with_iv(engine, generate_iv(), data)
    }

    /// Seal `data` with a caller-chosen IV
    pub fn seal_with_iv(
        engine: &CryptoEngine,
        iv: [u8; IV_SIZE],
        data: &[u8],
    ) -> Result<Self, CryptoError> {
        let mut ciphertext = pad_to_block(data);
        engine.encrypt(&mut ciphertext)?;
        let mac = engine.generate_mac(&authenticated_bytes(&iv, &ciphertext));

        Ok(Self {
            iv,
            ciphertext,
            mac,
        })
    }

    /// Verify the MAC and return the padded plaintext
    pub fn open(&self, engine: &CryptoEngine) -> Result<Vec<u8>, CryptoError> {
        if !engine.verify_mac(&authenticated_bytes(&self.iv, &self.ciphertext), &self.mac) {
            return Err(CryptoError::MacMismatch);
        }

        let mut plaintext = self.ciphertext.clone();
        engine.decrypt(&mut plaintext)?;
        Ok(plaintext)
    }

    /// Raw wire bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        out.extend_from_slice(&self.iv);
        out.extend_from_slice(&self.ciphertext);
        out.extend_from_slice(&self.mac);
        out
    }

    /// Parse raw wire bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() < IV_SIZE + MAC_SIZE {
            return Err(CryptoError::MalformedMessage(format!(
                "too short: {} bytes (minimum {})",
                bytes.len(),
                IV_SIZE + MAC_SIZE
            )));
        }

        let (iv, rest) = bytes.split_at(IV_SIZE);
        let (ciphertext, mac) = rest.split_at(rest.len() - MAC_SIZE);

        if ciphertext.len() % BLOCK_SIZE != 0 {
            return Err(CryptoError::MalformedMessage(format!(
                "ciphertext length {} is not a multiple of {BLOCK_SIZE}",
                ciphertext.len()
            )));
        }

        let mut iv_bytes = [0u8; IV_SIZE];
        iv_bytes.copy_from_slice(iv);
        let mut mac_bytes = [0u8; MAC_SIZE];
        mac_bytes.copy_from_slice(mac);

        Ok(Self {
            iv: iv_bytes,
            ciphertext: ciphertext.to_vec(),
            mac: mac_bytes,
        })
    }

    /// Lowercase hex rendering used on the wire
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Parse the hex rendering (either case)
    pub fn from_hex(encoded: &str) -> Result<Self, CryptoError> {
        let bytes = hex::decode(encoded.trim())?;
        Self::from_bytes(&bytes)
    }

    /// Size of [`Self::to_bytes`]
    pub fn encoded_len(&self) -> usize {
        IV_SIZE + self.ciphertext.len() + MAC_SIZE
    }
}

fn authenticated_bytes(iv: &[u8; IV_SIZE], ciphertext: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(IV_SIZE + ciphertext.len());
    buf.extend_from_slice(iv);
    buf.extend_from_slice(ciphertext);
    buf
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::keys::Key;
    use pretty_assertions::assert_eq;

    const UID: [u8; 7] = [0x04, 0x1A, 0x2B, 0x3C, 0x4D, 0x5E, 0x6F];

    fn transport_engine() -> CryptoEngine {
        CryptoEngine::new(
            Key::from_hex("0123456789abcdef0123456789abcdef").expect("valid transport key"),
        )
    }

    #[test]
    fn test_seal_open_round_trip() {
        let engine = transport_engine();
        let message = SecureMessage::seal(&engine, &UID).unwrap();

        assert_eq!(message.ciphertext.len(), 8);
        let opened = message.open(&engine).unwrap();
        assert_eq!(&opened[..7], &UID);
        assert_eq!(opened[7], 0);
    }

    #[test]
    fn test_wire_layout() {
        let engine = transport_engine();
        let iv = [0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17];
        let message = SecureMessage::seal_with_iv(&engine, iv, &UID).unwrap();

        let encoded = message.to_hex();
        // 8 IV + 8 ciphertext + 8 MAC bytes, two digits each
        assert_eq!(encoded.len(), 48);
        assert!(encoded.starts_with("1011121314151617"));
        assert_eq!(encoded, encoded.to_lowercase());

        let mut expected_ct = pad_to_block(&UID);
        engine.encrypt(&mut expected_ct).unwrap();
        assert_eq!(&encoded[16..32], hex::encode(&expected_ct));

        let mut mac_input = iv.to_vec();
        mac_input.extend_from_slice(&expected_ct);
        assert_eq!(&encoded[32..], hex::encode(engine.generate_mac(&mac_input)));
    }

    #[test]
    fn test_hex_round_trip_accepts_uppercase() {
        let engine = transport_engine();
        let message = SecureMessage::seal(&engine, b"longer than one block").unwrap();
        let parsed = SecureMessage::from_hex(&message.to_hex().to_uppercase()).unwrap();
        assert_eq!(parsed, message);
        assert_eq!(&parsed.open(&engine).unwrap()[..21], b"longer than one block");
    }

    #[test]
    fn test_tampered_iv_is_rejected() {
        let engine = transport_engine();
        let mut message = SecureMessage::seal(&engine, &UID).unwrap();
        message.iv[0] ^= 1;
        assert_eq!(message.open(&engine), Err(CryptoError::MacMismatch));
    }

    #[test]
    fn test_tampered_ciphertext_is_rejected() {
        let engine = transport_engine();
        let mut message = SecureMessage::seal(&engine, &UID).unwrap();
        message.ciphertext[3] ^= 0x20;
        assert_eq!(message.open(&engine), Err(CryptoError::MacMismatch));
    }

    #[test]
    fn test_wrong_key_is_rejected() {
        let message = SecureMessage::seal(&transport_engine(), &UID).unwrap();
        let other = CryptoEngine::new(Key::from_slice(&[0x42]));
        assert_eq!(message.open(&other), Err(CryptoError::MacMismatch));
    }

    #[test]
    fn test_malformed_input() {
        assert!(matches!(
            SecureMessage::from_bytes(&[0u8; 15]),
            Err(CryptoError::MalformedMessage(_))
        ));
        assert!(matches!(
            SecureMessage::from_bytes(&[0u8; 19]),
            Err(CryptoError::MalformedMessage(_))
        ));
        assert!(matches!(
            SecureMessage::from_hex("not hex"),
            Err(CryptoError::MalformedMessage(_))
        ));

        // IV and MAC with an empty body is well formed
        let empty = SecureMessage::from_bytes(&[0u8; 16]).unwrap();
        assert!(empty.ciphertext.is_empty());
    }
}
