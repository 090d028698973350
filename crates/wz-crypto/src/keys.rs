//! WZ key material
//!
//! The AES user key is fixed across all known clients; what varies by region
//! is the 4-byte IV that seeds the keystream. An all-zero IV means the
//! client ships its data unencrypted.

use std::fmt;

use crate::error::CryptoError;

/// The fixed 32-byte AES user key shared by all known WZ producers.
///
/// Only every fourth byte carries entropy; the key is stored here exactly as
/// the clients expand it.
pub const WZ_AES_KEY: [u8; 32] = [
    0x13, 0x00, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00, 0x06, 0x00, 0x00, 0x00, 0xB4, 0x00, 0x00,
    0x00, 0x1B, 0x00, 0x00, 0x00, 0x0F, 0x00, 0x00, 0x00, 0x33, 0x00, 0x00, 0x00, 0x52, 0x00,
    0x00, 0x00,
];

/// Well-known client variants and their keystream IVs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WzVariant {
    /// Global client
    Gms,
    /// Europe / South-East Asia client
    Ems,
    /// Korea / Brazil client (zero IV, data not encrypted)
    Bms,
}

impl WzVariant {
    /// The 4-byte keystream IV for this variant
    pub fn iv(self) -> [u8; 4] {
        match self {
            Self::Gms => [0x4D, 0x23, 0xC7, 0x2B],
            Self::Ems => [0xB9, 0x7D, 0x63, 0xE9],
            Self::Bms => [0x00, 0x00, 0x00, 0x00],
        }
    }

    /// Whether archives of this variant carry encrypted payloads
    pub fn is_encrypted(self) -> bool {
        self.iv() != [0u8; 4]
    }
}

impl fmt::Display for WzVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gms => write!(f, "GMS ({})", hex::encode_upper(self.iv())),
            Self::Ems => write!(f, "EMS ({})", hex::encode_upper(self.iv())),
            Self::Bms => write!(f, "BMS (unencrypted)"),
        }
    }
}

/// Parse a 4-byte IV from a hex string
pub fn iv_from_hex(hex_str: &str) -> Result<[u8; 4], CryptoError> {
    let bytes = hex::decode(hex_str.trim())
        .map_err(|e| CryptoError::InvalidIvFormat(format!("invalid hex: {e}")))?;

    if bytes.len() != 4 {
        return Err(CryptoError::InvalidIvSize {
            expected: 4,
            actual: bytes.len(),
        });
    }

    let mut iv = [0u8; 4];
    iv.copy_from_slice(&bytes);
    Ok(iv)
}
