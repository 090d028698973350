//! WZ keystream cipher
//!
//! The keystream is an AES-256-ECB chain seeded from the client IV: the
//! 4-byte IV repeated four times forms the 16-byte seed block, keystream
//! block 0 is the AES encryption of the seed, and block n is the AES
//! encryption of block n-1. Payload bytes are XORed with the keystream
//! starting at offset 0, so every call is stateless and decryption equals
//! encryption.

use aes::Aes256;
use cipher::generic_array::GenericArray;
use cipher::{BlockEncrypt, KeyInit};

use crate::keys::WZ_AES_KEY;

/// Keystream cipher for one archive
///
/// Cheap to construct; the keystream itself is generated on the fly per
/// call, 16 bytes at a time.
#[derive(Clone)]
pub struct WzKeyStream {
    cipher: Aes256,
    iv: [u8; 4],
}

impl WzKeyStream {
    /// Create a keystream generator for the given client IV
    pub fn new(iv: [u8; 4]) -> Self {
        let cipher = Aes256::new(GenericArray::from_slice(&WZ_AES_KEY));
        Self { cipher, iv }
    }

    /// The IV this keystream was seeded with
    pub fn iv(&self) -> [u8; 4] {
        self.iv
    }

    /// XOR `buf` with the keystream, starting at keystream offset 0
    pub fn apply_keystream(&self, buf: &mut [u8]) {
        let mut seed = [0u8; 16];
        for chunk in seed.chunks_exact_mut(4) {
            chunk.copy_from_slice(&self.iv);
        }
        let mut block = GenericArray::from(seed);

        for chunk in buf.chunks_mut(16) {
            // Encrypting in place advances the chain one block.
            self.cipher.encrypt_block(&mut block);
            for (b, k) in chunk.iter_mut().zip(block.iter()) {
                *b ^= k;
            }
        }
    }

    /// Decrypt (or encrypt) a byte sequence, same length in and out
    pub fn decrypt(&self, data: &[u8]) -> Vec<u8> {
        let mut out = data.to_vec();
        self.apply_keystream(&mut out);
        out
    }
}

impl std::fmt::Debug for WzKeyStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WzKeyStream")
            .field("iv", &hex::encode_upper(self.iv))
            .finish_non_exhaustive()
    }
}
