//! Cryptographic operations for the WZ archive format
//!
//! WZ archives protect strings and image payloads with a keystream derived
//! from AES-256: a 4-byte client IV is repeated to a 16-byte seed block,
//! the first keystream block is the AES encryption of that seed, and every
//! following block is the AES encryption of the previous one. Data is
//! XORed with the keystream, so encryption and decryption are the same
//! operation.
//!
//! # Components
//!
//! - [`WzKeyStream`] - keystream generation and application
//! - [`WzVariant`] - well-known client variants and their IVs
//!
//! # Examples
//!
//! ```
//! use wz_crypto::{WzKeyStream, WzVariant};
//!
//! let key = WzKeyStream::new(WzVariant::Gms.iv());
//! let plain = b"canvas payload".to_vec();
//! let cipher = key.decrypt(&plain); // XOR, so this also encrypts
//! assert_eq!(key.decrypt(&cipher), plain);
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod keys;
pub mod keystream;

pub use error::CryptoError;
pub use keys::{WZ_AES_KEY, WzVariant, iv_from_hex};
pub use keystream::WzKeyStream;
