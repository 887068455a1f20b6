#![warn(missing_docs)]
//! # Qtum BIP38
//!
//! Passphrase protected private keys for the Qtum blockchain, following
//! the bip-0038 standard with qtum version bytes.
//!
//! Two modes are supported. Plain encryption wraps an existing private
//! key under a passphrase. Ec multiply mode lets a third party generate
//! brand new encrypted key pairs from an [`intermediate_code`] without
//! ever learning the passphrase, optionally stamped with lot and
//! sequence numbers, and emits a confirmation code the passphrase owner
//! can check with [`confirm_code`].
//!
//! # Examples
//! ```
//! use qtum_bip38::*;
//!
//! let wif = private_key_to_wif(
//!     "cbf4b9f70470856bb4f40f80b87edb90865997ffee6df315ab166d713af433a5",
//!     PubkeyFormat::Uncompressed,
//!     Network::Mainnet,
//! )?;
//! let secret = bip38_encrypt(&wif, "qtum123", Network::Mainnet)?;
//! assert_eq!(secret, "6PRP4FDk4BWidB539rEWBH26DRcG2tavQg52WRcyuK5dxMdu8WHVftRZof");
//! assert_eq!(bip38_decrypt(&secret, "qtum123", Network::Mainnet)?, wif);
//! # Ok::<(), qtum_bip38::Error>(())
//! ```
//!
// # Reference
// [1] - [BIP38 spec](https://bips.dev/38/)
//

mod address;
mod crypto;
mod ec;
mod encrypt;
mod network;

pub use address::{PubkeyFormat, private_key_to_wif, wif_to_private_key};
pub use ec::{
    Confirmed, EncryptedWif, confirm_code, confirm_code_detailed, create_new_encrypted_wif,
    intermediate_code,
};
pub use encrypt::{Decrypted, bip38_decrypt, bip38_decrypt_detailed, bip38_encrypt};
pub use network::Network;

///
/// Global error definition
///
pub mod error {
    /// Qtum bip38 error
    #[derive(thiserror::Error, Debug, PartialEq)]
    pub enum Error {
        /// Invalid base58 string
        #[error("base58 error: {0}")]
        Base58(#[from] bitcoin::base58::Error),
        /// Payload doesn't begin with the magic of the requested operation
        #[error("unexpected payload prefix")]
        UnexpectedPrefix,
        /// Reserved flag bits set
        #[error("unsupported flag byte: {0:#04x}")]
        UnsupportedFlag(u8),
        /// Recomputed address checksum disagrees with the payload
        #[error("wrong passphrase")]
        BadPassphrase,
        /// Secret scalar is zero or reaches the curve order
        #[error("secret scalar out of range")]
        InvalidKeyRange,
        /// Lot number beyond 1048575
        #[error("invalid lot number: {0}")]
        InvalidLot(u32),
        /// Sequence number beyond 4095
        #[error("invalid sequence number: {0}")]
        InvalidSequence(u32),
        /// Seed isn't 24 bytes
        #[error("invalid seed length: {0}")]
        InvalidSeedLength(usize),
        /// Owner salt isn't 8 bytes
        #[error("invalid owner salt length: {0}")]
        InvalidOwnerSaltLength(usize),
        /// WIF version byte belongs to the other network
        #[error("wif doesn't match network")]
        NetworkMismatch,
        /// Invalid WIF string
        #[error("invalid wif: {0}")]
        InvalidWif(#[from] bitcoin::key::FromWifError),
        /// Invalid private key hex
        #[error("hex error: {0}")]
        HexError(#[from] bitcoin::hex::HexToArrayError),
        /// Inner error
        #[error("inner error: {0}")]
        InnerError(String),
    }

    macro_rules! derive_error {
        ($e:expr, $source:ty) => {
            impl From<$source> for Error {
                fn from(e: $source) -> Self {
                    $e(e.to_string())
                }
            }
        };
    }
    derive_error!(Error::InnerError, aes::cipher::InvalidLength);
    derive_error!(Error::InnerError, scrypt::errors::InvalidOutputLen);
    derive_error!(Error::InnerError, scrypt::errors::InvalidParams);
    derive_error!(Error::InnerError, bitcoin::secp256k1::Error);
    derive_error!(
        Error::InnerError,
        bitcoin::secp256k1::scalar::OutOfRangeError
    );
}
pub use error::Error;

/// Crate result, defaults to base58 string outputs
pub type Bip38Result<T = String> = Result<T, Error>;
