use crate::{Bip38Result, error::Error, network::Network};
use bitcoin::{
    PrivateKey, base58,
    hashes::{Hash, hash160, sha256},
    hex::{DisplayHex, FromHex},
    secp256k1::{PublicKey, SecretKey},
};

/// Serialization form of a public key
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PubkeyFormat {
    /// 33 byte sec1 form
    #[default]
    Compressed,
    /// 65 byte legacy form
    Uncompressed,
}

impl PubkeyFormat {
    /// Whether keys of this form carry the WIF compression suffix.
    pub const fn is_compressed(self) -> bool {
        matches!(self, PubkeyFormat::Compressed)
    }
}

/// Base58check p2pkh address of the serialized public key.
pub(crate) fn p2pkh_address(pubkey: &[u8], network: Network) -> String {
    let hash = hash160::Hash::hash(pubkey);
    let data = [&[network.p2pkh_prefix()][..], &hash.as_byte_array()[..]].concat();
    base58::encode_check(&data)
}

/// First four bytes of the double sha256 of the address string.
pub(crate) fn address_checksum(address: &str) -> [u8; 4] {
    let hash = sha256::Hash::hash(address.as_bytes()).hash_again();
    let mut checksum = [0; 4];
    checksum.copy_from_slice(&hash[..4]);
    checksum
}

/// Serialize a curve point in the requested form.
pub(crate) fn serialize_pubkey(pubkey: &PublicKey, format: PubkeyFormat) -> Vec<u8> {
    match format {
        PubkeyFormat::Compressed => pubkey.serialize().to_vec(),
        PubkeyFormat::Uncompressed => pubkey.serialize_uncompressed().to_vec(),
    }
}

/// Encode a raw private key as wallet import format.
///
/// # Examples
/// ```
/// use qtum_bip38::{Network, PubkeyFormat, private_key_to_wif};
///
/// let private_key = "cbf4b9f70470856bb4f40f80b87edb90865997ffee6df315ab166d713af433a5";
/// assert_eq!(
///     private_key_to_wif(private_key, PubkeyFormat::Uncompressed, Network::Mainnet)?,
///     "5KN7MzqK5wt2TP1fQCYyHBtDrXdJuXbUzm4A9rKAteGu3Qi5CVR"
/// );
/// # Ok::<(), qtum_bip38::Error>(())
/// ```
pub fn private_key_to_wif(private_key: &str, format: PubkeyFormat, network: Network) -> Bip38Result {
    let data = <[u8; 32]>::from_hex(private_key)?;
    let inner = SecretKey::from_slice(&data).map_err(|_| Error::InvalidKeyRange)?;
    let key = PrivateKey {
        compressed: format.is_compressed(),
        network: network.kind(),
        inner,
    };
    Ok(key.to_wif())
}

/// Decode wallet import format to the raw private key hex and its form.
///
/// # Examples
/// ```
/// use qtum_bip38::{Network, PubkeyFormat, wif_to_private_key};
///
/// let (private_key, format) =
///     wif_to_private_key("L44B5gGEpqEDRS9vVPz7QT35jcBG2r3CZwSwQ4fCewXAhAhqGVpP", Network::Mainnet)?;
/// assert_eq!(private_key, "cbf4b9f70470856bb4f40f80b87edb90865997ffee6df315ab166d713af433a5");
/// assert_eq!(format, PubkeyFormat::Compressed);
/// # Ok::<(), qtum_bip38::Error>(())
/// ```
pub fn wif_to_private_key(wif: &str, network: Network) -> Bip38Result<(String, PubkeyFormat)> {
    let key = PrivateKey::from_wif(wif)?;
    if key.network != network.kind() {
        return Err(Error::NetworkMismatch);
    }
    let format = match key.compressed {
        true => PubkeyFormat::Compressed,
        false => PubkeyFormat::Uncompressed,
    };
    Ok((key.inner.secret_bytes().to_lower_hex_string(), format))
}

#[cfg(test)]
mod address_test {
    use super::*;
    use bitcoin::key::Secp256k1;

    const PRIVATE_KEY: &str = "cbf4b9f70470856bb4f40f80b87edb90865997ffee6df315ab166d713af433a5";

    #[test]
    fn test_wif() -> Bip38Result<()> {
        let wif = private_key_to_wif(PRIVATE_KEY, PubkeyFormat::Uncompressed, Network::Mainnet)?;
        assert_eq!(wif, "5KN7MzqK5wt2TP1fQCYyHBtDrXdJuXbUzm4A9rKAteGu3Qi5CVR");
        assert_eq!(
            wif_to_private_key(&wif, Network::Mainnet)?,
            (PRIVATE_KEY.to_owned(), PubkeyFormat::Uncompressed)
        );

        let wif = private_key_to_wif(PRIVATE_KEY, PubkeyFormat::Compressed, Network::Mainnet)?;
        assert_eq!(wif, "L44B5gGEpqEDRS9vVPz7QT35jcBG2r3CZwSwQ4fCewXAhAhqGVpP");
        assert_eq!(
            wif_to_private_key(&wif, Network::Mainnet)?,
            (PRIVATE_KEY.to_owned(), PubkeyFormat::Compressed)
        );

        assert_eq!(
            wif_to_private_key(&wif, Network::Testnet),
            Err(Error::NetworkMismatch)
        );
        Ok(())
    }

    #[test]
    fn test_address() -> Bip38Result<()> {
        let secp = Secp256k1::default();
        for (format, address) in [
            (PubkeyFormat::Uncompressed, "QeS5U4AEaxPpJ8swzLHEcNbAaNkDfpWjQN"),
            (PubkeyFormat::Compressed, "QRfLX1RpJN25v2jKGPYsQHu8G1ag3sHJeL"),
        ] {
            let wif = private_key_to_wif(PRIVATE_KEY, format, Network::Mainnet)?;
            let pub_key = PrivateKey::from_wif(&wif)?.public_key(&secp);
            assert_eq!(p2pkh_address(&pub_key.to_bytes(), Network::Mainnet), address);
        }
        Ok(())
    }
}
