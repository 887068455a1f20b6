use crate::{
    Bip38Result,
    address::{PubkeyFormat, address_checksum, p2pkh_address},
    crypto, ec,
    error::Error,
    network::Network,
};
use bitcoin::{PrivateKey, base58, hex::DisplayHex, key::Secp256k1, secp256k1::SecretKey};

/// Number of base58 characters on every encrypted private key.
const LEN_EKEY: usize = 58;

/// Prefix of all private keys encrypted with bip-0038 standard.
const PRE_EKEY: &str = "6P";

/// Prefix of all non ec encrypted keys.
const PRE_NON_EC: [u8; 2] = [0x01, 0x42];

/// Prefix of all ec encrypted keys.
pub(crate) const PRE_EC: [u8; 2] = [0x01, 0x43];

/// Decrypted private key with its derived companions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decrypted {
    /// Wallet import format of the key
    pub wif: String,
    /// Private key hex
    pub private_key: String,
    /// Serialized public key hex
    pub public_key: String,
    /// Serialization form of both the WIF and the public key
    pub format: PubkeyFormat,
    /// Qtum p2pkh address
    pub address: String,
    /// Seed hex the key pair grew from, ec multiply keys only
    pub seed: Option<String>,
    /// Lot and sequence numbers embedded in the owner entropy
    pub lot_sequence: Option<(u32, u32)>,
}

/// Encrypt a private key under a passphrase (no ec multiply).
///
/// The address checksum of the key serves as scrypt salt, so the output
/// is deterministic in `(wif, passphrase, network)`.
pub fn bip38_encrypt(wif: &str, passphrase: &str, network: Network) -> Bip38Result {
    let private_key = PrivateKey::from_wif(wif)?;
    if private_key.network != network.kind() {
        return Err(Error::NetworkMismatch);
    }
    let salt = {
        let pub_key = private_key.public_key(&Secp256k1::default());
        address_checksum(&p2pkh_address(&pub_key.to_bytes(), network))
    };
    let mut derived = [0; 64];
    crypto::scrypt_strong(&crypto::normalize(passphrase), &salt, &mut derived)?;
    let data = {
        let secret = private_key.inner.secret_bytes();
        let half: Vec<u8> = (0..32).map(|i| secret[i] ^ derived[i]).collect();
        crypto::aes_encrypt(&derived[32..], &half)?
    };
    let buffer = [
        &PRE_NON_EC[..],
        &[if private_key.compressed { 0xe0 } else { 0xc0 }][..],
        &salt[..],
        &data[..],
    ]
    .concat();
    Ok(base58::encode_check(&buffer))
}

/// Decrypt an encrypted private key to its WIF.
///
/// Both payload kinds are accepted; the `0x0142`/`0x0143` prefix selects
/// the decryption branch.
pub fn bip38_decrypt(secret: &str, passphrase: &str, network: Network) -> Bip38Result {
    bip38_decrypt_detailed(secret, passphrase, network).map(|vs| vs.wif)
}

/// Decrypt an encrypted private key with full details.
pub fn bip38_decrypt_detailed(
    secret: &str,
    passphrase: &str,
    network: Network,
) -> Bip38Result<Decrypted> {
    if secret.len() != LEN_EKEY || !secret.starts_with(PRE_EKEY) {
        return Err(Error::UnexpectedPrefix);
    }
    match base58::decode_check(secret)? {
        vs if vs.len() == 39 && vs[..2] == PRE_NON_EC => decrypt_non_ec(&vs, passphrase, network),
        vs if vs.len() == 39 && vs[..2] == PRE_EC => ec::decrypt_ec(&vs, passphrase, network),
        _ => Err(Error::UnexpectedPrefix),
    }
}

fn decrypt_non_ec(secret: &[u8], passphrase: &str, network: Network) -> Bip38Result<Decrypted> {
    let format = match secret[2] {
        0xc0 => PubkeyFormat::Uncompressed,
        0xe0 => PubkeyFormat::Compressed,
        flag => return Err(Error::UnsupportedFlag(flag)),
    };
    let mut derived = [0; 64];
    crypto::scrypt_strong(&crypto::normalize(passphrase), &secret[3..7], &mut derived)?;
    let private_key = {
        let mut data = crypto::aes_decrypt(&derived[32..], &secret[7..39])?;
        (0..32).for_each(|i| data[i] ^= derived[i]);
        PrivateKey {
            compressed: format.is_compressed(),
            network: network.kind(),
            inner: SecretKey::from_slice(&data).map_err(|_| Error::InvalidKeyRange)?,
        }
    };
    let pub_key = private_key.public_key(&Secp256k1::default());
    let address = p2pkh_address(&pub_key.to_bytes(), network);
    if address_checksum(&address)[..] != secret[3..7] {
        return Err(Error::BadPassphrase);
    }
    Ok(Decrypted {
        wif: private_key.to_wif(),
        private_key: private_key.inner.secret_bytes().to_lower_hex_string(),
        public_key: pub_key.to_bytes().to_lower_hex_string(),
        format,
        address,
        seed: None,
        lot_sequence: None,
    })
}
