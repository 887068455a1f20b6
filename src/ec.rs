use crate::{
    Bip38Result,
    address::{PubkeyFormat, address_checksum, p2pkh_address, serialize_pubkey},
    crypto,
    encrypt::{Decrypted, PRE_EC},
    error::Error,
    network::Network,
};
use bitcoin::{
    PrivateKey, base58,
    hashes::{Hash, sha256},
    hex::DisplayHex,
    key::Secp256k1,
    secp256k1::{All, PublicKey, Scalar, SecretKey},
};

/// Magic prefix of intermediate codes carrying lot and sequence numbers.
const MAGIC_LOT_SEQ: [u8; 8] = [0x2c, 0xe9, 0xb3, 0xe1, 0xff, 0x39, 0xe2, 0x51];

/// Magic prefix of intermediate codes without lot and sequence numbers.
const MAGIC_NO_LOT_SEQ: [u8; 8] = [0x2c, 0xe9, 0xb3, 0xe1, 0xff, 0x39, 0xe2, 0x53];

/// Magic prefix of confirmation codes.
const PRE_CONF: [u8; 5] = [0x64, 0x3b, 0xf6, 0xa8, 0x9a];

/// Flag bit marking compressed public keys.
const FLAG_COMPRESSED: u8 = 0x20;

/// Flag bit marking owner entropy with embedded lot and sequence numbers.
const FLAG_LOT_SEQ: u8 = 0x04;

const MAX_LOT: u32 = 1_048_575;
const MAX_SEQUENCE: u32 = 4095;

/// Freshly generated key pair, encrypted for the passphrase owner of an
/// intermediate code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedWif {
    /// Encrypted private key
    pub encrypted_wif: String,
    /// Confirmation code for the passphrase owner, starts with `cfrm38`
    pub confirmation_code: String,
    /// Serialized public key hex
    pub public_key: String,
    /// Seed hex the key pair grew from
    pub seed: String,
    /// Serialization form of the public key
    pub format: PubkeyFormat,
    /// Qtum p2pkh address
    pub address: String,
}

/// Validated confirmation code details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmed {
    /// Qtum p2pkh address the code commits to
    pub address: String,
    /// Serialized public key hex
    pub public_key: String,
    /// Serialization form of the public key
    pub format: PubkeyFormat,
    /// Lot and sequence numbers embedded in the owner entropy
    pub lot_sequence: Option<(u32, u32)>,
}

/// Build an intermediate passphrase code for delegated key generation.
///
/// The holder of the code can generate encrypted key pairs without ever
/// learning the passphrase. With `lot_sequence` the owner entropy embeds
/// `lot * 4096 + sequence`, so generated keys carry provenance numbers.
///
/// `owner_salt` must hold 8 bytes; random bytes are drawn when omitted.
///
/// # Examples
/// ```
/// use qtum_bip38::intermediate_code;
///
/// let code = intermediate_code("qtum123", None, Some((100_000, 1)))?;
/// assert!(code.starts_with("passphrase"));
/// # Ok::<(), qtum_bip38::Error>(())
/// ```
pub fn intermediate_code(
    passphrase: &str,
    owner_salt: Option<&[u8]>,
    lot_sequence: Option<(u32, u32)>,
) -> Bip38Result {
    let owner_salt: [u8; 8] = match owner_salt {
        Some(vs) => vs
            .try_into()
            .map_err(|_| Error::InvalidOwnerSaltLength(vs.len()))?,
        None => rand::random(),
    };
    let (owner_entropy, magic) = match lot_sequence {
        Some((lot, sequence)) => {
            if lot > MAX_LOT {
                return Err(Error::InvalidLot(lot));
            }
            if sequence > MAX_SEQUENCE {
                return Err(Error::InvalidSequence(sequence));
            }
            let lot_seq = (lot * 4096 + sequence).to_be_bytes();
            ([&owner_salt[..4], &lot_seq[..]].concat(), MAGIC_LOT_SEQ)
        }
        None => (owner_salt.to_vec(), MAGIC_NO_LOT_SEQ),
    };
    let pass_factor = pass_factor(passphrase, lot_sequence.is_some(), &owner_entropy)?;
    let pass_point = PublicKey::from_secret_key(&Secp256k1::default(), &pass_factor);
    let payload = [&magic[..], &owner_entropy[..], &pass_point.serialize()[..]].concat();
    Ok(base58::encode_check(&payload))
}

/// Derive the scalar tying a passphrase to its owner entropy.
fn pass_factor(passphrase: &str, has_lot_seq: bool, owner_entropy: &[u8]) -> Bip38Result<SecretKey> {
    let mut factor = [0; 32];
    match has_lot_seq {
        true => {
            let mut pre = [0; 32];
            crypto::scrypt_strong(&crypto::normalize(passphrase), &owner_entropy[..4], &mut pre)?;
            let data = [&pre[..], owner_entropy].concat();
            factor = sha256::Hash::hash(&data).hash_again().to_byte_array();
        }
        false => crypto::scrypt_strong(&crypto::normalize(passphrase), owner_entropy, &mut factor)?,
    }
    SecretKey::from_slice(&factor).map_err(|_| Error::InvalidKeyRange)
}

/// Generate a new encrypted key pair from an intermediate passphrase code.
///
/// The private key never materializes here; only the passphrase owner can
/// decrypt it. The companion confirmation code lets the owner verify the
/// address without decrypting.
///
/// `seed` must hold 24 bytes; random bytes are drawn when omitted.
pub fn create_new_encrypted_wif(
    intermediate: &str,
    format: PubkeyFormat,
    seed: Option<&[u8]>,
    network: Network,
) -> Bip38Result<EncryptedWif> {
    let payload = base58::decode_check(intermediate)?;
    if payload.len() != 49 {
        return Err(Error::UnexpectedPrefix);
    }
    let has_lot_seq = if payload[..8] == MAGIC_LOT_SEQ {
        true
    } else if payload[..8] == MAGIC_NO_LOT_SEQ {
        false
    } else {
        return Err(Error::UnexpectedPrefix);
    };
    let owner_entropy = &payload[8..16];
    let seed: [u8; 24] = match seed {
        Some(vs) => vs.try_into().map_err(|_| Error::InvalidSeedLength(vs.len()))?,
        None => rand::random(),
    };

    let factor_b = {
        let data = sha256::Hash::hash(&seed).hash_again().to_byte_array();
        SecretKey::from_slice(&data).map_err(|_| Error::InvalidKeyRange)?
    };
    let secp = Secp256k1::default();
    let pass_point = PublicKey::from_slice(&payload[16..49])?;
    let public_key = pass_point
        .mul_tweak(&secp, &Scalar::from(factor_b))
        .map_err(|_| Error::InvalidKeyRange)?;
    let pub_bytes = serialize_pubkey(&public_key, format);
    let address = p2pkh_address(&pub_bytes, network);
    let checksum = address_checksum(&address);

    let mut derived = [0; 64];
    let salt = [&checksum[..], owner_entropy].concat();
    crypto::scrypt_light(&payload[16..49], &salt, &mut derived)?;
    let part1 = {
        let half: Vec<u8> = (0..16).map(|i| seed[i] ^ derived[i]).collect();
        crypto::aes_encrypt(&derived[32..], &half)?
    };
    let part2 = {
        let half: Vec<u8> = (0..8)
            .map(|i| part1[8 + i] ^ derived[16 + i])
            .chain((0..8).map(|i| seed[16 + i] ^ derived[24 + i]))
            .collect();
        crypto::aes_encrypt(&derived[32..], &half)?
    };
    let mut flag = match format.is_compressed() {
        true => FLAG_COMPRESSED,
        false => 0x00,
    };
    if has_lot_seq {
        flag |= FLAG_LOT_SEQ;
    }
    let buffer = [
        &PRE_EC[..],
        &[flag][..],
        &checksum[..],
        owner_entropy,
        &part1[..8],
        &part2[..],
    ]
    .concat();
    Ok(EncryptedWif {
        encrypted_wif: base58::encode_check(&buffer),
        confirmation_code: confirmation_code(flag, &checksum, owner_entropy, &factor_b, &derived, &secp)?,
        public_key: pub_bytes.to_lower_hex_string(),
        seed: seed.to_lower_hex_string(),
        format,
        address,
    })
}

/// Assemble the cfrm38 code certifying that an address derives from the
/// owner's passphrase.
fn confirmation_code(
    flag: u8,
    checksum: &[u8],
    owner_entropy: &[u8],
    factor_b: &SecretKey,
    derived: &[u8; 64],
    secp: &Secp256k1<All>,
) -> Bip38Result {
    let point_b = PublicKey::from_secret_key(secp, factor_b).serialize();
    let x1 = {
        let half: Vec<u8> = (0..16).map(|i| point_b[1 + i] ^ derived[i]).collect();
        crypto::aes_encrypt(&derived[32..], &half)?
    };
    let x2 = {
        let half: Vec<u8> = (0..16).map(|i| point_b[17 + i] ^ derived[16 + i]).collect();
        crypto::aes_encrypt(&derived[32..], &half)?
    };
    let payload = [
        &PRE_CONF[..],
        &[flag][..],
        checksum,
        owner_entropy,
        &[point_b[0] ^ (derived[63] & 0x01)][..],
        &x1[..],
        &x2[..],
    ]
    .concat();
    Ok(base58::encode_check(&payload))
}

/// Validate a confirmation code against a passphrase, returning the
/// committed address.
pub fn confirm_code(passphrase: &str, code: &str, network: Network) -> Bip38Result {
    confirm_code_detailed(passphrase, code, network).map(|vs| vs.address)
}

/// Validate a confirmation code against a passphrase with full details.
pub fn confirm_code_detailed(
    passphrase: &str,
    code: &str,
    network: Network,
) -> Bip38Result<Confirmed> {
    let payload = base58::decode_check(code)?;
    if payload.len() != 51 || payload[..5] != PRE_CONF {
        return Err(Error::UnexpectedPrefix);
    }
    let flag = payload[5];
    if flag & !(FLAG_COMPRESSED | FLAG_LOT_SEQ) != 0 {
        return Err(Error::UnsupportedFlag(flag));
    }
    let format = match flag & FLAG_COMPRESSED {
        0 => PubkeyFormat::Uncompressed,
        _ => PubkeyFormat::Compressed,
    };
    let has_lot_seq = flag & FLAG_LOT_SEQ != 0;
    let checksum = &payload[6..10];
    let owner_entropy = &payload[10..18];
    let encrypted_point = &payload[18..51];

    let pass_factor = pass_factor(passphrase, has_lot_seq, owner_entropy)?;
    let secp = Secp256k1::default();
    let pass_point = PublicKey::from_secret_key(&secp, &pass_factor);
    let mut derived = [0; 64];
    let salt = [checksum, owner_entropy].concat();
    crypto::scrypt_light(&pass_point.serialize(), &salt, &mut derived)?;
    let point_b = {
        let mut data = crypto::aes_decrypt(&derived[32..], &encrypted_point[1..])?;
        (0..32).for_each(|i| data[i] ^= derived[i]);
        [&[encrypted_point[0] ^ (derived[63] & 0x01)][..], &data[..]].concat()
    };
    let public_key = PublicKey::from_slice(&point_b)
        .and_then(|point| point.mul_tweak(&secp, &Scalar::from(pass_factor)))
        .map_err(|_| Error::BadPassphrase)?;
    let pub_bytes = serialize_pubkey(&public_key, format);
    let address = p2pkh_address(&pub_bytes, network);
    if address_checksum(&address)[..] != *checksum {
        return Err(Error::BadPassphrase);
    }
    Ok(Confirmed {
        address,
        public_key: pub_bytes.to_lower_hex_string(),
        format,
        lot_sequence: lot_sequence_of(has_lot_seq, owner_entropy),
    })
}

/// Decrypt an ec multiply payload (prefix 0x0143).
pub(crate) fn decrypt_ec(secret: &[u8], passphrase: &str, network: Network) -> Bip38Result<Decrypted> {
    let flag = secret[2];
    if flag & !(FLAG_COMPRESSED | FLAG_LOT_SEQ) != 0 {
        return Err(Error::UnsupportedFlag(flag));
    }
    let format = match flag & FLAG_COMPRESSED {
        0 => PubkeyFormat::Uncompressed,
        _ => PubkeyFormat::Compressed,
    };
    let has_lot_seq = flag & FLAG_LOT_SEQ != 0;
    let checksum = &secret[3..7];
    let owner_entropy = &secret[7..15];

    let pass_factor = pass_factor(passphrase, has_lot_seq, owner_entropy)?;
    let secp = Secp256k1::default();
    let pass_point = PublicKey::from_secret_key(&secp, &pass_factor);
    let mut derived = [0; 64];
    let salt = [checksum, owner_entropy].concat();
    crypto::scrypt_light(&pass_point.serialize(), &salt, &mut derived)?;

    let seed = {
        let mut tail = crypto::aes_decrypt(&derived[32..], &secret[23..39])?;
        (0..16).for_each(|i| tail[i] ^= derived[16 + i]);
        // tail now holds the second half of part1 followed by seed[16..24]
        let mut head = crypto::aes_decrypt(&derived[32..], &[&secret[15..23], &tail[..8]].concat())?;
        (0..16).for_each(|i| head[i] ^= derived[i]);
        [&head[..], &tail[8..]].concat()
    };
    let private_key = {
        let factor_b = sha256::Hash::hash(&seed).hash_again().to_byte_array();
        let inner = Scalar::from_be_bytes(factor_b)
            .map_err(|_| Error::BadPassphrase)
            .and_then(|vs| pass_factor.mul_tweak(&vs).map_err(|_| Error::BadPassphrase))?;
        PrivateKey {
            compressed: format.is_compressed(),
            network: network.kind(),
            inner,
        }
    };
    let pub_key = private_key.public_key(&secp);
    let address = p2pkh_address(&pub_key.to_bytes(), network);
    if address_checksum(&address)[..] != *checksum {
        return Err(Error::BadPassphrase);
    }
    Ok(Decrypted {
        wif: private_key.to_wif(),
        private_key: private_key.inner.secret_bytes().to_lower_hex_string(),
        public_key: pub_key.to_bytes().to_lower_hex_string(),
        format,
        address,
        seed: Some(seed.to_lower_hex_string()),
        lot_sequence: lot_sequence_of(has_lot_seq, owner_entropy),
    })
}

/// Unpack lot and sequence numbers from the owner entropy tail.
fn lot_sequence_of(has_lot_seq: bool, owner_entropy: &[u8]) -> Option<(u32, u32)> {
    has_lot_seq.then(|| {
        let n = owner_entropy[4..8]
            .iter()
            .fold(0u32, |acc, &b| acc << 8 | b as u32);
        (n / 4096, n % 4096)
    })
}

#[cfg(test)]
mod ec_test {
    use super::*;

    #[test]
    fn test_parameter_ranges() {
        let salt = [0x75, 0xed, 0x1c, 0xde, 0xb2, 0x54, 0xcb, 0x38];
        assert_eq!(
            intermediate_code("a", Some(&salt[..4]), None),
            Err(Error::InvalidOwnerSaltLength(4))
        );
        assert_eq!(
            intermediate_code("a", Some(&salt), Some((1_048_576, 1))),
            Err(Error::InvalidLot(1_048_576))
        );
        assert_eq!(
            intermediate_code("a", Some(&salt), Some((1, 4096))),
            Err(Error::InvalidSequence(4096))
        );
    }

    #[test]
    fn test_seed_length() -> Bip38Result<()> {
        let code = intermediate_code("qtum123", Some(&[1; 8]), None)?;
        assert!(code.starts_with("passphrase"));
        assert_eq!(
            create_new_encrypted_wif(&code, PubkeyFormat::Compressed, Some(&[0; 23]), Network::Mainnet),
            Err(Error::InvalidSeedLength(23))
        );
        Ok(())
    }

    #[test]
    fn test_unexpected_prefix() {
        // a non ec encrypted key is neither an intermediate nor a confirmation code
        const SECRET: &str = "6PRP4FDk4BWidB539rEWBH26DRcG2tavQg52WRcyuK5dxMdu8WHVftRZof";
        assert_eq!(
            create_new_encrypted_wif(SECRET, PubkeyFormat::Compressed, None, Network::Mainnet),
            Err(Error::UnexpectedPrefix)
        );
        assert_eq!(
            confirm_code("a", SECRET, Network::Mainnet),
            Err(Error::UnexpectedPrefix)
        );
    }
}
