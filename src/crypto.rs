use crate::error::Error;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit, generic_array::GenericArray};
use unicode_normalization::UnicodeNormalization;

/// Passphrase bytes: NFC normalized, utf-8 encoded.
pub(crate) fn normalize(passphrase: &str) -> Vec<u8> {
    passphrase.nfc().collect::<String>().into_bytes()
}

/// scrypt with the passphrase grade parameters: N = 16384, r = 8, p = 8.
pub(crate) fn scrypt_strong(password: &[u8], salt: &[u8], output: &mut [u8]) -> Result<(), Error> {
    let params = scrypt::Params::new(14, 8, 8, output.len())?;
    scrypt::scrypt(password, salt, &params, output)?;
    Ok(())
}

/// scrypt with the per key parameters: N = 1024, r = 1, p = 1.
pub(crate) fn scrypt_light(password: &[u8], salt: &[u8], output: &mut [u8]) -> Result<(), Error> {
    let params = scrypt::Params::new(10, 1, 1, output.len())?;
    scrypt::scrypt(password, salt, &params, output)?;
    Ok(())
}

/// AES-256-ECB without padding. Trailing bytes after the last whole
/// 16 byte block pass through untouched.
pub(crate) fn aes_encrypt(key: &[u8], data: &[u8]) -> Result<Vec<u8>, Error> {
    let cipher = aes::Aes256::new_from_slice(key)?;
    let mut out = data.to_vec();
    out.chunks_exact_mut(16)
        .for_each(|block| cipher.encrypt_block(GenericArray::from_mut_slice(block)));
    Ok(out)
}

pub(crate) fn aes_decrypt(key: &[u8], data: &[u8]) -> Result<Vec<u8>, Error> {
    let cipher = aes::Aes256::new_from_slice(key)?;
    let mut out = data.to_vec();
    out.chunks_exact_mut(16)
        .for_each(|block| cipher.decrypt_block(GenericArray::from_mut_slice(block)));
    Ok(out)
}

#[cfg(test)]
mod crypto_test {
    use super::*;

    #[test]
    fn test_normalize() {
        // U+0041 U+030A composes to U+00C5
        assert_eq!(normalize("A\u{30a}"), "\u{c5}".as_bytes());
        assert_eq!(normalize("qtum123"), b"qtum123");
    }

    #[test]
    fn test_aes_ecb() -> Result<(), Error> {
        const KEY: [u8; 32] = [7; 32];
        const DATA: [u8; 32] = [42; 32];
        let encrypted = aes_encrypt(&KEY, &DATA)?;
        assert_ne!(encrypted[..], DATA[..]);
        // ecb: equal blocks encrypt equally
        assert_eq!(encrypted[..16], encrypted[16..]);
        assert_eq!(aes_decrypt(&KEY, &encrypted)?[..], DATA[..]);
        Ok(())
    }
}
