use qtum_bip38::*;

const PASSPHRASE: &str = "qtum123";
const OWNER_SALT: &str = "75ed1cdeb254cb38";
const SEED: &str = "99241d58245c883896f80843d2846672d7312e6195ca1a6c";

struct Vector {
    lot_sequence: Option<(u32, u32)>,
    format: PubkeyFormat,
    encrypted_wif: &'static str,
    private_key: Option<&'static str>,
    address: &'static str,
}

const VECTORS: &[Vector] = &[
    Vector {
        lot_sequence: None,
        format: PubkeyFormat::Uncompressed,
        encrypted_wif: "6PfMmFWzXobLGrJReqJaNnGcaCMd9T3Xhcwp2jkCHZ6jZoDJ2MnKk15ZuV",
        private_key: Some("34de039d8e90172f246ec3190fc8bd98e46f11bc5d50d062d0d6f806e43372a9"),
        address: "QXsy25WUg3kARS1o4t8si4AsyuwZjLkY9R",
    },
    Vector {
        lot_sequence: Some((567885, 1)),
        format: PubkeyFormat::Uncompressed,
        encrypted_wif: "6PgLaWLw6fb6uDBtnN6QVyT9AbvN4zFi8E4oLdSiEWCqsHZFAtcY4wP4LW",
        private_key: Some("e1013f4521ffeefb06aad092a040189075a5163af3c6cb7ca1622cbea2d498fc"),
        address: "QfAtAjYNEQMAVtxNaXCWcg1rws3ubJJAED",
    },
    Vector {
        lot_sequence: None,
        format: PubkeyFormat::Compressed,
        encrypted_wif: "6PnQ3P5GdsSJSUcJCAmtvn74U9gqPs8JMZLdVBkBYsUvSVd4TjgSZEqB7w",
        // same owner salt and seed as the uncompressed key above
        private_key: Some("34de039d8e90172f246ec3190fc8bd98e46f11bc5d50d062d0d6f806e43372a9"),
        address: "QS3xSF9psn8DMT6uBExPDkm258eJPqJbsB",
    },
    Vector {
        lot_sequence: Some((369861, 1)),
        format: PubkeyFormat::Compressed,
        encrypted_wif: "6PoLtrDYSMopr5nRKDN9LDanSPiSPRQ3vkfmT2gj4c3E3S5FeGTmyuG12z",
        private_key: None,
        address: "QQ2yBHc39h3Fyb8AnKuwtw1Soxpq9f4GRt",
    },
];

#[test]
fn create_and_decrypt() -> Bip38Result<()> {
    let salt = hex::decode(OWNER_SALT).expect("salt");
    let seed = hex::decode(SEED).expect("seed");
    for vector in VECTORS {
        let code = intermediate_code(PASSPHRASE, Some(&salt), vector.lot_sequence)?;
        assert!(code.starts_with("passphrase"));

        let created = create_new_encrypted_wif(&code, vector.format, Some(&seed), Network::Mainnet)?;
        assert_eq!(created.encrypted_wif, vector.encrypted_wif);
        assert_eq!(created.address, vector.address);
        assert_eq!(created.seed, SEED);
        assert!(created.confirmation_code.starts_with("cfrm38"));

        let details =
            bip38_decrypt_detailed(&created.encrypted_wif, PASSPHRASE, Network::Mainnet)?;
        assert_eq!(details.address, vector.address);
        assert_eq!(details.public_key, created.public_key);
        assert_eq!(details.format, vector.format);
        assert_eq!(details.seed.as_deref(), Some(SEED));
        assert_eq!(details.lot_sequence, vector.lot_sequence);
        if let Some(private_key) = vector.private_key {
            assert_eq!(details.private_key, private_key);
        }

        let confirmed =
            confirm_code_detailed(PASSPHRASE, &created.confirmation_code, Network::Mainnet)?;
        assert_eq!(confirmed.address, vector.address);
        assert_eq!(confirmed.public_key, created.public_key);
        assert_eq!(confirmed.format, vector.format);
        assert_eq!(confirmed.lot_sequence, vector.lot_sequence);
    }
    Ok(())
}

#[test]
fn wrong_passphrase() -> Bip38Result<()> {
    let salt = hex::decode(OWNER_SALT).expect("salt");
    let code = intermediate_code(PASSPHRASE, Some(&salt), None)?;
    // random seed
    let created = create_new_encrypted_wif(&code, PubkeyFormat::Compressed, None, Network::Mainnet)?;
    assert_eq!(
        bip38_decrypt(&created.encrypted_wif, "qtum321", Network::Mainnet),
        Err(Error::BadPassphrase)
    );
    assert_eq!(
        confirm_code("qtum321", &created.confirmation_code, Network::Mainnet),
        Err(Error::BadPassphrase)
    );
    Ok(())
}
