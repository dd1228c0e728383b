use crate::errors::{FairnessError, FairnessResult};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Hash capability the fairness algorithms are written against.
///
/// Derivation and commitment checks only ever see this trait, so a runtime
/// with its own crypto backend can plug in without touching the algorithms.
pub trait FairnessHasher: Send + Sync {
    /// SHA-256 of `data`
    fn sha256(&self, data: &[u8]) -> [u8; 32];

    /// HMAC-SHA256 keyed with `key` over `message`
    fn hmac_sha256(&self, key: &[u8], message: &[u8]) -> FairnessResult<[u8; 32]>;
}

/// Default hasher backed by the RustCrypto `sha2`/`hmac` crates
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl FairnessHasher for Sha256Hasher {
    fn sha256(&self, data: &[u8]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(data);
        hasher.finalize().into()
    }

    fn hmac_sha256(&self, key: &[u8], message: &[u8]) -> FairnessResult<[u8; 32]> {
        let mut mac = HmacSha256::new_from_slice(key)
            .map_err(|e| FairnessError::HashPrimitive(format!("HMAC key rejected: {}", e)))?;
        mac.update(message);
        Ok(mac.finalize().into_bytes().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fairness::commitment::{
        check_commitment_with, verify_commitment_with, CommitmentCheck,
    };
    use crate::fairness::outcome::derive_outcome_with;

    /// Returns constant digests so results are easy to predict
    struct FixedHasher;

    impl FairnessHasher for FixedHasher {
        fn sha256(&self, _data: &[u8]) -> [u8; 32] {
            [0xab; 32]
        }

        fn hmac_sha256(&self, _key: &[u8], _message: &[u8]) -> FairnessResult<[u8; 32]> {
            Ok([0xff; 32])
        }
    }

    struct BrokenHasher;

    impl FairnessHasher for BrokenHasher {
        fn sha256(&self, _data: &[u8]) -> [u8; 32] {
            [0; 32]
        }

        fn hmac_sha256(&self, _key: &[u8], _message: &[u8]) -> FairnessResult<[u8; 32]> {
            Err(FairnessError::HashPrimitive("backend unavailable".to_string()))
        }
    }

    #[test]
    fn test_sha256_known_vectors() {
        let hasher = Sha256Hasher;
        assert_eq!(
            hex::encode(hasher.sha256(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            hex::encode(hasher.sha256(b"seed123")),
            "363c4b5df77dfec7bba98f7b8c62c6dbbf66764e834c8e21a209fe699b6bec91"
        );
    }

    #[test]
    fn test_hmac_sha256_known_vector() {
        let digest = Sha256Hasher
            .hmac_sha256(b"seed123", b"abc-0")
            .expect("HMAC failed");
        assert_eq!(
            hex::encode(digest),
            "6999a74585c4b361c6c9a53285f570f1a7835c2208d0ac3eeb962fd6ec7e579e"
        );
    }

    #[test]
    fn test_hmac_accepts_empty_key() {
        assert!(Sha256Hasher.hmac_sha256(b"", b"message").is_ok());
    }

    #[test]
    fn test_custom_hasher_drives_derivation() {
        let derivation = derive_outcome_with(&FixedHasher, "seed123", "abc", 0, 10).unwrap();
        assert_eq!(derivation.hmac_hex, "ff".repeat(32));
        assert_eq!(derivation.raw_value, 0xfffff);
        assert_eq!(derivation.result_index, 0xfffff % 10);
    }

    #[test]
    fn test_custom_hasher_drives_commitment() {
        let hashed = "ab".repeat(32);
        assert_eq!(
            check_commitment_with(&FixedHasher, &hashed, "any seed").unwrap(),
            CommitmentCheck::Match
        );
        assert!(!verify_commitment_with(&Sha256Hasher, &hashed, "any seed"));
    }

    #[test]
    fn test_hash_failure_reaches_caller() {
        let err = derive_outcome_with(&BrokenHasher, "seed123", "abc", 0, 5).unwrap_err();
        assert!(matches!(err, FairnessError::HashPrimitive(_)));
        assert!(!err.is_invalid_input());
    }
}
