//! Integrity signature over the exported header and body.
//!
//! With a key pair the payload is signed with ECDSA P-256/SHA-256 (RFC 6979
//! deterministic nonces, so repeated exports sign identically). Without one,
//! or when the key cannot be used, a SHA-256 digest is produced instead.
//! Signing never fails an export.

use std::fmt;

use p256::ecdsa::signature::{Signer as _, Verifier as _};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::warn;

use super::error::SignatureError;

/// Signature algorithm recorded in the artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureAlgorithm {
    /// ECDSA over P-256 with SHA-256.
    #[serde(rename = "ECDSA-P256-SHA256")]
    EcdsaP256Sha256,
    /// Plain SHA-256 digest.
    #[serde(rename = "SHA256-DIGEST")]
    Sha256Digest,
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EcdsaP256Sha256 => write!(f, "ECDSA-P256-SHA256"),
            Self::Sha256Digest => write!(f, "SHA256-DIGEST"),
        }
    }
}

/// Signature over the header and body of an export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureBlock {
    /// Algorithm used.
    pub algorithm: SignatureAlgorithm,
    /// Hex of the raw `r || s` signature, or of the digest.
    pub hex_value: String,
    /// Hex of the uncompressed SEC1 public key, for asymmetric signatures.
    pub public_key: Option<String>,
}

impl SignatureBlock {
    /// Returns true for an ECDSA signature.
    #[must_use]
    pub fn is_asymmetric(&self) -> bool {
        self.algorithm == SignatureAlgorithm::EcdsaP256Sha256
    }
}

/// Raw key material supplied by the hosting environment.
///
/// Bytes are imported lazily by the signer so a bad key degrades to digest
/// signing instead of failing the export.
#[derive(Clone)]
pub struct KeyPair {
    private_key: Vec<u8>,
    public_key: Option<Vec<u8>>,
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("private_key", &"<redacted>")
            .field("public_key", &self.public_key.as_ref().map(hex::encode))
            .finish()
    }
}

impl KeyPair {
    /// Wraps raw private scalar bytes and an optional SEC1 public key.
    #[must_use]
    pub fn from_bytes(private_key: Vec<u8>, public_key: Option<Vec<u8>>) -> Self {
        Self {
            private_key,
            public_key,
        }
    }

    /// Decodes hex key material.
    ///
    /// # Errors
    ///
    /// Returns an error if either value is not valid hex.
    pub fn from_hex(private_hex: &str, public_hex: Option<&str>) -> Result<Self, SignatureError> {
        let private_key = hex::decode(private_hex.trim())
            .map_err(|e| SignatureError::InvalidEncoding(e.to_string()))?;
        let public_key = public_hex
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(hex::decode)
            .transpose()
            .map_err(|e| SignatureError::InvalidEncoding(e.to_string()))?;
        Ok(Self::from_bytes(private_key, public_key))
    }

    /// Imports the signing key, checking the public key if one was given.
    ///
    /// # Errors
    ///
    /// Returns an error if the scalar is invalid or the public key does not
    /// belong to it.
    pub fn signing_key(&self) -> Result<SigningKey, SignatureError> {
        let signing_key = SigningKey::from_slice(&self.private_key)
            .map_err(|e| SignatureError::InvalidPrivateKey(e.to_string()))?;

        if let Some(public) = &self.public_key {
            let supplied = VerifyingKey::from_sec1_bytes(public)
                .map_err(|e| SignatureError::InvalidPublicKey(e.to_string()))?;
            if &supplied != signing_key.verifying_key() {
                return Err(SignatureError::KeyMismatch);
            }
        }
        Ok(signing_key)
    }

    /// Hex of the uncompressed SEC1 public key derived from the private key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be imported.
    pub fn public_key_hex(&self) -> Result<String, SignatureError> {
        let signing_key = self.signing_key()?;
        Ok(encode_public_key(signing_key.verifying_key()))
    }
}

fn encode_public_key(key: &VerifyingKey) -> String {
    hex::encode(key.to_encoded_point(false).as_bytes())
}

/// SHA-256 digest block of `content`.
#[must_use]
pub fn digest_block(content: &[u8]) -> SignatureBlock {
    SignatureBlock {
        algorithm: SignatureAlgorithm::Sha256Digest,
        hex_value: hex::encode(Sha256::digest(content)),
        public_key: None,
    }
}

/// Signs `content` synchronously, degrading to a digest on any key problem.
#[must_use]
pub fn sign_blocking(content: &[u8], key_pair: Option<&KeyPair>) -> SignatureBlock {
    let Some(key_pair) = key_pair else {
        return digest_block(content);
    };

    match key_pair.signing_key() {
        Ok(signing_key) => {
            let signature: Signature = signing_key.sign(content);
            SignatureBlock {
                algorithm: SignatureAlgorithm::EcdsaP256Sha256,
                hex_value: hex::encode(signature.to_bytes()),
                public_key: Some(encode_public_key(signing_key.verifying_key())),
            }
        }
        Err(e) => {
            warn!(
                error = %e,
                error_code = e.error_code(),
                "Signing key unusable, falling back to digest"
            );
            digest_block(content)
        }
    }
}

/// Signs `content` on the Tokio blocking pool, or inline when no Tokio
/// runtime is running.
///
/// The caller must await this before rendering anything that embeds the
/// signature.
pub async fn sign(content: &[u8], key_pair: Option<&KeyPair>) -> SignatureBlock {
    let Ok(handle) = tokio::runtime::Handle::try_current() else {
        return sign_blocking(content, key_pair);
    };
    let payload = content.to_vec();
    let key_pair = key_pair.cloned();

    match handle
        .spawn_blocking(move || sign_blocking(&payload, key_pair.as_ref()))
        .await
    {
        Ok(block) => block,
        Err(e) => {
            warn!(error = %e, "Signing task failed, falling back to digest");
            digest_block(content)
        }
    }
}

/// Checks a signature block against `content`.
///
/// # Errors
///
/// Returns an error if the block is malformed or does not match.
pub fn verify_signature(content: &[u8], block: &SignatureBlock) -> Result<(), SignatureError> {
    match block.algorithm {
        SignatureAlgorithm::Sha256Digest => {
            let expected = hex::encode(Sha256::digest(content));
            if expected.eq_ignore_ascii_case(&block.hex_value) {
                Ok(())
            } else {
                Err(SignatureError::DigestMismatch)
            }
        }
        SignatureAlgorithm::EcdsaP256Sha256 => {
            let public_hex = block
                .public_key
                .as_deref()
                .ok_or(SignatureError::MissingPublicKey)?;
            let public = hex::decode(public_hex)
                .map_err(|e| SignatureError::InvalidEncoding(e.to_string()))?;
            let verifying_key = VerifyingKey::from_sec1_bytes(&public)
                .map_err(|e| SignatureError::InvalidPublicKey(e.to_string()))?;

            let raw = hex::decode(&block.hex_value)
                .map_err(|e| SignatureError::InvalidSignature(e.to_string()))?;
            let signature = Signature::from_slice(&raw)
                .map_err(|e| SignatureError::InvalidSignature(e.to_string()))?;

            verifying_key
                .verify(content, &signature)
                .map_err(|_| SignatureError::VerificationFailed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::test_support::TEST_PRIVATE_KEY;
    use std::pin::pin;
    use std::task::{Context, Poll, Waker};

    fn test_key() -> KeyPair {
        KeyPair::from_hex(TEST_PRIVATE_KEY, None).unwrap()
    }

    #[test]
    fn test_digest_without_key() {
        let block = sign_blocking(b"abc", None);
        assert_eq!(block.algorithm, SignatureAlgorithm::Sha256Digest);
        assert_eq!(
            block.hex_value,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert!(block.public_key.is_none());
        assert!(verify_signature(b"abc", &block).is_ok());
        assert!(matches!(
            verify_signature(b"abd", &block),
            Err(SignatureError::DigestMismatch)
        ));
    }

    #[test]
    fn test_ecdsa_with_key() {
        let key = test_key();
        let block = sign_blocking(b"header\nbody", Some(&key));

        assert_eq!(block.algorithm, SignatureAlgorithm::EcdsaP256Sha256);
        assert_eq!(block.hex_value.len(), 128);
        let public = block.public_key.clone().unwrap();
        assert_eq!(public.len(), 130);
        assert!(public.starts_with("04"));
        assert_eq!(public, key.public_key_hex().unwrap());

        assert!(verify_signature(b"header\nbody", &block).is_ok());
        assert!(matches!(
            verify_signature(b"header\nbodY", &block),
            Err(SignatureError::VerificationFailed)
        ));
    }

    #[test]
    fn test_ecdsa_is_deterministic() {
        let key = test_key();
        assert_eq!(
            sign_blocking(b"payload", Some(&key)),
            sign_blocking(b"payload", Some(&key))
        );
    }

    #[test]
    fn test_matching_public_key_is_accepted() {
        let public = test_key().public_key_hex().unwrap();
        let key = KeyPair::from_hex(TEST_PRIVATE_KEY, Some(&public)).unwrap();
        let block = sign_blocking(b"x", Some(&key));
        assert!(block.is_asymmetric());
    }

    #[test]
    fn test_invalid_key_degrades_to_digest() {
        let zero = KeyPair::from_bytes(vec![0u8; 32], None);
        assert!(matches!(
            zero.signing_key(),
            Err(SignatureError::InvalidPrivateKey(_))
        ));
        let block = sign_blocking(b"x", Some(&zero));
        assert_eq!(block.algorithm, SignatureAlgorithm::Sha256Digest);

        let short = KeyPair::from_bytes(vec![1u8; 5], None);
        assert_eq!(
            sign_blocking(b"x", Some(&short)).algorithm,
            SignatureAlgorithm::Sha256Digest
        );
    }

    #[test]
    fn test_mismatched_public_key_degrades_to_digest() {
        let mut other = [0u8; 32];
        other[31] = 7;
        let other_public = KeyPair::from_bytes(other.to_vec(), None)
            .public_key_hex()
            .unwrap();
        let key = KeyPair::from_hex(TEST_PRIVATE_KEY, Some(&other_public)).unwrap();

        assert!(matches!(key.signing_key(), Err(SignatureError::KeyMismatch)));
        assert_eq!(
            sign_blocking(b"x", Some(&key)).algorithm,
            SignatureAlgorithm::Sha256Digest
        );
    }

    #[test]
    fn test_from_hex_rejects_bad_encoding() {
        assert!(matches!(
            KeyPair::from_hex("zz", None),
            Err(SignatureError::InvalidEncoding(_))
        ));
        assert!(matches!(
            KeyPair::from_hex(TEST_PRIVATE_KEY, Some("abc")),
            Err(SignatureError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let rendered = format!("{:?}", test_key());
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains(TEST_PRIVATE_KEY));
    }

    #[test]
    fn test_verify_requires_public_key() {
        let mut block = sign_blocking(b"x", Some(&test_key()));
        block.public_key = None;
        assert!(matches!(
            verify_signature(b"x", &block),
            Err(SignatureError::MissingPublicKey)
        ));
    }

    #[test]
    fn test_sign_completes_without_runtime() {
        let key = test_key();
        let mut future = pin!(sign(b"payload", Some(&key)));
        let mut cx = Context::from_waker(Waker::noop());

        match future.as_mut().poll(&mut cx) {
            Poll::Ready(block) => assert_eq!(block, sign_blocking(b"payload", Some(&key))),
            Poll::Pending => panic!("signing should finish inline without a runtime"),
        }
    }

    #[tokio::test]
    async fn test_async_sign_matches_blocking() {
        let key = test_key();
        assert_eq!(
            sign(b"payload", Some(&key)).await,
            sign_blocking(b"payload", Some(&key))
        );
        assert_eq!(
            sign(b"payload", None).await.algorithm,
            SignatureAlgorithm::Sha256Digest
        );
    }
}
