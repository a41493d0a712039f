use openssl::hash::MessageDigest;
use openssl::pkey::{PKey, Private, Public};
use openssl::rsa::Rsa;
use openssl::sign::{Signer, Verifier};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use std::fmt;

/// Key strength used by the identity proof demonstration (RSA, e = 65537)
pub const DEFAULT_KEY_BITS: u32 = 2048;

/// Errors that can occur during cryptographic operations
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Failed to generate keypair: {0}")]
    KeypairGeneration(String),

    #[error("Failed to sign message: {0}")]
    Signing(String),

    #[error("Invalid signature encoding: {0}")]
    InvalidSignature(String),

    #[error("Invalid key material: {0}")]
    InvalidKey(String),
}

/// Represents a digital signature, hex encoded for transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigitalSignature(pub String);

impl DigitalSignature {
    /// Wraps raw signature bytes
    pub fn from_bytes(bytes: &[u8]) -> Self {
        DigitalSignature(hex::encode(bytes))
    }

    /// Decodes the signature back into raw bytes
    ///
    /// Fails only when the wrapper does not contain valid hex, which is a
    /// malformed encoding rather than a well-formed signature that simply
    /// does not verify.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CryptoError> {
        hex::decode(&self.0).map_err(|e| CryptoError::InvalidSignature(e.to_string()))
    }
}

impl fmt::Display for DigitalSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An RSA key pair for signing and verification
///
/// The private half signs; the public half verifies and is the only part
/// that is safe to hand out. Keys live only in memory and are never written
/// to the chain or to disk.
pub struct KeyPair {
    private_key: PKey<Private>,
    public_key: PKey<Public>,
}

impl KeyPair {
    /// Generates a fresh RSA key pair of the given bit strength
    ///
    /// # Arguments
    ///
    /// * `bits` - Modulus size in bits (the demonstration uses 2048)
    ///
    /// # Returns
    ///
    /// A new KeyPair, or an error if key generation fails
    pub fn generate(bits: u32) -> Result<Self, CryptoError> {
        let rsa = Rsa::generate(bits).map_err(|e| CryptoError::KeypairGeneration(e.to_string()))?;
        let private_key =
            PKey::from_rsa(rsa).map_err(|e| CryptoError::KeypairGeneration(e.to_string()))?;

        // Extract the shareable public half via a DER round trip
        let der = private_key
            .public_key_to_der()
            .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
        let public_key =
            PKey::public_key_from_der(&der).map_err(|e| CryptoError::InvalidKey(e.to_string()))?;

        Ok(KeyPair {
            private_key,
            public_key,
        })
    }

    /// Gets the public key
    pub fn public_key(&self) -> &PKey<Public> {
        &self.public_key
    }

    /// Signs a message with the private key
    ///
    /// Uses SHA-256 with PKCS#1 v1.5 padding, binding the exact message
    /// bytes: any later change to the message invalidates the signature.
    ///
    /// # Arguments
    ///
    /// * `message` - The message bytes to sign
    ///
    /// # Returns
    ///
    /// The signature, or an error for malformed key material
    pub fn sign(&self, message: &[u8]) -> Result<DigitalSignature, CryptoError> {
        let mut signer = Signer::new(MessageDigest::sha256(), &self.private_key)
            .map_err(|e| CryptoError::Signing(e.to_string()))?;
        signer
            .update(message)
            .map_err(|e| CryptoError::Signing(e.to_string()))?;
        let bytes = signer
            .sign_to_vec()
            .map_err(|e| CryptoError::Signing(e.to_string()))?;

        Ok(DigitalSignature::from_bytes(&bytes))
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("private_key", &"[REDACTED]")
            .field("public_key", &"PKey<Public>")
            .finish()
    }
}

/// Verifies a signature against a message and public key
///
/// Returns `Ok(true)` only if the signature was produced over exactly
/// `message` by the private key paired with `public_key`. Wrong key,
/// tampered message or corrupted signature bytes all yield `Ok(false)`:
/// failing to verify is a normal outcome, not an error. `Err` is reserved
/// for a malformed signature encoding.
pub fn verify_signature(
    message: &[u8],
    signature: &DigitalSignature,
    public_key: &PKey<Public>,
) -> Result<bool, CryptoError> {
    let signature_bytes = signature.to_bytes()?;

    let mut verifier = Verifier::new(MessageDigest::sha256(), public_key)
        .map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
    if verifier.update(message).is_err() {
        return Ok(false);
    }

    // openssl reports undecodable signature bytes as an error; for callers
    // that is just another flavor of "does not verify"
    Ok(verifier.verify(&signature_bytes).unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypair_generation() {
        let keypair = KeyPair::generate(DEFAULT_KEY_BITS).unwrap();
        assert_eq!(keypair.public_key().bits(), DEFAULT_KEY_BITS);
    }

    #[test]
    fn test_signing_and_verification() {
        let keypair = KeyPair::generate(DEFAULT_KEY_BITS).unwrap();
        let message = b"0x8959404600a476dd57f2ca080fa4a69fcee73797148241";

        let signature = keypair.sign(message).unwrap();

        let result = verify_signature(message, &signature, keypair.public_key()).unwrap();
        assert!(result);

        // Verify with wrong message
        let result = verify_signature(b"some other message", &signature, keypair.public_key()).unwrap();
        assert!(!result);
    }

    #[test]
    fn test_unrelated_key_rejects() {
        let signer = KeyPair::generate(DEFAULT_KEY_BITS).unwrap();
        let stranger = KeyPair::generate(DEFAULT_KEY_BITS).unwrap();
        let message = b"signed by the first keypair";

        let signature = signer.sign(message).unwrap();

        let result = verify_signature(message, &signature, stranger.public_key()).unwrap();
        assert!(!result);
    }

    #[test]
    fn test_corrupted_signature_rejects() {
        let keypair = KeyPair::generate(DEFAULT_KEY_BITS).unwrap();
        let message = b"corrupt me";

        let signature = keypair.sign(message).unwrap();
        let mut bytes = signature.to_bytes().unwrap();
        bytes[0] ^= 0xff;
        let corrupted = DigitalSignature::from_bytes(&bytes);

        let result = verify_signature(message, &corrupted, keypair.public_key()).unwrap();
        assert!(!result);
    }

    #[test]
    fn test_malformed_signature_encoding_is_an_error() {
        let keypair = KeyPair::generate(DEFAULT_KEY_BITS).unwrap();
        let not_hex = DigitalSignature("zz-not-hex".to_string());

        let result = verify_signature(b"whatever", &not_hex, keypair.public_key());
        assert!(matches!(result, Err(CryptoError::InvalidSignature(_))));
    }

    #[test]
    fn test_signing_is_deterministic() {
        // PKCS#1 v1.5 has no randomized component
        let keypair = KeyPair::generate(DEFAULT_KEY_BITS).unwrap();
        let message = b"same message";

        assert_eq!(keypair.sign(message).unwrap(), keypair.sign(message).unwrap());
    }
}
