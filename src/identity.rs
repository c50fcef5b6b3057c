//! Identity key material.
//!
//! A single long-term Ed25519 keypair per identity. The same keypair signs
//! and, mapped to X25519 (see `hpke`), receives sealed messages — one trust
//! anchor, two roles, mirroring the Signal-style single identity key.
//!
//! Keys cross the bridge as raw fixed-length byte strings:
//!   private = 32-byte Ed25519 seed
//!   public  = 32-byte compressed Edwards point
//!   signature = 64-byte detached Ed25519 signature
//!
//! Secret halves are zeroized on drop; they are never logged anywhere in
//! this crate.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier as _, VerifyingKey};
use rand::rngs::OsRng;
use zeroize::ZeroizeOnDrop;

use crate::error::BridgeError;

/// Ed25519 seed length.
pub const PRIVATE_KEY_LEN: usize = 32;
/// Ed25519 compressed public point length.
pub const PUBLIC_KEY_LEN: usize = 32;
/// Detached Ed25519 signature length.
pub const SIGNATURE_LEN: usize = 64;

// ── Public key ───────────────────────────────────────────────────────────────

/// 32-byte Ed25519 public key, length-checked at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyBytes(pub [u8; PUBLIC_KEY_LEN]);

impl PublicKeyBytes {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, BridgeError> {
        let arr: [u8; PUBLIC_KEY_LEN] = bytes.try_into().map_err(|_| {
            BridgeError::MalformedKey(format!(
                "public key must be {PUBLIC_KEY_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.0
    }

    /// Human-readable fingerprint: BLAKE3 of the key, truncated to 20 bytes,
    /// hex in groups of 4 for manual comparison.
    pub fn fingerprint(&self) -> String {
        let hash = blake3::hash(&self.0);
        let hex = hex::encode(&hash.as_bytes()[..20]);
        hex.as_bytes()
            .chunks(4)
            .map(|c| std::str::from_utf8(c).unwrap_or_default())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// ── Identity keypair ─────────────────────────────────────────────────────────

/// Long-term identity signing key. Drop clears the secret via ZeroizeOnDrop.
#[derive(ZeroizeOnDrop)]
pub struct IdentityKeyPair {
    #[zeroize(skip)]
    pub public: PublicKeyBytes,
    secret_bytes: [u8; PRIVATE_KEY_LEN],
}

impl IdentityKeyPair {
    /// Generate a fresh keypair from the OS CSPRNG.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        let public = PublicKeyBytes(signing_key.verifying_key().to_bytes());
        Self { public, secret_bytes: signing_key.to_bytes() }
    }

    /// Reconstruct from a raw 32-byte seed. Any other length is a
    /// malformed-key error, never a silent truncation.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BridgeError> {
        let arr: [u8; PRIVATE_KEY_LEN] = bytes.try_into().map_err(|_| {
            BridgeError::MalformedKey(format!(
                "private key must be {PRIVATE_KEY_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        let signing_key = SigningKey::from_bytes(&arr);
        let public = PublicKeyBytes(signing_key.verifying_key().to_bytes());
        Ok(Self { public, secret_bytes: arr })
    }

    pub fn secret_bytes(&self) -> &[u8; PRIVATE_KEY_LEN] {
        &self.secret_bytes
    }

    fn signing_key(&self) -> SigningKey {
        SigningKey::from_bytes(&self.secret_bytes)
    }

    /// Sign arbitrary bytes; returns the 64-byte detached signature.
    pub fn sign(&self, msg: &[u8]) -> [u8; SIGNATURE_LEN] {
        self.signing_key().sign(msg).to_bytes()
    }

    /// Verify a detached signature against any Ed25519 public key.
    ///
    /// Format errors (wrong key/signature length, non-canonical point)
    /// surface as `MalformedKey`; a signature that simply does not match
    /// is `InvalidSignature`.
    pub fn verify(public_bytes: &[u8], msg: &[u8], sig_bytes: &[u8]) -> Result<(), BridgeError> {
        let pk: [u8; PUBLIC_KEY_LEN] = public_bytes.try_into().map_err(|_| {
            BridgeError::MalformedKey(format!(
                "public key must be {PUBLIC_KEY_LEN} bytes, got {}",
                public_bytes.len()
            ))
        })?;
        let vk = VerifyingKey::from_bytes(&pk)
            .map_err(|e| BridgeError::MalformedKey(e.to_string()))?;
        let sig: [u8; SIGNATURE_LEN] = sig_bytes.try_into().map_err(|_| {
            BridgeError::MalformedKey(format!(
                "signature must be {SIGNATURE_LEN} bytes, got {}",
                sig_bytes.len()
            ))
        })?;
        vk.verify(msg, &Signature::from_bytes(&sig))
            .map_err(|_| BridgeError::InvalidSignature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_verify_roundtrip() {
        let kp = IdentityKeyPair::generate();
        let sig = kp.sign(b"hello bridge");
        IdentityKeyPair::verify(kp.public.as_bytes(), b"hello bridge", &sig).unwrap();
    }

    #[test]
    fn sign_verify_empty_message() {
        let kp = IdentityKeyPair::generate();
        let sig = kp.sign(b"");
        IdentityKeyPair::verify(kp.public.as_bytes(), b"", &sig).unwrap();
    }

    #[test]
    fn derive_is_deterministic() {
        let kp = IdentityKeyPair::generate();
        let again = IdentityKeyPair::from_bytes(kp.secret_bytes()).unwrap();
        assert_eq!(kp.public, again.public);
    }

    #[test]
    fn every_sig_byte_flip_is_invalid_signature() {
        let kp = IdentityKeyPair::generate();
        let msg = b"flip me";
        let sig = kp.sign(msg);
        for i in 0..SIGNATURE_LEN {
            let mut bad = sig;
            bad[i] ^= 0x01;
            // Includes flips that make the R point non-canonical: those must
            // still come back as InvalidSignature, not a parse error or panic.
            let err = IdentityKeyPair::verify(kp.public.as_bytes(), msg, &bad).unwrap_err();
            assert_eq!(err, BridgeError::InvalidSignature, "byte {i}");
        }
    }

    #[test]
    fn wrong_length_key_is_malformed_not_invalid() {
        let kp = IdentityKeyPair::generate();
        let sig = kp.sign(b"m");
        let err = IdentityKeyPair::verify(&kp.public.as_bytes()[..31], b"m", &sig).unwrap_err();
        assert!(matches!(err, BridgeError::MalformedKey(_)));

        // No unwrap_err here: the keypair deliberately has no Debug impl.
        assert!(matches!(
            IdentityKeyPair::from_bytes(&[0u8; 33]),
            Err(BridgeError::MalformedKey(_))
        ));
    }

    #[test]
    fn fingerprint_is_stable_and_grouped() {
        let kp = IdentityKeyPair::generate();
        let fp = kp.public.fingerprint();
        assert_eq!(fp, kp.public.fingerprint());
        assert_eq!(fp.split(' ').count(), 10);
    }
}
