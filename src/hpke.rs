//! HPKE seal/open against an Ed25519 identity key.
//!
//! Suite (RFC 9180 base mode):
//!   KEM:  DHKEM(X25519, HKDF-SHA256)
//!   KDF:  HKDF-SHA256
//!   AEAD: ChaCha20-Poly1305
//!
//! The recipient key is the same Ed25519 identity key used for signing,
//! mapped to X25519: public half via the Edwards→Montgomery birational map,
//! secret half via the clamped SHA-512 expansion (RFC 7748 §5). This mirrors
//! libsignal's single-identity-key design.
//!
//! Sealed payload wire format:
//!   [ encapsulated key (32) | ciphertext + tag (len + 16) ]
//!
//! The `info` context string is compiled in and not caller-selectable, so
//! payloads sealed here only open here — an intentional interoperability
//! boundary, not an oversight.

use hpke::{
    aead::ChaCha20Poly1305,
    kdf::HkdfSha256,
    kem::X25519HkdfSha256,
    Deserializable, Kem, OpModeR, OpModeS, Serializable,
};
use x25519_dalek::{PublicKey as X25519Public, StaticSecret};
use zeroize::{Zeroize, Zeroizing};

use crate::{
    error::BridgeError,
    identity::{IdentityKeyPair, PublicKeyBytes},
};

/// Encapsulated-key size for X25519.
pub const HPKE_ENC_LEN: usize = 32;
/// ChaCha20-Poly1305 authentication tag size.
pub const HPKE_TAG_LEN: usize = 16;
/// Fixed size delta between plaintext and sealed payload.
pub const HPKE_OVERHEAD: usize = HPKE_ENC_LEN + HPKE_TAG_LEN;

/// Context binding baked into both directions of the suite.
const HPKE_INFO: &[u8] = b"sigil-bridge/hpke/v1";

// ── Ed25519 → X25519 conversions ─────────────────────────────────────────────

/// Map an Ed25519 public key to its X25519 counterpart via the birational
/// Edwards→Montgomery map. Fails if the bytes are not a decompressible point.
pub fn ed25519_pub_to_x25519(ed_pub: &[u8; 32]) -> Result<X25519Public, BridgeError> {
    use curve25519_dalek::edwards::CompressedEdwardsY;
    let point = CompressedEdwardsY::from_slice(ed_pub)
        .map_err(|_| BridgeError::MalformedKey("bad Ed25519 public key".into()))?
        .decompress()
        .ok_or_else(|| BridgeError::MalformedKey("Ed25519 point does not decompress".into()))?;
    Ok(X25519Public::from(point.to_montgomery().to_bytes()))
}

/// Expand an Ed25519 seed into the matching X25519 static secret, using the
/// same clamped SHA-512 expansion ed25519-dalek applies internally.
pub fn ed25519_secret_to_x25519(ed_secret: &[u8; 32]) -> StaticSecret {
    use sha2::{Digest, Sha512};
    let mut h = Sha512::digest(ed_secret);
    // Clamp per RFC 7748 §5
    h[0] &= 248;
    h[31] &= 127;
    h[31] |= 64;
    let mut scalar = [0u8; 32];
    scalar.copy_from_slice(&h[..32]);
    h.as_mut_slice().zeroize();
    let secret = StaticSecret::from(scalar);
    scalar.zeroize();
    secret
}

// ── Seal / open ──────────────────────────────────────────────────────────────

/// Seal `plaintext` to the recipient's Ed25519 identity public key.
/// Output length is exactly `plaintext.len() + HPKE_OVERHEAD`.
pub fn seal(recipient: &PublicKeyBytes, plaintext: &[u8]) -> Result<Vec<u8>, BridgeError> {
    let recipient_x = ed25519_pub_to_x25519(recipient.as_bytes())?;
    let pk = <X25519HkdfSha256 as Kem>::PublicKey::from_bytes(recipient_x.as_bytes())
        .map_err(|_| BridgeError::MalformedKey("recipient key rejected by KEM".into()))?;

    let mut rng = rand::rngs::OsRng;
    let (enc, mut sender_ctx) =
        hpke::setup_sender::<ChaCha20Poly1305, HkdfSha256, X25519HkdfSha256, _>(
            &OpModeS::Base,
            &pk,
            HPKE_INFO,
            &mut rng,
        )
        .map_err(|_| BridgeError::EngineFault)?;

    let ciphertext = sender_ctx
        .seal(plaintext, b"")
        .map_err(|_| BridgeError::EngineFault)?;

    let mut out = Vec::with_capacity(HPKE_ENC_LEN + ciphertext.len());
    out.extend_from_slice(&enc.to_bytes());
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Open a sealed payload with the recipient's identity keypair.
///
/// Every ciphertext-shaped failure — truncated input, undecodable
/// encapsulated key, authentication tag mismatch — returns the same
/// `DecryptFailed`, deliberately without finer granularity.
pub fn open(identity: &IdentityKeyPair, sealed: &[u8]) -> Result<Zeroizing<Vec<u8>>, BridgeError> {
    if sealed.len() < HPKE_OVERHEAD {
        return Err(BridgeError::DecryptFailed);
    }
    let (enc_bytes, ciphertext) = sealed.split_at(HPKE_ENC_LEN);

    let secret_x = ed25519_secret_to_x25519(identity.secret_bytes());
    let sk = <X25519HkdfSha256 as Kem>::PrivateKey::from_bytes(&secret_x.to_bytes())
        .map_err(|_| BridgeError::MalformedKey("identity key rejected by KEM".into()))?;

    let enc = <X25519HkdfSha256 as Kem>::EncappedKey::from_bytes(enc_bytes)
        .map_err(|_| BridgeError::DecryptFailed)?;

    let mut receiver_ctx =
        hpke::setup_receiver::<ChaCha20Poly1305, HkdfSha256, X25519HkdfSha256>(
            &OpModeR::Base,
            &sk,
            &enc,
            HPKE_INFO,
        )
        .map_err(|_| BridgeError::DecryptFailed)?;

    receiver_ctx
        .open(ciphertext, b"")
        .map(Zeroizing::new)
        .map_err(|_| BridgeError::DecryptFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_open_roundtrip() {
        let kp = IdentityKeyPair::generate();
        let sealed = seal(&kp.public, b"attack at dawn").unwrap();
        assert_eq!(sealed.len(), b"attack at dawn".len() + HPKE_OVERHEAD);
        let opened = open(&kp, &sealed).unwrap();
        assert_eq!(&opened[..], b"attack at dawn");
    }

    #[test]
    fn empty_message_roundtrip() {
        let kp = IdentityKeyPair::generate();
        let sealed = seal(&kp.public, b"").unwrap();
        assert_eq!(sealed.len(), HPKE_OVERHEAD);
        let opened = open(&kp, &sealed).unwrap();
        assert!(opened.is_empty());
    }

    #[test]
    fn wrong_recipient_fails() {
        let kp = IdentityKeyPair::generate();
        let eve = IdentityKeyPair::generate();
        let sealed = seal(&kp.public, b"secret").unwrap();
        assert_eq!(open(&eve, &sealed).unwrap_err(), BridgeError::DecryptFailed);
    }

    #[test]
    fn every_byte_flip_fails_with_single_error_kind() {
        let kp = IdentityKeyPair::generate();
        let sealed = seal(&kp.public, b"tamper matrix").unwrap();
        // Low-bit flips: X25519 masks the top bit of the encapsulated key's
        // u-coordinate, so an 0x80 flip in its last byte would decapsulate
        // identically. Every other bit is authenticated or key-affecting.
        for i in 0..sealed.len() {
            let mut bad = sealed.clone();
            bad[i] ^= 0x01;
            assert_eq!(
                open(&kp, &bad).unwrap_err(),
                BridgeError::DecryptFailed,
                "byte {i}"
            );
        }
    }

    #[test]
    fn truncated_payload_is_decrypt_failed() {
        let kp = IdentityKeyPair::generate();
        let sealed = seal(&kp.public, b"short").unwrap();
        assert_eq!(
            open(&kp, &sealed[..HPKE_OVERHEAD - 1]).unwrap_err(),
            BridgeError::DecryptFailed
        );
        assert_eq!(open(&kp, b"").unwrap_err(), BridgeError::DecryptFailed);
    }

    #[test]
    fn conversions_agree_on_shared_point() {
        // DH(secret_a → x, pub_b → x) must equal DH(secret_b → x, pub_a → x)
        let a = IdentityKeyPair::generate();
        let b = IdentityKeyPair::generate();
        let sa = ed25519_secret_to_x25519(a.secret_bytes());
        let sb = ed25519_secret_to_x25519(b.secret_bytes());
        let pa = ed25519_pub_to_x25519(a.public.as_bytes()).unwrap();
        let pb = ed25519_pub_to_x25519(b.public.as_bytes()).unwrap();
        assert_eq!(
            sa.diffie_hellman(&pb).as_bytes(),
            sb.diffie_hellman(&pa).as_bytes()
        );
    }
}
