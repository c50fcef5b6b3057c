//! The buffer/size contract: one safe entry point per bridge operation.
//!
//! Contract rules, shared by every function here:
//! - output capacity is validated before any cryptographic work;
//! - results are staged internally and copied into the caller's buffer only
//!   once the whole operation has succeeded, so a failed call leaves the
//!   output bytes exactly as the caller provided them;
//! - success returns the number of bytes written, failure a `BridgeError`;
//! - an engine result that would exceed the declared capacity is an
//!   `EngineFault`, never a silent truncation;
//! - every entry point checks `engine::ensure_ready()` first.
//!
//! The `ffi` module wraps these in the raw-pointer C ABI.

use zeroize::Zeroizing;

use crate::{
    engine,
    error::BridgeError,
    hpke::{self, HPKE_OVERHEAD},
    identity::{IdentityKeyPair, PublicKeyBytes, PRIVATE_KEY_LEN, PUBLIC_KEY_LEN, SIGNATURE_LEN},
};

fn ensure_capacity(out: &[u8], needed: usize) -> Result<(), BridgeError> {
    if out.len() < needed {
        return Err(BridgeError::InsufficientCapacity { needed, available: out.len() });
    }
    Ok(())
}

/// Fill `out` with a freshly generated 32-byte private key.
pub fn generate_private_key(out: &mut [u8]) -> Result<usize, BridgeError> {
    engine::ensure_ready()?;
    ensure_capacity(out, PRIVATE_KEY_LEN)?;
    let kp = IdentityKeyPair::generate();
    out[..PRIVATE_KEY_LEN].copy_from_slice(kp.secret_bytes());
    Ok(PRIVATE_KEY_LEN)
}

/// Deterministically derive the public key for a 32-byte private key.
pub fn derive_public_key(private_key: &[u8], out: &mut [u8]) -> Result<usize, BridgeError> {
    engine::ensure_ready()?;
    let kp = IdentityKeyPair::from_bytes(private_key)?;
    ensure_capacity(out, PUBLIC_KEY_LEN)?;
    out[..PUBLIC_KEY_LEN].copy_from_slice(kp.public.as_bytes());
    Ok(PUBLIC_KEY_LEN)
}

/// Generate a keypair and write both halves atomically: both capacities are
/// validated before either buffer is touched, so on failure neither holds
/// partial key material.
pub fn generate_identity_keypair(
    private_out: &mut [u8],
    public_out: &mut [u8],
) -> Result<(usize, usize), BridgeError> {
    engine::ensure_ready()?;
    ensure_capacity(private_out, PRIVATE_KEY_LEN)?;
    ensure_capacity(public_out, PUBLIC_KEY_LEN)?;
    let kp = IdentityKeyPair::generate();
    private_out[..PRIVATE_KEY_LEN].copy_from_slice(kp.secret_bytes());
    public_out[..PUBLIC_KEY_LEN].copy_from_slice(kp.public.as_bytes());
    Ok((PRIVATE_KEY_LEN, PUBLIC_KEY_LEN))
}

/// Sign `message`; writes the 64-byte detached signature.
pub fn sign(private_key: &[u8], message: &[u8], out: &mut [u8]) -> Result<usize, BridgeError> {
    engine::ensure_ready()?;
    let kp = IdentityKeyPair::from_bytes(private_key)?;
    ensure_capacity(out, SIGNATURE_LEN)?;
    let sig = kp.sign(message);
    out[..SIGNATURE_LEN].copy_from_slice(&sig);
    Ok(SIGNATURE_LEN)
}

/// Verify a detached signature. Canonical success value is `Ok(0)`; a
/// signature that does not match is `InvalidSignature`, format problems
/// are `MalformedKey`.
pub fn verify(public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<usize, BridgeError> {
    engine::ensure_ready()?;
    IdentityKeyPair::verify(public_key, message, signature)?;
    Ok(0)
}

/// HPKE-seal `message` to a recipient public key. The capacity check against
/// `message.len() + HPKE_OVERHEAD` runs before any cryptographic work.
pub fn hpke_seal(
    recipient_public: &[u8],
    message: &[u8],
    out: &mut [u8],
) -> Result<usize, BridgeError> {
    engine::ensure_ready()?;
    let recipient = PublicKeyBytes::from_slice(recipient_public)?;
    let needed = message.len() + HPKE_OVERHEAD;
    ensure_capacity(out, needed)?;
    let sealed = hpke::seal(&recipient, message)?;
    if sealed.len() != needed {
        return Err(BridgeError::EngineFault);
    }
    out[..needed].copy_from_slice(&sealed);
    Ok(needed)
}

/// Open a sealed payload; writes `sealed.len() - HPKE_OVERHEAD` plaintext
/// bytes. The staged plaintext is zeroized if anything fails after
/// decryption.
pub fn hpke_open(
    private_key: &[u8],
    sealed: &[u8],
    out: &mut [u8],
) -> Result<usize, BridgeError> {
    engine::ensure_ready()?;
    let kp = IdentityKeyPair::from_bytes(private_key)?;
    if sealed.len() < HPKE_OVERHEAD {
        return Err(BridgeError::DecryptFailed);
    }
    let needed = sealed.len() - HPKE_OVERHEAD;
    ensure_capacity(out, needed)?;
    let plaintext: Zeroizing<Vec<u8>> = hpke::open(&kp, sealed)?;
    if plaintext.len() != needed {
        return Err(BridgeError::EngineFault);
    }
    out[..needed].copy_from_slice(&plaintext);
    Ok(needed)
}
