//! Engine availability, one-time self-test, and version introspection.
//!
//! The underlying crates need no runtime initialisation, but the bridge
//! still guarantees the engine actually works before the first real call:
//! a process-wide, lazy self-test (sign/verify plus an HPKE round trip on
//! throwaway keys) runs at most once. Concurrent first callers block until
//! it finishes; its verdict is cached for the life of the process.

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::{error::BridgeError, hpke, identity::IdentityKeyPair};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EngineState {
    Uninitialized,
    Initializing,
    Ready,
    Failed,
}

static STATE: Mutex<EngineState> = Mutex::new(EngineState::Uninitialized);

/// Run the self-test if it has not run yet; return the cached verdict
/// otherwise. Holding the lock across the self-test is what makes
/// concurrent first calls block instead of racing.
pub fn ensure_ready() -> Result<(), BridgeError> {
    let mut state = STATE.lock();
    match *state {
        EngineState::Ready => Ok(()),
        EngineState::Failed => Err(BridgeError::EngineUnavailable),
        EngineState::Uninitialized | EngineState::Initializing => {
            *state = EngineState::Initializing;
            match self_test() {
                Ok(()) => {
                    *state = EngineState::Ready;
                    info!("[engine] self-test passed, engine ready");
                    Ok(())
                }
                Err(e) => {
                    *state = EngineState::Failed;
                    warn!("[engine] self-test failed: {e}");
                    Err(BridgeError::EngineUnavailable)
                }
            }
        }
    }
}

/// Liveness probe: never errors, false when the engine cannot initialise.
pub fn is_available() -> bool {
    ensure_ready().is_ok()
}

/// Engine version string handed across the boundary (ownership transfers
/// to the caller at the FFI layer; see `ffi::sigil_version`).
pub fn version() -> String {
    format!(
        "{} {} (ed25519-dalek, RFC 9180 HPKE: X25519/HKDF-SHA256/ChaCha20-Poly1305)",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
    )
}

fn self_test() -> Result<(), BridgeError> {
    let kp = IdentityKeyPair::generate();

    let sig = kp.sign(b"sigil-bridge self-test");
    IdentityKeyPair::verify(kp.public.as_bytes(), b"sigil-bridge self-test", &sig)?;

    let sealed = hpke::seal(&kp.public, b"self-test payload")?;
    let opened = hpke::open(&kp, &sealed)?;
    if &opened[..] != b"self-test payload" {
        return Err(BridgeError::EngineFault);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_is_idempotent() {
        assert!(is_available());
        assert!(is_available());
    }

    #[test]
    fn ensure_ready_after_probe() {
        assert!(is_available());
        ensure_ready().unwrap();
    }

    #[test]
    fn version_names_the_suite() {
        let v = version();
        assert!(v.contains("sigil-bridge"));
        assert!(v.contains("HPKE"));
    }

    #[test]
    fn concurrent_first_calls_agree() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(is_available))
            .collect();
        for h in handles {
            assert!(h.join().unwrap());
        }
    }
}
