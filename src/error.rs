//! Unified error type for the bridge.
//!
//! Every failure crossing the foreign-call boundary is one of the variants
//! below, surfaced as a stable negative code. The taxonomy is closed on
//! purpose: callers on the other side of the ABI switch on integers, so a
//! new variant is an ABI change.
//!
//! Two distinctions are load-bearing:
//! - `InvalidSignature` means verification *ran* and the signature does not
//!   match. Wrong-length keys or signatures are `MalformedKey` — callers
//!   must be able to tell "cryptographically invalid" from "input format
//!   wrong".
//! - `DecryptFailed` covers every ciphertext-shaped failure in `hpke_open`
//!   (short input, bad encapsulated key, tag mismatch) with a single code
//!   and no payload, so the error channel is not a padding/format oracle.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BridgeError {
    #[error("output capacity {available} too small, need {needed}")]
    InsufficientCapacity { needed: usize, available: usize },

    #[error("malformed key or input encoding: {0}")]
    MalformedKey(String),

    #[error("signature does not verify")]
    InvalidSignature,

    #[error("decryption failed")]
    DecryptFailed,

    #[error("crypto engine unavailable")]
    EngineUnavailable,

    #[error("engine violated its output contract")]
    EngineFault,
}

impl BridgeError {
    /// Stable negative code carried across the C ABI.
    pub const fn code(&self) -> i32 {
        match self {
            BridgeError::InsufficientCapacity { .. } => -1,
            BridgeError::MalformedKey(_) => -2,
            BridgeError::InvalidSignature => -3,
            BridgeError::DecryptFailed => -4,
            BridgeError::EngineUnavailable => -5,
            BridgeError::EngineFault => -6,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_negative_and_distinct() {
        let errors = [
            BridgeError::InsufficientCapacity { needed: 32, available: 0 },
            BridgeError::MalformedKey("x".into()),
            BridgeError::InvalidSignature,
            BridgeError::DecryptFailed,
            BridgeError::EngineUnavailable,
            BridgeError::EngineFault,
        ];
        let codes: Vec<i32> = errors.iter().map(BridgeError::code).collect();
        assert!(codes.iter().all(|&c| c < 0));
        let mut dedup = codes.clone();
        dedup.sort_unstable();
        dedup.dedup();
        assert_eq!(dedup.len(), codes.len());
    }
}
