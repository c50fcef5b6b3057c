//! sigil-bridge — buffer-based foreign-call bridge for a cryptographic
//! identity engine.
//!
//! Key-pair generation, Ed25519 sign/verify, and RFC 9180 HPKE seal/open,
//! exposed two ways: a safe Rust API (`bridge`) with an explicit
//! `Result<bytes_written, BridgeError>` contract, and a raw C ABI (`ffi`)
//! where the same contract is carried by a signed return value. The bridge
//! is stateless: no caches, no retained buffers, only a one-time lazy
//! engine self-test shared process-wide.
//!
//! # Design principles
//! - NO custom crypto; all primitives come from audited Rust crates.
//! - Zeroize all secret material on drop; secrets are never logged.
//! - A failed call never leaves partial output in a caller buffer.
//! - Errors are a closed set with stable negative codes; nothing panics
//!   across the C boundary.
//!
//! # Module layout
//! - `identity` — Ed25519 identity keypairs, sign/verify, fingerprints
//! - `hpke`     — HPKE seal/open against the identity key (X25519 mapping)
//! - `engine`   — availability probe, one-time self-test, version string
//! - `bridge`   — the buffer/size contract (safe slice API)
//! - `ffi`      — `extern "C"` surface over `bridge`
//! - `error`    — unified error type + ABI codes

pub mod bridge;
pub mod engine;
pub mod error;
pub mod ffi;
pub mod hpke;
pub mod identity;

pub use error::BridgeError;
pub use hpke::{HPKE_ENC_LEN, HPKE_OVERHEAD, HPKE_TAG_LEN};
pub use identity::{PRIVATE_KEY_LEN, PUBLIC_KEY_LEN, SIGNATURE_LEN};
