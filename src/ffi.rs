//! C ABI surface.
//!
//! Conventions, matching the declarations fed to foreign callers:
//! - the caller owns every buffer for the duration of the call; the bridge
//!   never retains a pointer past return;
//! - lengths and capacities are `i32`; a negative length or a null pointer
//!   with a nonzero length is a malformed-input error, nothing is written;
//! - return value ≥ 0 is the byte count written (0 for a valid signature),
//!   < 0 is a `BridgeError` code;
//! - panics never unwind across the boundary: they are caught and reported
//!   as the engine-fault code;
//! - `sigil_version` transfers ownership of a heap string to the caller,
//!   who must pass the same pointer to `sigil_version_free` exactly once.
//!   Passing a foreign pointer or freeing twice is undefined behaviour the
//!   bridge cannot detect.

use std::ffi::CString;
use std::os::raw::c_char;
use std::panic::{self, AssertUnwindSafe};
use std::slice;

use tracing::warn;

use crate::{bridge, engine, error::BridgeError};

/// Run an FFI body, converting a panic into an error code instead of
/// unwinding into foreign frames (which is UB). AssertUnwindSafe is fine
/// here: the closures only capture raw pointers and we never observe torn
/// state through them after a panic.
fn catch_ffi<F: FnOnce() -> i32>(f: F) -> i32 {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(rc) => rc,
        Err(_) => {
            warn!("[ffi] panic caught at the C boundary");
            BridgeError::EngineFault.code()
        }
    }
}

unsafe fn input<'a>(ptr: *const u8, len: i32) -> Result<&'a [u8], BridgeError> {
    if len < 0 || (ptr.is_null() && len != 0) {
        return Err(BridgeError::MalformedKey("null or negative-length input".into()));
    }
    if len == 0 {
        Ok(&[])
    } else {
        Ok(slice::from_raw_parts(ptr, len as usize))
    }
}

unsafe fn output<'a>(ptr: *mut u8, capacity: i32) -> Result<&'a mut [u8], BridgeError> {
    if capacity < 0 || (ptr.is_null() && capacity != 0) {
        return Err(BridgeError::MalformedKey("null or negative-capacity output".into()));
    }
    if capacity == 0 {
        Ok(&mut [])
    } else {
        Ok(slice::from_raw_parts_mut(ptr, capacity as usize))
    }
}

fn to_ret(result: Result<usize, BridgeError>) -> i32 {
    match result {
        Ok(n) => n as i32,
        Err(e) => e.code(),
    }
}

// ── Availability / version ──────────────────────────────────────────────────

/// Liveness probe; never fails, returns false if the engine is unusable.
#[no_mangle]
pub extern "C" fn sigil_available() -> bool {
    panic::catch_unwind(engine::is_available).unwrap_or(false)
}

/// Engine version string. Ownership transfers to the caller, who must call
/// `sigil_version_free` on the returned pointer exactly once. Null on
/// allocation failure.
#[no_mangle]
pub extern "C" fn sigil_version() -> *mut c_char {
    match CString::new(engine::version()) {
        Ok(s) => s.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

/// Release a string obtained from `sigil_version`. Null is a no-op.
///
/// # Safety
/// `ptr` must be a pointer previously returned by `sigil_version` that has
/// not been freed yet.
#[no_mangle]
pub unsafe extern "C" fn sigil_version_free(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ── Key generation / derivation ─────────────────────────────────────────────

/// # Safety
/// `out` must be valid for writes of `out_cap` bytes (or null with cap 0).
#[no_mangle]
pub unsafe extern "C" fn sigil_generate_private_key(out: *mut u8, out_cap: i32) -> i32 {
    catch_ffi(|| {
        to_ret(output(out, out_cap).and_then(bridge::generate_private_key))
    })
}

/// # Safety
/// `private_key` must be valid for reads of `private_key_len` bytes and
/// `out` for writes of `out_cap` bytes.
#[no_mangle]
pub unsafe extern "C" fn sigil_derive_public_key(
    private_key: *const u8,
    private_key_len: i32,
    out: *mut u8,
    out_cap: i32,
) -> i32 {
    catch_ffi(|| {
        to_ret((|| {
            let sk = input(private_key, private_key_len)?;
            let out = output(out, out_cap)?;
            bridge::derive_public_key(sk, out)
        })())
    })
}

/// Atomic keypair generation: returns the private-key length on success;
/// on any error neither buffer is modified.
///
/// # Safety
/// Both buffers must be valid for writes of their declared capacities.
#[no_mangle]
pub unsafe extern "C" fn sigil_generate_identity_keypair(
    private_out: *mut u8,
    private_cap: i32,
    public_out: *mut u8,
    public_cap: i32,
) -> i32 {
    catch_ffi(|| {
        to_ret((|| {
            let private_out = output(private_out, private_cap)?;
            let public_out = output(public_out, public_cap)?;
            bridge::generate_identity_keypair(private_out, public_out).map(|(sk_len, _)| sk_len)
        })())
    })
}

// ── Signing / verification ──────────────────────────────────────────────────

/// # Safety
/// All pointers must be valid for their declared lengths/capacities.
#[no_mangle]
pub unsafe extern "C" fn sigil_sign(
    private_key: *const u8,
    private_key_len: i32,
    message: *const u8,
    message_len: i32,
    out: *mut u8,
    out_cap: i32,
) -> i32 {
    catch_ffi(|| {
        to_ret((|| {
            let sk = input(private_key, private_key_len)?;
            let msg = input(message, message_len)?;
            let out = output(out, out_cap)?;
            bridge::sign(sk, msg, out)
        })())
    })
}

/// Returns 0 for a valid signature, a negative code otherwise. Nothing is
/// written anywhere.
///
/// # Safety
/// All pointers must be valid for their declared lengths.
#[no_mangle]
pub unsafe extern "C" fn sigil_verify(
    public_key: *const u8,
    public_key_len: i32,
    message: *const u8,
    message_len: i32,
    signature: *const u8,
    signature_len: i32,
) -> i32 {
    catch_ffi(|| {
        to_ret((|| {
            let pk = input(public_key, public_key_len)?;
            let msg = input(message, message_len)?;
            let sig = input(signature, signature_len)?;
            bridge::verify(pk, msg, sig)
        })())
    })
}

// ── HPKE seal / open ────────────────────────────────────────────────────────

/// # Safety
/// All pointers must be valid for their declared lengths/capacities.
#[no_mangle]
pub unsafe extern "C" fn sigil_hpke_seal(
    public_key: *const u8,
    public_key_len: i32,
    message: *const u8,
    message_len: i32,
    out: *mut u8,
    out_cap: i32,
) -> i32 {
    catch_ffi(|| {
        to_ret((|| {
            let pk = input(public_key, public_key_len)?;
            let msg = input(message, message_len)?;
            let out = output(out, out_cap)?;
            bridge::hpke_seal(pk, msg, out)
        })())
    })
}

/// # Safety
/// All pointers must be valid for their declared lengths/capacities.
#[no_mangle]
pub unsafe extern "C" fn sigil_hpke_open(
    private_key: *const u8,
    private_key_len: i32,
    ciphertext: *const u8,
    ciphertext_len: i32,
    out: *mut u8,
    out_cap: i32,
) -> i32 {
    catch_ffi(|| {
        to_ret((|| {
            let sk = input(private_key, private_key_len)?;
            let ct = input(ciphertext, ciphertext_len)?;
            let out = output(out, out_cap)?;
            bridge::hpke_open(sk, ct, out)
        })())
    })
}
