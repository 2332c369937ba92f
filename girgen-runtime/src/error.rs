use std::ffi::{c_char, CStr};

/// Layout of a native `GError`.
#[repr(C)]
#[derive(Debug)]
pub struct RawError {
    pub domain: u32,
    pub code: i32,
    pub message: *mut c_char,
}

/// Frees a native error, e.g. `g_error_free`.
pub type ErrorFreeFn = unsafe extern "C" fn(*mut RawError);

/// A native error after ownership was taken from the native side.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} (domain {domain}, code {code})")]
pub struct NativeError {
    pub domain: u32,
    pub code: i32,
    pub message: String,
}

/// Convert a native error into a [`NativeError`] and free it.
///
/// Returns `None` for a null pointer. Otherwise `free` is called exactly
/// once, after the fields were copied.
///
/// # Safety
///
/// A non-null `error` must point to a valid native error owned by the caller;
/// it must not be used afterwards.
pub unsafe fn take_error(error: *mut RawError, free: ErrorFreeFn) -> Option<NativeError> {
    if error.is_null() {
        return None;
    }
    let raw = &*error;
    let message = if raw.message.is_null() {
        String::new()
    } else {
        CStr::from_ptr(raw.message).to_string_lossy().into_owned()
    };
    let taken = NativeError {
        domain: raw.domain,
        code: raw.code,
        message,
    };
    free(error);
    Some(taken)
}
