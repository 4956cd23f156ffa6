//! C FFI shim for Floe.
//!
//! Exposes registries and their dycores to Fortran and C hosts through a
//! flat, string-addressed API. Each registry lives in a per-thread
//! instance table and is addressed by its `dycore_index`; every entry
//! point returns an `i32` [`FloeStatus`](status::FloeStatus). This is the
//! only Floe crate that contains `unsafe` code, confined to reading and
//! writing caller-supplied pointers.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

use std::cell::RefCell;
use std::ffi::{c_char, CStr};

thread_local! {
    /// Message of the last panic caught by `ffi_guard!` on this thread.
    static LAST_PANIC: RefCell<String> = const { RefCell::new(String::new()) };
}

/// Run an FFI body, converting a panic into `FloeStatus::Panicked`.
///
/// The panic message is kept for [`floe_last_panic_message`].
macro_rules! ffi_guard {
    ($body:block) => {{
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| -> i32 { $body })) {
            Ok(status) => status,
            Err(payload) => {
                let msg = if let Some(s) = payload.downcast_ref::<&str>() {
                    (*s).to_owned()
                } else if let Some(s) = payload.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "unknown panic payload".to_owned()
                };
                $crate::LAST_PANIC.with(|cell| *cell.borrow_mut() = msg);
                $crate::status::FloeStatus::Panicked as i32
            }
        }
    }};
}

/// Unwrap a `Result<T, FloeStatus>`, returning the status code on error.
macro_rules! ffi_try {
    ($e:expr) => {
        match $e {
            Ok(v) => v,
            Err(status) => return status as i32,
        }
    };
}

pub mod factory;
mod handle;
pub mod instance;
pub mod status;
pub mod vars;

/// Copy the last caught panic message into `buf` (not NUL-terminated).
///
/// Returns the full message length in bytes. With a null `buf` or zero
/// `cap`, only the length is returned. At most `cap` bytes are written.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn floe_last_panic_message(buf: *mut c_char, cap: usize) -> i32 {
    LAST_PANIC.with(|cell| {
        let msg = cell.borrow();
        let len = msg.len();
        if !buf.is_null() && cap > 0 {
            let n = len.min(cap);
            // SAFETY: caller guarantees buf points to at least cap bytes.
            unsafe { std::ptr::copy_nonoverlapping(msg.as_ptr(), buf as *mut u8, n) };
        }
        i32::try_from(len).unwrap_or(i32::MAX)
    })
}

/// Borrow a NUL-terminated, UTF-8 C string.
#[allow(unsafe_code)]
pub(crate) fn c_str<'a>(ptr: *const c_char) -> Result<&'a str, status::FloeStatus> {
    if ptr.is_null() {
        return Err(status::FloeStatus::InvalidArgument);
    }
    // SAFETY: caller guarantees ptr is a valid NUL-terminated string that
    // outlives the call.
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|_| status::FloeStatus::InvalidArgument)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::FloeStatus;

    #[test]
    fn ffi_guard_catches_panic_and_stores_message() {
        LAST_PANIC.with(|cell| cell.borrow_mut().clear());
        let status = ffi_guard!({
            panic!("deliberate panic inside a guarded call");
        });
        assert_eq!(status, FloeStatus::Panicked as i32);

        let len = floe_last_panic_message(std::ptr::null_mut(), 0);
        assert!(len > 0);
        let mut buf = vec![0u8; len as usize];
        let len2 = floe_last_panic_message(buf.as_mut_ptr() as *mut c_char, buf.len());
        assert_eq!(len, len2);
        let msg = std::str::from_utf8(&buf).unwrap();
        assert!(msg.contains("deliberate panic inside a guarded call"), "got {msg:?}");
    }

    #[test]
    fn c_str_rejects_null_and_bad_utf8() {
        assert_eq!(c_str(std::ptr::null()), Err(FloeStatus::InvalidArgument));
        let bad = [0xffu8, 0xfe, 0];
        assert_eq!(
            c_str(bad.as_ptr() as *const c_char),
            Err(FloeStatus::InvalidArgument)
        );
        let good = b"thck\0";
        assert_eq!(c_str(good.as_ptr() as *const c_char), Ok("thck"));
    }
}
