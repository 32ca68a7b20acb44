//! Binding to the system `libjitterentropy` (jitterentropy-library).

use std::ptr::NonNull;

use libc::{c_char, c_int, c_uint, size_t, ssize_t};

use super::JitterBackend;
use crate::error::Error;

#[repr(C)]
pub struct RandData {
    _private: [u8; 0],
}

#[link(name = "jitterentropy")]
extern "C" {
    fn jent_entropy_init() -> c_int;
    fn jent_entropy_collector_alloc(osr: c_uint, flags: c_uint) -> *mut RandData;
    fn jent_read_entropy(ec: *mut RandData, data: *mut c_char, len: size_t) -> ssize_t;
    fn jent_entropy_collector_free(ec: *mut RandData);
}

#[derive(Debug, Default)]
pub struct LibJitterEntropy;

pub struct LibJitterHandle(NonNull<RandData>);

impl JitterBackend for LibJitterEntropy {
    type Handle = LibJitterHandle;

    fn name(&self) -> &'static str {
        "libjitterentropy"
    }

    fn init(&mut self) -> Result<(), Error> {
        // SAFETY: no arguments; the library runs its own self test.
        let ret = unsafe { jent_entropy_init() };
        if ret != 0 {
            return Err(Error::JitterSource(format!(
                "jent_entropy_init failed with code {}",
                ret
            )));
        }
        Ok(())
    }

    fn alloc(&mut self, oversampling_rate: u32, flags: u32) -> Result<LibJitterHandle, Error> {
        // SAFETY: plain integer arguments; a null return signals failure.
        let ptr = unsafe { jent_entropy_collector_alloc(oversampling_rate, flags) };
        NonNull::new(ptr).map(LibJitterHandle).ok_or_else(|| {
            Error::JitterSource(format!(
                "jent_entropy_collector_alloc failed (osr={}, flags={:#x})",
                oversampling_rate, flags
            ))
        })
    }

    fn read(&mut self, handle: &mut LibJitterHandle, buf: &mut [u8]) -> Result<usize, Error> {
        // SAFETY: the handle came from a successful alloc and has not been
        // freed; `buf` is valid for `buf.len()` bytes of writes.
        let ret = unsafe {
            jent_read_entropy(
                handle.0.as_ptr(),
                buf.as_mut_ptr() as *mut c_char,
                buf.len() as size_t,
            )
        };
        if ret < 0 {
            return Err(Error::JitterSource(format!(
                "jent_read_entropy failed with code {}",
                ret
            )));
        }
        Ok(ret as usize)
    }

    fn free(&mut self, handle: LibJitterHandle) {
        // SAFETY: the handle is consumed, so it is freed at most once.
        unsafe { jent_entropy_collector_free(handle.0.as_ptr()) };
    }
}
