//! Hardware jitter-entropy collector and its lifecycle.
//!
//! A backend exposes the classic init / alloc / read / free contract. The
//! [`JitterCollector`] owns one backend and at most one allocated handle:
//! it initializes and allocates lazily on first read, frees exactly once on
//! [`JitterCollector::close`] or drop, and treats any read that returns fewer
//! bytes than requested as a failure. It is not thread-safe and is meant to be
//! owned by a single caller.

#[cfg(feature = "jitterentropy")]
pub mod ffi;
pub mod software;

use crate::config::JitterConfig;
use crate::error::Error;

/// Skip the memory-access part of each timing sample.
pub const DISABLE_MEMORY_ACCESS: u32 = 1 << 2;

/// A jitter entropy backend.
pub trait JitterBackend {
    type Handle;

    fn name(&self) -> &'static str;

    /// One-time backend self test. Must succeed before `alloc`.
    fn init(&mut self) -> Result<(), Error>;

    fn alloc(&mut self, oversampling_rate: u32, flags: u32) -> Result<Self::Handle, Error>;

    /// Fills up to `buf.len()` bytes, returning how many were written.
    fn read(&mut self, handle: &mut Self::Handle, buf: &mut [u8]) -> Result<usize, Error>;

    fn free(&mut self, handle: Self::Handle);
}

#[cfg(feature = "jitterentropy")]
pub type DefaultBackend = ffi::LibJitterEntropy;

#[cfg(not(feature = "jitterentropy"))]
pub type DefaultBackend = software::TimingJitter;

enum State<H> {
    Uninitialized,
    Initialized,
    Open(H),
    Closed,
}

pub struct JitterCollector<B: JitterBackend> {
    backend: B,
    oversampling_rate: u32,
    flags: u32,
    state: State<B::Handle>,
}

impl JitterCollector<DefaultBackend> {
    pub fn with_default_backend(config: &JitterConfig) -> Self {
        Self::new(DefaultBackend::default(), config)
    }
}

impl<B: JitterBackend> JitterCollector<B> {
    pub fn new(backend: B, config: &JitterConfig) -> Self {
        Self {
            backend,
            oversampling_rate: config.oversampling_rate,
            flags: config.flags,
            state: State::Uninitialized,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, State::Open(_))
    }

    /// Initializes the backend and allocates a collector. No-op when already open.
    pub fn open(&mut self) -> Result<(), Error> {
        match self.state {
            State::Open(_) => return Ok(()),
            State::Closed => {
                return Err(Error::JitterSource("collector already closed".into()));
            }
            State::Uninitialized => {
                self.backend.init()?;
                self.state = State::Initialized;
            }
            State::Initialized => {}
        }

        let handle = self.backend.alloc(self.oversampling_rate, self.flags)?;
        self.state = State::Open(handle);
        log::debug!(
            "{} collector allocated (osr={}, flags={:#x})",
            self.backend.name(),
            self.oversampling_rate,
            self.flags
        );
        Ok(())
    }

    /// Reads exactly 8 bytes from the collector, opening it first if needed.
    pub fn read_u64(&mut self) -> Result<u64, Error> {
        if !self.is_open() {
            self.open()?;
        }
        let handle = match &mut self.state {
            State::Open(h) => h,
            _ => return Err(Error::JitterSource("collector is not open".into())),
        };

        let mut buf = [0u8; 8];
        let n = self.backend.read(handle, &mut buf)?;
        if n < buf.len() {
            return Err(Error::JitterSource(format!(
                "short read: {} of {} bytes",
                n,
                buf.len()
            )));
        }
        Ok(u64::from_ne_bytes(buf))
    }

    /// Frees the collector if one was allocated. Safe to call repeatedly.
    pub fn close(&mut self) {
        match std::mem::replace(&mut self.state, State::Closed) {
            State::Open(handle) => {
                self.backend.free(handle);
                log::debug!("{} collector freed", self.backend.name());
            }
            State::Uninitialized | State::Initialized | State::Closed => {}
        }
    }
}

impl<B: JitterBackend> Drop for JitterCollector<B> {
    fn drop(&mut self) {
        self.close();
    }
}
