//! Wall-clock and cycle-counter readers.
//!
//! The wall clock is a monotonic nanosecond clock that keeps counting across
//! system sleep where the platform has one (`CLOCK_BOOTTIME` on Linux) and is
//! never stepped by NTP or the user. The cycle counter is the raw hardware
//! counter (`rdtsc` on x86_64, `cntvct_el0` on aarch64), read WITHOUT any
//! serializing fence: the CPU may reorder adjacent reads around the measured
//! work, and samples must be interpreted with that in mind.

use serde::Deserialize;

use crate::error::Error;

/// Which timer a sample is taken with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TimerKind {
    /// Monotonic nanoseconds since an arbitrary epoch
    Wall,
    /// Raw hardware cycle count, not frequency-normalized
    Cycle,
}

impl TimerKind {
    pub fn name(&self) -> &'static str {
        match self {
            TimerKind::Wall => "wall",
            TimerKind::Cycle => "cycle",
        }
    }
}

/// A source of non-decreasing 64-bit timestamps.
pub trait Clock {
    fn now(&self) -> Result<u64, Error>;
}

/// Monotonic nanosecond clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClock;

impl Clock for WallClock {
    #[inline]
    fn now(&self) -> Result<u64, Error> {
        read_wall_nanos()
    }
}

/// Raw hardware cycle counter.
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleCounter;

impl CycleCounter {
    /// Whether this target has a cycle counter backend.
    pub const SUPPORTED: bool = cfg!(any(target_arch = "x86_64", target_arch = "aarch64"));
}

impl Clock for CycleCounter {
    #[inline]
    fn now(&self) -> Result<u64, Error> {
        read_cycles()
    }
}

// ---------------------------------------------------------------------------
// Wall clock backends
// ---------------------------------------------------------------------------

#[cfg(any(target_os = "linux", target_os = "android"))]
const WALL_CLOCK_ID: libc::clockid_t = libc::CLOCK_BOOTTIME;

// CLOCK_MONOTONIC keeps ticking through sleep on Darwin and the BSDs.
#[cfg(all(unix, not(any(target_os = "linux", target_os = "android"))))]
const WALL_CLOCK_ID: libc::clockid_t = libc::CLOCK_MONOTONIC;

/// Reads the monotonic wall clock in nanoseconds.
#[cfg(unix)]
pub fn read_wall_nanos() -> Result<u64, Error> {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    // SAFETY: `ts` is a valid, writable timespec for the duration of the call.
    let ret = unsafe { libc::clock_gettime(WALL_CLOCK_ID, &mut ts) };
    if ret != 0 {
        return Err(Error::Timer(format!(
            "clock_gettime failed: {}",
            std::io::Error::last_os_error()
        )));
    }
    Ok((ts.tv_sec as u64)
        .wrapping_mul(1_000_000_000)
        .wrapping_add(ts.tv_nsec as u64))
}

/// Reads the monotonic wall clock in nanoseconds, relative to a process-local epoch.
#[cfg(not(unix))]
pub fn read_wall_nanos() -> Result<u64, Error> {
    use std::sync::OnceLock;
    use std::time::Instant;
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    let epoch = EPOCH.get_or_init(Instant::now);
    Ok(epoch.elapsed().as_nanos() as u64)
}

// ---------------------------------------------------------------------------
// Cycle counter backends
// ---------------------------------------------------------------------------

/// Reads the raw cycle counter. Not serialized against out-of-order execution.
#[inline]
pub fn read_cycles() -> Result<u64, Error> {
    #[cfg(target_arch = "x86_64")]
    {
        Ok(rdtsc())
    }

    #[cfg(target_arch = "aarch64")]
    {
        Ok(cntvct())
    }

    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    {
        Err(Error::Unsupported(
            "no cycle counter backend for this architecture".into(),
        ))
    }
}

#[cfg(target_arch = "x86_64")]
#[inline(always)]
fn rdtsc() -> u64 {
    let lo: u32;
    let hi: u32;
    // SAFETY: RDTSC is unprivileged on every x86_64 OS we target and only
    // writes EDX:EAX.
    unsafe {
        core::arch::asm!(
            "rdtsc",
            out("eax") lo,
            out("edx") hi,
            options(nomem, nostack, preserves_flags),
        );
    }
    ((hi as u64) << 32) | lo as u64
}

#[cfg(target_arch = "aarch64")]
#[inline(always)]
fn cntvct() -> u64 {
    let val: u64;
    // SAFETY: CNTVCT_EL0 is readable from EL0 on Linux and macOS.
    // Read-only system register, no side effects.
    unsafe {
        core::arch::asm!("mrs {}, cntvct_el0", out(reg) val, options(nomem, nostack));
    }
    val
}
