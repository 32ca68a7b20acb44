use super::{JitterBackend, DISABLE_MEMORY_ACCESS};
use crate::error::Error;
use crate::timer::read_wall_nanos;

const MEMORY_BLOCK_SIZE: usize = 64 * 1024;
const MEMORY_STRIDE: usize = 67;
const MEMORY_TOUCHES: usize = 32;
const STARTUP_SAMPLES: usize = 64;

/// In-process jitter collector: times a data-dependent busy-spin (plus an
/// optional memory walk) with the wall clock and folds the deltas into
/// output bytes, `8 * oversampling_rate` deltas per byte.
#[derive(Debug, Default)]
pub struct TimingJitter;

pub struct TimingJitterHandle {
    oversampling_rate: u32,
    memory: Option<Vec<u8>>,
    accumulator: u64,
}

/// XOR-fold all 8 bytes of a `u64` into a single byte.
#[inline]
fn xor_fold_u64(v: u64) -> u8 {
    v.to_le_bytes().iter().fold(0, |acc, b| acc ^ b)
}

fn spin(accumulator: u64) -> u64 {
    // Iteration count depends on previous timing
    let spin_count = 64 + (accumulator & 0x3F) as usize;
    let mut x = accumulator.wrapping_mul(0x6C62272E07BB0142);
    for _ in 0..spin_count {
        x = x.wrapping_mul(0x5DEECE66D).wrapping_add(0xB);
    }
    std::hint::black_box(x)
}

fn walk_memory(memory: &mut [u8], accumulator: u64) {
    let len = memory.len();
    let mut idx = (accumulator as usize) % len;
    for _ in 0..MEMORY_TOUCHES {
        memory[idx] = memory[idx].wrapping_add(1);
        idx = (idx + MEMORY_STRIDE * 64) % len;
    }
    std::hint::black_box(&memory[idx]);
}

impl TimingJitterHandle {
    fn sample_delta(&mut self) -> Result<u64, Error> {
        let t0 = read_wall_nanos()?;
        let x = spin(self.accumulator);
        if let Some(memory) = self.memory.as_mut() {
            walk_memory(memory, x);
        }
        let t1 = read_wall_nanos()?;
        let delta = t1.wrapping_sub(t0);
        self.accumulator = self.accumulator.rotate_left(7) ^ delta;
        Ok(delta)
    }
}

impl JitterBackend for TimingJitter {
    type Handle = TimingJitterHandle;

    fn name(&self) -> &'static str {
        "timing-jitter"
    }

    /// Rejects a timer too coarse to show any variation across a spin.
    fn init(&mut self) -> Result<(), Error> {
        let mut handle = TimingJitterHandle {
            oversampling_rate: 1,
            memory: None,
            accumulator: 0,
        };
        let first = handle.sample_delta()?;
        for _ in 1..STARTUP_SAMPLES {
            if handle.sample_delta()? != first {
                return Ok(());
            }
        }
        Err(Error::JitterSource(format!(
            "timer shows no variation over {} samples",
            STARTUP_SAMPLES
        )))
    }

    fn alloc(&mut self, oversampling_rate: u32, flags: u32) -> Result<TimingJitterHandle, Error> {
        if oversampling_rate == 0 {
            return Err(Error::JitterSource(
                "oversampling rate must be at least 1".into(),
            ));
        }
        let memory = if flags & DISABLE_MEMORY_ACCESS == 0 {
            Some(vec![0u8; MEMORY_BLOCK_SIZE])
        } else {
            None
        };
        Ok(TimingJitterHandle {
            oversampling_rate,
            memory,
            accumulator: 0,
        })
    }

    fn read(&mut self, handle: &mut TimingJitterHandle, buf: &mut [u8]) -> Result<usize, Error> {
        let rounds = 8 * handle.oversampling_rate as usize;
        for byte in buf.iter_mut() {
            let mut out = 0u8;
            for _ in 0..rounds {
                out = out.rotate_left(1) ^ xor_fold_u64(handle.sample_delta()?);
            }
            *byte = out;
        }
        Ok(buf.len())
    }

    fn free(&mut self, handle: TimingJitterHandle) {
        drop(handle);
    }
}
