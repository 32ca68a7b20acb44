use std::hint::black_box;

use super::NoiseOperation;
use crate::error::Error;
use crate::timer::{read_cycles, Clock, WallClock};

pub const BUSY_LOOP_ITERATIONS: u64 = 100_000;

/// `x := x * x * x`. Timing-negligible baseline.
#[derive(Debug, Default)]
pub struct Cube;

impl NoiseOperation for Cube {
    fn name(&self) -> &'static str {
        "cube"
    }

    #[inline(never)]
    fn invoke(&mut self, slot: &mut u64) -> Result<(), Error> {
        let x = black_box(*slot);
        *slot = x.wrapping_mul(x).wrapping_mul(x);
        Ok(())
    }
}

/// Reads the wall clock inside the timed region.
#[derive(Debug, Default)]
pub struct ReadClock {
    clock: WallClock,
}

impl NoiseOperation for ReadClock {
    fn name(&self) -> &'static str {
        "read-clock"
    }

    #[inline(never)]
    fn invoke(&mut self, slot: &mut u64) -> Result<(), Error> {
        *slot = self.clock.now()?;
        Ok(())
    }
}

/// Fixed-iteration increment loop with predictable branches.
#[derive(Debug)]
pub struct BusyLoop {
    iterations: u64,
}

impl Default for BusyLoop {
    fn default() -> Self {
        Self {
            iterations: BUSY_LOOP_ITERATIONS,
        }
    }
}

impl NoiseOperation for BusyLoop {
    fn name(&self) -> &'static str {
        "busy-loop"
    }

    #[inline(never)]
    fn invoke(&mut self, slot: &mut u64) -> Result<(), Error> {
        let mut n = 0u64;
        for _ in 0..self.iterations {
            // Keeps the loop from folding into a closed form.
            n = black_box(n + 1);
        }
        *slot = slot.wrapping_add(n);
        Ok(())
    }
}

/// The cycle-counter read itself, to characterize its overhead.
#[derive(Debug, Default)]
pub struct ReadCycleCounter;

impl NoiseOperation for ReadCycleCounter {
    fn name(&self) -> &'static str {
        "read-cycle-counter"
    }

    #[inline(never)]
    fn invoke(&mut self, slot: &mut u64) -> Result<(), Error> {
        *slot = read_cycles()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::CycleCounter;

    #[test]
    fn test_cube() {
        let mut slot = 3u64;
        Cube.invoke(&mut slot).unwrap();
        assert_eq!(slot, 27);
        Cube.invoke(&mut slot).unwrap();
        assert_eq!(slot, 19_683);
    }

    #[test]
    fn test_cube_wraps() {
        let mut slot = u64::MAX;
        Cube.invoke(&mut slot).unwrap();
        assert_eq!(slot, u64::MAX); // (-1)^3 mod 2^64
    }

    #[test]
    fn test_read_clock_writes_timestamp() {
        let mut slot = 0u64;
        let before = WallClock.now().unwrap();
        ReadClock::default().invoke(&mut slot).unwrap();
        let after = WallClock.now().unwrap();
        assert!(before <= slot && slot <= after);
    }

    #[test]
    fn test_busy_loop_counts_iterations() {
        let mut slot = 5u64;
        BusyLoop::default().invoke(&mut slot).unwrap();
        assert_eq!(slot, 5 + BUSY_LOOP_ITERATIONS);
    }

    #[test]
    fn test_read_cycle_counter() {
        let mut slot = 0u64;
        let result = ReadCycleCounter.invoke(&mut slot);
        if CycleCounter::SUPPORTED {
            assert!(result.is_ok());
            assert!(slot > 0);
        } else {
            assert!(matches!(result, Err(Error::Unsupported(_))));
        }
    }
}
