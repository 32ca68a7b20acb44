//! Sample harness: timestamp, invoke one noise operation, timestamp, and
//! return the difference as one raw jitter sample.
//!
//! A pair that goes backwards (`t1 < t0`) is reported as a timer error rather
//! than wrapped or clamped. The harness cannot prevent preemption between the
//! two reads; a preempted sample shows up as an outlier.

use std::collections::HashSet;
use std::hint::black_box;

use crate::error::Error;
use crate::noise::NoiseOperation;
use crate::timer::{Clock, CycleCounter, TimerKind, WallClock};

pub struct SampleHarness<W: Clock = WallClock, C: Clock = CycleCounter> {
    wall: W,
    cycles: C,
}

impl SampleHarness {
    pub fn new() -> Self {
        Self::with_clocks(WallClock, CycleCounter)
    }
}

impl Default for SampleHarness {
    fn default() -> Self {
        Self::new()
    }
}

fn timed<K: Clock>(clock: &K, op: &mut dyn NoiseOperation) -> Result<u64, Error> {
    let mut slot = 0u64;
    let t0 = clock.now()?;
    op.invoke(&mut slot)?;
    let t1 = clock.now()?;
    black_box(slot);

    t1.checked_sub(t0).ok_or_else(|| {
        Error::Timer(format!(
            "non-monotonic timer during {}: t0={} t1={}",
            op.name(),
            t0,
            t1
        ))
    })
}

impl<W: Clock, C: Clock> SampleHarness<W, C> {
    pub fn with_clocks(wall: W, cycles: C) -> Self {
        Self { wall, cycles }
    }

    /// One sample in wall-clock nanoseconds.
    pub fn measure_wall(&self, op: &mut dyn NoiseOperation) -> Result<u64, Error> {
        timed(&self.wall, op)
    }

    /// One sample in raw cycles.
    pub fn measure_cycles(&self, op: &mut dyn NoiseOperation) -> Result<u64, Error> {
        #[cfg(feature = "trace-markers")]
        log::trace!(target: "jitterharvest::trace", "cycle sample start: {}", op.name());

        let result = timed(&self.cycles, op);

        #[cfg(feature = "trace-markers")]
        log::trace!(target: "jitterharvest::trace", "cycle sample end: {}", op.name());

        result
    }

    pub fn measure(&self, timer: TimerKind, op: &mut dyn NoiseOperation) -> Result<u64, Error> {
        match timer {
            TimerKind::Wall => self.measure_wall(op),
            TimerKind::Cycle => self.measure_cycles(op),
        }
    }

    /// Collects `count` samples. Failed samples are skipped and logged; once
    /// more than `max_failures` have been skipped the last error is returned.
    pub fn collect(
        &self,
        timer: TimerKind,
        op: &mut dyn NoiseOperation,
        count: usize,
        max_failures: usize,
    ) -> Result<Vec<u64>, Error> {
        let mut samples = Vec::with_capacity(count);
        let mut failures = 0usize;

        while samples.len() < count {
            match self.measure(timer, op) {
                Ok(d) => samples.push(d),
                Err(e) => {
                    failures += 1;
                    if failures > max_failures {
                        return Err(e);
                    }
                    log::warn!(
                        "skipped {} sample {} ({}/{} failures): {}",
                        op.name(),
                        samples.len(),
                        failures,
                        max_failures,
                        e
                    );
                }
            }
        }

        if failures > 0 {
            log::info!("{}: {} samples skipped", op.name(), failures);
        }
        Ok(samples)
    }
}

/// Descriptive spread of a sample series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SampleSummary {
    pub count: usize,
    pub min: u64,
    pub max: u64,
    pub distinct: usize,
    pub duplicates: usize,
}

impl SampleSummary {
    pub fn from_samples(samples: &[u64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        let distinct = samples.iter().collect::<HashSet<_>>().len();
        Self {
            count: samples.len(),
            min: samples.iter().copied().min().unwrap_or(0),
            max: samples.iter().copied().max().unwrap_or(0),
            distinct,
            duplicates: samples.len() - distinct,
        }
    }

    /// Every sample identical. Usually a broken or heavily virtualized timer.
    pub fn is_constant(&self) -> bool {
        self.count >= 2 && self.min == self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::BusyLoop;
    use std::cell::Cell;

    /// Replays a fixed list of timestamps.
    struct ScriptedClock {
        ticks: Vec<u64>,
        next: Cell<usize>,
    }

    impl ScriptedClock {
        fn new(ticks: &[u64]) -> Self {
            Self {
                ticks: ticks.to_vec(),
                next: Cell::new(0),
            }
        }
    }

    impl Clock for ScriptedClock {
        fn now(&self) -> Result<u64, Error> {
            let i = self.next.get();
            self.next.set(i + 1);
            self.ticks
                .get(i)
                .copied()
                .ok_or_else(|| Error::Timer("script exhausted".into()))
        }
    }

    struct Noop {
        calls: usize,
    }

    impl NoiseOperation for Noop {
        fn name(&self) -> &'static str {
            "noop"
        }

        fn invoke(&mut self, _slot: &mut u64) -> Result<(), Error> {
            self.calls += 1;
            Ok(())
        }
    }

    struct Failing;

    impl NoiseOperation for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn invoke(&mut self, _slot: &mut u64) -> Result<(), Error> {
            Err(Error::JitterSource("short read: 0 of 8 bytes".into()))
        }
    }

    #[test]
    fn test_measure_returns_difference() {
        let harness = SampleHarness::with_clocks(ScriptedClock::new(&[100, 142]), CycleCounter);
        let mut op = Noop { calls: 0 };
        assert_eq!(harness.measure_wall(&mut op).unwrap(), 42);
        assert_eq!(op.calls, 1);
    }

    #[test]
    fn test_backwards_clock_is_timer_error() {
        let harness = SampleHarness::with_clocks(ScriptedClock::new(&[500, 499]), CycleCounter);
        let mut op = Noop { calls: 0 };
        let err = harness.measure_wall(&mut op).unwrap_err();
        assert!(matches!(err, Error::Timer(_)));
        assert!(format!("{}", err).contains("non-monotonic"));
    }

    #[test]
    fn test_backwards_cycle_counter_is_timer_error() {
        let harness = SampleHarness::with_clocks(WallClock, ScriptedClock::new(&[u64::MAX, 0]));
        let mut op = Noop { calls: 0 };
        assert!(matches!(
            harness.measure_cycles(&mut op),
            Err(Error::Timer(_))
        ));
    }

    #[test]
    fn test_equal_timestamps_give_zero() {
        let harness = SampleHarness::with_clocks(ScriptedClock::new(&[7, 7]), CycleCounter);
        let mut op = Noop { calls: 0 };
        assert_eq!(harness.measure(TimerKind::Wall, &mut op).unwrap(), 0);
    }

    #[test]
    fn test_operation_error_propagates() {
        let harness = SampleHarness::with_clocks(ScriptedClock::new(&[1, 2]), CycleCounter);
        assert!(matches!(
            harness.measure_wall(&mut Failing),
            Err(Error::JitterSource(_))
        ));
    }

    #[test]
    fn test_real_wall_clock_noop_samples() {
        let harness = SampleHarness::new();
        let mut op = Noop { calls: 0 };
        for _ in 0..1000 {
            harness.measure_wall(&mut op).unwrap();
        }
        assert_eq!(op.calls, 1000);
    }

    #[test]
    fn test_collect_skips_bad_pairs() {
        // Second pair goes backwards and is skipped.
        let clock = ScriptedClock::new(&[0, 10, 50, 40, 60, 65, 70, 71]);
        let harness = SampleHarness::with_clocks(clock, CycleCounter);
        let mut op = Noop { calls: 0 };
        let samples = harness
            .collect(TimerKind::Wall, &mut op, 3, 1)
            .unwrap();
        assert_eq!(samples, vec![10, 5, 1]);
    }

    #[test]
    fn test_collect_gives_up_after_max_failures() {
        let harness = SampleHarness::new();
        let result = harness.collect(TimerKind::Wall, &mut Failing, 10, 2);
        assert!(matches!(result, Err(Error::JitterSource(_))));
    }

    #[test]
    fn test_collect_zero_failures_allowed() {
        let clock = ScriptedClock::new(&[5, 4]);
        let harness = SampleHarness::with_clocks(clock, CycleCounter);
        let mut op = Noop { calls: 0 };
        assert!(harness.collect(TimerKind::Wall, &mut op, 1, 0).is_err());
    }

    #[test]
    fn test_busy_loop_cycle_samples_vary() {
        if !CycleCounter::SUPPORTED {
            return;
        }
        let harness = SampleHarness::new();
        let mut op = BusyLoop::default();
        let samples = harness
            .collect(TimerKind::Cycle, &mut op, 1000, 0)
            .unwrap();
        assert_eq!(samples.len(), 1000);
        let summary = SampleSummary::from_samples(&samples);
        if summary.is_constant() {
            // Zero variance points at the environment, not the harness.
            eprintln!(
                "warning: 1000 busy-loop cycle samples all equal {}; cycle counter looks virtualized",
                summary.min
            );
        }
    }

    #[test]
    fn test_summary() {
        let s = SampleSummary::from_samples(&[5, 3, 5, 9, 3, 3]);
        assert_eq!(s.count, 6);
        assert_eq!(s.min, 3);
        assert_eq!(s.max, 9);
        assert_eq!(s.distinct, 3);
        assert_eq!(s.duplicates, 3);
        assert!(!s.is_constant());
    }

    #[test]
    fn test_summary_constant() {
        assert!(SampleSummary::from_samples(&[4, 4, 4]).is_constant());
        assert!(!SampleSummary::from_samples(&[4]).is_constant());
        let empty = SampleSummary::from_samples(&[]);
        assert_eq!(empty, SampleSummary::default());
        assert!(!empty.is_constant());
    }
}
