//! Noise operations: bounded, deterministic workloads whose execution time is
//! measured to produce one jitter sample.
//!
//! Every operation mutates a single caller-owned `u64` slot. The value left in
//! the slot carries no entropy; it only forces real computation that the
//! compiler cannot remove. Operations are always invoked through
//! `&mut dyn NoiseOperation` and their `invoke` bodies are `#[inline(never)]`,
//! so the harness never inlines the work between its two timestamp reads.

mod basic;
mod hardware;
pub mod platform;
mod workloads;

use serde::Deserialize;

use crate::config::Capabilities;
use crate::error::Error;
use crate::jitter::{JitterBackend, JitterCollector};
use crate::timer::CycleCounter;

pub use basic::{BusyLoop, Cube, ReadClock, ReadCycleCounter};
pub use hardware::HardwareJitter;
pub use platform::{SoftwareInterrupt, TrapSyscall};
pub use workloads::{GraphColoring, TspApprox, TspExact};

/// A bounded workload over one mutable 64-bit slot.
pub trait NoiseOperation {
    fn name(&self) -> &'static str;

    fn invoke(&mut self, slot: &mut u64) -> Result<(), Error>;
}

/// Catalog of built-in noise operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    /// x := x * x * x
    Cube,
    /// Read the monotonic wall clock into the slot
    ReadClock,
    /// Raw getpid system-call trap
    TrapSyscall,
    /// Software interrupt (int 0x80 getpid)
    SoftwareInterrupt,
    /// 100,000-iteration increment loop
    BusyLoop,
    /// Read the raw cycle counter into the slot
    ReadCycleCounter,
    /// Prim MST tour cost on the fixed 6-vertex graph
    TspApprox,
    /// Bitmask-DP exact TSP on the fixed 4-city matrix
    TspExact,
    /// Backtracking 3-coloring of the fixed 6-vertex graph
    GraphColoring,
    /// Read 8 bytes from the jitter entropy collector
    HardwareJitter,
}

impl OperationKind {
    pub const ALL: [OperationKind; 10] = [
        OperationKind::Cube,
        OperationKind::ReadClock,
        OperationKind::TrapSyscall,
        OperationKind::SoftwareInterrupt,
        OperationKind::BusyLoop,
        OperationKind::ReadCycleCounter,
        OperationKind::TspApprox,
        OperationKind::TspExact,
        OperationKind::GraphColoring,
        OperationKind::HardwareJitter,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            OperationKind::Cube => "cube",
            OperationKind::ReadClock => "read-clock",
            OperationKind::TrapSyscall => "trap-syscall",
            OperationKind::SoftwareInterrupt => "software-interrupt",
            OperationKind::BusyLoop => "busy-loop",
            OperationKind::ReadCycleCounter => "read-cycle-counter",
            OperationKind::TspApprox => "tsp-approx",
            OperationKind::TspExact => "tsp-exact",
            OperationKind::GraphColoring => "graph-coloring",
            OperationKind::HardwareJitter => "hardware-jitter",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            OperationKind::Cube => "O(1) arithmetic baseline (x = x^3)",
            OperationKind::ReadClock => "nested wall-clock read (syscall-class jitter)",
            OperationKind::TrapSyscall => "raw getpid syscall trap (privileged, Linux x86_64/aarch64)",
            OperationKind::SoftwareInterrupt => {
                "int 0x80 software interrupt (needs IA-32 emulation, Linux x86_64)"
            }
            OperationKind::BusyLoop => "100,000-iteration increment loop",
            OperationKind::ReadCycleCounter => "raw cycle-counter read overhead",
            OperationKind::TspApprox => "Prim MST tour cost, 6 vertices",
            OperationKind::TspExact => "bitmask-DP exact TSP, 4 cities",
            OperationKind::GraphColoring => "backtracking 3-coloring, 6 vertices",
            OperationKind::HardwareJitter => "8-byte read from the jitter entropy collector",
        }
    }

    /// Default number of samples to take when none is configured.
    pub fn suggested_samples(&self) -> usize {
        match self {
            OperationKind::Cube => 100,
            OperationKind::ReadClock => 1_000,
            OperationKind::ReadCycleCounter => 10_000,
            OperationKind::HardwareJitter => 100,
            OperationKind::TrapSyscall
            | OperationKind::SoftwareInterrupt
            | OperationKind::BusyLoop
            | OperationKind::TspApprox
            | OperationKind::TspExact
            | OperationKind::GraphColoring => 1_000,
        }
    }

    /// Checks that the target implements this operation and, for trap
    /// instructions, that the capability flag enables it.
    pub fn check_available(&self, caps: &Capabilities) -> Result<(), Error> {
        match self {
            OperationKind::TrapSyscall => {
                if !platform::SYSCALL_TRAP_SUPPORTED {
                    return Err(Error::Unsupported(
                        "raw syscall trap is not implemented for this target".into(),
                    ));
                }
                if !caps.syscall_trap {
                    return Err(Error::Unsupported(
                        "raw syscall trap is disabled (enable capabilities.syscall_trap)".into(),
                    ));
                }
                Ok(())
            }
            OperationKind::SoftwareInterrupt => {
                if !platform::SOFTWARE_INTERRUPT_SUPPORTED {
                    return Err(Error::Unsupported(
                        "software interrupt is not implemented for this target".into(),
                    ));
                }
                if !caps.software_interrupt {
                    return Err(Error::Unsupported(
                        "software interrupt is disabled (enable capabilities.software_interrupt)"
                            .into(),
                    ));
                }
                Ok(())
            }
            OperationKind::ReadCycleCounter if !CycleCounter::SUPPORTED => Err(
                Error::Unsupported("no cycle counter on this architecture".into()),
            ),
            _ => Ok(()),
        }
    }
}

/// Constructs the operation for `kind`. The hardware jitter operation borrows
/// `collector`; every other operation ignores it.
pub fn build<'a, B: JitterBackend + 'a>(
    kind: OperationKind,
    caps: &Capabilities,
    collector: &'a mut JitterCollector<B>,
) -> Result<Box<dyn NoiseOperation + 'a>, Error> {
    kind.check_available(caps)?;
    let op: Box<dyn NoiseOperation + 'a> = match kind {
        OperationKind::Cube => Box::new(Cube),
        OperationKind::ReadClock => Box::new(ReadClock::default()),
        OperationKind::TrapSyscall => Box::new(TrapSyscall),
        OperationKind::SoftwareInterrupt => Box::new(SoftwareInterrupt),
        OperationKind::BusyLoop => Box::new(BusyLoop::default()),
        OperationKind::ReadCycleCounter => Box::new(ReadCycleCounter),
        OperationKind::TspApprox => Box::new(TspApprox::default()),
        OperationKind::TspExact => Box::new(TspExact::default()),
        OperationKind::GraphColoring => Box::new(GraphColoring::default()),
        OperationKind::HardwareJitter => Box::new(HardwareJitter::new(collector)),
    };
    Ok(op)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JitterConfig;
    use crate::jitter::software::TimingJitter;

    fn collector() -> JitterCollector<TimingJitter> {
        JitterCollector::new(TimingJitter, &JitterConfig::default())
    }

    #[test]
    fn test_names_match_value_enum() {
        use clap::ValueEnum;
        for kind in OperationKind::ALL {
            let pv = kind.to_possible_value().unwrap();
            assert_eq!(pv.get_name(), kind.name());
        }
    }

    #[test]
    fn test_all_is_complete() {
        assert_eq!(
            OperationKind::ALL.len(),
            <OperationKind as clap::ValueEnum>::value_variants().len()
        );
    }

    #[test]
    fn test_trap_ops_disabled_by_default() {
        let caps = Capabilities::default();
        for kind in [OperationKind::TrapSyscall, OperationKind::SoftwareInterrupt] {
            assert!(matches!(
                kind.check_available(&caps),
                Err(Error::Unsupported(_))
            ));
        }
    }

    #[test]
    fn test_trap_syscall_follows_target_support() {
        let caps = Capabilities {
            syscall_trap: true,
            ..Default::default()
        };
        let result = OperationKind::TrapSyscall.check_available(&caps);
        assert_eq!(result.is_ok(), platform::SYSCALL_TRAP_SUPPORTED);
    }

    #[test]
    fn test_build_every_unprivileged_op() {
        let caps = Capabilities::default();
        let mut collector = collector();
        for kind in OperationKind::ALL {
            if matches!(
                kind,
                OperationKind::TrapSyscall | OperationKind::SoftwareInterrupt
            ) {
                continue;
            }
            if kind == OperationKind::ReadCycleCounter && !CycleCounter::SUPPORTED {
                continue;
            }
            let op = build(kind, &caps, &mut collector).unwrap();
            assert_eq!(op.name(), kind.name());
        }
    }

    #[test]
    fn test_build_refuses_disabled_op() {
        let mut collector = collector();
        let result = build(
            OperationKind::SoftwareInterrupt,
            &Capabilities::default(),
            &mut collector,
        );
        assert!(matches!(result, Err(Error::Unsupported(_))));
    }

    #[test]
    fn test_suggested_samples() {
        assert_eq!(OperationKind::Cube.suggested_samples(), 100);
        assert_eq!(OperationKind::ReadClock.suggested_samples(), 1_000);
    }
}
