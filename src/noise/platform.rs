//! Per-target trap instructions.
//!
//! Both operations issue `getpid` directly at the instruction level, bypassing
//! libc, to sample the kernel's trap-handling jitter.
//!
//! - The raw syscall trap (`syscall` on x86_64, `svc 0` on aarch64) follows the
//!   Linux syscall ABI for that architecture. Other kernels renumber or reject
//!   raw syscalls, so every other target reports `Unsupported`.
//! - The software interrupt (`int 0x80`) enters the kernel through the legacy
//!   IA-32 compat gate. On kernels built without IA-32 emulation, or booted with
//!   `ia32_emulation=0`, the instruction raises SIGSEGV and the process dies.
//!   This cannot be detected beforehand, which is why it stays behind an
//!   explicit capability flag.

use super::NoiseOperation;
use crate::error::Error;

pub const SYSCALL_TRAP_SUPPORTED: bool = cfg!(all(
    target_os = "linux",
    any(target_arch = "x86_64", target_arch = "aarch64")
));

pub const SOFTWARE_INTERRUPT_SUPPORTED: bool =
    cfg!(all(target_os = "linux", target_arch = "x86_64"));

/// Issues a raw `getpid` system call and returns the kernel's result.
pub fn trap_syscall() -> Result<u64, Error> {
    #[cfg(all(target_os = "linux", target_arch = "x86_64"))]
    {
        const SYS_GETPID: u64 = 39;
        let ret: u64;
        // SAFETY: getpid takes no arguments and cannot fail. The kernel
        // clobbers rcx (return address) and r11 (saved rflags).
        unsafe {
            core::arch::asm!(
                "syscall",
                inlateout("rax") SYS_GETPID => ret,
                lateout("rcx") _,
                lateout("r11") _,
                options(nostack),
            );
        }
        Ok(ret)
    }

    #[cfg(all(target_os = "linux", target_arch = "aarch64"))]
    {
        const SYS_GETPID: u64 = 172;
        let ret: u64;
        // SAFETY: getpid takes no arguments and cannot fail; the result
        // comes back in x0.
        unsafe {
            core::arch::asm!(
                "svc 0",
                in("x8") SYS_GETPID,
                lateout("x0") ret,
                options(nostack),
            );
        }
        Ok(ret)
    }

    #[cfg(not(all(
        target_os = "linux",
        any(target_arch = "x86_64", target_arch = "aarch64")
    )))]
    {
        Err(Error::Unsupported(
            "raw syscall trap is not implemented for this target".into(),
        ))
    }
}

/// Issues `int 0x80` with the IA-32 `getpid` number.
///
/// # Undefined on some kernels
///
/// Kills the process with SIGSEGV when the kernel lacks IA-32 emulation.
pub fn software_interrupt() -> Result<u64, Error> {
    #[cfg(all(target_os = "linux", target_arch = "x86_64"))]
    {
        const IA32_GETPID: u32 = 20;
        let ret: u32;
        // SAFETY: getpid has no arguments. The compat entry path zeroes
        // r8-r11 on return to 64-bit code.
        unsafe {
            core::arch::asm!(
                "int 0x80",
                inlateout("eax") IA32_GETPID => ret,
                lateout("r8") _,
                lateout("r9") _,
                lateout("r10") _,
                lateout("r11") _,
                options(nostack),
            );
        }
        Ok(u64::from(ret))
    }

    #[cfg(not(all(target_os = "linux", target_arch = "x86_64")))]
    {
        Err(Error::Unsupported(
            "software interrupt is not implemented for this target".into(),
        ))
    }
}

#[derive(Debug, Default)]
pub struct TrapSyscall;

impl NoiseOperation for TrapSyscall {
    fn name(&self) -> &'static str {
        "trap-syscall"
    }

    #[inline(never)]
    fn invoke(&mut self, slot: &mut u64) -> Result<(), Error> {
        *slot = trap_syscall()?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct SoftwareInterrupt;

impl NoiseOperation for SoftwareInterrupt {
    fn name(&self) -> &'static str {
        "software-interrupt"
    }

    #[inline(never)]
    fn invoke(&mut self, slot: &mut u64) -> Result<(), Error> {
        *slot = software_interrupt()?;
        Ok(())
    }
}
