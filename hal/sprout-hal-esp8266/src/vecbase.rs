//! Xtensa vector base and interrupt level

use sprout_hal::VectorTable;

/// The `VECBASE` special register
///
/// Installing the base also raises `PS.INTLEVEL` to 2, which masks the
/// level-1 interrupts (GPIO, timers, Wi-Fi MAC). Subsystem init can then
/// attach handlers without one firing against half-initialized state.
/// The runtime drops the level again when it starts scheduling.
pub struct Vecbase;

impl VectorTable for Vecbase {
    #[cfg(target_arch = "xtensa")]
    fn install(&mut self, base: u32) {
        // SAFETY: `base` points at the exception vectors linked into IRAM.
        // Only PS.INTLEVEL changes.
        unsafe {
            core::arch::asm!(
                "rsil {ps}, 2",
                "wsr.vecbase {base}",
                "rsync",
                ps = out(reg) _,
                base = in(reg) base,
                options(nostack),
            );
        }
    }

    #[cfg(not(target_arch = "xtensa"))]
    fn install(&mut self, _base: u32) {}
}

/// Drop `PS.INTLEVEL` to 0 so level-1 interrupts are taken
///
/// # Safety
///
/// Every unmasked interrupt must have its handler attached.
#[cfg(target_arch = "xtensa")]
pub unsafe fn enable_interrupts() {
    core::arch::asm!("rsil {0}, 0", out(reg) _, options(nostack));
}

/// Drop `PS.INTLEVEL` to 0 so level-1 interrupts are taken
///
/// # Safety
///
/// Every unmasked interrupt must have its handler attached.
#[cfg(not(target_arch = "xtensa"))]
pub unsafe fn enable_interrupts() {}
