//! Single-core critical section
//!
//! The lx106 has one core, so masking interrupts is enough: raise the
//! interrupt level to 15 and restore the saved `PS` on release.

use critical_section::RawRestoreState;

struct SingleCore;
critical_section::set_impl!(SingleCore);

unsafe impl critical_section::Impl for SingleCore {
    unsafe fn acquire() -> RawRestoreState {
        let ps: u32;
        core::arch::asm!("rsil {0}, 15", out(reg) ps, options(nostack));
        ps
    }

    unsafe fn release(token: RawRestoreState) {
        core::arch::asm!("wsr.ps {0}", "rsync", in(reg) token, options(nostack));
    }
}
