//! Interrupt vector base setup
//!
//! Pointing the CPU at its exception vectors is a short, architecture
//! specific instruction sequence. It is treated as an opaque primitive
//! and invoked exactly once during bring-up.

/// Platform primitive that installs the interrupt vector base
pub trait VectorTable {
    /// Point the processor's vector base at `base`
    fn install(&mut self, base: u32);
}

impl<T: VectorTable + ?Sized> VectorTable for &mut T {
    fn install(&mut self, base: u32) {
        (**self).install(base)
    }
}
