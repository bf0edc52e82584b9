//! Simulated hardware for host-side tests
//!
//! - [`SimRegisters`]: a sparse register file with optional write-1-to-set
//!   and write-1-to-clear aliases, counting every write
//! - [`SimMemory`]: a flat block of word memory at a base address
//!
//! Unwritten registers read as zero. Misuse (out-of-range addresses, a full
//! register file) panics, since these types only ever back tests.

use heapless::{LinearMap, Vec};

use crate::memory::WordMemory;
use crate::register::RegisterBank;

/// How an alias address acts on its target register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasKind {
    /// Bits written as 1 are set in the target
    SetBits,
    /// Bits written as 1 are cleared in the target
    ClearBits,
}

#[derive(Debug, Clone, Copy)]
struct Alias {
    addr: u32,
    target: u32,
    kind: AliasKind,
}

/// In-memory register file
#[derive(Debug, Clone)]
pub struct SimRegisters<const N: usize> {
    values: LinearMap<u32, u32, N>,
    aliases: Vec<Alias, 8>,
    writes: usize,
}

impl<const N: usize> Default for SimRegisters<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> SimRegisters<N> {
    /// Create an empty register file
    pub fn new() -> Self {
        Self {
            values: LinearMap::new(),
            aliases: Vec::new(),
            writes: 0,
        }
    }

    /// Make writes to `addr` set or clear bits in `target` instead of storing
    pub fn alias(mut self, addr: u32, target: u32, kind: AliasKind) -> Self {
        assert!(
            self.aliases.push(Alias { addr, target, kind }).is_ok(),
            "sim alias table full"
        );
        self
    }

    /// Number of writes performed through [`RegisterBank`] so far
    pub fn write_count(&self) -> usize {
        self.writes
    }

    /// Reset the write counter
    pub fn clear_write_count(&mut self) {
        self.writes = 0;
    }

    /// Hardware-side update (e.g. an input level changing); not counted as a write
    pub fn poke(&mut self, addr: u32, value: u32) {
        self.store(addr, value);
    }

    /// Hardware-side read; identical to [`RegisterBank::read`]
    pub fn peek(&self, addr: u32) -> u32 {
        self.values.get(&addr).copied().unwrap_or(0)
    }

    fn store(&mut self, addr: u32, value: u32) {
        assert!(
            self.values.insert(addr, value).is_ok(),
            "sim register file full"
        );
    }
}

impl<const N: usize> RegisterBank for SimRegisters<N> {
    fn read(&self, addr: u32) -> u32 {
        self.peek(addr)
    }

    fn write(&mut self, addr: u32, value: u32) {
        self.writes += 1;
        match self.aliases.iter().find(|a| a.addr == addr).copied() {
            Some(alias) => {
                let current = self.peek(alias.target);
                let next = match alias.kind {
                    AliasKind::SetBits => current | value,
                    AliasKind::ClearBits => current & !value,
                };
                self.store(alias.target, next);
            }
            None => self.store(addr, value),
        }
    }
}

/// Flat word memory starting at `base`
#[derive(Debug, Clone)]
pub struct SimMemory<const WORDS: usize> {
    base: u32,
    words: [u32; WORDS],
}

impl<const WORDS: usize> SimMemory<WORDS> {
    /// Create memory filled with `fill`
    pub fn new(base: u32, fill: u32) -> Self {
        Self {
            base,
            words: [fill; WORDS],
        }
    }

    /// First byte address
    pub fn base(&self) -> u32 {
        self.base
    }

    /// One past the last byte address
    pub fn end(&self) -> u32 {
        self.base + (WORDS as u32) * 4
    }

    /// Copy `out.len()` bytes starting at byte address `addr`
    pub fn read_bytes(&self, addr: u32, out: &mut [u8]) {
        for (i, byte) in out.iter_mut().enumerate() {
            let a = addr + i as u32;
            let word = self.words[self.index(a & !3)];
            *byte = word.to_le_bytes()[(a & 3) as usize];
        }
    }

    fn index(&self, addr: u32) -> usize {
        assert!(addr % 4 == 0, "unaligned word access at {addr:#010x}");
        assert!(
            addr >= self.base && addr < self.end(),
            "address {addr:#010x} outside simulated memory"
        );
        ((addr - self.base) / 4) as usize
    }
}

impl<const WORDS: usize> WordMemory for SimMemory<WORDS> {
    fn read_word(&self, addr: u32) -> u32 {
        self.words[self.index(addr)]
    }

    fn write_word(&mut self, addr: u32, value: u32) {
        let i = self.index(addr);
        self.words[i] = value;
    }
}
