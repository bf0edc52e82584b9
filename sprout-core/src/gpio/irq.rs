//! GPIO interrupt handler slot
//!
//! The GPIO block has a single interrupt line, so there is exactly one
//! handler slot. Registering a handler replaces the previous one; there is
//! no queue and no chaining. Applications that need several consumers
//! demultiplex inside their handler.
//!
//! Delivery follows a deliver-then-mask discipline: once the handler has
//! been called for a set of pins, those pins are not delivered again until
//! they are acknowledged.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use super::types::PinMask;

/// GPIO interrupt handler
///
/// Called with the pins being delivered and the context word given at
/// registration.
pub type GpioHandler = fn(pending: PinMask, context: usize);

#[derive(Clone, Copy)]
struct Registration {
    handler: GpioHandler,
    context: usize,
}

#[derive(Clone, Copy)]
struct SlotState {
    registration: Option<Registration>,
    /// Pins delivered and not yet acknowledged
    masked: PinMask,
}

/// One-entry handler registry
pub struct InterruptSlot {
    state: Mutex<CriticalSectionRawMutex, Cell<SlotState>>,
}

impl Default for InterruptSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl InterruptSlot {
    /// Create an empty slot
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(Cell::new(SlotState {
                registration: None,
                masked: PinMask::NONE,
            })),
        }
    }

    /// Install `handler`, replacing any previous registration
    ///
    /// Returns `true` if a previous handler was replaced.
    pub fn register(&self, handler: GpioHandler, context: usize) -> bool {
        self.state.lock(|cell| {
            let mut state = cell.get();
            let replaced = state.registration.is_some();
            state.registration = Some(Registration { handler, context });
            cell.set(state);
            replaced
        })
    }

    /// Whether a handler is installed
    pub fn is_registered(&self) -> bool {
        self.state.lock(|cell| cell.get().registration.is_some())
    }

    /// Pins delivered and awaiting acknowledgement
    pub fn masked(&self) -> PinMask {
        self.state.lock(|cell| cell.get().masked)
    }

    /// Deliver `pending` to the handler
    ///
    /// Only pins not already awaiting acknowledgement are delivered; they
    /// are masked before the handler runs. Returns the delivered pins,
    /// which is empty when no handler is installed or nothing is new.
    pub fn dispatch(&self, pending: PinMask) -> PinMask {
        let delivery = self.state.lock(|cell| {
            let mut state = cell.get();
            let registration = state.registration?;
            let deliver = pending & !state.masked;
            if deliver.is_empty() {
                return None;
            }
            state.masked = state.masked | deliver;
            cell.set(state);
            Some((registration, deliver))
        });

        match delivery {
            Some((registration, deliver)) => {
                (registration.handler)(deliver, registration.context);
                deliver
            }
            None => PinMask::NONE,
        }
    }

    /// Allow `pins` to be delivered again
    pub fn acknowledge(&self, pins: PinMask) {
        self.state.lock(|cell| {
            let mut state = cell.get();
            state.masked = state.masked & !pins;
            cell.set(state);
        });
    }
}

/// The GPIO interrupt slot used by [`PinController::new`](super::PinController::new)
pub static GPIO_INTERRUPT: InterruptSlot = InterruptSlot::new();

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicU32, Ordering};

    static FIRST_CALLS: AtomicU32 = AtomicU32::new(0);
    static SECOND_CALLS: AtomicU32 = AtomicU32::new(0);
    static SECOND_CONTEXT: AtomicU32 = AtomicU32::new(0);

    fn first(_pending: PinMask, _context: usize) {
        FIRST_CALLS.fetch_add(1, Ordering::SeqCst);
    }

    fn second(_pending: PinMask, context: usize) {
        SECOND_CALLS.fetch_add(1, Ordering::SeqCst);
        SECOND_CONTEXT.store(context as u32, Ordering::SeqCst);
    }

    static MASK_CALLS: AtomicU32 = AtomicU32::new(0);
    static MASK_LAST: AtomicU32 = AtomicU32::new(0);

    fn recorder(pending: PinMask, _context: usize) {
        MASK_CALLS.fetch_add(1, Ordering::SeqCst);
        MASK_LAST.store(pending.bits() as u32, Ordering::SeqCst);
    }

    #[test]
    fn test_dispatch_without_handler() {
        let slot = InterruptSlot::new();
        assert!(!slot.is_registered());
        assert_eq!(slot.dispatch(PinMask::pin(3)), PinMask::NONE);
        // Nothing delivered, nothing masked
        assert_eq!(slot.masked(), PinMask::NONE);
    }

    #[test]
    fn test_register_replaces_previous() {
        let slot = InterruptSlot::new();
        assert!(!slot.register(first, 0));
        assert!(slot.register(second, 0xCAFE));

        slot.dispatch(PinMask::pin(1));
        assert_eq!(FIRST_CALLS.load(Ordering::SeqCst), 0);
        assert_eq!(SECOND_CALLS.load(Ordering::SeqCst), 1);
        assert_eq!(SECOND_CONTEXT.load(Ordering::SeqCst), 0xCAFE);
    }

    #[test]
    fn test_not_redelivered_until_acknowledged() {
        let slot = InterruptSlot::new();
        slot.register(recorder, 0);

        let delivered = slot.dispatch(PinMask::pin(4) | PinMask::pin(9));
        assert_eq!(delivered.bits(), 0x0210);
        assert_eq!(MASK_CALLS.load(Ordering::SeqCst), 1);

        // Same pins still pending: no call
        assert_eq!(slot.dispatch(PinMask::pin(4)), PinMask::NONE);
        assert_eq!(MASK_CALLS.load(Ordering::SeqCst), 1);

        // A new pin alongside a masked one: only the new pin is delivered
        assert_eq!(slot.dispatch(PinMask::pin(4) | PinMask::pin(6)), PinMask::pin(6));
        assert_eq!(MASK_LAST.load(Ordering::SeqCst), 1 << 6);

        slot.acknowledge(PinMask::pin(4));
        assert_eq!(slot.masked(), PinMask::pin(9) | PinMask::pin(6));
        assert_eq!(slot.dispatch(PinMask::pin(4)), PinMask::pin(4));
        assert_eq!(MASK_CALLS.load(Ordering::SeqCst), 3);
    }

    static CONTEXT_PENDING: AtomicU32 = AtomicU32::new(0);
    static CONTEXT_WORD: AtomicU32 = AtomicU32::new(0);

    fn with_context(pending: PinMask, context: usize) {
        CONTEXT_PENDING.store(pending.bits() as u32, Ordering::SeqCst);
        CONTEXT_WORD.store(context as u32, Ordering::SeqCst);
    }

    #[test]
    fn test_handler_receives_pending_and_context() {
        let slot = InterruptSlot::new();
        slot.register(with_context, 7);
        slot.dispatch(PinMask(0x8001));
        assert_eq!(CONTEXT_PENDING.load(Ordering::SeqCst), 0x8001);
        assert_eq!(CONTEXT_WORD.load(Ordering::SeqCst), 7);
    }
}
