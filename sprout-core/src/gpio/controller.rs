//! Main-bank pin controller
//!
//! Drives GPIO 0..15 through the GPIO and IO MUX register blocks. Every
//! read-modify-write of a shared register happens inside a critical
//! section that spans exactly one register update, keeping interrupt
//! latency bounded.

use sprout_hal::RegisterBank;

use super::irq::{GpioHandler, InterruptSlot, GPIO_INTERRUPT};
use super::regs;
use super::types::{
    gpio_mux_function, Direction, DriveMode, InterruptType, PinConfig, PinMask, PinMode,
    PIN_COUNT,
};

/// Read-modify-write `addr` inside a critical section
pub(crate) fn update_locked<B: RegisterBank>(bank: &mut B, addr: u32, clear: u32, set: u32) {
    critical_section::with(|_| bank.modify(addr, clear, set));
}

/// Pin controller for the 16-pin main bank
pub struct PinController<B> {
    bank: B,
    interrupts: &'static InterruptSlot,
}

impl<B: RegisterBank> PinController<B> {
    /// Create a controller using the global GPIO interrupt slot
    pub fn new(bank: B) -> Self {
        Self::with_slot(bank, &GPIO_INTERRUPT)
    }

    /// Create a controller bound to a specific interrupt slot
    pub fn with_slot(bank: B, interrupts: &'static InterruptSlot) -> Self {
        Self { bank, interrupts }
    }

    /// Borrow the underlying register bank
    pub fn bank(&self) -> &B {
        &self.bank
    }

    /// Mutably borrow the underlying register bank
    pub fn bank_mut(&mut self) -> &mut B {
        &mut self.bank
    }

    /// Release the underlying register bank
    pub fn into_inner(self) -> B {
        self.bank
    }

    /// Bring-up step: clear every pin's trigger type and wakeup flag and
    /// acknowledge stale interrupt status
    pub fn init(&mut self) {
        let clear = regs::PIN_INT_TYPE.mask() | regs::PIN_WAKEUP_ENABLE.mask();
        for pin in 0..PIN_COUNT {
            update_locked(&mut self.bank, regs::pin(pin), clear, 0);
        }
        self.acknowledge_interrupts(PinMask::ALL);
    }

    /// Apply one mode, pull-up setting and trigger type to every pin in `pins`
    ///
    /// Pins outside `pins` are not touched. An empty mask writes nothing.
    pub fn configure(
        &mut self,
        pins: PinMask,
        mode: PinMode,
        pull_up: bool,
        interrupt: InterruptType,
    ) {
        if pins.is_empty() {
            return;
        }

        // Direction for the whole mask in one write
        match mode.direction() {
            Some(Direction::Output) => self.bank.write(regs::ENABLE_W1TS, pins.bits() as u32),
            Some(Direction::Input) => self.bank.write(regs::ENABLE_W1TC, pins.bits() as u32),
            None => {}
        }

        for pin in pins.iter() {
            let pull = if pull_up { regs::MUX_PULLUP } else { 0 };
            update_locked(
                &mut self.bank,
                regs::io_mux(pin),
                regs::MUX_FUNC_MASK | regs::MUX_PULLUP,
                regs::mux_func_bits(gpio_mux_function(pin)) | pull,
            );

            match mode {
                PinMode::OpenDrain => update_locked(
                    &mut self.bank,
                    regs::pin(pin),
                    regs::PIN_DRIVER.mask(),
                    regs::PIN_DRIVER.encode(1),
                ),
                PinMode::SigmaDelta => critical_section::with(|_| {
                    self.bank.modify(
                        regs::pin(pin),
                        regs::PIN_SOURCE.mask(),
                        regs::PIN_SOURCE.encode(1),
                    );
                    self.bank.write(regs::SIGMA_DELTA, regs::SIGMA_DELTA_ENABLE);
                }),
                PinMode::Input | PinMode::Output => {}
            }

            self.set_interrupt_type(pin, interrupt);
        }
    }

    /// Write the four output masks
    ///
    /// Each mask is written to its own write-1 register. The writes are
    /// independent: no ordering between them and no atomicity across them,
    /// so a bit must appear in at most one mask. Split the call when order
    /// matters.
    pub fn set_outputs(
        &mut self,
        set: PinMask,
        clear: PinMask,
        enable: PinMask,
        disable: PinMask,
    ) {
        self.bank.write(regs::OUT_W1TS, set.bits() as u32);
        self.bank.write(regs::OUT_W1TC, clear.bits() as u32);
        self.bank.write(regs::ENABLE_W1TS, enable.bits() as u32);
        self.bank.write(regs::ENABLE_W1TC, disable.bits() as u32);
    }

    /// Instantaneous input level of every pin
    pub fn read_inputs(&self) -> PinMask {
        PinMask(self.bank.read(regs::IN) as u16)
    }

    /// Install the GPIO interrupt handler, replacing any previous one
    pub fn register_interrupt_handler(&mut self, handler: GpioHandler, context: usize) {
        self.interrupts.register(handler, context);
    }

    /// Set the trigger type of `pin`
    pub fn set_interrupt_type(&mut self, pin: u8, interrupt: InterruptType) {
        debug_assert!(pin < PIN_COUNT);
        update_locked(
            &mut self.bank,
            regs::pin(pin),
            regs::PIN_INT_TYPE.mask(),
            regs::PIN_INT_TYPE.encode(interrupt.bits()),
        );
    }

    /// Let `pin` wake the chip on a level interrupt
    ///
    /// Edge triggers cannot wake the chip; for those the call does nothing.
    pub fn enable_wakeup(&mut self, pin: u8, interrupt: InterruptType) {
        debug_assert!(pin < PIN_COUNT);
        if !interrupt.can_wake() {
            return;
        }

        update_locked(
            &mut self.bank,
            regs::pin(pin),
            regs::PIN_INT_TYPE.mask(),
            regs::PIN_INT_TYPE.encode(interrupt.bits()) | regs::PIN_WAKEUP_ENABLE.encode(1),
        );
    }

    /// Disable wakeup on every pin that has it, clearing its trigger type too
    pub fn disable_all_wakeup(&mut self) {
        for pin in 0..PIN_COUNT {
            let addr = regs::pin(pin);
            critical_section::with(|_| {
                let value = self.bank.read(addr);
                if regs::PIN_WAKEUP_ENABLE.decode(value) != 0 {
                    let cleared = value
                        & !(regs::PIN_INT_TYPE.mask() | regs::PIN_WAKEUP_ENABLE.mask());
                    self.bank.write(
                        addr,
                        cleared | regs::PIN_INT_TYPE.encode(InterruptType::Disabled.bits()),
                    );
                }
            });
        }
    }

    /// Pins with a pending interrupt
    pub fn interrupt_pending(&self) -> PinMask {
        PinMask(self.bank.read(regs::STATUS) as u16)
    }

    /// Clear the pending status of `pins` and allow them to be delivered again
    pub fn acknowledge_interrupts(&mut self, pins: PinMask) {
        self.bank.write(regs::STATUS_W1TC, pins.bits() as u32);
        self.interrupts.acknowledge(pins);
    }

    /// Entry point for the interrupt-delivery path
    ///
    /// Reads the pending status and hands new pins to the registered
    /// handler. Returns the pins delivered.
    pub fn handle_interrupt(&self) -> PinMask {
        self.interrupts.dispatch(self.interrupt_pending())
    }

    /// Decode the current register state of `pin`
    pub fn pin_config(&self, pin: u8) -> PinConfig {
        debug_assert!(pin < PIN_COUNT);
        let control = self.bank.read(regs::pin(pin));
        let mux = self.bank.read(regs::io_mux(pin));
        let enabled = self.bank.read(regs::ENABLE) & (1 << pin) != 0;

        let drive = if regs::PIN_SOURCE.decode(control) != 0 {
            DriveMode::SigmaDelta
        } else if regs::PIN_DRIVER.decode(control) != 0 {
            DriveMode::OpenDrain
        } else {
            DriveMode::PushPull
        };

        PinConfig {
            direction: if enabled {
                Direction::Output
            } else {
                Direction::Input
            },
            mux: regs::mux_func(mux),
            pull_up: mux & regs::MUX_PULLUP != 0,
            drive,
            interrupt: InterruptType::from_bits(regs::PIN_INT_TYPE.decode(control)),
            wakeup: regs::PIN_WAKEUP_ENABLE.decode(control) != 0,
        }
    }
}
