//! RTC-domain pin (GPIO16)
//!
//! GPIO16 sits in the RTC block rather than the GPIO block. It has no mux
//! choice, no interrupt and no wakeup support: only direction and level.
//! Each operation is a fixed read-modify-write of bit 0 of an RTC
//! register.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use sprout_hal::RegisterBank;

use super::controller::update_locked;
use super::regs;

/// The RTC-domain pin
pub struct RtcPin<B> {
    bank: B,
}

impl<B: RegisterBank> RtcPin<B> {
    pub fn new(bank: B) -> Self {
        Self { bank }
    }

    pub fn bank(&self) -> &B {
        &self.bank
    }

    /// Route the pad to RTC GPIO0 and enable its output driver
    pub fn configure_as_output(&mut self) {
        self.route_pad();
        update_locked(&mut self.bank, regs::RTC_GPIO_ENABLE, regs::RTC_PIN_BIT, regs::RTC_PIN_BIT);
    }

    /// Route the pad to RTC GPIO0 and disable its output driver
    pub fn configure_as_input(&mut self) {
        self.route_pad();
        update_locked(&mut self.bank, regs::RTC_GPIO_ENABLE, regs::RTC_PIN_BIT, 0);
    }

    /// Drive the output latch
    pub fn write(&mut self, high: bool) {
        let level = if high { regs::RTC_PIN_BIT } else { 0 };
        update_locked(&mut self.bank, regs::RTC_GPIO_OUT, regs::RTC_PIN_BIT, level);
    }

    /// Sample the input level
    pub fn read(&self) -> bool {
        self.bank.read(regs::RTC_GPIO_IN_DATA) & regs::RTC_PIN_BIT != 0
    }

    fn route_pad(&mut self) {
        update_locked(
            &mut self.bank,
            regs::PAD_XPD_DCDC_CONF,
            regs::XPD_DCDC_MUX_CLEAR,
            regs::XPD_DCDC_MUX_RTC_GPIO,
        );
        update_locked(&mut self.bank, regs::RTC_GPIO_CONF, regs::RTC_PIN_BIT, 0);
    }
}

impl<B> ErrorType for RtcPin<B> {
    type Error = Infallible;
}

impl<B: RegisterBank> OutputPin for RtcPin<B> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(true);
        Ok(())
    }
}

impl<B: RegisterBank> InputPin for RtcPin<B> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.read())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.read())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprout_hal::sim::SimRegisters;

    fn pin() -> RtcPin<SimRegisters<8>> {
        RtcPin::new(SimRegisters::new())
    }

    #[test]
    fn test_configure_as_output() {
        let mut pin = pin();
        pin.configure_as_output();

        let bank = pin.bank();
        assert_eq!(bank.peek(regs::PAD_XPD_DCDC_CONF) & 0x43, 0x1);
        assert_eq!(bank.peek(regs::RTC_GPIO_CONF) & 1, 0);
        assert_eq!(bank.peek(regs::RTC_GPIO_ENABLE) & 1, 1);
    }

    #[test]
    fn test_configure_as_input_preserves_other_bits() {
        let mut pin = pin();
        pin.configure_as_output();
        pin.configure_as_input();
        assert_eq!(pin.bank().peek(regs::RTC_GPIO_ENABLE) & 1, 0);

        let mut bank = SimRegisters::<8>::new();
        bank.poke(regs::PAD_XPD_DCDC_CONF, 0xFFFF_FFFF);
        bank.poke(regs::RTC_GPIO_ENABLE, 0xF0);
        let mut other = RtcPin::new(bank);
        other.configure_as_input();
        assert_eq!(other.bank().peek(regs::PAD_XPD_DCDC_CONF), 0xFFFF_FFBD);
        assert_eq!(other.bank().peek(regs::RTC_GPIO_ENABLE), 0xF0);
    }

    #[test]
    fn test_write_sets_only_bit_zero() {
        let mut bank = SimRegisters::<8>::new();
        bank.poke(regs::RTC_GPIO_OUT, 0x100);
        let mut pin = RtcPin::new(bank);

        pin.write(true);
        assert_eq!(pin.bank().peek(regs::RTC_GPIO_OUT), 0x101);
        pin.write(false);
        assert_eq!(pin.bank().peek(regs::RTC_GPIO_OUT), 0x100);
    }

    #[test]
    fn test_read_samples_bit_zero() {
        let mut bank = SimRegisters::<8>::new();
        bank.poke(regs::RTC_GPIO_IN_DATA, 0xFE);
        let pin = RtcPin::new(bank);
        assert!(!pin.read());

        let mut bank = SimRegisters::<8>::new();
        bank.poke(regs::RTC_GPIO_IN_DATA, 0x1);
        let pin = RtcPin::new(bank);
        assert!(pin.read());
    }

    #[test]
    fn test_embedded_hal_traits() {
        let mut pin = pin();
        pin.configure_as_output();
        pin.set_high().unwrap();
        assert_eq!(pin.bank().peek(regs::RTC_GPIO_OUT), 1);
        pin.set_low().unwrap();
        assert_eq!(pin.bank().peek(regs::RTC_GPIO_OUT), 0);
        assert!(pin.is_low().unwrap());
    }
}
