//! Subsystem bring-up steps
//!
//! Wraps the vendor init calls into named steps. The list order is the
//! order the SDK requires; steps switched off in board.toml are left out.

use heapless::Vec;
use sprout_core::boot::{InitStep, StepError, StepFn};
use sprout_core::gpio::PinController;
use sprout_hal_esp8266::Mmio;

use crate::board_config as board;

/// Upper bound on the step list
pub const MAX_STEPS: usize = 10;

/// ETS interrupt number of the GPIO block
const ETS_GPIO_INUM: u32 = 4;

extern "C" {
    fn chip_boot();
    fn wifi_os_init();
    fn nvs_flash_init() -> i32;
    fn wifi_nvs_init() -> i32;
    fn rtc_init() -> i32;
    fn mac_init() -> i32;
    fn phy_calibrate() -> i32;
    fn watchdog_init() -> i32;
    fn wifi_timer_init() -> i32;
    fn _xt_isr_attach(
        inum: u32,
        handler: extern "C" fn(*mut core::ffi::c_void),
        arg: *mut core::ffi::c_void,
    );
    fn _xt_isr_unmask(mask: u32);
}

fn chip() -> Result<(), StepError> {
    unsafe { chip_boot() };
    Ok(())
}

fn os() -> Result<(), StepError> {
    unsafe { wifi_os_init() };
    Ok(())
}

fn nvs_flash() -> Result<(), StepError> {
    StepError::check(unsafe { nvs_flash_init() })
}

fn wifi_nvs() -> Result<(), StepError> {
    StepError::check(unsafe { wifi_nvs_init() })
}

fn rtc() -> Result<(), StepError> {
    StepError::check(unsafe { rtc_init() })
}

fn mac() -> Result<(), StepError> {
    StepError::check(unsafe { mac_init() })
}

/// Quiesce every pin's interrupt and wakeup state, then hook the GPIO ISR
fn gpio() -> Result<(), StepError> {
    // SAFETY: nothing else touches GPIO registers before the runtime starts
    let mut pins = PinController::new(unsafe { Mmio::steal() });
    pins.init();

    unsafe {
        _xt_isr_attach(ETS_GPIO_INUM, gpio_isr, core::ptr::null_mut());
        _xt_isr_unmask(1 << ETS_GPIO_INUM);
    }
    Ok(())
}

fn phy() -> Result<(), StepError> {
    StepError::check(unsafe { phy_calibrate() })
}

fn watchdog() -> Result<(), StepError> {
    StepError::check(unsafe { watchdog_init() })
}

fn wifi_timer() -> Result<(), StepError> {
    StepError::check(unsafe { wifi_timer_init() })
}

/// GPIO level-1 interrupt: deliver pending pins to the registered handler
extern "C" fn gpio_isr(_arg: *mut core::ffi::c_void) {
    // SAFETY: the ISR only reads status and writes W1TC aliases
    let pins = PinController::new(unsafe { Mmio::steal() });
    pins.handle_interrupt();
}

fn step(name: &'static str, init: StepFn) -> InitStep {
    InitStep::new(name, init)
}

/// The enabled steps, in run order
pub fn enabled() -> Vec<InitStep, MAX_STEPS> {
    let all: [(bool, InitStep); MAX_STEPS] = [
        (true, step("chip_boot", chip)),
        // The embassy runtime replaces the SDK's OS layer
        (cfg!(not(feature = "embassy-runtime")), step("os_init", os)),
        (board::STEP_NVS_FLASH, step("nvs_flash", nvs_flash)),
        (board::STEP_WIFI_NVS, step("wifi_nvs", wifi_nvs)),
        (board::STEP_RTC, step("rtc", rtc)),
        (board::STEP_MAC, step("mac", mac)),
        (board::STEP_GPIO, step("gpio", gpio)),
        (board::STEP_PHY_CALIBRATE, step("phy_calibrate", phy)),
        (board::STEP_WATCHDOG, step("watchdog", watchdog)),
        (board::STEP_WIFI_TIMER, step("wifi_timer", wifi_timer)),
    ];

    all.into_iter()
        .filter(|(enabled, _)| *enabled)
        .map(|(_, step)| step)
        .collect()
}
