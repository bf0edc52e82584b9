//! Sprout - ESP8266 firmware entry
//!
//! The ROM bootloader jumps to `call_user_start` with a valid stack but
//! nothing else set up: the RAM segments of the image are still in flash
//! and bss holds garbage. Bring-up is handed to the sequencer, which never
//! returns: it either starts the runtime or halts on the first failed
//! subsystem step.

#![no_std]
#![no_main]

use core::ops::Range;
use core::ptr::addr_of;

use defmt::{error, Display2Format};
use defmt_rtt as _;

use sprout_core::boot::{run_init_task, Sequencer, BOOT_STAGE};
use sprout_core::config::{BootConfig, TaskConfig};
use sprout_hal_esp8266::{MappedFlash, RawMemory, Vecbase};

mod runtime;
mod steps;
#[cfg(feature = "embassy-runtime")]
mod tasks;

mod board_config {
    include!(concat!(env!("OUT_DIR"), "/board_config.rs"));
}

use crate::runtime::BringUpRuntime;

extern "C" {
    static _bss_start: u32;
    static _bss_end: u32;
    static __init_array_start: extern "C" fn();
    static __init_array_end: extern "C" fn();

    fn tcpip_adapter_init();
    fn app_main();
}

/// Boot configuration compiled in from board.toml
fn boot_config() -> BootConfig {
    let mut init_task = TaskConfig::default();
    init_task.name.clear();
    // build.rs bounds the name length
    let _ = init_task.name.push_str(board_config::INIT_TASK_NAME);
    init_task.stack_words = board_config::INIT_TASK_STACK_WORDS;
    init_task.priority = board_config::INIT_TASK_PRIORITY;

    BootConfig {
        app_offset: board_config::APP_OFFSET,
        vector_base: board_config::VECTOR_BASE,
        init_task,
    }
}

fn bss_region() -> Range<u32> {
    // SAFETY: only the addresses of the linker symbols are taken
    unsafe { (addr_of!(_bss_start) as u32)..(addr_of!(_bss_end) as u32) }
}

/// Global constructors, in link order
fn constructors() -> &'static [extern "C" fn()] {
    // SAFETY: the linker script lays out __init_array_* as a contiguous
    // array of function pointers
    unsafe {
        let start = addr_of!(__init_array_start);
        let end = addr_of!(__init_array_end);
        let len = (end as usize - start as usize) / core::mem::size_of::<extern "C" fn()>();
        core::slice::from_raw_parts(start, len)
    }
}

/// Body of the init task
fn user_init_entry(_arg: usize) {
    run_init_task(
        &BOOT_STAGE,
        constructors(),
        || unsafe { tcpip_adapter_init() },
        || unsafe { app_main() },
    );
}

/// Reset entry, called by the ROM bootloader
#[no_mangle]
pub extern "C" fn call_user_start() -> ! {
    // SAFETY: the cache maps flash before the bootloader jumps here, and
    // nothing else owns RAM yet
    let flash = unsafe { MappedFlash::at(board_config::FLASH_MAP_BASE) };
    let memory = unsafe { RawMemory::steal() };

    let sequencer = Sequencer::new(boot_config(), &flash, memory, Vecbase, bss_region());
    let mut steps = steps::enabled();
    sequencer.run(&mut steps[..], BringUpRuntime::new(), user_init_entry, 0)
}

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    error!(
        "halted in stage {}: {}",
        BOOT_STAGE.get(),
        Display2Format(info)
    );
    loop {
        core::hint::spin_loop();
    }
}
