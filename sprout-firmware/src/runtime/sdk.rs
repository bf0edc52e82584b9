//! Vendor RTOS as the bring-up runtime
//!
//! Tasks are created through the SDK's `wifi_task_*` layer with the
//! configured name, stack size and priority. The scheduler only calls
//! back through a C trampoline, so the Rust entry waits in a [`TaskSlot`]
//! until the task first runs.

use core::ffi::{c_char, c_void};
use core::ptr::{self, NonNull};

use defmt::*;
use sprout_core::boot::{c_task_name, Runtime, SpawnError, TaskEntry, TaskSlot};

extern "C" {
    fn wifi_task_create(
        task: extern "C" fn(*mut c_void),
        name: *const c_char,
        stack_depth: u32,
        param: *mut c_void,
        priority: u32,
    ) -> *mut c_void;
    fn wifi_task_get_max_priority() -> u32;
    fn wifi_task_delete(handle: *mut c_void);
    fn wifi_os_start();
}

/// Entry of the task being created; lives in bss, so only used after zeroing
static PENDING: TaskSlot = TaskSlot::new();

/// Runtime backed by the SDK's RTOS
pub struct SdkRuntime;

impl SdkRuntime {
    pub const fn new() -> Self {
        Self
    }
}

impl Runtime for SdkRuntime {
    type Handle = NonNull<c_void>;

    fn max_priority(&self) -> u8 {
        // SAFETY: plain query, valid once `wifi_os_init` has run
        let max = unsafe { wifi_task_get_max_priority() };
        u8::try_from(max).unwrap_or(u8::MAX)
    }

    fn create_task(
        &mut self,
        entry: TaskEntry,
        name: &str,
        stack_words: u32,
        arg: usize,
        priority: u8,
    ) -> Result<NonNull<c_void>, SpawnError> {
        PENDING.put(entry, arg)?;
        let c_name = c_task_name(name);

        // SAFETY: the SDK copies the name into the task control block
        let handle = unsafe {
            wifi_task_create(
                task_trampoline,
                c_name.as_ptr().cast(),
                stack_words,
                ptr::null_mut(),
                u32::from(priority),
            )
        };

        match NonNull::new(handle) {
            Some(handle) => {
                info!(
                    "task '{}' created: {} words, priority {}",
                    name, stack_words, priority
                );
                Ok(handle)
            }
            None => {
                PENDING.clear();
                Err(SpawnError::OutOfMemory)
            }
        }
    }

    fn start(self) -> ! {
        info!("starting scheduler");
        // SAFETY: called once, after every subsystem step succeeded
        unsafe { wifi_os_start() };
        // The scheduler never hands control back
        loop {
            core::hint::spin_loop();
        }
    }
}

extern "C" fn task_trampoline(_param: *mut c_void) {
    if let Some((entry, arg)) = PENDING.take() {
        entry(arg);
    }
    info!("task finished");
    // SAFETY: a null handle deletes the calling task, which never resumes
    unsafe { wifi_task_delete(ptr::null_mut()) };
}
