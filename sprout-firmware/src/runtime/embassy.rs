//! Embassy executor as the bring-up runtime
//!
//! For builds without the SDK's OS layer. The thread-mode executor has a
//! single priority level and no per-task stacks, so the requested name,
//! stack size and priority are only logged. The executor itself lives in
//! a `StaticCell` that is only initialized in `start`, after bss has been
//! zeroed.

use defmt::*;
use embassy_executor::Executor;
use sprout_core::boot::{Runtime, SpawnError, TaskEntry};
use sprout_hal_esp8266::enable_interrupts;
use static_cell::StaticCell;

use crate::tasks;

static EXECUTOR: StaticCell<Executor> = StaticCell::new();

/// Runtime handing the init task to an embassy executor
pub struct EmbassyRuntime {
    init: Option<(TaskEntry, usize)>,
}

impl EmbassyRuntime {
    pub const fn new() -> Self {
        Self { init: None }
    }
}

impl Runtime for EmbassyRuntime {
    type Handle = ();

    fn max_priority(&self) -> u8 {
        0
    }

    fn create_task(
        &mut self,
        entry: TaskEntry,
        name: &str,
        stack_words: u32,
        arg: usize,
        priority: u8,
    ) -> Result<(), SpawnError> {
        // The task pool holds one init task
        if self.init.is_some() {
            return Err(SpawnError::Busy);
        }
        info!(
            "init task '{}': {} words, priority {}",
            name, stack_words, priority
        );
        self.init = Some((entry, arg));
        Ok(())
    }

    fn start(self) -> ! {
        // SAFETY: subsystem init attached every handler it unmasked
        unsafe { enable_interrupts() };
        let executor = EXECUTOR.init(Executor::new());
        executor.run(move |spawner| {
            if let Some((entry, arg)) = self.init {
                spawner.spawn(tasks::init_task(entry, arg)).unwrap();
            }
        })
    }
}
