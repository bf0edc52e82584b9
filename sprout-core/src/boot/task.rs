//! Runtime handoff and the one-shot init task

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use super::stage::{BootEvent, StageTracker};
use super::steps::StepError;
use crate::config::MAX_TASK_NAME_LEN;

/// Entry point of a runtime task, called with the task's argument word
pub type TaskEntry = fn(usize);

/// Task creation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpawnError {
    /// Not enough memory for the task's stack or control block
    OutOfMemory,
    /// The task slot is already in use
    Busy,
}

impl From<SpawnError> for StepError {
    fn from(err: SpawnError) -> Self {
        match err {
            SpawnError::OutOfMemory => StepError(-1),
            SpawnError::Busy => StepError(-2),
        }
    }
}

/// The concurrent runtime the sequencer hands control to
pub trait Runtime {
    /// Handle of a created task
    type Handle;

    /// Highest priority a task can be created with
    fn max_priority(&self) -> u8;

    /// Create a task that will run `entry(arg)` once the runtime starts
    fn create_task(
        &mut self,
        entry: TaskEntry,
        name: &str,
        stack_words: u32,
        arg: usize,
        priority: u8,
    ) -> Result<Self::Handle, SpawnError>;

    /// Start scheduling; never returns
    fn start(self) -> !;
}

/// Pending task entry, parked between creation and first run
///
/// C runtimes start tasks through a single `extern "C"` trampoline that
/// only receives a pointer-sized parameter, so the Rust entry is parked
/// here and taken once by the trampoline.
pub struct TaskSlot {
    pending: Mutex<CriticalSectionRawMutex, Cell<Option<(TaskEntry, usize)>>>,
}

impl Default for TaskSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskSlot {
    pub const fn new() -> Self {
        Self {
            pending: Mutex::new(Cell::new(None)),
        }
    }

    /// Park `entry(arg)`; fails with [`SpawnError::Busy`] if one is pending
    pub fn put(&self, entry: TaskEntry, arg: usize) -> Result<(), SpawnError> {
        self.pending.lock(|cell| {
            if cell.get().is_some() {
                return Err(SpawnError::Busy);
            }
            cell.set(Some((entry, arg)));
            Ok(())
        })
    }

    /// Take the parked entry, leaving the slot empty
    pub fn take(&self) -> Option<(TaskEntry, usize)> {
        self.pending.lock(|cell| cell.take())
    }

    /// Drop a parked entry whose task was never created
    pub fn clear(&self) {
        self.pending.lock(|cell| cell.set(None));
    }
}

/// NUL-terminated copy of a task name for C runtimes
///
/// Stops at the first interior NUL and at [`MAX_TASK_NAME_LEN`] bytes.
pub fn c_task_name(name: &str) -> [u8; MAX_TASK_NAME_LEN + 1] {
    let mut buf = [0u8; MAX_TASK_NAME_LEN + 1];
    let bytes = name.as_bytes().iter().take(MAX_TASK_NAME_LEN);
    for (dst, &src) in buf.iter_mut().zip(bytes) {
        if src == 0 {
            break;
        }
        *dst = src;
    }
    buf
}

/// Body of the init task
///
/// Runs every global-initializer callback in order, then network init,
/// then the application entry point. Returns when the application entry
/// returns; the caller ends the task and it is never restarted.
pub fn run_init_task<N, A>(
    stage: &StageTracker,
    constructors: &[extern "C" fn()],
    network_init: N,
    app_main: A,
) where
    N: FnOnce(),
    A: FnOnce(),
{
    let _ = stage.advance(BootEvent::StageComplete);

    for ctor in constructors {
        ctor();
    }

    network_init();

    #[cfg(feature = "defmt")]
    defmt::info!("init done, entering app");

    let _ = stage.advance(BootEvent::StageComplete);
    app_main();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boot::stage::BootStage;
    use core::cell::RefCell;
    use std::sync::Mutex;

    // Constructors are plain functions, so they log through a static
    static CTOR_LOG: Mutex<Vec<&'static str>> = Mutex::new(Vec::new());

    extern "C" fn ctor_first() {
        CTOR_LOG.lock().unwrap().push("ctor_first");
    }

    extern "C" fn ctor_second() {
        CTOR_LOG.lock().unwrap().push("ctor_second");
    }

    #[test]
    fn test_init_task_order_and_stages() {
        let stage = StageTracker::new();
        stage.set(BootStage::OsStart);
        let seen = RefCell::new(Vec::new());

        run_init_task(
            &stage,
            &[ctor_first, ctor_second],
            || {
                seen.borrow_mut().extend(CTOR_LOG.lock().unwrap().drain(..));
                seen.borrow_mut().push("network");
                assert_eq!(stage.get(), BootStage::TaskInit);
            },
            || {
                seen.borrow_mut().push("app");
                assert_eq!(stage.get(), BootStage::AppRunning);
            },
        );

        assert_eq!(
            seen.into_inner(),
            vec!["ctor_first", "ctor_second", "network", "app"]
        );
        assert_eq!(stage.get(), BootStage::AppRunning);
    }

    #[test]
    fn test_no_constructors() {
        let stage = StageTracker::new();
        stage.set(BootStage::OsStart);
        let mut app_ran = false;
        run_init_task(&stage, &[], || {}, || app_ran = true);
        assert!(app_ran);
    }

    fn parked(_arg: usize) {}

    #[test]
    fn test_task_slot_holds_one_entry() {
        let slot = TaskSlot::new();
        assert_eq!(slot.put(parked, 7), Ok(()));
        assert_eq!(slot.put(parked, 8), Err(SpawnError::Busy));

        let (entry, arg) = slot.take().unwrap();
        assert_eq!(entry as usize, parked as TaskEntry as usize);
        assert_eq!(arg, 7);
        assert!(slot.take().is_none());

        // Free again once taken
        assert_eq!(slot.put(parked, 9), Ok(()));
        slot.clear();
        assert!(slot.take().is_none());
    }

    #[test]
    fn test_c_task_name() {
        let name = c_task_name("uiT");
        assert_eq!(&name[..4], b"uiT\0");
        assert!(name[4..].iter().all(|&b| b == 0));

        let long = c_task_name("a-very-long-task-name");
        assert_eq!(&long[..16], b"a-very-long-task");
        assert_eq!(long[16], 0);

        assert_eq!(&c_task_name("ab\0cd")[..3], b"ab\0");
    }

    #[test]
    fn test_spawn_error_codes() {
        assert_eq!(StepError::from(SpawnError::OutOfMemory), StepError(-1));
        assert_eq!(StepError::from(SpawnError::Busy), StepError(-2));
    }
}
