//! Bring-up stage machine
//!
//! Bring-up is strictly linear: every stage completes before the next one
//! starts and nothing ever goes back. The only branch is the terminal
//! failure state, reachable from subsystem initialization alone.

use portable_atomic::{AtomicU8, Ordering};

/// Bring-up stages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum BootStage {
    /// Reset vector reached, nothing done yet
    ColdStart = 0,
    /// Copying image segments from flash to RAM
    ImageRelocation = 1,
    /// Zeroing the bss region
    MemoryZeroing = 2,
    /// Installing the interrupt vector base
    VectorInit = 3,
    /// Running the ordered subsystem init steps
    SubsystemInit = 4,
    /// Creating the init task and starting the runtime
    OsStart = 5,
    /// Init task running constructors and network init
    TaskInit = 6,
    /// Application entry point invoked
    AppRunning = 7,
    /// A subsystem init step failed; the core is halted
    BootFailure = 8,
}

/// Events that move bring-up forward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BootEvent {
    /// The current stage finished
    StageComplete,
    /// A subsystem init step reported failure
    StepFailed,
}

impl BootStage {
    /// Whether no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, BootStage::AppRunning | BootStage::BootFailure)
    }

    /// Process an event and return the next stage
    pub fn transition(self, event: BootEvent) -> Self {
        use BootEvent::*;
        use BootStage::*;

        match (self, event) {
            (ColdStart, StageComplete) => ImageRelocation,
            (ImageRelocation, StageComplete) => MemoryZeroing,
            (MemoryZeroing, StageComplete) => VectorInit,
            (VectorInit, StageComplete) => SubsystemInit,
            (SubsystemInit, StageComplete) => OsStart,
            (SubsystemInit, StepFailed) => BootFailure,
            (OsStart, StageComplete) => TaskInit,
            (TaskInit, StageComplete) => AppRunning,

            // Terminal stages, and failures outside subsystem init
            _ => self,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => BootStage::ColdStart,
            1 => BootStage::ImageRelocation,
            2 => BootStage::MemoryZeroing,
            3 => BootStage::VectorInit,
            4 => BootStage::SubsystemInit,
            5 => BootStage::OsStart,
            6 => BootStage::TaskInit,
            7 => BootStage::AppRunning,
            _ => BootStage::BootFailure,
        }
    }
}

/// Globally visible bring-up stage, for diagnostics (panic handler, app)
pub struct StageTracker {
    stage: AtomicU8,
}

impl StageTracker {
    pub const fn new() -> Self {
        Self {
            stage: AtomicU8::new(BootStage::ColdStart as u8),
        }
    }

    pub fn get(&self) -> BootStage {
        BootStage::from_u8(self.stage.load(Ordering::Acquire))
    }

    pub fn set(&self, stage: BootStage) {
        self.stage.store(stage as u8, Ordering::Release);
    }

    /// Apply `event` to the published stage and publish the result
    pub fn advance(&self, event: BootEvent) -> BootStage {
        let next = self.get().transition(event);
        self.set(next);
        next
    }
}

impl Default for StageTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Stage of the running firmware
pub static BOOT_STAGE: StageTracker = StageTracker::new();
