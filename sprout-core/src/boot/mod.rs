//! Bring-up sequencer
//!
//! Everything between the reset vector and the application entry point.

pub mod relocate;
pub mod sequencer;
pub mod stage;
pub mod steps;
pub mod task;
pub mod zero;

pub use relocate::{relocate, RelocationReport};
pub use sequencer::{halt, Sequencer, INIT_TASK_STEP};
pub use stage::{BootEvent, BootStage, StageTracker, BOOT_STAGE};
pub use steps::{run_steps, BootFailure, InitStep, StepError, StepFn};
pub use task::{c_task_name, run_init_task, Runtime, SpawnError, TaskEntry, TaskSlot};
pub use zero::zero_region;
