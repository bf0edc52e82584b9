//! One-shot init task
//!
//! Runs the entry handed over by the sequencer and then finishes; the
//! executor never restarts it.

use defmt::*;
use sprout_core::boot::TaskEntry;

#[embassy_executor::task]
pub async fn init_task(entry: TaskEntry, arg: usize) {
    entry(arg);
    info!("init task finished");
}
