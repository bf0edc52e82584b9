//! Runtimes the sequencer can hand the init task to
//!
//! The vendor RTOS is the default. The `embassy-runtime` feature swaps in
//! an embassy executor for builds that link without the SDK's OS layer.

#[cfg(feature = "embassy-runtime")]
mod embassy;
#[cfg(not(feature = "embassy-runtime"))]
mod sdk;

#[cfg(feature = "embassy-runtime")]
pub use embassy::EmbassyRuntime as BringUpRuntime;
#[cfg(not(feature = "embassy-runtime"))]
pub use sdk::SdkRuntime as BringUpRuntime;
