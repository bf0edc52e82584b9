//! Boot configuration
//!
//! Values normally come from the firmware's `board.toml`, validated and
//! turned into constants at build time. The defaults match the stock
//! ESP8266 layout with the application at the 64KB partition.

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum task name length
pub const MAX_TASK_NAME_LEN: usize = 16;

/// Offset of the application image in flash
pub const DEFAULT_APP_OFFSET: u32 = 0x1_0000;

/// Base of the IRAM exception vectors
pub const DEFAULT_VECTOR_BASE: u32 = 0x4010_0000;

/// Init task configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TaskConfig {
    /// Task name handed to the runtime
    pub name: String<MAX_TASK_NAME_LEN>,
    /// Stack size in words
    pub stack_words: u32,
    /// Priority; `None` selects the runtime's maximum priority
    pub priority: Option<u8>,
}

impl Default for TaskConfig {
    fn default() -> Self {
        let mut name = String::new();
        // "uiT" always fits
        let _ = name.push_str("uiT");
        Self {
            name,
            stack_words: 512,
            priority: None,
        }
    }
}

/// Bring-up configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BootConfig {
    /// Offset of the application image header in persistent storage
    pub app_offset: u32,
    /// Address the interrupt vector base is pointed at
    pub vector_base: u32,
    /// The one-shot init task created at runtime start
    pub init_task: TaskConfig,
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            app_offset: DEFAULT_APP_OFFSET,
            vector_base: DEFAULT_VECTOR_BASE,
            init_task: TaskConfig::default(),
        }
    }
}
