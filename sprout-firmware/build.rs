//! Build script for sprout-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates board.toml at compile time
//! - Generates board_config.rs from it

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Subsystem steps that can be switched off, in run order
const OPTIONAL_STEPS: [&str; 8] = [
    "nvs_flash",
    "wifi_nvs",
    "rtc",
    "mac",
    "gpio",
    "phy_calibrate",
    "watchdog",
    "wifi_timer",
];

/// Must match `sprout_core::config::MAX_TASK_NAME_LEN`
const MAX_TASK_NAME_LEN: usize = 16;

/// Size of the flash cache window
const FLASH_MAP_SIZE: i64 = 0x10_0000;

/// Validated board configuration
struct Board {
    app_offset: i64,
    map_base: i64,
    vector_base: i64,
    task_name: String,
    stack_words: i64,
    priority: Option<i64>,
    steps: Vec<(&'static str, bool)>,
}

fn main() {
    setup_linker();
    let board = validate_config();
    generate_config(&board);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate board.toml configuration at compile time
fn validate_config() -> Board {
    println!("cargo:rerun-if-changed=board.toml");

    let config_path = Path::new("board.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: board.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a board.toml configuration file.          ║\n\
            ║  Please create one in the sprout-firmware directory.             ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read board.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in board.toml                        ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();

    let app_offset = integer(&config, "flash", "app_offset", &mut errors);
    let map_base = integer(&config, "flash", "map_base", &mut errors);
    let vector_base = integer(&config, "vectors", "base", &mut errors);
    let stack_words = integer(&config, "init_task", "stack_words", &mut errors);

    if app_offset % 0x1000 != 0 || !(0..FLASH_MAP_SIZE).contains(&app_offset) {
        errors.push(format!(
            "[flash] app_offset must be 4KB aligned and below {:#x}",
            FLASH_MAP_SIZE
        ));
    }
    if map_base % 4 != 0 || !(0..=u32::MAX as i64).contains(&map_base) {
        errors.push("[flash] map_base must be a word-aligned 32-bit address".to_string());
    }
    if vector_base % 0x100 != 0 || !(0..=u32::MAX as i64).contains(&vector_base) {
        errors.push("[vectors] base must be a 256-byte aligned 32-bit address".to_string());
    }
    if !(128..=8192).contains(&stack_words) {
        errors.push("[init_task] stack_words must be 128-8192".to_string());
    }

    let task_name = match config.get("init_task").and_then(|t| t.get("name")) {
        Some(toml::Value::String(name)) => {
            if name.is_empty() || name.len() > MAX_TASK_NAME_LEN || !name.is_ascii() {
                errors.push(format!(
                    "[init_task] name must be 1-{} ASCII characters",
                    MAX_TASK_NAME_LEN
                ));
            }
            name.clone()
        }
        _ => {
            errors.push("[init_task] missing 'name'".to_string());
            String::new()
        }
    };

    let priority = match config.get("init_task").and_then(|t| t.get("priority")) {
        Some(toml::Value::Integer(p)) => {
            if !(0..=31).contains(p) {
                errors.push("[init_task] priority must be 0-31".to_string());
            }
            Some(*p)
        }
        Some(_) => {
            errors.push("[init_task] priority must be an integer".to_string());
            None
        }
        None => None,
    };

    let steps = validate_steps(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid board configuration                              ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=board.toml validated successfully");

    Board {
        app_offset,
        map_base,
        vector_base,
        task_name,
        stack_words,
        priority,
        steps,
    }
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Read a required integer field
fn integer(config: &toml::Value, section: &str, key: &str, errors: &mut Vec<String>) -> i64 {
    match config.get(section).and_then(|s| s.get(key)) {
        Some(toml::Value::Integer(value)) => *value,
        Some(_) => {
            errors.push(format!("[{}] '{}' must be an integer", section, key));
            0
        }
        None => {
            errors.push(format!("[{}] missing '{}'", section, key));
            0
        }
    }
}

/// Validate the [steps] table; missing steps default to enabled
fn validate_steps(config: &toml::Value, errors: &mut Vec<String>) -> Vec<(&'static str, bool)> {
    let table = match config.get("steps") {
        Some(toml::Value::Table(t)) => Some(t),
        Some(_) => {
            errors.push("[steps] must be a table".to_string());
            None
        }
        None => None,
    };

    if let Some(table) = table {
        for key in table.keys() {
            if !OPTIONAL_STEPS.contains(&key.as_str()) {
                errors.push(format!("[steps] unknown step '{}'", key));
            }
        }
    }

    OPTIONAL_STEPS
        .iter()
        .map(|&name| {
            let enabled = match table.and_then(|t| t.get(name)) {
                Some(toml::Value::Boolean(b)) => *b,
                Some(_) => {
                    errors.push(format!("[steps] '{}' must be true or false", name));
                    true
                }
                None => true,
            };
            (name, enabled)
        })
        .collect()
}

/// Write board_config.rs into OUT_DIR
fn generate_config(board: &Board) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let mut f = File::create(out_dir.join("board_config.rs")).unwrap();

    writeln!(f, "// Generated from board.toml by build.rs").unwrap();
    writeln!(f, "pub const APP_OFFSET: u32 = {:#x};", board.app_offset).unwrap();
    writeln!(f, "pub const FLASH_MAP_BASE: u32 = {:#x};", board.map_base).unwrap();
    writeln!(f, "pub const VECTOR_BASE: u32 = {:#x};", board.vector_base).unwrap();
    writeln!(f, "pub const INIT_TASK_NAME: &str = {:?};", board.task_name).unwrap();
    writeln!(f, "pub const INIT_TASK_STACK_WORDS: u32 = {};", board.stack_words).unwrap();
    match board.priority {
        Some(p) => writeln!(f, "pub const INIT_TASK_PRIORITY: Option<u8> = Some({});", p),
        None => writeln!(f, "pub const INIT_TASK_PRIORITY: Option<u8> = None;"),
    }
    .unwrap();
    for (name, enabled) in &board.steps {
        writeln!(
            f,
            "pub const STEP_{}: bool = {};",
            name.to_uppercase(),
            enabled
        )
        .unwrap();
    }
}
