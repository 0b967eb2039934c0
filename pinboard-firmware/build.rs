//! Build script for pinboard-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates board.toml at compile time
//! - Generates the `FIRMWARE_CONFIG` constant from it

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BoardToml {
    clock: ClockSection,
    #[serde(default)]
    debug: DebugSection,
    blink: BlinkSection,
    io_test: IoTestSection,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ClockSection {
    hse_hz: u32,
    sysclk_hz: u32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DebugSection {
    #[serde(default = "default_true")]
    enabled: bool,
    #[serde(default = "default_baudrate")]
    baudrate: u32,
}

impl Default for DebugSection {
    fn default() -> Self {
        Self {
            enabled: true,
            baudrate: default_baudrate(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BlinkSection {
    period_ms: u32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct IoTestSection {
    cycles: u32,
    period_ms: u32,
}

fn default_true() -> bool {
    true
}

fn default_baudrate() -> u32 {
    115_200
}

fn main() {
    setup_linker();
    let config = load_config();
    validate_config(&config);
    generate_config(&config);
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
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Read and parse board.toml
fn load_config() -> BoardToml {
    println!("cargo:rerun-if-changed=board.toml");

    let config_path = Path::new("board.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: board.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a board.toml configuration file.          ║\n\
            ║  Please create one in the pinboard-firmware directory.           ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let content = match fs::read_to_string(config_path) {
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

    match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid board.toml                                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&e.to_string())
            );
        }
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

/// Check value ranges; collects every problem before failing
fn validate_config(config: &BoardToml) {
    let mut errors = Vec::new();

    let clock = &config.clock;
    if !(4_000_000..=16_000_000).contains(&clock.hse_hz) {
        errors.push("[clock] hse_hz must be 4-16 MHz".to_string());
    }
    if clock.sysclk_hz == 0 || clock.sysclk_hz > 72_000_000 {
        errors.push("[clock] sysclk_hz must be at most 72 MHz".to_string());
    } else if clock.hse_hz != 0 {
        if clock.sysclk_hz % clock.hse_hz != 0 {
            errors.push("[clock] sysclk_hz must be a multiple of hse_hz".to_string());
        } else if !(2..=16).contains(&(clock.sysclk_hz / clock.hse_hz)) {
            errors.push("[clock] sysclk_hz / hse_hz must be 2-16 (PLL)".to_string());
        }
    }

    if !(1_200..=4_500_000).contains(&config.debug.baudrate) {
        errors.push(format!(
            "[debug] baudrate {} out of range (1200-4500000)",
            config.debug.baudrate
        ));
    }

    if !(1..=60_000).contains(&config.blink.period_ms) {
        errors.push("[blink] period_ms must be 1-60000".to_string());
    }

    if !(1..=1_000).contains(&config.io_test.cycles) {
        errors.push("[io_test] cycles must be 1-1000".to_string());
    }
    if !(1..=10_000).contains(&config.io_test.period_ms) {
        errors.push("[io_test] period_ms must be 1-10000".to_string());
    }

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid values in board.toml                             ║\n\
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
}

/// Write `firmware_config.rs` into OUT_DIR
fn generate_config(config: &BoardToml) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let code = format!(
        "pub const FIRMWARE_CONFIG: FirmwareConfig = FirmwareConfig {{\n\
         \x20   clock: ClockConfig {{ hse_hz: {}, sysclk_hz: {} }},\n\
         \x20   debug: DebugConfig {{ enabled: {}, baudrate: {} }},\n\
         \x20   blink: BlinkConfig {{ period_ms: {} }},\n\
         \x20   io_test: IoTestConfig {{ cycles: {}, period_ms: {} }},\n\
         }};\n",
        config.clock.hse_hz,
        config.clock.sysclk_hz,
        config.debug.enabled,
        config.debug.baudrate,
        config.blink.period_ms,
        config.io_test.cycles,
        config.io_test.period_ms,
    );
    fs::write(out_dir.join("firmware_config.rs"), code).unwrap();
}
