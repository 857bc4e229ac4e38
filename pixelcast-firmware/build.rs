//! Build script for pixelcast-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates pixelcast.toml at compile time
//! - Generates the firmware configuration constructor

use std::env;
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use pixelcast_core::config::{ConfigError, FirmwareConfig};

fn main() {
    setup_linker();
    let config = load_config();
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

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Parse and validate pixelcast.toml
fn load_config() -> FirmwareConfig {
    println!("cargo:rerun-if-changed=pixelcast.toml");

    let config_path = Path::new("pixelcast.toml");

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read pixelcast.toml", &e.to_string()),
    };

    let config: FirmwareConfig = match toml::from_str(&config_content) {
        Ok(config) => config,
        Err(e) => fail("Invalid pixelcast.toml", &e.to_string()),
    };

    if let Err(e) = config.validate() {
        fail("Inconsistent pixelcast.toml", describe(e));
    }

    println!("cargo:warning=pixelcast.toml validated successfully");
    config
}

/// Human-readable reason for a validation error
fn describe(error: ConfigError) -> &'static str {
    match error {
        ConfigError::ZeroDimension => "[panel] width and height must be non-zero",
        ConfigError::UnalignedPages => "[panel] layout = \"paged\" needs a height divisible by 8",
        ConfigError::AliasedNeedsPaged => "[panel] display = \"aliased\" needs layout = \"paged\"",
        ConfigError::FrameRate(_) => "[render] fps must be 1-120",
        ConfigError::ZeroStep => "[render] anim_step must be non-zero",
        ConfigError::StepExceedsBound => "[render] anim_step must not exceed anim_bound",
        ConfigError::ZeroCapacity => "[mirror] capacity must be non-zero",
        ConfigError::EmptyChannelName => "[mirror] channel must not be empty",
    }
}

/// Abort the build with a boxed diagnostic
fn fail(title: &str, detail: &str) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<57}║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        format_error_lines(detail)
    );
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.chars().count() > 64 {
                format!("{}...", line.chars().take(61).collect::<String>())
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write `config.rs` into OUT_DIR
fn generate_config(config: &FirmwareConfig) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let panel = &config.panel;
    let render = &config.render;
    let mirror = &config.mirror;

    let mut src = String::new();
    writeln!(src, "// Generated by build.rs from pixelcast.toml").unwrap();
    writeln!(src).unwrap();
    writeln!(src, "/// Framebuffer storage in bytes").unwrap();
    writeln!(src, "pub const BUFFER_LEN: usize = {};", config.buffer_len()).unwrap();
    writeln!(src, "/// Mirror channel ring buffer in bytes").unwrap();
    writeln!(src, "pub const MIRROR_CAPACITY: usize = {};", mirror.capacity.max(1)).unwrap();
    writeln!(src).unwrap();
    writeln!(src, "/// Configuration baked in at build time").unwrap();
    writeln!(src, "pub fn firmware_config() -> FirmwareConfig {{").unwrap();
    writeln!(src, "    let mut config = FirmwareConfig::default();").unwrap();
    writeln!(src, "    config.panel.width = {};", panel.width).unwrap();
    writeln!(src, "    config.panel.height = {};", panel.height).unwrap();
    writeln!(src, "    config.panel.layout = PixelMode::{:?};", panel.layout).unwrap();
    writeln!(src, "    config.panel.display = DisplayMode::{:?};", panel.display).unwrap();
    writeln!(src, "    config.render.scene = SceneKind::{:?};", render.scene).unwrap();
    writeln!(src, "    config.render.looping = LoopKind::{:?};", render.looping).unwrap();
    writeln!(src, "    config.render.fps = {};", render.fps).unwrap();
    writeln!(src, "    config.render.anim_step = {};", render.anim_step).unwrap();
    writeln!(src, "    config.render.anim_bound = {};", render.anim_bound).unwrap();
    writeln!(src, "    config.render.dither = {};", render.dither).unwrap();
    writeln!(src, "    config.mirror.enabled = {};", mirror.enabled).unwrap();
    writeln!(src, "    config.mirror.channel.clear();").unwrap();
    writeln!(
        src,
        "    let _ = config.mirror.channel.push_str({:?});",
        mirror.channel.as_str()
    )
    .unwrap();
    writeln!(src, "    config.mirror.capacity = MIRROR_CAPACITY;").unwrap();
    writeln!(src, "    config.mirror.scheme = NibbleScheme::{:?};", mirror.scheme).unwrap();
    writeln!(src, "    config").unwrap();
    writeln!(src, "}}").unwrap();

    fs::write(out_dir.join("config.rs"), src).unwrap();
}
