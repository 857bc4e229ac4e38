#[macro_use]
extern crate clap;

use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{App, Arg};
use log::info;
use pixelcast_capture::{connect, prepare_dir, Capture, Layout};
use pixelcast_protocol::{FrameFormat, NibbleScheme, WordWidth};

fn main() -> Result<()> {
    env_logger::init();
    let matches = App::new("Pixelcast framebuffer capture")
        .version(crate_version!())
        .about("Decode the framebuffer mirror stream and save every frame as a PGM image")
        .arg(
            Arg::with_name("addr")
                .short("a")
                .long("addr")
                .takes_value(true)
                .default_value("localhost:19021")
                .help("Address of the debug probe's channel bridge"),
        )
        .arg(
            Arg::with_name("input")
                .short("i")
                .long("input")
                .takes_value(true)
                .conflicts_with("addr")
                .help("Read a raw stream dump instead of connecting"),
        )
        .arg(
            Arg::with_name("out")
                .short("o")
                .long("out")
                .takes_value(true)
                .default_value("fb")
                .help("Output directory; existing files in it are deleted"),
        )
        .arg(
            Arg::with_name("layout")
                .long("layout")
                .takes_value(true)
                .possible_values(&["paged", "packed", "indexed"])
                .default_value("paged")
                .help("Payload layout"),
        )
        .arg(
            Arg::with_name("word")
                .long("word")
                .takes_value(true)
                .possible_values(&["32", "64"])
                .default_value("32")
                .help("Header word size in bits (the sender's pointer width)"),
        )
        .arg(
            Arg::with_name("scheme")
                .long("scheme")
                .takes_value(true)
                .possible_values(&["or_masked", "shift_masked"])
                .default_value("or_masked")
                .help("Payload nibble scheme"),
        )
        .arg(
            Arg::with_name("scale")
                .short("s")
                .long("scale")
                .takes_value(true)
                .default_value("1")
                .help("Integer upscale factor for saved images"),
        )
        .arg(
            Arg::with_name("retry")
                .long("retry")
                .takes_value(true)
                .default_value("5")
                .help("Seconds between connection attempts"),
        )
        .get_matches();

    let word = match matches.value_of("word") {
        Some("64") => WordWidth::W64,
        _ => WordWidth::W32,
    };
    let scheme = match matches.value_of("scheme") {
        Some("shift_masked") => NibbleScheme::ShiftMasked,
        _ => NibbleScheme::OrMasked,
    };
    let layout: Layout = matches.value_of("layout").unwrap_or("paged").parse()?;
    let scale = value_t!(matches, "scale", usize).unwrap_or_else(|e| e.exit());
    if scale == 0 {
        bail!("--scale must be at least 1");
    }
    let retry = value_t!(matches, "retry", u64).unwrap_or_else(|e| e.exit());

    let out_dir = PathBuf::from(matches.value_of("out").unwrap_or("fb"));
    prepare_dir(&out_dir)?;

    let mut capture = Capture::new(FrameFormat { scheme, word }, layout, scale, out_dir);

    let saved = match matches.value_of("input") {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening {}", path))?;
            capture.run(file)?
        }
        None => {
            let addr = matches.value_of("addr").unwrap_or("localhost:19021");
            let stream = connect(addr, Duration::from_secs(retry));
            capture.run(stream)?
        }
    };

    info!("{} frames saved, {} dropped", saved, capture.dropped());
    Ok(())
}
