//! Stream capture loop

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read};
use std::net::TcpStream;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use pixelcast_protocol::{DecodedFrame, FrameDecoder, FrameFormat};

use crate::image::{to_grey, upscale, write_pgm, Layout};

/// Largest payload the capture accepts (a 256x256 indexed frame)
pub const MAX_PAYLOAD: usize = 64 * 1024;

/// Connect to `addr`, retrying every `retry` until it succeeds
pub fn connect(addr: &str, retry: Duration) -> TcpStream {
    loop {
        match TcpStream::connect(addr) {
            Ok(stream) => {
                info!("Connected to {}", addr);
                return stream;
            }
            Err(e) => {
                warn!(
                    "Could not connect to {} ({}), retrying in {} seconds...",
                    addr,
                    e,
                    retry.as_secs()
                );
                thread::sleep(retry);
            }
        }
    }
}

/// Create `dir` if needed and delete any files already in it
pub fn prepare_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            fs::remove_file(&path).with_context(|| format!("removing {}", path.display()))?;
        }
    }
    Ok(())
}

/// Decodes a mirror stream and saves every frame
pub struct Capture {
    decoder: Box<FrameDecoder<MAX_PAYLOAD>>,
    layout: Layout,
    scale: usize,
    out_dir: PathBuf,
    saved: usize,
    dropped: usize,
}

impl Capture {
    /// Capture frames in `format`, interpreting payloads as `layout`
    pub fn new(format: FrameFormat, layout: Layout, scale: usize, out_dir: PathBuf) -> Self {
        let decoder = FrameDecoder::new(format).with_bits_per_pixel(layout.bits_per_pixel());
        Self {
            decoder: Box::new(decoder),
            layout,
            scale: scale.max(1),
            out_dir,
            saved: 0,
            dropped: 0,
        }
    }

    /// Frames written so far
    pub fn saved(&self) -> usize {
        self.saved
    }

    /// Frames dropped by the decoder so far
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Read `reader` to the end, saving frames as they complete
    pub fn run<R: Read>(&mut self, reader: R) -> Result<usize> {
        for byte in BufReader::new(reader).bytes() {
            let byte = byte.context("reading mirror stream")?;
            match self.decoder.feed(byte) {
                Ok(Some(frame)) => {
                    self.save(&frame)?;
                }
                Ok(None) => {}
                Err(e) => {
                    self.dropped += 1;
                    warn!("Dropped frame: {:?}", e);
                }
            }
        }
        Ok(self.saved)
    }

    /// Write one frame as `frame_NNNN.pgm`
    pub fn save<const N: usize>(&mut self, frame: &DecodedFrame<N>) -> Result<PathBuf> {
        let grey = to_grey(&frame.payload, frame.width, frame.height, self.layout)?;
        let (width, height) = (frame.width * self.scale, frame.height * self.scale);
        let pixels = upscale(&grey, frame.width, frame.height, self.scale);

        let path = self.out_dir.join(format!("frame_{:04}.pgm", self.saved));
        let mut out = BufWriter::new(
            File::create(&path).with_context(|| format!("creating {}", path.display()))?,
        );
        write_pgm(&mut out, &pixels, width, height)?;

        info!(
            "Received frame of size {}x{} -> {}",
            frame.width,
            frame.height,
            path.display()
        );
        debug!("{} payload bytes", frame.payload.len());
        self.saved += 1;
        Ok(path)
    }
}
