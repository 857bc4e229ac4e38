//! Display adapter
//!
//! Turns committed frames into panel transfers. In copy mode every set
//! pixel is redrawn into the panel driver's own buffer before sending.
//! In aliased mode the framebuffer already has the panel's page layout,
//! so presenting a frame is only the bus transfer.

use pixelcast_core::{FrameSink, FrameView, PixelMode};

use crate::panel::Panel;

pub use pixelcast_core::DisplayMode;

/// Display adapter errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError<E> {
    /// Frame geometry or layout does not match the panel
    ///
    /// This is a wiring bug, not a runtime condition; callers are
    /// expected to halt.
    LayoutMismatch,
    /// The panel driver failed
    Panel(E),
}

/// Frame sink that presents frames on a panel
pub struct DisplayAdapter<P> {
    panel: P,
    mode: DisplayMode,
    frames: u32,
}

impl<P: Panel> DisplayAdapter<P> {
    /// Wrap `panel`, presenting in `mode`
    pub fn new(panel: P, mode: DisplayMode) -> Self {
        Self {
            panel,
            mode,
            frames: 0,
        }
    }

    /// Initialize the panel
    pub fn init(&mut self) -> Result<(), DisplayError<P::Error>> {
        self.panel.init().map_err(DisplayError::Panel)
    }

    /// Presentation mode
    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Frames presented so far
    pub fn frames(&self) -> u32 {
        self.frames
    }

    /// The panel driver
    pub fn panel(&self) -> &P {
        &self.panel
    }

    /// The panel driver, mutably
    pub fn panel_mut(&mut self) -> &mut P {
        &mut self.panel
    }

    /// Release the panel driver
    pub fn into_inner(self) -> P {
        self.panel
    }

    /// Check that `frame` can be presented in the current mode
    pub fn check_layout(&self, frame: &FrameView<'_>) -> Result<(), DisplayError<P::Error>> {
        let (width, height) = self.panel.dimensions();
        if (frame.width(), frame.height()) != (width, height) {
            return Err(DisplayError::LayoutMismatch);
        }
        if self.mode == DisplayMode::Aliased {
            let expected = PixelMode::Paged.buffer_len(width, height);
            if frame.mode() != PixelMode::Paged || frame.pixels().len() != expected {
                return Err(DisplayError::LayoutMismatch);
            }
        }
        Ok(())
    }

    /// Present one frame
    pub fn present(&mut self, frame: &FrameView<'_>) -> Result<(), DisplayError<P::Error>> {
        self.check_layout(frame)?;

        match self.mode {
            DisplayMode::Copy => {
                self.panel.clear_buffer();
                for y in 0..frame.height() {
                    for x in 0..frame.width() {
                        if frame.pixel_at(x, y) != 0 {
                            self.panel.draw_pixel(x, y);
                        }
                    }
                }
                self.panel.send_buffer().map_err(DisplayError::Panel)?;
            }
            DisplayMode::Aliased => {
                self.panel
                    .send_shared(frame.pixels())
                    .map_err(DisplayError::Panel)?;
            }
        }

        self.frames = self.frames.wrapping_add(1);
        Ok(())
    }
}

impl<P: Panel> FrameSink for DisplayAdapter<P> {
    type Error = DisplayError<P::Error>;

    fn consume(&mut self, frame: &FrameView<'_>) -> Result<(), Self::Error> {
        self.present(frame)
    }
}
