//! SH1122 OLED Display Driver
//!
//! Driver for 256x64 SH1122-based OLED panels. The controller stores
//! 4 bits per pixel, two pixels per byte, row by row. This driver keeps
//! a 1-bit page buffer (8 pages of 256 columns) and expands it to full
//! brightness nibbles on flush.

use crate::bus::ControllerBus;
use crate::panel::Panel;

/// Display dimensions
pub const WIDTH: usize = 256;
pub const HEIGHT: usize = 64;
pub const PAGES: usize = HEIGHT / 8;

/// Bytes per controller row (two pixels per byte)
pub const ROW_BYTES: usize = WIDTH / 2;

/// Page buffer length in bytes
pub const BUFFER_LEN: usize = WIDTH * PAGES;

/// Grey level written for a set pixel
const LIT: u8 = 0x0F;

/// SH1122 commands
mod cmd {
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_LOW_COLUMN: u8 = 0x00;
    pub const SET_HIGH_COLUMN: u8 = 0x10;
    pub const SET_DISCHARGE_LEVEL: u8 = 0x30;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const SET_SEG_REMAP: u8 = 0xA0;
    pub const SET_ENTIRE_OFF: u8 = 0xA4;
    pub const SET_NORMAL: u8 = 0xA6;
    pub const SET_INVERSE: u8 = 0xA7;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const SET_DCDC: u8 = 0xAD;
    pub const SET_ROW_ADDR: u8 = 0xB0;
    pub const SET_COM_SCAN_INC: u8 = 0xC0;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_VCOM_DESELECT: u8 = 0xDB;
    pub const SET_VSEGM: u8 = 0xDC;
}

/// Initialization sequence, sent after the reset pulse
const INIT_SEQUENCE: &[u8] = &[
    cmd::DISPLAY_OFF,
    cmd::SET_CLOCK_DIV,
    0x50,
    cmd::SET_MUX_RATIO,
    0x3F, // 64 rows
    cmd::SET_DISPLAY_OFFSET,
    0x00,
    cmd::SET_START_LINE,
    cmd::SET_DCDC,
    0x81, // Built-in DC-DC on
    cmd::SET_SEG_REMAP,
    cmd::SET_COM_SCAN_INC,
    cmd::SET_CONTRAST,
    0x80,
    cmd::SET_PRECHARGE,
    0x22,
    cmd::SET_VCOM_DESELECT,
    0x35,
    cmd::SET_VSEGM,
    0x35,
    cmd::SET_DISCHARGE_LEVEL,
    cmd::SET_ENTIRE_OFF,
    cmd::SET_NORMAL,
    cmd::DISPLAY_ON,
];

/// Expand one controller row from page-layout bytes
fn expand_row(pages: &[u8], y: usize, row: &mut [u8; ROW_BYTES]) {
    let base = (y / 8) * WIDTH;
    let bit = y % 8;
    for (i, out) in row.iter_mut().enumerate() {
        let left = (pages[base + 2 * i] >> bit) & 1;
        let right = (pages[base + 2 * i + 1] >> bit) & 1;
        *out = (left * LIT) << 4 | right * LIT;
    }
}

/// SH1122 driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Sh1122Error<E> {
    /// Shared page buffer is not exactly [`BUFFER_LEN`] bytes
    BufferSize { expected: usize, got: usize },
    /// Bus transfer failed
    Bus(E),
}

/// Write `pages` to the controller, one row at a time
///
/// Nothing is sent unless `pages` is exactly one full page buffer.
fn write_pages<BUS: ControllerBus>(
    bus: &mut BUS,
    pages: &[u8],
) -> Result<(), Sh1122Error<BUS::Error>> {
    if pages.len() != BUFFER_LEN {
        return Err(Sh1122Error::BufferSize {
            expected: BUFFER_LEN,
            got: pages.len(),
        });
    }

    let mut row = [0u8; ROW_BYTES];
    for y in 0..HEIGHT {
        bus.command(&[
            cmd::SET_ROW_ADDR,
            y as u8,
            cmd::SET_HIGH_COLUMN,
            cmd::SET_LOW_COLUMN,
        ])
        .map_err(Sh1122Error::Bus)?;
        expand_row(pages, y, &mut row);
        bus.data(&row).map_err(Sh1122Error::Bus)?;
    }
    Ok(())
}

/// SH1122 OLED driver
pub struct Sh1122<BUS> {
    bus: BUS,
    /// Frame buffer (1 bit per pixel, organized as pages)
    buffer: [[u8; WIDTH]; PAGES],
}

impl<BUS: ControllerBus> Sh1122<BUS> {
    /// Create a new SH1122 driver
    pub fn new(bus: BUS) -> Self {
        Self {
            bus,
            buffer: [[0; WIDTH]; PAGES],
        }
    }

    /// Release the bus
    pub fn release(self) -> BUS {
        self.bus
    }

    /// Page buffer as a flat slice in page layout
    pub fn buffer(&self) -> &[u8] {
        self.buffer.as_flattened()
    }

    /// Whether the pixel at `(x, y)` is set in the page buffer
    pub fn is_set(&self, x: usize, y: usize) -> bool {
        x < WIDTH && y < HEIGHT && self.buffer[y / 8][x] & (1 << (y % 8)) != 0
    }

    /// Flush the page buffer to the display
    pub fn flush(&mut self) -> Result<(), Sh1122Error<BUS::Error>> {
        write_pages(&mut self.bus, self.buffer.as_flattened())
    }

    /// Set display contrast (0-255)
    pub fn set_contrast(&mut self, contrast: u8) -> Result<(), BUS::Error> {
        self.bus.command(&[cmd::SET_CONTRAST, contrast])
    }

    /// Turn display on/off
    pub fn set_display_on(&mut self, on: bool) -> Result<(), BUS::Error> {
        if on {
            self.bus.command(&[cmd::DISPLAY_ON])
        } else {
            self.bus.command(&[cmd::DISPLAY_OFF])
        }
    }

    /// Invert display colors
    pub fn set_inverted(&mut self, inverted: bool) -> Result<(), BUS::Error> {
        if inverted {
            self.bus.command(&[cmd::SET_INVERSE])
        } else {
            self.bus.command(&[cmd::SET_NORMAL])
        }
    }
}

impl<BUS: ControllerBus> Panel for Sh1122<BUS> {
    type Error = Sh1122Error<BUS::Error>;

    fn init(&mut self) -> Result<(), Self::Error> {
        self.bus.reset().map_err(Sh1122Error::Bus)?;
        self.bus.command(INIT_SEQUENCE).map_err(Sh1122Error::Bus)
    }

    fn clear_buffer(&mut self) {
        for page in self.buffer.iter_mut() {
            page.fill(0);
        }
    }

    fn draw_pixel(&mut self, x: usize, y: usize) {
        if x < WIDTH && y < HEIGHT {
            self.buffer[y / 8][x] |= 1 << (y % 8);
        }
    }

    fn send_buffer(&mut self) -> Result<(), Self::Error> {
        self.flush()
    }

    fn send_shared(&mut self, pages: &[u8]) -> Result<(), Self::Error> {
        write_pages(&mut self.bus, pages)
    }

    fn dimensions(&self) -> (usize, usize) {
        (WIDTH, HEIGHT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec;
    use std::vec::Vec;

    #[derive(Default)]
    struct RecordingBus {
        resets: usize,
        commands: Vec<Vec<u8>>,
        data: Vec<Vec<u8>>,
    }

    impl ControllerBus for RecordingBus {
        type Error = ();

        fn reset(&mut self) -> Result<(), ()> {
            self.resets += 1;
            Ok(())
        }

        fn command(&mut self, bytes: &[u8]) -> Result<(), ()> {
            self.commands.push(bytes.to_vec());
            Ok(())
        }

        fn data(&mut self, bytes: &[u8]) -> Result<(), ()> {
            self.data.push(bytes.to_vec());
            Ok(())
        }
    }

    #[test]
    fn test_init_resets_then_configures() {
        let mut oled = Sh1122::new(RecordingBus::default());
        oled.init().unwrap();

        let bus = oled.release();
        assert_eq!(bus.resets, 1);
        assert_eq!(bus.commands.len(), 1);
        assert_eq!(bus.commands[0].first(), Some(&cmd::DISPLAY_OFF));
        assert_eq!(bus.commands[0].last(), Some(&cmd::DISPLAY_ON));
    }

    #[test]
    fn test_flush_expands_pages_to_rows() {
        let mut oled = Sh1122::new(RecordingBus::default());
        oled.draw_pixel(0, 0);
        oled.draw_pixel(3, 9);
        oled.draw_pixel(255, 63);
        oled.send_buffer().unwrap();

        let bus = oled.release();
        assert_eq!(bus.data.len(), HEIGHT);
        assert!(bus.data.iter().all(|row| row.len() == ROW_BYTES));
        assert_eq!(bus.commands[9], [cmd::SET_ROW_ADDR, 9, 0x10, 0x00]);

        assert_eq!(bus.data[0][0], 0xF0);
        assert_eq!(bus.data[9][1], 0x0F);
        assert_eq!(bus.data[63][ROW_BYTES - 1], 0x0F);
        let lit: usize = bus
            .data
            .iter()
            .flatten()
            .map(|b| b.count_ones() as usize / 4)
            .sum();
        assert_eq!(lit, 3);
    }

    #[test]
    fn test_send_shared_matches_own_buffer() {
        let mut shared = vec![0u8; BUFFER_LEN];
        shared[10 + 2 * WIDTH] = 0b0000_0100; // (10, 18)

        let mut a = Sh1122::new(RecordingBus::default());
        a.send_shared(&shared).unwrap();

        let mut b = Sh1122::new(RecordingBus::default());
        b.draw_pixel(10, 18);
        assert_eq!(b.buffer(), &shared[..]);
        b.send_buffer().unwrap();

        assert_eq!(a.release().data, b.release().data);
    }

    #[test]
    fn test_send_shared_rejects_wrong_length() {
        let mut oled = Sh1122::new(RecordingBus::default());
        assert_eq!(
            oled.send_shared(&[0xFF; 100]),
            Err(Sh1122Error::BufferSize {
                expected: BUFFER_LEN,
                got: 100
            })
        );
        assert_eq!(
            oled.send_shared(&[0u8; BUFFER_LEN + 1]),
            Err(Sh1122Error::BufferSize {
                expected: BUFFER_LEN,
                got: BUFFER_LEN + 1
            })
        );

        let bus = oled.release();
        assert!(bus.commands.is_empty());
        assert!(bus.data.is_empty());
    }

    #[test]
    fn test_init_sequence_covers_configuration() {
        // Every configuration command the driver knows is sent at init
        for command in [
            cmd::SET_CLOCK_DIV,
            cmd::SET_MUX_RATIO,
            cmd::SET_DISPLAY_OFFSET,
            cmd::SET_START_LINE,
            cmd::SET_DCDC,
            cmd::SET_SEG_REMAP,
            cmd::SET_COM_SCAN_INC,
            cmd::SET_CONTRAST,
            cmd::SET_PRECHARGE,
            cmd::SET_VCOM_DESELECT,
            cmd::SET_VSEGM,
            cmd::SET_DISCHARGE_LEVEL,
            cmd::SET_ENTIRE_OFF,
            cmd::SET_NORMAL,
        ] {
            assert!(INIT_SEQUENCE.contains(&command), "{:#04x} missing", command);
        }
    }

    #[test]
    fn test_bus_error_is_wrapped() {
        struct DeadBus;

        impl ControllerBus for DeadBus {
            type Error = u8;

            fn reset(&mut self) -> Result<(), u8> {
                Err(7)
            }

            fn command(&mut self, _: &[u8]) -> Result<(), u8> {
                Err(8)
            }

            fn data(&mut self, _: &[u8]) -> Result<(), u8> {
                Err(9)
            }
        }

        let mut oled = Sh1122::new(DeadBus);
        assert_eq!(oled.init(), Err(Sh1122Error::Bus(7)));
        assert_eq!(oled.flush(), Err(Sh1122Error::Bus(8)));
    }

    #[test]
    fn test_clear_and_bounds() {
        let mut oled = Sh1122::new(RecordingBus::default());
        oled.draw_pixel(WIDTH, 0);
        oled.draw_pixel(5, 5);
        assert!(oled.is_set(5, 5));
        oled.clear_buffer();
        assert!(oled.buffer().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_controls() {
        let mut oled = Sh1122::new(RecordingBus::default());
        oled.set_contrast(0x40).unwrap();
        oled.set_inverted(true).unwrap();
        oled.set_display_on(false).unwrap();
        assert_eq!(
            oled.release().commands,
            [
                vec![cmd::SET_CONTRAST, 0x40],
                vec![cmd::SET_INVERSE],
                vec![cmd::DISPLAY_OFF]
            ]
        );
    }
}
