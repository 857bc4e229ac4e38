//! Panel link messages
//!
//! Display driver libraries talk to the board through two message
//! streams: one carrying bytes to the controller, one toggling control
//! pins and waiting. These are modelled here as enums with typed
//! payloads. [`ByteCommand::from_raw`] and [`GpioCommand::from_raw`]
//! accept the numeric codes used by the C display library so foreign
//! callers can still be routed through the typed path.

/// Raw message codes for the byte stream
pub mod byte_code {
    pub const INIT: u8 = 20;
    pub const SEND: u8 = 23;
    pub const START_TRANSFER: u8 = 24;
    pub const END_TRANSFER: u8 = 25;
    pub const SET_DC: u8 = 32;
}

/// Raw message codes for the GPIO and delay stream
pub mod gpio_code {
    pub const INIT: u8 = 40;
    pub const DELAY_MILLI: u8 = 41;
    pub const DELAY_10MICRO: u8 = 42;
    pub const DELAY_100NANO: u8 = 43;
    pub const DELAY_NANO: u8 = 44;
    pub const CS: u8 = 72;
    pub const DC: u8 = 73;
    pub const RESET: u8 = 74;
}

/// Message on the byte transport to the panel controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ByteCommand<'a> {
    /// Bring up the bus peripheral
    Init,
    /// Select data (`true`) or command (`false`) mode
    SetDataMode(bool),
    /// Open a transfer (assert chip select)
    StartTransfer,
    /// Write bytes to the controller
    Send(&'a [u8]),
    /// Close the transfer (release chip select)
    EndTransfer,
}

impl<'a> ByteCommand<'a> {
    /// Decode a raw byte-stream message
    ///
    /// `arg` is the integer argument and `data` the pointer payload of
    /// the raw message. For `SEND`, `arg` is the byte count and `data`
    /// is truncated to it. Returns `None` for unknown codes.
    pub fn from_raw(code: u8, arg: u8, data: &'a [u8]) -> Option<Self> {
        match code {
            byte_code::INIT => Some(Self::Init),
            byte_code::SEND => {
                let len = (arg as usize).min(data.len());
                Some(Self::Send(&data[..len]))
            }
            byte_code::START_TRANSFER => Some(Self::StartTransfer),
            byte_code::END_TRANSFER => Some(Self::EndTransfer),
            byte_code::SET_DC => Some(Self::SetDataMode(arg != 0)),
            _ => None,
        }
    }
}

/// Message on the GPIO and delay stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpioCommand {
    /// Configure control pins as outputs
    Init,
    /// Drive chip select (level as requested by the library)
    ChipSelect(bool),
    /// Drive the data/command pin
    DataCommand(bool),
    /// Drive the reset pin
    Reset(bool),
    /// Wait for the given number of milliseconds
    DelayMillis(u8),
    /// Wait roughly 10 µs
    Delay10Micros,
    /// Wait roughly 100 ns
    Delay100Nanos,
    /// Wait roughly 1 ns
    DelayNanos,
}

impl GpioCommand {
    /// Decode a raw GPIO/delay message. Returns `None` for unknown codes.
    pub fn from_raw(code: u8, arg: u8) -> Option<Self> {
        match code {
            gpio_code::INIT => Some(Self::Init),
            gpio_code::DELAY_MILLI => Some(Self::DelayMillis(arg)),
            gpio_code::DELAY_10MICRO => Some(Self::Delay10Micros),
            gpio_code::DELAY_100NANO => Some(Self::Delay100Nanos),
            gpio_code::DELAY_NANO => Some(Self::DelayNanos),
            gpio_code::CS => Some(Self::ChipSelect(arg != 0)),
            gpio_code::DC => Some(Self::DataCommand(arg != 0)),
            gpio_code::RESET => Some(Self::Reset(arg != 0)),
            _ => None,
        }
    }
}

/// Outcome of dispatching a raw message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Handled {
    /// The message was understood and executed
    Yes,
    /// The message code is unknown; nothing was done
    No,
}

impl Handled {
    /// Check if the message was handled
    pub fn is_handled(self) -> bool {
        self == Handled::Yes
    }
}

impl From<bool> for Handled {
    fn from(handled: bool) -> Self {
        if handled {
            Handled::Yes
        } else {
            Handled::No
        }
    }
}
