//! Panel bus
//!
//! Executes typed byte-transport and GPIO/delay messages on an
//! `embedded-hal` SPI bus with separate chip-select, data/command and
//! reset pins. Raw numeric messages from a foreign display library can
//! be routed through [`PanelBus::dispatch_raw_byte`] and
//! [`PanelBus::dispatch_raw_gpio`]; unknown codes are reported as
//! [`Handled::No`] and do nothing.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, OutputPin};
use embedded_hal::spi::{self, SpiBus};
use pixelcast_hal::{ByteCommand, GpioCommand, Handled};

/// Bus errors, reduced to the `embedded-hal` error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    /// SPI transfer failed
    Spi(spi::ErrorKind),
    /// A control pin could not be driven
    Pin(digital::ErrorKind),
}

fn spi_err<E: spi::Error>(e: E) -> BusError {
    BusError::Spi(e.kind())
}

fn pin_err<E: digital::Error>(e: E) -> BusError {
    BusError::Pin(e.kind())
}

/// Command/data byte interface of a panel controller
pub trait ControllerBus {
    /// Bus error type
    type Error;

    /// Pulse the controller's reset line
    fn reset(&mut self) -> Result<(), Self::Error>;

    /// Write command bytes (DC low)
    fn command(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Write display data bytes (DC high)
    fn data(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;
}

/// SPI panel bus with chip-select, data/command and reset pins
pub struct PanelBus<SPI, CS, DC, RST, D> {
    spi: SPI,
    cs: CS,
    dc: DC,
    rst: RST,
    delay: D,
}

impl<SPI, CS, DC, RST, D> PanelBus<SPI, CS, DC, RST, D>
where
    SPI: SpiBus,
    CS: OutputPin,
    DC: OutputPin,
    RST: OutputPin,
    D: DelayNs,
{
    /// Create a bus from its parts
    pub fn new(spi: SPI, cs: CS, dc: DC, rst: RST, delay: D) -> Self {
        Self {
            spi,
            cs,
            dc,
            rst,
            delay,
        }
    }

    /// Release the parts
    pub fn release(self) -> (SPI, CS, DC, RST, D) {
        (self.spi, self.cs, self.dc, self.rst, self.delay)
    }

    /// Execute a byte-transport message
    pub fn execute_byte(&mut self, cmd: ByteCommand<'_>) -> Result<(), BusError> {
        match cmd {
            // The SPI peripheral is configured before the bus is built
            ByteCommand::Init => Ok(()),
            ByteCommand::SetDataMode(data) => self.dc.set_state(data.into()).map_err(pin_err),
            ByteCommand::StartTransfer => self.cs.set_low().map_err(pin_err),
            ByteCommand::Send(bytes) => self.spi.write(bytes).map_err(spi_err),
            ByteCommand::EndTransfer => {
                self.spi.flush().map_err(spi_err)?;
                self.cs.set_high().map_err(pin_err)
            }
        }
    }

    /// Execute a GPIO/delay message
    pub fn execute_gpio(&mut self, cmd: GpioCommand) -> Result<(), BusError> {
        match cmd {
            GpioCommand::Init => {
                self.cs.set_high().map_err(pin_err)?;
                self.rst.set_high().map_err(pin_err)
            }
            GpioCommand::ChipSelect(level) => self.cs.set_state(level.into()).map_err(pin_err),
            GpioCommand::DataCommand(level) => self.dc.set_state(level.into()).map_err(pin_err),
            GpioCommand::Reset(level) => self.rst.set_state(level.into()).map_err(pin_err),
            GpioCommand::DelayMillis(ms) => {
                self.delay.delay_ms(ms as u32);
                Ok(())
            }
            GpioCommand::Delay10Micros => {
                self.delay.delay_us(10);
                Ok(())
            }
            GpioCommand::Delay100Nanos => {
                self.delay.delay_ns(100);
                Ok(())
            }
            GpioCommand::DelayNanos => {
                self.delay.delay_ns(1);
                Ok(())
            }
        }
    }

    /// Decode and execute a raw byte-transport message
    pub fn dispatch_raw_byte(
        &mut self,
        code: u8,
        arg: u8,
        data: &[u8],
    ) -> Result<Handled, BusError> {
        match ByteCommand::from_raw(code, arg, data) {
            Some(cmd) => self.execute_byte(cmd).map(|_| Handled::Yes),
            None => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Unknown byte message code {}", code);
                Ok(Handled::No)
            }
        }
    }

    /// Decode and execute a raw GPIO/delay message
    pub fn dispatch_raw_gpio(&mut self, code: u8, arg: u8) -> Result<Handled, BusError> {
        match GpioCommand::from_raw(code, arg) {
            Some(cmd) => self.execute_gpio(cmd).map(|_| Handled::Yes),
            None => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Unknown GPIO message code {}", code);
                Ok(Handled::No)
            }
        }
    }

    fn transfer(&mut self, data_mode: bool, bytes: &[u8]) -> Result<(), BusError> {
        self.execute_byte(ByteCommand::SetDataMode(data_mode))?;
        self.execute_byte(ByteCommand::StartTransfer)?;
        let sent = self.execute_byte(ByteCommand::Send(bytes));
        // Release chip select even if the write failed
        let ended = self.execute_byte(ByteCommand::EndTransfer);
        sent.and(ended)
    }
}

impl<SPI, CS, DC, RST, D> ControllerBus for PanelBus<SPI, CS, DC, RST, D>
where
    SPI: SpiBus,
    CS: OutputPin,
    DC: OutputPin,
    RST: OutputPin,
    D: DelayNs,
{
    type Error = BusError;

    fn reset(&mut self) -> Result<(), BusError> {
        self.execute_gpio(GpioCommand::Init)?;
        self.execute_gpio(GpioCommand::Reset(false))?;
        self.execute_gpio(GpioCommand::DelayMillis(1))?;
        self.execute_gpio(GpioCommand::Reset(true))?;
        self.execute_gpio(GpioCommand::DelayMillis(10))
    }

    fn command(&mut self, bytes: &[u8]) -> Result<(), BusError> {
        self.transfer(false, bytes)
    }

    fn data(&mut self, bytes: &[u8]) -> Result<(), BusError> {
        self.transfer(true, bytes)
    }
}
