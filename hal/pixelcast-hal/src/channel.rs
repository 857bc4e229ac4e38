//! Debug up-channels
//!
//! A debug up-channel is a ring buffer drained by the host debugger.
//! Channels are registered once through a [`ChannelRegistry`], which
//! hands back an [`UpChannel`]; holding one is proof the channel was
//! initialised, so nothing can write to an unregistered channel.

use embedded_io::{ErrorType, Write};

/// Maximum number of channel ids tracked by the registry
pub const MAX_CHANNELS: u8 = 16;

/// Reference capacity of the framebuffer mirror channel
pub const DEFAULT_CAPACITY: usize = 512;

/// Behaviour when the channel ring buffer is full
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelMode {
    /// Park the writer until the host drains enough space
    BlockIfFull,
    /// Drop the whole write if it does not fit
    NoBlockSkip,
    /// Write what fits, drop the rest
    NoBlockTrim,
}

/// Channel registration parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelConfig {
    /// Channel index as seen by the host
    pub id: u8,
    /// Label shown by the host tooling
    pub name: &'static str,
    /// Ring buffer capacity in bytes
    pub capacity: usize,
    /// Full-buffer behaviour
    pub mode: ChannelMode,
}

impl ChannelConfig {
    /// Blocking channel with the given id, name and capacity
    pub const fn blocking(id: u8, name: &'static str, capacity: usize) -> Self {
        Self {
            id,
            name,
            capacity,
            mode: ChannelMode::BlockIfFull,
        }
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self::blocking(0, "Framebuffer", DEFAULT_CAPACITY)
    }
}

/// Errors from channel registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelError {
    /// Id outside `0..MAX_CHANNELS`
    InvalidId,
    /// Id was registered before
    AlreadyRegistered,
    /// Capacity of zero bytes
    ZeroCapacity,
    /// Only blocking channels carry framed traffic
    UnsupportedMode,
}

/// Tracks which channel ids have been registered
pub struct ChannelRegistry {
    /// Bitmask of registered ids
    registered: u16,
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelRegistry {
    /// Create an empty registry
    pub const fn new() -> Self {
        Self { registered: 0 }
    }

    /// Register a channel backed by `writer`
    ///
    /// `writer` must block while its buffer is full; the registry
    /// cannot check that, so it only accepts [`ChannelMode::BlockIfFull`]
    /// configurations.
    pub fn register<W: Write>(
        &mut self,
        config: ChannelConfig,
        writer: W,
    ) -> Result<UpChannel<W>, ChannelError> {
        if config.id >= MAX_CHANNELS {
            return Err(ChannelError::InvalidId);
        }
        if config.capacity == 0 {
            return Err(ChannelError::ZeroCapacity);
        }
        if config.mode != ChannelMode::BlockIfFull {
            return Err(ChannelError::UnsupportedMode);
        }
        let mask = 1u16 << config.id;
        if self.registered & mask != 0 {
            return Err(ChannelError::AlreadyRegistered);
        }
        self.registered |= mask;
        Ok(UpChannel { config, writer })
    }

    /// Check if a channel id is registered
    pub fn is_registered(&self, id: u8) -> bool {
        if id >= MAX_CHANNELS {
            return false;
        }
        self.registered & (1 << id) != 0
    }
}

/// A registered, blocking debug up-channel
pub struct UpChannel<W> {
    config: ChannelConfig,
    writer: W,
}

impl<W> UpChannel<W> {
    /// Registration parameters of this channel
    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// Release the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: ErrorType> ErrorType for UpChannel<W> {
    type Error = W::Error;
}

impl<W: Write> Write for UpChannel<W> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    /// Writer that records into a fixed array
    struct Recorder {
        data: [u8; 8],
        len: usize,
    }

    impl ErrorType for Recorder {
        type Error = Infallible;
    }

    impl Write for Recorder {
        fn write(&mut self, buf: &[u8]) -> Result<usize, Infallible> {
            let n = buf.len().min(self.data.len() - self.len);
            self.data[self.len..self.len + n].copy_from_slice(&buf[..n]);
            self.len += n;
            Ok(n)
        }

        fn flush(&mut self) -> Result<(), Infallible> {
            Ok(())
        }
    }

    fn recorder() -> Recorder {
        Recorder {
            data: [0; 8],
            len: 0,
        }
    }

    #[test]
    fn test_register_once() {
        let mut registry = ChannelRegistry::new();
        assert!(registry.register(ChannelConfig::default(), recorder()).is_ok());
        assert!(registry.is_registered(0));
        assert!(matches!(
            registry.register(ChannelConfig::default(), recorder()),
            Err(ChannelError::AlreadyRegistered)
        ));
    }

    #[test]
    fn test_register_rejects_bad_config() {
        let mut registry = ChannelRegistry::new();
        assert!(matches!(
            registry.register(ChannelConfig::blocking(16, "x", 8), recorder()),
            Err(ChannelError::InvalidId)
        ));
        assert!(matches!(
            registry.register(ChannelConfig::blocking(1, "x", 0), recorder()),
            Err(ChannelError::ZeroCapacity)
        ));
        let skip = ChannelConfig {
            mode: ChannelMode::NoBlockSkip,
            ..ChannelConfig::blocking(2, "x", 8)
        };
        assert!(matches!(
            registry.register(skip, recorder()),
            Err(ChannelError::UnsupportedMode)
        ));
        // Failed registrations do not reserve the id
        assert!(!registry.is_registered(1));
        assert!(!registry.is_registered(2));
    }

    #[test]
    fn test_up_channel_forwards_writes() {
        let mut registry = ChannelRegistry::new();
        let mut channel = registry
            .register(ChannelConfig::blocking(3, "Framebuffer", 512), recorder())
            .unwrap();
        channel.write_all(&[0x00, 0x1F, 0x2F]).unwrap();
        assert_eq!(channel.config().name, "Framebuffer");
        let inner = channel.into_inner();
        assert_eq!(&inner.data[..inner.len], &[0x00, 0x1F, 0x2F]);
    }
}
