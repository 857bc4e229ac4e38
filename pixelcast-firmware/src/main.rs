//! Pixelcast - OLED framebuffer firmware
//!
//! Main firmware binary for RP2040 boards driving a 256x64 SH1122 OLED.
//! A software rasterizer draws into one framebuffer; every frame is
//! pushed to the panel over SPI and mirrored to the host over a
//! blocking debug channel (UART0 TX) in the self-synchronizing
//! framebuffer stream format.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::UART0;
use embassy_rp::spi::{self, Spi};
use embassy_rp::uart::{self, BufferedInterruptHandler, BufferedUartTx};
use embassy_time::{Delay, Duration, Ticker, Timer};
use embedded_graphics::mono_font::{ascii::FONT_6X10, MonoTextStyle};
use embedded_graphics::pixelcolor::Gray8;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Alignment, Text};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use pixelcast_core::{
    FanoutError, FirmwareConfig, FrameBuffer, FrameLoop, LoopAction, LoopError, MirrorSink, Scene,
};
use pixelcast_display::{DisplayAdapter, DisplayError, PanelBus, Sh1122};
use pixelcast_hal::spi::{BitOrder, Phase, Polarity};
use pixelcast_hal::{ChannelConfig, ChannelRegistry, SpiConfig};

mod config;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

/// Debug channel id of the framebuffer mirror
const MIRROR_CHANNEL_ID: u8 = 0;

/// Mirror UART baud rate
const MIRROR_BAUDRATE: u32 = 921_600;

/// How long the splash screen stays up
const SPLASH_MS: u64 = 750;

// Static cells for buffers (must live forever)
static CONFIG: StaticCell<FirmwareConfig> = StaticCell::new();
static FRAMEBUFFER: StaticCell<[u8; config::BUFFER_LEN]> = StaticCell::new();
static MIRROR_BUF: StaticCell<[u8; config::MIRROR_CAPACITY]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Pixelcast firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config: &'static FirmwareConfig = CONFIG.init(config::firmware_config());
    info!(
        "Panel {}x{}, layout {}, display {}, {} fps",
        config.panel.width,
        config.panel.height,
        config.panel.layout,
        config.panel.display,
        config.render.fps
    );

    // Panel bus (SPI0: SCK=GPIO2, MOSI=GPIO3; CS=GPIO5, DC=GPIO6, RST=GPIO7)
    let bus_config = SpiConfig::default();
    if bus_config.bit_order != BitOrder::MsbFirst {
        warn!("RP2040 SPI only shifts MSB first, ignoring bit order");
    }
    let mut spi_config = spi::Config::default();
    spi_config.frequency = bus_config.frequency;
    spi_config.polarity = match bus_config.polarity() {
        Polarity::IdleLow => spi::Polarity::IdleLow,
        Polarity::IdleHigh => spi::Polarity::IdleHigh,
    };
    spi_config.phase = match bus_config.phase() {
        Phase::CaptureOnFirstTransition => spi::Phase::CaptureOnFirstTransition,
        Phase::CaptureOnSecondTransition => spi::Phase::CaptureOnSecondTransition,
    };

    let spi = Spi::new_blocking_txonly(p.SPI0, p.PIN_2, p.PIN_3, spi_config);
    let cs = Output::new(p.PIN_5, Level::High);
    let dc = Output::new(p.PIN_6, Level::Low);
    let rst = Output::new(p.PIN_7, Level::High);
    let bus = PanelBus::new(spi, cs, dc, rst, Delay);

    let mut display = DisplayAdapter::new(Sh1122::new(bus), config.panel.display);
    if let Err(e) = display.init() {
        defmt::panic!("Panel init failed: {}", e);
    }
    info!("SH1122 panel initialized");

    // Framebuffer
    let storage = FRAMEBUFFER.init([0u8; config::BUFFER_LEN]);
    let mut framebuffer = match FrameBuffer::new(
        storage,
        config.panel.width as usize,
        config.panel.height as usize,
        config.panel.layout,
    ) {
        Ok(fb) => fb,
        Err(e) => defmt::panic!("Framebuffer allocation failed: {}", e),
    };

    // Aliased mode reads the framebuffer as the panel's page buffer
    if display.check_layout(&framebuffer.view()).is_err() {
        defmt::panic!("Framebuffer layout does not match the panel");
    }

    draw_splash(&mut framebuffer);
    if let Err(e) = display.present(&framebuffer.view()) {
        warn!("Splash flush failed: {}", e);
    }
    Timer::after_millis(SPLASH_MS).await;

    // Mirror channel (UART0 TX on GPIO0, blocking when the ring is full)
    let mirror = if config.mirror.enabled {
        let tx_buf = MIRROR_BUF.init([0u8; config::MIRROR_CAPACITY]);
        let mut uart_config = uart::Config::default();
        uart_config.baudrate = MIRROR_BAUDRATE;
        let tx = BufferedUartTx::new(p.UART0, Irqs, p.PIN_0, tx_buf, uart_config);

        let mut registry = ChannelRegistry::new();
        let channel_config = ChannelConfig::blocking(
            MIRROR_CHANNEL_ID,
            config.mirror.channel.as_str(),
            config.mirror.capacity,
        );
        match registry.register(channel_config, tx) {
            Ok(channel) => {
                info!("Mirror channel '{}' registered", channel_config.name);
                Some(MirrorSink::new(channel, config.frame_format()))
            }
            Err(e) => {
                warn!("Mirror channel not registered: {}", e);
                None
            }
        }
    } else {
        info!("Mirror disabled");
        None
    };

    let mut frame_loop = FrameLoop::new(framebuffer, config.loop_mode(), config.animation());
    let mut scene = Scene::from_config(&config.render);
    let mut sinks = (display, mirror);
    let mut ticker = Ticker::every(Duration::from_millis(config.frame_interval_ms() as u64));

    info!("Frame loop running");

    loop {
        match frame_loop.run_frame(&mut scene, &mut sinks) {
            Ok(LoopAction::Continue) => {}
            Ok(LoopAction::WaitFrame { .. }) => ticker.next().await,
            Ok(LoopAction::Park) => {
                info!("Single frame presented, idling");
                core::future::pending::<()>().await;
            }
            Ok(LoopAction::Halt) => break,
            Err(LoopError::Sink(FanoutError::First(DisplayError::LayoutMismatch))) => {
                defmt::panic!("Framebuffer layout does not match the panel");
            }
            Err(LoopError::Sink(FanoutError::First(e))) => {
                warn!("Display flush failed: {}", e);
            }
            Err(LoopError::Sink(FanoutError::Second(e))) => {
                warn!("Mirror send failed: {}", e);
            }
        }
    }

    info!("Frame loop stopped after {} frames", frame_loop.frames());
}

/// Draw the boot splash into the framebuffer
fn draw_splash<B>(framebuffer: &mut FrameBuffer<B>)
where
    B: AsRef<[u8]> + AsMut<[u8]>,
{
    let style = MonoTextStyle::new(&FONT_6X10, Gray8::WHITE);
    let center = framebuffer.bounding_box().center();

    framebuffer.clear();
    let _ = Text::with_alignment("pixelcast", center, style, Alignment::Center).draw(framebuffer);
    framebuffer.commit();
}
