/*
 *  display/drivers/epd2in13.rs
 *
 *  ARKeys e-ink - panel renderer
 *  (c) 2025-26 ARKeys contributors
 *
 *  Waveshare 2.13" V4 e-paper (SSD1680) driver over embedded-hal
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;
use linux_embedded_hal::gpio_cdev::{Chip, LineRequestFlags};
use linux_embedded_hal::spidev::{SpiModeFlags, SpidevOptions};
use linux_embedded_hal::{CdevPin, Delay, SpidevDevice};
use log::{debug, info};

use crate::config::SpiBusConfig;
use crate::display::error::DisplayError;
use crate::display::traits::{PanelDriver, RefreshMode};

/// Native width in pixels
pub const WIDTH: u32 = 122;

/// Native height in pixels
pub const HEIGHT: u32 = 250;

/// Longest a refresh may hold BUSY before we give up
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(10);

const BUSY_POLL_MS: u32 = 10;

/// Deep sleep needs the bus held this long before release
const SLEEP_HOLD_MS: u32 = 2000;

/// SSD1680 commands used by the panel
mod cmd {
    pub const DRIVER_OUTPUT_CONTROL: u8 = 0x01;
    pub const DEEP_SLEEP: u8 = 0x10;
    pub const DATA_ENTRY_MODE: u8 = 0x11;
    pub const SW_RESET: u8 = 0x12;
    pub const TEMPERATURE_SENSOR: u8 = 0x18;
    pub const MASTER_ACTIVATION: u8 = 0x20;
    pub const DISPLAY_UPDATE_CONTROL_1: u8 = 0x21;
    pub const DISPLAY_UPDATE_CONTROL_2: u8 = 0x22;
    pub const WRITE_RAM_BW: u8 = 0x24;
    pub const WRITE_RAM_BASE: u8 = 0x26;
    pub const BORDER_WAVEFORM: u8 = 0x3C;
    pub const RAM_X_RANGE: u8 = 0x44;
    pub const RAM_Y_RANGE: u8 = 0x45;
    pub const RAM_X_COUNTER: u8 = 0x4E;
    pub const RAM_Y_COUNTER: u8 = 0x4F;
}

/// Update sequences for DISPLAY_UPDATE_CONTROL_2
const UPDATE_FULL: u8 = 0xF7;
const UPDATE_PARTIAL: u8 = 0xFF;

/// 2.13" V4 panel on any embedded-hal SPI device and pins
pub struct Epd2in13<SPI, BUSY, DC, RST, DELAY> {
    spi: SPI,
    busy: BUSY,
    dc: DC,
    rst: RST,
    delay: DELAY,
    busy_timeout: Duration,
}

/// The concrete panel on a Raspberry Pi
pub type LinuxEpd2in13 = Epd2in13<SpidevDevice, CdevPin, CdevPin, CdevPin, Delay>;

impl<SPI, BUSY, DC, RST, DELAY> Epd2in13<SPI, BUSY, DC, RST, DELAY>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    DELAY: DelayNs,
{
    /// Wrap already-configured bus and pins. Nothing is sent until `init`.
    pub fn new(spi: SPI, busy: BUSY, dc: DC, rst: RST, delay: DELAY) -> Self {
        Self { spi, busy, dc, rst, delay, busy_timeout: DEFAULT_BUSY_TIMEOUT }
    }

    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    fn command(&mut self, command: u8) -> Result<(), DisplayError> {
        self.dc.set_low().map_err(|e| gpio_error("DC", e))?;
        self.spi.write(&[command]).map_err(spi_error)
    }

    fn data(&mut self, data: &[u8]) -> Result<(), DisplayError> {
        self.dc.set_high().map_err(|e| gpio_error("DC", e))?;
        // spidev rejects single transfers beyond its buffer size (4096 by default)
        for chunk in data.chunks(4096) {
            self.spi.write(chunk).map_err(spi_error)?;
        }
        Ok(())
    }

    fn command_with_data(&mut self, command: u8, data: &[u8]) -> Result<(), DisplayError> {
        self.command(command)?;
        self.data(data)
    }

    fn hardware_reset(&mut self, low_ms: u32, settle_ms: u32) -> Result<(), DisplayError> {
        self.rst.set_high().map_err(|e| gpio_error("RST", e))?;
        self.delay.delay_ms(settle_ms);
        self.rst.set_low().map_err(|e| gpio_error("RST", e))?;
        self.delay.delay_ms(low_ms);
        self.rst.set_high().map_err(|e| gpio_error("RST", e))?;
        self.delay.delay_ms(settle_ms);
        Ok(())
    }

    /// Poll BUSY (high while the controller works) until it drops
    fn wait_until_idle(&mut self) -> Result<(), DisplayError> {
        let max_polls = (self.busy_timeout.as_millis() / BUSY_POLL_MS as u128).max(1);
        for _ in 0..max_polls {
            if !self.busy.is_high().map_err(|e| gpio_error("BUSY", e))? {
                return Ok(());
            }
            self.delay.delay_ms(BUSY_POLL_MS);
        }
        Err(DisplayError::DisplayIo(format!(
            "panel still busy after {:?}", self.busy_timeout
        )))
    }

    fn set_window(&mut self, x_start: u32, y_start: u32, x_end: u32, y_end: u32) -> Result<(), DisplayError> {
        self.command_with_data(
            cmd::RAM_X_RANGE,
            &[((x_start >> 3) & 0xFF) as u8, ((x_end >> 3) & 0xFF) as u8],
        )?;
        self.command_with_data(
            cmd::RAM_Y_RANGE,
            &[
                (y_start & 0xFF) as u8,
                ((y_start >> 8) & 0xFF) as u8,
                (y_end & 0xFF) as u8,
                ((y_end >> 8) & 0xFF) as u8,
            ],
        )
    }

    fn set_cursor(&mut self, x: u32, y: u32) -> Result<(), DisplayError> {
        self.command_with_data(cmd::RAM_X_COUNTER, &[(x & 0xFF) as u8])?;
        self.command_with_data(cmd::RAM_Y_COUNTER, &[(y & 0xFF) as u8, ((y >> 8) & 0xFF) as u8])
    }

    fn full_window(&mut self) -> Result<(), DisplayError> {
        self.set_window(0, 0, WIDTH - 1, HEIGHT - 1)?;
        self.set_cursor(0, 0)
    }

    fn turn_on(&mut self, sequence: u8) -> Result<(), DisplayError> {
        self.command_with_data(cmd::DISPLAY_UPDATE_CONTROL_2, &[sequence])?;
        self.command(cmd::MASTER_ACTIVATION)?;
        self.wait_until_idle()
    }

    fn init_sequence(&mut self) -> Result<(), DisplayError> {
        self.hardware_reset(2, 20)?;
        self.wait_until_idle()?;

        self.command(cmd::SW_RESET)?;
        self.wait_until_idle()?;

        self.command_with_data(cmd::DRIVER_OUTPUT_CONTROL, &[0xF9, 0x00, 0x00])?;
        self.command_with_data(cmd::DATA_ENTRY_MODE, &[0x03])?;
        self.full_window()?;
        self.command_with_data(cmd::BORDER_WAVEFORM, &[0x05])?;
        self.command_with_data(cmd::DISPLAY_UPDATE_CONTROL_1, &[0x00, 0x80])?;
        // internal temperature sensor
        self.command_with_data(cmd::TEMPERATURE_SENSOR, &[0x80])?;
        self.wait_until_idle()
    }

    fn check_len(&self, buffer: &[u8]) -> Result<(), DisplayError> {
        let expected = self.buffer_len();
        if buffer.len() != expected {
            return Err(DisplayError::BufferSizeMismatch { expected, actual: buffer.len() });
        }
        Ok(())
    }
}

impl LinuxEpd2in13 {
    /// Open the SPI device and claim the GPIO lines
    pub fn open(bus: &SpiBusConfig) -> Result<Self, DisplayError> {
        info!(
            "Opening 2.13\" e-paper on {} (DC {}, RST {}, BUSY {} on {})",
            bus.bus, bus.dc_pin, bus.rst_pin, bus.busy_pin, bus.gpio_chip
        );

        let mut spi = SpidevDevice::open(&bus.bus)
            .map_err(|e| DisplayError::HardwareInit(format!("Failed to open {}: {:?}", bus.bus, e)))?;
        let options = SpidevOptions::new()
            .bits_per_word(8)
            .max_speed_hz(bus.speed_hz)
            .mode(SpiModeFlags::SPI_MODE_0)
            .build();
        spi.0.configure(&options)
            .map_err(|e| DisplayError::HardwareInit(format!("Failed to configure {}: {}", bus.bus, e)))?;

        let mut chip = Chip::new(&bus.gpio_chip)
            .map_err(|e| DisplayError::HardwareInit(format!("Failed to open {}: {}", bus.gpio_chip, e)))?;
        let mut line = |offset: u32, flags: LineRequestFlags, label: &str| {
            chip.get_line(offset)
                .and_then(|l| l.request(flags, 0, "arkeys-eink"))
                .and_then(CdevPin::new)
                .map_err(|e| DisplayError::HardwareInit(format!("GPIO {} ({}): {}", offset, label, e)))
        };

        let busy = line(bus.busy_pin, LineRequestFlags::INPUT, "busy")?;
        let dc = line(bus.dc_pin, LineRequestFlags::OUTPUT, "dc")?;
        let rst = line(bus.rst_pin, LineRequestFlags::OUTPUT, "rst")?;

        Ok(Self::new(spi, busy, dc, rst, Delay))
    }
}

impl<SPI, BUSY, DC, RST, DELAY> PanelDriver for Epd2in13<SPI, BUSY, DC, RST, DELAY>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    DELAY: DelayNs,
{
    fn width(&self) -> u32 {
        WIDTH
    }

    fn height(&self) -> u32 {
        HEIGHT
    }

    fn init(&mut self, mode: RefreshMode) -> Result<(), DisplayError> {
        // both modes start from the full controller setup; the partial
        // registers are loaded on each partial push
        debug!("EPD init ({:?})", mode);
        self.init_sequence().map_err(|e| match e {
            DisplayError::HardwareInit(msg) => DisplayError::HardwareInit(msg),
            other => DisplayError::HardwareInit(other.to_string()),
        })
    }

    fn clear(&mut self, value: u8) -> Result<(), DisplayError> {
        let fill = vec![value; self.buffer_len()];
        self.command_with_data(cmd::WRITE_RAM_BW, &fill)?;
        self.command_with_data(cmd::WRITE_RAM_BASE, &fill)?;
        self.turn_on(UPDATE_FULL)
    }

    fn display(&mut self, buffer: &[u8]) -> Result<(), DisplayError> {
        self.check_len(buffer)?;
        self.command_with_data(cmd::WRITE_RAM_BW, buffer)?;
        // base image for the partial updates that may follow
        self.command_with_data(cmd::WRITE_RAM_BASE, buffer)?;
        self.turn_on(UPDATE_FULL)
    }

    fn display_partial(&mut self, buffer: &[u8]) -> Result<(), DisplayError> {
        self.check_len(buffer)?;

        self.rst.set_low().map_err(|e| gpio_error("RST", e))?;
        self.delay.delay_ms(1);
        self.rst.set_high().map_err(|e| gpio_error("RST", e))?;

        self.command_with_data(cmd::BORDER_WAVEFORM, &[0x80])?;
        self.command_with_data(cmd::DRIVER_OUTPUT_CONTROL, &[0xF9, 0x00, 0x00])?;
        self.command_with_data(cmd::DATA_ENTRY_MODE, &[0x03])?;
        self.full_window()?;

        self.command_with_data(cmd::WRITE_RAM_BW, buffer)?;
        self.turn_on(UPDATE_PARTIAL)
    }

    fn sleep(&mut self) -> Result<(), DisplayError> {
        self.command_with_data(cmd::DEEP_SLEEP, &[0x01])?;
        self.delay.delay_ms(SLEEP_HOLD_MS);
        debug!("EPD in deep sleep");
        Ok(())
    }
}

fn spi_error<E: core::fmt::Debug>(err: E) -> DisplayError {
    DisplayError::DisplayIo(format!("SPI write failed: {:?}", err))
}

fn gpio_error<E: core::fmt::Debug>(pin: &str, err: E) -> DisplayError {
    DisplayError::DisplayIo(format!("GPIO {} failed: {:?}", pin, err))
}
