/*
 *  display/factory.rs
 *
 *  ARKeys e-ink - panel renderer
 *  (c) 2025-26 ARKeys contributors
 *
 *  Panel driver construction from configuration
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

use log::info;

use crate::config::{Config, DriverKind};
use crate::display::drivers::epd2in13::{self, LinuxEpd2in13};
use crate::display::drivers::mock::MockPanel;
use crate::display::error::DisplayError;
use crate::display::traits::BoxedPanel;

/// Create a panel driver from configuration
///
/// The hardware driver opens its SPI device and GPIO lines here, so any
/// wiring problem surfaces as `HardwareInit` before the renderer exists.
/// The mock takes its size from `display.width`/`display.height` and falls
/// back to the 2.13" geometry.
pub fn create_panel(config: &Config) -> Result<BoxedPanel, DisplayError> {
    match config.driver() {
        DriverKind::Epd2in13V4 => {
            Ok(Box::new(LinuxEpd2in13::open(&config.bus())?))
        }
        DriverKind::Mock => {
            let display = config.display.clone().unwrap_or_default();
            let width = display.width.unwrap_or(epd2in13::WIDTH);
            let height = display.height.unwrap_or(epd2in13::HEIGHT);
            if width == 0 || height == 0 {
                return Err(DisplayError::InvalidConfiguration(format!(
                    "mock panel size {}x{} must be non-zero",
                    width, height
                )));
            }

            let mut panel = MockPanel::new(width, height);
            if let Some(path) = display.pbm_path {
                panel = panel.with_pbm_output(path);
            }
            info!("Using mock panel {}x{}", width, height);
            Ok(Box::new(panel))
        }
    }
}
