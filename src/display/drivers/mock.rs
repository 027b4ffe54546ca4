/*
 *  display/drivers/mock.rs
 *
 *  ARKeys e-ink - panel renderer
 *  (c) 2025-26 ARKeys contributors
 *
 *  Mock panel driver for testing and dry runs without hardware
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

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, info};

use crate::display::error::DisplayError;
use crate::display::framebuffer::{self, MonoFrame, WHITE_BYTE};
use crate::display::traits::{PanelDriver, RefreshMode};

/// One recorded driver call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelCall {
    Init(RefreshMode),
    Clear(u8),
    Display(Vec<u8>),
    DisplayPartial(Vec<u8>),
    Sleep,
}

/// Internal state for the mock panel (shared for inspection in tests)
#[derive(Debug, Default)]
pub struct MockPanelState {
    /// Every call in order
    pub calls: Vec<PanelCall>,

    /// What the glass currently shows, packed; empty until first write
    pub screen: Vec<u8>,

    /// Mode from the most recent init
    pub mode: Option<RefreshMode>,

    /// Simulate failures (for error testing)
    pub simulate_init_failure: bool,
    pub simulate_display_failure: bool,
    pub simulate_sleep_failure: bool,
}

impl MockPanelState {
    pub fn count(&self, pred: impl Fn(&PanelCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    /// Index of the last call matching `pred`
    pub fn last_index(&self, pred: impl Fn(&PanelCall) -> bool) -> Option<usize> {
        self.calls.iter().rposition(|c| pred(c))
    }

    /// Last packed buffer pushed by either display call
    pub fn last_frame(&self) -> Option<&[u8]> {
        self.calls.iter().rev().find_map(|c| match c {
            PanelCall::Display(b) | PanelCall::DisplayPartial(b) => Some(b.as_slice()),
            _ => None,
        })
    }
}

/// Mock panel driver
///
/// Records every call behind a shared handle so a test can keep inspecting
/// after the renderer takes ownership. With a PBM path set, each displayed
/// frame is also written to disk for eyeballing a dry run.
#[derive(Debug, Clone)]
pub struct MockPanel {
    width: u32,
    height: u32,
    pbm_path: Option<PathBuf>,
    state: Arc<Mutex<MockPanelState>>,
}

impl MockPanel {
    /// Mock with the given native size
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pbm_path: None,
            state: Arc::new(Mutex::new(MockPanelState::default())),
        }
    }

    /// Mock shaped like the 2.13" panel
    pub fn epd2in13() -> Self {
        Self::new(122, 250)
    }

    /// Write each displayed frame to `path` as PBM
    pub fn with_pbm_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.pbm_path = Some(path.into());
        self
    }

    /// Get reference to state for inspection in tests
    pub fn state(&self) -> Arc<Mutex<MockPanelState>> {
        Arc::clone(&self.state)
    }

    fn lock(&self) -> MutexGuard<'_, MockPanelState> {
        // a panicked test thread must not hide the recorded calls
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_len(&self, buffer: &[u8]) -> Result<(), DisplayError> {
        let expected = self.buffer_len();
        if buffer.len() != expected {
            return Err(DisplayError::BufferSizeMismatch { expected, actual: buffer.len() });
        }
        Ok(())
    }

    /// Unpack the screen into a native-orientation frame
    fn screen_frame(&self, screen: &[u8]) -> MonoFrame {
        use embedded_graphics::prelude::*;

        let mut frame = MonoFrame::blank(Size::new(self.width, self.height));
        let line = (self.width as usize).div_ceil(8);
        let ink = (0..self.height as usize)
            .flat_map(|y| (0..self.width as usize).map(move |x| (x, y)))
            .filter(|&(x, y)| screen[x / 8 + y * line] & (0x80 >> (x % 8)) == 0)
            .map(|(x, y)| Pixel(Point::new(x as i32, y as i32), framebuffer::INK));
        let _ = frame.draw_iter(ink);
        frame
    }

    fn write_pbm(&self, screen: &[u8]) -> Result<(), DisplayError> {
        if let Some(path) = &self.pbm_path {
            std::fs::write(path, self.screen_frame(screen).to_pbm())
                .map_err(|e| DisplayError::DisplayIo(format!("writing {}: {}", path.display(), e)))?;
            info!("Mock panel frame written to {}", path.display());
        }
        Ok(())
    }

    fn push(&mut self, buffer: &[u8], partial: bool) -> Result<(), DisplayError> {
        self.check_len(buffer)?;
        {
            let mut state = self.lock();
            if state.simulate_display_failure {
                return Err(DisplayError::DisplayIo("Simulated display failure".to_string()));
            }
            state.calls.push(if partial {
                PanelCall::DisplayPartial(buffer.to_vec())
            } else {
                PanelCall::Display(buffer.to_vec())
            });
            state.screen = buffer.to_vec();
        } // Release lock before touching the filesystem
        debug!("Mock panel {} refresh, {} bytes", if partial { "partial" } else { "full" }, buffer.len());
        self.write_pbm(buffer)
    }
}

impl PanelDriver for MockPanel {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn init(&mut self, mode: RefreshMode) -> Result<(), DisplayError> {
        let mut state = self.lock();

        if state.simulate_init_failure {
            return Err(DisplayError::HardwareInit("Simulated init failure".to_string()));
        }

        state.calls.push(PanelCall::Init(mode));
        state.mode = Some(mode);
        Ok(())
    }

    fn clear(&mut self, value: u8) -> Result<(), DisplayError> {
        let len = self.buffer_len();
        let mut state = self.lock();
        if state.simulate_display_failure {
            return Err(DisplayError::DisplayIo("Simulated clear failure".to_string()));
        }
        state.calls.push(PanelCall::Clear(value));
        state.screen = vec![value; len];
        Ok(())
    }

    fn display(&mut self, buffer: &[u8]) -> Result<(), DisplayError> {
        self.push(buffer, false)
    }

    fn display_partial(&mut self, buffer: &[u8]) -> Result<(), DisplayError> {
        self.push(buffer, true)
    }

    fn sleep(&mut self) -> Result<(), DisplayError> {
        let mut state = self.lock();
        state.calls.push(PanelCall::Sleep);
        if state.simulate_sleep_failure {
            return Err(DisplayError::DisplayIo("Simulated sleep failure".to_string()));
        }
        Ok(())
    }
}

/// True when the screen is uniformly white
pub fn is_all_white(screen: &[u8]) -> bool {
    !screen.is_empty() && screen.iter().all(|&b| b == WHITE_BYTE)
}
