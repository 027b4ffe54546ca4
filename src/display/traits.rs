/*
 *  display/traits.rs
 *
 *  ARKeys e-ink - panel renderer
 *  (c) 2025-26 ARKeys contributors
 *
 *  Core trait definitions for panel driver abstraction
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

use serde::{Deserialize, Serialize};

use crate::display::error::DisplayError;
use crate::display::framebuffer::{self, MonoFrame};

/// E-ink update mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RefreshMode {
    /// Clears and recalibrates the whole panel, no ghosting, visible flicker
    #[default]
    Full,

    /// Redraws in place, faster but accumulates ghosting
    Partial,
}

/// Lifecycle of the panel within one run
///
/// `Uninitialized -> Initialized -> (Cleared) -> Displaying -> Sleeping`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    Uninitialized,
    Initialized,
    Cleared,
    Displaying,
    Sleeping,
}

impl PanelState {
    /// Panel has been initialized and not yet put to sleep
    pub fn is_active(self) -> bool {
        matches!(self, PanelState::Initialized | PanelState::Cleared | PanelState::Displaying)
    }
}

/// Contract every e-ink panel driver implements
///
/// Width and height are the panel's native reporting. Drivers know nothing
/// about text or layout; they accept packed buffers only.
pub trait PanelDriver {
    /// Native width in pixels
    fn width(&self) -> u32;

    /// Native height in pixels
    fn height(&self) -> u32;

    /// Configure the controller for a refresh mode and leave it ready for writes
    fn init(&mut self, mode: RefreshMode) -> Result<(), DisplayError>;

    /// Blank the whole panel to one byte value (0xFF is white)
    fn clear(&mut self, value: u8) -> Result<(), DisplayError>;

    /// Push a packed buffer with a full refresh
    fn display(&mut self, buffer: &[u8]) -> Result<(), DisplayError>;

    /// Push a packed buffer with a partial refresh
    fn display_partial(&mut self, buffer: &[u8]) -> Result<(), DisplayError>;

    /// Enter deep sleep
    fn sleep(&mut self) -> Result<(), DisplayError>;

    /// Convert a frame to this panel's packed representation
    fn pack(&self, frame: &MonoFrame) -> Result<Vec<u8>, DisplayError> {
        framebuffer::pack_for_panel(frame, self.width(), self.height())
    }

    /// Length in bytes of a packed buffer for this panel
    fn buffer_len(&self) -> usize {
        framebuffer::packed_len(self.width(), self.height())
    }
}

/// Type alias for boxed panel driver trait objects
pub type BoxedPanel = Box<dyn PanelDriver>;

impl<P: PanelDriver + ?Sized> PanelDriver for Box<P> {
    fn width(&self) -> u32 { (**self).width() }
    fn height(&self) -> u32 { (**self).height() }
    fn init(&mut self, mode: RefreshMode) -> Result<(), DisplayError> { (**self).init(mode) }
    fn clear(&mut self, value: u8) -> Result<(), DisplayError> { (**self).clear(value) }
    fn display(&mut self, buffer: &[u8]) -> Result<(), DisplayError> { (**self).display(buffer) }
    fn display_partial(&mut self, buffer: &[u8]) -> Result<(), DisplayError> {
        (**self).display_partial(buffer)
    }
    fn sleep(&mut self) -> Result<(), DisplayError> { (**self).sleep() }
    fn pack(&self, frame: &MonoFrame) -> Result<Vec<u8>, DisplayError> { (**self).pack(frame) }
    fn buffer_len(&self) -> usize { (**self).buffer_len() }
}
