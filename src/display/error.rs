/*
 *  display/error.rs
 *
 *  ARKeys e-ink - panel renderer
 *  (c) 2025-26 ARKeys contributors
 *
 *  Unified error types for display subsystem
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

use thiserror::Error;

use crate::display::traits::PanelState;

/// Unified error type for all display operations
///
/// None of these are retried; they travel straight to the process boundary.
#[derive(Debug, Error)]
pub enum DisplayError {
    /// Panel could not be reached or configured (SPI/GPIO unavailable, init failed)
    #[error("Panel initialization failed: {0}")]
    HardwareInit(String),

    /// Buffer push, clear, busy wait or sleep failed
    #[error("Display I/O error: {0}")]
    DisplayIo(String),

    /// Font or draw primitive failure
    #[error("Render error: {0}")]
    Render(String),

    /// Packed buffer length does not match the panel
    #[error("Buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// Frame dimensions match neither the panel nor its transpose
    #[error("Frame is {frame_width}x{frame_height} but the panel is {panel_width}x{panel_height}")]
    FrameSizeMismatch {
        frame_width: u32,
        frame_height: u32,
        panel_width: u32,
        panel_height: u32,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Operation not allowed in the current panel state
    #[error("Cannot {operation} while the panel is {state:?}")]
    InvalidState { state: PanelState, operation: &'static str },
}
