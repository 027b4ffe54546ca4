/*
 *  display/mod.rs
 *
 *  ARKeys e-ink - panel renderer
 *  (c) 2025-26 ARKeys contributors
 *
 *  Display subsystem: panel drivers, frames, text layout and lifecycle
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

// Core trait definitions
pub mod traits;
pub mod error;
pub mod framebuffer;
pub mod factory;

// Panel drivers
pub mod drivers;

// Geometry and text
pub mod layout;
pub mod font;

// Lifecycle owner
pub mod renderer;

// UI components
pub mod components;

// Re-exports for convenience
pub use traits::{BoxedPanel, PanelDriver, PanelState, RefreshMode};
pub use error::DisplayError;
pub use framebuffer::{MonoFrame, BLANK, INK};
pub use factory::create_panel;
pub use layout::{centered_origin, Orientation};
pub use font::{GlyphRasterizer, MonoGlyphs};
pub use renderer::{compose_centered_text, DisplayRenderer, DEFAULT_SETTLE_TIME};
