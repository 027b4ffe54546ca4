/*
 *  display/renderer.rs
 *
 *  ARKeys e-ink - panel renderer
 *  (c) 2025-26 ARKeys contributors
 *
 *  Panel lifecycle: initialize, clear, render, push, settle, power down
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

use std::time::{Duration, Instant};

use embedded_graphics::prelude::*;
use log::{debug, info, warn};

use crate::display::error::DisplayError;
use crate::display::font::GlyphRasterizer;
use crate::display::framebuffer::{MonoFrame, INK};
use crate::display::layout::{centered_origin, Orientation};
use crate::display::traits::{PanelDriver, PanelState, RefreshMode};

/// Time the glass needs after a push before it is safe to cut drive
pub const DEFAULT_SETTLE_TIME: Duration = Duration::from_secs(2);

/// Owns one panel for the length of a run
///
/// The panel is put to sleep exactly once: either through `power_down` or,
/// on any other exit path, when the renderer is dropped.
pub struct DisplayRenderer<D: PanelDriver> {
    panel: D,
    orientation: Orientation,
    settle_time: Duration,
    state: PanelState,
    mode: RefreshMode,
    last_push: Option<Instant>,
}

impl<D: PanelDriver> DisplayRenderer<D> {
    pub fn new(panel: D, orientation: Orientation, settle_time: Duration) -> Self {
        Self {
            panel,
            orientation,
            settle_time,
            state: PanelState::Uninitialized,
            mode: RefreshMode::Full,
            last_push: None,
        }
    }

    pub fn state(&self) -> PanelState {
        self.state
    }

    pub fn mode(&self) -> RefreshMode {
        self.mode
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn settle_time(&self) -> Duration {
        self.settle_time
    }

    pub fn panel(&self) -> &D {
        &self.panel
    }

    /// Frame size for the configured orientation
    pub fn frame_size(&self) -> Size {
        self.orientation.frame_size(self.panel.width(), self.panel.height())
    }

    /// Fresh blank frame for the configured orientation
    pub fn blank_frame(&self) -> MonoFrame {
        MonoFrame::blank(self.frame_size())
    }

    fn require_active(&self, operation: &'static str) -> Result<(), DisplayError> {
        if self.state.is_active() {
            Ok(())
        } else {
            Err(DisplayError::InvalidState { state: self.state, operation })
        }
    }

    /// Configure the panel for a refresh mode
    pub fn initialize(&mut self, mode: RefreshMode) -> Result<(), DisplayError> {
        if self.state == PanelState::Sleeping {
            return Err(DisplayError::InvalidState { state: self.state, operation: "initialize" });
        }
        info!("Initializing {}x{} panel ({:?} refresh)", self.panel.width(), self.panel.height(), mode);
        self.panel.init(mode)?;
        self.mode = mode;
        self.state = PanelState::Initialized;
        Ok(())
    }

    /// Blank the physical panel to one byte value (0xFF is white)
    pub fn clear(&mut self, fill: u8) -> Result<(), DisplayError> {
        self.require_active("clear")?;
        debug!("Clearing panel to 0x{:02X}", fill);
        self.panel.clear(fill)?;
        self.state = PanelState::Cleared;
        Ok(())
    }

    /// Pack a prepared frame and push it with the initialized refresh mode
    pub fn push(&mut self, frame: &MonoFrame) -> Result<(), DisplayError> {
        self.require_active("display")?;
        let packed = self.panel.pack(frame)?;
        match self.mode {
            RefreshMode::Full => self.panel.display(&packed)?,
            RefreshMode::Partial => self.panel.display_partial(&packed)?,
        }
        self.state = PanelState::Displaying;
        self.last_push = Some(Instant::now());
        Ok(())
    }

    /// Draw `text` centered in a fresh frame and push it
    ///
    /// Returns the origin the text was drawn at.
    pub fn render_centered_text(
        &mut self,
        text: &str,
        font: &dyn GlyphRasterizer,
    ) -> Result<Point, DisplayError> {
        self.require_active("display")?;
        let (frame, origin) = compose_centered_text(self.frame_size(), text, font)?;
        debug!("Text {:?} at {:?} in {:?}", text, origin, self.frame_size());
        self.push(&frame)?;
        Ok(origin)
    }

    /// Block until the settle time has passed since the last push
    pub fn settle(&self) {
        if let Some(pushed) = self.last_push {
            let remaining = self.settle_time.saturating_sub(pushed.elapsed());
            if !remaining.is_zero() {
                debug!("Letting the panel settle for {:?}", remaining);
                std::thread::sleep(remaining);
            }
        }
    }

    /// Put the panel into deep sleep; terminal for this renderer
    pub fn power_down(&mut self) -> Result<(), DisplayError> {
        self.require_active("power down")?;
        self.settle();
        // marked first so a failed sleep is never retried from Drop
        self.state = PanelState::Sleeping;
        info!("Powering panel down");
        self.panel.sleep()
    }
}

impl<D: PanelDriver> Drop for DisplayRenderer<D> {
    fn drop(&mut self) {
        if self.state.is_active() {
            warn!("Panel still active at release, powering down");
            if let Err(e) = self.power_down() {
                warn!("Power down on release failed: {}", e);
            }
        }
    }
}

/// Blank frame of `size` with `text` drawn centered in ink
///
/// Pure: the same size, text and font always give the same frame.
pub fn compose_centered_text(
    size: Size,
    text: &str,
    font: &dyn GlyphRasterizer,
) -> Result<(MonoFrame, Point), DisplayError> {
    let mut frame = MonoFrame::blank(size);
    let origin = centered_origin(size, font.measure(text));
    if !text.is_empty() {
        font.draw_text(text, origin, INK, &mut frame)?;
    }
    Ok((frame, origin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::drivers::mock::{MockPanel, PanelCall};
    use crate::display::font::MonoGlyphs;

    fn renderer() -> (DisplayRenderer<MockPanel>, MockPanel) {
        let panel = MockPanel::epd2in13();
        (DisplayRenderer::new(panel.clone(), Orientation::Swapped, Duration::ZERO), panel)
    }

    #[test]
    fn test_state_machine() {
        let (mut r, _panel) = renderer();
        assert_eq!(r.state(), PanelState::Uninitialized);

        r.initialize(RefreshMode::Full).unwrap();
        assert_eq!(r.state(), PanelState::Initialized);
        r.clear(0xFF).unwrap();
        assert_eq!(r.state(), PanelState::Cleared);
        r.render_centered_text("x", &MonoGlyphs::default()).unwrap();
        assert_eq!(r.state(), PanelState::Displaying);
        r.power_down().unwrap();
        assert_eq!(r.state(), PanelState::Sleeping);

        assert!(matches!(r.initialize(RefreshMode::Full), Err(DisplayError::InvalidState { .. })));
        assert!(matches!(r.clear(0xFF), Err(DisplayError::InvalidState { .. })));
        assert!(matches!(r.power_down(), Err(DisplayError::InvalidState { .. })));
    }

    #[test]
    fn test_operations_before_init_touch_nothing() {
        let (mut r, panel) = renderer();
        assert!(matches!(r.clear(0xFF), Err(DisplayError::InvalidState { .. })));
        assert!(matches!(r.power_down(), Err(DisplayError::InvalidState { .. })));
        drop(r);
        assert!(panel.state().lock().unwrap().calls.is_empty());
    }

    #[test]
    fn test_drop_powers_down_once() {
        let (mut r, panel) = renderer();
        r.initialize(RefreshMode::Full).unwrap();
        r.render_centered_text("hi", &MonoGlyphs::default()).unwrap();
        drop(r);

        let state = panel.state();
        let state = state.lock().unwrap();
        assert_eq!(state.count(|c| *c == PanelCall::Sleep), 1);
        assert_eq!(state.calls.last(), Some(&PanelCall::Sleep));
    }

    #[test]
    fn test_failed_sleep_not_retried() {
        let (mut r, panel) = renderer();
        r.initialize(RefreshMode::Full).unwrap();
        panel.state().lock().unwrap().simulate_sleep_failure = true;

        assert!(r.power_down().is_err());
        drop(r);
        assert_eq!(panel.state().lock().unwrap().count(|c| *c == PanelCall::Sleep), 1);
    }

    #[test]
    fn test_partial_mode_pushes_partial() {
        let (mut r, panel) = renderer();
        r.initialize(RefreshMode::Partial).unwrap();
        r.push(&r.blank_frame()).unwrap();

        let state = panel.state();
        let state = state.lock().unwrap();
        assert!(matches!(state.calls.last(), Some(PanelCall::DisplayPartial(_))));
    }

    #[test]
    fn test_settle_waits_before_sleep() {
        let panel = MockPanel::epd2in13();
        let mut r = DisplayRenderer::new(panel, Orientation::Swapped, Duration::from_millis(50));
        r.initialize(RefreshMode::Full).unwrap();
        r.push(&r.blank_frame()).unwrap();

        let start = Instant::now();
        r.power_down().unwrap();
        assert!(start.elapsed() >= Duration::from_millis(40));
    }

    #[test]
    fn test_compose_is_pure() {
        let font = MonoGlyphs::default();
        let a = compose_centered_text(Size::new(250, 122), "Hello Arkkeys!", &font).unwrap();
        let b = compose_centered_text(Size::new(250, 122), "Hello Arkkeys!", &font).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.1, Point::new(76, 54));
    }

    #[test]
    fn test_wrong_frame_size_is_refused() {
        let (mut r, _panel) = renderer();
        r.initialize(RefreshMode::Full).unwrap();
        let frame = MonoFrame::blank(Size::new(10, 10));
        assert!(matches!(r.push(&frame), Err(DisplayError::FrameSizeMismatch { .. })));
        assert_eq!(r.state(), PanelState::Initialized);
    }
}
