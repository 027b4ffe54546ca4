/*
 *  tests/display_integration.rs
 *
 *  Integration tests for the renderer against the mock panel
 *
 *  ARKeys e-ink - panel renderer
 *  (c) 2025-26 ARKeys contributors
 */

use std::time::Duration;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

use arkeys_eink::display::drivers::mock::{is_all_white, MockPanel, PanelCall};
use arkeys_eink::display::{
    compose_centered_text, centered_origin, DisplayError, DisplayRenderer, GlyphRasterizer,
    MonoFrame, MonoGlyphs, Orientation, PanelDriver, PanelState, RefreshMode,
};
use arkeys_eink::scenes;

/// Rasterizer with fixed metrics that inks its whole box
struct BoxGlyphs {
    size: Size,
}

impl GlyphRasterizer for BoxGlyphs {
    fn measure(&self, text: &str) -> Size {
        if text.is_empty() { Size::zero() } else { self.size }
    }

    fn draw_text(
        &self,
        text: &str,
        origin: Point,
        color: BinaryColor,
        frame: &mut MonoFrame,
    ) -> Result<(), DisplayError> {
        let Ok(()) = Rectangle::new(origin, self.measure(text))
            .into_styled(PrimitiveStyle::with_fill(color))
            .draw(frame);
        Ok(())
    }
}

/// Rasterizer that always fails to draw
struct BrokenGlyphs;

impl GlyphRasterizer for BrokenGlyphs {
    fn measure(&self, _text: &str) -> Size {
        Size::new(10, 10)
    }

    fn draw_text(&self, _: &str, _: Point, _: BinaryColor, _: &mut MonoFrame) -> Result<(), DisplayError> {
        Err(DisplayError::Render("glyph cache unavailable".to_string()))
    }
}

fn renderer() -> (DisplayRenderer<MockPanel>, MockPanel) {
    let panel = MockPanel::epd2in13();
    (DisplayRenderer::new(panel.clone(), Orientation::Swapped, Duration::ZERO), panel)
}

#[test]
fn test_swapped_frame_of_2in13() {
    let (r, _panel) = renderer();
    assert_eq!(r.frame_size(), Size::new(250, 122));

    let native = DisplayRenderer::new(MockPanel::epd2in13(), Orientation::Native, Duration::ZERO);
    assert_eq!(native.frame_size(), Size::new(122, 250));
}

#[test]
fn test_reference_text_origin() {
    let (mut r, panel) = renderer();
    let glyphs = BoxGlyphs { size: Size::new(98, 12) };

    r.initialize(RefreshMode::Full).unwrap();
    r.clear(0xFF).unwrap();
    let origin = r.render_centered_text("Hello Arkkeys!", &glyphs).unwrap();
    assert_eq!(origin, Point::new(76, 55));

    // the inked box survives packing: frame (76,55) is native column 55, row 250-1-76
    let state = panel.state();
    let state = state.lock().unwrap();
    let screen = state.last_frame().unwrap();
    let (nx, ny) = (55usize, 249 - 76usize);
    assert_eq!(screen[nx / 8 + ny * 16] & (0x80 >> (nx % 8)), 0);
}

#[test]
fn test_centering_invariant_for_fitting_text() {
    let buffer = Size::new(250, 122);
    for (w, h) in [(1, 1), (98, 12), (97, 13), (250, 122), (249, 121), (10, 100)] {
        let text = Size::new(w, h);
        let o = centered_origin(buffer, text);
        assert!(o.x >= 0 && o.y >= 0);
        assert!(o.x as u32 + w <= buffer.width && o.y as u32 + h <= buffer.height);
        let (right, bottom) = (buffer.width - w - o.x as u32, buffer.height - h - o.y as u32);
        assert!(right.abs_diff(o.x as u32) <= 1, "x off-centre for {}x{}", w, h);
        assert!(bottom.abs_diff(o.y as u32) <= 1, "y off-centre for {}x{}", w, h);
    }
}

#[test]
fn test_oversized_text_gets_negative_origin() {
    let glyphs = BoxGlyphs { size: Size::new(301, 130) };
    let (frame, origin) = compose_centered_text(Size::new(250, 122), "wide", &glyphs).unwrap();
    assert_eq!(origin, Point::new(-26, -4));
    // clipped, never an error
    assert_eq!(frame.count_ink(), 250 * 122);
}

#[test]
fn test_compose_is_idempotent() {
    let font = MonoGlyphs::default();
    let first = compose_centered_text(Size::new(250, 122), "Hello Arkkeys!", &font).unwrap();
    let second = compose_centered_text(Size::new(250, 122), "Hello Arkkeys!", &font).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_empty_text_displays_all_white() {
    let (mut r, panel) = renderer();
    r.initialize(RefreshMode::Full).unwrap();
    r.clear(0xFF).unwrap();
    r.render_centered_text("", &MonoGlyphs::default()).unwrap();

    let state = panel.state();
    let state = state.lock().unwrap();
    let screen = state.last_frame().unwrap();
    assert_eq!(screen.len(), 4000);
    assert!(is_all_white(screen));
}

#[test]
fn test_power_down_once_after_last_display() {
    let (mut r, panel) = renderer();
    scenes::run_hello(&mut r, RefreshMode::Full, "Hello Arkkeys!", &MonoGlyphs::default()).unwrap();
    assert_eq!(r.state(), PanelState::Sleeping);
    drop(r);

    let state = panel.state();
    let state = state.lock().unwrap();
    assert_eq!(state.count(|c| *c == PanelCall::Sleep), 1);
    let sleep = state.last_index(|c| *c == PanelCall::Sleep).unwrap();
    let display = state.last_index(|c| matches!(c, PanelCall::Display(_))).unwrap();
    assert!(display < sleep);
}

#[test]
fn test_render_error_still_powers_down() {
    let (mut r, panel) = renderer();
    let err = scenes::run_hello(&mut r, RefreshMode::Full, "boom", &BrokenGlyphs).unwrap_err();
    assert!(matches!(err, DisplayError::Render(_)));
    drop(r);

    let state = panel.state();
    let state = state.lock().unwrap();
    assert_eq!(state.count(|c| matches!(c, PanelCall::Display(_))), 0);
    assert_eq!(state.count(|c| *c == PanelCall::Sleep), 1);
}

#[test]
fn test_init_failure_is_hardware_error_and_nothing_sleeps() {
    let (mut r, panel) = renderer();
    panel.state().lock().unwrap().simulate_init_failure = true;

    let err = scenes::run_hello(&mut r, RefreshMode::Full, "x", &MonoGlyphs::default()).unwrap_err();
    assert!(matches!(err, DisplayError::HardwareInit(_)));
    assert_eq!(r.state(), PanelState::Uninitialized);
    drop(r);

    assert!(panel.state().lock().unwrap().calls.is_empty());
}

#[test]
fn test_display_failure_propagates() {
    let (mut r, panel) = renderer();
    r.initialize(RefreshMode::Full).unwrap();
    panel.state().lock().unwrap().simulate_display_failure = true;

    let err = r.render_centered_text("x", &MonoGlyphs::default()).unwrap_err();
    assert!(matches!(err, DisplayError::DisplayIo(_)));
}

#[test]
fn test_boxed_panel_drives_renderer() {
    let panel = MockPanel::epd2in13();
    let boxed: Box<dyn PanelDriver> = Box::new(panel.clone());
    let mut r = DisplayRenderer::new(boxed, Orientation::Swapped, Duration::ZERO);

    scenes::run_hello(&mut r, RefreshMode::Partial, "boxed", &MonoGlyphs::default()).unwrap();
    assert_eq!(r.mode(), RefreshMode::Partial);

    let state = panel.state();
    let state = state.lock().unwrap();
    assert!(matches!(state.calls[2], PanelCall::DisplayPartial(_)));
    assert_eq!(state.calls.last(), Some(&PanelCall::Sleep));
}
