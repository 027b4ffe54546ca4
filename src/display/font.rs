/*
 *  display/font.rs
 *
 *  ARKeys e-ink - panel renderer
 *  (c) 2025-26 ARKeys contributors
 *
 *  Glyph measurement and text drawing
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

use embedded_graphics::{
    mono_font::{
        ascii::{
            FONT_4X6, FONT_5X8, FONT_6X10, FONT_6X12, FONT_6X13_BOLD, FONT_7X13,
            FONT_7X13_BOLD, FONT_8X13, FONT_8X13_BOLD, FONT_9X15, FONT_9X15_BOLD,
            FONT_9X18, FONT_9X18_BOLD, FONT_10X20,
        },
        MonoFont, MonoTextStyle,
    },
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};

use crate::display::error::DisplayError;
use crate::display::framebuffer::MonoFrame;

/// Name of the font used when nothing is configured
pub const DEFAULT_FONT: &str = "7x13";

/// Font names accepted in config and on the command line
pub const FONT_NAMES: &[&str] = &[
    "4x6", "5x8", "6x10", "6x12", "6x13_bold", "7x13", "7x13_bold", "8x13",
    "8x13_bold", "9x15", "9x15_bold", "9x18", "9x18_bold", "10x20",
];

/// Measures and draws strings for the renderer
///
/// The origin handed to `draw_text` is the top-left of the box `measure`
/// reports, so centering maths never needs to know about baselines.
pub trait GlyphRasterizer {
    /// Pixel size of the rendered bounding box of `text`
    fn measure(&self, text: &str) -> Size;

    /// Draw `text` with its box's top-left at `origin`
    fn draw_text(
        &self,
        text: &str,
        origin: Point,
        color: BinaryColor,
        frame: &mut MonoFrame,
    ) -> Result<(), DisplayError>;
}

/// Rasterizer over an embedded-graphics mono font
#[derive(Clone, Copy)]
pub struct MonoGlyphs {
    font: &'static MonoFont<'static>,
}

impl MonoGlyphs {
    pub fn new(font: &'static MonoFont<'static>) -> Self {
        Self { font }
    }

    /// Look a font up by name, e.g. "7x13" or "9x18_bold"
    pub fn by_name(name: &str) -> Result<Self, DisplayError> {
        font_by_name(name).map(Self::new)
    }

    fn text<'a>(&self, text: &'a str, origin: Point, color: BinaryColor)
        -> Text<'a, MonoTextStyle<'static, BinaryColor>>
    {
        Text::with_baseline(text, origin, MonoTextStyle::new(self.font, color), Baseline::Top)
    }
}

impl Default for MonoGlyphs {
    fn default() -> Self {
        Self::new(&FONT_7X13)
    }
}

impl std::fmt::Debug for MonoGlyphs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonoGlyphs")
            .field("character_size", &self.font.character_size)
            .finish()
    }
}

impl GlyphRasterizer for MonoGlyphs {
    fn measure(&self, text: &str) -> Size {
        if text.is_empty() {
            return Size::zero();
        }
        self.text(text, Point::zero(), BinaryColor::On).bounding_box().size
    }

    fn draw_text(
        &self,
        text: &str,
        origin: Point,
        color: BinaryColor,
        frame: &mut MonoFrame,
    ) -> Result<(), DisplayError> {
        // MonoFrame is infallible, the map_err keeps the contract honest
        self.text(text, origin, color)
            .draw(frame)
            .map_err(|e| DisplayError::Render(format!("{:?}", e)))?;
        Ok(())
    }
}

/// Resolve a font name to an embedded-graphics font
pub fn font_by_name(name: &str) -> Result<&'static MonoFont<'static>, DisplayError> {
    let font = match name.trim().to_ascii_lowercase().as_str() {
        "4x6" => &FONT_4X6,
        "5x8" => &FONT_5X8,
        "6x10" => &FONT_6X10,
        "6x12" => &FONT_6X12,
        "6x13_bold" => &FONT_6X13_BOLD,
        "7x13" | "default" => &FONT_7X13,
        "7x13_bold" => &FONT_7X13_BOLD,
        "8x13" => &FONT_8X13,
        "8x13_bold" => &FONT_8X13_BOLD,
        "9x15" => &FONT_9X15,
        "9x15_bold" => &FONT_9X15_BOLD,
        "9x18" => &FONT_9X18,
        "9x18_bold" => &FONT_9X18_BOLD,
        "10x20" => &FONT_10X20,
        other => {
            return Err(DisplayError::Render(format!(
                "unknown font '{}' (expected one of: {})",
                other,
                FONT_NAMES.join(", ")
            )));
        }
    };
    Ok(font)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::framebuffer::INK;

    #[test]
    fn test_measure_default_font() {
        let glyphs = MonoGlyphs::default();
        assert_eq!(glyphs.measure("Hello Arkkeys!"), Size::new(98, 13));
        assert_eq!(glyphs.measure(""), Size::zero());
    }

    #[test]
    fn test_every_listed_font_resolves() {
        for name in FONT_NAMES {
            assert!(font_by_name(name).is_ok(), "font {} should resolve", name);
        }
        assert!(font_by_name(" 10X20 ").is_ok());
    }

    #[test]
    fn test_unknown_font_is_render_error() {
        match MonoGlyphs::by_name("comic_sans") {
            Err(DisplayError::Render(msg)) => assert!(msg.contains("comic_sans")),
            other => panic!("expected Render error, got {:?}", other),
        }
    }

    #[test]
    fn test_draw_stays_inside_measured_box() {
        let glyphs = MonoGlyphs::default();
        let mut frame = MonoFrame::blank(Size::new(120, 40));
        let origin = Point::new(5, 7);

        glyphs.draw_text("Hello", origin, INK, &mut frame).unwrap();

        let ink = frame.ink_bounds().unwrap();
        let measured = embedded_graphics::primitives::Rectangle::new(origin, glyphs.measure("Hello"));
        assert!(frame.count_ink() > 0);
        assert_eq!(measured.intersection(&ink), ink);
    }
}
