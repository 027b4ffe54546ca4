/*
 *  display/components/tracker.rs
 *
 *  ARKeys e-ink - panel renderer
 *  (c) 2025-26 ARKeys contributors
 *
 *  Portrait tracker layout: header, WPM, accuracy, history sparkline, footer
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

use embedded_graphics::mono_font::ascii::{FONT_10X20, FONT_7X13, FONT_7X13_BOLD, FONT_9X15};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle, Rectangle};
use rand::Rng;

use crate::display::error::DisplayError;
use crate::display::font::{GlyphRasterizer, MonoGlyphs};
use crate::display::framebuffer::{MonoFrame, INK};
use crate::display::layout::centered_offset;

pub const HEADER: &str = "ARKkeys Tracker";

/// Full scale of the sparkline, in WPM
pub const HISTORY_SCALE: u32 = 120;

const WPM_BOX: (i32, i32) = (30, 100);
const ACC_BOX: (i32, i32) = (105, 135);
const HISTORY_BOX: (i32, i32) = (140, 230);
const SPARK_X0: i32 = 5;
const SPARK_Y0: i32 = 143;
const FOOTER_Y: i32 = 235;

/// One tracker screen worth of data
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerSample {
    pub wpm: u32,
    pub accuracy: f32,
    pub history: Vec<u32>,
    /// Wall clock, `HH:MM:SS`
    pub time: String,
    pub status: String,
}

impl TrackerSample {
    /// Random sample shaped like live typing data for a panel `width` wide
    pub fn random<R: Rng>(rng: &mut R, width: u32, time: String) -> Self {
        let history = (0..width.saturating_sub(6)).map(|_| rng.random_range(30..=120)).collect();
        Self {
            wpm: rng.random_range(30..=120),
            accuracy: rng.random_range(90.0..=100.0),
            history,
            time,
            status: "OK".to_string(),
        }
    }

    pub fn wpm_text(&self) -> String {
        format!("{:3}", self.wpm)
    }

    pub fn accuracy_text(&self) -> String {
        format!("{:.1}%", self.accuracy)
    }

    pub fn footer_text(&self) -> String {
        format!("{}  {}", self.time, self.status)
    }
}

/// Height of the sparkline column for one history value
pub fn spark_height(value: u32, box_height: u32) -> u32 {
    value.min(HISTORY_SCALE) * box_height / HISTORY_SCALE
}

fn draw_centered_at(
    frame: &mut MonoFrame,
    font: &dyn GlyphRasterizer,
    text: &str,
    y: i32,
) -> Result<(), DisplayError> {
    let x = centered_offset(frame.width(), font.measure(text).width);
    font.draw_text(text, Point::new(x, y), INK, frame)
}

/// Draw the tracker screen into a portrait frame
pub fn draw_tracker(frame: &mut MonoFrame, sample: &TrackerSample) -> Result<(), DisplayError> {
    let w = frame.width() as i32;
    let stroke = PrimitiveStyle::with_stroke(INK, 1);

    MonoGlyphs::new(&FONT_7X13_BOLD).draw_text(HEADER, Point::new(5, 0), INK, frame)?;

    for (top, bottom) in [WPM_BOX, ACC_BOX, HISTORY_BOX] {
        Rectangle::with_corners(Point::new(2, top), Point::new(w - 2, bottom))
            .into_styled(stroke)
            .draw(frame)
            .map_err(|e| DisplayError::Render(format!("{:?}", e)))?;
    }

    draw_centered_at(frame, &MonoGlyphs::new(&FONT_10X20), &sample.wpm_text(), WPM_BOX.0 + 5)?;
    draw_centered_at(frame, &MonoGlyphs::new(&FONT_9X15), &sample.accuracy_text(), ACC_BOX.0 + 3)?;

    let box_w = (w - 10).max(0) as usize;
    let box_h = (HISTORY_BOX.1 - SPARK_Y0) as u32;
    let base = SPARK_Y0 + box_h as i32;
    for (i, &value) in sample.history.iter().take(box_w).enumerate() {
        let x = SPARK_X0 + i as i32;
        let top = base - spark_height(value, box_h) as i32;
        Line::new(Point::new(x, base), Point::new(x, top))
            .into_styled(stroke)
            .draw(frame)
            .map_err(|e| DisplayError::Render(format!("{:?}", e)))?;
    }

    draw_centered_at(frame, &MonoGlyphs::new(&FONT_7X13), &sample.footer_text(), FOOTER_Y)
}
