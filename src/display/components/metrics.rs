/*
 *  display/components/metrics.rs
 *
 *  ARKeys e-ink - panel renderer
 *  (c) 2025-26 ARKeys contributors
 *
 *  Typing metrics home screen: idle clock or frozen WPM and accuracy
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

use chrono::NaiveTime;
use embedded_graphics::mono_font::ascii::{FONT_10X20, FONT_6X10, FONT_9X15};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, PrimitiveStyle};
use log::debug;
use rand::Rng;

use crate::display::error::DisplayError;
use crate::display::font::{GlyphRasterizer, MonoGlyphs};
use crate::display::framebuffer::{MonoFrame, INK};
use crate::display::layout::{centered_offset, centered_origin};

/// No new word for this long switches the screen to the idle clock
pub const IDLE_THRESHOLD: Duration = Duration::from_secs(10);

/// Gap between the WPM line and the accuracy line
const SPACING: i32 = 5;
const ACC_GAP: i32 = 20;
const CLOCK_MARGIN: i32 = 15;

/// One update from the metrics feed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsSample {
    pub wpm: f32,
    pub accuracy: f32,
    pub total_words: u32,
}

/// What the home screen shows, updated sample by sample
///
/// WPM and accuracy only change when the word count goes up, so the
/// figures stay put while the typist pauses mid-word.
#[derive(Debug, Clone)]
pub struct TypingState {
    pub latest: Option<MetricsSample>,
    pub frozen_wpm: f32,
    pub frozen_accuracy: f32,
    pub last_total_words: u32,
    pub last_word_at: Option<Instant>,
    pub connected: bool,
}

impl Default for TypingState {
    fn default() -> Self {
        Self {
            latest: None,
            frozen_wpm: 0.0,
            frozen_accuracy: 100.0,
            last_total_words: 0,
            last_word_at: None,
            connected: false,
        }
    }
}

impl TypingState {
    /// Apply a sample received at `now`; true when the figures changed
    pub fn update(&mut self, sample: &MetricsSample, now: Instant) -> bool {
        self.latest = Some(*sample);
        if sample.total_words <= self.last_total_words {
            return false;
        }
        self.frozen_wpm = sample.wpm;
        self.frozen_accuracy = sample.accuracy;
        self.last_total_words = sample.total_words;
        self.last_word_at = Some(now);
        debug!("New word - WPM: {:.1}, ACC: {:.1}", self.frozen_wpm, self.frozen_accuracy);
        true
    }

    pub fn is_idle_at(&self, now: Instant) -> bool {
        match self.last_word_at {
            Some(at) => now.saturating_duration_since(at) > IDLE_THRESHOLD,
            None => true,
        }
    }

    pub fn wpm_text(&self) -> String {
        format!("{} WPM", self.frozen_wpm as i64)
    }

    pub fn accuracy_text(&self) -> String {
        format!("{}% ACC", self.frozen_accuracy as i64)
    }
}

/// Fonts used by the home screen
#[derive(Debug, Clone, Copy)]
pub struct MetricsFonts {
    pub big: MonoGlyphs,
    pub clock_small: MonoGlyphs,
    pub accuracy: MonoGlyphs,
}

impl Default for MetricsFonts {
    fn default() -> Self {
        Self {
            big: MonoGlyphs::new(&FONT_10X20),
            clock_small: MonoGlyphs::new(&FONT_6X10),
            accuracy: MonoGlyphs::new(&FONT_9X15),
        }
    }
}

fn clock_text(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Large `HH:MM` centered on the frame
pub fn draw_idle_clock(
    frame: &mut MonoFrame,
    time: NaiveTime,
    font: &dyn GlyphRasterizer,
) -> Result<Point, DisplayError> {
    let text = clock_text(time);
    let origin = centered_origin(frame.size(), font.measure(&text));
    font.draw_text(&text, origin, INK, frame)?;
    Ok(origin)
}

/// Small clock top right, WPM centered with the accuracy line below it
///
/// Returns the WPM and accuracy origins.
pub fn draw_typing_metrics(
    frame: &mut MonoFrame,
    state: &TypingState,
    time: NaiveTime,
    fonts: &MetricsFonts,
) -> Result<(Point, Point), DisplayError> {
    let (w, h) = (frame.width(), frame.height());

    let clock = clock_text(time);
    let clock_w = fonts.clock_small.measure(&clock).width as i32;
    fonts.clock_small.draw_text(&clock, Point::new(w as i32 - clock_w - CLOCK_MARGIN, 5), INK, frame)?;

    let wpm = state.wpm_text();
    let wpm_size = fonts.big.measure(&wpm);
    let wpm_h = wpm_size.height as i32;
    let wpm_y = (h as i32 - (wpm_h + SPACING + ACC_GAP)).div_euclid(2);
    let wpm_origin = Point::new(centered_offset(w, wpm_size.width), wpm_y);
    fonts.big.draw_text(&wpm, wpm_origin, INK, frame)?;

    let acc = state.accuracy_text();
    let acc_origin = Point::new(
        centered_offset(w, fonts.accuracy.measure(&acc).width),
        wpm_y + wpm_h + SPACING + ACC_GAP,
    );
    fonts.accuracy.draw_text(&acc, acc_origin, INK, frame)?;

    Ok((wpm_origin, acc_origin))
}

/// Small dot bottom left: filled when the feed is connected
pub fn draw_connection_indicator(frame: &mut MonoFrame, connected: bool) -> Result<(), DisplayError> {
    let style = if connected {
        PrimitiveStyle::with_fill(INK)
    } else {
        PrimitiveStyle::with_stroke(INK, 1)
    };
    Circle::new(Point::new(5, frame.height() as i32 - 10), 6)
        .into_styled(style)
        .draw(frame)
        .map_err(|e| DisplayError::Render(format!("{:?}", e)))
}

/// Compose the whole home screen for `now`
pub fn draw_home_screen(
    frame: &mut MonoFrame,
    state: &TypingState,
    now: Instant,
    time: NaiveTime,
    fonts: &MetricsFonts,
) -> Result<(), DisplayError> {
    if state.is_idle_at(now) {
        draw_idle_clock(frame, time, &fonts.big)?;
    } else {
        draw_typing_metrics(frame, state, time, fonts)?;
    }
    draw_connection_indicator(frame, state.connected)
}

/// Stand-in metrics feed producing plausible typing bursts and pauses
#[derive(Debug, Clone)]
pub struct SimulatedFeed {
    total_words: u32,
    wpm: f32,
    accuracy: f32,
}

impl Default for SimulatedFeed {
    fn default() -> Self {
        Self { total_words: 0, wpm: 60.0, accuracy: 97.0 }
    }
}

impl SimulatedFeed {
    /// Next sample; roughly one tick in four is a pause with no new words
    pub fn next_sample<R: Rng>(&mut self, rng: &mut R) -> MetricsSample {
        if !rng.random_ratio(1, 4) {
            self.total_words += rng.random_range(1..=3);
            self.wpm = (self.wpm + rng.random_range(-8.0..=8.0)).clamp(20.0, 140.0);
            self.accuracy = (self.accuracy + rng.random_range(-1.5..=1.5)).clamp(80.0, 100.0);
        }
        MetricsSample { wpm: self.wpm, accuracy: self.accuracy, total_words: self.total_words }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::pixelcolor::BinaryColor;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn noon() -> NaiveTime {
        NaiveTime::from_hms_opt(12, 34, 56).unwrap()
    }

    #[test]
    fn test_freeze_only_on_new_words() {
        let t0 = Instant::now();
        let mut state = TypingState::default();

        assert!(state.update(&MetricsSample { wpm: 72.9, accuracy: 98.6, total_words: 3 }, t0));
        assert_eq!(state.wpm_text(), "72 WPM");
        assert_eq!(state.accuracy_text(), "98% ACC");

        // same word count: figures stay frozen
        let later = t0 + Duration::from_secs(2);
        assert!(!state.update(&MetricsSample { wpm: 10.0, accuracy: 50.0, total_words: 3 }, later));
        assert_eq!(state.frozen_wpm, 72.9);
        assert_eq!(state.last_word_at, Some(t0));
        // the raw sample is still kept
        assert_eq!(state.latest.map(|s| s.wpm), Some(10.0));
    }

    #[test]
    fn test_idle_threshold() {
        let t0 = Instant::now();
        let mut state = TypingState::default();
        assert!(state.is_idle_at(t0));

        state.update(&MetricsSample { wpm: 50.0, accuracy: 99.0, total_words: 1 }, t0);
        assert!(!state.is_idle_at(t0 + Duration::from_secs(10)));
        assert!(state.is_idle_at(t0 + Duration::from_millis(10_001)));
    }

    #[test]
    fn test_idle_clock_centered() {
        let mut frame = MonoFrame::blank(Size::new(250, 122));
        let font = MonoGlyphs::new(&FONT_10X20);
        let origin = draw_idle_clock(&mut frame, noon(), &font).unwrap();
        // "12:34" is 50x20
        assert_eq!(origin, Point::new(100, 51));
        assert!(frame.count_ink() > 0);
    }

    #[test]
    fn test_typing_layout_positions() {
        let mut frame = MonoFrame::blank(Size::new(250, 122));
        let state = TypingState { frozen_wpm: 85.0, frozen_accuracy: 97.0, ..Default::default() };

        let (wpm, acc) = draw_typing_metrics(&mut frame, &state, noon(), &MetricsFonts::default()).unwrap();
        // "85 WPM" is 60x20, wpm_y = (122 - 45) / 2
        assert_eq!(wpm, Point::new(95, 38));
        // "97% ACC" is 63 wide in 9x15
        assert_eq!(acc, Point::new(93, 38 + 20 + 25));
        // small clock: 30 px wide ending 15 px from the right edge
        let ink = frame.ink_bounds().unwrap();
        assert!(ink.top_left.y >= 5);
        assert!(ink.bottom_right().unwrap().x <= 250 - 15);
    }

    #[test]
    fn test_connection_indicator() {
        let mut filled = MonoFrame::blank(Size::new(250, 122));
        draw_connection_indicator(&mut filled, true).unwrap();
        let mut hollow = MonoFrame::blank(Size::new(250, 122));
        draw_connection_indicator(&mut hollow, false).unwrap();

        assert!(filled.count_ink() > hollow.count_ink());
        assert_eq!(hollow.pixel(7, 114), Some(BinaryColor::Off));
        assert_eq!(filled.pixel(7, 114), Some(INK));
        let bounds = filled.ink_bounds().unwrap();
        assert_eq!(bounds.top_left, Point::new(5, 112));
    }

    #[test]
    fn test_simulated_feed_is_monotonic() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut feed = SimulatedFeed::default();
        let mut last = 0;
        for _ in 0..50 {
            let s = feed.next_sample(&mut rng);
            assert!(s.total_words >= last);
            assert!((20.0..=140.0).contains(&s.wpm));
            assert!((80.0..=100.0).contains(&s.accuracy));
            last = s.total_words;
        }
        assert!(last > 0);
    }
}
