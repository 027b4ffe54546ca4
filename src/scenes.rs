/*
 *  scenes.rs
 *
 *  ARKeys e-ink - panel renderer
 *  (c) 2025-26 ARKeys contributors
 *
 *  One-shot panel runs: hello, seven segment, tracker, metrics
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

use chrono::Local;
use embedded_graphics::prelude::*;
use log::info;
use rand::Rng;

use crate::display::components::{
    draw_home_screen, draw_tracker, MetricsFonts, SevenSegment, SimulatedFeed, TrackerSample,
    TypingState,
};
use crate::display::error::DisplayError;
use crate::display::font::GlyphRasterizer;
use crate::display::framebuffer::{MonoFrame, WHITE_BYTE};
use crate::display::renderer::DisplayRenderer;
use crate::display::traits::{PanelDriver, RefreshMode};
use crate::shutdown::StopFlag;

const SEGMENT_ORIGIN: Point = Point::new(10, 10);
const SEGMENT_LENGTH: i32 = 40;
const SEGMENT_THICKNESS: i32 = 8;

/// Re-initialize full, blank to white and sleep
fn shutdown<D: PanelDriver>(renderer: &mut DisplayRenderer<D>) -> Result<(), DisplayError> {
    renderer.initialize(RefreshMode::Full)?;
    renderer.clear(WHITE_BYTE)?;
    renderer.power_down()
}

/// Initialize, clear, draw `message` centered, then sleep
///
/// Returns where the text was placed.
pub fn run_hello<D: PanelDriver>(
    renderer: &mut DisplayRenderer<D>,
    mode: RefreshMode,
    message: &str,
    font: &dyn GlyphRasterizer,
) -> Result<Point, DisplayError> {
    renderer.initialize(mode)?;
    renderer.clear(WHITE_BYTE)?;
    let origin = renderer.render_centered_text(message, font)?;
    info!("Displayed {:?} at ({}, {}), {:?} refresh", message, origin.x, origin.y, renderer.mode());
    renderer.power_down()?;
    Ok(origin)
}

/// Count 0 to 9 on a seven segment digit, one full refresh per digit
pub fn run_segments<D: PanelDriver>(
    renderer: &mut DisplayRenderer<D>,
    interval: Duration,
    stop: &StopFlag,
) -> Result<(), DisplayError> {
    renderer.initialize(RefreshMode::Full)?;
    renderer.clear(WHITE_BYTE)?;

    let mut frame = renderer.blank_frame();
    let mut digit = SevenSegment::new(SEGMENT_ORIGIN, SEGMENT_LENGTH, SEGMENT_THICKNESS);
    for c in '0'..='9' {
        if stop.is_requested() {
            info!("Stop requested, leaving the count at {}", c);
            break;
        }
        let Ok(changed) = digit.show_digit(c, &mut frame);
        renderer.push(&frame)?;
        info!("Displayed {} ({} segments changed)", c, changed);
        stop.wait(interval);
    }

    renderer.power_down()
}

/// Tracker layout with random data, `iterations` full refreshes
///
/// The tracker is laid out portrait, so it is drawn in the panel's native
/// orientation whatever the configured one. A stop request ends the loop
/// early and still blanks the panel before sleeping.
pub fn run_tracker<D: PanelDriver, R: Rng>(
    renderer: &mut DisplayRenderer<D>,
    rng: &mut R,
    iterations: u32,
    interval: Duration,
    stop: &StopFlag,
) -> Result<(), DisplayError> {
    renderer.initialize(RefreshMode::Full)?;
    renderer.clear(WHITE_BYTE)?;

    let native = Size::new(renderer.panel().width(), renderer.panel().height());
    for _ in 0..iterations {
        if stop.is_requested() {
            break;
        }
        let now = Local::now().format("%H:%M:%S").to_string();
        let sample = TrackerSample::random(rng, native.width, now);

        let mut frame = MonoFrame::blank(native);
        draw_tracker(&mut frame, &sample)?;
        renderer.push(&frame)?;
        info!("Iteration: WPM={}, ACC={}, TIME={}", sample.wpm, sample.accuracy_text(), sample.time);
        stop.wait(interval);
    }

    shutdown(renderer)
}

/// Home screen driven by a simulated metrics feed, partial refresh per frame
pub fn run_metrics<D: PanelDriver, R: Rng>(
    renderer: &mut DisplayRenderer<D>,
    rng: &mut R,
    frames: u32,
    interval: Duration,
    stop: &StopFlag,
) -> Result<(), DisplayError> {
    renderer.initialize(RefreshMode::Partial)?;
    renderer.clear(WHITE_BYTE)?;

    let fonts = MetricsFonts::default();
    let mut feed = SimulatedFeed::default();
    let mut state = TypingState { connected: true, ..Default::default() };
    let mut was_idle = None;

    for _ in 0..frames {
        if stop.is_requested() {
            info!("Stop requested, clearing the panel");
            break;
        }
        let now = Instant::now();
        state.update(&feed.next_sample(rng), now);

        let idle = state.is_idle_at(now);
        if was_idle.is_some_and(|w| w != idle) {
            info!("Switching to {} screen", if idle { "idle clock" } else { "typing" });
        }
        was_idle = Some(idle);

        let mut frame = renderer.blank_frame();
        draw_home_screen(&mut frame, &state, now, Local::now().time(), &fonts)?;
        renderer.push(&frame)?;
        stop.wait(interval);
    }

    shutdown(renderer)
}
