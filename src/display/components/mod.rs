/*
 *  display/components/mod.rs
 *
 *  ARKeys e-ink - panel renderer
 *  (c) 2025-26 ARKeys contributors
 *
 *  Screen components drawn into a MonoFrame
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

pub mod segments;
pub mod tracker;
pub mod metrics;

// Re-exports
pub use segments::{SegmentSet, SevenSegment};
pub use tracker::{draw_tracker, TrackerSample};
pub use metrics::{draw_home_screen, MetricsFonts, MetricsSample, SimulatedFeed, TypingState};
