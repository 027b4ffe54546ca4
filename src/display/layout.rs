/*
 *  display/layout.rs
 *
 *  ARKeys e-ink - panel renderer
 *  (c) 2025-26 ARKeys contributors
 *
 *  Orientation and text placement
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

use embedded_graphics::prelude::*;
use serde::{Deserialize, Serialize};

/// How the frame relates to the panel's native width/height
///
/// The 2.13" panel reports itself portrait (122x250) but sits landscape in
/// the enclosure, hence `Swapped` by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Frame uses the driver's width and height as reported
    Native,

    /// Frame width is the panel height and vice versa
    #[default]
    Swapped,
}

impl Orientation {
    /// Frame size for a panel reporting `width` x `height`
    pub fn frame_size(self, width: u32, height: u32) -> Size {
        match self {
            Orientation::Native => Size::new(width, height),
            Orientation::Swapped => Size::new(height, width),
        }
    }
}

/// Floor of half the leftover space; negative when `inner` is larger.
///
/// Floors toward negative infinity, so 51 pixels of overflow gives -26.
#[inline]
pub fn centered_offset(outer: u32, inner: u32) -> i32 {
    (outer as i64 - inner as i64).div_euclid(2) as i32
}

/// Top-left origin that centers a `text` box inside a `buffer`
///
/// Text bigger than the buffer gets a negative origin and is left for the
/// rasterizer to clip; it is never pulled back on screen.
pub fn centered_origin(buffer: Size, text: Size) -> Point {
    Point::new(
        centered_offset(buffer.width, text.width),
        centered_offset(buffer.height, text.height),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_frame_size() {
        assert_eq!(Orientation::Swapped.frame_size(122, 250), Size::new(250, 122));
        assert_eq!(Orientation::Native.frame_size(122, 250), Size::new(122, 250));
    }

    #[test]
    fn test_reference_origin() {
        let origin = centered_origin(Size::new(250, 122), Size::new(98, 12));
        assert_eq!(origin, Point::new(76, 55));
    }

    #[test]
    fn test_odd_leftover_floors() {
        assert_eq!(centered_offset(11, 2), 4);
        assert_eq!(centered_offset(10, 10), 0);
    }

    #[test]
    fn test_oversized_text_is_negative() {
        // (250 - 301) / 2 floored
        assert_eq!(centered_offset(250, 301), -26);
        assert_eq!(centered_origin(Size::new(250, 122), Size::new(300, 130)), Point::new(-25, -4));
    }

    #[test]
    fn test_centering_invariant() {
        for (bw, bh) in [(250u32, 122u32), (122, 250), (1, 1), (400, 240), (33, 7)] {
            for tw in 0..=bw.min(64) {
                for th in 0..=bh.min(16) {
                    let o = centered_origin(Size::new(bw, bh), Size::new(tw, th));
                    assert!(o.x >= 0 && o.x <= (bw - tw) as i32);
                    assert!(o.y >= 0 && o.y <= (bh - th) as i32);
                }
            }
        }
    }
}
