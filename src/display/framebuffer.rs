/*
 *  display/framebuffer.rs
 *
 *  ARKeys e-ink - panel renderer
 *  (c) 2025-26 ARKeys contributors
 *
 *  Monochrome frame and conversion to the panel's packed bit layout
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

use core::convert::Infallible;
use std::fmt::Write as _;

use embedded_graphics::prelude::*;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::primitives::Rectangle;

use crate::display::error::DisplayError;
use crate::vframebuf::VarFrameBuf;

/// Ink colour. `BinaryColor::On` is black on the panel.
pub const INK: BinaryColor = BinaryColor::On;

/// Paper colour, what a fresh frame is filled with.
pub const BLANK: BinaryColor = BinaryColor::Off;

/// Byte value that clears a whole packed row to white
pub const WHITE_BYTE: u8 = 0xFF;

/// Monochrome frame, one per render
///
/// Drawn into with embedded-graphics, then packed once for the panel.
#[derive(Debug, Clone, PartialEq)]
pub struct MonoFrame {
    pixels: VarFrameBuf<BinaryColor>,
}

impl MonoFrame {
    /// Blank (white) frame of the given size
    pub fn blank(size: Size) -> Self {
        Self { pixels: VarFrameBuf::new(size.width, size.height, BLANK) }
    }

    pub fn width(&self) -> u32 { self.pixels.width() as u32 }
    pub fn height(&self) -> u32 { self.pixels.height() as u32 }

    /// Pixel at position, None when out of bounds
    pub fn pixel(&self, x: i32, y: i32) -> Option<BinaryColor> {
        self.pixels.get(Point::new(x, y))
    }

    /// Count of inked (black) pixels
    pub fn count_ink(&self) -> usize {
        self.pixels.as_slice().iter().filter(|&&p| p == INK).count()
    }

    /// Smallest rectangle holding every inked pixel
    pub fn ink_bounds(&self) -> Option<Rectangle> {
        let w = self.pixels.width();
        let mut min = Point::new(i32::MAX, i32::MAX);
        let mut max = Point::new(i32::MIN, i32::MIN);
        let mut any = false;

        for (i, &p) in self.pixels.as_slice().iter().enumerate() {
            if p == INK {
                let pt = Point::new((i % w) as i32, (i / w) as i32);
                min = min.component_min(pt);
                max = max.component_max(pt);
                any = true;
            }
        }
        any.then(|| Rectangle::with_corners(min, max))
    }

    /// Render as plain PBM (P1), 1 = black
    pub fn to_pbm(&self) -> String {
        let w = self.pixels.width();
        let mut out = String::with_capacity(self.pixels.as_slice().len() * 2 + 16);
        let _ = writeln!(out, "P1");
        let _ = writeln!(out, "{} {}", self.width(), self.height());
        for row in self.pixels.as_slice().chunks(w.max(1)) {
            let line: Vec<&str> = row.iter().map(|&p| if p == INK { "1" } else { "0" }).collect();
            let _ = writeln!(out, "{}", line.join(" "));
        }
        out
    }
}

impl OriginDimensions for MonoFrame {
    fn size(&self) -> Size {
        self.pixels.size()
    }
}

impl DrawTarget for MonoFrame {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.pixels.draw_iter(pixels)
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.pixels.clear(color)
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        self.pixels.fill_contiguous(area, colors)
    }
}

/// Packed length for a panel: whole bytes per row, MSB first
pub fn packed_len(panel_width: u32, panel_height: u32) -> usize {
    (panel_width as usize).div_ceil(8) * panel_height as usize
}

/// Pack a frame into the panel's native layout
///
/// The frame must be either the panel's native size or its transpose. A
/// transposed (landscape) frame is rotated into the portrait RAM layout so
/// frame (x, y) lands on native column `y`, row `panel_height - 1 - x`.
/// Bits are 1 for white and 0 for black; padding bits stay white.
pub fn pack_for_panel(
    frame: &MonoFrame,
    panel_width: u32,
    panel_height: u32,
) -> Result<Vec<u8>, DisplayError> {
    let line = (panel_width as usize).div_ceil(8);
    let mut buf = vec![WHITE_BYTE; packed_len(panel_width, panel_height)];
    let (fw, fh) = (frame.width(), frame.height());
    let pixels = frame.pixels.as_slice();

    if fw == panel_width && fh == panel_height {
        for (i, _) in pixels.iter().enumerate().filter(|(_, p)| **p == INK) {
            let (x, y) = (i % fw as usize, i / fw as usize);
            buf[x / 8 + y * line] &= !(0x80 >> (x % 8));
        }
    } else if fw == panel_height && fh == panel_width {
        for (i, _) in pixels.iter().enumerate().filter(|(_, p)| **p == INK) {
            let (x, y) = (i % fw as usize, i / fw as usize);
            let (nx, ny) = (y, panel_height as usize - x - 1);
            buf[nx / 8 + ny * line] &= !(0x80 >> (nx % 8));
        }
    } else {
        return Err(DisplayError::FrameSizeMismatch {
            frame_width: fw,
            frame_height: fh,
            panel_width,
            panel_height,
        });
    }

    Ok(buf)
}
