/*
 *  vframebuf.rs
 *
 *  ARKeys e-ink - panel renderer
 *  (c) 2025-26 ARKeys contributors
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
use embedded_graphics::geometry::{OriginDimensions, Size};
use embedded_graphics::pixelcolor::PixelColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PointsIter, Rectangle};

/// A runtime-sized framebuffer for embedded-graphics.
///
/// Pixels outside the buffer are dropped, so drawing at negative or
/// oversized coordinates clips rather than wraps.
#[derive(Debug, Clone, PartialEq)]
pub struct VarFrameBuf<C: PixelColor> {
    buf: Vec<C>,
    w: usize,
    h: usize,
}

impl<C: PixelColor> VarFrameBuf<C> {
    pub fn new(width: u32, height: u32, fill: C) -> Self {
        let (w, h) = (width as usize, height as usize);
        Self { buf: vec![fill; w * h], w, h }
    }

    pub fn width(&self) -> usize { self.w }
    pub fn height(&self) -> usize { self.h }

    /// Immutable raw access, row-major
    pub fn as_slice(&self) -> &[C] { &self.buf }

    /// Clear to a color
    pub fn clear_color(&mut self, color: C) {
        self.buf.fill(color);
    }

    /// Pixel at (x,y), None when out of bounds
    pub fn get(&self, p: Point) -> Option<C> {
        self.idx(p).map(|i| self.buf[i])
    }

    /// Map (x,y) to linear index; returns None if out of bounds
    #[inline]
    fn idx(&self, p: Point) -> Option<usize> {
        if p.x >= 0 && p.y >= 0 {
            let (x, y) = (p.x as usize, p.y as usize);
            if x < self.w && y < self.h {
                return Some(y * self.w + x);
            }
        }
        None
    }
}

impl<C: PixelColor> OriginDimensions for VarFrameBuf<C> {
    fn size(&self) -> Size {
        Size::new(self.w as u32, self.h as u32)
    }
}

impl<C: PixelColor> DrawTarget for VarFrameBuf<C> {
    type Color = C;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, c) in pixels {
            if let Some(i) = self.idx(p) {
                self.buf[i] = c;
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.clear_color(color);
        Ok(())
    }

    fn fill_contiguous<I>(&mut self, area: &Rectangle, colors: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        if area.is_zero_sized() { return Ok(()); }

        // partially visible areas (text near the edges) go pixel by pixel
        if self.bounding_box().intersection(area) != *area {
            let pixels = area.points().zip(colors).map(|(p, c)| Pixel(p, c));
            return self.draw_iter(pixels);
        }

        // fast path for rectangular fills the primitives use
        let (x0, y0) = (area.top_left.x as usize, area.top_left.y as usize);
        let w = area.size.width as usize;
        let h = area.size.height as usize;

        let mut it = colors.into_iter();
        for row in 0..h {
            let base = (y0 + row) * self.w + x0;
            for col in 0..w {
                match it.next() {
                    Some(c) => self.buf[base + col] = c,
                    None => return Ok(()),
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::pixelcolor::BinaryColor;

    #[test]
    fn test_draw_outside_is_clipped() {
        let mut fb = VarFrameBuf::new(4, 4, BinaryColor::Off);
        fb.draw_iter([
            Pixel(Point::new(-1, 0), BinaryColor::On),
            Pixel(Point::new(0, 4), BinaryColor::On),
            Pixel(Point::new(3, 3), BinaryColor::On),
        ]).unwrap();

        assert_eq!(fb.as_slice().iter().filter(|p| p.is_on()).count(), 1);
        assert_eq!(fb.get(Point::new(3, 3)), Some(BinaryColor::On));
        assert_eq!(fb.get(Point::new(4, 3)), None);
    }

    #[test]
    fn test_fill_contiguous_partially_offscreen() {
        let mut fb = VarFrameBuf::new(4, 4, BinaryColor::Off);
        let area = Rectangle::new(Point::new(-2, -2), Size::new(4, 4));
        fb.fill_contiguous(&area, core::iter::repeat(BinaryColor::On)).unwrap();

        // only the 2x2 corner that overlaps the buffer is touched
        assert_eq!(fb.as_slice().iter().filter(|p| p.is_on()).count(), 4);
        assert_eq!(fb.get(Point::new(1, 1)), Some(BinaryColor::On));
        assert_eq!(fb.get(Point::new(2, 2)), Some(BinaryColor::Off));
    }

    #[test]
    fn test_fill_contiguous_inside() {
        let mut fb = VarFrameBuf::new(4, 4, BinaryColor::Off);
        let area = Rectangle::new(Point::new(1, 1), Size::new(2, 2));
        fb.fill_contiguous(&area, core::iter::repeat(BinaryColor::On)).unwrap();

        assert_eq!(fb.get(Point::new(1, 1)), Some(BinaryColor::On));
        assert_eq!(fb.get(Point::new(2, 2)), Some(BinaryColor::On));
        assert_eq!(fb.get(Point::new(3, 3)), Some(BinaryColor::Off));
    }
}
