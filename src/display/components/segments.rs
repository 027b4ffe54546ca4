/*
 *  display/components/segments.rs
 *
 *  ARKeys e-ink - panel renderer
 *  (c) 2025-26 ARKeys contributors
 *
 *  Seven segment digit with redraw of changed segments only
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

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Triangle};

use crate::display::framebuffer::{BLANK, INK};

/// Segments in a..g order, one bit each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SegmentSet(u8);

impl SegmentSet {
    pub const A: u8 = 1 << 0;
    pub const B: u8 = 1 << 1;
    pub const C: u8 = 1 << 2;
    pub const D: u8 = 1 << 3;
    pub const E: u8 = 1 << 4;
    pub const F: u8 = 1 << 5;
    pub const G: u8 = 1 << 6;

    pub const EMPTY: SegmentSet = SegmentSet(0);

    /// Lit segments for a digit character; anything else lights nothing
    pub fn for_char(c: char) -> Self {
        use SegmentSet as S;
        let bits = match c {
            '0' => S::A | S::B | S::C | S::D | S::E | S::F,
            '1' => S::B | S::C,
            '2' => S::A | S::B | S::G | S::E | S::D,
            '3' => S::A | S::B | S::G | S::C | S::D,
            '4' => S::F | S::G | S::B | S::C,
            '5' => S::A | S::F | S::G | S::C | S::D,
            '6' => S::A | S::F | S::E | S::D | S::C | S::G,
            '7' => S::A | S::B | S::C,
            '8' => S::A | S::B | S::C | S::D | S::E | S::F | S::G,
            '9' => S::A | S::B | S::C | S::D | S::F | S::G,
            _ => 0,
        };
        SegmentSet(bits)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, index: usize) -> bool {
        self.0 & (1 << index) != 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Segments in `self` but not in `other`
    pub fn difference(self, other: SegmentSet) -> SegmentSet {
        SegmentSet(self.0 & !other.0)
    }
}

/// One seven segment digit drawn with filled quads
///
/// Geometry for segment length `L` and thickness `T` at origin `o`:
/// horizontal bars a, g, d are trapezoids at `y = 0`, `L + T` and `2L + 2T`;
/// vertical bars f, b, e, c are `T` wide rectangles either side.
/// Total footprint is `L + 2T` by `2L + 3T`.
#[derive(Debug, Clone)]
pub struct SevenSegment {
    quads: [[Point; 4]; 7],
    lit: SegmentSet,
}

impl SevenSegment {
    pub fn new(origin: Point, length: i32, thickness: i32) -> Self {
        let (o, y, l, t) = (origin.x, origin.y, length, thickness);
        let p = Point::new;
        let quads = [
            // a
            [p(o + t, y), p(o + t + l, y), p(o + l, y + t), p(o + 2 * t, y + t)],
            // b
            [p(o + l + t, y + t), p(o + l + 2 * t, y + t), p(o + l + 2 * t, y + t + l), p(o + l + t, y + t + l)],
            // c
            [
                p(o + l + t, y + l + 2 * t),
                p(o + l + 2 * t, y + l + 2 * t),
                p(o + l + 2 * t, y + 2 * l + 2 * t),
                p(o + l + t, y + 2 * l + 2 * t),
            ],
            // d
            [
                p(o + t, y + 2 * l + 2 * t),
                p(o + t + l, y + 2 * l + 2 * t),
                p(o + l, y + 2 * l + 3 * t),
                p(o + 2 * t, y + 2 * l + 3 * t),
            ],
            // e
            [p(o, y + l + 2 * t), p(o + t, y + l + 2 * t), p(o + t, y + 2 * l + 2 * t), p(o, y + 2 * l + 2 * t)],
            // f
            [p(o, y + t), p(o + t, y + t), p(o + t, y + t + l), p(o, y + t + l)],
            // g
            [p(o + t, y + l + t), p(o + t + l, y + l + t), p(o + l, y + l + 2 * t), p(o + 2 * t, y + l + 2 * t)],
        ];
        Self { quads, lit: SegmentSet::EMPTY }
    }

    /// Currently lit segments
    pub fn lit(&self) -> SegmentSet {
        self.lit
    }

    /// Corners of segment `index` (0 = a .. 6 = g)
    pub fn quad(&self, index: usize) -> Option<&[Point; 4]> {
        self.quads.get(index)
    }

    fn fill_quad<D>(&self, index: usize, color: BinaryColor, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let [p0, p1, p2, p3] = self.quads[index];
        let style = PrimitiveStyle::with_fill(color);
        Triangle::new(p0, p1, p2).into_styled(style).draw(target)?;
        Triangle::new(p0, p2, p3).into_styled(style).draw(target)
    }

    /// Show `digit`, touching only segments whose state changes
    ///
    /// Segments turning off are painted blank first, then segments turning
    /// on are inked. Returns how many segments were repainted.
    pub fn show_digit<D>(&mut self, digit: char, target: &mut D) -> Result<usize, D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let wanted = SegmentSet::for_char(digit);
        let off = self.lit.difference(wanted);
        let on = wanted.difference(self.lit);

        for i in (0..7).filter(|&i| off.contains(i)) {
            self.fill_quad(i, BLANK, target)?;
        }
        for i in (0..7).filter(|&i| on.contains(i)) {
            self.fill_quad(i, INK, target)?;
        }
        self.lit = wanted;
        Ok(off.len() + on.len())
    }
}
