#![forbid(unsafe_code)]

//! Flat BGRA pixel surface shared by the scene cache and the text roller.
//!
//! Row-major, [`PIXEL_SIZE`] bytes per pixel, stride `width * PIXEL_SIZE`
//! with no row padding. Every write is bounds-checked; writes that land off
//! the surface are discarded.

use cubemaze_core::geometry::Point3;

use crate::text::TextBitmap;

/// Bytes per pixel.
pub const PIXEL_SIZE: usize = 4;

/// One pixel in host surface byte order: blue, green, red, alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bgra {
    pub b: u8,
    pub g: u8,
    pub r: u8,
    pub a: u8,
}

impl Bgra {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const YELLOW: Self = Self::rgb(255, 255, 0);

    /// Opaque color from red, green, blue.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { b, g, r, a: 255 }
    }

    #[inline]
    pub const fn to_bytes(self) -> [u8; PIXEL_SIZE] {
        [self.b, self.g, self.r, self.a]
    }

    #[inline]
    pub const fn from_bytes(bytes: [u8; PIXEL_SIZE]) -> Self {
        Self {
            b: bytes[0],
            g: bytes[1],
            r: bytes[2],
            a: bytes[3],
        }
    }
}

/// Owned BGRA pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Create a zero-filled buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * PIXEL_SIZE],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.width as usize * PIXEL_SIZE
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Zero every byte.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Resize, clearing contents.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.data.clear();
        self.data
            .resize(width as usize * height as usize * PIXEL_SIZE, 0);
    }

    /// Byte offset of pixel `(x, y)`, or `None` if it is off the surface.
    #[inline]
    pub fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * PIXEL_SIZE)
    }

    /// Write one pixel. Returns `false` if `(x, y)` is off the surface.
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Bgra) -> bool {
        match self.offset(x, y) {
            Some(i) => {
                self.data[i..i + PIXEL_SIZE].copy_from_slice(&color.to_bytes());
                true
            }
            None => false,
        }
    }

    /// Read one pixel. Off-surface reads return black with zero alpha.
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Bgra {
        match self.offset(x, y) {
            Some(i) => Bgra::from_bytes([
                self.data[i],
                self.data[i + 1],
                self.data[i + 2],
                self.data[i + 3],
            ]),
            None => Bgra::default(),
        }
    }

    /// Write every point's `(x, y)` in `color`, ignoring `z`.
    ///
    /// Returns the number of points that landed on the surface.
    pub fn plot(&mut self, points: &[Point3], color: Bgra) -> usize {
        points
            .iter()
            .filter(|p| self.set_pixel(p.x, p.y, color))
            .count()
    }

    /// Copy `bitmap` with its top-left corner at `(x, y)`, clipped on all sides.
    pub fn blit(&mut self, bitmap: &TextBitmap, x: i32, y: i32) {
        let bw = bitmap.width() as i64;
        let bh = bitmap.height() as i64;
        let (x, y) = (x as i64, y as i64);
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + bw).min(self.width as i64);
        let y1 = (y + bh).min(self.height as i64);
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let run = (x1 - x0) as usize * PIXEL_SIZE;
        let src_stride = bitmap.width() as usize * PIXEL_SIZE;
        let dst_stride = self.stride();
        let src = bitmap.pixels();
        for row in y0..y1 {
            let src_start = (row - y) as usize * src_stride + (x0 - x) as usize * PIXEL_SIZE;
            let dst_start = row as usize * dst_stride + x0 as usize * PIXEL_SIZE;
            self.data[dst_start..dst_start + run].copy_from_slice(&src[src_start..src_start + run]);
        }
    }

    /// Draw a 1-pixel rectangle outline covering `x..x+w`, `y..y+h`, clipped.
    ///
    /// Only the on-canvas part of each side is walked.
    pub fn draw_rect_outline(&mut self, x: i32, y: i32, w: i32, h: i32, color: Bgra) {
        if w <= 0 || h <= 0 {
            return;
        }
        let (left, top) = (i64::from(x), i64::from(y));
        let right = left + i64::from(w) - 1;
        let bottom = top + i64::from(h) - 1;
        let max_x = i64::from(self.width) - 1;
        let max_y = i64::from(self.height) - 1;
        for cx in left.max(0)..=right.min(max_x) {
            self.set_pixel_wide(cx, top, color);
            self.set_pixel_wide(cx, bottom, color);
        }
        for cy in top.max(0)..=bottom.min(max_y) {
            self.set_pixel_wide(left, cy, color);
            self.set_pixel_wide(right, cy, color);
        }
    }

    fn set_pixel_wide(&mut self, x: i64, y: i64, color: Bgra) {
        if let (Ok(x), Ok(y)) = (i32::try_from(x), i32::try_from(y)) {
            self.set_pixel(x, y, color);
        }
    }

    /// Dim every row by `1 - row / height`: full brightness at the top,
    /// fading toward the bottom. Alpha is left alone.
    pub fn fade_by_height(&mut self) {
        if self.height == 0 {
            return;
        }
        let height = self.height as f32;
        let stride = self.stride();
        for (row, line) in self.data.chunks_exact_mut(stride.max(1)).enumerate() {
            let light = 1.0 - row as f32 / height;
            for px in line.chunks_exact_mut(PIXEL_SIZE) {
                for channel in &mut px[..3] {
                    *channel = (*channel as f32 * light) as u8;
                }
            }
        }
    }

    /// Count pixels whose color bytes are not all zero.
    pub fn lit_pixels(&self) -> usize {
        self.data
            .chunks_exact(PIXEL_SIZE)
            .filter(|px| px[..3].iter().any(|&c| c != 0))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_buffer_is_zeroed() {
        let buf = PixelBuffer::new(4, 3);
        assert_eq!(buf.as_bytes().len(), 4 * 3 * PIXEL_SIZE);
        assert!(buf.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn set_pixel_writes_bgra_at_row_major_offset() {
        let mut buf = PixelBuffer::new(4, 3);
        assert!(buf.set_pixel(2, 1, Bgra::rgb(10, 20, 30)));
        let i = (4 + 2) * PIXEL_SIZE;
        assert_eq!(&buf.as_bytes()[i..i + 4], &[30, 20, 10, 255]);
        assert_eq!(buf.get_pixel(2, 1), Bgra::rgb(10, 20, 30));
    }

    #[test]
    fn out_of_bounds_is_discarded() {
        let mut buf = PixelBuffer::new(4, 3);
        assert!(!buf.set_pixel(-1, 0, Bgra::WHITE));
        assert!(!buf.set_pixel(4, 0, Bgra::WHITE));
        assert!(!buf.set_pixel(0, 3, Bgra::WHITE));
        assert_eq!(buf.lit_pixels(), 0);
        assert_eq!(buf.get_pixel(100, 100), Bgra::default());
    }

    #[test]
    fn plot_counts_on_surface_points() {
        let mut buf = PixelBuffer::new(4, 4);
        let pts = [Point3::new(0, 0, 9), Point3::new(3, 3, -9), Point3::new(4, 0, 0)];
        assert_eq!(buf.plot(&pts, Bgra::WHITE), 2);
        assert_eq!(buf.lit_pixels(), 2);
    }

    #[test]
    fn blit_clips_all_edges() {
        let bitmap = TextBitmap::filled(3, 3, Bgra::WHITE).unwrap();
        for (x, y, expected) in [(0, 0, 9), (-1, -1, 4), (3, 3, 1), (-3, 0, 0), (4, 4, 0)] {
            let mut buf = PixelBuffer::new(4, 4);
            buf.blit(&bitmap, x, y);
            assert_eq!(buf.lit_pixels(), expected, "blit at ({x}, {y})");
        }
    }

    #[test]
    fn blit_copies_rows_in_order() {
        let mut pixels = Vec::new();
        for v in 1..=4u8 {
            pixels.extend_from_slice(&Bgra::rgb(v, v, v).to_bytes());
        }
        let bitmap = TextBitmap::new(2, 2, pixels).unwrap();
        let mut buf = PixelBuffer::new(3, 3);
        buf.blit(&bitmap, 1, 1);
        assert_eq!(buf.get_pixel(1, 1), Bgra::rgb(1, 1, 1));
        assert_eq!(buf.get_pixel(2, 1), Bgra::rgb(2, 2, 2));
        assert_eq!(buf.get_pixel(1, 2), Bgra::rgb(3, 3, 3));
        assert_eq!(buf.get_pixel(2, 2), Bgra::rgb(4, 4, 4));
    }

    #[test]
    fn rect_outline_is_hollow() {
        let mut buf = PixelBuffer::new(5, 5);
        buf.draw_rect_outline(0, 0, 5, 5, Bgra::WHITE);
        assert_eq!(buf.lit_pixels(), 16);
        assert_eq!(buf.get_pixel(2, 2), Bgra::default());
    }

    #[test]
    fn rect_outline_near_the_coordinate_limits() {
        let mut buf = PixelBuffer::new(5, 5);
        let far = i32::MAX - 2;
        buf.draw_rect_outline(far, far, i32::MAX, i32::MAX, Bgra::WHITE);
        assert_eq!(buf.lit_pixels(), 0);

        // only the bottom side (y = 2) crosses the canvas
        buf.draw_rect_outline(-5, -5, i32::MAX, 8, Bgra::WHITE);
        assert_eq!(buf.lit_pixels(), 5);
        assert!((0..5).all(|x| buf.get_pixel(x, 2) == Bgra::WHITE));

        buf.clear();
        buf.draw_rect_outline(i32::MIN, 1, i32::MAX, 3, Bgra::WHITE);
        assert_eq!(buf.lit_pixels(), 0);
    }

    #[test]
    fn fade_keeps_top_row_and_dims_bottom() {
        let mut buf = PixelBuffer::new(2, 4);
        for y in 0..4 {
            for x in 0..2 {
                buf.set_pixel(x, y, Bgra::rgb(200, 200, 200));
            }
        }
        buf.fade_by_height();
        assert_eq!(buf.get_pixel(0, 0), Bgra::rgb(200, 200, 200));
        assert_eq!(buf.get_pixel(0, 2), Bgra::rgb(100, 100, 100));
        assert_eq!(buf.get_pixel(0, 3), Bgra::rgb(50, 50, 50));
        assert_eq!(buf.get_pixel(0, 3).a, 255);
    }

    #[test]
    fn resize_clears() {
        let mut buf = PixelBuffer::new(2, 2);
        buf.set_pixel(0, 0, Bgra::WHITE);
        buf.resize(3, 1);
        assert_eq!(buf.as_bytes().len(), 3 * PIXEL_SIZE);
        assert_eq!(buf.lit_pixels(), 0);
    }
}
