#![forbid(unsafe_code)]

//! Text service seam: bitmaps, rasterizers, glyph composition, and caching.
//!
//! Font rasterization itself lives outside this crate. Hosts provide either
//! a whole-line [`TextRasterizer`] or a per-character [`GlyphSource`] (the
//! sparse lit-pixel form), which [`GlyphRasterizer`] turns into line bitmaps.
//! [`TextCache`] memoizes any rasterizer and is injected where it is needed.

use ahash::AHashMap;
use cubemaze_core::error::{MazeError, Result};

use crate::pixel::{Bgra, PIXEL_SIZE};

/// An owned BGRA bitmap, the unit the text roller scrolls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl TextBitmap {
    /// Wrap raw BGRA bytes, checking that the size matches the dimensions.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let len = byte_len(width, height)?;
        if pixels.len() != len {
            return Err(MazeError::BitmapSizeMismatch {
                width,
                height,
                len: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A bitmap filled with one color.
    pub fn filled(width: u32, height: u32, color: Bgra) -> Result<Self> {
        let len = byte_len(width, height)?;
        let pixels = color.to_bytes().into_iter().cycle().take(len).collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
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
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Bgra> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * PIXEL_SIZE;
        Some(Bgra::from_bytes([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]))
    }

    fn put(&mut self, x: u32, y: u32, color: Bgra) {
        if x < self.width && y < self.height {
            let i = (y as usize * self.width as usize + x as usize) * PIXEL_SIZE;
            self.pixels[i..i + PIXEL_SIZE].copy_from_slice(&color.to_bytes());
        }
    }
}

/// Byte length of a `width` x `height` bitmap.
///
/// Both sides must be nonzero and fit a signed canvas coordinate.
fn byte_len(width: u32, height: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(MazeError::EmptyBitmap);
    }
    let too_large = MazeError::BitmapTooLarge { width, height };
    if i32::try_from(width).is_err() || i32::try_from(height).is_err() {
        return Err(too_large);
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(PIXEL_SIZE))
        .ok_or(too_large)
}

/// Whole-line text rasterization service.
pub trait TextRasterizer {
    /// Render `text` no wider than `max_width` at `target_height`.
    ///
    /// Fails with [`MazeError::TextDoesNotFit`] if not even one character fits.
    fn rasterize(&mut self, text: &str, max_width: u32, target_height: u32) -> Result<TextBitmap>;
}

/// A character's lit pixels, relative to its cell's top-left corner.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Glyph {
    /// Horizontal advance in pixels.
    pub advance: u32,
    pub points: Vec<(u32, u32)>,
}

/// Per-character rasterization service.
pub trait GlyphSource {
    /// The glyph for `ch` at `height`, or `None` if the font lacks it.
    fn glyph(&self, ch: char, height: u32) -> Option<Glyph>;
}

/// Compose a single line of glyphs into a bitmap.
///
/// Characters without a glyph are skipped. Composition stops at the first
/// glyph that would overflow `max_width`.
pub fn compose_line<S: GlyphSource + ?Sized>(
    source: &S,
    text: &str,
    max_width: u32,
    target_height: u32,
    color: Bgra,
) -> Result<TextBitmap> {
    if target_height == 0 {
        return Err(MazeError::EmptyBitmap);
    }
    let mut placed: Vec<(u32, Glyph)> = Vec::new();
    let mut width = 0u32;
    for ch in text.chars() {
        let Some(glyph) = source.glyph(ch, target_height) else {
            tracing::debug!(target: "cubemaze.text", ch = ?ch, "no glyph; skipped");
            continue;
        };
        let next = width.saturating_add(glyph.advance);
        if next > max_width {
            break;
        }
        placed.push((width, glyph));
        width = next;
    }

    if width == 0 {
        return Err(MazeError::TextDoesNotFit { max_width });
    }

    let mut bitmap = TextBitmap::filled(width, target_height, Bgra::BLACK)?;
    for (x0, glyph) in &placed {
        for &(gx, gy) in &glyph.points {
            if gx < glyph.advance {
                bitmap.put(x0 + gx, gy, color);
            }
        }
    }
    Ok(bitmap)
}

/// [`TextRasterizer`] over a [`GlyphSource`].
#[derive(Debug, Clone)]
pub struct GlyphRasterizer<S> {
    source: S,
    color: Bgra,
}

impl<S: GlyphSource> GlyphRasterizer<S> {
    pub fn new(source: S, color: Bgra) -> Self {
        Self { source, color }
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: GlyphSource> TextRasterizer for GlyphRasterizer<S> {
    fn rasterize(&mut self, text: &str, max_width: u32, target_height: u32) -> Result<TextBitmap> {
        compose_line(&self.source, text, max_width, target_height, self.color)
    }
}

/// Memoizing wrapper around a [`TextRasterizer`].
///
/// Entries are keyed by `(string_id, max_width, target_height)`; callers
/// must give distinct texts distinct ids. Failures are not cached.
#[derive(Debug)]
pub struct TextCache<R> {
    inner: R,
    entries: AHashMap<(u64, u32, u32), TextBitmap>,
    hits: u64,
    misses: u64,
}

impl<R: TextRasterizer> TextCache<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            entries: AHashMap::default(),
            hits: 0,
            misses: 0,
        }
    }

    /// The cached bitmap for `string_id`, rendering `text` on a miss.
    pub fn get_or_render(
        &mut self,
        string_id: u64,
        text: &str,
        max_width: u32,
        target_height: u32,
    ) -> Result<&TextBitmap> {
        let key = (string_id, max_width, target_height);
        if self.entries.contains_key(&key) {
            self.hits += 1;
        } else {
            self.misses += 1;
            let bitmap = self.inner.rasterize(text, max_width, target_height)?;
            self.entries.insert(key, bitmap);
        }
        self.entries
            .get(&key)
            .ok_or(MazeError::TextDoesNotFit { max_width })
    }

    /// Drop every cached bitmap.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}

impl<R: TextRasterizer> TextRasterizer for TextCache<R> {
    /// Uncached passthrough: there is no string id to key on.
    fn rasterize(&mut self, text: &str, max_width: u32, target_height: u32) -> Result<TextBitmap> {
        self.inner.rasterize(text, max_width, target_height)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Every printable character is a solid block `height / 2` wide.
    pub(crate) struct BlockFont;

    impl GlyphSource for BlockFont {
        fn glyph(&self, ch: char, height: u32) -> Option<Glyph> {
            if ch.is_control() {
                return None;
            }
            let advance = (height / 2).max(1);
            let mut points = Vec::new();
            if ch != ' ' {
                for y in 0..height {
                    for x in 0..advance.saturating_sub(1) {
                        points.push((x, y));
                    }
                }
            }
            Some(Glyph { advance, points })
        }
    }

    struct Counting {
        calls: u32,
    }

    impl TextRasterizer for Counting {
        fn rasterize(&mut self, text: &str, max_width: u32, h: u32) -> Result<TextBitmap> {
            self.calls += 1;
            compose_line(&BlockFont, text, max_width, h, Bgra::WHITE)
        }
    }

    #[test]
    fn bitmap_rejects_bad_sizes() {
        assert_eq!(TextBitmap::new(0, 4, Vec::new()), Err(MazeError::EmptyBitmap));
        assert_eq!(
            TextBitmap::new(2, 2, vec![0; 15]),
            Err(MazeError::BitmapSizeMismatch {
                width: 2,
                height: 2,
                len: 15
            })
        );
        assert!(TextBitmap::new(2, 2, vec![0; 16]).is_ok());
    }

    #[test]
    fn filled_requires_a_drawable_area() {
        assert_eq!(TextBitmap::filled(0, 0, Bgra::WHITE), Err(MazeError::EmptyBitmap));
        assert_eq!(TextBitmap::filled(5, 0, Bgra::WHITE), Err(MazeError::EmptyBitmap));
        let wide = u32::MAX;
        assert_eq!(
            TextBitmap::filled(wide, 1, Bgra::WHITE),
            Err(MazeError::BitmapTooLarge { width: wide, height: 1 })
        );
        assert_eq!(
            TextBitmap::new(1, wide, Vec::new()),
            Err(MazeError::BitmapTooLarge { width: 1, height: wide })
        );

        let bmp = TextBitmap::filled(3, 2, Bgra::RED).unwrap();
        assert_eq!(bmp.pixels().len(), 3 * 2 * PIXEL_SIZE);
        assert_eq!(bmp.pixel(2, 1), Some(Bgra::RED));
    }

    #[test]
    fn compose_places_glyphs_side_by_side() {
        let bmp = compose_line(&BlockFont, "ab", 100, 8, Bgra::WHITE).unwrap();
        assert_eq!(bmp.width(), 8);
        assert_eq!(bmp.height(), 8);
        assert_eq!(bmp.pixel(0, 0), Some(Bgra::WHITE));
        // one-pixel gap at the end of each cell
        assert_eq!(bmp.pixel(3, 0), Some(Bgra::BLACK));
        assert_eq!(bmp.pixel(4, 7), Some(Bgra::WHITE));
    }

    #[test]
    fn compose_truncates_at_max_width() {
        let bmp = compose_line(&BlockFont, "abcdef", 9, 8, Bgra::WHITE).unwrap();
        assert_eq!(bmp.width(), 8);
    }

    #[test]
    fn compose_fails_when_nothing_fits() {
        assert_eq!(
            compose_line(&BlockFont, "abc", 3, 8, Bgra::WHITE),
            Err(MazeError::TextDoesNotFit { max_width: 3 })
        );
        assert!(compose_line(&BlockFont, "\n\t", 100, 8, Bgra::WHITE).is_err());
    }

    #[test]
    fn cache_renders_once_per_key() {
        let mut cache = TextCache::new(Counting { calls: 0 });
        let w1 = cache.get_or_render(7, "hello", 200, 10).unwrap().width();
        let w2 = cache.get_or_render(7, "hello", 200, 10).unwrap().width();
        assert_eq!(w1, w2);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);
        cache.get_or_render(7, "hello", 200, 12).unwrap();
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.inner.calls, 2);
    }

    #[test]
    fn cache_does_not_store_failures() {
        let mut cache = TextCache::new(Counting { calls: 0 });
        assert!(cache.get_or_render(1, "abc", 1, 10).is_err());
        assert!(cache.is_empty());
    }
}
