#![forbid(unsafe_code)]

//! Scrolling text roller.
//!
//! A [`TextRoller`] owns an ordered queue of positioned text bitmaps
//! ("paragraphs") and slides them vertically across a fixed canvas as time
//! passes. The bottom roller ([`RollDirection::Up`]) feeds new lines in from
//! below; the top roller ([`RollDirection::Down`]) feeds them in from above.
//!
//! # State machine
//!
//! ```text
//!            enqueue
//!   Idle ─────────────▶ Rolling
//!    ▲                     │ tail fully on canvas
//!    └──── group += 1 ◀────┘ (checked on the next row tick)
//! ```
//!
//! # Invariants
//!
//! 1. Paragraphs are stored and drawn in insertion order.
//! 2. After a shift the tail never overshoots the feeding edge.
//! 3. A paragraph fully past the far edge is evicted and never drawn again.
//! 4. The group counter increments exactly once per completed batch.
//! 5. A tick shorter than one row leaves the buffer untouched.

use std::collections::VecDeque;

use cubemaze_core::error::Result;
use web_time::{Duration, Instant};

use crate::config::RollerConfig;
use crate::pixel::PixelBuffer;
use crate::text::{TextBitmap, TextRasterizer};

/// Which way paragraphs travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RollDirection {
    /// Bottom roller: enter at the bottom edge, travel upward.
    #[default]
    Up,
    /// Top roller: enter at the top edge, travel downward.
    Down,
}

/// Horizontal placement of a new paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Align {
    #[default]
    Center,
    Left,
}

/// One positioned text bitmap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub x: i32,
    pub y: i32,
    pub bitmap: TextBitmap,
    pub string_id: u64,
    /// Batch tag assigned at enqueue time.
    pub group: u64,
}

impl Paragraph {
    #[inline]
    pub fn width(&self) -> i32 {
        i32::try_from(self.bitmap.width()).unwrap_or(i32::MAX)
    }

    #[inline]
    pub fn height(&self) -> i32 {
        i32::try_from(self.bitmap.height()).unwrap_or(i32::MAX)
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height())
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width())
    }
}

/// Time-driven vertical text scroller with its own pixel buffer.
#[derive(Debug, Clone)]
pub struct TextRoller {
    config: RollerConfig,
    buffer: PixelBuffer,
    paragraphs: VecDeque<Paragraph>,
    group: u64,
    last_tick: Instant,
    rolling: bool,
}

impl TextRoller {
    pub fn new(config: RollerConfig) -> Self {
        Self {
            buffer: PixelBuffer::new(config.width, config.height),
            paragraphs: VecDeque::new(),
            group: 0,
            last_tick: Instant::now(),
            rolling: false,
            config,
        }
    }

    #[inline]
    pub fn config(&self) -> &RollerConfig {
        &self.config
    }

    #[inline]
    pub fn is_rolling(&self) -> bool {
        self.rolling
    }

    /// The active group; paragraphs enqueued now receive this tag.
    #[inline]
    pub fn group(&self) -> u64 {
        self.group
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.paragraphs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    /// Live paragraphs in stacking order.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.paragraphs.iter()
    }

    #[inline]
    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    /// Queue a bitmap behind the current tail.
    ///
    /// Returns `false`, after logging a `warn!`, when the paragraph cannot be
    /// placed: it has no area, or the queue would run past the coordinate
    /// range.
    pub fn enqueue(&mut self, bitmap: TextBitmap, string_id: u64, align: Align) -> bool {
        self.enqueue_at(Instant::now(), bitmap, string_id, align)
    }

    /// [`enqueue`](Self::enqueue) with an explicit clock reading.
    pub fn enqueue_at(
        &mut self,
        now: Instant,
        bitmap: TextBitmap,
        string_id: u64,
        align: Align,
    ) -> bool {
        let Some((x, y)) = self.placement(&bitmap, align) else {
            tracing::warn!(
                target: "cubemaze.roller",
                string_id,
                width = bitmap.width(),
                height = bitmap.height(),
                "paragraph dropped"
            );
            return false;
        };
        let (w, h) = (bitmap.width(), bitmap.height());

        tracing::debug!(
            target: "cubemaze.roller",
            string_id,
            x,
            y,
            w,
            h,
            group = self.group,
            "paragraph queued"
        );
        self.paragraphs.push_back(Paragraph {
            x,
            y,
            bitmap,
            string_id,
            group: self.group,
        });
        if !self.rolling {
            self.rolling = true;
            self.last_tick = now;
        }
        true
    }

    /// Entry position for `bitmap`, stacked behind the current tail.
    fn placement(&self, bitmap: &TextBitmap, align: Align) -> Option<(i32, i32)> {
        let w = i32::try_from(bitmap.width()).ok().filter(|&w| w > 0)?;
        let h = i32::try_from(bitmap.height()).ok().filter(|&h| h > 0)?;
        let canvas_w = i32::try_from(self.config.width).unwrap_or(i32::MAX);
        let canvas_h = i32::try_from(self.config.height).unwrap_or(i32::MAX);

        let x = match align {
            Align::Center => (canvas_w - w) / 2,
            Align::Left => 0,
        };
        let y = match (self.config.direction, self.paragraphs.back()) {
            (RollDirection::Up, Some(tail)) => tail.y.checked_add(tail.height())?,
            (RollDirection::Up, None) => canvas_h,
            (RollDirection::Down, Some(tail)) => tail.y.checked_sub(h)?,
            (RollDirection::Down, None) => -h,
        };
        // the whole paragraph must stay addressable while it travels
        y.checked_add(h)?;
        Some((x, y))
    }

    /// Queue raw BGRA bytes. Malformed input is logged and dropped.
    pub fn enqueue_raw(
        &mut self,
        pixels: Vec<u8>,
        width: u32,
        height: u32,
        string_id: u64,
        align: Align,
    ) -> bool {
        match TextBitmap::new(width, height, pixels) {
            Ok(bitmap) => self.enqueue(bitmap, string_id, align),
            Err(err) => {
                tracing::warn!(target: "cubemaze.roller", string_id, %err, "paragraph dropped");
                false
            }
        }
    }

    /// Render `text` through `rasterizer` at the configured line height and
    /// queue it with the configured alignment. Failures are logged and dropped.
    pub fn enqueue_text<R: TextRasterizer + ?Sized>(
        &mut self,
        rasterizer: &mut R,
        text: &str,
        string_id: u64,
    ) -> bool {
        match self.render_line(rasterizer, text) {
            Ok(bitmap) => self.enqueue(bitmap, string_id, self.config.align),
            Err(err) => {
                tracing::warn!(target: "cubemaze.roller", string_id, %err, "text dropped");
                false
            }
        }
    }

    fn render_line<R: TextRasterizer + ?Sized>(
        &self,
        rasterizer: &mut R,
        text: &str,
    ) -> Result<TextBitmap> {
        rasterizer.rasterize(text, self.config.width, self.config.line_height)
    }

    /// Drop every paragraph and blank the buffer.
    pub fn clear(&mut self) {
        self.paragraphs.clear();
        self.buffer.clear();
        self.rolling = false;
    }

    /// Advance the animation to the current time.
    pub fn tick(&mut self) -> &[u8] {
        self.tick_at(Instant::now())
    }

    /// Advance the animation to `now`.
    ///
    /// Only whole rows are consumed; the remainder carries into the next
    /// tick, so many short ticks move exactly as far as one long one.
    pub fn tick_at(&mut self, now: Instant) -> &[u8] {
        let ms_per_row = u64::from(self.config.ms_per_row.max(1));
        let elapsed = now.saturating_duration_since(self.last_tick).as_millis() as u64;
        let rows = elapsed / ms_per_row;
        if rows == 0 {
            return self.buffer.as_bytes();
        }
        self.last_tick += Duration::from_millis(rows * ms_per_row);
        if !self.rolling {
            return self.buffer.as_bytes();
        }

        let Some(remaining) = self.remaining_travel() else {
            self.finish_batch();
            return self.buffer.as_bytes();
        };
        if remaining <= 0 {
            self.finish_batch();
            return self.buffer.as_bytes();
        }

        // pull back any overshoot so the tail lands flush with the edge
        let delta = i32::try_from(rows).unwrap_or(i32::MAX).min(remaining);
        self.shift(delta);
        self.evict();
        self.redraw();
        self.buffer.as_bytes()
    }

    /// Rows the tail still has to travel before it is fully on canvas.
    fn remaining_travel(&self) -> Option<i32> {
        let tail = self.paragraphs.back()?;
        Some(match self.config.direction {
            RollDirection::Up => tail
                .bottom()
                .saturating_sub(i32::try_from(self.config.height).unwrap_or(i32::MAX)),
            RollDirection::Down => tail.y.saturating_neg(),
        })
    }

    fn finish_batch(&mut self) {
        self.rolling = false;
        self.group += 1;
        tracing::debug!(
            target: "cubemaze.roller",
            group = self.group,
            live = self.paragraphs.len(),
            "batch finished"
        );
    }

    fn shift(&mut self, delta: i32) {
        let step = match self.config.direction {
            RollDirection::Up => -delta,
            RollDirection::Down => delta,
        };
        for p in &mut self.paragraphs {
            p.y = p.y.saturating_add(step);
        }
    }

    fn evict(&mut self) {
        let canvas_h = i32::try_from(self.config.height).unwrap_or(i32::MAX);
        let direction = self.config.direction;
        while let Some(front) = self.paragraphs.front() {
            let gone = match direction {
                RollDirection::Up => front.bottom() <= 0,
                RollDirection::Down => front.y >= canvas_h,
            };
            if !gone {
                break;
            }
            if let Some(p) = self.paragraphs.pop_front() {
                tracing::trace!(target: "cubemaze.roller", string_id = p.string_id, "paragraph evicted");
            }
        }
    }

    fn redraw(&mut self) {
        self.buffer.clear();
        for p in &self.paragraphs {
            self.buffer.blit(&p.bitmap, p.x, p.y);
        }
        if let Some((x, y, w, h)) = self.current_block() {
            self.buffer
                .draw_rect_outline(x, y, w, h, self.config.border_color);
        }
        if self.config.fades() {
            self.buffer.fade_by_height();
        }
    }

    /// Bounding box `(x, y, w, h)` of the trailing run of paragraphs tagged
    /// with the active group.
    pub fn current_block(&self) -> Option<(i32, i32, i32, i32)> {
        let mut block = self
            .paragraphs
            .iter()
            .rev()
            .take_while(|p| p.group == self.group);
        let first = block.next()?;
        let (mut left, mut top) = (first.x, first.y);
        let (mut right, mut bottom) = (first.right(), first.bottom());
        for p in block {
            left = left.min(p.x);
            top = top.min(p.y);
            right = right.max(p.right());
            bottom = bottom.max(p.bottom());
        }
        Some((
            left,
            top,
            right.saturating_sub(left),
            bottom.saturating_sub(top),
        ))
    }
}
