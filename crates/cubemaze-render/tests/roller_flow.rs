//! End-to-end text roller behavior: rasterizer seam, batching, and logging.
//!
//! Covers:
//! 1. Text rendered through a cached rasterizer scrolls in and settles.
//! 2. Repeated batches keep the live list bounded by canvas capacity.
//! 3. Dropped input is reported through a `warn` event, never a panic.

use std::sync::{Arc, Mutex, Once};

use cubemaze_core::error::Result;
use cubemaze_render::{
    Align, Bgra, Glyph, GlyphRasterizer, GlyphSource, RollDirection, RollerConfig, TextBitmap,
    TextCache, TextRasterizer, TextRoller,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use web_time::{Duration, Instant};

struct BarFont;

impl GlyphSource for BarFont {
    fn glyph(&self, ch: char, height: u32) -> Option<Glyph> {
        if !ch.is_ascii_graphic() {
            return None;
        }
        Some(Glyph {
            advance: 3,
            points: (0..height).map(|y| (1, y)).collect(),
        })
    }
}

/// Remembers which `string_id`s it already rendered through a wrapping cache.
struct Cached {
    cache: TextCache<GlyphRasterizer<BarFont>>,
    next_id: u64,
}

impl TextRasterizer for Cached {
    fn rasterize(&mut self, text: &str, max_width: u32, h: u32) -> Result<TextBitmap> {
        self.next_id += 1;
        self.cache
            .get_or_render(self.next_id, text, max_width, h)
            .cloned()
    }
}

fn config(direction: RollDirection) -> RollerConfig {
    RollerConfig {
        width: 60,
        height: 30,
        ms_per_row: 5,
        line_height: 10,
        direction,
        align: Align::Left,
        fade_by_height: Some(false),
        border_color: Bgra::YELLOW,
    }
}

#[test]
fn lines_scroll_in_and_settle() {
    let mut raster = Cached {
        cache: TextCache::new(GlyphRasterizer::new(BarFont, Bgra::WHITE)),
        next_id: 0,
    };
    let mut roller = TextRoller::new(config(RollDirection::Up));
    for (id, line) in ["one", "two", "three"].into_iter().enumerate() {
        assert!(roller.enqueue_text(&mut raster, line, id as u64));
    }
    assert_eq!(raster.cache.misses(), 3);

    let start = roller.paragraphs().next().map(|p| p.y);
    assert_eq!(start, Some(30));

    // three 10px lines need 30 rows at 5 ms each
    let t0 = Instant::now() + Duration::from_secs(1);
    roller.tick_at(t0);
    let ys: Vec<i32> = roller.paragraphs().map(|p| p.y).collect();
    assert_eq!(ys, vec![0, 10, 20]);
    assert!(roller.is_rolling());

    roller.tick_at(t0 + Duration::from_millis(5));
    assert!(!roller.is_rolling());
    assert_eq!(roller.group(), 1);

    // "one" is drawn as bars in column 1, 4, 7 of the first line
    let buf = roller.buffer();
    assert_eq!(buf.get_pixel(4, 5), Bgra::WHITE);
    assert_eq!(buf.get_pixel(3, 5), Bgra::BLACK);
}

#[test]
fn top_roller_batches_stay_bounded() {
    let mut roller = TextRoller::new(config(RollDirection::Down));
    let mut now = Instant::now();
    for batch in 0..20u64 {
        for line in 0..3 {
            let line_bitmap = TextBitmap::filled(20, 10, Bgra::WHITE).unwrap();
            assert!(roller.enqueue_at(now, line_bitmap, batch * 10 + line, Align::Center));
        }
        // plenty of time for the batch to finish
        for _ in 0..4 {
            now += Duration::from_millis(100);
            roller.tick_at(now);
        }
        assert!(!roller.is_rolling(), "batch {batch} still rolling");
        assert_eq!(roller.group(), batch + 1);
        assert!(roller.len() <= 3 + 3, "live {}", roller.len());
        assert!(roller.paragraphs().all(|p| p.y < 30));
    }
}

#[derive(Clone, Default)]
struct WarnCapture {
    events: Arc<Mutex<Vec<(String, String)>>>,
}

struct MessageVisitor(String);

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S> tracing_subscriber::Layer<S> for WarnCapture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        if *event.metadata().level() != tracing::Level::WARN {
            return;
        }
        let mut visitor = MessageVisitor(String::new());
        event.record(&mut visitor);
        self.events
            .lock()
            .unwrap()
            .push((event.metadata().target().to_string(), visitor.0));
    }
}

fn ensure_global_trace_level() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let subscriber =
            tracing_subscriber::registry().with(tracing_subscriber::filter::LevelFilter::TRACE);
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

#[test]
fn dropped_input_is_logged() {
    ensure_global_trace_level();
    let capture = WarnCapture::default();
    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::filter::LevelFilter::TRACE)
        .with(capture.clone());

    let mut roller = TextRoller::new(config(RollDirection::Up));
    tracing::subscriber::with_default(subscriber, || {
        tracing::callsite::rebuild_interest_cache();
        assert!(!roller.enqueue_raw(vec![1, 2, 3], 1, 1, 42, Align::Left));
        let mut raster = GlyphRasterizer::new(BarFont, Bgra::WHITE);
        assert!(!roller.enqueue_text(&mut raster, "   ", 43));
    });

    let events = capture.events.lock().unwrap().clone();
    assert_eq!(events.len(), 2, "{events:?}");
    assert!(events.iter().all(|(target, _)| target == "cubemaze.roller"));
    assert_eq!(events[0].1, "paragraph dropped");
    assert_eq!(events[1].1, "text dropped");
    assert!(roller.is_empty());
}
