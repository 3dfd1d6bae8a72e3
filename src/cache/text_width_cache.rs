//! Cached pixel widths of text labels.
//!
//! Inline bar labels are numeric durations ("1.25ms", "480ns"), so instead of
//! laying out every string the cache estimates widths by summing per-glyph
//! contributions from a small table measured once at startup: the decimal
//! point, the ten digits, and whole-token widths for the duration-unit
//! suffixes. Characters outside that alphabet contribute zero width — an
//! accepted approximation that only holds for the constrained label alphabet
//! this engine renders.

use std::collections::HashMap;

use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;

use crate::traits::TextMeasurer;

/// Duration-unit suffix tokens the estimator knows, mapped to their slot in
/// the precomputed width table.
static UNIT_SUFFIXES: Lazy<HashMap<&'static str, usize>> = Lazy::new(|| {
    ["ns", "ms", "s", "m", "h", "d"]
        .into_iter()
        .enumerate()
        .map(|(index, unit)| (unit, index))
        .collect()
});

struct Entry {
    width: f64,
    last_used: u64,
}

/// Bounded cache of estimated label widths, keyed by the label string.
///
/// Eviction is least-recently-used with a configurable capacity. The glyph
/// table is measured exactly once at construction using the host's reference
/// font; failure to obtain a measurement there is a fatal startup error.
pub struct TextWidthCache {
    digit_widths: [f64; 10],
    dot_width: f64,
    unit_widths: [f64; 6],
    capacity: usize,
    entries: HashMap<String, Entry>,
    clock: u64,
    pending: Vec<String>,
    drain_scheduled: bool,
}

impl TextWidthCache {
    /// Precomputes the glyph-width table and creates an empty cache.
    ///
    /// # Errors
    /// Fails if the host cannot measure any of the reference glyphs, which
    /// means no measurement surface is obtainable.
    pub fn new(measurer: &dyn TextMeasurer, capacity: usize) -> Result<Self> {
        let mut digit_widths = [0.0; 10];
        for (digit, slot) in digit_widths.iter_mut().enumerate() {
            *slot = probe(measurer, &digit.to_string())?;
        }
        let dot_width = probe(measurer, ".")?;

        let mut unit_widths = [0.0; 6];
        for (unit, &index) in UNIT_SUFFIXES.iter() {
            unit_widths[index] = probe(measurer, unit)?;
        }

        Ok(Self {
            digit_widths,
            dot_width,
            unit_widths,
            capacity: capacity.max(1),
            entries: HashMap::new(),
            clock: 0,
            pending: Vec::new(),
            drain_scheduled: false,
        })
    }

    /// Returns the estimated pixel width of `text`, reading from cache when
    /// possible.
    pub fn measure(&mut self, text: &str) -> f64 {
        self.clock += 1;
        if let Some(entry) = self.entries.get_mut(text) {
            entry.last_used = self.clock;
            return entry.width;
        }

        let width = self.estimate(text);
        if self.entries.len() >= self.capacity {
            self.evict_least_recent();
        }
        self.entries
            .insert(text.to_string(), Entry { width, last_used: self.clock });
        width
    }

    /// Queues a label for estimation on the next drain unless already cached.
    pub fn enqueue(&mut self, text: &str) {
        if self.entries.contains_key(text) {
            return;
        }
        self.pending.push(text.to_string());
        self.drain_scheduled = true;
    }

    /// Returns true when a batched drain is waiting for the next tick.
    pub fn drain_scheduled(&self) -> bool {
        self.drain_scheduled
    }

    /// Estimates and caches every queued label.
    pub fn drain(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        self.drain_scheduled = false;
        for text in pending {
            let _ = self.measure(&text);
        }
    }

    /// Sums per-character contributions from the glyph table.
    ///
    /// A trailing alphabetic run is treated as a duration-unit token when it
    /// matches one of the known suffixes exactly; any other unmeasured
    /// character contributes zero width.
    fn estimate(&self, text: &str) -> f64 {
        let numeric_end = text
            .rfind(|c: char| !c.is_ascii_alphabetic())
            .map(|i| i + text[i..].chars().next().map_or(1, char::len_utf8))
            .unwrap_or(0);
        let (numeric, suffix) = text.split_at(numeric_end);

        let mut width = 0.0;
        for c in numeric.chars() {
            if let Some(digit) = c.to_digit(10) {
                width += self.digit_widths[digit as usize];
            } else if c == '.' {
                width += self.dot_width;
            }
        }
        if let Some(&index) = UNIT_SUFFIXES.get(suffix) {
            width += self.unit_widths[index];
        }
        width
    }

    fn evict_least_recent(&mut self) {
        if let Some(victim) = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(text, _)| text.clone())
        {
            self.entries.remove(&victim);
        }
    }
}

fn probe(measurer: &dyn TextMeasurer, glyph: &str) -> Result<f64> {
    measurer
        .text_width(glyph)
        .ok_or_else(|| anyhow!("no measurement surface available for glyph {glyph:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Fixed-width measurer: every glyph string is 7px per character.
    struct FixedMeasurer {
        calls: Cell<u32>,
    }

    impl FixedMeasurer {
        fn new() -> Self {
            Self { calls: Cell::new(0) }
        }
    }

    impl TextMeasurer for FixedMeasurer {
        fn text_width(&self, text: &str) -> Option<f64> {
            self.calls.set(self.calls.get() + 1);
            Some(7.0 * text.chars().count() as f64)
        }
    }

    struct BrokenMeasurer;

    impl TextMeasurer for BrokenMeasurer {
        fn text_width(&self, _text: &str) -> Option<f64> {
            None
        }
    }

    #[test]
    fn test_construction_probes_once() {
        let measurer = FixedMeasurer::new();
        let _cache = TextWidthCache::new(&measurer, 64).unwrap();

        // 10 digits + dot + 6 unit tokens.
        assert_eq!(measurer.calls.get(), 17);
    }

    #[test]
    fn test_missing_measurement_surface_is_fatal() {
        assert!(TextWidthCache::new(&BrokenMeasurer, 64).is_err());
    }

    #[test]
    fn test_duration_label_estimate() {
        let measurer = FixedMeasurer::new();
        let mut cache = TextWidthCache::new(&measurer, 64).unwrap();

        // "1.25ms": three digits + dot + the two-char "ms" token.
        assert_eq!(cache.measure("1.25ms"), 3.0 * 7.0 + 7.0 + 14.0);
        // "480ns": three digits + "ns".
        assert_eq!(cache.measure("480ns"), 3.0 * 7.0 + 14.0);
        // Single-char unit.
        assert_eq!(cache.measure("3s"), 7.0 + 7.0);
    }

    #[test]
    fn test_unknown_characters_contribute_zero() {
        let measurer = FixedMeasurer::new();
        let mut cache = TextWidthCache::new(&measurer, 64).unwrap();

        // "xyz" is not a known unit token, so only digits count.
        assert_eq!(cache.measure("12xyz"), 2.0 * 7.0);
        // Punctuation outside the table is unmeasured.
        assert_eq!(cache.measure("1,2"), 2.0 * 7.0);
    }

    #[test]
    fn test_measure_is_cached() {
        let measurer = FixedMeasurer::new();
        let mut cache = TextWidthCache::new(&measurer, 64).unwrap();

        let first = cache.measure("99ms");
        let probes_after_init = measurer.calls.get();
        let second = cache.measure("99ms");

        assert_eq!(first, second);
        // No further host measurement after construction: estimates come from
        // the table, cached or not.
        assert_eq!(measurer.calls.get(), probes_after_init);
    }

    #[test]
    fn test_lru_eviction_at_capacity() {
        let measurer = FixedMeasurer::new();
        let mut cache = TextWidthCache::new(&measurer, 2).unwrap();

        cache.measure("1ms");
        cache.measure("2ms");
        cache.measure("1ms");
        cache.measure("3ms");

        assert!(cache.entries.contains_key("1ms"));
        assert!(!cache.entries.contains_key("2ms"));
        assert!(cache.entries.contains_key("3ms"));
    }

    #[test]
    fn test_enqueue_and_drain() {
        let measurer = FixedMeasurer::new();
        let mut cache = TextWidthCache::new(&measurer, 64).unwrap();

        cache.enqueue("5ms");
        assert!(cache.drain_scheduled());
        cache.drain();
        assert!(!cache.drain_scheduled());
        assert!(cache.entries.contains_key("5ms"));

        cache.enqueue("5ms");
        assert!(!cache.drain_scheduled());
    }
}
