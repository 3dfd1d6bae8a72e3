//! Cached pixel widths of rendered row content.
//!
//! The label column needs to know how wide each row's content is (deeply
//! indented rows overflow the column) to clamp its horizontal sub-scroll.
//! Measuring is a synchronous host call, so results are cached per node and
//! measurement requests are batched: `enqueue` collects work, and the engine
//! drains the queue on the next frame tick, coalescing rapid re-registrations
//! into a single pass.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Weak;

use crate::traits::{GeometrySink, NodeId};

struct Entry {
    width: f64,
    last_used: u64,
}

/// Bounded cache of measured row content widths, keyed by node identity.
///
/// Eviction is least-recently-used with a configurable capacity. The running
/// maximum width is deliberately monotone: evicting an entry does not lower
/// it, since the sub-scroll clamp only ever needs the widest row seen.
pub struct RowWidthCache {
    capacity: usize,
    entries: HashMap<NodeId, Entry>,
    clock: u64,
    max_width: f64,
    pending: Vec<(NodeId, Weak<RefCell<dyn GeometrySink>>)>,
    drain_scheduled: bool,
}

impl RowWidthCache {
    /// Creates a cache holding at most `capacity` measurements.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            clock: 0,
            max_width: 0.0,
            pending: Vec::new(),
            drain_scheduled: false,
        }
    }

    /// Measures a row's content width, reading from cache when possible.
    ///
    /// On a miss the sink's rendered width is read synchronously and stored.
    /// Returns `None` when the node is uncached and the sink is gone — the
    /// row left the virtualized window, so there is nothing to measure.
    pub fn measure(
        &mut self,
        node: NodeId,
        sink: &Weak<RefCell<dyn GeometrySink>>,
    ) -> Option<f64> {
        self.clock += 1;
        if let Some(entry) = self.entries.get_mut(&node) {
            entry.last_used = self.clock;
            return Some(entry.width);
        }

        let width = sink.upgrade()?.borrow().content_width();
        self.insert(node, width);
        Some(width)
    }

    /// Returns the cached width for a node without measuring.
    pub fn width(&self, node: NodeId) -> Option<f64> {
        self.entries.get(&node).map(|e| e.width)
    }

    /// Returns the widest row content seen so far.
    pub fn max_width(&self) -> f64 {
        self.max_width
    }

    /// Queues a measurement for the next drain unless already cached.
    ///
    /// Repeated enqueues before a drain coalesce into one scheduled pass.
    pub fn enqueue(&mut self, node: NodeId, sink: Weak<RefCell<dyn GeometrySink>>) {
        if self.entries.contains_key(&node) {
            return;
        }
        self.pending.push((node, sink));
        self.drain_scheduled = true;
    }

    /// Returns true when a batched drain is waiting for the next tick.
    pub fn drain_scheduled(&self) -> bool {
        self.drain_scheduled
    }

    /// Measures every queued `(node, sink)` pair. Dead sinks are skipped.
    pub fn drain(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        self.drain_scheduled = false;
        for (node, sink) in pending {
            let _ = self.measure(node, &sink);
        }
    }

    fn insert(&mut self, node: NodeId, width: f64) {
        if self.entries.len() >= self.capacity {
            self.evict_least_recent();
        }
        self.entries.insert(node, Entry { width, last_used: self.clock });
        if width > self.max_width {
            self.max_width = width;
        }
    }

    // Linear scan; capacities are small (thousands) and eviction only runs
    // once the cache is full.
    fn evict_least_recent(&mut self) {
        if let Some(&victim) = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(node, _)| node)
        {
            self.entries.remove(&victim);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct ProbeSink {
        width: f64,
        calls: Cell<u32>,
    }

    impl ProbeSink {
        fn shared(width: f64) -> Rc<RefCell<dyn GeometrySink>> {
            Rc::new(RefCell::new(ProbeSink { width, calls: Cell::new(0) }))
        }
    }

    impl GeometrySink for ProbeSink {
        fn content_width(&self) -> f64 {
            self.calls.set(self.calls.get() + 1);
            self.width
        }
    }

    #[test]
    fn test_measure_is_idempotent() {
        let mut cache = RowWidthCache::new(16);
        let sink = ProbeSink::shared(120.0);
        let weak = Rc::downgrade(&sink);

        assert_eq!(cache.measure(1, &weak), Some(120.0));
        assert_eq!(cache.measure(1, &weak), Some(120.0));
        assert_eq!(cache.width(1), Some(120.0));
    }

    #[test]
    fn test_measure_counts_one_host_read() {
        let mut cache = RowWidthCache::new(16);
        let probe = Rc::new(RefCell::new(ProbeSink { width: 80.0, calls: Cell::new(0) }));
        let sink: Rc<RefCell<dyn GeometrySink>> = probe.clone();
        let weak = Rc::downgrade(&sink);

        cache.measure(7, &weak);
        cache.measure(7, &weak);
        cache.measure(7, &weak);

        assert_eq!(probe.borrow().calls.get(), 1);
    }

    #[test]
    fn test_dead_sink_is_skipped() {
        let mut cache = RowWidthCache::new(16);
        let weak = {
            let sink = ProbeSink::shared(50.0);
            Rc::downgrade(&sink)
        };

        assert_eq!(cache.measure(1, &weak), None);
        assert_eq!(cache.width(1), None);
    }

    #[test]
    fn test_lru_eviction_at_capacity() {
        let mut cache = RowWidthCache::new(2);
        let a = ProbeSink::shared(10.0);
        let b = ProbeSink::shared(20.0);
        let c = ProbeSink::shared(30.0);

        cache.measure(1, &Rc::downgrade(&a));
        cache.measure(2, &Rc::downgrade(&b));
        // Touch node 1 so node 2 becomes the least recent.
        cache.measure(1, &Rc::downgrade(&a));
        cache.measure(3, &Rc::downgrade(&c));

        assert_eq!(cache.width(1), Some(10.0));
        assert_eq!(cache.width(2), None);
        assert_eq!(cache.width(3), Some(30.0));
    }

    #[test]
    fn test_max_width_survives_eviction() {
        let mut cache = RowWidthCache::new(1);
        let wide = ProbeSink::shared(500.0);
        let narrow = ProbeSink::shared(40.0);

        cache.measure(1, &Rc::downgrade(&wide));
        cache.measure(2, &Rc::downgrade(&narrow));

        assert_eq!(cache.width(1), None);
        assert_eq!(cache.max_width(), 500.0);
    }

    #[test]
    fn test_enqueue_and_drain() {
        let mut cache = RowWidthCache::new(16);
        let probe = Rc::new(RefCell::new(ProbeSink { width: 64.0, calls: Cell::new(0) }));
        let sink: Rc<RefCell<dyn GeometrySink>> = probe.clone();

        cache.enqueue(5, Rc::downgrade(&sink));
        cache.enqueue(5, Rc::downgrade(&sink));
        assert!(cache.drain_scheduled());

        cache.drain();
        assert!(!cache.drain_scheduled());
        assert_eq!(cache.width(5), Some(64.0));

        // Already cached: enqueue is a no-op.
        cache.enqueue(5, Rc::downgrade(&sink));
        assert!(!cache.drain_scheduled());
    }
}
