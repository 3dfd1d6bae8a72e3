//! The viewport engine: coordinate spaces, transform composition, and the
//! redraw pass.
//!
//! Responsibilities:
//! - Owning the three nested coordinate spaces (data, view, physical) and the
//!   composed transform between them
//! - Driving the two render columns and their row/indicator registrations
//! - Dispatching frame ticks to the idle detectors and the recovery animation
//! - Pushing computed geometry to registered sinks on every redraw
//!
//! Interaction protocols (divider drag, wheel zoom/pan, label sub-scroll)
//! live in the `interaction` module; placement math lives in `draw`.

pub mod column;
mod draw;
mod interaction;

use std::cell::RefCell;
use std::rc::Weak;

use anyhow::Result;
use log::debug;

use crate::cache::{RowWidthCache, TextWidthCache};
use crate::config::EngineConfig;
use crate::space::{Space, Transform};
use crate::tasks::{Debounce, EasedTween};
use crate::traits::{GeometrySink, TextMeasurer};

use column::{Column, ColumnKind, Indicator, IndicatorSlot, RowRegistration};

/// Host callbacks fired at interaction boundaries.
///
/// All default to no-ops; hosts replace the ones they observe.
pub struct EngineHooks {
    /// Fired when a zoom/pan gesture begins.
    pub on_gesture_start: Box<dyn FnMut()>,
    /// Fired after wheel input has been idle for the gesture window.
    pub on_gesture_end: Box<dyn FnMut()>,
    /// Toggles text selection on the container during divider drags.
    pub set_text_selection: Box<dyn FnMut(bool)>,
    /// Publishes the settled label sub-scroll offset.
    pub on_sub_scroll_commit: Box<dyn FnMut(f64)>,
    /// Asks the outer virtualized list to bring a row index into view.
    pub on_scroll_to_row: Box<dyn FnMut(usize)>,
}

impl Default for EngineHooks {
    fn default() -> Self {
        Self {
            on_gesture_start: Box::new(|| {}),
            on_gesture_end: Box::new(|| {}),
            set_text_selection: Box::new(|_| {}),
            on_sub_scroll_commit: Box::new(|_| {}),
            on_scroll_to_row: Box::new(|_| {}),
        }
    }
}

/// State of an in-flight divider drag. Nothing is committed until release.
pub(crate) struct DividerDrag {
    pub(crate) start_x_px: f64,
}

/// Owner of the viewport state: spaces, transform, columns, caches, tasks.
///
/// Single-threaded by construction — every entry point runs on the host's
/// serial event/tick stream, so no internal locking exists. All suspension is
/// a [`tick`](ViewportEngine::tick) continuation on the next display-refresh
/// frame.
pub struct ViewportEngine {
    pub(crate) config: EngineConfig,
    pub(crate) hooks: EngineHooks,

    // ===== Coordinate spaces =====
    /// Full data extent along the time axis, origin always at (0, 0).
    pub(crate) trace_space: Space,
    /// Currently visible sub-rectangle of the data space, clamped inside it.
    pub(crate) view_space: Space,
    /// Rendering surface of the timeline column, in px.
    pub(crate) physical_space: Space,
    /// Overall container size, in px.
    pub(crate) container_space: Space,
    /// Absolute timestamp mapped to data-space x = 0.
    pub(crate) to_origin: f64,
    /// Composed transform; its x-scale is data units per pixel. Recomputed
    /// synchronously by every state mutation before geometry is read.
    pub(crate) span_to_px: Transform,

    // ===== Render tracks =====
    pub(crate) label_column: Column,
    pub(crate) timeline_column: Column,
    pub(crate) indicators: Vec<IndicatorSlot>,
    pub(crate) divider: Option<Weak<RefCell<dyn GeometrySink>>>,
    pub(crate) divider_drag: Option<DividerDrag>,

    // ===== Measurement caches =====
    pub(crate) row_measurer: RowWidthCache,
    pub(crate) text_measurer: TextWidthCache,

    // ===== Frame tasks =====
    pub(crate) gesture_idle: Debounce,
    pub(crate) sub_scroll_settle: Debounce,
    pub(crate) recovery: Option<EasedTween>,
}

impl ViewportEngine {
    /// Creates an engine with the given configuration.
    ///
    /// # Errors
    /// Fails when the text measurer cannot provide a measurement surface for
    /// the reference glyph table.
    pub fn new(config: EngineConfig, measurer: &dyn TextMeasurer) -> Result<Self> {
        let text_measurer = TextWidthCache::new(measurer, config.text_width_cache_capacity)?;
        Ok(Self {
            row_measurer: RowWidthCache::new(config.row_width_cache_capacity),
            text_measurer,
            hooks: EngineHooks::default(),
            trace_space: Space::sized(1.0, 1.0),
            view_space: Space::sized(1.0, 1.0),
            physical_space: Space::sized(1.0, 1.0),
            container_space: Space::sized(1.0, 1.0),
            to_origin: 0.0,
            span_to_px: Transform::identity(),
            label_column: Column::new(config.label_column_fraction),
            timeline_column: Column::new(config.timeline_column_fraction),
            indicators: Vec::new(),
            divider: None,
            divider_drag: None,
            gesture_idle: Debounce::default(),
            sub_scroll_settle: Debounce::default(),
            recovery: None,
            config,
        })
    }

    /// Replaces the engine hooks.
    pub fn set_hooks(&mut self, hooks: EngineHooks) {
        self.hooks = hooks;
    }

    // ===== Initialization =====

    /// Sets the absolute time origin and the full data extent. The view
    /// resets to show the whole trace.
    pub fn initialize_trace_space(&mut self, origin: f64, width: f64, height: f64) {
        self.to_origin = origin;
        self.trace_space = Space::sized(width, height);
        self.view_space = self.trace_space;
        self.recompute_span_to_px();
    }

    /// Sets the container size in px; the timeline column's physical width is
    /// the container width scaled by its committed fraction.
    pub fn initialize_physical_space(&mut self, width: f64, height: f64) {
        self.container_space = Space::sized(width, height);
        self.physical_space = Space::sized(width * self.timeline_column.width, height);
        self.recompute_span_to_px();
    }

    /// Container-resize notification: the only path besides divider drag by
    /// which physical space changes.
    pub fn on_container_resize(&mut self, width: f64, height: f64) {
        self.initialize_physical_space(width, height);
        self.draw(None);
    }

    // ===== View mutation =====

    /// Commits a new visible window, clamped to the data extent.
    ///
    /// Either component may be `None` to keep its current value. The clamped
    /// result always satisfies `0 <= x` and `x + width <= data width`, and
    /// the width is never zero.
    pub fn set_trace_view(&mut self, x: Option<f64>, width: Option<f64>) {
        let width = width
            .unwrap_or(self.view_space.width)
            .clamp(f64::MIN_POSITIVE, self.trace_space.width);
        let x = x
            .unwrap_or(self.view_space.x)
            .clamp(0.0, self.trace_space.width - width);
        self.view_space = Space::new(x, self.view_space.y, width, self.view_space.height);
        self.recompute_span_to_px();
    }

    /// Recomputes the composed transform from the current space triple.
    ///
    /// Called by every state-mutating operation before it returns, so a
    /// redraw never reads a transform that is stale within the same tick.
    pub(crate) fn recompute_span_to_px(&mut self) {
        let physical_to_data = self.physical_space.between(&self.trace_space);
        let data_to_view = self.trace_space.between(&self.view_space);
        self.span_to_px = physical_to_data.then(&data_to_view);
    }

    // ===== Registration surface =====

    /// Registers a row at a virtualization slot, overwriting any previous
    /// occupant. Label rows are queued for content-width measurement.
    pub fn register_row(&mut self, column: ColumnKind, index: usize, registration: RowRegistration) {
        if column == ColumnKind::Label {
            if let Some(node) = registration.node {
                self.row_measurer.enqueue(node, registration.sink.clone());
            }
        }
        if let Some((text, _)) = &registration.label {
            self.text_measurer.enqueue(text);
        }
        self.column_mut(column).set_row(index, registration);
    }

    /// Clears a row slot.
    pub fn clear_row(&mut self, column: ColumnKind, index: usize) {
        self.column_mut(column).clear_row(index);
    }

    /// Registers an overlay indicator at a slot.
    pub fn register_indicator(
        &mut self,
        index: usize,
        timestamp: f64,
        sink: Weak<RefCell<dyn GeometrySink>>,
    ) {
        if index >= self.indicators.len() {
            self.indicators.resize_with(index + 1, IndicatorSlot::default);
        }
        self.indicators[index] = IndicatorSlot::Occupied(Indicator { timestamp, sink });
    }

    /// Clears an indicator slot.
    pub fn clear_indicator(&mut self, index: usize) {
        if let Some(slot) = self.indicators.get_mut(index) {
            *slot = IndicatorSlot::Empty;
        }
    }

    /// Registers the divider element between the two columns.
    pub fn register_divider(&mut self, sink: Weak<RefCell<dyn GeometrySink>>) {
        self.divider = Some(sink);
    }

    /// Asks the outer list to bring a row into view (used by path
    /// resolution after the flattened index is known).
    pub fn scroll_to_row(&mut self, index: usize) {
        debug!("scroll-to-row request for index {index}");
        (self.hooks.on_scroll_to_row)(index);
    }

    pub(crate) fn column_mut(&mut self, kind: ColumnKind) -> &mut Column {
        match kind {
            ColumnKind::Label => &mut self.label_column,
            ColumnKind::Timeline => &mut self.timeline_column,
        }
    }

    // ===== Queries =====

    /// Returns the full data extent space.
    pub fn trace_space(&self) -> Space {
        self.trace_space
    }

    /// Returns the currently visible window.
    pub fn view_space(&self) -> Space {
        self.view_space
    }

    /// Returns the timeline rendering surface in px.
    pub fn physical_space(&self) -> Space {
        self.physical_space
    }

    /// Returns the composed transform. Its `a` component is data units per
    /// pixel.
    pub fn span_to_px(&self) -> Transform {
        self.span_to_px
    }

    /// Returns the committed width fractions `(label, timeline)`.
    pub fn column_fractions(&self) -> (f64, f64) {
        (self.label_column.width, self.timeline_column.width)
    }

    /// Returns the label column's current sub-scroll offset (always <= 0).
    pub fn sub_scroll_offset(&self) -> f64 {
        self.label_column.translate_x
    }

    // ===== Geometry =====

    /// Computes the scale + translate transform for an interval bar given its
    /// absolute `(start, duration)`.
    pub fn compute_span_transform(&self, start: f64, duration: f64) -> Transform {
        draw::span_matrix(
            start - self.to_origin,
            duration,
            &self.view_space,
            self.span_to_px.a,
            self.config.min_bar_px,
        )
    }

    /// Decides where a bar's inline label goes this frame, or `None` when it
    /// must not be rendered. The measured label width comes from the text
    /// width cache.
    pub fn compute_span_text_placement(
        &mut self,
        start: f64,
        duration: f64,
        text: &str,
    ) -> Option<f64> {
        let text_width = self.text_measurer.measure(text);
        draw::span_text_placement(
            start - self.to_origin,
            duration,
            &self.view_space,
            self.physical_space.width,
            self.span_to_px.a,
            text_width,
            self.config.label_padding_px,
        )
    }

    // ===== Redraw =====

    /// Recomputes and pushes every registered element's placement.
    ///
    /// `provisional` carries column-width overrides during a live divider
    /// drag; `None` uses the committed widths. This is the single
    /// synchronization point: call it after any state change that affects
    /// visible geometry.
    pub fn draw(&mut self, provisional: Option<(f64, f64)>) {
        self.recompute_span_to_px();

        let (label_width, timeline_width) = provisional
            .unwrap_or((self.label_column.width, self.timeline_column.width));
        let container_width = self.container_space.width;
        let view = self.view_space;
        let physical_width = self.physical_space.width;
        let data_per_px = self.span_to_px.a;
        let to_origin = self.to_origin;
        let min_bar_px = self.config.min_bar_px;
        let padding_px = self.config.label_padding_px;

        if let Some(divider) = self.divider.as_ref().and_then(Weak::upgrade) {
            divider
                .borrow_mut()
                .set_translate_px(label_width * container_width);
        }

        let sub_scroll = self.label_column.translate_x;
        for registration in self.label_column.occupied() {
            if let Some(sink) = registration.sink.upgrade() {
                let mut sink = sink.borrow_mut();
                sink.set_width_fraction(label_width);
                sink.set_translate_px(sub_scroll);
            }
        }

        // Split borrows: the text cache mutates while timeline rows iterate.
        let Self { timeline_column, text_measurer, .. } = self;
        for registration in timeline_column.occupied() {
            if let Some(sink) = registration.sink.upgrade() {
                let mut sink = sink.borrow_mut();
                sink.set_width_fraction(timeline_width);
                if let Some((start, duration)) = registration.span {
                    let matrix = draw::span_matrix(
                        start - to_origin,
                        duration,
                        &view,
                        data_per_px,
                        min_bar_px,
                    );
                    sink.set_transform(&matrix);
                }
            }

            if let (Some((text, text_sink)), Some((start, duration))) =
                (&registration.label, registration.span)
            {
                if let Some(text_sink) = text_sink.upgrade() {
                    let text_width = text_measurer.measure(text);
                    let placement = draw::span_text_placement(
                        start - to_origin,
                        duration,
                        &view,
                        physical_width,
                        data_per_px,
                        text_width,
                        padding_px,
                    );
                    let mut text_sink = text_sink.borrow_mut();
                    match placement {
                        Some(x) => {
                            text_sink.set_visible(true);
                            text_sink.set_translate_px(x);
                        }
                        None => text_sink.set_visible(false),
                    }
                }
            }
        }

        for indicator in self.indicators.iter().filter_map(IndicatorSlot::indicator) {
            if let Some(sink) = indicator.sink.upgrade() {
                let mut sink = sink.borrow_mut();
                match draw::indicator_translate(
                    indicator.timestamp - to_origin,
                    &view,
                    physical_width,
                    data_per_px,
                ) {
                    Some(x) => {
                        sink.set_visible(true);
                        sink.set_translate_px(x);
                    }
                    None => sink.set_visible(false),
                }
            }
        }
    }

    // ===== Frame tick =====

    /// Advances the engine by one display-refresh frame.
    ///
    /// Drains batched measurements, polls the gesture and sub-scroll idle
    /// detectors, and steps the recovery animation. Returns `true` while any
    /// task still needs further frames.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        if self.row_measurer.drain_scheduled() {
            self.row_measurer.drain();
        }
        if self.text_measurer.drain_scheduled() {
            self.text_measurer.drain();
        }

        if self.gesture_idle.poll(now_ms) {
            self.finish_gesture();
        }

        if self.sub_scroll_settle.poll(now_ms) {
            let offset = self.label_column.translate_x;
            debug!("sub-scroll settled at {offset:.1}px");
            (self.hooks.on_sub_scroll_commit)(offset);
            self.check_sub_scroll_bounds(now_ms);
        }

        if let Some(tween) = self.recovery {
            self.apply_sub_scroll(tween.value_at(now_ms));
            if tween.is_done(now_ms) {
                self.recovery = None;
            }
        }

        self.gesture_idle.is_armed()
            || self.sub_scroll_settle.is_armed()
            || self.recovery.is_some()
            || self.row_measurer.drain_scheduled()
            || self.text_measurer.drain_scheduled()
    }
}
