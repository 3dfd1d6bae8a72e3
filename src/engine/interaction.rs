//! Interaction protocols: divider drag, wheel zoom/pan, and the label
//! column's synchronized sub-scroll.
//!
//! All entry points take the host's frame timestamp so idle windows are
//! measured against display-refresh time. Nothing here blocks; gesture end,
//! sub-scroll settle, and the recovery animation all advance from
//! [`ViewportEngine::tick`].

use log::debug;

use crate::space::Transform;
use crate::tasks::EasedTween;

use super::{DividerDrag, ViewportEngine};

impl ViewportEngine {
    // ===== Divider drag =====

    /// Press phase: records the drag start position and disables text
    /// selection on the container. No widths change yet.
    pub fn on_divider_press(&mut self, x_px: f64) {
        self.divider_drag = Some(DividerDrag { start_x_px: x_px });
        (self.hooks.set_text_selection)(false);
    }

    /// Move phase: redraws with provisional column widths derived from the
    /// pointer delta. Committed state is untouched, so an aborted drag costs
    /// nothing.
    pub fn on_divider_move(&mut self, x_px: f64) {
        let Some(drag) = &self.divider_drag else { return };
        let delta = (x_px - drag.start_x_px) / self.container_space.width;
        let label = (self.label_column.width + delta).clamp(0.0, 1.0);
        let timeline = (self.timeline_column.width - delta).clamp(0.0, 1.0);
        self.draw(Some((label, timeline)));
    }

    /// Release phase: commits the delta into both columns' stored fractions,
    /// restores text selection, and redraws from the new physical space.
    pub fn on_divider_release(&mut self, x_px: f64) {
        let Some(drag) = self.divider_drag.take() else { return };
        let delta = (x_px - drag.start_x_px) / self.container_space.width;
        self.label_column.width = (self.label_column.width + delta).clamp(0.0, 1.0);
        self.timeline_column.width = (self.timeline_column.width - delta).clamp(0.0, 1.0);
        (self.hooks.set_text_selection)(true);
        debug!(
            "divider committed at {:.3}/{:.3}",
            self.label_column.width, self.timeline_column.width
        );

        // The timeline's physical width follows its fraction.
        let container = self.container_space;
        self.initialize_physical_space(container.width, container.height);
        self.draw(None);
    }

    // ===== Wheel zoom & pan =====

    /// Routes a wheel event over the timeline column: zoom around the cursor
    /// when the zoom modifier is held, otherwise pan horizontally. Brackets
    /// the event in the gesture window.
    pub fn on_timeline_wheel(
        &mut self,
        delta_x: f64,
        delta_y: f64,
        cursor_x_px: f64,
        zoom_modifier: bool,
        now_ms: f64,
    ) {
        self.begin_gesture(now_ms);
        if zoom_modifier {
            let scale = 1.0 + delta_y * -0.01;
            self.zoom_about_cursor(scale, cursor_x_px);
        } else {
            let delta = delta_x / self.physical_space.width * self.view_space.width;
            self.set_trace_view(Some(self.view_space.x + delta), None);
        }
        self.draw(None);
    }

    /// Scales the view around the data position under a cursor pixel. The
    /// cursor's data coordinate stays at the same screen position, so equal
    /// and inverse scale factors round-trip the view.
    pub fn zoom_about_cursor(&mut self, scale: f64, cursor_x_px: f64) {
        let cursor_data =
            cursor_x_px / self.physical_space.width * self.view_space.width + self.view_space.x;
        let matrix = Transform::scale_about(scale, 1.0, cursor_data, 0.0);
        let next = self.view_space.transform(&matrix);
        self.set_trace_view(Some(next.x), Some(next.width));
    }

    /// Opens the gesture window, firing the start callback and disabling
    /// pointer interaction on timeline row content on the first event. Every
    /// wheel event restarts the idle deadline.
    pub(crate) fn begin_gesture(&mut self, now_ms: f64) {
        if !self.gesture_idle.is_armed() {
            debug!("gesture start");
            (self.hooks.on_gesture_start)();
            self.set_timeline_rows_interactive(false);
        }
        self.gesture_idle.restart(now_ms, self.config.gesture_idle_ms);
    }

    /// Closes the gesture window after the idle deadline fires.
    pub(crate) fn finish_gesture(&mut self) {
        debug!("gesture end");
        self.set_timeline_rows_interactive(true);
        (self.hooks.on_gesture_end)();
    }

    fn set_timeline_rows_interactive(&mut self, interactive: bool) {
        for registration in self.timeline_column.occupied() {
            if let Some(sink) = registration.sink.upgrade() {
                sink.borrow_mut().set_interactive(interactive);
            }
        }
    }

    // ===== Label sub-scroll =====

    /// Shifts the label column's horizontal offset by a wheel delta, clamped
    /// against the widest measured row. Every registered label row is
    /// repositioned immediately; the commit is debounced until input settles.
    pub fn on_label_wheel(&mut self, delta_x: f64, now_ms: f64) {
        // A fresh scroll takes over from any in-flight recovery animation.
        self.recovery = None;

        let column_px = self.container_space.width * self.label_column.width;
        let overflow = self.row_measurer.max_width() - column_px + self.config.sub_scroll_margin_px;
        let min_translate = -overflow.max(0.0);
        let next = (self.label_column.translate_x - delta_x).clamp(min_translate, 0.0);

        self.apply_sub_scroll(next);
        self.sub_scroll_settle
            .restart(now_ms, self.config.sub_scroll_settle_ms);
    }

    /// Writes a sub-scroll offset to the column and all registered label
    /// rows.
    pub(crate) fn apply_sub_scroll(&mut self, translate_x: f64) {
        self.label_column.translate_x = translate_x;
        for registration in self.label_column.occupied() {
            if let Some(sink) = registration.sink.upgrade() {
                sink.borrow_mut().set_translate_px(translate_x);
            }
        }
    }

    /// After a sub-scroll settles, checks whether the shallowest rendered
    /// node's indentation origin is hidden on either side and, if so, starts
    /// an eased scroll that brings it just inside the column.
    ///
    /// Only the non-overscan window participates: buffer rows should not
    /// drag the column toward content the user cannot see.
    pub(crate) fn check_sub_scroll_bounds(&mut self, now_ms: f64) {
        let column_px = self.container_space.width * self.label_column.width;
        let margin = self.config.sub_scroll_margin_px;
        let translate = self.label_column.translate_x;

        let mut min_depth: Option<usize> = None;
        let mut max_row_width: f64 = 0.0;
        for registration in self.label_column.occupied().filter(|r| !r.overscan) {
            let Some(node) = registration.node else { continue };
            min_depth = Some(min_depth.map_or(registration.depth, |d| d.min(registration.depth)));
            if let Some(width) = self.row_measurer.width(node) {
                max_row_width = max_row_width.max(width);
            }
        }
        let Some(depth) = min_depth else { return };

        // Everything in the window fits the column: settle back to zero.
        if max_row_width > 0.0 && max_row_width <= column_px {
            if translate < 0.0 {
                self.start_recovery(translate, 0.0, now_ms);
            }
            return;
        }

        let indent = depth as f64 * self.config.depth_indent_px;
        let on_screen = indent + translate;
        if on_screen < 0.0 {
            // Scrolled past the shallowest node's start on the left.
            let target = (margin - indent).min(0.0);
            self.start_recovery(translate, target, now_ms);
        } else if on_screen > column_px - margin {
            // Its start drifted out past the right edge.
            let target = column_px - margin - indent;
            self.start_recovery(translate, target.min(0.0), now_ms);
        }
    }

    fn start_recovery(&mut self, from: f64, to: f64, now_ms: f64) {
        debug!("sub-scroll recovery {from:.1} -> {to:.1}");
        // Last request wins: overwriting the slot cancels any in-flight run.
        self.recovery = Some(EasedTween::new(
            from,
            to,
            now_ms,
            self.config.recovery_animation_ms,
        ));
    }
}
