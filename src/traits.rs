//! External contracts consumed and exposed by the viewport engine.
//!
//! The engine never owns visual elements or trace data. It writes geometry to
//! host-owned [`GeometrySink`]s, walks the host's hierarchical model through
//! [`TraceTree`], and persists layout settings through [`Storage`]. All three
//! seams are traits so tests can drive the engine with handwritten mocks.

use crate::space::Transform;

/// Type alias for node IDs (domain identifiers from the external tree model).
pub type NodeId = u64;

/// Abstract rendered element the engine positions but never creates.
///
/// One sink exists per rendered row bar, row label, divider, or indicator.
/// The engine holds weak references to sinks; a sink that has been dropped by
/// the host (its row left the virtualized window) is skipped silently.
///
/// All methods default to no-ops so mocks and partial sinks only implement
/// what they observe.
pub trait GeometrySink {
    /// Applies a scale + translate transform to the element.
    fn set_transform(&mut self, transform: &Transform) {
        let _ = transform;
    }

    /// Sets a plain horizontal pixel translation.
    fn set_translate_px(&mut self, x: f64) {
        let _ = x;
    }

    /// Sets the element width as a fraction of its container (0..1).
    fn set_width_fraction(&mut self, fraction: f64) {
        let _ = fraction;
    }

    /// Shows or hides the element. Used when a label has no valid placement
    /// for the current frame.
    fn set_visible(&mut self, visible: bool) {
        let _ = visible;
    }

    /// Enables or disables pointer interaction on the element. Disabled for
    /// timeline row content while a zoom/pan gesture is in flight so synthetic
    /// hover/click events do not fight the gesture.
    fn set_interactive(&mut self, interactive: bool) {
        let _ = interactive;
    }

    /// Returns the rendered pixel width of the element's content.
    /// Measurement is synchronous on the host.
    fn content_width(&self) -> f64 {
        0.0
    }
}

/// Node kind discriminator for path resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A transaction node, matched by a stable transaction identifier.
    Transaction,
    /// An interval (span) node, matched by a stable interval identifier.
    Interval,
    /// A synthetic node collapsing a run of similar intervals.
    Autogroup,
}

/// Minimal contract over the external hierarchical trace model.
///
/// The engine consumes the tree only through this seam: an ordered flattened
/// list of visible nodes (for row index lookup), per-node depth for
/// indentation math, and expand/zoom operations for path resolution. Tree
/// construction, lazy loading, and network retrieval all live behind it.
pub trait TraceTree {
    /// Returns the root node.
    fn root(&self) -> NodeId;

    /// Returns the direct children of a node, in document order.
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// Returns the depth of a node (0 for the root).
    fn depth(&self, node: NodeId) -> usize;

    /// Returns the kind of a node.
    fn kind(&self, node: NodeId) -> NodeKind;

    /// Returns the stable transaction identifier, if the node carries one.
    fn transaction_id(&self, node: NodeId) -> Option<String>;

    /// Returns the stable interval identifier, if the node carries one.
    fn interval_id(&self, node: NodeId) -> Option<String>;

    /// Returns the first boundary member of an autogroup node.
    fn autogroup_head(&self, node: NodeId) -> Option<NodeId> {
        let _ = node;
        None
    }

    /// Returns the last boundary member of an autogroup node.
    fn autogroup_tail(&self, node: NodeId) -> Option<NodeId> {
        let _ = node;
        None
    }

    /// Returns the representative child of a sibling-style autogroup.
    fn autogroup_representative(&self, node: NodeId) -> Option<NodeId> {
        let _ = node;
        None
    }

    /// Returns whether a node is currently expanded.
    fn is_expanded(&self, node: NodeId) -> bool;

    /// Expands a collapsed node so its children join the flattened list.
    fn expand(&mut self, node: NodeId) -> anyhow::Result<()>;

    /// Loads the full subtree under a transaction node. May be backed by the
    /// network on the host side; the host is expected to have completed the
    /// load by the time this returns.
    fn zoom_in(&mut self, node: NodeId) -> anyhow::Result<()>;

    /// Returns the position of a node in the ordered flattened list of
    /// visible nodes, or `None` if the node is not currently listed.
    fn row_index(&self, node: NodeId) -> Option<usize>;
}

/// Abstract key/value persistence for engine settings.
///
/// Settings are stored as JSON strings; see
/// [`SettingsCoordinator`](crate::config::SettingsCoordinator).
pub trait Storage {
    /// Returns the stored string for a key, if present.
    fn get_string(&self, key: &str) -> Option<String>;

    /// Stores a string under a key.
    fn set_string(&mut self, key: &str, value: String);
}

/// Host-provided text measurement primitive.
///
/// Used once at engine startup to precompute the glyph-width table for the
/// duration-label estimator. Returning `None` means the host cannot obtain a
/// measurement surface, which is a fatal startup error.
pub trait TextMeasurer {
    /// Returns the rendered pixel width of `text` in the reference font.
    fn text_width(&self, text: &str) -> Option<f64>;
}
