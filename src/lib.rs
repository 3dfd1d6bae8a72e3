//! Viewport and virtualization coordinate engine for very large hierarchical
//! timelines.
//!
//! A trace of nested time-interval events is rendered inside a finite
//! viewport as two parallel columns — labels on the left, interval bars on
//! the right — with only a bounded window of rows ever materialized. This
//! crate is the coordinate core of that view: it owns the three nested
//! coordinate spaces (full data extent, visible window, physical surface),
//! composes the affine transform between them, drives pan/zoom/divider/
//! sub-scroll interactions, measures row and label widths with bounded
//! caches, and resolves hierarchical paths to scroll a node into view.
//!
//! It is deliberately headless: the tree model, data fetching, and the
//! rendering surface all live behind traits in [`traits`].

pub mod cache;
pub mod config;
pub mod engine;
pub mod path_resolver;
pub mod space;
pub mod tasks;
pub mod traits;

// Export the coordinate primitives
pub use space::{Space, Transform};

// Export the engine surface
pub use engine::column::{Column, ColumnKind, Indicator, RowRegistration, RowSlot};
pub use engine::{EngineHooks, ViewportEngine};

// Export configuration and persistence
pub use config::{EngineConfig, SettingsCoordinator};

// Export external contracts
pub use traits::{GeometrySink, NodeId, NodeKind, Storage, TextMeasurer, TraceTree};

// Export measurement caches
pub use cache::{RowWidthCache, TextWidthCache};

// Export path resolution
pub use path_resolver::{resolve_and_scroll_to, PathSegment};
