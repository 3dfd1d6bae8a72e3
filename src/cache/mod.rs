//! Width measurement caches.
//!
//! Both caches are bounded: entries are evicted least-recently-used once the
//! configured capacity is reached, so a long session over a huge trace cannot
//! grow them without limit.

pub mod row_width_cache;
pub mod text_width_cache;

pub use row_width_cache::RowWidthCache;
pub use text_width_cache::TextWidthCache;
