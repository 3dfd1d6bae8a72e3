//! Scroll-to-path resolution.
//!
//! Resolves a hierarchical path expression ("txn:checkout", "span:db.query")
//! against the external tree model, expanding or loading nodes along the way,
//! and asks the viewport engine to bring the resolved row into view.
//!
//! A segment that matches nothing is a non-fatal miss: one diagnostic is
//! emitted and the view stays put. A resolved node whose row cannot be found
//! in the flattened list means the tree and the rendered list have diverged,
//! which is escalated as an error.

use std::str::FromStr;

use anyhow::{anyhow, bail, Result};
use log::{error, warn};

use crate::engine::ViewportEngine;
use crate::traits::{NodeId, NodeKind, TraceTree};

/// One step of a path expression, `kind:identifier`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Matches a transaction node by its transaction identifier.
    Transaction(String),
    /// Matches an interval node by its interval identifier.
    Interval(String),
    /// Matches an autogroup whose boundary members or representative child
    /// carry the interval identifier.
    Autogroup(String),
}

impl PathSegment {
    fn identifier(&self) -> &str {
        match self {
            PathSegment::Transaction(id)
            | PathSegment::Interval(id)
            | PathSegment::Autogroup(id) => id,
        }
    }
}

impl FromStr for PathSegment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (kind, id) = s
            .split_once(':')
            .ok_or_else(|| anyhow!("path segment {s:?} is missing a kind prefix"))?;
        if id.is_empty() {
            bail!("path segment {s:?} has an empty identifier");
        }
        match kind {
            "txn" => Ok(PathSegment::Transaction(id.to_string())),
            "span" => Ok(PathSegment::Interval(id.to_string())),
            "ag" => Ok(PathSegment::Autogroup(id.to_string())),
            other => bail!("unknown path segment kind {other:?}"),
        }
    }
}

/// Walks `path` from the tree root, expanding and loading as needed, then
/// issues a scroll-to-row request for the terminal node and invokes
/// `on_resolved` with it.
///
/// Segments are ordered outermost-first; each one is matched among the
/// descendants of the previously matched node.
///
/// # Returns
/// `Ok(Some(node))` on success; `Ok(None)` when a segment matches nothing
/// (one `warn!` diagnostic, view unchanged).
///
/// # Errors
/// Propagates tree load failures, and fails when the terminal node has no
/// row in the flattened list — the tree and the rendered list disagree.
pub fn resolve_and_scroll_to<T: TraceTree>(
    tree: &mut T,
    engine: &mut ViewportEngine,
    path: &[PathSegment],
    on_resolved: impl FnOnce(NodeId),
) -> Result<Option<NodeId>> {
    let mut current = tree.root();
    let mut remaining = path.iter().peekable();

    while let Some(segment) = remaining.next() {
        let Some(matched) = find_descendant(tree, current, segment) else {
            warn!("path segment {segment:?} matched no node under {current}");
            return Ok(None);
        };

        if let Some(&next) = remaining.peek() {
            match tree.kind(matched) {
                // A transaction's children may not be loaded yet; pull the
                // subtree in before descending into interval-scoped segments.
                NodeKind::Transaction if !matches!(next, PathSegment::Transaction(_)) => {
                    tree.zoom_in(matched)?;
                }
                NodeKind::Autogroup if !tree.is_expanded(matched) => {
                    tree.expand(matched)?;
                }
                _ => {}
            }
        }
        current = matched;
    }

    let Some(index) = tree.row_index(current) else {
        error!("resolved node {current} has no row in the flattened list");
        bail!("flattened list and tree have diverged at node {current}");
    };
    engine.scroll_to_row(index);
    on_resolved(current);
    Ok(Some(current))
}

/// Depth-first search for the next segment's match among `node`'s
/// descendants.
fn find_descendant<T: TraceTree>(tree: &T, node: NodeId, segment: &PathSegment) -> Option<NodeId> {
    let mut stack: Vec<NodeId> = tree.children(node);
    stack.reverse();
    while let Some(candidate) = stack.pop() {
        if matches(tree, candidate, segment) {
            return Some(candidate);
        }
        let mut children = tree.children(candidate);
        children.reverse();
        stack.extend(children);
    }
    None
}

fn matches<T: TraceTree>(tree: &T, node: NodeId, segment: &PathSegment) -> bool {
    let id = segment.identifier();
    match (segment, tree.kind(node)) {
        (PathSegment::Transaction(_), NodeKind::Transaction) => {
            tree.transaction_id(node).as_deref() == Some(id)
        }
        (PathSegment::Interval(_), NodeKind::Interval) => {
            tree.interval_id(node).as_deref() == Some(id)
        }
        (PathSegment::Autogroup(_), NodeKind::Autogroup) => {
            let carries = |member: Option<NodeId>| {
                member.is_some_and(|m| tree.interval_id(m).as_deref() == Some(id))
            };
            carries(tree.autogroup_head(node))
                || carries(tree.autogroup_tail(node))
                || carries(tree.autogroup_representative(node))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_segments() {
        assert_eq!(
            "txn:checkout".parse::<PathSegment>().unwrap(),
            PathSegment::Transaction("checkout".to_string())
        );
        assert_eq!(
            "span:db.query".parse::<PathSegment>().unwrap(),
            PathSegment::Interval("db.query".to_string())
        );
        assert_eq!(
            "ag:middleware".parse::<PathSegment>().unwrap(),
            PathSegment::Autogroup("middleware".to_string())
        );
    }

    #[test]
    fn test_parse_rejects_malformed_segments() {
        assert!("checkout".parse::<PathSegment>().is_err());
        assert!("txn:".parse::<PathSegment>().is_err());
        assert!("widget:abc".parse::<PathSegment>().is_err());
    }
}
