//! Recalculation order and circular dependency detection.
//!
//! When a cell changes, it and everything that (transitively) depends on it
//! must be re-evaluated, each cell only after all of the cells it reads.
//! This module walks the dependents of the changed cells depth-first and
//! emits them in reverse post-order. Reaching a cell that is still on the
//! active path means the edit closed a loop, and the whole computation is
//! abandoned.

use log::debug;
use std::collections::HashSet;
use thiserror::Error;

use super::DependencyGraph;

/// A dependency cycle reachable from the recalculated cells.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("circular dependency through '{cell}'")]
pub struct CycleError {
    /// A cell on the cycle.
    pub cell: String,
}

/// Compute the order in which `roots` and all their transitive dependents
/// must be recalculated.
///
/// Each root appears before its dependents, and every cell appears after
/// every cell it depends on within the returned list.
pub fn recalculation_order<I, S>(graph: &DependencyGraph, roots: I) -> Result<Vec<String>, CycleError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut visited = HashSet::new();
    let mut path = HashSet::new();
    let mut order = Vec::new();

    for root in roots {
        let root = root.as_ref();
        if !visited.contains(root) {
            visit(root, graph, &mut visited, &mut path, &mut order)?;
        }
    }

    order.reverse();
    debug!("recalculation order: {:?}", order);
    Ok(order)
}

/// A cell on the active path and the dependents still to be walked from it.
struct Frame<'g> {
    cell: String,
    pending: std::vec::IntoIter<&'g str>,
}

impl<'g> Frame<'g> {
    fn enter(
        cell: &str,
        graph: &'g DependencyGraph,
        visited: &mut HashSet<String>,
        path: &mut HashSet<String>,
    ) -> Self {
        visited.insert(cell.to_string());
        path.insert(cell.to_string());
        let pending: Vec<&'g str> = graph.dependents(cell).collect();
        Frame {
            cell: cell.to_string(),
            pending: pending.into_iter(),
        }
    }
}

/// Depth-first walk from `root`, pushing cells in post-order. The active
/// path lives on an explicit frame stack, so chain length is not bounded by
/// the thread stack.
fn visit<'g>(
    root: &str,
    graph: &'g DependencyGraph,
    visited: &mut HashSet<String>,
    path: &mut HashSet<String>,
    order: &mut Vec<String>,
) -> Result<(), CycleError> {
    let mut stack = vec![Frame::enter(root, graph, visited, path)];

    while let Some(frame) = stack.last_mut() {
        match frame.pending.next() {
            Some(dependent) => {
                if path.contains(dependent) {
                    return Err(CycleError {
                        cell: dependent.to_string(),
                    });
                }
                if !visited.contains(dependent) {
                    let next = Frame::enter(dependent, graph, visited, path);
                    stack.push(next);
                }
            }
            None => {
                if let Some(done) = stack.pop() {
                    path.remove(&done.cell);
                    order.push(done.cell);
                }
            }
        }
    }
    Ok(())
}
