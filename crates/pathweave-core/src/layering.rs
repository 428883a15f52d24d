//! Cycle-tolerant layer assignment for hierarchical layout.
//!
//! A Kahn-style longest-path pass. Graphs with cycles still get a finite,
//! non-negative layer for every node, but edges inside a cycle may point
//! "backwards" across layers.

use indexmap::{IndexMap, IndexSet};
use std::collections::VecDeque;

/// Assign a layer index to every node.
///
/// 1. Seed with indegree-zero nodes, or with every node when there are none.
/// 2. Process FIFO; each edge into a not-yet-visited target raises its layer
///    to `layer[current] + 1`, and the target is enqueued once all of its
///    incoming edges have been relaxed.
/// 3. Nodes never reached (trapped in a cycle) take `max(layer[pred]) + 1`
///    over predecessors that already have a layer, or 0.
///
/// Self-loops and edges naming unknown nodes are ignored. The result is in
/// node input order.
pub fn assign_layers<'a, N, E>(nodes: N, edges: E) -> IndexMap<String, usize>
where
    N: IntoIterator<Item = &'a str>,
    E: IntoIterator<Item = (&'a str, &'a str)>,
{
    let ids: IndexSet<&str> = nodes.into_iter().collect();
    let n = ids.len();

    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut remaining = vec![0usize; n];
    for (source, target) in edges {
        let (Some(s), Some(t)) = (ids.get_index_of(source), ids.get_index_of(target)) else {
            continue;
        };
        if s == t {
            continue;
        }
        successors[s].push(t);
        predecessors[t].push(s);
        remaining[t] += 1;
    }

    let mut layer: Vec<Option<usize>> = vec![None; n];
    let mut visited = vec![false; n];
    let mut queue: VecDeque<usize> = (0..n).filter(|&i| remaining[i] == 0).collect();
    if queue.is_empty() {
        queue.extend(0..n);
    }
    for &i in &queue {
        visited[i] = true;
        layer[i] = Some(0);
    }

    while let Some(current) = queue.pop_front() {
        let next = layer[current].unwrap_or(0) + 1;
        for &target in &successors[current] {
            if visited[target] {
                continue;
            }
            layer[target] = Some(layer[target].map_or(next, |l| l.max(next)));
            remaining[target] = remaining[target].saturating_sub(1);
            if remaining[target] == 0 {
                visited[target] = true;
                queue.push_back(target);
            }
        }
    }

    for i in 0..n {
        if visited[i] {
            continue;
        }
        let from_preds = predecessors[i]
            .iter()
            .filter_map(|&p| layer[p])
            .max()
            .map_or(0, |l| l + 1);
        layer[i] = Some(from_preds);
    }

    ids.into_iter()
        .zip(layer)
        .map(|(id, l)| (id.to_string(), l.unwrap_or(0)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_layers_by_depth() {
        let layers = assign_layers(["A", "B", "C"], [("A", "B"), ("B", "C")]);
        assert_eq!(layers["A"], 0);
        assert_eq!(layers["B"], 1);
        assert_eq!(layers["C"], 2);
    }

    #[test]
    fn longest_path_wins_on_diamond() {
        let layers = assign_layers(
            ["A", "B", "C", "D"],
            [("A", "B"), ("A", "D"), ("B", "C"), ("C", "D")],
        );
        assert_eq!(layers["D"], 3);
    }

    #[test]
    fn pure_cycle_is_flat() {
        let layers = assign_layers(["A", "B", "C"], [("A", "B"), ("B", "C"), ("C", "A")]);
        assert_eq!(layers.values().copied().collect::<Vec<_>>(), vec![0, 0, 0]);
    }

    #[test]
    fn cycle_hanging_off_a_root() {
        // S -> A <-> B: A and B are never released by the queue.
        let layers = assign_layers(["S", "A", "B"], [("S", "A"), ("A", "B"), ("B", "A")]);
        assert_eq!(layers["S"], 0);
        assert_eq!(layers["A"], 1);
        assert_eq!(layers["B"], 2);
    }

    #[test]
    fn isolated_cycle_next_to_dag() {
        let layers = assign_layers(
            ["R", "X", "A", "B"],
            [("R", "X"), ("A", "B"), ("B", "A")],
        );
        assert_eq!(layers["R"], 0);
        assert_eq!(layers["X"], 1);
        assert_eq!(layers["A"], 0);
        assert_eq!(layers["B"], 1);
    }

    #[test]
    fn self_loops_and_unknown_nodes_are_ignored() {
        let layers = assign_layers(["A", "B"], [("A", "A"), ("A", "B"), ("B", "Z")]);
        assert_eq!(layers.len(), 2);
        assert_eq!(layers["A"], 0);
        assert_eq!(layers["B"], 1);
    }

    #[test]
    fn empty_graph() {
        let layers = assign_layers(std::iter::empty(), std::iter::empty());
        assert!(layers.is_empty());
    }
}
