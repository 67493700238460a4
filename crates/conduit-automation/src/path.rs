//! Shortest-path search over the transformer graph.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, VecDeque};

/// Adjacency lists over subject kinds.
///
/// Edge indices are appended in registration order, so breadth-first search
/// discovers the earliest-registered edge first among equally short chains.
#[derive(Debug, Clone, Default)]
pub(crate) struct TransformGraph {
    /// source kind -> [(target kind, edge index)]
    edges: HashMap<String, Vec<(String, usize)>>,
}

impl TransformGraph {
    pub(crate) fn add_edge(&mut self, source: &str, target: &str, edge_index: usize) {
        self.edges
            .entry(source.to_string())
            .or_default()
            .push((target.to_string(), edge_index));
    }

    /// Find the chain with the fewest conversions from `source` to `target`.
    ///
    /// Returns edge indices in application order. `source == target` yields
    /// an empty chain.
    pub(crate) fn shortest_path(&self, source: &str, target: &str) -> Option<Vec<usize>> {
        if source == target {
            return Some(Vec::new());
        }

        // kind -> (parent kind, edge index used to reach it); None marks the start
        let mut visited: HashMap<&str, Option<(&str, usize)>> = HashMap::new();
        let mut queue = VecDeque::new();

        visited.insert(source, None);
        queue.push_back(source);

        while let Some(current) = queue.pop_front() {
            let Some(neighbors) = self.edges.get(current) else {
                continue;
            };

            for (next, edge_index) in neighbors {
                if let Entry::Vacant(slot) = visited.entry(next.as_str()) {
                    slot.insert(Some((current, *edge_index)));
                    if next == target {
                        return Some(reconstruct(&visited, target));
                    }
                    queue.push_back(next.as_str());
                }
            }
        }

        None
    }
}

fn reconstruct(visited: &HashMap<&str, Option<(&str, usize)>>, target: &str) -> Vec<usize> {
    let mut path = Vec::new();
    let mut node = target;
    while let Some(Some((parent, edge_index))) = visited.get(node) {
        path.push(*edge_index);
        node = *parent;
    }
    path.reverse();
    path
}
