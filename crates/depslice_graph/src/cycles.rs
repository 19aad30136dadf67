use log::{debug, trace};
use std::collections::{HashMap, HashSet};

use crate::types::{GraphEdge, GraphNode};

/// Finds import cycles with one depth-first pass over the internal edges.
///
/// Roots are taken in node order and each node is expanded at most once, so
/// a cycle that can only be reached by re-entering an already finished
/// subtree is not reported again. When an edge closes onto a node still on
/// the current path, the path slice from that node to the current one is
/// emitted.
///
/// The traversal keeps its own frame stack instead of recursing, so deep
/// import chains cannot overflow the call stack.
pub fn detect_cycles(nodes: &[GraphNode], edges: &[GraphEdge]) -> Vec<Vec<String>> {
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in edges {
        let targets = adjacency.entry(edge.from.as_str()).or_default();
        if !targets.contains(&edge.to.as_str()) {
            targets.push(edge.to.as_str());
        }
    }

    let mut cycles: Vec<Vec<String>> = Vec::new();
    let mut finished: HashSet<&str> = HashSet::new();

    for root in nodes.iter().map(|n| n.id.as_str()) {
        if finished.contains(root) {
            continue;
        }
        trace!("Cycle search from root: {}", root);

        let mut path: Vec<&str> = vec![root];
        let mut on_path: HashMap<&str, usize> = HashMap::from([(root, 0)]);
        // (node, index of the next neighbor to visit)
        let mut frames: Vec<(&str, usize)> = vec![(root, 0)];

        while let Some(frame) = frames.last_mut() {
            let node = frame.0;
            let next = adjacency.get(node).and_then(|targets| targets.get(frame.1)).copied();
            match next {
                Some(neighbor) => {
                    frame.1 += 1;
                    if let Some(&start) = on_path.get(neighbor) {
                        let cycle: Vec<String> = path[start..].iter().map(|s| s.to_string()).collect();
                        debug!("Found cycle: {}", cycle.join(" -> "));
                        cycles.push(cycle);
                    } else if !finished.contains(neighbor) {
                        on_path.insert(neighbor, path.len());
                        path.push(neighbor);
                        frames.push((neighbor, 0));
                    }
                }
                None => {
                    frames.pop();
                    path.pop();
                    on_path.remove(node);
                    finished.insert(node);
                }
            }
        }
    }

    debug!("Detected {} cycles", cycles.len());
    cycles
}
