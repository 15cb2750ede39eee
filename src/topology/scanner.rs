//! Pure-read topology scanning: grouping edges into curves (maximal
//! connected chains), walking chains into vertex order, and finding open
//! ends. Nothing here mutates the scene.

use std::collections::HashSet;

use crate::scene::{EdgeId, Scene, VertexId};

/// Partitions the given edges into maximal connected chains.
///
/// Two edges land in the same chain iff they are transitively connected
/// through shared vertices within the given set. A single isolated edge is
/// its own one-edge chain. Output order follows the input edge order, so
/// repeated calls over the same input are identical.
#[must_use]
pub fn find_curves(scene: &Scene, edges: &[EdgeId]) -> Vec<Vec<EdgeId>> {
    let in_set: HashSet<EdgeId> = edges.iter().copied().collect();
    let mut assigned: HashSet<EdgeId> = HashSet::new();
    let mut curves = Vec::new();

    for &seed in edges {
        if assigned.contains(&seed) || !scene.contains_edge(seed) {
            continue;
        }
        let mut chain = Vec::new();
        let mut queue = vec![seed];
        assigned.insert(seed);
        while let Some(edge) = queue.pop() {
            chain.push(edge);
            let Ok(data) = scene.edge(edge) else { continue };
            for vertex in [data.start, data.end] {
                let Ok(vdata) = scene.vertex(vertex) else {
                    continue;
                };
                for &next in &vdata.edges {
                    if in_set.contains(&next) && assigned.insert(next) {
                        queue.push(next);
                    }
                }
            }
        }
        curves.push(chain);
    }
    curves
}

/// Walks a chain of edges into a path-consistent vertex order.
///
/// Starts from an open end of the chain when one exists, otherwise (a
/// closed loop) from an arbitrary vertex of the first edge. Branching
/// topology is unsupported upstream; the walk degrades to a best-effort
/// partial order along one branch instead of failing.
#[must_use]
pub fn sort_vertices(scene: &Scene, curve: &[EdgeId]) -> Vec<VertexId> {
    let live: Vec<EdgeId> = curve
        .iter()
        .copied()
        .filter(|&e| scene.contains_edge(e))
        .collect();
    let Some(&first) = live.first() else {
        return Vec::new();
    };

    let start = chain_end_vertex(scene, &live).unwrap_or_else(|| {
        // Closed loop: any vertex will do, take the first edge's start.
        scene.edge(first).map(|e| e.start).unwrap_or_default()
    });

    let in_set: HashSet<EdgeId> = live.iter().copied().collect();
    let mut visited: HashSet<EdgeId> = HashSet::new();
    let mut order = vec![start];
    let mut current = start;

    loop {
        let Ok(vdata) = scene.vertex(current) else {
            break;
        };
        let next_edge = vdata
            .edges
            .iter()
            .copied()
            .find(|e| in_set.contains(e) && !visited.contains(e));
        let Some(edge) = next_edge else { break };
        visited.insert(edge);
        let Ok(data) = scene.edge(edge) else { break };
        let Some(next) = data.other_vertex(current) else {
            break;
        };
        if next == start {
            // Loop closed; don't repeat the start vertex.
            break;
        }
        order.push(next);
        current = next;
    }
    order
}

/// Every vertex with exactly one incident edge among the given edges.
///
/// A closed loop contributes nothing. Output order follows the input edge
/// order.
#[must_use]
pub fn find_end_vertices(scene: &Scene, edges: &[EdgeId]) -> Vec<VertexId> {
    let mut counts: Vec<(VertexId, usize)> = Vec::new();
    for &edge in edges {
        let Ok(data) = scene.edge(edge) else { continue };
        for vertex in [data.start, data.end] {
            if let Some(entry) = counts.iter_mut().find(|(v, _)| *v == vertex) {
                entry.1 += 1;
            } else {
                counts.push((vertex, 1));
            }
        }
    }
    counts
        .into_iter()
        .filter_map(|(vertex, count)| (count == 1).then_some(vertex))
        .collect()
}

/// A vertex of the chain with exactly one incident edge within it.
fn chain_end_vertex(scene: &Scene, curve: &[EdgeId]) -> Option<VertexId> {
    find_end_vertices(scene, curve).into_iter().next()
}
