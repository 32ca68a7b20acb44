//! Approximate TSP tour cost from a Prim minimum spanning tree.
//!
//! The reported cost is the sum of the MST's parent edges. It is not the
//! doubled-tree-plus-shortcut 2-approximation; the workload only needs the
//! MST construction as timed work.

use super::graph::WeightedGraph;
use crate::error::Error;

const UNREACHED: u64 = u64::MAX;

/// Unvisited vertex with the smallest key. Ascending scan, so ties go to the
/// lowest index.
fn min_key_vertex<const N: usize>(key: &[u64; N], in_tree: &[bool; N]) -> Option<usize> {
    let mut min = UNREACHED;
    let mut best = None;
    for v in 0..N {
        if !in_tree[v] && key[v] < min {
            min = key[v];
            best = Some(v);
        }
    }
    best
}

fn disconnected() -> Error {
    Error::InvalidGraph("graph is disconnected".into())
}

/// Builds an MST rooted at vertex 0 and returns each vertex's parent.
/// The root has no parent.
pub fn prim_mst<const N: usize>(graph: &WeightedGraph<N>) -> Result<[Option<usize>; N], Error> {
    let mut key = [UNREACHED; N];
    let mut in_tree = [false; N];
    let mut parent = [None; N];
    if N == 0 {
        return Ok(parent);
    }
    key[0] = 0;

    for _ in 0..N.saturating_sub(1) {
        let u = min_key_vertex(&key, &in_tree).ok_or_else(disconnected)?;
        in_tree[u] = true;
        for v in 0..N {
            let w = graph.weight(u, v);
            if w != 0 && !in_tree[v] && u64::from(w) < key[v] {
                parent[v] = Some(u);
                key[v] = u64::from(w);
            }
        }
    }

    if parent.iter().skip(1).any(Option::is_none) {
        return Err(disconnected());
    }
    Ok(parent)
}

/// Sum of the parent edge weights of the Prim MST.
pub fn approx_tour_cost<const N: usize>(graph: &WeightedGraph<N>) -> Result<u64, Error> {
    let parent = prim_mst(graph)?;
    Ok(parent
        .iter()
        .enumerate()
        .filter_map(|(v, p)| p.map(|u| u64::from(graph.weight(u, v))))
        .sum())
}
