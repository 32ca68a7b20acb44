//! m-coloring by backtracking.
//!
//! Vertices are colored in index order and colors tried in ascending order,
//! so the first assignment found is the lexicographically smallest one.

use super::graph::AdjacencyMatrix;

/// Color of each vertex. 0 means unassigned, otherwise `1..=m`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColoringAssignment<const N: usize> {
    colors: [u8; N],
}

impl<const N: usize> ColoringAssignment<N> {
    pub fn colors(&self) -> &[u8; N] {
        &self.colors
    }

    pub fn color_of(&self, vertex: usize) -> u8 {
        self.colors[vertex]
    }

    /// Whether every vertex is colored and no edge joins two equal colors.
    pub fn is_proper(&self, graph: &AdjacencyMatrix<N>) -> bool {
        for u in 0..N {
            if self.colors[u] == 0 {
                return false;
            }
            for v in (u + 1)..N {
                if graph.is_adjacent(u, v) && self.colors[u] == self.colors[v] {
                    return false;
                }
            }
        }
        true
    }
}

fn is_safe<const N: usize>(graph: &AdjacencyMatrix<N>, colors: &[u8; N], v: usize, c: u8) -> bool {
    (0..N).all(|i| !(graph.is_adjacent(v, i) && colors[i] == c))
}

fn assign_from<const N: usize>(
    graph: &AdjacencyMatrix<N>,
    m: u8,
    colors: &mut [u8; N],
    v: usize,
) -> bool {
    if v == N {
        return true;
    }
    for c in 1..=m {
        if is_safe(graph, colors, v, c) {
            colors[v] = c;
            if assign_from(graph, m, colors, v + 1) {
                return true;
            }
            colors[v] = 0;
        }
    }
    false
}

/// First proper coloring with at most `m` colors, or `None` if the graph is
/// not `m`-colorable.
pub fn graph_coloring<const N: usize>(
    graph: &AdjacencyMatrix<N>,
    m: u8,
) -> Option<ColoringAssignment<N>> {
    let mut colors = [0u8; N];
    if assign_from(graph, m, &mut colors, 0) {
        Some(ColoringAssignment { colors })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::graph::{COLORING_BUDGET, COLORING_EDGES, COLORING_VERTICES};

    /// Exhaustive search over all m^N assignments.
    fn brute_force_colorable(edges: &[(usize, usize)], n: usize, m: u8) -> bool {
        let total = (m as usize).pow(n as u32);
        (0..total).any(|mut code| {
            let mut colors = vec![0usize; n];
            for c in colors.iter_mut() {
                *c = code % m as usize;
                code /= m as usize;
            }
            edges.iter().all(|&(a, b)| colors[a] != colors[b])
        })
    }

    #[test]
    fn test_fixed_instance_three_colors() {
        let graph = AdjacencyMatrix::coloring_instance();
        let assignment = graph_coloring(&graph, COLORING_BUDGET).unwrap();
        assert!(assignment.is_proper(&graph));
        assert_eq!(assignment.color_of(0), 1);
        assert_eq!(assignment.colors(), &[1, 2, 3, 2, 1, 2]);
        assert!(brute_force_colorable(
            &COLORING_EDGES,
            COLORING_VERTICES,
            COLORING_BUDGET
        ));
    }

    #[test]
    fn test_fixed_instance_two_colors_infeasible() {
        // Triangle 0-1-2 needs three colors.
        let graph = AdjacencyMatrix::coloring_instance();
        assert!(graph_coloring(&graph, 2).is_none());
        assert!(!brute_force_colorable(&COLORING_EDGES, COLORING_VERTICES, 2));
    }

    #[test]
    fn test_colors_within_budget() {
        let graph = AdjacencyMatrix::coloring_instance();
        let assignment = graph_coloring(&graph, 4).unwrap();
        assert!(assignment.colors().iter().all(|&c| (1..=4).contains(&c)));
    }

    #[test]
    fn test_complete_graph_needs_n_colors() {
        let edges = [(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)];
        let graph = AdjacencyMatrix::<4>::from_edges(&edges).unwrap();
        assert!(graph_coloring(&graph, 3).is_none());
        let assignment = graph_coloring(&graph, 4).unwrap();
        assert_eq!(assignment.colors(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_even_cycle_two_colors() {
        // 0-1-3-2-0
        let edges = [(0, 1), (1, 3), (3, 2), (2, 0)];
        let graph = AdjacencyMatrix::<4>::from_edges(&edges).unwrap();
        let assignment = graph_coloring(&graph, 2).unwrap();
        assert!(assignment.is_proper(&graph));
        assert_eq!(assignment.colors(), &[1, 2, 2, 1]);
    }

    #[test]
    fn test_backtracks_after_dead_end() {
        // Crown graph: bipartite, but giving 0 and 1 the same color leaves
        // vertex 4 with no color, so vertex 1 has to be revisited.
        let edges = [(0, 3), (0, 5), (2, 1), (2, 5), (4, 1), (4, 3)];
        let graph = AdjacencyMatrix::<6>::from_edges(&edges).unwrap();
        let assignment = graph_coloring(&graph, 2).unwrap();
        assert!(assignment.is_proper(&graph));
        assert_eq!(assignment.colors(), &[1, 2, 1, 2, 1, 2]);
    }

    #[test]
    fn test_zero_budget() {
        let graph = AdjacencyMatrix::<2>::from_edges(&[]).unwrap();
        assert!(graph_coloring(&graph, 0).is_none());
    }
}
