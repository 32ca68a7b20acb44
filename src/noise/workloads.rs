use std::hint::black_box;

use super::NoiseOperation;
use crate::algorithms::graph::COLORING_BUDGET;
use crate::algorithms::{
    approx_tour_cost, graph_coloring, tsp_exact, AdjacencyMatrix, DistanceMatrix, WeightedGraph,
};
use crate::error::Error;

/// Slot value written when the graph is not colorable within budget (-1 as u64).
pub const COLORING_FAILED: u64 = u64::MAX;

/// Prim MST tour cost on the fixed 6-vertex graph.
#[derive(Debug)]
pub struct TspApprox {
    graph: WeightedGraph<6>,
}

impl Default for TspApprox {
    fn default() -> Self {
        Self {
            graph: WeightedGraph::tour_instance(),
        }
    }
}

impl NoiseOperation for TspApprox {
    fn name(&self) -> &'static str {
        "tsp-approx"
    }

    #[inline(never)]
    fn invoke(&mut self, slot: &mut u64) -> Result<(), Error> {
        *slot = approx_tour_cost(black_box(&self.graph))?;
        Ok(())
    }
}

/// Exact TSP from city 0 on the fixed 4-city matrix.
#[derive(Debug)]
pub struct TspExact {
    cities: DistanceMatrix<4>,
}

impl Default for TspExact {
    fn default() -> Self {
        Self {
            cities: DistanceMatrix::city_instance(),
        }
    }
}

impl NoiseOperation for TspExact {
    fn name(&self) -> &'static str {
        "tsp-exact"
    }

    #[inline(never)]
    fn invoke(&mut self, slot: &mut u64) -> Result<(), Error> {
        *slot = tsp_exact(black_box(&self.cities), 0)?;
        Ok(())
    }
}

/// Backtracking coloring of the fixed 6-vertex graph. Writes vertex 0's color,
/// or [`COLORING_FAILED`].
#[derive(Debug)]
pub struct GraphColoring {
    graph: AdjacencyMatrix<6>,
    budget: u8,
}

impl Default for GraphColoring {
    fn default() -> Self {
        Self {
            graph: AdjacencyMatrix::coloring_instance(),
            budget: COLORING_BUDGET,
        }
    }
}

impl NoiseOperation for GraphColoring {
    fn name(&self) -> &'static str {
        "graph-coloring"
    }

    #[inline(never)]
    fn invoke(&mut self, slot: &mut u64) -> Result<(), Error> {
        *slot = graph_coloring(black_box(&self.graph), black_box(self.budget))
            .map_or(COLORING_FAILED, |a| u64::from(a.color_of(0)));
        Ok(())
    }
}
