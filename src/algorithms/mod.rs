pub mod coloring;
pub mod graph;
pub mod mst;
pub mod tsp;

pub use coloring::graph_coloring;
pub use graph::{AdjacencyMatrix, DistanceMatrix, WeightedGraph};
pub use mst::approx_tour_cost;
pub use tsp::tsp_exact;
