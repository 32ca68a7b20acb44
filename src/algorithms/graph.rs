use crate::error::Error;

/// Largest city count the bitmask DP accepts. Keeps the memo table and the
/// recursion bounded (2^16 * 16 entries).
pub const MAX_DP_CITIES: usize = 16;

/// Vertex count of the fixed approximate-TSP instance.
pub const TOUR_VERTICES: usize = 6;
/// City count of the fixed exact-TSP instance.
pub const TSP_CITIES: usize = 4;
/// Vertex count of the fixed coloring instance.
pub const COLORING_VERTICES: usize = 6;
/// Color budget used by the coloring workload.
pub const COLORING_BUDGET: u8 = 3;

/// Complete weighted graph used by the MST workload.
pub const TOUR_WEIGHTS: [[u32; TOUR_VERTICES]; TOUR_VERTICES] = [
    [0, 4, 1, 3, 7, 5],
    [4, 0, 2, 6, 3, 8],
    [1, 2, 0, 5, 6, 4],
    [3, 6, 5, 0, 2, 7],
    [7, 3, 6, 2, 0, 3],
    [5, 8, 4, 7, 3, 0],
];

/// Directed city distances used by the bitmask DP workload.
pub const TSP_DISTANCES: [[u32; TSP_CITIES]; TSP_CITIES] = [
    [0, 22, 26, 30],
    [30, 0, 45, 35],
    [25, 45, 0, 60],
    [30, 35, 40, 0],
];

pub const COLORING_EDGES: [(usize, usize); 9] = [
    (0, 1),
    (0, 2),
    (0, 3),
    (0, 5),
    (1, 2),
    (2, 3),
    (2, 4),
    (3, 4),
    (4, 5),
];

pub const COLORING_ADJACENCY: [[bool; COLORING_VERTICES]; COLORING_VERTICES] =
    edges_to_matrix(&COLORING_EDGES);

const fn edges_to_matrix<const N: usize>(edges: &[(usize, usize)]) -> [[bool; N]; N] {
    let mut m = [[false; N]; N];
    let mut i = 0;
    while i < edges.len() {
        let (a, b) = edges[i];
        m[a][b] = true;
        m[b][a] = true;
        i += 1;
    }
    m
}

fn check_symmetric<T: Copy + PartialEq + Default, const N: usize>(
    cells: &[[T; N]; N],
) -> Result<(), Error> {
    for i in 0..N {
        if cells[i][i] != T::default() {
            return Err(Error::InvalidGraph(format!("vertex {} has a self edge", i)));
        }
        for j in (i + 1)..N {
            if cells[i][j] != cells[j][i] {
                return Err(Error::InvalidGraph(format!(
                    "edge {}-{} is not symmetric",
                    i, j
                )));
            }
        }
    }
    Ok(())
}

/// Symmetric adjacency matrix of non-negative edge weights. Zero means "no edge".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightedGraph<const N: usize> {
    weights: [[u32; N]; N],
}

impl<const N: usize> WeightedGraph<N> {
    pub fn new(weights: [[u32; N]; N]) -> Result<Self, Error> {
        check_symmetric(&weights)?;
        Ok(Self { weights })
    }

    #[inline]
    pub fn weight(&self, u: usize, v: usize) -> u32 {
        self.weights[u][v]
    }
}

impl WeightedGraph<TOUR_VERTICES> {
    /// The fixed instance timed by the approximate-TSP workload.
    pub fn tour_instance() -> Self {
        Self {
            weights: TOUR_WEIGHTS,
        }
    }
}

/// Directed distances between cities for the exact TSP. Need not be symmetric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceMatrix<const N: usize> {
    distances: [[u32; N]; N],
}

impl<const N: usize> DistanceMatrix<N> {
    pub fn new(distances: [[u32; N]; N]) -> Result<Self, Error> {
        if N == 0 || N > MAX_DP_CITIES {
            return Err(Error::InvalidGraph(format!(
                "exact TSP supports 1..={} cities, got {}",
                MAX_DP_CITIES, N
            )));
        }
        Ok(Self { distances })
    }

    #[inline]
    pub fn distance(&self, from: usize, to: usize) -> u32 {
        self.distances[from][to]
    }
}

impl DistanceMatrix<TSP_CITIES> {
    /// The fixed instance timed by the exact-TSP workload.
    pub fn city_instance() -> Self {
        Self {
            distances: TSP_DISTANCES,
        }
    }
}

/// Undirected, loop-free adjacency matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjacencyMatrix<const N: usize> {
    adjacent: [[bool; N]; N],
}

impl<const N: usize> AdjacencyMatrix<N> {
    pub fn new(adjacent: [[bool; N]; N]) -> Result<Self, Error> {
        check_symmetric(&adjacent)?;
        Ok(Self { adjacent })
    }

    pub fn from_edges(edges: &[(usize, usize)]) -> Result<Self, Error> {
        let mut adjacent = [[false; N]; N];
        for &(a, b) in edges {
            if a >= N || b >= N {
                return Err(Error::InvalidGraph(format!(
                    "edge {}-{} out of range for {} vertices",
                    a, b, N
                )));
            }
            adjacent[a][b] = true;
            adjacent[b][a] = true;
        }
        Self::new(adjacent)
    }

    #[inline]
    pub fn is_adjacent(&self, u: usize, v: usize) -> bool {
        self.adjacent[u][v]
    }
}

impl AdjacencyMatrix<COLORING_VERTICES> {
    /// The fixed instance timed by the coloring workload.
    pub fn coloring_instance() -> Self {
        Self {
            adjacent: COLORING_ADJACENCY,
        }
    }
}
