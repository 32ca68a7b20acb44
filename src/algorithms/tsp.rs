//! Exact TSP via bitmask dynamic programming.
//!
//! State is `(visited mask, current city)`. The memo table is allocated fresh
//! for every top-level call, so repeated calls recompute from scratch and do
//! the same amount of work each time.

use super::graph::DistanceMatrix;
use crate::error::Error;

struct Memo<const N: usize> {
    // `None` marks an uncomputed state.
    cells: Vec<Option<u64>>,
}

impl<const N: usize> Memo<N> {
    fn new() -> Self {
        Self {
            cells: vec![None; (1usize << N) * N],
        }
    }

    #[inline]
    fn slot(&mut self, visited: usize, city: usize) -> &mut Option<u64> {
        &mut self.cells[visited * N + city]
    }
}

fn solve<const N: usize>(
    dist: &DistanceMatrix<N>,
    start: usize,
    visited: usize,
    current: usize,
    memo: &mut Memo<N>,
) -> u64 {
    let full = (1usize << N) - 1;
    if visited == full {
        return u64::from(dist.distance(current, start));
    }
    if let Some(cost) = *memo.slot(visited, current) {
        return cost;
    }

    let mut best = u64::MAX;
    for city in 0..N {
        if visited & (1 << city) == 0 {
            let cost = u64::from(dist.distance(current, city))
                + solve(dist, start, visited | (1 << city), city, memo);
            best = best.min(cost);
        }
    }

    *memo.slot(visited, current) = Some(best);
    best
}

/// Cost of the cheapest Hamiltonian cycle that starts and ends at `start`.
pub fn tsp_exact<const N: usize>(dist: &DistanceMatrix<N>, start: usize) -> Result<u64, Error> {
    if start >= N {
        return Err(Error::InvalidGraph(format!(
            "start city {} out of range for {} cities",
            start, N
        )));
    }
    let mut memo = Memo::<N>::new();
    Ok(solve(dist, start, 1 << start, start, &mut memo))
}
