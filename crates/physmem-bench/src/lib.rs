//! Workloads for benchmarking physmem placements.
//!
//! - [`random_edges`]: deterministic edge list via seed
//! - [`build_csr`]: CSR construction written against [`BufferSource`]

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use physmem_arena::{ArenaError, BufferSource};
use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// `count` edges between `nodes` nodes, reproducible from `seed`.
pub fn random_edges(nodes: u32, count: usize, seed: u64) -> Vec<(u32, u32)> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| (rng.next_u32() % nodes, rng.next_u32() % nodes))
        .collect()
}

/// Build CSR offsets and neighbours for `edges` from `source`.
///
/// Returns the sum of the offsets and the sum of the neighbour ids, so
/// the buffers can be released before returning.
pub fn build_csr<S: BufferSource>(
    source: &S,
    nodes: usize,
    edges: &[(u32, u32)],
) -> Result<(u64, u64), ArenaError> {
    let mut index = source.allocate::<u64>(nodes + 1)?;
    let mut neighbors = source.allocate::<u32>(edges.len())?;

    let offsets = index.fill(0);
    for &(src, _) in edges {
        offsets[src as usize + 1] += 1;
    }
    for node in 0..nodes {
        offsets[node + 1] += offsets[node];
    }

    let mut cursor: Vec<u64> = offsets[..nodes].to_vec();
    let neigh = neighbors.fill(0);
    for &(src, dst) in edges {
        let slot = &mut cursor[src as usize];
        neigh[*slot as usize] = dst;
        *slot += 1;
    }

    let checksum: (u64, u64) = (
        offsets.iter().sum(),
        neigh.iter().map(|&n| u64::from(n)).sum(),
    );
    source.release(neighbors);
    source.release(index);
    Ok(checksum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use physmem_arena::HeapSource;

    #[test]
    fn edges_are_reproducible_and_in_range() {
        let a = random_edges(100, 500, 7);
        let b = random_edges(100, 500, 7);
        assert_eq!(a, b);
        assert!(a.iter().all(|&(s, d)| s < 100 && d < 100));
    }

    #[test]
    fn csr_checksum_counts_every_neighbour() {
        let edges = [(0, 1), (0, 2), (2, 3)];
        let (offset_sum, neighbour_sum) = build_csr(&HeapSource, 4, &edges).unwrap();
        // offsets = [0, 2, 2, 3, 3]
        assert_eq!(offset_sum, 10);
        assert_eq!(neighbour_sum, 6);
    }
}
