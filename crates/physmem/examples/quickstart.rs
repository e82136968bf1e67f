//! Exercise the configured placement with a CSR-shaped allocation.
//!
//! Builds the offset and neighbour arrays of a small ring graph from
//! whichever placement the environment selects, then prints utilization.
//!
//! Run with the heap:
//!   cargo run -p physmem --example quickstart
//!
//! Run against a reserved physical range (as root, booted with
//! `memmap=` / `iomem=relaxed`):
//!   PHYSMEM_PHYS_ADDR=0xF00000000 PHYSMEM_SIZE=0x10000000 \
//!     cargo run -p physmem --example quickstart

use physmem::prelude::*;

const NODES: usize = 1 << 16;
const DEGREE: usize = 4;

fn main() {
    let placement = exit_on_fatal(Placement::from_env());
    println!(
        "placement: {}",
        if placement.is_arena_backed() {
            "physical arena"
        } else {
            "heap"
        }
    );

    let mut index = exit_on_fatal(placement.allocate::<u64>(NODES + 1));
    let mut neighbors = exit_on_fatal(placement.allocate::<u32>(NODES * DEGREE));

    let index_slice = index.fill(0);
    for (node, offset) in index_slice.iter_mut().enumerate() {
        *offset = (node * DEGREE) as u64;
    }
    let neighbor_slice = neighbors.fill(0);
    for node in 0..NODES {
        for hop in 0..DEGREE {
            neighbor_slice[node * DEGREE + hop] = ((node + hop + 1) % NODES) as u32;
        }
    }
    println!(
        "built ring graph: {NODES} nodes, {} edges, last neighbour {}",
        NODES * DEGREE,
        neighbor_slice[NODES * DEGREE - 1]
    );

    if let Some(arena) = placement.arena() {
        println!("arena base {:p}, contains index: {}", arena.base(), arena.contains(index.as_ptr()));
    }
    match placement.report_usage() {
        Some(usage) => println!("{usage}"),
        None => println!("heap placement keeps no usage accounting"),
    }

    placement.release(neighbors);
    placement.release(index);
}
