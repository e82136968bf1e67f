//! Criterion micro-benchmarks for bump allocation against the heap.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use physmem_arena::{BufferSource, DevMemArena, HeapSource, MappedRegion};
use physmem_bench::{build_csr, random_edges};

const NODES: usize = 10_000;
const EDGES: usize = 80_000;

fn fresh_arena() -> DevMemArena {
    DevMemArena::from_region(MappedRegion::anonymous(4 << 20).unwrap())
}

/// Benchmark: 1000 small mixed-alignment allocations from a fresh arena.
fn bench_bump_small(c: &mut Criterion) {
    c.bench_function("bump_small_1000", |b| {
        b.iter_batched(
            fresh_arena,
            |arena| {
                for i in 0..1000usize {
                    if i % 2 == 0 {
                        black_box(arena.allocate::<u8>(3).unwrap().as_ptr());
                    } else {
                        black_box(arena.allocate::<u64>(2).unwrap().as_ptr());
                    }
                }
                arena
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

/// Benchmark: the same allocation pattern on the global heap.
fn bench_heap_small(c: &mut Criterion) {
    c.bench_function("heap_small_1000", |b| {
        b.iter(|| {
            for i in 0..1000usize {
                if i % 2 == 0 {
                    let buf = HeapSource.allocate::<u8>(3).unwrap();
                    black_box(buf.as_ptr());
                    HeapSource.release(buf);
                } else {
                    let buf = HeapSource.allocate::<u64>(2).unwrap();
                    black_box(buf.as_ptr());
                    HeapSource.release(buf);
                }
            }
        });
    });
}

/// Benchmark: CSR build for a 10K-node, 80K-edge graph from each source.
fn bench_csr_build(c: &mut Criterion) {
    let edges = random_edges(NODES as u32, EDGES, 42);

    c.bench_function("csr_build_arena", |b| {
        b.iter_batched(
            fresh_arena,
            |arena| {
                black_box(build_csr(&arena, NODES, &edges).unwrap());
                arena
            },
            criterion::BatchSize::SmallInput,
        );
    });

    c.bench_function("csr_build_heap", |b| {
        b.iter(|| black_box(build_csr(&HeapSource, NODES, &edges).unwrap()));
    });
}

criterion_group!(benches, bench_bump_small, bench_heap_small, bench_csr_build);
criterion_main!(benches);
