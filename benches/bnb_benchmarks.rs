//! Benchmarks for the branch-and-bound search.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use haplo_bnb::{ExploreConfig, Tree};

/// A chain of `n` positions, each linked to its neighbor with alternating
/// homo/hetro emphasis so no run of equal assignments trivially dominates.
fn chain_tree(n: usize) -> Tree {
    let mut tree = Tree::new(n);
    for i in 0..n.saturating_sub(1) {
        let link = tree.create_link(i, i + 1).unwrap();
        if i % 2 == 0 {
            link.add_homo(5);
            link.add_hetro(2);
        } else {
            link.add_homo(2);
            link.add_hetro(5);
        }
    }
    tree.set_start_node(0);
    tree.set_max_worst_case(5 * n as i64);
    tree
}

/// A denser graph: every position linked to its next three neighbors, which
/// forces real pruning pressure rather than a linear chain's single path.
fn dense_tree(n: usize) -> Tree {
    let mut tree = Tree::new(n);
    for i in 0..n {
        for j in (i + 1)..n.min(i + 4) {
            let link = tree.create_link(i, j).unwrap();
            link.add_homo(((i + j) % 7 + 1) as u64);
            link.add_hetro(((i * j) % 7 + 1) as u64);
        }
    }
    tree.set_start_node(0);
    tree.set_max_worst_case(7 * n as i64);
    tree
}

fn bench_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain");
    for n in [8, 12, 16] {
        group.bench_with_input(BenchmarkId::new("serial", n), &n, |b, &n| {
            b.iter(|| {
                let mut tree = chain_tree(n);
                black_box(tree.explore(ExploreConfig::default()))
            })
        });
    }
    group.finish();
}

fn bench_dense(c: &mut Criterion) {
    let mut group = c.benchmark_group("dense");
    group.sample_size(10);
    for n in [8, 10, 12] {
        group.bench_with_input(BenchmarkId::new("serial", n), &n, |b, &n| {
            b.iter(|| {
                let mut tree = dense_tree(n);
                black_box(tree.explore(ExploreConfig::default()))
            })
        });
    }
    group.finish();
}

fn bench_parallel_widths(c: &mut Criterion) {
    let mut group = c.benchmark_group("parallel_widths");
    group.sample_size(10);
    for (branch_cores, op_cores) in [(1, 1), (2, 4), (4, 8)] {
        group.bench_with_input(
            BenchmarkId::new("dense_n12", format!("{branch_cores}x{op_cores}")),
            &(branch_cores, op_cores),
            |b, &(branch_cores, op_cores)| {
                b.iter(|| {
                    let mut tree = dense_tree(12);
                    black_box(tree.explore(ExploreConfig::new(branch_cores, op_cores)))
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_chain, bench_dense, bench_parallel_widths);
criterion_main!(benches);
