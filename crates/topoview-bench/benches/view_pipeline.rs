use criterion::{Criterion, black_box, criterion_group, criterion_main};
use topoview_bench::util::{generate_network, manipulate};
use topoview_graph::{GraphUserState, compute_grouped_graph, compute_unhidden_graph, compute_view_graph};

fn bench_view_untouched(c: &mut Criterion) {
    // 4 columns of 1 + 6 + 36 + 216 nodes
    let graph = generate_network(4, 3, 6);
    let state = GraphUserState::new();

    c.bench_function("view_untouched_1k_nodes", |b| {
        b.iter(|| black_box(compute_view_graph(black_box(&graph), &state)))
    });
}

fn bench_view_manipulated(c: &mut Criterion) {
    let graph = generate_network(4, 3, 6);
    let state = manipulate(&graph, 2);

    c.bench_function("view_pinned_and_collapsed_1k_nodes", |b| {
        b.iter(|| black_box(compute_view_graph(black_box(&graph), &state)))
    });
}

fn bench_passes(c: &mut Criterion) {
    let graph = generate_network(8, 3, 6);
    let state = manipulate(&graph, 3);
    let unhidden = compute_unhidden_graph(&graph, state.node_states());

    c.bench_function("unhidden_pass_2k_nodes", |b| {
        b.iter(|| black_box(compute_unhidden_graph(black_box(&graph), state.node_states())))
    });
    c.bench_function("grouped_pass_2k_nodes", |b| {
        b.iter(|| black_box(compute_grouped_graph(black_box(&unhidden.graph))))
    });
}

criterion_group!(benches, bench_view_untouched, bench_view_manipulated, bench_passes);
criterion_main!(benches);
