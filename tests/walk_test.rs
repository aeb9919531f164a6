use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rwrank::graph::{Edge, GraphStore, PartitionedGraph, VertexId};
use rwrank::{walk, Engine, EngineOptions, RunConfig, Signal, WalkParams};

fn cycle(n: u64, partitions: usize) -> PartitionedGraph {
    let store: GraphStore = (0..n).map(|i| Edge::new(i, (i + 1) % n)).collect();
    store.finalize(partitions).unwrap()
}

/// `n` vertices with `degree` random out-edges each, plus `sinks` vertices
/// that only receive edges
fn random_graph(n: u64, degree: u64, sinks: u64, partitions: usize, seed: u64) -> PartitionedGraph {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut store = GraphStore::new();
    for source in 0..n {
        for _ in 0..degree {
            store.add_edge(source, rng.gen_range(0..n + sinks));
        }
    }
    for sink in n..n + sinks {
        store.add_vertex(sink);
    }
    store.finalize(partitions).unwrap()
}

fn config(rw_num: i64, max_wait: u32, activation_fraction: f64, workers: usize) -> RunConfig {
    RunConfig {
        rw_num,
        max_wait,
        activation_fraction,
        workers,
        ..RunConfig::default()
    }
}

fn scores(graph: &PartitionedGraph) -> Vec<u64> {
    graph.scores().into_iter().map(|(_, score)| score).collect()
}

#[test]
fn test_cycle_absorbs_own_unit() {
    // wait count 1 => absorb threshold 0
    let mut graph = cycle(4, 2);
    let report = walk(&mut graph, &config(4, 1, 1.0, 2), 3).unwrap();

    assert_eq!(scores(&graph), vec![1, 1, 1, 1]);
    assert_eq!(report.supersteps, 1);
    assert_eq!(report.steps[0].forwarded, 0);
    assert_eq!(report.bus.messages_sent, 0);
}

#[test]
fn test_cycle_shifts_then_absorbs() {
    // wait count 2 => absorb threshold 1
    let mut graph = cycle(4, 2);
    let report = walk(&mut graph, &config(4, 2, 1.0, 2), 3).unwrap();

    assert_eq!(scores(&graph), vec![1, 1, 1, 1]);
    assert_eq!(report.supersteps, 2);
    assert_eq!(report.steps[0].forwarded, 4);
    assert_eq!(report.steps[1].absorbed, 4);
    assert_eq!(report.bus.messages_delivered, 4);
}

#[test]
fn test_uneven_start_allocation() {
    // 10 walks over 4 vertices: 2 each plus one more with probability 0.5
    let mut graph = cycle(4, 1);
    let report = walk(&mut graph, &config(10, 1, 1.0, 1), 21).unwrap();

    for score in scores(&graph) {
        assert!(score == 2 || score == 3, "score {}", score);
    }
    assert_eq!(report.injected, graph.total_pagerank());
}

#[test]
fn test_threshold_is_respected() {
    let mut graph = random_graph(300, 4, 20, 3, 5);
    let max_wait = 4;
    let report = walk(&mut graph, &config(30_000, max_wait, 1.0, 3), 8).unwrap();

    let threshold = max_wait - 1;
    assert_eq!(report.supersteps, max_wait);
    for step in &report.steps {
        if step.superstep < threshold {
            assert_eq!(step.absorbed, 0, "absorbed early at {}", step.superstep);
        } else {
            assert_eq!(step.forwarded, 0, "forwarded late at {}", step.superstep);
        }
    }
    assert_eq!(report.stranded, 0);
    assert_eq!(graph.total_pending(), 0);
    assert_eq!(report.absorbed, graph.total_pagerank());
}

#[test]
fn test_conservation_in_expectation() {
    let rw_num = 1_000_000;
    for (i, &fraction) in [1.0, 0.5].iter().enumerate() {
        let mut graph = random_graph(10_000, 5, 100, 4, 40 + i as u64);
        let report = walk(&mut graph, &config(rw_num, 5, fraction, 4), 77).unwrap();

        let total = graph.total_pagerank() as f64;
        let error = (total - rw_num as f64).abs() / rw_num as f64;
        assert!(error < 0.05, "fraction {} absorbed {}", fraction, total);
        assert_eq!(report.absorbed, graph.total_pagerank());
    }
}

#[test]
fn test_same_seed_same_scores_for_any_worker_count() {
    let run = |workers: usize, seed: u64| {
        let mut graph = random_graph(500, 3, 10, workers, 9);
        walk(&mut graph, &config(12_345, 4, 0.7, workers), seed).unwrap();
        graph.scores()
    };

    let reference = run(1, 2024);
    assert_eq!(run(1, 2024), reference);
    assert_eq!(run(2, 2024), reference);
    assert_eq!(run(5, 2024), reference);
    assert_ne!(run(2, 2025), reference);
}

#[test]
fn test_sink_absorbs_at_threshold() {
    // 0 -> 2, 1 -> 2, and 2 has no out-edges
    let store: GraphStore = vec![Edge::new(0u64, 2u64), Edge::new(1u64, 2u64)]
        .into_iter()
        .collect();
    let mut graph = store.finalize(2).unwrap();
    let report = walk(&mut graph, &config(30, 3, 1.0, 2), 4).unwrap();

    assert_eq!(graph.state(VertexId(2)).unwrap().pagerank, 30);
    assert_eq!(graph.state(VertexId(0)).unwrap().pagerank, 0);
    assert_eq!(graph.state(VertexId(1)).unwrap().pagerank, 0);
    assert_eq!(report.supersteps, 3);
    assert!(report.steps[0].holding_vertices >= 1);
}

#[test]
fn test_isolated_vertex_keeps_its_start() {
    let mut store = GraphStore::new();
    store.add_edge(0u64, 1u64);
    store.add_edge(1u64, 0u64);
    store.add_vertex(7u64);
    let mut graph = store.finalize(2).unwrap();
    walk(&mut graph, &config(30, 5, 1.0, 2), 6).unwrap();

    assert_eq!(graph.state(VertexId(7)).unwrap().pagerank, 10);
    assert_eq!(graph.total_pagerank(), 30);
}

#[test]
fn test_step_cap_strands_units() {
    let mut graph = cycle(10, 2);
    let mut capped = config(100, 6, 1.0, 2);
    capped.max_supersteps = Some(3);
    let report = walk(&mut graph, &capped, 1).unwrap();

    assert!(report.capped);
    assert_eq!(report.supersteps, 3);
    assert_eq!(report.absorbed, 0);
    assert_eq!(report.stranded, 100);
}

#[test]
fn test_engine_rerun_after_reset() {
    let mut graph = cycle(6, 3);
    let params = WalkParams::from_target(60, 6, 2, 1.0).unwrap();
    let options = EngineOptions {
        workers: 3,
        seed: 12,
        max_supersteps: None,
    };

    for _ in 0..2 {
        graph.reset_states();
        let report = {
            let mut engine = Engine::new(&mut graph, params, options).unwrap();
            engine.signal_all(Signal::Start);
            engine.start().unwrap()
        };
        assert_eq!(report.absorbed, 60);
        assert_eq!(scores(&graph), vec![10; 6]);
    }
}
