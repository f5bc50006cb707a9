//! End-to-end partitioning on small graphs with known optima

use approx::assert_abs_diff_eq;
use qcut_backend::{ExactSimulator, SamplingSimulator};
use qcut_core::{build_circuit, build_hamiltonian, Graph};
use qcut_sim::{decode, sample, DecodeError, MaxCutSolver, QaoaConfig, StrategyKind};
use qcut_state::SampleHistogram;

#[test]
fn single_edge_nodes_end_up_in_different_groups() {
    let graph = Graph::from_id_edges(&["u", "v"], &[("u", "v", 1.0)]).unwrap();
    for seed in [1, 2, 3] {
        let solver = MaxCutSolver::new(QaoaConfig::new().with_seed(seed));
        let solution = solver.solve(&graph, &ExactSimulator::new()).unwrap();

        assert!(
            (solution.expected_cut - 1.0).abs() <= 0.1,
            "seed {} expected cut {}",
            seed,
            solution.expected_cut
        );
        assert!(solution.partition.separates("u", "v"));
        assert_eq!(solution.cut_value, 1.0);
    }
}

#[test]
fn triangle_cuts_two_edges() {
    let graph = Graph::complete(3);
    let solver = MaxCutSolver::new(QaoaConfig::new().with_seed(5));
    let solution = solver.solve(&graph, &ExactSimulator::new()).unwrap();

    assert!(solution.expected_cut > 1.5);
    assert_eq!(solution.cut_value, 2.0);
    let (zeros, ones) = solution.partition.groups();
    assert_eq!(zeros.len().min(ones.len()), 1);
}

#[test]
fn coordinate_search_solves_the_triangle() {
    let config = QaoaConfig::new()
        .with_seed(8)
        .with_strategy(StrategyKind::CoordinateSearch);
    let solution = MaxCutSolver::new(config)
        .solve(&Graph::complete(3), &ExactSimulator::new())
        .unwrap();
    assert_eq!(solution.cut_value, 2.0);
}

#[test]
fn sampling_backend_finds_the_square_cut() {
    // 4-cycle: the alternating assignments cut every edge
    let graph = Graph::cycle(4);
    let config = QaoaConfig::new().with_seed(13).with_shots(4000);
    let solution = MaxCutSolver::new(config)
        .solve(&graph, &SamplingSimulator::new(2000))
        .unwrap();

    assert!(solution.expected_cut > 2.0);
    assert!(solution.cut_value >= 3.0);
}

#[test]
fn weighted_graph_prefers_heavy_edges() {
    // Path a-b-c with a light edge a-c: best cut separates b from a and c
    let graph = Graph::from_id_edges(
        &["a", "b", "c"],
        &[("a", "b", 3.0), ("b", "c", 3.0), ("a", "c", 0.5)],
    )
    .unwrap();
    let solution = MaxCutSolver::new(QaoaConfig::new().with_seed(4))
        .solve(&graph, &ExactSimulator::new())
        .unwrap();

    assert_eq!(solution.cut_value, 6.0);
    assert!(solution.partition.separates("a", "b"));
    assert!(!solution.partition.separates("a", "c"));
}

#[test]
fn edgeless_graph_still_yields_a_partition() {
    let graph = Graph::from_id_edges::<&str>(&["x", "y", "z"], &[]).unwrap();
    let solution = MaxCutSolver::new(QaoaConfig::new().with_seed(2))
        .solve(&graph, &ExactSimulator::new())
        .unwrap();

    assert_eq!(solution.cut_value, 0.0);
    assert_eq!(solution.partition.assignments().len(), 3);
    assert_eq!(solution.partition.bitstring().len(), 3);
    for assignment in solution.partition.assignments() {
        assert!(assignment.group <= 1);
        assert!((0.0..=1.0).contains(&assignment.confidence));
    }
}

#[test]
fn equal_seeds_give_identical_histograms() {
    let cost = build_hamiltonian(&Graph::cycle(5)).unwrap();
    let circuit = build_circuit(5, 2);
    let params = [0.4, 1.1, -0.3, 0.7];
    let backend = ExactSimulator::new();

    let a = sample(&backend, &circuit, &cost, &params, 5000, Some(99)).unwrap();
    let b = sample(&backend, &circuit, &cost, &params, 5000, Some(99)).unwrap();
    let c = sample(&backend, &circuit, &cost, &params, 5000, Some(100)).unwrap();

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_abs_diff_eq!(a.total(), 1.0, epsilon = 1e-9);
    assert_eq!(a.shots(), Some(5000));
}

#[test]
fn tie_resolves_to_smallest_bitstring() {
    let histogram = SampleHistogram::from_counts(2, &[0, 50, 50, 0]).unwrap();
    let partition = decode(&histogram, &["p".to_string(), "q".to_string()], 0.01).unwrap();
    assert_eq!(partition.bitstring(), "01");
    assert_eq!(partition.group("p"), Some(0));
    assert_eq!(partition.group("q"), Some(1));
}

#[test]
fn everything_below_threshold_is_an_error() {
    let counts: Vec<usize> = vec![1; 16];
    let histogram = SampleHistogram::from_counts(4, &counts).unwrap();
    let ids: Vec<String> = (0..4).map(|i| format!("n{}", i)).collect();

    let err = decode(&histogram, &ids, 0.1).unwrap_err();
    assert!(matches!(err, DecodeError::AllBelowThreshold { .. }));
}

#[test]
fn solution_serializes_to_json() {
    let graph = Graph::from_id_edges(&["a", "b"], &[("a", "b", 1.0)]).unwrap();
    let solution = MaxCutSolver::new(QaoaConfig::new().with_seed(6).with_shots(500))
        .solve(&graph, &ExactSimulator::new())
        .unwrap();

    let json = serde_json::to_value(&solution).unwrap();
    assert_eq!(json["partition"]["bitstring"], solution.partition.bitstring());
    assert!(json["optimization"]["trace"]["records"].is_array());
}
