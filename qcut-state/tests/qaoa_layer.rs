//! One QAOA layer on a single edge, checked against the closed form
//!
//! For `H = ½ Z₀Z₁` starting from `|++⟩`, one layer `e^{−iβΣX} e^{−iγH}`
//! gives `⟨Z₀Z₁⟩ = sin(4β)·sin(γ)`.

use approx::assert_relative_eq;
use qcut_state::{sample_counts, DenseState, SampleHistogram};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn single_edge_layer(gamma: f64, beta: f64) -> DenseState {
    let energies = [0.5, -0.5, -0.5, 0.5];
    let mut state = DenseState::uniform_superposition(2).unwrap();
    state.apply_phase_diagonal(&energies, gamma).unwrap();
    state.apply_rx(0, 2.0 * beta).unwrap();
    state.apply_rx(1, 2.0 * beta).unwrap();
    state
}

#[test]
fn single_layer_matches_closed_form() {
    let zz = [1.0, -1.0, -1.0, 1.0];
    for &(gamma, beta) in &[(0.3, 0.2), (1.1, -0.4), (2.5, 0.9), (0.0, 0.7)] {
        let state = single_edge_layer(gamma, beta);
        assert!(state.is_normalized(1e-12));
        let value = state.expectation_diagonal(&zz).unwrap();
        let expected = (4.0 * beta).sin() * gamma.sin();
        assert_relative_eq!(value, expected, epsilon = 1e-10);
    }
}

#[test]
fn optimal_angles_give_perfect_cut() {
    let state = single_edge_layer(std::f64::consts::FRAC_PI_2, 3.0 * std::f64::consts::FRAC_PI_8);
    let hist = SampleHistogram::from_probabilities(2, &state.probabilities()).unwrap();
    assert_relative_eq!(hist.probability("01") + hist.probability("10"), 1.0, epsilon = 1e-10);
}

#[test]
fn sampled_histogram_is_reproducible() {
    let state = single_edge_layer(0.8, 0.3);
    let probs = state.probabilities();

    let a = sample_counts(&probs, 2000, &mut StdRng::seed_from_u64(11)).unwrap();
    let b = sample_counts(&probs, 2000, &mut StdRng::seed_from_u64(11)).unwrap();
    let ha = SampleHistogram::from_counts(2, &a).unwrap();
    let hb = SampleHistogram::from_counts(2, &b).unwrap();
    assert_eq!(ha, hb);
    assert_relative_eq!(ha.total(), 1.0, epsilon = 1e-9);
}
