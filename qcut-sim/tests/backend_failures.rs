//! Failure paths: sessions are released and backend errors surface unchanged

use parking_lot::Mutex;
use qcut_backend::{
    Backend, BackendError, BackendKind, ExactSimulator, Result as BackendResult, RetryPolicy,
};
use qcut_core::{build_circuit, build_hamiltonian, AnsatzCircuit, CancelToken, CostHamiltonian, Graph};
use qcut_sim::{optimize, MaxCutSolver, OptimizerConfig, QaoaConfig, SolveError};
use qcut_state::SampleHistogram;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Exact simulator that logs session events and fails on demand
struct Scripted {
    inner: ExactSimulator,
    events: Mutex<Vec<&'static str>>,
    expectation_calls: AtomicUsize,
    /// Fail the expectation call with this 1-based index
    fail_expectation_at: Option<usize>,
    fail_sample: bool,
    /// Transient failures before each expectation succeeds
    flaky: Option<RetryPolicy>,
    failures: AtomicUsize,
    cancel_after: Option<(usize, CancelToken)>,
    bound: Mutex<Option<CancelToken>>,
}

impl Scripted {
    fn new() -> Self {
        Self {
            inner: ExactSimulator::new(),
            events: Mutex::new(Vec::new()),
            expectation_calls: AtomicUsize::new(0),
            fail_expectation_at: None,
            fail_sample: false,
            flaky: None,
            failures: AtomicUsize::new(0),
            cancel_after: None,
            bound: Mutex::new(None),
        }
    }

    fn events(&self) -> Vec<&'static str> {
        self.events.lock().clone()
    }

    fn failing_job() -> BackendError {
        BackendError::JobFailed {
            job_id: "job-7".to_string(),
            reason: "device calibration".to_string(),
        }
    }
}

impl Backend for Scripted {
    fn name(&self) -> &str {
        "scripted"
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Remote
    }

    fn max_qubits(&self) -> usize {
        self.inner.max_qubits()
    }

    fn expectation(
        &self,
        circuit: &AnsatzCircuit,
        cost: &CostHamiltonian,
        params: &[f64],
        rng: &mut StdRng,
    ) -> BackendResult<f64> {
        let call = self.expectation_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_expectation_at == Some(call) {
            return Err(Self::failing_job());
        }
        if let Some((after, ref token)) = self.cancel_after {
            if call >= after {
                token.cancel();
            }
        }
        match self.flaky {
            Some(policy) => policy.run("expectation", |attempt| {
                if attempt == 1 {
                    self.failures.fetch_add(1, Ordering::SeqCst);
                    return Err(BackendError::Network("connection reset".to_string()));
                }
                self.inner.expectation(circuit, cost, params, rng)
            }),
            None => self.inner.expectation(circuit, cost, params, rng),
        }
    }

    fn sample(
        &self,
        circuit: &AnsatzCircuit,
        cost: &CostHamiltonian,
        params: &[f64],
        shots: usize,
        rng: &mut StdRng,
    ) -> BackendResult<SampleHistogram> {
        if self.fail_sample {
            return Err(BackendError::Unavailable("maintenance window".to_string()));
        }
        self.inner.sample(circuit, cost, params, shots, rng)
    }

    fn open_session(&self) -> BackendResult<()> {
        self.events.lock().push("open");
        Ok(())
    }

    fn close_session(&self) -> BackendResult<()> {
        self.events.lock().push("close");
        Ok(())
    }

    fn bind_cancel_token(&self, token: &CancelToken) {
        *self.bound.lock() = Some(token.clone());
    }
}

fn edge() -> Graph {
    Graph::from_id_edges(&["a", "b"], &[("a", "b", 1.0)]).unwrap()
}

fn solver() -> MaxCutSolver {
    MaxCutSolver::new(QaoaConfig::new().with_seed(17).with_shots(200))
}

#[test]
fn session_released_after_success() {
    let backend = Scripted::new();
    solver().solve(&edge(), &backend).unwrap();
    assert_eq!(backend.events(), vec!["open", "close"]);
}

#[test]
fn optimizer_failure_propagates_unchanged_and_releases_session() {
    let mut backend = Scripted::new();
    backend.fail_expectation_at = Some(9);

    let err = solver().solve(&edge(), &backend).unwrap_err();
    assert_eq!(err, SolveError::Backend(Scripted::failing_job()));
    assert_eq!(backend.events(), vec!["open", "close"]);
}

#[test]
fn sampling_failure_releases_session() {
    let mut backend = Scripted::new();
    backend.fail_sample = true;

    let err = solver().solve(&edge(), &backend).unwrap_err();
    assert_eq!(
        err,
        SolveError::Backend(BackendError::Unavailable("maintenance window".to_string()))
    );
    assert_eq!(backend.events(), vec!["open", "close"]);
}

#[test]
fn invalid_graph_never_opens_a_session() {
    let backend = Scripted::new();
    let graph = Graph::from_edges(2, &[(0, 1, 1.0), (1, 0, 1.0)]);
    let err = solver().solve(&graph, &backend).unwrap_err();
    assert!(matches!(err, SolveError::Graph(_)));
    assert!(backend.events().is_empty());
}

#[test]
fn cancellation_stops_the_run() {
    let token = CancelToken::new();
    let mut backend = Scripted::new();
    backend.cancel_after = Some((6, token.clone()));

    let err = solver()
        .with_cancel_token(token)
        .solve(&edge(), &backend)
        .unwrap_err();
    assert_eq!(err, SolveError::Backend(BackendError::Cancelled));
    assert_eq!(backend.events(), vec!["open", "close"]);
    assert!(backend.expectation_calls.load(Ordering::SeqCst) < 12);

    // The backend saw the same token, so long-running calls can stop too
    let bound = backend.bound.lock().clone();
    assert!(bound.map_or(false, |t| t.is_cancelled()));
}

#[test]
fn no_token_is_bound_without_cancellation() {
    let backend = Scripted::new();
    solver().solve(&edge(), &backend).unwrap();
    assert!(backend.bound.lock().is_none());
}

#[test]
fn transient_failures_are_retried() {
    let mut backend = Scripted::new();
    backend.flaky = Some(
        RetryPolicy::default()
            .with_max_attempts(2)
            .with_backoff(Duration::ZERO),
    );

    let solution = solver().solve(&edge(), &backend).unwrap();
    assert_eq!(solution.cut_value, 1.0);
    assert_eq!(
        backend.failures.load(Ordering::SeqCst),
        backend.expectation_calls.load(Ordering::SeqCst)
    );
}

#[test]
fn exhausted_retries_surface_the_transient_error() {
    let mut backend = Scripted::new();
    backend.flaky = Some(RetryPolicy::none());

    let err = solver().solve(&edge(), &backend).unwrap_err();
    assert_eq!(
        err,
        SolveError::Backend(BackendError::Network("connection reset".to_string()))
    );
}

#[test]
fn best_so_far_never_worsens() {
    let cost = build_hamiltonian(&Graph::cycle(4)).unwrap();
    let circuit = build_circuit(4, 2);
    let mut rng = StdRng::seed_from_u64(23);
    let result = optimize(
        &ExactSimulator::new(),
        &circuit,
        &cost,
        &OptimizerConfig::default(),
        &mut rng,
    )
    .unwrap();

    let best = result.trace.best_so_far();
    assert_eq!(best.len(), result.evaluations);
    assert!(best.windows(2).all(|w| w[1] <= w[0]));
    assert_eq!(best.last().copied(), Some(result.best_cost));
}

#[test]
fn wrong_initial_parameters_rejected() {
    let cost = build_hamiltonian(&edge()).unwrap();
    let circuit = build_circuit(2, 2);
    let config = OptimizerConfig::default().with_initial_params(vec![0.1, 0.2]);
    let mut rng = StdRng::seed_from_u64(0);

    let err = optimize(&ExactSimulator::new(), &circuit, &cost, &config, &mut rng).unwrap_err();
    assert!(matches!(err, BackendError::InvalidParameters(_)));
}
