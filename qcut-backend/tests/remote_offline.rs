//! Remote backend behavior that needs no live service

#![cfg(feature = "remote")]

use qcut_backend::{Backend, BackendError, RemoteBackend, RemoteConfig, RetryPolicy};
use qcut_core::{build_circuit, build_hamiltonian, CancelToken, Graph};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

fn offline_config() -> RemoteConfig {
    // Port 1 on loopback refuses connections
    RemoteConfig::new("token", "test_device")
        .with_api_url("http://127.0.0.1:1")
        .with_request_timeout(Duration::from_millis(2000))
        .with_retry(RetryPolicy::default().with_backoff(Duration::ZERO))
}

#[test]
fn connection_refused_is_transient_network_error() {
    let backend = RemoteBackend::new(offline_config()).unwrap();
    let err = backend.open_session().unwrap_err();
    assert!(err.is_transient(), "unexpected error {:?}", err);
    assert!(backend.session_id().is_none());
}

#[test]
fn close_without_session_is_noop() {
    let backend = RemoteBackend::new(offline_config()).unwrap();
    assert!(backend.close_session().is_ok());
}

#[test]
fn cancelled_token_stops_before_submission() {
    let token = CancelToken::new();
    token.cancel();
    let backend = RemoteBackend::new(offline_config()).unwrap().with_cancel_token(token);

    let cost = build_hamiltonian(&Graph::path(2)).unwrap();
    let err = backend
        .expectation(&build_circuit(2, 1), &cost, &[0.1, 0.2], &mut StdRng::seed_from_u64(0))
        .unwrap_err();
    assert_eq!(err, BackendError::Cancelled);
}

#[test]
fn validation_happens_before_any_request() {
    let backend = RemoteBackend::new(offline_config().with_max_qubits(2)).unwrap();
    let cost = build_hamiltonian(&Graph::path(3)).unwrap();
    let err = backend
        .sample(&build_circuit(3, 1), &cost, &[0.1, 0.2], 100, &mut StdRng::seed_from_u64(0))
        .unwrap_err();
    assert_eq!(err, BackendError::TooManyQubits { num_qubits: 3, max_qubits: 2 });
}

#[test]
fn constant_cost_needs_no_job() {
    let backend = RemoteBackend::new(offline_config()).unwrap();
    let cost = build_hamiltonian(&Graph::from_edges(2, &[])).unwrap();
    let energy = backend
        .expectation(&build_circuit(2, 1), &cost, &[0.1, 0.2], &mut StdRng::seed_from_u64(0))
        .unwrap();
    assert_eq!(energy, 0.0);
}
