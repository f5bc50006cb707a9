//! Cost function seen by the search strategies
//!
//! Wraps a backend call `θ ↦ ⟨E⟩(θ)`, records every evaluation in the trace,
//! tracks the best point seen so far and honors cancellation.

use qcut_backend::{Backend, BackendError};
use qcut_core::{AnsatzCircuit, CancelToken, CostHamiltonian};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// One expectation evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    /// Optimizer iteration the evaluation belongs to (0 = initialization)
    pub iteration: usize,
    pub params: Vec<f64>,
    pub cost: f64,
}

/// Every evaluation of a run, in evaluation order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizationTrace {
    records: Vec<EvaluationRecord>,
}

impl OptimizationTrace {
    pub fn records(&self) -> &[EvaluationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Running minimum of the cost after each evaluation
    pub fn best_so_far(&self) -> Vec<f64> {
        self.records
            .iter()
            .scan(f64::INFINITY, |best, record| {
                if record.cost < *best {
                    *best = record.cost;
                }
                Some(*best)
            })
            .collect()
    }

    fn push(&mut self, record: EvaluationRecord) {
        self.records.push(record);
    }
}

/// Best point observed so far; never worsens
#[derive(Debug, Clone)]
pub struct BestTracker {
    cost: f64,
    params: Vec<f64>,
}

impl BestTracker {
    fn new() -> Self {
        Self {
            cost: f64::INFINITY,
            params: Vec::new(),
        }
    }

    /// Returns `true` on a strict improvement
    fn update(&mut self, cost: f64, params: &[f64]) -> bool {
        if cost < self.cost {
            self.cost = cost;
            self.params = params.to_vec();
            true
        } else {
            false
        }
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn params(&self) -> &[f64] {
        &self.params
    }
}

/// Expectation objective over a fixed circuit and cost Hamiltonian
pub struct Objective<'a> {
    backend: &'a dyn Backend,
    circuit: &'a AnsatzCircuit,
    cost: &'a CostHamiltonian,
    cancel: Option<CancelToken>,
    iteration: usize,
    trace: OptimizationTrace,
    best: BestTracker,
}

impl<'a> Objective<'a> {
    pub fn new(
        backend: &'a dyn Backend,
        circuit: &'a AnsatzCircuit,
        cost: &'a CostHamiltonian,
    ) -> Self {
        Self {
            backend,
            circuit,
            cost,
            cancel: None,
            iteration: 0,
            trace: OptimizationTrace::default(),
            best: BestTracker::new(),
        }
    }

    /// Stop with [`BackendError::Cancelled`] once `cancel` fires
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Parameter-vector length
    pub fn dimension(&self) -> usize {
        self.circuit.num_parameters()
    }

    /// Tag subsequent evaluations with `iteration`
    pub fn set_iteration(&mut self, iteration: usize) {
        self.iteration = iteration;
    }

    pub fn evaluations(&self) -> usize {
        self.trace.len()
    }

    pub fn best(&self) -> &BestTracker {
        &self.best
    }

    pub fn trace(&self) -> &OptimizationTrace {
        &self.trace
    }

    pub fn into_parts(self) -> (OptimizationTrace, BestTracker) {
        (self.trace, self.best)
    }

    fn check_cancelled(&self) -> Result<(), BackendError> {
        match self.cancel {
            Some(ref token) if token.is_cancelled() => Err(BackendError::Cancelled),
            _ => Ok(()),
        }
    }

    fn record(&mut self, params: &[f64], cost: f64) {
        self.best.update(cost, params);
        self.trace.push(EvaluationRecord {
            iteration: self.iteration,
            params: params.to_vec(),
            cost,
        });
    }

    /// Evaluate one point
    pub fn evaluate(&mut self, params: &[f64], rng: &mut StdRng) -> Result<f64, BackendError> {
        self.check_cancelled()?;
        let cost = self
            .backend
            .expectation(self.circuit, self.cost, params, rng)?;
        self.record(params, cost);
        Ok(cost)
    }

    /// Evaluate independent points concurrently
    ///
    /// Each point gets a child RNG seeded from `rng` in point order, so the
    /// results do not depend on scheduling. Records are appended in point
    /// order; the first error in point order is returned and nothing from the
    /// batch is recorded.
    pub fn evaluate_batch(
        &mut self,
        points: &[Vec<f64>],
        rng: &mut StdRng,
    ) -> Result<Vec<f64>, BackendError> {
        self.check_cancelled()?;
        let seeds: Vec<u64> = points.iter().map(|_| rng.gen()).collect();

        let backend = self.backend;
        let circuit = self.circuit;
        let cost = self.cost;
        let results: Vec<Result<f64, BackendError>> = points
            .par_iter()
            .zip(seeds.par_iter())
            .map(|(params, &seed)| {
                let mut child = StdRng::seed_from_u64(seed);
                backend.expectation(circuit, cost, params, &mut child)
            })
            .collect();

        let values = results.into_iter().collect::<Result<Vec<f64>, _>>()?;
        for (params, &value) in points.iter().zip(&values) {
            self.record(params, value);
        }
        Ok(values)
    }
}
