//! Compass search along the coordinate axes

use super::SearchStrategy;
use crate::objective::Objective;
use qcut_backend::BackendError;
use rand::rngs::StdRng;
use tracing::trace;

/// Compass-search settings
#[derive(Debug, Clone)]
pub struct CoordinateSearchConfig {
    /// Initial poll distance in radians (default: 0.5)
    pub initial_step: f64,

    /// Step multiplier after an unsuccessful poll (default: 0.5)
    pub contraction: f64,
}

impl Default for CoordinateSearchConfig {
    fn default() -> Self {
        Self {
            initial_step: 0.5,
            contraction: 0.5,
        }
    }
}

/// Compass (pattern) search
///
/// Each iteration polls `x ± step·e_k` for every axis `k` concurrently and
/// moves to the best poll point if it improves on the incumbent; otherwise
/// the step shrinks. `spread` is the largest cost deviation among the last
/// poll, which vanishes as the step does.
pub struct CoordinateSearch {
    config: CoordinateSearchConfig,
    point: Vec<f64>,
    cost: f64,
    step: f64,
    spread: f64,
}

impl CoordinateSearch {
    pub fn new(config: CoordinateSearchConfig) -> Self {
        let step = config.initial_step;
        Self {
            config,
            point: Vec::new(),
            cost: f64::INFINITY,
            step,
            spread: f64::INFINITY,
        }
    }

    /// Current poll distance
    pub fn step_size(&self) -> f64 {
        self.step
    }

    fn poll_points(&self) -> Vec<Vec<f64>> {
        let mut points = Vec::with_capacity(2 * self.point.len());
        for axis in 0..self.point.len() {
            for sign in [1.0, -1.0] {
                let mut p = self.point.clone();
                p[axis] += sign * self.step;
                points.push(p);
            }
        }
        points
    }
}

impl SearchStrategy for CoordinateSearch {
    fn name(&self) -> &'static str {
        "coordinate_search"
    }

    fn initialize(
        &mut self,
        initial: &[f64],
        objective: &mut Objective<'_>,
        rng: &mut StdRng,
    ) -> Result<(), BackendError> {
        self.point = initial.to_vec();
        self.cost = objective.evaluate(initial, rng)?;
        self.step = self.config.initial_step;
        self.spread = f64::INFINITY;
        Ok(())
    }

    fn step(&mut self, objective: &mut Objective<'_>, rng: &mut StdRng) -> Result<(), BackendError> {
        let points = self.poll_points();
        let costs = objective.evaluate_batch(&points, rng)?;

        self.spread = costs
            .iter()
            .map(|c| (c - self.cost).abs())
            .fold(0.0, f64::max);

        let best = costs
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(b.1))
            .map(|(k, &c)| (k, c));

        match best {
            Some((k, c)) if c < self.cost => {
                trace!(step = self.step, "move");
                self.point = points[k].clone();
                self.cost = c;
            },
            _ => {
                self.step *= self.config.contraction;
                trace!(step = self.step, "contract");
            },
        }
        Ok(())
    }

    fn incumbent(&self) -> (&[f64], f64) {
        (&self.point, self.cost)
    }

    fn spread(&self) -> f64 {
        self.spread
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_pattern() {
        let mut cs = CoordinateSearch::new(CoordinateSearchConfig::default());
        cs.point = vec![1.0, 2.0];
        let points = cs.poll_points();
        assert_eq!(
            points,
            vec![vec![1.5, 2.0], vec![0.5, 2.0], vec![1.0, 2.5], vec![1.0, 1.5]]
        );
    }
}
