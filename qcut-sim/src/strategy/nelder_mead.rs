//! Nelder-Mead simplex search

use super::SearchStrategy;
use crate::objective::Objective;
use qcut_backend::BackendError;
use rand::rngs::StdRng;
use tracing::trace;

/// Nelder-Mead coefficients
#[derive(Debug, Clone)]
pub struct NelderMeadConfig {
    /// Reflection coefficient (default: 1.0)
    pub alpha: f64,

    /// Expansion coefficient (default: 2.0)
    pub gamma: f64,

    /// Contraction coefficient (default: 0.5)
    pub rho: f64,

    /// Shrink coefficient (default: 0.5)
    pub sigma: f64,

    /// Edge length of the initial simplex along each axis, in radians
    /// (default: 0.5)
    pub initial_step: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
            initial_step: 0.5,
        }
    }
}

/// Nelder-Mead simplex optimizer
///
/// Keeps `n + 1` vertices sorted by cost after every step. `spread` is the
/// largest cost gap between any vertex and the best one.
pub struct NelderMead {
    config: NelderMeadConfig,
    simplex: Vec<Vec<f64>>,
    costs: Vec<f64>,
}

impl NelderMead {
    pub fn new(config: NelderMeadConfig) -> Self {
        Self {
            config,
            simplex: Vec::new(),
            costs: Vec::new(),
        }
    }

    /// Vertices, best first
    pub fn simplex(&self) -> &[Vec<f64>] {
        &self.simplex
    }

    fn sort(&mut self) {
        let mut order: Vec<usize> = (0..self.simplex.len()).collect();
        order.sort_by(|&a, &b| self.costs[a].total_cmp(&self.costs[b]));
        self.simplex = order.iter().map(|&i| self.simplex[i].clone()).collect();
        self.costs = order.iter().map(|&i| self.costs[i]).collect();
    }

    /// Centroid of every vertex except the worst
    fn centroid(&self) -> Vec<f64> {
        let n = self.simplex.len() - 1;
        let mut centroid = vec![0.0; self.simplex[0].len()];
        for vertex in &self.simplex[..n] {
            for (c, v) in centroid.iter_mut().zip(vertex) {
                *c += v;
            }
        }
        for c in &mut centroid {
            *c /= n as f64;
        }
        centroid
    }

    /// `centroid + coefficient · (point − centroid)`
    fn along(centroid: &[f64], point: &[f64], coefficient: f64) -> Vec<f64> {
        centroid
            .iter()
            .zip(point)
            .map(|(&c, &p)| c + coefficient * (p - c))
            .collect()
    }

    fn replace_worst(&mut self, point: Vec<f64>, cost: f64) {
        let worst = self.simplex.len() - 1;
        self.simplex[worst] = point;
        self.costs[worst] = cost;
    }
}

impl SearchStrategy for NelderMead {
    fn name(&self) -> &'static str {
        "nelder_mead"
    }

    fn initialize(
        &mut self,
        initial: &[f64],
        objective: &mut Objective<'_>,
        rng: &mut StdRng,
    ) -> Result<(), BackendError> {
        let mut simplex = vec![initial.to_vec()];
        for axis in 0..initial.len() {
            let mut vertex = initial.to_vec();
            vertex[axis] += self.config.initial_step;
            simplex.push(vertex);
        }

        self.costs = objective.evaluate_batch(&simplex, rng)?;
        self.simplex = simplex;
        self.sort();
        Ok(())
    }

    fn step(&mut self, objective: &mut Objective<'_>, rng: &mut StdRng) -> Result<(), BackendError> {
        let n = self.simplex.len() - 1;
        let best = self.costs[0];
        let second_worst = self.costs[n - 1];
        let worst = self.costs[n];
        let centroid = self.centroid();

        let reflected = Self::along(&centroid, &self.simplex[n], -self.config.alpha);
        let reflected_cost = objective.evaluate(&reflected, rng)?;

        if reflected_cost < best {
            let expanded = Self::along(&centroid, &reflected, self.config.gamma);
            let expanded_cost = objective.evaluate(&expanded, rng)?;
            if expanded_cost < reflected_cost {
                trace!("expand");
                self.replace_worst(expanded, expanded_cost);
            } else {
                trace!("reflect");
                self.replace_worst(reflected, reflected_cost);
            }
        } else if reflected_cost < second_worst {
            trace!("reflect");
            self.replace_worst(reflected, reflected_cost);
        } else {
            let contracted = if reflected_cost < worst {
                Self::along(&centroid, &reflected, self.config.rho)
            } else {
                Self::along(&centroid, &self.simplex[n], self.config.rho)
            };
            let contracted_cost = objective.evaluate(&contracted, rng)?;

            if contracted_cost < worst.min(reflected_cost) {
                trace!("contract");
                self.replace_worst(contracted, contracted_cost);
            } else {
                trace!("shrink");
                let anchor = self.simplex[0].clone();
                let shrunk: Vec<Vec<f64>> = self.simplex[1..]
                    .iter()
                    .map(|vertex| Self::along(&anchor, vertex, self.config.sigma))
                    .collect();
                let costs = objective.evaluate_batch(&shrunk, rng)?;
                for (k, (vertex, cost)) in shrunk.into_iter().zip(costs).enumerate() {
                    self.simplex[k + 1] = vertex;
                    self.costs[k + 1] = cost;
                }
            }
        }

        self.sort();
        Ok(())
    }

    fn incumbent(&self) -> (&[f64], f64) {
        (&self.simplex[0], self.costs[0])
    }

    fn spread(&self) -> f64 {
        let best = self.costs[0];
        self.costs
            .iter()
            .map(|c| (c - best).abs())
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflection_geometry() {
        let centroid = [1.0, 1.0];
        let worst = [2.0, 3.0];
        assert_eq!(NelderMead::along(&centroid, &worst, -1.0), vec![0.0, -1.0]);
        assert_eq!(NelderMead::along(&centroid, &worst, 0.5), vec![1.5, 2.0]);
    }

    #[test]
    fn test_centroid_excludes_worst() {
        let mut nm = NelderMead::new(NelderMeadConfig::default());
        nm.simplex = vec![vec![0.0, 0.0], vec![2.0, 0.0], vec![10.0, 10.0]];
        nm.costs = vec![0.0, 1.0, 5.0];
        assert_eq!(nm.centroid(), vec![1.0, 0.0]);
        assert_eq!(nm.spread(), 5.0);
    }
}
