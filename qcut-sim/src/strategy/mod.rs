//! Derivative-free search strategies
//!
//! A strategy owns its search state (simplex, incumbent, step size) and
//! advances it one iteration at a time through an [`Objective`]. The
//! optimizer loop decides when to stop by asking for [`SearchStrategy::spread`].

mod coordinate_search;
mod nelder_mead;

pub use coordinate_search::{CoordinateSearch, CoordinateSearchConfig};
pub use nelder_mead::{NelderMead, NelderMeadConfig};

use crate::objective::Objective;
use qcut_backend::BackendError;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Available strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Simplex search (reflection, expansion, contraction, shrink)
    #[default]
    NelderMead,
    /// Compass search along the coordinate axes
    CoordinateSearch,
}

impl StrategyKind {
    /// Fresh strategy with default coefficients
    pub fn build(self) -> Box<dyn SearchStrategy> {
        match self {
            StrategyKind::NelderMead => Box::new(NelderMead::new(NelderMeadConfig::default())),
            StrategyKind::CoordinateSearch => {
                Box::new(CoordinateSearch::new(CoordinateSearchConfig::default()))
            },
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::NelderMead => write!(f, "nelder_mead"),
            StrategyKind::CoordinateSearch => write!(f, "coordinate_search"),
        }
    }
}

/// Iterative derivative-free minimizer
pub trait SearchStrategy: Send {
    /// Strategy name for logs
    fn name(&self) -> &'static str;

    /// Evaluate the starting configuration around `initial`
    fn initialize(
        &mut self,
        initial: &[f64],
        objective: &mut Objective<'_>,
        rng: &mut StdRng,
    ) -> Result<(), BackendError>;

    /// Run one iteration: propose, evaluate, accept or reject
    fn step(&mut self, objective: &mut Objective<'_>, rng: &mut StdRng) -> Result<(), BackendError>;

    /// Best point currently held by the strategy
    fn incumbent(&self) -> (&[f64], f64);

    /// Remaining-improvement measure; the run converges once it drops below
    /// the tolerance
    fn spread(&self) -> f64;
}
