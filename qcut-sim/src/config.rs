//! Pipeline configuration

use crate::strategy::StrategyKind;
use qcut_backend::DEFAULT_MAX_QUBITS;
use qcut_core::ProblemLayer;
use qcut_state::MAX_STATE_QUBITS;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Invalid configuration value
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

/// Configuration for a QAOA Max-Cut run
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// use qcut_sim::QaoaConfig;
///
/// let config = QaoaConfig::from_json_str(r#"{ "reps": 3, "seed": 7 }"#).unwrap();
/// assert_eq!(config.reps, 3);
/// assert_eq!(config.shots, 10_000);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QaoaConfig {
    /// Number of alternating problem/mixer layers
    ///
    /// Default: 2
    pub reps: usize,

    /// Shots drawn for the final histogram
    ///
    /// Default: 10000
    pub shots: usize,

    /// Optimizer iteration limit
    ///
    /// Default: 100
    pub max_iterations: usize,

    /// Convergence threshold on the strategy's spread
    ///
    /// Default: 1e-2
    pub tolerance: f64,

    /// Histogram entries below this probability are ignored by the decoder
    ///
    /// Default: 0.01
    pub epsilon: f64,

    /// RNG seed; `None` draws one from the OS
    ///
    /// Default: None
    pub seed: Option<u64>,

    /// Largest graph accepted, in nodes
    ///
    /// Default: 20 (hard cap 26)
    pub max_qubits: usize,

    /// Derivative-free search strategy
    ///
    /// Default: Nelder-Mead
    pub strategy: StrategyKind,

    /// Problem-layer variant of the ansatz
    ///
    /// Default: cost phase
    pub problem_layer: ProblemLayer,
}

impl Default for QaoaConfig {
    fn default() -> Self {
        Self {
            reps: 2,
            shots: 10_000,
            max_iterations: 100,
            tolerance: 1e-2,
            epsilon: 0.01,
            seed: None,
            max_qubits: DEFAULT_MAX_QUBITS,
            strategy: StrategyKind::default(),
            problem_layer: ProblemLayer::default(),
        }
    }
}

impl QaoaConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_reps(mut self, reps: usize) -> Self {
        self.reps = reps;
        self
    }

    pub fn with_shots(mut self, shots: usize) -> Self {
        self.shots = shots;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_qubits(mut self, max_qubits: usize) -> Self {
        self.max_qubits = max_qubits;
        self
    }

    pub fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_problem_layer(mut self, layer: ProblemLayer) -> Self {
        self.problem_layer = layer;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reps == 0 {
            return Err(ConfigError::invalid("reps", "must be at least 1"));
        }
        if self.shots == 0 {
            return Err(ConfigError::invalid("shots", "must be at least 1"));
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::invalid("max_iterations", "must be at least 1"));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(ConfigError::invalid(
                "tolerance",
                format!("must be positive and finite, got {}", self.tolerance),
            ));
        }
        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(ConfigError::invalid(
                "epsilon",
                format!("must lie in [0, 1], got {}", self.epsilon),
            ));
        }
        if self.max_qubits == 0 || self.max_qubits > MAX_STATE_QUBITS {
            return Err(ConfigError::invalid(
                "max_qubits",
                format!("must lie in 1..={}, got {}", MAX_STATE_QUBITS, self.max_qubits),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = QaoaConfig::default();
        assert_eq!(config.reps, 2);
        assert_eq!(config.shots, 10_000);
        assert_eq!(config.max_iterations, 100);
        assert_eq!(config.tolerance, 1e-2);
        assert_eq!(config.epsilon, 0.01);
        assert_eq!(config.seed, None);
        assert_eq!(config.max_qubits, 20);
        assert_eq!(config.strategy, StrategyKind::NelderMead);
        assert_eq!(config.problem_layer, ProblemLayer::CostPhase);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = QaoaConfig::new()
            .with_reps(3)
            .with_shots(500)
            .with_seed(9)
            .with_strategy(StrategyKind::CoordinateSearch);
        assert_eq!(config.reps, 3);
        assert_eq!(config.shots, 500);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.strategy, StrategyKind::CoordinateSearch);
    }

    #[test]
    fn test_validation() {
        assert!(QaoaConfig::new().with_reps(0).validate().is_err());
        assert!(QaoaConfig::new().with_shots(0).validate().is_err());
        assert!(QaoaConfig::new().with_tolerance(0.0).validate().is_err());
        assert!(QaoaConfig::new().with_tolerance(f64::NAN).validate().is_err());
        assert!(QaoaConfig::new().with_epsilon(1.5).validate().is_err());
        assert!(QaoaConfig::new().with_max_qubits(27).validate().is_err());
        assert!(QaoaConfig::new().with_epsilon(0.0).validate().is_ok());
    }

    #[test]
    fn test_from_json() {
        let config = QaoaConfig::from_json_str(
            r#"{ "strategy": "coordinate_search", "problem_layer": "local_z", "epsilon": 0.05 }"#,
        )
        .unwrap();
        assert_eq!(config.strategy, StrategyKind::CoordinateSearch);
        assert_eq!(config.problem_layer, ProblemLayer::LocalZ);
        assert_eq!(config.epsilon, 0.05);
        assert_eq!(config.reps, 2);

        assert!(matches!(
            QaoaConfig::from_json_str(r#"{ "reps": 0 }"#),
            Err(ConfigError::InvalidValue { field: "reps", .. })
        ));
        assert!(matches!(
            QaoaConfig::from_json_str("not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_json_roundtrip() {
        let config = QaoaConfig::new().with_seed(3).with_reps(4);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(QaoaConfig::from_json_str(&json).unwrap(), config);
    }
}
