//! Build and query tolerances for the trim tree.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrimTreeError};

/// Subdivision and solver parameters.
///
/// Fixed for the lifetime of a built tree; the solver settings are read by
/// every query against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrimTreeConfig {
    /// Split at the midpoint when the dot product of the unit endpoint
    /// tangents falls below this value.
    pub flatness_threshold: f64,
    /// Split at the midpoint when the chord exceeds this multiple of the
    /// surface parameter-domain diagonal.
    pub relative_size_factor: f64,
    /// Subdivision depth at which a node becomes a leaf unconditionally.
    pub max_depth: usize,
    /// Parameter distance under which a split point counts as coinciding
    /// with an interval end.
    pub parameter_tolerance: f64,
    /// Iteration cap for the horizontal/vertical tangent search.
    pub tangent_max_iterations: usize,
    /// Accepted `|u(t) - u|` residual when solving a leaf for `v(u)`.
    pub solver_tolerance: f64,
    /// Iteration cap for the `v(u)` solver.
    pub solver_max_iterations: usize,
}

impl Default for TrimTreeConfig {
    fn default() -> Self {
        Self {
            flatness_threshold: 0.95,
            relative_size_factor: 0.1,
            max_depth: 64,
            parameter_tolerance: 1e-10,
            tangent_max_iterations: 100,
            solver_tolerance: 1e-9,
            solver_max_iterations: 1000,
        }
    }
}

impl TrimTreeConfig {
    /// Parse a config from TOML. Missing fields take their defaults.
    ///
    /// ```
    /// use trimtree::TrimTreeConfig;
    ///
    /// let config = TrimTreeConfig::from_toml_str("solver_tolerance = 1e-6").unwrap();
    /// assert_eq!(config.solver_tolerance, 1e-6);
    /// assert_eq!(config.max_depth, 64);
    /// ```
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !(self.flatness_threshold > -1.0 && self.flatness_threshold <= 1.0) {
            return Err(TrimTreeError::InvalidConfig(
                "flatness_threshold must be in (-1, 1]".into(),
            ));
        }
        if !(self.relative_size_factor > 0.0) {
            return Err(TrimTreeError::InvalidConfig(
                "relative_size_factor must be positive".into(),
            ));
        }
        if self.max_depth == 0 || self.max_depth > 128 {
            return Err(TrimTreeError::InvalidConfig(
                "max_depth must be between 1 and 128".into(),
            ));
        }
        if !(self.parameter_tolerance > 0.0 && self.parameter_tolerance.is_finite()) {
            return Err(TrimTreeError::InvalidConfig(
                "parameter_tolerance must be positive".into(),
            ));
        }
        if !(self.solver_tolerance > 0.0 && self.solver_tolerance.is_finite()) {
            return Err(TrimTreeError::InvalidConfig(
                "solver_tolerance must be positive".into(),
            ));
        }
        if self.tangent_max_iterations == 0 || self.solver_max_iterations == 0 {
            return Err(TrimTreeError::InvalidConfig(
                "iteration limits must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
