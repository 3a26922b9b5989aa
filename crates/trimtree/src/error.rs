//! Error and diagnostic types for the trim tree.

use thiserror::Error;

/// Errors that stop a tree from being built.
#[derive(Error, Debug)]
pub enum TrimTreeError {
    /// Config values out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Config text is not valid TOML for [`TrimTreeConfig`](crate::TrimTreeConfig).
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

/// Result type for trim tree operations.
pub type Result<T> = std::result::Result<T, TrimTreeError>;

/// Non-fatal problems found while building a tree.
///
/// The build always completes; these are kept on the tree and logged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildDiagnostic {
    /// A trim curve with `t_min >= t_max` (or a non-finite domain) was left out.
    #[error("trim {trim_index} of loop {loop_index} has degenerate domain [{t_min}, {t_max}]; excluded")]
    DegenerateDomain {
        /// Loop position in the face.
        loop_index: usize,
        /// Trim position in the loop.
        trim_index: usize,
        /// Reported domain start.
        t_min: f64,
        /// Reported domain end.
        t_max: f64,
    },

    /// The tangent search hit its iteration cap; the best estimate was used.
    #[error("tangent search on trim {trim_index} of loop {loop_index} stopped after {iterations} iterations in [{t_min}, {t_max}]")]
    TangentNotConverged {
        /// Loop position in the face.
        loop_index: usize,
        /// Trim position in the loop.
        trim_index: usize,
        /// Interval start.
        t_min: f64,
        /// Interval end.
        t_max: f64,
        /// Iterations spent.
        iterations: usize,
    },

    /// Subdivision reached the depth cap; the node was made a leaf.
    #[error("trim {trim_index} of loop {loop_index} reached depth {depth} at [{t_min}, {t_max}]")]
    DepthLimit {
        /// Loop position in the face.
        loop_index: usize,
        /// Trim position in the loop.
        trim_index: usize,
        /// Interval start.
        t_min: f64,
        /// Interval end.
        t_max: f64,
        /// Depth of the node.
        depth: usize,
    },

    /// A box was inconsistent after propagation and was widened to cover the plane.
    #[error("node {node} has an inconsistent bounding box; widened")]
    InvalidBox {
        /// Arena index of the node.
        node: usize,
    },
}
