#![warn(missing_docs)]

//! Trim-curve subdivision trees and point containment for trimmed faces.
//!
//! A trimmed B-rep face is a surface patch restricted by closed loops of
//! curves in its `(u, v)` parameter space. [`CurveTree`] indexes those
//! loops once so that "is this parameter point trimmed away?" can be
//! answered by a ray cast that touches O(log N) curve pieces per loop.
//!
//! Construction has 3 stages:
//! 1. **Subdivide**: split each trim at knots, horizontal and vertical
//!    tangents, and wherever it is too curved or too long
//! 2. **Propagate**: union leaf boxes up to trim roots and loop boxes
//! 3. **Check**: widen any inconsistent box so queries stay conservative
//!
//! ```
//! use trimtree::{CurveTree, FaceTrims, Point2};
//!
//! let mut face = FaceTrims::new(((0.0, 10.0), (0.0, 10.0)));
//! face.add_polygon(&[
//!     Point2::new(0.0, 0.0),
//!     Point2::new(10.0, 0.0),
//!     Point2::new(10.0, 10.0),
//!     Point2::new(0.0, 10.0),
//! ]);
//!
//! let tree = CurveTree::build(&face);
//! assert!(!tree.is_trimmed(5.0, 5.0));
//! assert!(tree.is_trimmed(-1.0, 5.0));
//! ```

mod arena;
mod build;
pub mod config;
pub mod error;
pub mod face;
mod query;
mod tree;

pub use arena::NodeId;
pub use config::TrimTreeConfig;
pub use error::{BuildDiagnostic, Result, TrimTreeError};
pub use face::{FaceTrims, TrimmedFace};
pub use query::QueryStats;
pub use tree::{build_many, CurveTree, TrimNodeView, TrimSource};

pub use trimtree_geom::{Circle2d, Curve2d, Line2d};
pub use trimtree_math::{Aabb2, Point2, Vec2};
