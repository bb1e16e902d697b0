#![warn(missing_docs)]

//! Orientation and pose math for the rigidkit simulation substrate.
//!
//! Thin wrappers around nalgebra storage providing the quaternion,
//! homogeneous-matrix, and pose types used by every consumer that
//! converts between local and world frames.
//!
//! Quaternion construction (Euler, axis-angle) always normalizes;
//! composition does not, so long chains of products accumulate drift
//! and callers are expected to renormalize periodically.

mod error;
mod matrix;
mod pose;
mod quaternion;

pub use error::MathError;
pub use matrix::Matrix4;
pub use pose::Pose;
pub use quaternion::Quaternion;

/// A vector in 3D space.
pub type Vec3 = nalgebra::Vector3<f64>;

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;
