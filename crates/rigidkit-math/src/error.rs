//! Error types for math operations.

use thiserror::Error;

/// Errors that can occur during transform math.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MathError {
    /// Affine-only transform invoked on a non-affine matrix.
    #[error("matrix is not affine (bottom row must be 0,0,0,1)")]
    NotAffine,
}
