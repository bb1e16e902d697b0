//! Error types for the physics abstraction.

use thiserror::Error;

use crate::backend::Backend;

/// Errors that can occur in the joint/shape abstraction and its
/// back-end adapters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhysicsError {
    /// An entity from the wrong native solver family was passed to an
    /// adapter.
    #[error("incompatible back-end: expected {expected}, found {found}")]
    IncompatibleBackend {
        /// Family the adapter is built for.
        expected: Backend,
        /// Family the entity actually belongs to.
        found: Backend,
    },

    /// A per-axis accessor was invoked before the joint was attached.
    #[error("joint is not attached; attach() must be called first")]
    NotAttached,

    /// `attach` was invoked on an already-attached joint.
    #[error("joint is already attached; re-attaching is not supported")]
    AlreadyAttached,

    /// Axis index outside the joint's degree-of-freedom count.
    #[error("joint has no axis {0}")]
    InvalidAxis(usize),

    /// The back-end does not implement this accessor. Distinct from a
    /// zero reading, which would look valid to controllers.
    #[error("operation not supported by this back-end: {0}")]
    Unsupported(&'static str),

    /// No link with this name is registered.
    #[error("link not found: {0}")]
    UnknownLink(String),

    /// Failed to build a collision shape.
    #[error("failed to build collision shape for {name}: {reason}")]
    Shape {
        /// Collision/shape name.
        name: String,
        /// Reason for failure.
        reason: String,
    },
}
