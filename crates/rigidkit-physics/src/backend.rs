//! Back-end family tags.

use std::fmt;

/// The native rigid-body solver family an entity belongs to.
///
/// Cross-family wiring (attaching a joint between links of different
/// families, or handing a controller a surface from the wrong solver)
/// is rejected with [`crate::PhysicsError::IncompatibleBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Backend {
    /// The Rapier impulse solver.
    Rapier,
    /// No native solver: the entity exists only in bookkeeping
    /// (visual-only links, standalone surfaces).
    Null,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Rapier => write!(f, "rapier"),
            Backend::Null => write!(f, "null"),
        }
    }
}
