//! Per-contact surface parameters shared with the native solver.

use std::sync::{Arc, Mutex};

use crate::backend::Backend;

/// Mutable contact-surface parameters for one collision.
///
/// The handle is shared between this crate's bookkeeping, controllers
/// that retune it at runtime, and the native contact solver. Write
/// contract: controllers write only between simulation steps; the
/// solver reads once at the start of its own step (see
/// [`crate::rapier::RapierWorld::step`]). There is no cross-step
/// locking beyond the mutex on the handle itself.
#[derive(Debug, Clone)]
pub struct SurfaceParams {
    /// Solver family this surface belongs to.
    pub backend: Backend,
    /// Coulomb friction coefficient in the first friction direction.
    pub friction: f64,
    /// Friction coefficient in the second friction direction.
    pub friction2: f64,
    /// Force-dependent slip in the lateral direction, units 1/N.
    /// Non-negative; zero allows no slip.
    pub slip_lateral: f64,
    /// Force-dependent slip in the longitudinal direction, units 1/N.
    /// Non-negative; zero allows no slip.
    pub slip_longitudinal: f64,
}

/// Shared reference-counted handle to a [`SurfaceParams`].
pub type SurfaceHandle = Arc<Mutex<SurfaceParams>>;

impl SurfaceParams {
    /// Surface parameters for a Rapier-backed collision.
    pub fn rapier() -> Self {
        Self {
            backend: Backend::Rapier,
            friction: 1.0,
            friction2: 1.0,
            slip_lateral: 0.0,
            slip_longitudinal: 0.0,
        }
    }

    /// Surface parameters not bound to any native solver.
    pub fn null() -> Self {
        Self {
            backend: Backend::Null,
            ..Self::rapier()
        }
    }

    /// Wrap into a shared handle.
    pub fn into_handle(self) -> SurfaceHandle {
        Arc::new(Mutex::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = SurfaceParams::rapier();
        assert_eq!(s.backend, Backend::Rapier);
        assert_eq!(s.slip_lateral, 0.0);
        assert_eq!(s.slip_longitudinal, 0.0);
        assert_eq!(s.friction, 1.0);
    }

    #[test]
    fn test_shared_handle_mutation() {
        let handle = SurfaceParams::rapier().into_handle();
        let other = handle.clone();
        handle.lock().unwrap().slip_lateral = 0.25;
        assert_eq!(other.lock().unwrap().slip_lateral, 0.25);
    }
}
