//! Minimal link bookkeeping.

use std::sync::{Arc, RwLock};

use rapier3d::dynamics::RigidBodyHandle;
use rigidkit_math::{Pose, Vec3};

use crate::backend::Backend;
use crate::error::PhysicsError;
use crate::rapier::{isometry_to_pose, to_vector32, RapierSets};

/// The native body a link is bound to, tagged by solver family.
pub enum LinkNative {
    /// A Rapier rigid body, with shared access to the owning world's
    /// sets so kinematic queries need no world argument.
    Rapier {
        /// Handle of the rigid body in the world's body set.
        body: RigidBodyHandle,
        /// The owning world's shared sets.
        sets: Arc<RwLock<RapierSets>>,
    },
    /// Not bound to any native solver.
    Null,
}

/// A named rigid body in a model.
pub struct Link {
    name: String,
    native: LinkNative,
}

impl Link {
    /// Build a link from its native binding. Rapier-bound links are
    /// normally created through
    /// [`crate::rapier::RapierWorld::add_link`].
    pub fn new(name: impl Into<String>, native: LinkNative) -> Self {
        Self {
            name: name.into(),
            native,
        }
    }

    /// A link with no native body (visual-only bookkeeping).
    pub fn null(name: impl Into<String>) -> Self {
        Self::new(name, LinkNative::Null)
    }

    /// The link's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The solver family this link belongs to.
    pub fn backend(&self) -> Backend {
        match self.native {
            LinkNative::Rapier { .. } => Backend::Rapier,
            LinkNative::Null => Backend::Null,
        }
    }

    /// The native rigid-body handle, or an incompatibility error for
    /// links outside the Rapier family.
    pub(crate) fn rapier_body(
        &self,
    ) -> Result<(RigidBodyHandle, &Arc<RwLock<RapierSets>>), PhysicsError> {
        match &self.native {
            LinkNative::Rapier { body, sets } => Ok((*body, sets)),
            LinkNative::Null => Err(PhysicsError::IncompatibleBackend {
                expected: Backend::Rapier,
                found: Backend::Null,
            }),
        }
    }

    /// Current world pose. Unbound links sit at the identity.
    pub fn world_pose(&self) -> Pose {
        match &self.native {
            LinkNative::Rapier { body, sets } => {
                let sets = sets.read().unwrap();
                sets.bodies
                    .get(*body)
                    .map(|rb| isometry_to_pose(rb.position()))
                    .unwrap_or_default()
            }
            LinkNative::Null => Pose::identity(),
        }
    }

    /// Current world-frame linear velocity.
    pub fn world_linear_vel(&self) -> Vec3 {
        match &self.native {
            LinkNative::Rapier { body, sets } => {
                let sets = sets.read().unwrap();
                sets.bodies
                    .get(*body)
                    .map(|rb| {
                        let v = rb.linvel();
                        Vec3::new(v.x as f64, v.y as f64, v.z as f64)
                    })
                    .unwrap_or_else(Vec3::zeros)
            }
            LinkNative::Null => Vec3::zeros(),
        }
    }

    /// Overwrite the world-frame linear velocity of the native body.
    pub fn set_world_linear_vel(&self, v: Vec3) -> Result<(), PhysicsError> {
        let (body, sets) = self.rapier_body()?;
        let mut sets = sets.write().unwrap();
        if let Some(rb) = sets.bodies.get_mut(body) {
            rb.set_linvel(to_vector32(&v), true);
        }
        Ok(())
    }

    /// Overwrite the world-frame angular velocity of the native body.
    pub fn set_world_angular_vel(&self, w: Vec3) -> Result<(), PhysicsError> {
        let (body, sets) = self.rapier_body()?;
        let mut sets = sets.write().unwrap();
        if let Some(rb) = sets.bodies.get_mut(body) {
            rb.set_angvel(to_vector32(&w), true);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_link_family() {
        let link = Link::null("marker");
        assert_eq!(link.backend(), Backend::Null);
        assert_eq!(link.world_pose(), Pose::identity());
        assert_eq!(link.world_linear_vel(), Vec3::zeros());
    }

    #[test]
    fn test_null_link_rejects_velocity_writes() {
        let link = Link::null("marker");
        assert!(matches!(
            link.set_world_linear_vel(Vec3::x()),
            Err(PhysicsError::IncompatibleBackend { .. })
        ));
    }
}
