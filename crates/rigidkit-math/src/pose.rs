//! Position + orientation pairs.

use crate::matrix::Matrix4;
use crate::quaternion::Quaternion;
use crate::Vec3;

/// A rigid-body pose: position plus orientation.
///
/// The compact form of an affine [`Matrix4`]; used wherever entities
/// carry a world-frame placement.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    /// Position of the frame origin.
    pub pos: Vec3,
    /// Orientation of the frame.
    pub rot: Quaternion,
}

impl Pose {
    /// Build a pose from position and orientation.
    pub fn new(pos: Vec3, rot: Quaternion) -> Self {
        Self { pos, rot }
    }

    /// The identity pose at the origin.
    pub fn identity() -> Self {
        Self::default()
    }

    /// Map a point from this frame into the parent (world) frame.
    pub fn transform_point(&self, local: &Vec3) -> Vec3 {
        self.pos + self.rot.rotate(local)
    }

    /// Map a world-frame point into this frame.
    pub fn inverse_transform_point(&self, world: &Vec3) -> Vec3 {
        self.rot.rotate_reverse(&(world - self.pos))
    }

    /// Compose with a child pose expressed in this frame.
    pub fn compose(&self, child: &Pose) -> Pose {
        Pose {
            pos: self.transform_point(&child.pos),
            rot: self.rot * child.rot,
        }
    }

    /// Expand into a homogeneous matrix.
    pub fn to_matrix(&self) -> Matrix4 {
        Matrix4::from_parts(&self.rot, self.pos)
    }
}
