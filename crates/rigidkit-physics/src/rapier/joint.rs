//! Two-axis universal joint over a Rapier generic constraint.

use std::f64::consts::PI;
use std::sync::{Arc, RwLock};

use rapier3d::dynamics::{
    GenericJointBuilder, ImpulseJointHandle, JointAxesMask, JointAxis, RigidBodyHandle,
};
use nalgebra::UnitVector3;
use rigidkit_math::{Quaternion, Vec3};

use crate::backend::Backend;
use crate::error::PhysicsError;
use crate::joint::{pair_stops, Joint};
use crate::link::Link;
use crate::rapier::{isometry_to_pose, to_point32, to_vector32, RapierSets};

/// Default angular stops used until a caller sets explicit limits.
const DEFAULT_LOW_STOP: f64 = -PI;
const DEFAULT_HIGH_STOP: f64 = PI;

/// The free rotational axes of the native constraint, in axis-index
/// order.
const ANG_AXES: [JointAxis; 2] = [JointAxis::AngY, JointAxis::AngZ];

struct Attached {
    handle: ImpulseJointHandle,
    bodies: [RigidBodyHandle; 2],
    names: [String; 2],
    /// Axis 0 in body-1 local frame, axis 1 in body-2 local frame,
    /// captured at attach time.
    local_axes: [Vec3; 2],
}

/// A universal (two rotational degree-of-freedom) joint backed by a
/// Rapier generic constraint.
///
/// The adapter owns the native constraint for the lifetime of the
/// joint; dropping the joint removes the constraint from the native
/// world exactly once.
pub struct RapierUniversalJoint {
    sets: Arc<RwLock<RapierSets>>,
    anchor: Vec3,
    axes: [Vec3; 2],
    attached: Option<Attached>,
}

impl RapierUniversalJoint {
    /// A joint ready to attach, with its anchor and both axis
    /// directions given in the model frame.
    pub fn new(sets: Arc<RwLock<RapierSets>>, anchor: Vec3, axis1: Vec3, axis2: Vec3) -> Self {
        Self {
            sets,
            anchor,
            axes: [axis1, axis2],
            attached: None,
        }
    }

    fn check_axis(&self, index: usize) -> Result<(), PhysicsError> {
        if index < self.axis_count() {
            Ok(())
        } else {
            Err(PhysicsError::InvalidAxis(index))
        }
    }

    fn attached(&self) -> Result<&Attached, PhysicsError> {
        self.attached.as_ref().ok_or(PhysicsError::NotAttached)
    }

    /// Current world-frame direction of axis `index` and the world
    /// angular velocities of both bodies.
    fn axis_kinematics(&self, index: usize) -> Result<(Vec3, Vec3, Vec3), PhysicsError> {
        let at = self.attached()?;
        let sets = self.sets.read().unwrap();

        let mut rotations = [Quaternion::identity(); 2];
        let mut angvels = [Vec3::zeros(); 2];
        for i in 0..2 {
            let rb = sets
                .bodies
                .get(at.bodies[i])
                .ok_or_else(|| PhysicsError::UnknownLink(at.names[i].clone()))?;
            rotations[i] = isometry_to_pose(rb.position()).rot;
            let w = rb.angvel();
            angvels[i] = Vec3::new(w.x as f64, w.y as f64, w.z as f64);
        }

        let world_axis = rotations[index].rotate(&at.local_axes[index]);
        Ok((world_axis, angvels[0], angvels[1]))
    }
}

impl Joint for RapierUniversalJoint {
    fn backend(&self) -> Backend {
        Backend::Rapier
    }

    fn attach(&mut self, parent: &Link, child: &Link) -> Result<(), PhysicsError> {
        if self.attached.is_some() {
            return Err(PhysicsError::AlreadyAttached);
        }

        // Family checks come before any native work, so a mismatch
        // leaves nothing half-registered in the native world.
        let (body1, _) = parent.rapier_body()?;
        let (body2, _) = child.rapier_body()?;

        let mut sets = self.sets.write().unwrap();

        let pose1 = sets
            .bodies
            .get(body1)
            .map(|rb| isometry_to_pose(rb.position()))
            .ok_or_else(|| PhysicsError::UnknownLink(parent.name().to_string()))?;
        let pose2 = sets
            .bodies
            .get(body2)
            .map(|rb| isometry_to_pose(rb.position()))
            .ok_or_else(|| PhysicsError::UnknownLink(child.name().to_string()))?;

        let local_axes = [
            pose1.rot.rotate_reverse(&self.axes[0]),
            pose2.rot.rotate_reverse(&self.axes[1]),
        ];

        // The locked twist direction is the mutual perpendicular of
        // the two free axes.
        let twist = {
            let cross = self.axes[0].cross(&self.axes[1]);
            if cross.norm_squared() > 1e-12 {
                cross
            } else {
                perpendicular_to(&self.axes[0])
            }
        };
        let twist1 = UnitVector3::new_normalize(to_vector32(&pose1.rot.rotate_reverse(&twist)));
        let twist2 = UnitVector3::new_normalize(to_vector32(&pose2.rot.rotate_reverse(&twist)));

        let locked = JointAxesMask::LIN_X
            | JointAxesMask::LIN_Y
            | JointAxesMask::LIN_Z
            | JointAxesMask::ANG_X;
        let native = GenericJointBuilder::new(locked)
            .local_anchor1(to_point32(&pose1.inverse_transform_point(&self.anchor)))
            .local_anchor2(to_point32(&pose2.inverse_transform_point(&self.anchor)))
            .local_axis1(twist1)
            .local_axis2(twist2)
            .build();

        let handle = sets.impulse_joints.insert(body1, body2, native, true);

        self.attached = Some(Attached {
            handle,
            bodies: [body1, body2],
            names: [parent.name().to_string(), child.name().to_string()],
            local_axes,
        });
        Ok(())
    }

    fn is_attached(&self) -> bool {
        self.attached.is_some()
    }

    fn axis_count(&self) -> usize {
        2
    }

    fn anchor(&self) -> Vec3 {
        self.anchor
    }

    fn set_anchor(&mut self, anchor: Vec3) -> Result<(), PhysicsError> {
        if self.attached.is_some() {
            return Err(PhysicsError::Unsupported("set_anchor after attach"));
        }
        self.anchor = anchor;
        Ok(())
    }

    fn axis(&self, index: usize) -> Result<Vec3, PhysicsError> {
        self.check_axis(index)?;
        Ok(self.axes[index])
    }

    fn set_axis(&mut self, index: usize, axis: Vec3) -> Result<(), PhysicsError> {
        self.check_axis(index)?;
        if self.attached.is_some() {
            return Err(PhysicsError::Unsupported("set_axis after attach"));
        }
        self.axes[index] = axis;
        Ok(())
    }

    fn angle(&self, index: usize) -> Result<f64, PhysicsError> {
        self.check_axis(index)?;
        let at = self.attached()?;
        let sets = self.sets.read().unwrap();

        let mut rotations = [Quaternion::identity(); 2];
        for i in 0..2 {
            let rb = sets
                .bodies
                .get(at.bodies[i])
                .ok_or_else(|| PhysicsError::UnknownLink(at.names[i].clone()))?;
            rotations[i] = isometry_to_pose(rb.position()).rot;
        }

        // Twist of the relative rotation about the requested axis.
        let rel = rotations[0].inverse() * rotations[1];
        let axis = at.local_axes[index];
        let d = rel.x * axis.x + rel.y * axis.y + rel.z * axis.z;
        Ok(2.0 * d.atan2(rel.w))
    }

    fn velocity(&self, index: usize) -> Result<f64, PhysicsError> {
        self.check_axis(index)?;
        let (world_axis, w1, w2) = self.axis_kinematics(index)?;
        Ok((w2 - w1).dot(&world_axis))
    }

    fn set_force(&mut self, index: usize, torque: f64) -> Result<(), PhysicsError> {
        self.check_axis(index)?;
        let (world_axis, _, _) = self.axis_kinematics(index)?;
        let at = self.attached()?;
        let bodies = at.bodies;

        let t = to_vector32(&(world_axis * torque));
        let mut sets = self.sets.write().unwrap();
        if let Some(rb) = sets.bodies.get_mut(bodies[1]) {
            rb.add_torque(t, true);
        }
        if let Some(rb) = sets.bodies.get_mut(bodies[0]) {
            rb.add_torque(-t, true);
        }
        Ok(())
    }

    fn set_max_force(&mut self, index: usize, force: f64) -> Result<(), PhysicsError> {
        self.check_axis(index)?;
        let handle = self.attached()?.handle;
        let mut sets = self.sets.write().unwrap();
        if let Some(joint) = sets.impulse_joints.get_mut(handle, true) {
            joint.data.set_motor_max_force(ANG_AXES[index], force as f32);
        }
        Ok(())
    }

    fn high_stop(&self, index: usize) -> Result<f64, PhysicsError> {
        self.check_axis(index)?;
        let handle = self.attached()?.handle;
        let sets = self.sets.read().unwrap();
        Ok(sets
            .impulse_joints
            .get(handle)
            .and_then(|joint| joint.data.limits(ANG_AXES[index]))
            .map(|limits| limits.max as f64)
            .unwrap_or(DEFAULT_HIGH_STOP))
    }

    fn low_stop(&self, index: usize) -> Result<f64, PhysicsError> {
        self.check_axis(index)?;
        let handle = self.attached()?.handle;
        let sets = self.sets.read().unwrap();
        Ok(sets
            .impulse_joints
            .get(handle)
            .and_then(|joint| joint.data.limits(ANG_AXES[index]))
            .map(|limits| limits.min as f64)
            .unwrap_or(DEFAULT_LOW_STOP))
    }

    fn set_high_stop(&mut self, index: usize, angle: f64) -> Result<(), PhysicsError> {
        self.check_axis(index)?;
        // Re-read the other axis's current stop so the paired write
        // cannot clobber it.
        let other = self.high_stop(1 - index)?;
        let (hi0, hi1) = pair_stops(index, angle, other)?;
        let lows = [self.low_stop(0)?, self.low_stop(1)?];

        let handle = self.attached()?.handle;
        let mut sets = self.sets.write().unwrap();
        if let Some(joint) = sets.impulse_joints.get_mut(handle, true) {
            joint
                .data
                .set_limits(ANG_AXES[0], [lows[0] as f32, hi0 as f32]);
            joint
                .data
                .set_limits(ANG_AXES[1], [lows[1] as f32, hi1 as f32]);
        }
        Ok(())
    }

    fn set_low_stop(&mut self, index: usize, angle: f64) -> Result<(), PhysicsError> {
        self.check_axis(index)?;
        let other = self.low_stop(1 - index)?;
        let (lo0, lo1) = pair_stops(index, angle, other)?;
        let highs = [self.high_stop(0)?, self.high_stop(1)?];

        let handle = self.attached()?.handle;
        let mut sets = self.sets.write().unwrap();
        if let Some(joint) = sets.impulse_joints.get_mut(handle, true) {
            joint
                .data
                .set_limits(ANG_AXES[0], [lo0 as f32, highs[0] as f32]);
            joint
                .data
                .set_limits(ANG_AXES[1], [lo1 as f32, highs[1] as f32]);
        }
        Ok(())
    }
}

impl Drop for RapierUniversalJoint {
    /// Remove the native constraint exactly once. The `take` guards
    /// double removal; a poisoned world lock during teardown leaves
    /// the constraint to die with the world.
    fn drop(&mut self) {
        if let Some(at) = self.attached.take() {
            if let Ok(mut sets) = self.sets.write() {
                sets.impulse_joints.remove(at.handle, true);
            }
        }
    }
}

/// An arbitrary unit vector perpendicular to `v`.
fn perpendicular_to(v: &Vec3) -> Vec3 {
    let candidate = if v.x.abs() < 0.9 { Vec3::x() } else { Vec3::y() };
    v.cross(&candidate)
}
