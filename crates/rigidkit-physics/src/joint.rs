//! The joint contract satisfied by every back-end adapter.

use std::sync::{Arc, Mutex};

use rigidkit_math::Vec3;

use crate::backend::Backend;
use crate::error::PhysicsError;
use crate::link::Link;

/// A constraint between exactly two links.
///
/// Lifecycle: unattached → attached → destroyed. [`Joint::attach`] may
/// be invoked at most once; any per-axis accessor before attach fails
/// with [`PhysicsError::NotAttached`] rather than silently proceeding
/// with undefined native state. Dropping an attached joint removes the
/// native constraint from the native world exactly once.
pub trait Joint: Send {
    /// The solver family this joint's adapter targets.
    fn backend(&self) -> Backend;

    /// Attach the joint between `parent` and `child`, constructing the
    /// native constraint.
    ///
    /// Both links must belong to the adapter's back-end family; on a
    /// mismatch the attach fails with
    /// [`PhysicsError::IncompatibleBackend`] and no partially built
    /// constraint is left registered in the native world.
    fn attach(&mut self, parent: &Link, child: &Link) -> Result<(), PhysicsError>;

    /// Whether [`Joint::attach`] has completed.
    fn is_attached(&self) -> bool;

    /// Number of constrained rotational axes.
    fn axis_count(&self) -> usize;

    /// The anchor point in the model frame.
    fn anchor(&self) -> Vec3;

    /// Move the anchor point. Adapters whose native constraint bakes
    /// the anchor in at construction report this as unsupported once
    /// attached.
    fn set_anchor(&mut self, anchor: Vec3) -> Result<(), PhysicsError>;

    /// Direction of axis `index` in the model frame.
    fn axis(&self, index: usize) -> Result<Vec3, PhysicsError>;

    /// Redirect axis `index`.
    fn set_axis(&mut self, index: usize, axis: Vec3) -> Result<(), PhysicsError>;

    /// Current rotation angle about axis `index`, radians.
    fn angle(&self, index: usize) -> Result<f64, PhysicsError>;

    /// Current angular rate about axis `index`, rad/s.
    fn velocity(&self, index: usize) -> Result<f64, PhysicsError>;

    /// Apply a torque about axis `index` this step.
    fn set_force(&mut self, index: usize, torque: f64) -> Result<(), PhysicsError>;

    /// Limit the force the axis motor may apply.
    fn set_max_force(&mut self, index: usize, force: f64) -> Result<(), PhysicsError>;

    /// Upper angular stop of axis `index`, radians.
    fn high_stop(&self, index: usize) -> Result<f64, PhysicsError>;

    /// Lower angular stop of axis `index`, radians.
    fn low_stop(&self, index: usize) -> Result<f64, PhysicsError>;

    /// Set the upper angular stop of one axis, preserving the other
    /// axis's current stop (the native object stores the pair
    /// together).
    fn set_high_stop(&mut self, index: usize, angle: f64) -> Result<(), PhysicsError>;

    /// Set the lower angular stop of one axis, preserving the other.
    fn set_low_stop(&mut self, index: usize, angle: f64) -> Result<(), PhysicsError>;
}

/// Shared reference to a joint, co-owned by the model and by
/// controllers that read its kinematic state.
pub type JointRef = Arc<Mutex<dyn Joint>>;

/// Order one updated stop value with the other axis's current value
/// into the `(axis0, axis1)` pair the native structure expects.
///
/// Two-axis adapters store both axes' limits in a single native
/// structure; writing one axis without re-reading the other would
/// clobber it. This is the one place that pairing logic lives.
pub fn pair_stops(
    index: usize,
    updated: f64,
    other_current: f64,
) -> Result<(f64, f64), PhysicsError> {
    match index {
        0 => Ok((updated, other_current)),
        1 => Ok((other_current, updated)),
        i => Err(PhysicsError::InvalidAxis(i)),
    }
}
