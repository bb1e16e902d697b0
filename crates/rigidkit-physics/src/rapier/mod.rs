//! Back-end adapter targeting the Rapier impulse solver.
//!
//! The abstraction stores all kinematic state in f64; Rapier runs in
//! f32, so every crossing of the boundary converts here.

mod joint;
mod trimesh;
mod world;

pub use joint::RapierUniversalJoint;
pub use trimesh::RapierTrimeshShape;
pub use world::{RapierSets, RapierWorld};

use nalgebra::{Isometry3, Point3 as NaPoint3, UnitQuaternion, Vector3};
use rigidkit_math::{Pose, Quaternion, Vec3};

pub(crate) fn to_vector32(v: &Vec3) -> Vector3<f32> {
    Vector3::new(v.x as f32, v.y as f32, v.z as f32)
}

pub(crate) fn to_point32(v: &Vec3) -> NaPoint3<f32> {
    NaPoint3::new(v.x as f32, v.y as f32, v.z as f32)
}

pub(crate) fn pose_to_isometry(pose: &Pose) -> Isometry3<f32> {
    let translation = to_vector32(&pose.pos);
    let rotation = UnitQuaternion::from_quaternion(nalgebra::Quaternion::new(
        pose.rot.w as f32,
        pose.rot.x as f32,
        pose.rot.y as f32,
        pose.rot.z as f32,
    ));
    Isometry3::from_parts(translation.into(), rotation)
}

pub(crate) fn isometry_to_pose(iso: &Isometry3<f32>) -> Pose {
    Pose::new(
        Vec3::new(
            iso.translation.x as f64,
            iso.translation.y as f64,
            iso.translation.z as f64,
        ),
        Quaternion::new(
            iso.rotation.w as f64,
            iso.rotation.i as f64,
            iso.rotation.j as f64,
            iso.rotation.k as f64,
        ),
    )
}
