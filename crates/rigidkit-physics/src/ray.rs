//! Ray shape with relative and derived global endpoints.

use std::any::Any;

use rigidkit_math::{Pose, Vec3};

use crate::shape::{Shape, ShapeKind};

/// A ray shape owned by a collision.
///
/// Endpoints are stored in the parent-link frame; global endpoints are
/// derived from the parent pose whenever either changes. The
/// retro-reflectivity and fiducial fields are written by the owning
/// collision query after a cast, not by the shape itself.
#[derive(Debug, Clone)]
pub struct RayShape {
    relative_start: Vec3,
    relative_end: Vec3,
    global_start: Vec3,
    global_end: Vec3,
    parent_pose: Option<Pose>,
    length: f64,
    retro: f64,
    fiducial: i32,
}

impl RayShape {
    /// A ray with no parent collision: local and global points
    /// coincide.
    pub fn new() -> Self {
        Self {
            relative_start: Vec3::zeros(),
            relative_end: Vec3::zeros(),
            global_start: Vec3::zeros(),
            global_end: Vec3::zeros(),
            parent_pose: None,
            length: f64::MAX,
            retro: 0.0,
            fiducial: -1,
        }
    }

    /// A ray whose endpoints are relative to a parent frame.
    pub fn with_parent_pose(pose: Pose) -> Self {
        Self {
            parent_pose: Some(pose),
            ..Self::new()
        }
    }

    /// Replace the parent world pose and recompute global endpoints.
    pub fn set_parent_pose(&mut self, pose: Pose) {
        self.parent_pose = Some(pose);
        self.recompute_global();
    }

    /// Set the endpoints in the parent-link frame. Global endpoints
    /// are recomputed immediately through the parent's world pose; a
    /// ray without a parent treats local and global as equal.
    pub fn set_points(&mut self, start_local: Vec3, end_local: Vec3) {
        self.relative_start = start_local;
        self.relative_end = end_local;
        self.recompute_global();
    }

    /// The endpoints in the parent-link frame.
    pub fn relative_points(&self) -> (Vec3, Vec3) {
        (self.relative_start, self.relative_end)
    }

    /// The derived world-frame endpoints.
    pub fn global_points(&self) -> (Vec3, Vec3) {
        (self.global_start, self.global_end)
    }

    /// Set the ray length, rescaling the *relative* end point along
    /// the existing direction from the relative start point. Length is
    /// a local-space property, independent of the current world pose.
    pub fn set_length(&mut self, len: f64) {
        self.length = len;

        let dir = (self.relative_end - self.relative_start).normalize();
        self.relative_end = self.relative_start + dir * len;
        self.recompute_global();
    }

    /// The ray's maximum length.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Record the retro-reflectivity seen by the last cast.
    pub fn set_retro(&mut self, retro: f64) {
        self.retro = retro;
    }

    /// Retro-reflectivity from the last cast.
    pub fn retro(&self) -> f64 {
        self.retro
    }

    /// Record the fiducial id seen by the last cast.
    pub fn set_fiducial(&mut self, id: i32) {
        self.fiducial = id;
    }

    /// Fiducial id from the last cast (-1 when none).
    pub fn fiducial(&self) -> i32 {
        self.fiducial
    }

    fn recompute_global(&mut self) {
        match &self.parent_pose {
            Some(pose) => {
                self.global_start = pose.transform_point(&self.relative_start);
                self.global_end = pose.transform_point(&self.relative_end);
            }
            None => {
                self.global_start = self.relative_start;
                self.global_end = self.relative_end;
            }
        }
    }
}

impl Default for RayShape {
    fn default() -> Self {
        Self::new()
    }
}

impl Shape for RayShape {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Ray
    }

    fn update(&mut self) {
        self.recompute_global();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigidkit_math::Quaternion;
    use std::f64::consts::PI;

    #[test]
    fn test_unparented_local_equals_global() {
        let mut ray = RayShape::new();
        ray.set_points(Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(ray.relative_points(), ray.global_points());
    }

    #[test]
    fn test_parent_pose_transforms_global_points() {
        let pose = Pose::new(
            Vec3::new(10.0, 0.0, 0.0),
            Quaternion::from_axis_angle(Vec3::z(), PI / 2.0),
        );
        let mut ray = RayShape::with_parent_pose(pose);
        ray.set_points(Vec3::zeros(), Vec3::new(2.0, 0.0, 0.0));

        let (gs, ge) = ray.global_points();
        assert!((gs - Vec3::new(10.0, 0.0, 0.0)).norm() < 1e-12);
        assert!((ge - Vec3::new(10.0, 2.0, 0.0)).norm() < 1e-12);
        // Relative points are untouched by the parent pose.
        let (rs, re) = ray.relative_points();
        assert_eq!(rs, Vec3::zeros());
        assert_eq!(re, Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_set_length_rescales_relative_end() {
        let pose = Pose::new(Vec3::new(0.0, 5.0, 0.0), Quaternion::identity());
        let mut ray = RayShape::with_parent_pose(pose);
        ray.set_points(Vec3::new(1.0, 0.0, 0.0), Vec3::new(3.0, 0.0, 0.0));
        ray.set_length(10.0);

        let (_, re) = ray.relative_points();
        assert!((re - Vec3::new(11.0, 0.0, 0.0)).norm() < 1e-12);
        let (_, ge) = ray.global_points();
        assert!((ge - Vec3::new(11.0, 5.0, 0.0)).norm() < 1e-12);
        assert_eq!(ray.length(), 10.0);
    }

    #[test]
    fn test_scan_results_plain_state() {
        let mut ray = RayShape::new();
        assert_eq!(ray.fiducial(), -1);
        ray.set_retro(0.7);
        ray.set_fiducial(42);
        assert_eq!(ray.retro(), 0.7);
        assert_eq!(ray.fiducial(), 42);
    }
}
