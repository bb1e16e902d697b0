//! Uniform geometric query surface over heterogeneous shapes.

use std::any::Any;

/// Run-time tag for the finite set of shape kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    /// A ray with start/end points (distance queries, no collision).
    Ray,
    /// A triangle mesh.
    TriMesh,
    /// An analytic cylinder.
    Cylinder,
    /// An analytic sphere.
    Sphere,
}

/// The shape contract shared by analytic primitives, rays, and
/// back-end mesh shapes.
///
/// Capability queries ([`Shape::radius`]) replace unchecked downcasts:
/// a caller asking for a radius on a mesh gets `None`, not garbage.
pub trait Shape: Send {
    /// The shape's kind tag.
    fn kind(&self) -> ShapeKind;

    /// Refresh derived state. A no-op for static geometry, which is a
    /// valid terminal behavior rather than an omission.
    fn update(&mut self) {}

    /// The analytic radius, for shapes that have one.
    fn radius(&self) -> Option<f64> {
        None
    }

    /// Checked-downcast hook for adapter-specific access.
    fn as_any(&self) -> &dyn Any;
}

/// An analytic cylinder, axis along local Y.
#[derive(Debug, Clone, Copy)]
pub struct CylinderShape {
    radius: f64,
    length: f64,
}

impl CylinderShape {
    /// Build a cylinder from radius and full length.
    pub fn new(radius: f64, length: f64) -> Self {
        Self { radius, length }
    }

    /// Full length along the axis.
    pub fn length(&self) -> f64 {
        self.length
    }
}

impl Shape for CylinderShape {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Cylinder
    }

    fn radius(&self) -> Option<f64> {
        Some(self.radius)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// An analytic sphere.
#[derive(Debug, Clone, Copy)]
pub struct SphereShape {
    radius: f64,
}

impl SphereShape {
    /// Build a sphere from its radius.
    pub fn new(radius: f64) -> Self {
        Self { radius }
    }
}

impl Shape for SphereShape {
    fn kind(&self) -> ShapeKind {
        ShapeKind::Sphere
    }

    fn radius(&self) -> Option<f64> {
        Some(self.radius)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_capability() {
        let cyl = CylinderShape::new(0.3, 0.1);
        assert_eq!(cyl.kind(), ShapeKind::Cylinder);
        assert_eq!(cyl.radius(), Some(0.3));

        let sphere = SphereShape::new(0.5);
        assert_eq!(sphere.radius(), Some(0.5));
    }

    #[test]
    fn test_update_is_noop_for_primitives() {
        let mut cyl = CylinderShape::new(1.0, 2.0);
        cyl.update();
        assert_eq!(cyl.length(), 2.0);
    }
}
