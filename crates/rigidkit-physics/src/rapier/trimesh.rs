//! Triangle-mesh collision shape backed by a Parry trimesh.

use std::any::Any;

use nalgebra::Point3 as NaPoint3;
use parry3d::shape::{SharedShape, TriMesh};

use crate::error::PhysicsError;
use crate::shape::{Shape, ShapeKind};

/// A triangle-mesh collision shape for the Rapier back-end.
///
/// Created empty; geometry arrives through [`RapierTrimeshShape::load`]
/// as flat vertex and index arrays. The mesh is static once loaded, so
/// per-step update is a no-op.
pub struct RapierTrimeshShape {
    shape: Option<SharedShape>,
}

impl RapierTrimeshShape {
    /// An empty mesh shape. Attaching it to a collision before
    /// [`RapierTrimeshShape::load`] is an error.
    pub fn new() -> Self {
        Self { shape: None }
    }

    /// Build the native trimesh from flat arrays: `vertices` holds
    /// x,y,z triples and `indices` holds triangle corner triples.
    pub fn load(
        &mut self,
        name: &str,
        vertices: &[f64],
        indices: &[u32],
    ) -> Result<(), PhysicsError> {
        let points: Vec<NaPoint3<f32>> = vertices
            .chunks(3)
            .filter(|v| v.len() == 3)
            .map(|v| NaPoint3::new(v[0] as f32, v[1] as f32, v[2] as f32))
            .collect();
        let triangles: Vec<[u32; 3]> = indices
            .chunks(3)
            .filter(|t| t.len() == 3)
            .map(|t| [t[0], t[1], t[2]])
            .collect();

        if points.is_empty() || triangles.is_empty() {
            return Err(PhysicsError::Shape {
                name: name.to_string(),
                reason: "empty mesh".to_string(),
            });
        }

        match TriMesh::new(points, triangles) {
            Ok(mesh) => {
                self.shape = Some(SharedShape::new(mesh));
                Ok(())
            }
            Err(e) => Err(PhysicsError::Shape {
                name: name.to_string(),
                reason: format!("failed to build trimesh: {:?}", e),
            }),
        }
    }

    /// The native shape, if geometry has been loaded.
    pub fn shared(&self) -> Option<&SharedShape> {
        self.shape.as_ref()
    }
}

impl Default for RapierTrimeshShape {
    fn default() -> Self {
        Self::new()
    }
}

impl Shape for RapierTrimeshShape {
    fn kind(&self) -> ShapeKind {
        ShapeKind::TriMesh
    }

    // Static geometry, nothing to refresh per step.

    fn as_any(&self) -> &dyn Any {
        self
    }
}
