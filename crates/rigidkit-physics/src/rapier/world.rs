//! Rapier world management.

use std::sync::{Arc, RwLock};

use rapier3d::dynamics::{
    CCDSolver, ImpulseJointSet, IntegrationParameters, IslandManager, MultibodyJointSet,
    RigidBodyBuilder, RigidBodySet, RigidBodyType,
};
use rapier3d::geometry::{
    BroadPhaseMultiSap, ColliderBuilder, ColliderHandle, ColliderSet, NarrowPhase, SharedShape,
};
use rapier3d::pipeline::{PhysicsPipeline, QueryPipeline};
use rigidkit_math::{Pose, Vec3};
use tracing::debug;

use crate::error::PhysicsError;
use crate::link::{Link, LinkNative};
use crate::model::Collision;
use crate::rapier::joint::RapierUniversalJoint;
use crate::rapier::trimesh::RapierTrimeshShape;
use crate::rapier::pose_to_isometry;
use crate::shape::{CylinderShape, Shape, ShapeKind};
use crate::surface::{SurfaceHandle, SurfaceParams};

/// The rapier object sets shared between the world, its links, and its
/// joints. Links and joints answer kinematic queries through this
/// shared handle instead of threading a world reference through every
/// call.
pub struct RapierSets {
    /// Rigid bodies.
    pub bodies: RigidBodySet,
    /// Colliders.
    pub colliders: ColliderSet,
    /// Impulse joints.
    pub impulse_joints: ImpulseJointSet,
    /// Multibody joints (unused by this adapter, required by the
    /// pipeline).
    pub multibody_joints: MultibodyJointSet,
}

/// A simulation world backed by the Rapier impulse solver.
pub struct RapierWorld {
    pipeline: PhysicsPipeline,
    gravity: nalgebra::Vector3<f32>,
    integration_params: IntegrationParameters,
    islands: IslandManager,
    broad_phase: BroadPhaseMultiSap,
    narrow_phase: NarrowPhase,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    sets: Arc<RwLock<RapierSets>>,
    surfaces: Vec<(ColliderHandle, SurfaceHandle)>,
}

impl RapierWorld {
    /// An empty world with standard gravity.
    pub fn new() -> Self {
        Self {
            pipeline: PhysicsPipeline::new(),
            gravity: nalgebra::Vector3::new(0.0, 0.0, -9.81),
            integration_params: IntegrationParameters::default(),
            islands: IslandManager::new(),
            broad_phase: BroadPhaseMultiSap::new(),
            narrow_phase: NarrowPhase::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            sets: Arc::new(RwLock::new(RapierSets {
                bodies: RigidBodySet::new(),
                colliders: ColliderSet::new(),
                impulse_joints: ImpulseJointSet::new(),
                multibody_joints: MultibodyJointSet::new(),
            })),
            surfaces: Vec::new(),
        }
    }

    /// Shared access to the native object sets.
    pub fn sets(&self) -> Arc<RwLock<RapierSets>> {
        self.sets.clone()
    }

    /// Replace the gravity vector.
    pub fn set_gravity(&mut self, x: f32, y: f32, z: f32) {
        self.gravity = nalgebra::Vector3::new(x, y, z);
    }

    /// Create a rigid body and return a link bound to it.
    pub fn add_link(&mut self, name: &str, pose: Pose, dynamic: bool) -> Arc<Link> {
        let body_type = if dynamic {
            RigidBodyType::Dynamic
        } else {
            RigidBodyType::Fixed
        };
        let rigid_body = RigidBodyBuilder::new(body_type)
            .position(pose_to_isometry(&pose))
            .build();

        let body = self.sets.write().unwrap().bodies.insert(rigid_body);
        debug!(link = name, ?dynamic, "created rigid body");
        Arc::new(Link::new(
            name,
            LinkNative::Rapier {
                body,
                sets: self.sets.clone(),
            },
        ))
    }

    /// Register a collision on `link`: builds the native collider for
    /// the shape (rays carry no collider) and a fresh Rapier surface
    /// handle shared with the contact-sync pass of [`Self::step`].
    pub fn add_collision(
        &mut self,
        link: &Arc<Link>,
        name: &str,
        shape: Box<dyn Shape>,
    ) -> Result<Collision, PhysicsError> {
        let (body, _) = link.rapier_body()?;
        let surface = SurfaceParams::rapier().into_handle();

        if let Some(native_shape) = collider_shape(shape.as_ref(), name)? {
            let friction = surface.lock().unwrap().friction as f32;
            let collider = ColliderBuilder::new(native_shape)
                .friction(friction)
                .build();
            let mut sets = self.sets.write().unwrap();
            let sets = &mut *sets;
            let handle = sets
                .colliders
                .insert_with_parent(collider, body, &mut sets.bodies);
            self.surfaces.push((handle, surface.clone()));
        } else {
            debug!(collision = name, "shape carries no native collider");
        }

        Ok(Collision::new(name, link.clone(), shape, surface))
    }

    /// A universal joint adapter bound to this world, ready to attach.
    pub fn universal_joint(&self, anchor: Vec3, axis1: Vec3, axis2: Vec3) -> RapierUniversalJoint {
        RapierUniversalJoint::new(self.sets.clone(), anchor, axis1, axis2)
    }

    /// Number of native constraints currently registered.
    pub fn joint_count(&self) -> usize {
        self.sets.read().unwrap().impulse_joints.len()
    }

    /// Step the simulation by `dt` seconds.
    ///
    /// Surface parameters are synced into their colliders first: this
    /// is the fixed point at which the solver observes values written
    /// by controllers since the previous step.
    pub fn step(&mut self, dt: f32) {
        self.integration_params.dt = dt;

        let mut sets = self.sets.write().unwrap();
        let sets = &mut *sets;

        for (handle, surface) in &self.surfaces {
            let params = surface.lock().unwrap();
            if let Some(collider) = sets.colliders.get_mut(*handle) {
                collider.set_friction(params.friction as f32);
            }
        }

        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut sets.bodies,
            &mut sets.colliders,
            &mut sets.impulse_joints,
            &mut sets.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }
}

impl Default for RapierWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the native collider for a shape, dispatching on the kind tag
/// with checked downcasts. Rays have no collider.
fn collider_shape(shape: &dyn Shape, name: &str) -> Result<Option<SharedShape>, PhysicsError> {
    match shape.kind() {
        ShapeKind::Ray => Ok(None),
        ShapeKind::Sphere => {
            let radius = shape.radius().ok_or_else(|| PhysicsError::Shape {
                name: name.to_string(),
                reason: "sphere without a radius".to_string(),
            })?;
            Ok(Some(SharedShape::ball(radius as f32)))
        }
        ShapeKind::Cylinder => {
            let cyl = shape
                .as_any()
                .downcast_ref::<CylinderShape>()
                .ok_or_else(|| PhysicsError::Shape {
                    name: name.to_string(),
                    reason: "cylinder tag on a non-cylinder shape".to_string(),
                })?;
            let radius = cyl.radius().unwrap_or(0.0) as f32;
            Ok(Some(SharedShape::cylinder(
                (cyl.length() / 2.0) as f32,
                radius,
            )))
        }
        ShapeKind::TriMesh => {
            let mesh = shape
                .as_any()
                .downcast_ref::<RapierTrimeshShape>()
                .ok_or_else(|| PhysicsError::Shape {
                    name: name.to_string(),
                    reason: "trimesh tag on a non-Rapier mesh shape".to_string(),
                })?;
            let native = mesh.shared().ok_or_else(|| PhysicsError::Shape {
                name: name.to_string(),
                reason: "mesh not loaded".to_string(),
            })?;
            Ok(Some(native.clone()))
        }
    }
}
