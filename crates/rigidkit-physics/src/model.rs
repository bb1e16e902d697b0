//! Minimal model bookkeeping: named links, their collisions, and
//! their parent joints.

use std::collections::HashMap;
use std::sync::Arc;

use rigidkit_math::Pose;

use crate::joint::JointRef;
use crate::link::Link;
use crate::shape::Shape;
use crate::surface::SurfaceHandle;

/// A collision entity: one shape, one surface, one parent link.
pub struct Collision {
    name: String,
    link: Arc<Link>,
    shape: Box<dyn Shape>,
    surface: SurfaceHandle,
}

impl Collision {
    /// Build a collision owned by `link`.
    pub fn new(
        name: impl Into<String>,
        link: Arc<Link>,
        shape: Box<dyn Shape>,
        surface: SurfaceHandle,
    ) -> Self {
        Self {
            name: name.into(),
            link,
            shape,
            surface,
        }
    }

    /// The collision's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The owning link.
    pub fn link(&self) -> &Arc<Link> {
        &self.link
    }

    /// The owned shape.
    pub fn shape(&self) -> &dyn Shape {
        self.shape.as_ref()
    }

    /// Mutable access to the owned shape.
    pub fn shape_mut(&mut self) -> &mut dyn Shape {
        self.shape.as_mut()
    }

    /// The shared surface-parameter handle.
    pub fn surface(&self) -> &SurfaceHandle {
        &self.surface
    }

    /// World pose of this collision (the owning link's pose).
    pub fn world_pose(&self) -> Pose {
        self.link.world_pose()
    }
}

/// A named collection of links with the lookups controllers need:
/// link by name, collisions per link, parent joints per link, and the
/// model's (chassis) world pose.
#[derive(Default)]
pub struct Model {
    name: String,
    links: HashMap<String, Arc<Link>>,
    collisions: HashMap<String, Vec<Collision>>,
    parent_joints: HashMap<String, Vec<JointRef>>,
    canonical_link: Option<String>,
}

impl Model {
    /// An empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// The model's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a link. The first registered link becomes the
    /// canonical (chassis) link unless overridden.
    pub fn add_link(&mut self, link: Arc<Link>) {
        if self.canonical_link.is_none() {
            self.canonical_link = Some(link.name().to_string());
        }
        self.links.insert(link.name().to_string(), link);
    }

    /// Mark the link whose pose stands in for the model's world pose.
    pub fn set_canonical_link(&mut self, name: impl Into<String>) {
        self.canonical_link = Some(name.into());
    }

    /// Register a collision under its owning link.
    pub fn add_collision(&mut self, collision: Collision) {
        self.collisions
            .entry(collision.link().name().to_string())
            .or_default()
            .push(collision);
    }

    /// Record a joint whose child is `link_name`.
    pub fn add_parent_joint(&mut self, link_name: impl Into<String>, joint: JointRef) {
        self.parent_joints
            .entry(link_name.into())
            .or_default()
            .push(joint);
    }

    /// Look up a link by name.
    pub fn link(&self, name: &str) -> Option<&Arc<Link>> {
        self.links.get(name)
    }

    /// All collisions owned by the named link.
    pub fn collisions(&self, link_name: &str) -> &[Collision] {
        self.collisions
            .get(link_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All joints whose child is the named link.
    pub fn parent_joints(&self, link_name: &str) -> &[JointRef] {
        self.parent_joints
            .get(link_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// World pose of the canonical link (identity when the model is
    /// empty).
    pub fn world_pose(&self) -> Pose {
        self.canonical_link
            .as_deref()
            .and_then(|name| self.links.get(name))
            .map(|link| link.world_pose())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::SphereShape;
    use crate::surface::SurfaceParams;

    #[test]
    fn test_lookups() {
        let mut model = Model::new("cart");
        let chassis = Arc::new(Link::null("chassis"));
        let wheel = Arc::new(Link::null("wheel"));
        model.add_link(chassis.clone());
        model.add_link(wheel.clone());

        model.add_collision(Collision::new(
            "wheel_collision",
            wheel.clone(),
            Box::new(SphereShape::new(0.2)),
            SurfaceParams::null().into_handle(),
        ));

        assert!(model.link("wheel").is_some());
        assert!(model.link("nope").is_none());
        assert_eq!(model.collisions("wheel").len(), 1);
        assert_eq!(model.collisions("chassis").len(), 0);
        assert_eq!(model.parent_joints("wheel").len(), 0);
        assert_eq!(
            model.collisions("wheel")[0].shape().radius(),
            Some(0.2)
        );
    }
}
