#![warn(missing_docs)]

//! Joint and shape abstraction over interchangeable rigid-body
//! back-ends.
//!
//! This crate defines the contracts — [`Joint`], [`Shape`], shared
//! [`SurfaceParams`] — that joint- and shape-level simulation code is
//! written against, plus the minimal link/model bookkeeping needed to
//! wire controllers to simulation entities. One concrete adapter is
//! provided, targeting the Rapier impulse solver.
//!
//! # Example
//!
//! ```ignore
//! use rigidkit_physics::{rapier::RapierWorld, Joint};
//!
//! let mut world = RapierWorld::new();
//! let chassis = world.add_link("chassis", Pose::identity(), false);
//! let wheel = world.add_link("wheel", wheel_pose, true);
//!
//! let mut joint = world.universal_joint(anchor, axis1, axis2);
//! joint.attach(&chassis, &wheel)?;
//!
//! world.step(1.0 / 60.0);
//! ```

mod backend;
mod error;
mod joint;
mod link;
mod model;
pub mod rapier;
mod ray;
mod shape;
mod surface;

pub use backend::Backend;
pub use error::PhysicsError;
pub use joint::{pair_stops, Joint, JointRef};
pub use link::{Link, LinkNative};
pub use model::{Collision, Model};
pub use ray::RayShape;
pub use shape::{CylinderShape, Shape, ShapeKind, SphereShape};
pub use surface::{SurfaceHandle, SurfaceParams};
