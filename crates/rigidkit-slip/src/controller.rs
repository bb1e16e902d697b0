//! The per-step wheel-slip controller.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use rigidkit_math::{Pose, Vec3};
use rigidkit_physics::{Backend, JointRef, Link, Model, SurfaceHandle};

use crate::config::WheelConfig;

/// One validated wheel: the link, its single parent joint, the shared
/// surface handle, and the coefficients that drive the slip update.
struct WheelEntry {
    link: Arc<Link>,
    joint: JointRef,
    surface: SurfaceHandle,
    slip_compliance_lateral: f64,
    slip_compliance_longitudinal: f64,
    wheel_normal_force: f64,
    wheel_radius: f64,
}

/// Writes slip-compliance surface parameters for each configured
/// wheel, every step, from the wheel's spin rate.
///
/// The entry map is built once at [`WheelSlipController::load`] and
/// guarded by a single mutex: per-step updates, external parameter
/// broadcasts, and diagnostic queries may interleave, so each takes
/// the lock for the duration of one pass over the (small) map.
pub struct WheelSlipController {
    entries: Mutex<HashMap<String, WheelEntry>>,
}

impl WheelSlipController {
    /// Validate `configs` against `model` and build the controller.
    ///
    /// Each entry is validated independently: the link must exist and
    /// carry exactly one collision and one parent joint, the collision
    /// surface must belong to the Rapier family, a non-positive radius
    /// is derived from the collision shape or the entry is rejected,
    /// and the normal force must be positive. A rejected entry is
    /// logged and skipped; the rest still load. With zero valid
    /// entries the controller is disabled.
    pub fn load(model: &Model, configs: &[WheelConfig]) -> Self {
        let mut entries = HashMap::new();

        for config in configs {
            let name = config.link_name.as_str();

            let link = match model.link(name) {
                Some(link) => link.clone(),
                None => {
                    warn!("wheel {name}: no such link in model {}", model.name());
                    continue;
                }
            };

            let collisions = model.collisions(name);
            if collisions.len() != 1 {
                warn!(
                    "wheel {name}: expected 1 collision, found {}",
                    collisions.len()
                );
                continue;
            }
            let collision = &collisions[0];

            let surface = collision.surface().clone();
            let surface_backend = surface.lock().unwrap().backend;
            if surface_backend != Backend::Rapier {
                warn!("wheel {name}: surface belongs to {surface_backend}, not rapier");
                continue;
            }

            let joints = model.parent_joints(name);
            if joints.len() != 1 {
                warn!("wheel {name}: expected 1 parent joint, found {}", joints.len());
                continue;
            }
            let joint = joints[0].clone();

            let mut wheel_radius = config.wheel_radius;
            if wheel_radius <= 0.0 {
                match collision.shape().radius() {
                    Some(r) if r > 0.0 => wheel_radius = r,
                    _ => {
                        warn!(
                            "wheel {name}: radius not configured and collision {} has none",
                            collision.name()
                        );
                        continue;
                    }
                }
            }

            if config.wheel_normal_force <= 0.0 {
                warn!(
                    "wheel {name}: normal force must be positive, got {}",
                    config.wheel_normal_force
                );
                continue;
            }

            entries.insert(
                name.to_string(),
                WheelEntry {
                    link,
                    joint,
                    surface,
                    slip_compliance_lateral: config.slip_compliance_lateral,
                    slip_compliance_longitudinal: config.slip_compliance_longitudinal,
                    wheel_normal_force: config.wheel_normal_force,
                    wheel_radius,
                },
            );
        }

        if entries.is_empty() {
            info!("no valid wheel entries, controller is disabled");
        }
        Self {
            entries: Mutex::new(entries),
        }
    }

    /// Whether at least one wheel entry validated. A disabled
    /// controller must not be registered for per-step callbacks.
    pub fn is_enabled(&self) -> bool {
        !self.entries.lock().unwrap().is_empty()
    }

    /// Set the lateral slip compliance of every registered wheel.
    pub fn set_slip_compliance_lateral(&self, compliance: f64) {
        let mut entries = self.entries.lock().unwrap();
        for entry in entries.values_mut() {
            entry.slip_compliance_lateral = compliance;
        }
    }

    /// Set the longitudinal slip compliance of every registered wheel.
    pub fn set_slip_compliance_longitudinal(&self, compliance: f64) {
        let mut entries = self.entries.lock().unwrap();
        for entry in entries.values_mut() {
            entry.slip_compliance_longitudinal = compliance;
        }
    }

    /// External-update channel for the lateral compliance. The payload
    /// is a numeric string; a malformed payload is logged and leaves
    /// every wheel's coefficient unchanged.
    pub fn on_lateral_compliance(&self, payload: &str) {
        match payload.trim().parse::<f64>() {
            Ok(compliance) => self.set_slip_compliance_lateral(compliance),
            Err(_) => warn!("invalid lateral compliance payload: {payload:?}"),
        }
    }

    /// External-update channel for the longitudinal compliance.
    pub fn on_longitudinal_compliance(&self, payload: &str) {
        match payload.trim().parse::<f64>() {
            Ok(compliance) => self.set_slip_compliance_longitudinal(compliance),
            Err(_) => warn!("invalid longitudinal compliance payload: {payload:?}"),
        }
    }

    /// Per-step update: write each wheel's surface slip from its spin
    /// rate. Call between simulation steps, before the solver reads
    /// the surface handles.
    ///
    /// The normal force is the static load-time estimate, not a
    /// measured contact force.
    pub fn update(&self) {
        let entries = self.entries.lock().unwrap();
        for (name, entry) in entries.iter() {
            let omega = match entry.joint.lock().unwrap().velocity(0) {
                Ok(v) => v,
                Err(e) => {
                    warn!("wheel {name}: cannot read spin rate: {e}");
                    continue;
                }
            };
            let speed = omega.abs() * entry.wheel_radius;
            let force = entry.wheel_normal_force;

            let mut surface = entry.surface.lock().unwrap();
            surface.slip_lateral = speed / force * entry.slip_compliance_lateral;
            surface.slip_longitudinal = speed / force * entry.slip_compliance_longitudinal;
        }
    }

    /// Diagnostic slip vector per wheel, in the chassis frame:
    /// x is the longitudinal slip speed (ground speed minus rolling
    /// speed), y the lateral speed, z reports radius times spin rate.
    ///
    /// Read-only; meaningful once the world has stepped at least once.
    pub fn slips(&self, chassis_pose: &Pose) -> HashMap<String, Vec3> {
        let entries = self.entries.lock().unwrap();
        let mut out = HashMap::with_capacity(entries.len());
        for (name, entry) in entries.iter() {
            let omega = match entry.joint.lock().unwrap().velocity(0) {
                Ok(v) => v,
                Err(e) => {
                    warn!("wheel {name}: cannot read spin rate: {e}");
                    continue;
                }
            };
            let rolling = entry.wheel_radius * omega;
            let v = chassis_pose.rot.rotate_reverse(&entry.link.world_linear_vel());
            out.insert(name.clone(), Vec3::new(v.x - rolling, v.y, rolling));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigidkit_math::Quaternion;
    use rigidkit_physics::rapier::{RapierTrimeshShape, RapierWorld};
    use rigidkit_physics::{CylinderShape, Joint, Shape, SphereShape};

    fn base_config(link_name: &str) -> WheelConfig {
        WheelConfig {
            link_name: link_name.to_string(),
            slip_compliance_lateral: 0.1,
            slip_compliance_longitudinal: 0.2,
            wheel_normal_force: 50.0,
            wheel_radius: 0.3,
        }
    }

    /// A chassis with one wheel link, one collision carrying `shape`,
    /// and a universal joint spinning about world Y.
    fn wheel_model(shape: Box<dyn Shape>) -> (RapierWorld, Model, Arc<Link>) {
        let mut world = RapierWorld::new();
        let chassis = world.add_link("chassis", Pose::identity(), false);
        let wheel = world.add_link(
            "wheel",
            Pose::new(Vec3::new(0.0, 0.5, 0.0), Quaternion::identity()),
            true,
        );
        let collision = world.add_collision(&wheel, "wheel_collision", shape).unwrap();

        let mut joint =
            world.universal_joint(Vec3::new(0.0, 0.5, 0.0), Vec3::y(), Vec3::x());
        joint.attach(&chassis, &wheel).unwrap();
        let joint: JointRef = Arc::new(Mutex::new(joint));

        let mut model = Model::new("vehicle");
        model.add_link(chassis);
        model.add_link(wheel.clone());
        model.add_collision(collision);
        model.add_parent_joint("wheel", joint);
        (world, model, wheel)
    }

    #[test]
    fn test_unknown_link_disables_controller() {
        let (_world, model, _) = wheel_model(Box::new(CylinderShape::new(0.3, 0.1)));
        let controller = WheelSlipController::load(&model, &[base_config("no_such_link")]);
        assert!(!controller.is_enabled());
    }

    #[test]
    fn test_two_collisions_reject_the_entry() {
        let (mut world, mut model, wheel) =
            wheel_model(Box::new(CylinderShape::new(0.3, 0.1)));
        let extra = world
            .add_collision(&wheel, "mud_guard", Box::new(SphereShape::new(0.05)))
            .unwrap();
        model.add_collision(extra);

        let controller = WheelSlipController::load(&model, &[base_config("wheel")]);
        assert!(!controller.is_enabled());
    }

    #[test]
    fn test_zero_normal_force_rejects_the_entry() {
        let (_world, model, _) = wheel_model(Box::new(CylinderShape::new(0.3, 0.1)));
        let mut config = base_config("wheel");
        config.wheel_normal_force = 0.0;
        let controller = WheelSlipController::load(&model, &[config]);
        assert!(!controller.is_enabled());
    }

    #[test]
    fn test_radius_derived_from_sphere_collision() {
        let (_world, model, wheel) = wheel_model(Box::new(SphereShape::new(0.25)));
        let mut config = base_config("wheel");
        config.wheel_radius = 0.0;
        let controller = WheelSlipController::load(&model, &[config]);
        assert!(controller.is_enabled());

        wheel.set_world_angular_vel(Vec3::new(0.0, 2.0, 0.0)).unwrap();
        let slips = controller.slips(&Pose::identity());
        // z reports radius * omega, so it exposes the derived radius.
        assert!((slips["wheel"].z - 0.25 * 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_mesh_collision_cannot_supply_a_radius() {
        let mut mesh = RapierTrimeshShape::new();
        mesh.load(
            "wheel_mesh",
            &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
            &[0, 1, 2, 0, 1, 3, 0, 2, 3, 1, 2, 3],
        )
        .unwrap();
        let (_world, model, _) = wheel_model(Box::new(mesh));
        let mut config = base_config("wheel");
        config.wheel_radius = 0.0;
        let controller = WheelSlipController::load(&model, &[config]);
        assert!(!controller.is_enabled());
    }

    #[test]
    fn test_update_writes_surface_slip() {
        let (_world, model, wheel) = wheel_model(Box::new(CylinderShape::new(0.3, 0.1)));
        let controller = WheelSlipController::load(&model, &[base_config("wheel")]);
        assert!(controller.is_enabled());

        wheel.set_world_angular_vel(Vec3::new(0.0, 2.0, 0.0)).unwrap();
        controller.update();

        // speed = |2.0| * 0.3 = 0.6; lateral = 0.6 / 50 * 0.1
        let surface = model.collisions("wheel")[0].surface();
        let params = surface.lock().unwrap();
        assert!((params.slip_lateral - 0.0012).abs() < 1e-12);
        assert!((params.slip_longitudinal - 0.0024).abs() < 1e-12);
    }

    #[test]
    fn test_broadcast_changes_one_coefficient_uniformly() {
        let (_world, model, wheel) = wheel_model(Box::new(CylinderShape::new(0.3, 0.1)));
        let controller = WheelSlipController::load(&model, &[base_config("wheel")]);

        wheel.set_world_angular_vel(Vec3::new(0.0, 2.0, 0.0)).unwrap();
        controller.on_lateral_compliance("0.5");
        controller.update();

        let surface = model.collisions("wheel")[0].surface();
        let params = surface.lock().unwrap();
        // Lateral picked up the broadcast value, longitudinal did not.
        assert!((params.slip_lateral - 0.6 / 50.0 * 0.5).abs() < 1e-12);
        assert!((params.slip_longitudinal - 0.0024).abs() < 1e-12);
    }

    #[test]
    fn test_malformed_payload_keeps_previous_value() {
        let (_world, model, wheel) = wheel_model(Box::new(CylinderShape::new(0.3, 0.1)));
        let controller = WheelSlipController::load(&model, &[base_config("wheel")]);

        wheel.set_world_angular_vel(Vec3::new(0.0, 2.0, 0.0)).unwrap();
        controller.on_lateral_compliance("abc");
        controller.update();

        let surface = model.collisions("wheel")[0].surface();
        let params = surface.lock().unwrap();
        assert!((params.slip_lateral - 0.0012).abs() < 1e-12);
    }

    #[test]
    fn test_slips_reports_chassis_frame_components() {
        let (_world, model, wheel) = wheel_model(Box::new(CylinderShape::new(0.3, 0.1)));
        let controller = WheelSlipController::load(&model, &[base_config("wheel")]);

        wheel.set_world_angular_vel(Vec3::new(0.0, 2.0, 0.0)).unwrap();
        wheel
            .set_world_linear_vel(Vec3::new(1.0, 0.2, 0.0))
            .unwrap();

        let slips = controller.slips(&Pose::identity());
        let slip = slips["wheel"];
        assert!((slip.x - (1.0 - 0.3 * 2.0)).abs() < 1e-6);
        assert!((slip.y - 0.2).abs() < 1e-6);
        assert!((slip.z - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_slips_does_not_mutate_surface_state() {
        let (_world, model, wheel) = wheel_model(Box::new(CylinderShape::new(0.3, 0.1)));
        let controller = WheelSlipController::load(&model, &[base_config("wheel")]);

        wheel.set_world_angular_vel(Vec3::new(0.0, 2.0, 0.0)).unwrap();
        let _ = controller.slips(&Pose::identity());

        let surface = model.collisions("wheel")[0].surface();
        assert_eq!(surface.lock().unwrap().slip_lateral, 0.0);
    }
}
