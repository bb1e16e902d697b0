//! Unit-quaternion orientation algebra.

use std::ops::{Add, Mul, Neg, Sub};

use crate::matrix::Matrix4;
use crate::Vec3;

/// An orientation stored as a quaternion `(w, x, y, z)`.
///
/// Constructors normalize explicitly, so a freshly built quaternion has
/// unit norm. Products of quaternions are not renormalized; callers
/// composing long chains should call [`Quaternion::normalize`]
/// periodically to keep drift in check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    /// Scalar component.
    pub w: f64,
    /// First vector component.
    pub x: f64,
    /// Second vector component.
    pub y: f64,
    /// Third vector component.
    pub z: f64,
}

impl Quaternion {
    /// Create a quaternion from raw components. No normalization.
    pub fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    /// The identity rotation.
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0)
    }

    /// Build a normalized quaternion from Euler angles (radians),
    /// applied in roll-pitch-yaw order.
    pub fn from_euler(roll: f64, pitch: f64, yaw: f64) -> Self {
        let phi = roll / 2.0;
        let the = pitch / 2.0;
        let psi = yaw / 2.0;

        let mut q = Self::new(
            phi.cos() * the.cos() * psi.cos() + phi.sin() * the.sin() * psi.sin(),
            phi.sin() * the.cos() * psi.cos() - phi.cos() * the.sin() * psi.sin(),
            phi.cos() * the.sin() * psi.cos() + phi.sin() * the.cos() * psi.sin(),
            phi.cos() * the.cos() * psi.sin() - phi.sin() * the.sin() * psi.cos(),
        );
        q.normalize();
        q
    }

    /// Build a normalized quaternion rotating by `angle` radians about
    /// `axis`. A degenerate (zero-length) axis yields the identity.
    pub fn from_axis_angle(axis: Vec3, angle: f64) -> Self {
        let l = axis.norm_squared();
        let mut q = if l > 0.0 {
            let half = angle * 0.5;
            let s = half.sin() / l.sqrt();
            Self::new(half.cos(), axis.x * s, axis.y * s, axis.z * s)
        } else {
            Self::identity()
        };
        q.normalize();
        q
    }

    /// Squared norm of all four components.
    pub fn norm_squared(&self) -> f64 {
        self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Norm of all four components.
    pub fn norm(&self) -> f64 {
        self.norm_squared().sqrt()
    }

    /// Normalize in place. A zero quaternion becomes the identity
    /// rather than dividing by zero.
    pub fn normalize(&mut self) {
        let s = self.norm();
        if s == 0.0 {
            *self = Self::identity();
        } else {
            self.w /= s;
            self.x /= s;
            self.y /= s;
            self.z /= s;
        }
    }

    /// Return a normalized copy.
    pub fn normalized(&self) -> Self {
        let mut q = *self;
        q.normalize();
        q
    }

    /// True inverse: conjugate divided by the squared norm, so this
    /// inverts non-unit quaternions too. The norm is assumed non-zero;
    /// passing a zero quaternion yields an undefined result.
    pub fn inverse(&self) -> Self {
        let n = self.norm_squared();
        Self::new(self.w / n, -self.x / n, -self.y / n, -self.z / n)
    }

    /// Dot product of all four components.
    pub fn dot(&self, other: &Self) -> f64 {
        self.w * other.w + self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Rotate a vector by this orientation.
    ///
    /// Uses the double cross-product identity rather than the full
    /// quaternion-conjugate expansion.
    pub fn rotate(&self, v: &Vec3) -> Vec3 {
        let qvec = Vec3::new(self.x, self.y, self.z);
        let uv = qvec.cross(v);
        let uuv = qvec.cross(&uv);
        v + uv * (2.0 * self.w) + uuv * 2.0
    }

    /// Rotate a vector by the inverse of this orientation.
    pub fn rotate_reverse(&self, v: &Vec3) -> Vec3 {
        self.inverse().rotate(v)
    }

    /// Decompose into Euler angles (roll, pitch, yaw) in radians.
    ///
    /// The pitch argument of `asin` is clamped to `[-1, 1]` so that
    /// floating round-off at the gimbal-lock boundary cannot produce
    /// a NaN.
    pub fn to_euler(&self) -> Vec3 {
        let q = self.normalized();

        let squ = q.w * q.w;
        let sqx = q.x * q.x;
        let sqy = q.y * q.y;
        let sqz = q.z * q.z;

        let roll = (2.0 * (q.y * q.z + q.w * q.x)).atan2(squ - sqx - sqy + sqz);
        let sarg = (-2.0 * (q.x * q.z - q.w * q.y)).clamp(-1.0, 1.0);
        let pitch = sarg.asin();
        let yaw = (2.0 * (q.x * q.y + q.w * q.z)).atan2(squ + sqx - sqy - sqz);

        Vec3::new(roll, pitch, yaw)
    }

    /// Euler roll angle in radians.
    pub fn roll(&self) -> f64 {
        self.to_euler().x
    }

    /// Euler pitch angle in radians.
    pub fn pitch(&self) -> f64 {
        self.to_euler().y
    }

    /// Euler yaw angle in radians.
    pub fn yaw(&self) -> f64 {
        self.to_euler().z
    }

    /// Decompose into a rotation axis and angle (radians).
    ///
    /// A quaternion with no vector part yields angle zero about +X.
    pub fn to_axis_angle(&self) -> (Vec3, f64) {
        let len = self.x * self.x + self.y * self.y + self.z * self.z;
        if len > 0.0 {
            let angle = 2.0 * self.w.clamp(-1.0, 1.0).acos();
            let inv_len = 1.0 / len.sqrt();
            (
                Vec3::new(self.x * inv_len, self.y * inv_len, self.z * inv_len),
                angle,
            )
        } else {
            (Vec3::x(), 0.0)
        }
    }

    /// Scale the rotation angle by `factor`, keeping the axis.
    pub fn scaled(&self, factor: f64) -> Self {
        let (axis, angle) = self.to_axis_angle();
        Self::from_axis_angle(axis, angle * factor)
    }

    /// Spherical linear interpolation from `p` (t = 0) to `q` (t = 1).
    ///
    /// With `shortest_path` set, `q` is negated when the dot product of
    /// the two orientations is negative, so the interpolation takes the
    /// shorter of the two great-circle arcs. When the orientations are
    /// nearly parallel or nearly opposite the sin-based formula divides
    /// by near-zero, so this falls back to normalized linear
    /// interpolation.
    pub fn slerp(t: f64, p: &Self, q: &Self, shortest_path: bool) -> Self {
        let mut cos = p.dot(q);
        let rk = if cos < 0.0 && shortest_path {
            cos = -cos;
            -*q
        } else {
            *q
        };

        if cos.abs() < 1.0 - 1e-3 {
            let sin = (1.0 - cos * cos).sqrt();
            let angle = sin.atan2(cos);
            let inv_sin = 1.0 / sin;
            let c0 = ((1.0 - t) * angle).sin() * inv_sin;
            let c1 = (t * angle).sin() * inv_sin;
            *p * c0 + rk * c1
        } else {
            let mut out = *p * (1.0 - t) + rk * t;
            out.normalize();
            out
        }
    }

    /// Spherical quadratic interpolation: a smooth blend between `p`
    /// and `q` shaped by the inner control orientations `a` and `b`.
    pub fn squad(t: f64, p: &Self, a: &Self, b: &Self, q: &Self, shortest_path: bool) -> Self {
        let slerp_t = 2.0 * t * (1.0 - t);
        let sp = Self::slerp(t, p, q, shortest_path);
        let sq = Self::slerp(t, a, b, false);
        Self::slerp(slerp_t, &sp, &sq, false)
    }

    /// The rotated X basis vector.
    pub fn x_axis(&self) -> Vec3 {
        let ty = 2.0 * self.y;
        let tz = 2.0 * self.z;
        Vec3::new(
            1.0 - (ty * self.y + tz * self.z),
            ty * self.x + tz * self.w,
            tz * self.x - ty * self.w,
        )
    }

    /// The rotated Y basis vector.
    pub fn y_axis(&self) -> Vec3 {
        let tx = 2.0 * self.x;
        let ty = 2.0 * self.y;
        let tz = 2.0 * self.z;
        Vec3::new(
            ty * self.x - tz * self.w,
            1.0 - (tx * self.x + tz * self.z),
            tz * self.y + tx * self.w,
        )
    }

    /// The rotated Z basis vector.
    pub fn z_axis(&self) -> Vec3 {
        let tx = 2.0 * self.x;
        let ty = 2.0 * self.y;
        let tz = 2.0 * self.z;
        Vec3::new(
            tz * self.x + ty * self.w,
            tz * self.y - tx * self.w,
            1.0 - (tx * self.x + ty * self.y),
        )
    }

    /// Expand to a 4x4 homogeneous rotation matrix.
    ///
    /// Works on a normalized copy, so a drifted quaternion still
    /// produces a proper rotation block.
    pub fn to_matrix(&self) -> Matrix4 {
        let q = self.normalized();
        let mut m = nalgebra::Matrix4::identity();

        m[(0, 0)] = 1.0 - 2.0 * q.y * q.y - 2.0 * q.z * q.z;
        m[(0, 1)] = 2.0 * q.x * q.y - 2.0 * q.z * q.w;
        m[(0, 2)] = 2.0 * q.x * q.z + 2.0 * q.y * q.w;
        m[(1, 0)] = 2.0 * q.x * q.y + 2.0 * q.z * q.w;
        m[(1, 1)] = 1.0 - 2.0 * q.x * q.x - 2.0 * q.z * q.z;
        m[(1, 2)] = 2.0 * q.y * q.z - 2.0 * q.x * q.w;
        m[(2, 0)] = 2.0 * q.x * q.z - 2.0 * q.y * q.w;
        m[(2, 1)] = 2.0 * q.y * q.z + 2.0 * q.x * q.w;
        m[(2, 2)] = 1.0 - 2.0 * q.x * q.x - 2.0 * q.y * q.y;

        Matrix4 { matrix: m }
    }

    /// True when all four components are finite.
    pub fn is_finite(&self) -> bool {
        self.w.is_finite() && self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for Quaternion {
    type Output = Quaternion;

    /// Quaternion product. `a * b` means rotate by `b`, then by `a`;
    /// the same convention holds whether the result rotates a vector
    /// or another orientation. Not commutative, and the product is not
    /// renormalized.
    fn mul(self, rhs: Quaternion) -> Quaternion {
        Quaternion::new(
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
        )
    }
}

impl Mul<f64> for Quaternion {
    type Output = Quaternion;

    fn mul(self, f: f64) -> Quaternion {
        Quaternion::new(self.w * f, self.x * f, self.y * f, self.z * f)
    }
}

impl Add for Quaternion {
    type Output = Quaternion;

    fn add(self, rhs: Quaternion) -> Quaternion {
        Quaternion::new(
            self.w + rhs.w,
            self.x + rhs.x,
            self.y + rhs.y,
            self.z + rhs.z,
        )
    }
}

impl Sub for Quaternion {
    type Output = Quaternion;

    fn sub(self, rhs: Quaternion) -> Quaternion {
        Quaternion::new(
            self.w - rhs.w,
            self.x - rhs.x,
            self.y - rhs.y,
            self.z - rhs.z,
        )
    }
}

impl Neg for Quaternion {
    type Output = Quaternion;

    fn neg(self) -> Quaternion {
        Quaternion::new(-self.w, -self.x, -self.y, -self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn assert_vec_close(a: &Vec3, b: &Vec3, tol: f64) {
        assert!((a - b).norm() < tol, "expected {a:?} ~= {b:?}");
    }

    #[test]
    fn test_identity_default() {
        let q = Quaternion::default();
        assert_eq!(q.w, 1.0);
        assert_eq!(q.x, 0.0);
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_vec_close(&q.rotate(&v), &v, 1e-12);
    }

    #[test]
    fn test_normalize_unit_norm() {
        let mut q = Quaternion::new(2.0, -3.0, 0.5, 4.0);
        q.normalize();
        assert!((q.norm() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_zero_yields_identity() {
        let mut q = Quaternion::new(0.0, 0.0, 0.0, 0.0);
        q.normalize();
        assert_eq!(q, Quaternion::identity());
    }

    #[test]
    fn test_from_axis_angle_zero_axis_is_identity() {
        let q = Quaternion::from_axis_angle(Vec3::zeros(), 1.3);
        assert_eq!(q, Quaternion::identity());
    }

    #[test]
    fn test_axis_angle_roundtrip() {
        let axis = Vec3::new(1.0, 2.0, -1.0).normalize();
        for angle in [0.1, 1.0, 2.5, PI - 0.01, 5.0] {
            let q = Quaternion::from_axis_angle(axis, angle);
            let (rx_axis, rx_angle) = q.to_axis_angle();
            // Wrap ambiguity: (axis, a) and (-axis, 2pi - a) are the
            // same rotation.
            let same = (rx_axis - axis).norm() < 1e-9 && (rx_angle - angle).abs() < 1e-9;
            let flipped = (rx_axis + axis).norm() < 1e-9
                && (rx_angle - (2.0 * PI - angle)).abs() < 1e-9;
            assert!(same || flipped, "angle {angle}: got {rx_axis:?}, {rx_angle}");
        }
    }

    #[test]
    fn test_degenerate_axis_angle_decomposition() {
        let (axis, angle) = Quaternion::identity().to_axis_angle();
        assert_eq!(angle, 0.0);
        assert_vec_close(&axis, &Vec3::x(), 1e-12);
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let q = Quaternion::from_axis_angle(Vec3::z(), PI / 2.0);
        let r = q.rotate(&Vec3::x());
        assert_vec_close(&r, &Vec3::y(), 1e-12);
    }

    #[test]
    fn test_rotate_reverse_inverts_rotate() {
        let q = Quaternion::from_euler(0.4, -1.1, 2.2);
        let v = Vec3::new(0.3, -2.0, 1.5);
        let back = q.rotate_reverse(&q.rotate(&v));
        assert_vec_close(&back, &v, 1e-12);
    }

    #[test]
    fn test_rotate_reverse_matches_inverse_rotate() {
        let q = Quaternion::from_euler(1.0, 0.2, -0.7);
        let v = Vec3::new(-1.0, 4.0, 0.25);
        assert_eq!(q.rotate_reverse(&v), q.inverse().rotate(&v));
    }

    #[test]
    fn test_compose_convention() {
        // a * b applies b first: rotate x by 90 deg about z (-> y),
        // then 90 deg about x (-> z).
        let a = Quaternion::from_axis_angle(Vec3::x(), PI / 2.0);
        let b = Quaternion::from_axis_angle(Vec3::z(), PI / 2.0);
        let composed = (a * b).rotate(&Vec3::x());
        let stepwise = a.rotate(&b.rotate(&Vec3::x()));
        assert_vec_close(&composed, &stepwise, 1e-12);
        assert_vec_close(&composed, &Vec3::z(), 1e-12);
    }

    #[test]
    fn test_compose_inverse_is_identity() {
        let q = Quaternion::from_euler(0.9, -0.3, 1.7);
        let r = q * q.inverse();
        assert!((r.w - 1.0).abs() < 1e-12);
        assert!(r.x.abs() < 1e-12 && r.y.abs() < 1e-12 && r.z.abs() < 1e-12);
    }

    #[test]
    fn test_inverse_of_non_unit_quaternion() {
        let q = Quaternion::new(2.0, 0.0, 0.0, 0.0);
        let r = q * q.inverse();
        assert!((r.w - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_euler_roundtrip() {
        let q = Quaternion::from_euler(0.1, -0.5, 2.0);
        let e = q.to_euler();
        assert!((e.x - 0.1).abs() < 1e-9);
        assert!((e.y + 0.5).abs() < 1e-9);
        assert!((e.z - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_euler_gimbal_lock_no_nan() {
        // Pitch exactly +-90 deg puts the asin argument at the edge of
        // its domain; round-off must not produce NaN.
        let q = Quaternion::from_euler(0.0, PI / 2.0, 0.0);
        let e = q.to_euler();
        assert!(e.x.is_finite() && e.y.is_finite() && e.z.is_finite());
        assert!((e.y - PI / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_slerp_endpoints() {
        let p = Quaternion::from_euler(0.2, 0.3, 0.4);
        let q = Quaternion::from_euler(-1.0, 0.5, 1.1);
        let s0 = Quaternion::slerp(0.0, &p, &q, false);
        let s1 = Quaternion::slerp(1.0, &p, &q, false);
        assert!((s0.dot(&p).abs() - 1.0).abs() < 1e-9);
        assert!((s1.dot(&q).abs() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_slerp_identical_endpoints() {
        let p = Quaternion::from_euler(0.7, -0.1, 0.2);
        for t in [0.0, 0.25, 0.5, 0.99] {
            let s = Quaternion::slerp(t, &p, &p, false);
            assert!((s.dot(&p).abs() - 1.0).abs() < 1e-9, "t = {t}");
        }
    }

    #[test]
    fn test_slerp_shortest_path() {
        let p = Quaternion::from_axis_angle(Vec3::z(), 0.1);
        let q = -Quaternion::from_axis_angle(Vec3::z(), 0.3);
        // Same rotation as +0.3 about z; shortest path must interpolate
        // through the small arc, not the long way around.
        let mid = Quaternion::slerp(0.5, &p, &q, true);
        let (_, angle) = mid.to_axis_angle();
        let angle = if angle > std::f64::consts::PI {
            2.0 * std::f64::consts::PI - angle
        } else {
            angle
        };
        assert!((angle - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_squad_endpoints() {
        let p = Quaternion::from_euler(0.1, 0.0, 0.0);
        let a = Quaternion::from_euler(0.2, 0.1, 0.0);
        let b = Quaternion::from_euler(0.3, 0.2, 0.0);
        let q = Quaternion::from_euler(0.4, 0.3, 0.0);
        let s0 = Quaternion::squad(0.0, &p, &a, &b, &q, false);
        let s1 = Quaternion::squad(1.0, &p, &a, &b, &q, false);
        assert!((s0.dot(&p).abs() - 1.0).abs() < 1e-9);
        assert!((s1.dot(&q).abs() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_to_matrix_matches_rotate() {
        let q = Quaternion::from_euler(0.3, 1.2, -0.8);
        let m = q.to_matrix();
        for v in [Vec3::x(), Vec3::y(), Vec3::new(0.5, -1.0, 2.0)] {
            let by_matrix = m.transform(&v);
            let by_rotate = q.rotate(&v);
            assert_vec_close(&by_matrix, &by_rotate, 1e-9);
        }
    }

    #[test]
    fn test_basis_axes() {
        let q = Quaternion::from_axis_angle(Vec3::z(), PI / 2.0);
        assert_vec_close(&q.x_axis(), &Vec3::y(), 1e-12);
        assert_vec_close(&q.y_axis(), &(-Vec3::x()), 1e-12);
        assert_vec_close(&q.z_axis(), &Vec3::z(), 1e-12);
    }

    #[test]
    fn test_scaled_halves_angle() {
        let q = Quaternion::from_axis_angle(Vec3::y(), 1.0);
        let half = q.scaled(0.5);
        let (_, angle) = half.to_axis_angle();
        assert!((angle - 0.5).abs() < 1e-9);
    }
}
