//! 4x4 homogeneous transform matrices.

use std::ops::Mul;

use crate::error::MathError;
use crate::quaternion::Quaternion;
use crate::Vec3;

/// A 4x4 homogeneous transformation matrix: a 3x3 rotation block plus a
/// translation column.
///
/// A matrix is *affine* iff its bottom row is exactly `(0, 0, 0, 1)`.
/// The affine-only point transform fails fast on anything else instead
/// of silently returning a wrong answer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix4 {
    /// The underlying 4x4 matrix.
    pub matrix: nalgebra::Matrix4<f64>,
}

impl Matrix4 {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: nalgebra::Matrix4::identity(),
        }
    }

    /// Build from an orientation and a translation.
    pub fn from_parts(rotation: &Quaternion, translation: Vec3) -> Self {
        let mut out = rotation.to_matrix();
        out.set_translation(translation);
        out
    }

    /// Overwrite the translation column.
    pub fn set_translation(&mut self, t: Vec3) {
        self.matrix[(0, 3)] = t.x;
        self.matrix[(1, 3)] = t.y;
        self.matrix[(2, 3)] = t.z;
    }

    /// The translation column.
    pub fn translation(&self) -> Vec3 {
        Vec3::new(
            self.matrix[(0, 3)],
            self.matrix[(1, 3)],
            self.matrix[(2, 3)],
        )
    }

    /// True iff the bottom row is exactly `(0, 0, 0, 1)`.
    pub fn is_affine(&self) -> bool {
        self.matrix[(3, 0)] == 0.0
            && self.matrix[(3, 1)] == 0.0
            && self.matrix[(3, 2)] == 0.0
            && self.matrix[(3, 3)] == 1.0
    }

    /// Transform a point assuming pure rotation + translation.
    ///
    /// Fails with [`MathError::NotAffine`] if the matrix has a
    /// non-trivial projective row.
    pub fn transform_affine(&self, v: &Vec3) -> Result<Vec3, MathError> {
        if !self.is_affine() {
            return Err(MathError::NotAffine);
        }
        Ok(self.transform(v))
    }

    /// Transform a point through the rotation block and translation
    /// column, ignoring the projective row.
    pub fn transform(&self, v: &Vec3) -> Vec3 {
        let m = &self.matrix;
        Vec3::new(
            m[(0, 0)] * v.x + m[(0, 1)] * v.y + m[(0, 2)] * v.z + m[(0, 3)],
            m[(1, 0)] * v.x + m[(1, 1)] * v.y + m[(1, 2)] * v.z + m[(1, 3)],
            m[(2, 0)] * v.x + m[(2, 1)] * v.y + m[(2, 2)] * v.z + m[(2, 3)],
        )
    }
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for Matrix4 {
    type Output = Matrix4;

    /// Matrix product: `(a * b).transform(p)` applies `b` first.
    fn mul(self, rhs: Matrix4) -> Matrix4 {
        Matrix4 {
            matrix: self.matrix * rhs.matrix,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_identity_is_affine() {
        assert!(Matrix4::identity().is_affine());
    }

    #[test]
    fn test_non_affine_rejected() {
        let mut m = Matrix4::identity();
        m.matrix[(3, 1)] = 1e-12;
        assert!(!m.is_affine());
        assert_eq!(
            m.transform_affine(&Vec3::x()),
            Err(MathError::NotAffine)
        );
    }

    #[test]
    fn test_transform_affine_rotation_translation() {
        let rot = Quaternion::from_axis_angle(Vec3::z(), PI / 2.0);
        let m = Matrix4::from_parts(&rot, Vec3::new(1.0, 2.0, 3.0));
        let p = m.transform_affine(&Vec3::x()).unwrap();
        assert!((p - Vec3::new(1.0, 3.0, 3.0)).norm() < 1e-12);
    }

    #[test]
    fn test_compose_applies_rhs_first() {
        let rot = Quaternion::from_axis_angle(Vec3::z(), PI / 2.0);
        let r = Matrix4::from_parts(&rot, Vec3::zeros());
        let t = Matrix4::from_parts(&Quaternion::identity(), Vec3::new(1.0, 0.0, 0.0));
        // Translate then rotate: (1,0,0) -> (2,0,0) -> (0,2,0).
        let p = (r * t).transform(&Vec3::x());
        assert!((p - Vec3::new(0.0, 2.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_translation_roundtrip() {
        let mut m = Matrix4::identity();
        m.set_translation(Vec3::new(-4.0, 0.5, 9.0));
        assert_eq!(m.translation(), Vec3::new(-4.0, 0.5, 9.0));
        assert!(m.is_affine());
    }
}
