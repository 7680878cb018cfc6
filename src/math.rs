use nalgebra::{UnitQuaternion, Vector3};

// ---------------------------------------------------------------------------
// Precision primitives
// ---------------------------------------------------------------------------

/// Double-precision vector: absolute inertial space.
pub type Vector3D = Vector3<f64>;
/// Single-precision vector: local rendering / physics space.
pub type Vector3F = Vector3<f32>;
/// Double-precision orientation.
pub type QuaternionD = UnitQuaternion<f64>;
/// Single-precision orientation.
pub type QuaternionF = UnitQuaternion<f32>;

/// Helpers on [`Vector3D`] that keep force code free of NaNs and panics.
pub trait PrecisionExt {
    /// Unit vector in the same direction, or the zero vector for a zero input.
    fn normalized_or_zero(&self) -> Vector3D;

    /// Narrow to the rendering-space type.
    fn narrow(&self) -> Vector3F;
}

impl PrecisionExt for Vector3D {
    fn normalized_or_zero(&self) -> Vector3D {
        self.try_normalize(0.0).unwrap_or_else(Vector3D::zeros)
    }

    fn narrow(&self) -> Vector3F {
        self.cast::<f32>()
    }
}

/// Widen a rendering-space vector to double precision (lossless).
pub fn widen(v: &Vector3F) -> Vector3D {
    v.cast::<f64>()
}

/// Narrow an orientation, renormalising after the cast.
pub fn narrow_rotation(q: &QuaternionD) -> QuaternionF {
    UnitQuaternion::new_normalize(q.quaternion().cast::<f32>())
}

/// Widen an orientation, renormalising after the cast.
pub fn widen_rotation(q: &QuaternionF) -> QuaternionD {
    UnitQuaternion::new_normalize(q.quaternion().cast::<f64>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_vector_normalizes_to_zero() {
        let n = Vector3D::zeros().normalized_or_zero();
        assert_eq!(n, Vector3D::zeros());
    }

    #[test]
    fn normalized_has_unit_length() {
        let n = Vector3D::new(3.0, -4.0, 12.0).normalized_or_zero();
        assert!((n.norm() - 1.0).abs() < 1e-12);
        assert!((n.x - 3.0 / 13.0).abs() < 1e-12);
    }

    #[test]
    fn narrow_then_widen_is_close() {
        let v = Vector3D::new(1234.5678, -0.001, 9_999.0);
        let back = widen(&v.narrow());
        assert!((back - v).norm() < 1e-3);
    }

    #[test]
    fn rotation_stays_unit_after_narrowing() {
        let q = QuaternionD::from_euler_angles(0.3, -1.1, 2.0);
        let nq = narrow_rotation(&q);
        assert!((nq.quaternion().norm() - 1.0).abs() < 1e-6);
        assert!(widen_rotation(&nq).angle_to(&q) < 1e-5);
    }
}
