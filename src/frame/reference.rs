use serde::{Deserialize, Serialize};

use crate::math::{
    narrow_rotation, widen, widen_rotation, PrecisionExt, QuaternionD, QuaternionF, Vector3D,
    Vector3F,
};

// ---------------------------------------------------------------------------
// Reference frame: absolute (f64) <-> local (f32)
// ---------------------------------------------------------------------------

/// Mapping between the absolute inertial space and the local rendering space.
///
/// Frames are values. [`ReferenceFrame::shift`] returns a new frame and leaves
/// the receiver untouched; the floating origin installs the result explicitly.
///
/// The origin is held at double precision. Only `absolute - origin` is narrowed,
/// so local coordinates keep full `f32` precision close to the origin no matter
/// how large the absolute coordinates are.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReferenceFrame {
    /// local = absolute, narrowed.
    #[default]
    Identity,
    /// local = absolute - origin.
    Offset { origin: Vector3D },
}

impl ReferenceFrame {
    pub fn offset(origin: Vector3D) -> Self {
        ReferenceFrame::Offset { origin }
    }

    /// Absolute position of the local origin.
    pub fn origin(&self) -> Vector3D {
        match self {
            ReferenceFrame::Identity => Vector3D::zeros(),
            ReferenceFrame::Offset { origin } => *origin,
        }
    }

    pub fn transform_position(&self, absolute: &Vector3D) -> Vector3F {
        match self {
            ReferenceFrame::Identity => absolute.narrow(),
            ReferenceFrame::Offset { origin } => (absolute - origin).narrow(),
        }
    }

    pub fn inverse_transform_position(&self, local: &Vector3F) -> Vector3D {
        match self {
            ReferenceFrame::Identity => widen(local),
            ReferenceFrame::Offset { origin } => widen(local) + origin,
        }
    }

    /// Neither variant rotates, so orientations only change precision.
    pub fn transform_rotation(&self, absolute: &QuaternionD) -> QuaternionF {
        match self {
            ReferenceFrame::Identity | ReferenceFrame::Offset { .. } => narrow_rotation(absolute),
        }
    }

    pub fn inverse_transform_rotation(&self, local: &QuaternionF) -> QuaternionD {
        match self {
            ReferenceFrame::Identity | ReferenceFrame::Offset { .. } => widen_rotation(local),
        }
    }

    /// New frame whose origin sits `delta` (absolute units) away from this one.
    #[must_use]
    pub fn shift(&self, delta: &Vector3D) -> ReferenceFrame {
        ReferenceFrame::Offset {
            origin: self.origin() + delta,
        }
    }
}
