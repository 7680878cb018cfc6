use crate::math::Vector3D;

/// Newtonian gravitational constant, m^3 kg^-1 s^-2.
pub const G: f64 = 6.674_30e-11;

/// Standard gravitational parameter mu = G * M.
pub fn gravitational_parameter(mass: f64, g: f64) -> f64 {
    g * mass
}

/// Point-mass acceleration felt at `from` due to a body of `mass` at `attractor`.
///
/// a = g * M / |r|^2 * r_hat, with r pointing from `from` to `attractor`.
/// Coincident positions give zero rather than an infinite pull.
pub fn point_mass_accel(from: &Vector3D, attractor: &Vector3D, mass: f64, g: f64) -> Vector3D {
    let r = attractor - from;
    let r2 = r.norm_squared();
    if r2 == 0.0 {
        return Vector3D::zeros();
    }
    // r_hat / |r|^2 == r / |r|^3
    r * (gravitational_parameter(mass, g) / (r2 * r2.sqrt()))
}
