use std::f64::consts::PI;

use crate::math::Vector3D;

/// Circular orbit speed at radius `r` around a body with parameter `mu`.
pub fn circular_velocity(mu: f64, r: f64) -> f64 {
    (mu / r).sqrt()
}

/// Period of an orbit with semi-major axis `sma`, s.
pub fn orbital_period(sma: f64, mu: f64) -> f64 {
    2.0 * PI * (sma.powi(3) / mu).sqrt()
}

/// State on a circular orbit about a moving parent.
///
/// The body starts on the parent's +X side; `inclination` tilts the orbit
/// plane about X (0 = prograde in the XY plane).
pub fn circular_orbit(
    parent_pos: &Vector3D,
    parent_vel: &Vector3D,
    mu: f64,
    radius: f64,
    inclination: f64,
) -> (Vector3D, Vector3D) {
    let v = circular_velocity(mu, radius);
    let pos = parent_pos + Vector3D::new(radius, 0.0, 0.0);
    let vel = parent_vel + Vector3D::new(0.0, v * inclination.cos(), v * inclination.sin());
    (pos, vel)
}
