//! Coordinate and derived-quantity transforms
//!
//! Pure functions, no state. Units are stated per function; everything
//! is SI internally apart from the instrument conventions (km, km/s,
//! cm⁻³) used at the boundaries.

use super::constants::{
    JULIAN_YEAR_S, KELVIN_PER_EV, PROTON_MASS, SOLAR_MASS, SOLAR_RADIUS_KM, BOLTZMANN,
};

/// Spherical position: heliocentric distance plus inclination and azimuth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphericalPosition {
    /// Heliocentric distance (same unit as the Cartesian input, km in practice)
    pub r: f64,
    /// Inclination from +z (radians, 0..π)
    pub theta: f64,
    /// Azimuth in the x-y plane (radians, -π..π)
    pub phi: f64,
}

/// Convert Cartesian (x, y, z) to spherical (r, θ, φ).
///
/// Precondition: r > 0. At the origin θ is NaN; this is not guarded.
pub fn cartesian_to_spherical(x: f64, y: f64, z: f64) -> SphericalPosition {
    let r = (x * x + y * y + z * z).sqrt();
    SphericalPosition {
        r,
        theta: (z / r).acos(),
        phi: y.atan2(x),
    }
}

/// Proton temperature (K) from thermal speed w (km/s).
///
/// T = (w·10³)² · m_p / (2 k_B)
pub fn thermal_speed_to_temperature(w_km_s: f64) -> f64 {
    let w_si = w_km_s * 1e3;
    w_si * w_si * PROTON_MASS / (2.0 * BOLTZMANN)
}

/// Temperature in kelvin from an energy in electron-volts.
pub fn ev_to_kelvin(electron_volts: f64) -> f64 {
    electron_volts * KELVIN_PER_EV
}

/// Ion radial velocity with the spacecraft's own radial motion removed.
pub fn correct_radial_velocity(ion_vr: f64, spacecraft_vr: f64) -> f64 {
    ion_vr - spacecraft_vr
}

/// Heliocentric distance in solar radii from kilometres.
pub fn km_to_solar_radii(r_km: f64) -> f64 {
    r_km / SOLAR_RADIUS_KM
}

/// Heliolatitude (degrees) from inclination θ (radians).
pub fn heliolatitude_deg(theta: f64) -> f64 {
    90.0 - theta.to_degrees()
}

/// Map absolute times onto [0, 1] between the first and last entry.
///
/// A single-element (or zero-span) sequence maps to all zeros.
pub fn relative_time(epochs: &[f64]) -> Vec<f64> {
    let (Some(&start), Some(&end)) = (epochs.first(), epochs.last()) else {
        return Vec::new();
    };
    let span = end - start;
    if epochs.len() == 1 || span == 0.0 {
        return vec![0.0; epochs.len()];
    }
    epochs.iter().map(|t| (t - start) / span).collect()
}

/// Radial component of a Cartesian velocity at spherical angles (θ, φ).
pub fn radial_projection(vx: f64, vy: f64, vz: f64, theta: f64, phi: f64) -> f64 {
    vx * theta.sin() * phi.cos() + vy * theta.sin() * phi.sin() + vz * theta.cos()
}

/// Proton number density (cm⁻³) from log10 of the mass density (kg/m³).
pub fn density_from_log_rho(log_rho: f64) -> f64 {
    10f64.powf(log_rho) / PROTON_MASS * 1e-6
}

/// Mass-loss rate Ṁ = 4π r² n m_p v_r in solar masses per year.
///
/// Inputs in instrument units: r (km), n (cm⁻³), v_r (km/s).
pub fn mass_loss_rate(r_km: f64, np_cm3: f64, vr_km_s: f64) -> f64 {
    let r_m = r_km * 1e3;
    let rho = np_cm3 * 1e6 * PROTON_MASS;
    let kg_per_s = 4.0 * std::f64::consts::PI * r_m * r_m * rho * vr_km_s * 1e3;
    kg_per_s * JULIAN_YEAR_S / SOLAR_MASS
}

/// Ram pressure P = n m_p v_r² in pascal.
pub fn ram_pressure(np_cm3: f64, vr_km_s: f64) -> f64 {
    let v = vr_km_s * 1e3;
    np_cm3 * 1e6 * PROTON_MASS * v * v
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics_engine::constants::SOLAR_RADIUS_KM;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    #[test]
    fn test_spherical_on_axes() {
        let p = cartesian_to_spherical(3.0, 0.0, 4.0);
        assert!((p.r - 5.0).abs() < 1e-12);
        assert!((p.theta - (4.0f64 / 5.0).acos()).abs() < 1e-12);
        assert_eq!(p.phi, 0.0);

        let q = cartesian_to_spherical(1.0, 1.0, 0.0);
        assert!((q.theta - FRAC_PI_2).abs() < 1e-12);
        assert!((q.phi - FRAC_PI_4).abs() < 1e-12);
    }

    #[test]
    fn test_origin_is_not_guarded() {
        let p = cartesian_to_spherical(0.0, 0.0, 0.0);
        assert_eq!(p.r, 0.0);
        assert!(p.theta.is_nan());
    }

    #[test]
    fn test_thermal_speed_temperature() {
        // 50 km/s thermal speed is roughly 1.5e5 K
        let t = thermal_speed_to_temperature(50.0);
        assert!((t - 151_434.39).abs() < 0.1, "got {t}");
    }

    #[test]
    fn test_ev_to_kelvin() {
        assert!((ev_to_kelvin(1.0) - 11_604.518).abs() < 0.01);
    }

    #[test]
    fn test_velocity_correction() {
        assert_eq!(correct_radial_velocity(350.0, 90.0), 260.0);
    }

    #[test]
    fn test_solar_radii() {
        assert!((km_to_solar_radii(10.0 * SOLAR_RADIUS_KM) - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_relative_time() {
        assert_eq!(relative_time(&[10.0, 15.0, 20.0]), vec![0.0, 0.5, 1.0]);
        assert_eq!(relative_time(&[42.0]), vec![0.0]);
        assert!(relative_time(&[]).is_empty());
    }

    #[test]
    fn test_heliolatitude() {
        assert!((heliolatitude_deg(FRAC_PI_2)).abs() < 1e-12);
        assert!((heliolatitude_deg(0.0) - 90.0).abs() < 1e-12);
    }

    #[test]
    fn test_radial_projection_along_radius() {
        // Velocity pointing along +x at θ = π/2, φ = 0 is fully radial
        let vr = radial_projection(400.0, 0.0, 0.0, FRAC_PI_2, 0.0);
        assert!((vr - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_ram_pressure_and_mass_loss_scale() {
        let p = ram_pressure(100.0, 300.0);
        assert!((p - 1.505e-8).abs() < 1e-10, "got {p}");

        let mdot = mass_loss_rate(20.0 * SOLAR_RADIUS_KM, 100.0, 300.0);
        assert!(mdot > 1e-15 && mdot < 1e-14, "got {mdot}");
    }
}
