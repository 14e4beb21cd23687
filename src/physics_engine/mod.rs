//! Physics Module
//!
//! Deterministic unit conversions and derived plasma quantities.
//! Everything here is a pure function of its inputs.
//!
//! - `cartesian_to_spherical()` - heliocentric position to (r, θ, φ)
//! - `thermal_speed_to_temperature()` / `ev_to_kelvin()` - proton temperature
//! - `correct_radial_velocity()` - remove spacecraft motion from ion velocity
//! - `mass_loss_rate()` / `ram_pressure()` - derived wind quantities

pub mod constants;
pub mod transforms;

pub use transforms::{
    cartesian_to_spherical, correct_radial_velocity, density_from_log_rho, ev_to_kelvin,
    heliolatitude_deg, km_to_solar_radii, mass_loss_rate, radial_projection, ram_pressure,
    relative_time, thermal_speed_to_temperature, SphericalPosition,
};
