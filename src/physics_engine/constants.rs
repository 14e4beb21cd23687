//! Physical constants (SI, CODATA 2018 / IAU 2015 nominal values)

/// Proton mass (kg)
pub const PROTON_MASS: f64 = 1.672_621_923_69e-27;
/// Boltzmann constant (J/K)
pub const BOLTZMANN: f64 = 1.380_649e-23;
/// Elementary charge, i.e. one electron-volt in joules
pub const ELECTRON_VOLT: f64 = 1.602_176_634e-19;
/// Nominal solar radius (m)
pub const SOLAR_RADIUS_M: f64 = 6.957e8;
/// Nominal solar radius (km)
pub const SOLAR_RADIUS_KM: f64 = SOLAR_RADIUS_M / 1e3;
/// Solar mass (kg)
pub const SOLAR_MASS: f64 = 1.988_409_870_698_051e30;
/// Julian year (s)
pub const JULIAN_YEAR_S: f64 = 365.25 * 86_400.0;

/// Kelvin per electron-volt
pub const KELVIN_PER_EV: f64 = ELECTRON_VOLT / BOLTZMANN;
