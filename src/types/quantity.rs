//! Tracked physical quantities and the statistics computed for them

use serde::{Deserialize, Serialize};

use super::Sample;
use crate::physics_engine::{mass_loss_rate, ram_pressure};

/// The fixed set of quantities reduced per distance bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    /// Radial velocity (km/s)
    RadialVelocity,
    /// Proton density (cm⁻³)
    Density,
    /// Proton temperature (K)
    Temperature,
    /// Mass-loss rate (M☉/yr)
    MassLoss,
    /// Ram pressure (Pa)
    RamPressure,
}

impl Quantity {
    pub const ALL: [Self; 5] = [
        Self::RadialVelocity,
        Self::Density,
        Self::Temperature,
        Self::MassLoss,
        Self::RamPressure,
    ];

    /// Column name in exported tables
    pub const fn column(self) -> &'static str {
        match self {
            Self::RadialVelocity => "vr",
            Self::Density => "np",
            Self::Temperature => "Temp",
            Self::MassLoss => "mass_loss",
            Self::RamPressure => "ram_pressure",
        }
    }

    pub const fn unit(self) -> &'static str {
        match self {
            Self::RadialVelocity => "km/s",
            Self::Density => "cm^-3",
            Self::Temperature => "K",
            Self::MassLoss => "Msun/yr",
            Self::RamPressure => "Pa",
        }
    }

    /// Value of this quantity for one sample.
    pub fn value(self, sample: &Sample) -> f64 {
        match self {
            Self::RadialVelocity => sample.vr,
            Self::Density => sample.np,
            Self::Temperature => sample.temp,
            Self::MassLoss => mass_loss_rate(sample.r_km, sample.np, sample.vr),
            Self::RamPressure => ram_pressure(sample.np, sample.vr),
        }
    }
}

impl std::str::FromStr for Quantity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vr" | "radial_velocity" => Ok(Self::RadialVelocity),
            "np" | "density" => Ok(Self::Density),
            "t" | "temp" | "temperature" => Ok(Self::Temperature),
            "mass_loss" | "massloss" => Ok(Self::MassLoss),
            "ram_pressure" | "rampressure" => Ok(Self::RamPressure),
            other => Err(format!("unknown quantity '{other}'")),
        }
    }
}

/// Statistic kinds in the long-format table (`Type` column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatKind {
    Mean,
    Std,
    Median,
    Q1,
    Q3,
}

impl StatKind {
    pub const ALL: [Self; 5] = [Self::Mean, Self::Std, Self::Median, Self::Q1, Self::Q3];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Std => "std",
            Self::Median => "median",
            Self::Q1 => "q1",
            Self::Q3 => "q3",
        }
    }
}
