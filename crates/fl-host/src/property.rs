//! Stream property definitions.

use fl_core::units;

/// Scalar stream properties the adapter knows how to read and write.
///
/// This is a closed set on purpose: every entry maps to a fixed host-side
/// property name, so a typo becomes a parse error here instead of an opaque
/// automation fault deep in the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    /// Stream temperature
    Temperature,
    /// Stream pressure
    Pressure,
    /// Total molar flow
    MolarFlow,
    /// Total mass flow
    MassFlow,
    /// Heat flow (duty for energy streams)
    HeatFlow,
    /// Molar vapour fraction (calculated, unit-less)
    VapourFraction,
    /// Mixture molecular weight (calculated, unit-less)
    MolecularWeight,
    /// Compressibility factor (calculated, unit-less)
    ZFactor,
}

impl Property {
    pub const ALL: [Property; 8] = [
        Property::Temperature,
        Property::Pressure,
        Property::MolarFlow,
        Property::MassFlow,
        Property::HeatFlow,
        Property::VapourFraction,
        Property::MolecularWeight,
        Property::ZFactor,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Property::Temperature => "temperature",
            Property::Pressure => "pressure",
            Property::MolarFlow => "molar_flow",
            Property::MassFlow => "mass_flow",
            Property::HeatFlow => "heat_flow",
            Property::VapourFraction => "vapour_fraction",
            Property::MolecularWeight => "molecular_weight",
            Property::ZFactor => "z_factor",
        }
    }

    /// Property name as the host's automation interface spells it.
    pub fn host_key(&self) -> &'static str {
        match self {
            Property::Temperature => "Temperature",
            Property::Pressure => "Pressure",
            Property::MolarFlow => "MolarFlow",
            Property::MassFlow => "MassFlow",
            Property::HeatFlow => "HeatFlow",
            Property::VapourFraction => "VapourFraction",
            Property::MolecularWeight => "MolecularWeight",
            Property::ZFactor => "ZFactor",
        }
    }

    /// Unit label the typed facades use for this property.
    ///
    /// Returns `None` for calculated unit-less properties (vapour fraction,
    /// molecular weight, Z factor).
    pub fn canonical_unit(&self) -> Option<&'static str> {
        match self {
            Property::Temperature => Some(units::KELVIN),
            Property::Pressure => Some(units::BAR),
            Property::MolarFlow => Some(units::GMOLE_PER_S),
            Property::MassFlow => Some(units::KG_PER_H),
            Property::HeatFlow => Some(units::KJ_PER_H),
            Property::VapourFraction => None,
            Property::MolecularWeight => None,
            Property::ZFactor => None,
        }
    }

    /// Whether the host accepts writes to this property.
    ///
    /// The calculated properties are always read-only; writing them is
    /// rejected before the host is ever asked.
    pub fn writable(&self) -> bool {
        matches!(
            self,
            Property::Temperature
                | Property::Pressure
                | Property::MolarFlow
                | Property::MassFlow
                | Property::HeatFlow
        )
    }

    /// Get human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Property::Temperature => "Temperature",
            Property::Pressure => "Pressure",
            Property::MolarFlow => "Molar flow",
            Property::MassFlow => "Mass flow",
            Property::HeatFlow => "Heat flow",
            Property::VapourFraction => "Vapour fraction",
            Property::MolecularWeight => "Molecular weight",
            Property::ZFactor => "Z factor",
        }
    }
}

impl std::str::FromStr for Property {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "T" | "TEMP" | "TEMPERATURE" => Ok(Property::Temperature),
            "P" | "PRES" | "PRESSURE" => Ok(Property::Pressure),
            "MOLARFLOW" | "MOLAR_FLOW" | "MOLAR FLOW" => Ok(Property::MolarFlow),
            "MASSFLOW" | "MASS_FLOW" | "MASS FLOW" => Ok(Property::MassFlow),
            "HEATFLOW" | "HEAT_FLOW" | "HEAT FLOW" | "DUTY" => Ok(Property::HeatFlow),
            "VF" | "VAPOURFRACTION" | "VAPOUR_FRACTION" | "VAPOUR FRACTION" | "VAPORFRACTION"
            | "VAPOR FRACTION" => Ok(Property::VapourFraction),
            "MW" | "MOLECULARWEIGHT" | "MOLECULAR_WEIGHT" | "MOLECULAR WEIGHT" => {
                Ok(Property::MolecularWeight)
            }
            "Z" | "ZFACTOR" | "Z_FACTOR" | "Z FACTOR" => Ok(Property::ZFactor),
            _ => Err("unknown property"),
        }
    }
}
