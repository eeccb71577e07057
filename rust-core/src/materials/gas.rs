// Gas module: ideal-gas targets described as "NAME::pressure"
// Pressure in mbar, temperature fixed at 300 K

use log::info;
use serde::{Deserialize, Serialize};

use crate::beam::twiss::parse_field;
use crate::config::{GAS_TEMPERATURE, MBAR_TO_PA, MOLAR_GAS_CONSTANT};
use crate::error::MiniScatterError;
use crate::materials::material::{Element, Material, MaterialState};
use crate::Result;

const GAS_SEPARATOR: &str = "::";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GasSpecies {
    H2,
    He,
    N2,
    Ne,
    Ar,
}

impl GasSpecies {
    pub const ALL: [GasSpecies; 5] = [GasSpecies::H2, GasSpecies::He, GasSpecies::N2, GasSpecies::Ne, GasSpecies::Ar];

    /// Look up a gas by the name used in target descriptions
    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|g| g.name() == name)
            .ok_or_else(|| {
                MiniScatterError::configuration(format!(
                    "Gas type '{}' unknown; valid choices: {}",
                    name,
                    Self::ALL.map(|g| g.name()).join(", ")
                ))
            })
    }

    pub fn name(&self) -> &'static str {
        match self {
            GasSpecies::H2 => "H_2",
            GasSpecies::He => "He",
            GasSpecies::N2 => "N_2",
            GasSpecies::Ne => "Ne",
            GasSpecies::Ar => "Ar",
        }
    }

    pub fn material_name(&self) -> &'static str {
        match self {
            GasSpecies::H2 => "HydrogenGas",
            GasSpecies::He => "HeliumGas",
            GasSpecies::N2 => "NitrogenGas",
            GasSpecies::Ne => "NeonGas",
            GasSpecies::Ar => "ArgonGas",
        }
    }

    /// Constituent atom; hydrogen and neon are the light isotopes
    pub fn element(&self) -> Element {
        match self {
            GasSpecies::H2 => Element::new("H", 1, 1.008),
            GasSpecies::He => Element::new("He", 2, 4.002_602),
            GasSpecies::N2 => Element::new("N", 7, 14.007),
            GasSpecies::Ne => Element::new("Ne", 10, 19.992_440_175_4),
            GasSpecies::Ar => Element::new("Ar", 18, 39.948),
        }
    }

    pub fn atoms_per_molecule(&self) -> u32 {
        match self {
            GasSpecies::H2 | GasSpecies::N2 => 2,
            _ => 1,
        }
    }
}

/// A gas target at a given pressure
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GasTarget {
    pub species: GasSpecies,
    /// Pressure [mbar]
    pub pressure: f64,
}

impl GasTarget {
    /// True if `description` names a gas rather than a solid
    pub fn is_gas_description(description: &str) -> bool {
        description.contains(GAS_SEPARATOR)
    }

    /// Parse `NAME::pressure`
    ///
    /// The pressure is everything after the separator; exponential notation is accepted.
    ///
    /// # Errors
    /// `MiniScatterError::Parse` for a missing separator, missing or invalid pressure, or a
    /// negative pressure. `MiniScatterError::Configuration` for an unknown gas.
    pub fn parse(description: &str) -> Result<Self> {
        let colon = description.find(GAS_SEPARATOR).ok_or_else(|| {
            MiniScatterError::parse("gas", description, format!("no '{}' was found", GAS_SEPARATOR))
        })?;
        let name = &description[..colon];
        let pressure_raw = &description[colon + GAS_SEPARATOR.len()..description.len()];
        if pressure_raw.trim().is_empty() {
            return Err(MiniScatterError::parse(
                "pressure",
                description,
                format!("no pressure was found after '{}'", GAS_SEPARATOR),
            ));
        }
        let pressure = parse_field(pressure_raw, "pressure")?;
        if pressure < 0.0 {
            return Err(MiniScatterError::parse("pressure", pressure_raw, "pressure must be >= 0"));
        }

        let species = GasSpecies::from_name(name)?;
        Ok(Self { species, pressure })
    }

    /// Ideal-gas density [g/m^3]
    pub fn density_g_m3(&self) -> f64 {
        let molar_mass = self.species.atoms_per_molecule() as f64 * self.species.element().a;
        molar_mass * self.pressure * MBAR_TO_PA / (MOLAR_GAS_CONSTANT * GAS_TEMPERATURE)
    }

    pub fn material(&self) -> Material {
        let density = self.density_g_m3();
        info!(
            "Built {} gas, pressure = {} [mbar], temperature = {} [K], density = {} [g/m3]",
            self.species.name(),
            self.pressure,
            GAS_TEMPERATURE,
            density
        );
        // g/m^3 -> g/cm^3
        Material::new(self.species.material_name(), density * 1e-6, MaterialState::Gas)
            .with_element(self.species.element(), self.species.atoms_per_molecule())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_gas_description() {
        let gas = GasTarget::parse("Ar::1000").unwrap();
        assert_eq!(gas.species, GasSpecies::Ar);
        assert_eq!(gas.pressure, 1000.0);

        let gas = GasTarget::parse("He::2.5e-3").unwrap();
        assert_eq!(gas.species, GasSpecies::He);
        assert_relative_eq!(gas.pressure, 2.5e-3);
    }

    #[test]
    fn test_pressure_runs_to_end_of_string() {
        // Long pressure strings must not be truncated
        let gas = GasTarget::parse("N_2::123.456789").unwrap();
        assert_relative_eq!(gas.pressure, 123.456789);
    }

    #[test]
    fn test_gas_densities() {
        assert_relative_eq!(GasTarget::parse("Ar::1000").unwrap().density_g_m3(), 1601.5466797784572, max_relative = 1e-12);
        assert_relative_eq!(GasTarget::parse("H_2::1").unwrap().density_g_m3(), 0.08082302259020151, max_relative = 1e-12);

        let material = GasTarget::parse("H_2::1").unwrap().material();
        assert_eq!(material.name, "HydrogenGas");
        assert_eq!(material.state, MaterialState::Gas);
        assert_eq!(material.target_z(), Some(1));
        assert_relative_eq!(material.density, 0.08082302259020151e-6, max_relative = 1e-12);
    }

    #[test]
    fn test_malformed_descriptions() {
        for (desc, field) in [("Ar", "gas"), ("Ar::", "pressure"), ("Ar::abc", "pressure"), ("Ar::-5", "pressure")] {
            match GasTarget::parse(desc) {
                Err(MiniScatterError::Parse { field: f, .. }) => assert_eq!(f, field, "for '{}'", desc),
                other => panic!("expected parse error for '{}', got {:?}", desc, other),
            }
        }
    }

    #[test]
    fn test_unknown_gas() {
        assert!(matches!(GasTarget::parse("Xe::10"), Err(MiniScatterError::Configuration(_))));
        assert!(GasTarget::is_gas_description("Xe::10"));
        assert!(!GasTarget::is_gas_description("G4_Al"));
    }
}
