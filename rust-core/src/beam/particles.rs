// Particle table: beam species known to the primary generator
// Masses in MeV/c^2, charges in units of e

use serde::{Deserialize, Serialize};

use crate::error::MiniScatterError;
use crate::Result;

/// A particle species that can be used as beam
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleSpecies {
    /// Name as accepted on the command line (e.g. "proton", "e-")
    pub name: String,
    /// PDG Monte Carlo code
    pub pdg: i32,
    /// Rest mass [MeV/c^2]
    pub mass: f64,
    /// Charge [e]
    pub charge: i32,
}

// name, pdg, mass [MeV], charge
const PARTICLE_TABLE: &[(&str, i32, f64, i32)] = &[
    ("proton", 2212, 938.272_088, 1),
    ("anti_proton", -2212, 938.272_088, -1),
    ("neutron", 2112, 939.565_420, 0),
    ("e-", 11, 0.510_998_95, -1),
    ("e+", -11, 0.510_998_95, 1),
    ("mu-", 13, 105.658_375, -1),
    ("mu+", -13, 105.658_375, 1),
    ("pi+", 211, 139.570_39, 1),
    ("pi-", -211, 139.570_39, -1),
    ("kaon+", 321, 493.677, 1),
    ("kaon-", -321, 493.677, -1),
    ("deuteron", 1_000_010_020, 1875.612_94, 1),
    ("alpha", 1_000_020_040, 3727.379_41, 2),
    ("gamma", 22, 0.0, 0),
];

impl ParticleSpecies {
    /// Look up a species by its name
    pub fn find(name: &str) -> Result<Self> {
        PARTICLE_TABLE
            .iter()
            .find(|(n, ..)| *n == name)
            .map(|&(n, pdg, mass, charge)| ParticleSpecies {
                name: n.to_string(),
                pdg,
                mass,
                charge,
            })
            .ok_or_else(|| {
                MiniScatterError::configuration(format!(
                    "Particle named '{}' not found; valid choices: {}",
                    name,
                    Self::known_names().join(", ")
                ))
            })
    }

    /// Look up a species by its PDG code
    pub fn from_pdg(pdg: i32) -> Option<Self> {
        PARTICLE_TABLE
            .iter()
            .find(|(_, code, ..)| *code == pdg)
            .map(|&(n, pdg, mass, charge)| ParticleSpecies {
                name: n.to_string(),
                pdg,
                mass,
                charge,
            })
    }

    pub fn known_names() -> Vec<&'static str> {
        PARTICLE_TABLE.iter().map(|(n, ..)| *n).collect()
    }

    pub fn is_charged(&self) -> bool {
        self.charge != 0
    }
}

impl Default for ParticleSpecies {
    /// The default beam is a proton beam
    fn default() -> Self {
        Self {
            name: "proton".to_string(),
            pdg: 2212,
            mass: 938.272_088,
            charge: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_find_proton() {
        let p = ParticleSpecies::find("proton").unwrap();
        assert_eq!(p.pdg, 2212);
        assert_relative_eq!(p.mass, 938.272, epsilon = 1e-3);
        assert!(p.is_charged());
        assert_eq!(p, ParticleSpecies::default());
    }

    #[test]
    fn test_unknown_particle() {
        let err = ParticleSpecies::find("graviton").unwrap_err();
        assert!(matches!(err, MiniScatterError::Configuration(_)));
        assert!(err.to_string().contains("graviton"));
    }

    #[test]
    fn test_from_pdg() {
        assert_eq!(ParticleSpecies::from_pdg(11).unwrap().name, "e-");
        assert!(ParticleSpecies::from_pdg(99999).is_none());
    }
}
