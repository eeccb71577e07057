// Material module: element compositions and densities of the target and world materials
// This module provides the catalog of solid targets and the lookup of the dominant species

use serde::{Deserialize, Serialize};

use crate::error::MiniScatterError;
use crate::materials::gas::GasTarget;
use crate::Result;

/// Chemical element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub symbol: String,
    /// Nuclear charge
    pub z: u32,
    /// Molar mass [g/mol]
    pub a: f64,
}

impl Element {
    pub fn new(symbol: &str, z: u32, a: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            z,
            a,
        }
    }
}

// symbol, Z, A [g/mol]
const ELEMENT_TABLE: &[(&str, u32, f64)] = &[
    ("H", 1, 1.008),
    ("He", 2, 4.002_602),
    ("C", 6, 12.011),
    ("N", 7, 14.007),
    ("O", 8, 15.999),
    ("Ne", 10, 20.1797),
    ("Al", 13, 26.981_538_5),
    ("Si", 14, 28.085),
    ("Ar", 18, 39.948),
    ("Ti", 22, 47.867),
    ("Cr", 24, 51.9961),
    ("Fe", 26, 55.845),
    ("Ni", 28, 58.6934),
    ("Cu", 29, 63.546),
    ("W", 74, 183.84),
    ("Pb", 82, 207.2),
    ("U", 92, 238.028_91),
];

/// Look up an element by its symbol
pub fn element(symbol: &str) -> Result<Element> {
    ELEMENT_TABLE
        .iter()
        .find(|(s, ..)| *s == symbol)
        .map(|&(s, z, a)| Element::new(s, z, a))
        .ok_or_else(|| MiniScatterError::configuration(format!("Unknown element '{}'", symbol)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaterialState {
    Solid,
    Liquid,
    Gas,
}

/// A material with its composition by number of atoms per molecule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    /// Density [g/cm^3]
    pub density: f64,
    pub state: MaterialState,
    /// (element, atoms per molecule), in definition order
    pub components: Vec<(Element, u32)>,
}

impl Material {
    pub fn new(name: &str, density: f64, state: MaterialState) -> Self {
        Self {
            name: name.to_string(),
            density,
            state,
            components: Vec::new(),
        }
    }

    /// Append an element with the given atom count
    pub fn with_element(mut self, element: Element, atoms: u32) -> Self {
        self.components.push((element, atoms));
        self
    }

    /// Molar mass of one molecule [g/mol]
    pub fn molar_mass(&self) -> f64 {
        self.components.iter().map(|(el, n)| el.a * *n as f64).sum()
    }

    /// Element with the largest atom count; the first one wins ties
    pub fn dominant_element(&self) -> Option<&Element> {
        let mut best: Option<(&Element, u32)> = None;
        for (el, n) in &self.components {
            if best.map_or(true, |(_, max)| *n > max) {
                best = Some((el, *n));
            }
        }
        best.map(|(el, _)| el)
    }

    /// Nuclear charge of the most common species
    pub fn target_z(&self) -> Option<u32> {
        self.dominant_element().map(|el| el.z)
    }

    /// Molar mass of the most common species [g/mol]
    pub fn target_a(&self) -> Option<f64> {
        self.dominant_element().map(|el| el.a)
    }
}

/// Catalog of the predefined materials
pub struct CommonMaterials;

impl CommonMaterials {
    const NAMES: [&'static str; 14] = [
        "G4_Al",
        "G4_C",
        "G4_Cu",
        "G4_Pb",
        "G4_Ti",
        "G4_Si",
        "G4_W",
        "G4_U",
        "G4_MYLAR",
        "G4_KAPTON",
        "G4_STAINLESS-STEEL",
        "G4_WATER",
        "G4_Galactic",
        "Sapphire",
    ];

    /// Names accepted by `find`
    pub fn names() -> &'static [&'static str] {
        &Self::NAMES
    }

    /// Look up a material by name
    ///
    /// # Errors
    /// `MiniScatterError::Configuration` listing the valid choices if the name is unknown.
    pub fn find(name: &str) -> Result<Material> {
        match name {
            "G4_Al" => Self::elemental(name, 2.699, "Al"),
            "G4_C" => Self::elemental(name, 2.0, "C"),
            "G4_Cu" => Self::elemental(name, 8.96, "Cu"),
            "G4_Pb" => Self::elemental(name, 11.35, "Pb"),
            "G4_Ti" => Self::elemental(name, 4.54, "Ti"),
            "G4_Si" => Self::elemental(name, 2.33, "Si"),
            "G4_W" => Self::elemental(name, 19.3, "W"),
            "G4_U" => Self::elemental(name, 18.95, "U"),
            "G4_MYLAR" => Self::compound(name, 1.4, MaterialState::Solid, &[("H", 8), ("C", 10), ("O", 4)]),
            "G4_KAPTON" => Self::compound(
                name,
                1.42,
                MaterialState::Solid,
                &[("H", 10), ("C", 22), ("N", 2), ("O", 5)],
            ),
            "G4_STAINLESS-STEEL" => {
                Self::compound(name, 8.0, MaterialState::Solid, &[("Fe", 74), ("Cr", 18), ("Ni", 8)])
            }
            "G4_WATER" => Self::compound(name, 1.0, MaterialState::Liquid, &[("H", 2), ("O", 1)]),
            "G4_Galactic" => Self::vacuum(),
            "Sapphire" => Self::sapphire(),
            _ => Err(MiniScatterError::configuration(format!(
                "Error when setting material '{}' -- not found! Valid choices: {}",
                name,
                Self::NAMES.join(", ")
            ))),
        }
    }

    /// World and detector material
    pub fn vacuum() -> Result<Material> {
        Self::compound("G4_Galactic", 1e-25, MaterialState::Gas, &[("H", 1)])
    }

    /// Al2O3 at 4.0 g/cm^3
    pub fn sapphire() -> Result<Material> {
        Self::compound("Sapphire", 4.0, MaterialState::Solid, &[("Al", 2), ("O", 3)])
    }

    fn elemental(name: &str, density: f64, symbol: &str) -> Result<Material> {
        Self::compound(name, density, MaterialState::Solid, &[(symbol, 1)])
    }

    fn compound(name: &str, density: f64, state: MaterialState, parts: &[(&str, u32)]) -> Result<Material> {
        parts.iter().try_fold(Material::new(name, density, state), |mat, &(symbol, n)| {
            Ok(mat.with_element(element(symbol)?, n))
        })
    }
}

/// Resolve a target material description: `NAME::pressure` for a gas, a catalog name otherwise
pub fn resolve_target_material(description: &str) -> Result<Material> {
    if GasTarget::is_gas_description(description) {
        Ok(GasTarget::parse(description)?.material())
    } else {
        CommonMaterials::find(description)
    }
}
