// Materials module: target, world and detector materials
// This module provides the solid catalog, ideal-gas targets and the dominant-species lookup

// ======================== MODULE DECLARATIONS ========================
pub mod gas;
pub mod material;

// ======================== MATERIAL TYPES & PROPERTIES ========================
pub use material::{
    resolve_target_material, // fn - gas description or catalog name -> Material
    CommonMaterials,         // struct - catalog of the predefined solids and the vacuum
    Element,                 // struct - symbol, Z and molar mass
    Material,                // struct - density, state and composition by atom count
    MaterialState,           // enum - Solid, Liquid, Gas
};
// Material impl methods:
//   dominant_element(&self) -> Option<&Element>     - largest atom count, first wins ties
//   target_z(&self) -> Option<u32>                  - Z of the dominant element
//   target_a(&self) -> Option<f64>                  - molar mass of the dominant element

// ======================== GAS TARGETS ========================
pub use gas::{
    GasSpecies, // enum - H_2, He, N_2, Ne, Ar
    GasTarget,  // struct - species and pressure [mbar]
};
// GasTarget impl methods:
//   parse(description: &str) -> Result<Self>       - "NAME::pressure"
//   density_g_m3(&self) -> f64                      - n A P / (R T) at 300 K
//   material(&self) -> Material
