// Twiss module: beam-optics description of the transverse phase space
// This module parses the Twiss description string and derives geometric emittances

use serde::{Deserialize, Serialize};

use crate::error::MiniScatterError;
use crate::interfaces::Plane;
use crate::Result;

/// Separator between the fields of one plane
pub const FIELD_SEPARATOR: char = ':';
/// Separator between the x and y groups
pub const PLANE_SEPARATOR: &str = "::";

/// Twiss parameters of one transverse plane
///
/// # Fields
/// * `eps_n` - Normalized emittance [um] (= mm mrad)
/// * `beta` - Beta function [m]
/// * `alpha` - Alpha function [-]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TwissParameters {
    pub eps_n: f64,
    pub beta: f64,
    pub alpha: f64,
}

impl TwissParameters {
    pub fn new(eps_n: f64, beta: f64, alpha: f64) -> Self {
        Self { eps_n, beta, alpha }
    }

    /// Geometric emittance [um] for a beam with the given relativistic factors
    pub fn geometric_emittance(&self, factors: &RelativisticFactors) -> f64 {
        self.eps_n / factors.beta_gamma()
    }

    /// Gamma function (1 + alpha^2) / beta [1/m]
    pub fn gamma(&self) -> f64 {
        (1.0 + self.alpha * self.alpha) / self.beta
    }

    /// Require beta > 0 and epsN >= 0
    ///
    /// The covariance diagonal alone cannot show this: a negative beta and a negative
    /// emittance cancel, and a zero emittance hides the sign of beta.
    ///
    /// # Errors
    /// `MiniScatterError::Numerical` naming the plane and the offending parameter.
    pub fn validate(&self, plane: Plane) -> Result<()> {
        if !(self.beta > 0.0) {
            return Err(MiniScatterError::numerical(format!(
                "beta_{} = {} [m] must be > 0",
                plane.label(),
                self.beta
            )));
        }
        if !(self.eps_n >= 0.0) {
            return Err(MiniScatterError::numerical(format!(
                "epsN_{} = {} [um] must be >= 0",
                plane.label(),
                self.eps_n
            )));
        }
        Ok(())
    }
}

/// Twiss parameters for both transverse planes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TwissPair {
    pub x: TwissParameters,
    pub y: TwissParameters,
}

impl TwissPair {
    /// Use the same parameters in both planes
    pub fn symmetric(twiss: TwissParameters) -> Self {
        Self { x: twiss, y: twiss }
    }

    pub fn plane(&self, plane: Plane) -> &TwissParameters {
        match plane {
            Plane::X => &self.x,
            Plane::Y => &self.y,
        }
    }

    /// Parse a Twiss description
    ///
    /// Accepted forms are `epsN:beta:alpha` (mirrored into y) and
    /// `epsN:beta:alpha::epsN_y:beta_y:alpha_y`.
    ///
    /// # Errors
    /// `MiniScatterError::Parse` naming the offending field and the raw substring.
    pub fn parse(description: &str) -> Result<Self> {
        let groups: Vec<&str> = description.split(PLANE_SEPARATOR).collect();
        match groups.as_slice() {
            [single] => {
                let x = parse_group(single, ["epsN", "beta", "alpha"])?;
                Ok(Self::symmetric(x))
            }
            [gx, gy] => {
                let x = parse_group(gx, ["epsN", "beta", "alpha"])?;
                let y = parse_group(gy, ["epsN_y", "beta_y", "alpha_y"])?;
                Ok(Self { x, y })
            }
            _ => Err(MiniScatterError::parse(
                "epsN_y",
                description,
                "more than two '::'-separated groups",
            )),
        }
    }
}

impl std::str::FromStr for TwissPair {
    type Err = MiniScatterError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn parse_group(group: &str, names: [&str; 3]) -> Result<TwissParameters> {
    if group.trim().is_empty() {
        return Err(MiniScatterError::parse(names[0], group, "empty group"));
    }
    let fields: Vec<&str> = group.split(FIELD_SEPARATOR).collect();

    // A missing separator is reported against the first field that could not be found
    if fields.len() < names.len() {
        return Err(MiniScatterError::parse(
            names[fields.len()],
            group,
            format!("expected separator '{}'", FIELD_SEPARATOR),
        ));
    }
    if fields.len() > names.len() {
        return Err(MiniScatterError::parse(
            names[names.len() - 1],
            group,
            "too many fields",
        ));
    }

    Ok(TwissParameters {
        eps_n: parse_field(fields[0], names[0])?,
        beta: parse_field(fields[1], names[1])?,
        alpha: parse_field(fields[2], names[2])?,
    })
}

/// Parse one decimal field (exponential notation accepted)
pub(crate) fn parse_field(raw: &str, field: &str) -> Result<f64> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|e: std::num::ParseFloatError| MiniScatterError::parse(field, raw, e.to_string()))?;
    if !value.is_finite() {
        return Err(MiniScatterError::parse(field, raw, "value is not finite"));
    }
    Ok(value)
}

/// Relativistic factors of the beam particles
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelativisticFactors {
    /// Lorentz factor gamma_rel = E_total / m
    pub gamma: f64,
    /// Velocity beta_rel = v / c
    pub beta: f64,
}

impl RelativisticFactors {
    /// Compute from the total energy and rest mass (same units)
    ///
    /// # Errors
    /// `MiniScatterError::Configuration` if gamma_rel <= 1, i.e. the total energy
    /// does not exceed the rest mass (this includes massless particles).
    pub fn from_total_energy(total_energy: f64, rest_mass: f64) -> Result<Self> {
        if rest_mass <= 0.0 {
            return Err(MiniScatterError::configuration(format!(
                "Rest mass {} MeV is not positive; Twiss parameters need a massive beam particle",
                rest_mass
            )));
        }
        let gamma = total_energy / rest_mass;
        if !(gamma > 1.0) {
            return Err(MiniScatterError::configuration(format!(
                "gamma_rel = {} <= 1 (total energy {} MeV, rest mass {} MeV)",
                gamma, total_energy, rest_mass
            )));
        }
        let beta = (gamma * gamma - 1.0).sqrt() / gamma;
        Ok(Self { gamma, beta })
    }

    /// Compute from the kinetic energy and rest mass (same units)
    pub fn from_kinetic_energy(kinetic_energy: f64, rest_mass: f64) -> Result<Self> {
        Self::from_total_energy(kinetic_energy + rest_mass, rest_mass)
    }

    /// beta_rel * gamma_rel, the factor between normalized and geometric emittance
    pub fn beta_gamma(&self) -> f64 {
        self.beta * self.gamma
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_symmetric() {
        let twiss = TwissPair::parse("1:2:0").unwrap();
        assert_eq!(twiss.x, TwissParameters::new(1.0, 2.0, 0.0));
        assert_eq!(twiss.y, twiss.x);
    }

    #[test]
    fn test_parse_two_planes() {
        let twiss: TwissPair = "3.5:1.2e1:-0.5::2e-1:4:1.5".parse().unwrap();
        assert_eq!(twiss.x, TwissParameters::new(3.5, 12.0, -0.5));
        assert_eq!(twiss.y, TwissParameters::new(0.2, 4.0, 1.5));
        assert_eq!(twiss.plane(Plane::Y).beta, 4.0);
    }

    #[test]
    fn test_relativistic_factors() {
        let f = RelativisticFactors::from_kinetic_energy(200.0, 938.272).unwrap();
        assert_relative_eq!(f.gamma, 1138.272 / 938.272, epsilon = 1e-12);
        assert_relative_eq!(f.beta, 0.56616, epsilon = 1e-5);
        assert_relative_eq!(f.beta_gamma(), (f.gamma * f.gamma - 1.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_sub_rest_mass_energy() {
        let err = RelativisticFactors::from_total_energy(900.0, 938.272).unwrap_err();
        assert!(matches!(err, MiniScatterError::Configuration(_)));

        let err = RelativisticFactors::from_total_energy(938.272, 938.272).unwrap_err();
        assert!(matches!(err, MiniScatterError::Configuration(_)));
    }

    fn assert_parse_error(description: &str, expected_field: &str, expected_raw: &str) {
        match TwissPair::parse(description) {
            Err(MiniScatterError::Parse { field, raw, .. }) => {
                assert_eq!(field, expected_field, "field for '{}'", description);
                assert_eq!(raw, expected_raw, "raw for '{}'", description);
            }
            other => panic!("expected a parse error for '{}', got {:?}", description, other),
        }
    }

    #[test]
    fn test_missing_separator() {
        assert_parse_error("1:2", "alpha", "1:2");
        assert_parse_error("1", "beta", "1");
        assert_parse_error("1:2:0::1:2", "alpha_y", "1:2");
    }

    #[test]
    fn test_too_many_fields() {
        assert_parse_error("1:2:0:5", "alpha", "1:2:0:5");
        assert_parse_error("1:2:0::1:2:0:5", "alpha_y", "1:2:0:5");
    }

    #[test]
    fn test_too_many_groups() {
        assert_parse_error("1:2:0::1:2:0::1:2:0", "epsN_y", "1:2:0::1:2:0::1:2:0");
    }

    #[test]
    fn test_empty_group_reports_first_field() {
        assert_parse_error("1:2:0::", "epsN_y", "");
        assert_parse_error("::1:2:0", "epsN", "");
        assert_parse_error(":2:0", "epsN", "");
    }

    #[test]
    fn test_validate_rejects_bad_beta_and_emittance() {
        assert!(TwissParameters::new(1.0, 2.0, 0.0).validate(Plane::X).is_ok());
        assert!(TwissParameters::new(0.0, 2.0, 0.0).validate(Plane::X).is_ok());
        for t in [
            TwissParameters::new(-1.0, -2.0, 0.0),
            TwissParameters::new(0.0, -2.0, 0.0),
            TwissParameters::new(1.0, 0.0, 0.0),
            TwissParameters::new(-1.0, 2.0, 0.0),
        ] {
            let err = t.validate(Plane::Y).unwrap_err();
            assert!(matches!(err, MiniScatterError::Numerical(_)), "{:?}", t);
        }
    }
}
