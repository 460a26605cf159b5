//! Physical constants and per-isotope nuclear data.

use zn_core::{Error, Result};

/// Avogadro constant (mol⁻¹), PDG 2012.
pub const N_AVOGADRO: f64 = 6.02214129e23;

/// Electron mass (MeV), PDG 2012.
pub const ELECTRON_MASS_MEV: f64 = 0.510998928;

/// Axial-vector coupling `g_A`, Phys. Rev. C 87, 014315 (2013).
pub const COUPLING_CONSTANT: f64 = 1.269;

/// Phase-space factor and nuclear matrix element for one decay mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayMode {
    /// Phase-space factor `G` (yr⁻¹).
    pub phase_space: f64,
    /// Nuclear matrix element `|M|`.
    pub matrix_element: f64,
}

/// Nuclear data for a double-beta isotope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsotopeData {
    /// Isotope name, e.g. `"Te130"`.
    pub name: &'static str,
    /// Atomic weight (g/mol).
    pub atomic_weight: f64,
    /// Neutrinoless mode.
    pub zero_nu: DecayMode,
    /// Two-neutrino mode.
    pub two_nu: DecayMode,
}

// IBM-2 matrix elements (decay to 0⁺ ground state): PRC 87, 014315 (2013), tables IV and XV.
// Phase spaces, screened exact finite-size Coulomb wave functions: PRC 85, 034316 (2012).
static ISOTOPES: [IsotopeData; 3] = [
    IsotopeData {
        name: "Te130",
        atomic_weight: 129.906229,
        zero_nu: DecayMode { phase_space: 14.22e-15, matrix_element: 4.03 },
        two_nu: DecayMode { phase_space: 1529e-21, matrix_element: 3.31 },
    },
    IsotopeData {
        name: "Xe136",
        atomic_weight: 135.907219,
        zero_nu: DecayMode { phase_space: 14.58e-15, matrix_element: 3.33 },
        two_nu: DecayMode { phase_space: 1433e-21, matrix_element: 2.76 },
    },
    IsotopeData {
        name: "Nd150",
        atomic_weight: 149.920891,
        zero_nu: DecayMode { phase_space: 63.03e-15, matrix_element: 2.32 },
        two_nu: DecayMode { phase_space: 36430e-21, matrix_element: 1.54 },
    },
];

/// Look up nuclear data by isotope name.
pub fn isotope(name: &str) -> Result<&'static IsotopeData> {
    ISOTOPES.iter().find(|d| d.name == name).ok_or_else(|| {
        let known: Vec<&str> = isotope_names().collect();
        Error::Validation(format!("unknown isotope '{}' (known: {})", name, known.join(", ")))
    })
}

/// Names of all tabulated isotopes.
pub fn isotope_names() -> impl Iterator<Item = &'static str> {
    ISOTOPES.iter().map(|d| d.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let te = isotope("Te130").unwrap();
        assert_eq!(te.two_nu.phase_space, 1529e-21);
        assert_eq!(te.two_nu.matrix_element, 3.31);
        assert_eq!(te.zero_nu.matrix_element, 4.03);
        assert_eq!(isotope_names().count(), 3);
    }

    #[test]
    fn test_unknown_isotope() {
        let err = isotope("U238").unwrap_err().to_string();
        assert!(err.contains("U238") && err.contains("Te130"), "{err}");
    }
}
