//! Fixed QM9/QM8 schema conventions: which column maps to which physical
//! quantity, which scalar properties are statistically independent, and the
//! environment variables that supply default data locations.

use std::path::PathBuf;

use crate::error::{Error, Result};

pub const QM9_ENV_VAR: &str = "QM9_DATA_PATH";
pub const QM8_EP_ENV_VAR: &str = "QM8_EP_DATA_PATH";

/// Scalar-property indices (0-indexed, after the molecule id) that are
/// statistically independent contributions as determined via a linear
/// correlation model over the QM9 corpus; together they capture >99% of the
/// dataset variance.
pub const INDEPENDENT_QM9_PROPS: [usize; 11] = [0, 1, 2, 3, 4, 5, 6, 8, 9, 10, 14];

/// Default QM8 electronic-property column selection: the RI-CC2 E1
/// excitation energy and the LR-TDCAM-B3LYP block. Index 16 is past the
/// 16-column table and is skipped by the selection, so the default pick
/// yields four values per record.
pub const DEFAULT_ELECTRONIC_COLUMNS: [usize; 5] = [0, 13, 14, 15, 16];

lazy_static::lazy_static! {
    /// QM9 scalar properties in file order (0-indexed after the id column).
    /// See https://www.nature.com/articles/sdata201422.pdf, Table 3.
    pub static ref QM9_SCALAR_SCHEMA: Vec<(&'static str, &'static str)> = vec![
        ("A", "rotational constant (GHz)"),
        ("B", "rotational constant (GHz)"),
        ("C", "rotational constant (GHz)"),
        ("mu", "dipole moment (Debye)"),
        ("alpha", "isotropic polarizability (a0^3)"),
        ("homo", "HOMO energy (Ha)"),
        ("lumo", "LUMO energy (Ha)"),
        ("gap", "HOMO-LUMO gap (Ha)"),
        ("r2", "electronic spatial extent (a0^2)"),
        ("zpve", "zero-point vibrational energy (Ha)"),
        ("u0", "internal energy at 0 K (Ha)"),
        ("u", "internal energy at 298.15 K (Ha)"),
        ("h", "enthalpy at 298.15 K (Ha)"),
        ("g", "Gibbs free energy at 298.15 K (Ha)"),
        ("cv", "heat capacity at 298.15 K (cal/mol K)"),
    ];

    /// QM8 electronic-property columns in file order (0-indexed after the
    /// id column): E1/E2 excitation energies and f1/f2 oscillator strengths
    /// for each level of theory.
    pub static ref QM8_ELECTRONIC_SCHEMA: Vec<(&'static str, &'static str)> = vec![
        ("E1-CC2", "RI-CC2/def2TZVP E1 (au)"),
        ("E2-CC2", "RI-CC2/def2TZVP E2 (au)"),
        ("f1-CC2", "RI-CC2/def2TZVP f1 (au, length representation)"),
        ("f2-CC2", "RI-CC2/def2TZVP f2 (au, length representation)"),
        ("E1-PBE0/SVP", "LR-TDPBE0/def2SVP E1 (au)"),
        ("E2-PBE0/SVP", "LR-TDPBE0/def2SVP E2 (au)"),
        ("f1-PBE0/SVP", "LR-TDPBE0/def2SVP f1 (au, length representation)"),
        ("f2-PBE0/SVP", "LR-TDPBE0/def2SVP f2 (au, length representation)"),
        ("E1-PBE0/TZVP", "LR-TDPBE0/def2TZVP E1 (au)"),
        ("E2-PBE0/TZVP", "LR-TDPBE0/def2TZVP E2 (au)"),
        ("f1-PBE0/TZVP", "LR-TDPBE0/def2TZVP f1 (au, length representation)"),
        ("f2-PBE0/TZVP", "LR-TDPBE0/def2TZVP f2 (au, length representation)"),
        ("E1-CAM", "LR-TDCAM-B3LYP/def2TZVP E1 (au)"),
        ("E2-CAM", "LR-TDCAM-B3LYP/def2TZVP E2 (au)"),
        ("f1-CAM", "LR-TDCAM-B3LYP/def2TZVP f1 (au, length representation)"),
        ("f2-CAM", "LR-TDCAM-B3LYP/def2TZVP f2 (au, length representation)"),
    ];
}

/// Resolves a default data path from the environment. The absence of both a
/// call-time path and the environment value is a configuration error, never
/// a silent default.
pub fn require_env(var: &'static str) -> Result<PathBuf> {
    match std::env::var(var) {
        Ok(value) if !value.is_empty() => Ok(PathBuf::from(value)),
        _ => Err(Error::ConfigurationMissing(var)),
    }
}
