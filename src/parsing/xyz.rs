//! Reader for QM9-style XYZ structure files. One molecule per file:
//!
//! ```text
//! <n_atoms>
//! gdb <id> <15 scalar properties>
//! <element> <x> <y> <z> [<partial charge>]     (n_atoms lines)
//! <vibrational frequencies, skipped>
//! <smiles> <canonical smiles>
//! <inchi ...>                                  (trailing lines ignored)
//! ```
//!
//! Some files carry a broken scientific-notation marker (`*^` or `.*^`)
//! in their numeric fields; those are rewritten to standard `e` notation
//! before parsing.

use std::path::Path;

use crate::dataset::StructureRecord;
use crate::error::{Error, Result};
use crate::molecule::{smiles, Element};

/// Parses the scalar-property line tokens. The first token is the `gdb`
/// database tag (ignored), the second is the molecule id; the remainder are
/// the scalar properties, optionally filtered down to `selected` indices
/// (0-indexed over the property columns).
pub fn parse_scalar_properties(
    tokens: &[&str],
    selected: Option<&[usize]>,
    source_hint: &str,
) -> Result<(u32, Vec<f64>)> {
    if tokens.len() < 2 {
        return Err(Error::malformed(
            source_hint,
            "property line holds fewer than two tokens",
        ));
    }

    let id: u32 = tokens[1].parse().map_err(|_| {
        Error::malformed(
            source_hint,
            format!("identifier {:?} is not an integer", tokens[1]),
        )
    })?;

    let mut properties = Vec::new();
    for (ii, token) in tokens[2..].iter().enumerate() {
        if let Some(selected) = selected {
            if !selected.contains(&ii) {
                continue;
            }
        }
        let value: f64 = normalize_exponent(token).parse().map_err(|_| {
            Error::malformed(
                source_hint,
                format!("property column {} ({:?}) is not a float", ii, token),
            )
        })?;
        properties.push(value);
    }

    Ok((id, properties))
}

/// Rewrites the broken exponent markers to standard notation. The `.*^`
/// form must be handled before the plain `*^` form.
fn normalize_exponent(field: &str) -> String {
    field.replace(".*^", "e").replace("*^", "e")
}

/// Reads one QM9 XYZ file into a [`StructureRecord`]. `canonical` selects
/// the second (library-normalized) SMILES string over the first;
/// `selected_properties` optionally restricts the scalar-property columns.
pub fn read_xyz(
    path: &Path,
    canonical: bool,
    selected_properties: Option<&[usize]>,
) -> Result<StructureRecord> {
    let hint = path.display().to_string();
    let contents = std::fs::read_to_string(path)
        .map_err(|e| Error::malformed(&hint, format!("unreadable file: {}", e)))?;
    let lines: Vec<&str> = contents.lines().collect();

    let n_atoms: usize = lines
        .first()
        .ok_or_else(|| Error::malformed(&hint, "empty file"))?
        .trim()
        .parse()
        .map_err(|_| Error::malformed(&hint, "header atom count is not an integer"))?;

    let property_tokens: Vec<&str> = lines
        .get(1)
        .ok_or_else(|| Error::malformed(&hint, "missing property line"))?
        .split_whitespace()
        .collect();
    let (id, properties) = parse_scalar_properties(&property_tokens, selected_properties, &hint)?;

    let mut elements = Vec::with_capacity(n_atoms);
    let mut xyz = Vec::with_capacity(n_atoms);
    for ii in 0..n_atoms {
        let line = lines.get(2 + ii).ok_or_else(|| {
            Error::malformed(
                &hint,
                format!("header declares {} atoms but the file ends early", n_atoms),
            )
        })?;
        let (element, coords) = parse_atom_line(line, &hint, n_atoms)?;
        elements.push(element);
        xyz.push(coords);
    }

    // One line of vibrational frequencies, unused.
    let smiles_line_idx = 2 + n_atoms + 1;
    let smiles_tokens: Vec<&str> = lines
        .get(smiles_line_idx)
        .ok_or_else(|| Error::malformed(&hint, "missing SMILES line"))?
        .split_whitespace()
        .collect();
    if smiles_tokens.len() < 2 {
        return Err(Error::malformed(
            &hint,
            "SMILES line does not hold two notation strings",
        ));
    }
    let smi = smiles_tokens[canonical as usize];

    // Separated charge sites show up as +/- symbols in the as-written
    // notation string.
    let zwitter = smiles_tokens[0].contains('+') || smiles_tokens[0].contains('-');

    let mol = smiles::parse(smi)
        .map_err(|e| Error::malformed(&hint, format!("bad SMILES string: {}", e)))?;

    Ok(StructureRecord {
        qmx_id: id,
        smiles: smi.to_string(),
        mol,
        xyz,
        elements,
        properties,
        zwitter,
    })
}

fn parse_atom_line(line: &str, hint: &str, n_atoms: usize) -> Result<(Element, [f64; 3])> {
    let normalized = normalize_exponent(line);
    let tokens: Vec<&str> = normalized.split_whitespace().collect();
    if tokens.len() < 4 {
        return Err(Error::malformed(
            hint,
            format!(
                "expected {} element+coordinate lines, found {:?} instead",
                n_atoms, line
            ),
        ));
    }

    let element = Element::from_symbol(tokens[0])
        .ok_or_else(|| Error::malformed(hint, format!("unknown element label {:?}", tokens[0])))?;

    let mut coords = [0.0_f64; 3];
    for (ii, token) in tokens[1..4].iter().enumerate() {
        coords[ii] = token.parse().map_err(|_| {
            Error::malformed(hint, format!("coordinate {:?} is not a float", token))
        })?;
    }

    Ok((element, coords))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exponent_marker_normalization() {
        assert_eq!(normalize_exponent("1.6991*^-6"), "1.6991e-6");
        assert_eq!(normalize_exponent("5.*^-7"), "5e-7");
        assert_eq!(normalize_exponent("-40.47893"), "-40.47893");
    }

    #[test]
    fn scalar_property_selection() {
        let tokens = ["gdb", "42", "1.0", "2.0", "3.0", "4.0"];
        let (id, all) = parse_scalar_properties(&tokens, None, "test").unwrap();
        assert_eq!(id, 42);
        assert_eq!(all, vec![1.0, 2.0, 3.0, 4.0]);

        let (_, subset) = parse_scalar_properties(&tokens, Some(&[0, 2]), "test").unwrap();
        assert_eq!(subset, vec![1.0, 3.0]);
    }

    #[test]
    fn unparsable_property_is_malformed() {
        let tokens = ["gdb", "42", "abc"];
        assert!(parse_scalar_properties(&tokens, None, "test").is_err());
    }
}
