//! Reader for the QM8 electronic-properties file: leading `#` comment
//! lines, then one whitespace-separated record per line,
//! `<id> <prop_0> <prop_1> ...`.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};

/// Parses one record line, selecting the property columns named by
/// `columns` (0-indexed over the columns after the id).
pub fn parse_electronic_properties(
    tokens: &[&str],
    columns: &[usize],
    source_hint: &str,
) -> Result<(u32, Vec<f64>)> {
    let id: u32 = tokens
        .first()
        .ok_or_else(|| Error::malformed(source_hint, "empty record line"))?
        .parse()
        .map_err(|_| {
            Error::malformed(
                source_hint,
                format!("identifier {:?} is not an integer", tokens[0]),
            )
        })?;

    let mut properties = Vec::with_capacity(columns.len());
    for (ii, token) in tokens[1..].iter().enumerate() {
        if !columns.contains(&ii) {
            continue;
        }
        let value: f64 = token.parse().map_err(|_| {
            Error::malformed(
                source_hint,
                format!(
                    "column {} ({:?}) of record {} is not a float",
                    ii, token, id
                ),
            )
        })?;
        properties.push(value);
    }

    Ok((id, properties))
}

/// Reads the full electronic-properties table keyed by molecule id. The id
/// space is independent of the structure files'; callers must intersect
/// before joint use.
pub fn read_electronic_properties(
    path: &Path,
    columns: &[usize],
) -> Result<BTreeMap<u32, Vec<f64>>> {
    let hint = path.display().to_string();
    let contents = std::fs::read_to_string(path)
        .map_err(|e| Error::malformed(&hint, format!("unreadable file: {}", e)))?;

    let mut table = BTreeMap::new();
    for line in contents.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        let (id, properties) = parse_electronic_properties(&tokens, columns, &hint)?;
        table.insert(id, properties);
    }

    Ok(table)
}
