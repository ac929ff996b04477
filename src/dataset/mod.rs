//! Container for QMX structure data, where X is the maximum number of heavy
//! atoms per molecule (8 or 9 for the corpora this crate targets). Owns the
//! parsed records, the optional electronic-property table, and the
//! featurized `ml_data` produced by [`featurize`](DatasetContainer::featurize).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::structure_matching;
use crate::error::{Error, Result};
use crate::molecule::{Element, Molecule};
use crate::parsing::{electronic, xyz};
use crate::schema::{DEFAULT_ELECTRONIC_COLUMNS, QM8_EP_ENV_VAR, QM9_ENV_VAR};

pub mod featurize;
pub mod snapshot;

pub use featurize::{
    ClassCardinalities, FeatureConfig, Featurizer, FeaturizeOutput, MlEntry, MolGraph,
    TargetScaling,
};

/// One parsed structure file. Immutable once constructed; the molecular
/// graph is parsed from the SMILES string at construction time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureRecord {
    pub qmx_id: u32,
    pub smiles: String,
    pub mol: Molecule,
    pub xyz: Vec<[f64; 3]>,
    pub elements: Vec<Element>,
    pub properties: Vec<f64>,
    pub zwitter: bool,
}

impl StructureRecord {
    pub fn heavy_atom_count(&self) -> usize {
        self.elements.iter().filter(|e| e.is_heavy()).count()
    }
}

/// Knobs for [`DatasetContainer::load`]. The defaults reproduce the usual
/// corpus construction: trivial atomic cases excluded, up to 9 heavy atoms,
/// zwitterions dropped, canonical SMILES kept.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub min_heavy_atoms: usize,
    pub max_heavy_atoms: usize,
    pub keep_zwitter: bool,
    pub canonical: bool,
    pub selected_properties: Option<Vec<usize>>,
    /// Cap on the number of files read, for fast iteration.
    pub limit: Option<usize>,
    pub log_every: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            min_heavy_atoms: 2,
            max_heavy_atoms: 9,
            keep_zwitter: false,
            canonical: true,
            selected_properties: None,
            limit: None,
            log_every: 10_000,
        }
    }
}

/// A file that failed to parse during a load. Faults abort only their own
/// file; the loader continues and reports them here.
#[derive(Debug)]
pub struct LoadFault {
    pub path: PathBuf,
    pub error: Error,
}

#[derive(Debug, Default)]
pub struct LoadReport {
    /// Files parsed successfully.
    pub n_parsed: usize,
    /// Records kept after the heavy-atom and zwitterion filters.
    pub n_kept: usize,
    /// Records parsed but excluded by a filter.
    pub n_filtered: usize,
    pub faults: Vec<LoadFault>,
}

/// Counts of structural motifs over the loaded records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureCounts {
    pub num_aromatic: usize,
    pub num_double_bond: usize,
    pub num_triple_bond: usize,
    pub num_hetero_bond: usize,
    pub num_ring: usize,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetContainer {
    raw: BTreeMap<u32, StructureRecord>,
    electronic_properties: Option<BTreeMap<u32, Vec<f64>>>,
    ml_data: Option<Vec<MlEntry>>,
    class_cardinalities: Option<ClassCardinalities>,
}

impl DatasetContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self) -> &BTreeMap<u32, StructureRecord> {
        &self.raw
    }

    pub fn electronic_properties(&self) -> Option<&BTreeMap<u32, Vec<f64>>> {
        self.electronic_properties.as_ref()
    }

    pub fn ml_data(&self) -> Result<&[MlEntry]> {
        self.ml_data
            .as_deref()
            .ok_or(Error::NotReady("run a featurizer before using ml_data"))
    }

    pub fn class_cardinalities(&self) -> Option<&ClassCardinalities> {
        self.class_cardinalities.as_ref()
    }

    /// Enumerates `*.xyz` files under `path` (or the `QM9_DATA_PATH`
    /// environment fallback), parses them in parallel and keeps the records
    /// passing the heavy-atom and charge-state filters. Parse faults are
    /// collected in the report, never silently dropped.
    pub fn load(&mut self, path: Option<&Path>, options: &LoadOptions) -> Result<LoadReport> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => crate::schema::require_env(QM9_ENV_VAR)?,
        };
        log::info!("loading structures from {:?}", path);

        let mut paths = list_xyz_files(&path)?;
        let total = paths.len();
        if let Some(limit) = options.limit {
            paths.truncate(limit);
            log::info!("loading capped at {} of {} files", paths.len(), total);
        } else {
            log::info!("loading from {} structure files", total);
        }

        let progress = AtomicUsize::new(0);
        let selected = options.selected_properties.as_deref();
        let parsed: Vec<(PathBuf, Result<StructureRecord>)> = paths
            .into_par_iter()
            .map(|p| {
                let record = xyz::read_xyz(&p, options.canonical, selected);
                let done = progress.fetch_add(1, Ordering::Relaxed) + 1;
                if done % options.log_every == 0 {
                    let pc = done as f64 / total.max(1) as f64 * 100.0;
                    log::info!("latest read from {:?} ({:.0}%)", p.file_name(), pc);
                }
                (p, record)
            })
            .collect();

        // Merge serially; identifiers are unique per file so writes cannot
        // collide, but the shared map is only touched here.
        let mut report = LoadReport::default();
        for (p, record) in parsed {
            let record = match record {
                Ok(record) => record,
                Err(error) => {
                    log::warn!("skipping {:?}: {}", p, error);
                    report.faults.push(LoadFault { path: p, error });
                    continue;
                }
            };
            report.n_parsed += 1;

            let n_heavy = record.heavy_atom_count();
            if n_heavy < options.min_heavy_atoms || n_heavy > options.max_heavy_atoms {
                report.n_filtered += 1;
                continue;
            }
            if record.zwitter && !options.keep_zwitter {
                report.n_filtered += 1;
                continue;
            }

            self.raw.insert(record.qmx_id, record);
            report.n_kept += 1;
        }

        log::info!(
            "total number of data points: {} ({} filtered, {} faults)",
            self.raw.len(),
            report.n_filtered,
            report.faults.len()
        );
        Ok(report)
    }

    /// Loads the QM8 electronic-property table from `path` (or the
    /// `QM8_EP_DATA_PATH` environment fallback). Callable independently of
    /// [`load`](Self::load); order does not matter.
    pub fn load_electronic_properties(
        &mut self,
        path: Option<&Path>,
        columns: Option<&[usize]>,
    ) -> Result<usize> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => crate::schema::require_env(QM8_EP_ENV_VAR)?,
        };
        let columns = columns.unwrap_or(&DEFAULT_ELECTRONIC_COLUMNS);

        log::info!("reading electronic properties from {:?}", path);
        let table = electronic::read_electronic_properties(&path, columns)?;
        let n = table.len();
        log::info!("total number of electronic-property records: {}", n);

        self.electronic_properties = Some(table);
        Ok(n)
    }

    /// Counts structural motifs over the loaded records; `ring_size` of
    /// None counts any ring.
    pub fn structure_counts(&self, ring_size: Option<usize>) -> StructureCounts {
        let mut counts = StructureCounts {
            num_aromatic: 0,
            num_double_bond: 0,
            num_triple_bond: 0,
            num_hetero_bond: 0,
            num_ring: 0,
        };

        for record in self.raw.values() {
            if structure_matching::is_aromatic(&record.mol) {
                counts.num_aromatic += 1;
            }
            if structure_matching::has_double_bond(&record.mol) {
                counts.num_double_bond += 1;
            }
            if structure_matching::has_triple_bond(&record.mol) {
                counts.num_triple_bond += 1;
            }
            if structure_matching::has_hetero_bond(&record.mol) {
                counts.num_hetero_bond += 1;
            }
            if structure_matching::has_ring(&record.mol, ring_size) {
                counts.num_ring += 1;
            }
        }

        counts
    }
}

fn list_xyz_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| Error::malformed(dir.display(), format!("unreadable directory: {}", e)))?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().map(|ext| ext == "xyz").unwrap_or(false))
        .collect();

    // Deterministic load order regardless of directory iteration order.
    paths.sort();
    Ok(paths)
}
