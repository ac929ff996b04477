//! Featurization strategies over the dataset container. Each strategy is a
//! variant of [`Featurizer`], matched exhaustively, so an unhandled mode is
//! a compile error rather than a runtime string fallthrough; the CLI maps
//! mode names onto variants and reports unrecognized names as
//! [`Error::UnknownMode`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dataset::DatasetContainer;
use crate::error::{Error, Result};
use crate::molecule::{BondOrder, Element, Hybridization, Molecule};
use crate::schema::INDEPENDENT_QM9_PROPS;

/// Discrete per-atom feature kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AtomFeature {
    Type,
    Hybridization,
}

impl AtomFeature {
    pub fn class_count(&self) -> u32 {
        match self {
            AtomFeature::Type => Element::COUNT as u32,
            AtomFeature::Hybridization => Hybridization::COUNT as u32,
        }
    }
}

/// Discrete per-bond feature kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BondFeature {
    Type,
}

impl BondFeature {
    pub fn class_count(&self) -> u32 {
        match self {
            BondFeature::Type => BondOrder::COUNT as u32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureConfig {
    pub atom_features: Vec<AtomFeature>,
    pub bond_features: Vec<BondFeature>,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        FeatureConfig {
            atom_features: vec![AtomFeature::Type, AtomFeature::Hybridization],
            bond_features: vec![BondFeature::Type],
        }
    }
}

/// Distinct-class counts per configured feature, consumed downstream to
/// size categorical embedding tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCardinalities {
    pub atom_features: Vec<u32>,
    pub bond_features: Vec<u32>,
}

pub fn class_cardinalities(config: &FeatureConfig) -> ClassCardinalities {
    ClassCardinalities {
        atom_features: config.atom_features.iter().map(|f| f.class_count()).collect(),
        bond_features: config.bond_features.iter().map(|f| f.class_count()).collect(),
    }
}

/// Graph representation of one molecule: categorical feature vectors per
/// node, and per directed edge (each bond contributes both directions).
/// Graphs vary in size across a dataset and are grouped as lists, never
/// stacked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MolGraph {
    pub node_features: Vec<Vec<u32>>,
    pub edges: Vec<[usize; 2]>,
    pub edge_features: Vec<Vec<u32>>,
}

pub fn to_graph(mol: &Molecule, config: &FeatureConfig) -> MolGraph {
    let node_features = (0..mol.num_atoms())
        .map(|idx| {
            config
                .atom_features
                .iter()
                .map(|feature| match feature {
                    AtomFeature::Type => mol.atoms()[idx].element.class_index(),
                    AtomFeature::Hybridization => mol.hybridization(idx).class_index(),
                })
                .collect()
        })
        .collect();

    let mut edges = Vec::with_capacity(mol.bonds().len() * 2);
    let mut edge_features = Vec::with_capacity(mol.bonds().len() * 2);
    for bond in mol.bonds() {
        let features: Vec<u32> = config
            .bond_features
            .iter()
            .map(|feature| match feature {
                BondFeature::Type => bond.order.class_index(),
            })
            .collect();
        edges.push([bond.a, bond.b]);
        edge_features.push(features.clone());
        edges.push([bond.b, bond.a]);
        edge_features.push(features);
    }

    MolGraph {
        node_features,
        edges,
        edge_features,
    }
}

/// One featurized data point: (feature, target, identifier).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlEntry {
    pub graph: MolGraph,
    pub target: Vec<f64>,
    pub qmx_id: u32,
}

/// Per-dimension mean and standard deviation of the targets at scaling
/// time, kept for the inverse transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetScaling {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Featurizer {
    /// Graphs for every record, keyed by id; leaves `ml_data` untouched.
    GraphOnly,
    /// Join structure records with the electronic-property table over the
    /// intersection of their id spaces.
    ElectronicJoin { scale_targets: bool },
    /// Targets selected from each record's own scalar-property vector.
    ScalarProperties {
        target_indices: Vec<usize>,
        scale_targets: bool,
    },
}

impl Featurizer {
    /// Maps a CLI mode name onto a variant.
    pub fn from_name(
        name: &str,
        target_indices: Vec<usize>,
        scale_targets: bool,
    ) -> Result<Self> {
        match name {
            "graph-only" => Ok(Featurizer::GraphOnly),
            "electronic-join" => Ok(Featurizer::ElectronicJoin { scale_targets }),
            "scalar-properties" => Ok(Featurizer::ScalarProperties {
                target_indices,
                scale_targets,
            }),
            other => Err(Error::UnknownMode(other.to_string())),
        }
    }
}

#[derive(Debug)]
pub enum FeaturizeOutput {
    Graphs {
        graphs: BTreeMap<u32, MolGraph>,
        cardinalities: ClassCardinalities,
    },
    MlData {
        len: usize,
        scaling: Option<TargetScaling>,
    },
}

impl DatasetContainer {
    /// Runs one featurization strategy. Joining modes fully replace
    /// `ml_data` and the cardinality metadata on success and leave the
    /// container untouched on failure.
    pub fn featurize(
        &mut self,
        featurizer: &Featurizer,
        config: &FeatureConfig,
    ) -> Result<FeaturizeOutput> {
        match featurizer {
            Featurizer::GraphOnly => {
                let graphs = self
                    .raw()
                    .iter()
                    .map(|(&id, record)| (id, to_graph(&record.mol, config)))
                    .collect();
                Ok(FeaturizeOutput::Graphs {
                    graphs,
                    cardinalities: class_cardinalities(config),
                })
            }
            Featurizer::ElectronicJoin { scale_targets } => {
                let entries = self.electronic_join_entries(config)?;
                Ok(self.install_ml_data(entries, config, *scale_targets))
            }
            Featurizer::ScalarProperties {
                target_indices,
                scale_targets,
            } => {
                let entries = self.scalar_property_entries(target_indices, config)?;
                Ok(self.install_ml_data(entries, config, *scale_targets))
            }
        }
    }

    fn electronic_join_entries(&self, config: &FeatureConfig) -> Result<Vec<MlEntry>> {
        let table = self.electronic_properties().ok_or(Error::NotReady(
            "load electronic properties before the electronic-join featurizer",
        ))?;

        // BTreeMap iteration keeps the intersection in ascending id order,
        // so repeat runs build identical ml_data.
        let entries: Vec<MlEntry> = self
            .raw()
            .iter()
            .filter_map(|(id, record)| {
                table.get(id).map(|target| MlEntry {
                    graph: to_graph(&record.mol, config),
                    target: target.clone(),
                    qmx_id: *id,
                })
            })
            .collect();

        log::info!(
            "intersection of structure and electronic-property ids has length {}",
            entries.len()
        );
        Ok(entries)
    }

    fn scalar_property_entries(
        &self,
        target_indices: &[usize],
        config: &FeatureConfig,
    ) -> Result<Vec<MlEntry>> {
        if !target_indices
            .iter()
            .all(|idx| INDEPENDENT_QM9_PROPS.contains(idx))
        {
            log::warn!(
                "chosen target indices {:?} are not a subset of the independent set {:?}",
                target_indices,
                INDEPENDENT_QM9_PROPS
            );
        }

        self.raw()
            .iter()
            .map(|(id, record)| {
                let target = target_indices
                    .iter()
                    .map(|&idx| {
                        record.properties.get(idx).copied().ok_or(
                            Error::IndexOutOfRange {
                                index: idx,
                                len: record.properties.len(),
                            },
                        )
                    })
                    .collect::<Result<Vec<f64>>>()?;
                Ok(MlEntry {
                    graph: to_graph(&record.mol, config),
                    target,
                    qmx_id: *id,
                })
            })
            .collect()
    }

    fn install_ml_data(
        &mut self,
        mut entries: Vec<MlEntry>,
        config: &FeatureConfig,
        scale_targets: bool,
    ) -> FeaturizeOutput {
        let scaling = if scale_targets {
            let scaling = compute_target_scaling(&entries);
            apply_target_scaling(&mut entries, &scaling);
            log::info!(
                "scaled targets; mean of means {:.2e}, mean of stds {:.2e}",
                mean(&scaling.mean),
                mean(&scaling.std)
            );
            Some(scaling)
        } else {
            None
        };

        let len = entries.len();
        self.ml_data = Some(entries);
        self.class_cardinalities = Some(class_cardinalities(config));
        log::info!("initialized ml_data of length {}", len);

        FeaturizeOutput::MlData { len, scaling }
    }
}

/// Per-dimension mean and population standard deviation over all targets.
pub fn compute_target_scaling(entries: &[MlEntry]) -> TargetScaling {
    let n = entries.len();
    let dims = entries.first().map(|e| e.target.len()).unwrap_or(0);

    let mut mean = vec![0.0; dims];
    for entry in entries {
        for (d, v) in entry.target.iter().enumerate() {
            mean[d] += v;
        }
    }
    for m in &mut mean {
        *m /= n as f64;
    }

    let mut std = vec![0.0; dims];
    for entry in entries {
        for (d, v) in entry.target.iter().enumerate() {
            std[d] += (v - mean[d]).powi(2);
        }
    }
    for s in &mut std {
        *s = (*s / n as f64).sqrt();
    }

    TargetScaling { mean, std }
}

pub fn apply_target_scaling(entries: &mut [MlEntry], scaling: &TargetScaling) {
    for entry in entries {
        for (d, v) in entry.target.iter_mut().enumerate() {
            *v = (*v - scaling.mean[d]) / scaling.std[d];
        }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
