//! Mini-batch assembly over featurized data. Graph features vary in size
//! across a batch and are grouped as a list; targets share a fixed length
//! per dataset and stack into a uniform array, as do identifiers.

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::dataset::{DatasetContainer, MlEntry, MolGraph};
use crate::error::{Error, Result};
use crate::sampling::Split;

/// One mini-batch: graphs as a list, targets stacked `(batch, target_dim)`,
/// identifiers stacked alongside.
#[derive(Debug)]
pub struct Batch<'a> {
    pub graphs: Vec<&'a MolGraph>,
    pub targets: Array2<f64>,
    pub ids: Array1<i64>,
}

/// Produces batches for one split. Sequential loaders preserve index
/// order on every pass; shuffled loaders reorder freshly on each call to
/// [`epoch`](BatchLoader::epoch), drawing from a loader-owned RNG.
#[derive(Debug)]
pub struct BatchLoader {
    indices: Vec<usize>,
    batch_size: usize,
    rng: Option<StdRng>,
}

impl BatchLoader {
    pub fn sequential(indices: Vec<usize>, batch_size: usize) -> Self {
        BatchLoader {
            indices,
            batch_size: batch_size.max(1),
            rng: None,
        }
    }

    pub fn shuffled(indices: Vec<usize>, batch_size: usize, seed: u64) -> Self {
        BatchLoader {
            indices,
            batch_size: batch_size.max(1),
            rng: Some(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Starts one finite pass over the split. A new call re-iterates from
    /// the start (reshuffled, for shuffled loaders).
    pub fn epoch<'a>(&mut self, data: &'a [MlEntry]) -> Batches<'a> {
        let mut order = self.indices.clone();
        if let Some(rng) = self.rng.as_mut() {
            order.shuffle(rng);
        }
        Batches {
            data,
            order,
            batch_size: self.batch_size,
            cursor: 0,
        }
    }
}

pub struct Batches<'a> {
    data: &'a [MlEntry],
    order: Vec<usize>,
    batch_size: usize,
    cursor: usize,
}

impl<'a> Iterator for Batches<'a> {
    type Item = Batch<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.order.len() {
            return None;
        }
        let end = (self.cursor + self.batch_size).min(self.order.len());
        let chunk = &self.order[self.cursor..end];
        self.cursor = end;

        let graphs: Vec<&MolGraph> = chunk.iter().map(|&i| &self.data[i].graph).collect();
        let ids = Array1::from_iter(chunk.iter().map(|&i| self.data[i].qmx_id as i64));

        let target_dim = chunk
            .first()
            .map(|&i| self.data[i].target.len())
            .unwrap_or(0);
        let mut targets = Array2::zeros((chunk.len(), target_dim));
        for (row, &i) in chunk.iter().enumerate() {
            for (col, &v) in self.data[i].target.iter().enumerate().take(target_dim) {
                targets[[row, col]] = v;
            }
        }

        Some(Batch {
            graphs,
            targets,
            ids,
        })
    }
}

/// The three batch streams of one split.
#[derive(Debug)]
pub struct Loaders {
    pub test: BatchLoader,
    pub valid: BatchLoader,
    pub train: BatchLoader,
}

/// Builds loaders over `ml_data` for a validated split. Test and valid
/// loaders preserve index order; the train loader reshuffles each pass,
/// seeded by `seed`.
pub fn data_loaders(
    ml_data: &[MlEntry],
    split: &Split,
    batch_sizes: (usize, usize, usize),
    seed: u64,
) -> Result<Loaders> {
    if let Some(max) = split.max_index() {
        if max >= ml_data.len() {
            return Err(Error::IndexOutOfRange {
                index: max,
                len: ml_data.len(),
            });
        }
    }

    Ok(Loaders {
        test: BatchLoader::sequential(split.test.clone(), batch_sizes.0),
        valid: BatchLoader::sequential(split.valid.clone(), batch_sizes.1),
        train: BatchLoader::shuffled(split.train.clone(), batch_sizes.2, seed),
    })
}

impl DatasetContainer {
    /// Convenience wrapper over [`data_loaders`]; refuses to run before a
    /// featurizer has populated `ml_data`.
    pub fn data_loaders(
        &self,
        split: &Split,
        batch_sizes: (usize, usize, usize),
        seed: u64,
    ) -> Result<Loaders> {
        data_loaders(self.ml_data()?, split, batch_sizes, seed)
    }
}
