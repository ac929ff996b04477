//! Reproducible test/validation/train splitting. The sampler walks an
//! explicit state machine — a split is refused until a seeded shuffle has
//! been performed, so every partition is auditable back to its seed.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Three pairwise-disjoint index sets into `ml_data`. Their union may cover
/// only a subset of the data: rounding and explicit train proportions can
/// leave indices unassigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    pub test: Vec<usize>,
    pub valid: Vec<usize>,
    pub train: Vec<usize>,
}

impl Split {
    /// Builds a split from caller-supplied index sets, validating pairwise
    /// disjointness. Proportions play no role on this path.
    pub fn from_parts(test: Vec<usize>, valid: Vec<usize>, train: Vec<usize>) -> Result<Self> {
        check_disjoint("test", &test, "valid", &valid)?;
        check_disjoint("test", &test, "train", &train)?;
        check_disjoint("valid", &valid, "train", &train)?;
        Ok(Split { test, valid, train })
    }

    pub fn total_len(&self) -> usize {
        self.test.len() + self.valid.len() + self.train.len()
    }

    pub fn max_index(&self) -> Option<usize> {
        self.test
            .iter()
            .chain(&self.valid)
            .chain(&self.train)
            .copied()
            .max()
    }
}

fn check_disjoint(
    name_a: &str,
    a: &[usize],
    name_b: &str,
    b: &[usize],
) -> Result<()> {
    let set: HashSet<usize> = a.iter().copied().collect();
    let mut overlap: Vec<usize> = b.iter().copied().filter(|idx| set.contains(idx)).collect();
    if overlap.is_empty() {
        return Ok(());
    }
    overlap.sort_unstable();
    overlap.dedup();
    Err(Error::OverlappingSplit(format!(
        "{} and {} share indices {:?}",
        name_a, name_b, overlap
    )))
}

#[derive(Debug, Clone)]
pub struct Sampler {
    n: usize,
    indexes: Vec<usize>,
    shuffled: bool,
}

impl Sampler {
    pub fn new(n: usize) -> Self {
        Sampler {
            n,
            indexes: (0..n).collect(),
            shuffled: false,
        }
    }

    /// Generates the permutation of `[0, n)` from `seed` as the sole
    /// entropy source. Repeat calls rebuild from the identity, so the same
    /// seed always yields the same permutation for a given `n`.
    pub fn shuffle(&mut self, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        self.indexes = (0..self.n).collect();
        self.indexes.shuffle(&mut rng);
        self.shuffled = true;
    }

    /// Consumes the current permutation into test/valid/train prefix
    /// slices of sizes `round(p * n)`. With an explicit `p_train`, leftover
    /// indices beyond the three slices belong to no split.
    pub fn split(&self, p_test: f64, p_valid: f64, p_train: Option<f64>) -> Result<Split> {
        if !self.shuffled {
            return Err(Error::NotReady(
                "sampler must be explicitly shuffled before splitting",
            ));
        }
        let negative =
            p_test < 0.0 || p_valid < 0.0 || p_train.map(|p| p < 0.0).unwrap_or(false);
        if negative || p_test + p_valid > 1.0 {
            return Err(Error::InvalidProportions {
                p_test,
                p_valid,
                p_train,
            });
        }

        let n = self.n as f64;
        let n_test = (p_test * n).round() as usize;
        let n_valid = ((p_valid * n).round() as usize).min(self.n - n_test);

        let test = sorted(&self.indexes[..n_test]);
        let valid = sorted(&self.indexes[n_test..n_test + n_valid]);
        let rest = &self.indexes[n_test + n_valid..];

        let train = match p_train {
            None => sorted(rest),
            Some(p) => {
                let n_train = ((p * n).round() as usize).min(rest.len());
                let leftover = rest.len() - n_train;
                if leftover > 0 {
                    log::info!(
                        "explicit p_train={} leaves {} indices outside every split",
                        p,
                        leftover
                    );
                }
                sorted(&rest[..n_train])
            }
        };

        Ok(Split { test, valid, train })
    }
}

fn sorted(slice: &[usize]) -> Vec<usize> {
    let mut v = slice.to_vec();
    v.sort_unstable();
    v
}
