//! Serialized dataset snapshots. The full container state (raw records,
//! electronic-property table, ml_data, cardinality metadata) round-trips
//! through pretty-printed JSON; map keys live in `BTreeMap`s, so equal
//! containers serialize to identical bytes.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::dataset::DatasetContainer;
use crate::error::{Error, Result};

impl DatasetContainer {
    pub fn write_snapshot(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| Error::Snapshot {
            path: path.to_path_buf(),
            reason: format!("cannot create file: {}", e),
        })?;
        serde_json::to_writer_pretty(BufWriter::new(file), self).map_err(|e| {
            Error::Snapshot {
                path: path.to_path_buf(),
                reason: format!("serialization failed: {}", e),
            }
        })?;
        log::info!("wrote dataset snapshot to {:?}", path);
        Ok(())
    }

    pub fn read_snapshot(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::Snapshot {
            path: path.to_path_buf(),
            reason: format!("cannot open file: {}", e),
        })?;
        let container = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            Error::Snapshot {
                path: path.to_path_buf(),
                reason: format!("deserialization failed: {}", e),
            }
        })?;
        log::info!("read dataset snapshot from {:?}", path);
        Ok(container)
    }
}
