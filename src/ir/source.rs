//! Sequential access to dataset samples.
//!
//! Exporters only need to walk samples in index order, so the source is a
//! small trait. [`InMemoryDataset`] holds everything in memory; the manifest
//! reader in [`super::io_manifest`] loads each sample's bitmap on demand.

use super::model::{DatasetMeta, Sample};
use crate::error::ExportError;

/// A read-only, index-ordered sequence of samples plus dataset metadata.
pub trait SampleSource {
    /// Dataset-level metadata.
    fn meta(&self) -> &DatasetMeta;

    /// Number of samples.
    fn len(&self) -> usize;

    /// Returns true if the dataset has no samples.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Loads the sample at `index`.
    ///
    /// Indices are `0..len()`; iteration order defines output ids.
    fn sample(&self, index: usize) -> Result<Sample, ExportError>;
}

/// A dataset whose samples are already loaded.
#[derive(Clone, Debug)]
pub struct InMemoryDataset {
    pub meta: DatasetMeta,
    pub samples: Vec<Sample>,
}

impl InMemoryDataset {
    pub fn new(meta: DatasetMeta, samples: Vec<Sample>) -> Self {
        Self { meta, samples }
    }
}

impl SampleSource for InMemoryDataset {
    fn meta(&self) -> &DatasetMeta {
        &self.meta
    }

    fn len(&self) -> usize {
        self.samples.len()
    }

    fn sample(&self, index: usize) -> Result<Sample, ExportError> {
        self.samples
            .get(index)
            .cloned()
            .ok_or(ExportError::SampleOutOfRange {
                index,
                len: self.samples.len(),
            })
    }
}
