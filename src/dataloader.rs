//! Calibration data loading.
//!
//! The quantization toolkit drives calibration with `(input, label)` pairs,
//! while framework data loaders yield whatever batch shape the dataset
//! collates to. [`CalibrationDataLoader`] sits between the two.

use log::debug;

use crate::{BridgeError, Result};

static LABELS_KEY: &str = "labels";

/// One collated batch as produced by a framework data loader.
#[derive(Debug, Clone, PartialEq)]
pub enum Batch<T> {
    /// Key/value pairs in the order the source collated them.
    Mapping(Vec<(String, T)>),
    Tuple(Vec<T>),
    List(Vec<T>),
    /// A bare value the loader did not collate into a container.
    Tensor(T),
}

impl<T> Batch<T> {
    pub fn kind(&self) -> &'static str {
        use Batch::*;
        match self {
            Mapping(_) => "dict",
            Tuple(_) => "tuple",
            List(_) => "list",
            Tensor(_) => "tensor",
        }
    }
}

/// Loader options carried over from the wrapped source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderSettings {
    pub batch_size: Option<usize>,
    pub shuffle: bool,
    pub drop_last: bool,
    pub num_workers: usize,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        LoaderSettings { batch_size: Some(1), shuffle: false, drop_last: false, num_workers: 0 }
    }
}

/// Anything that can hand out batches.
///
/// `batches` must return a fresh iterator on every call; a source that can
/// only be walked once yields nothing the second time around.
pub trait BatchSource {
    type Item;

    fn settings(&self) -> LoaderSettings;

    fn batches(&self) -> Box<dyn Iterator<Item = Batch<Self::Item>> + '_>;
}

/// Batches held in memory.
#[derive(Debug, Clone)]
pub struct VecSource<T> {
    batches: Vec<Batch<T>>,
    settings: LoaderSettings,
}

impl<T> VecSource<T> {
    pub fn new(batches: Vec<Batch<T>>) -> VecSource<T> {
        VecSource { batches, settings: LoaderSettings::default() }
    }

    pub fn with_settings(mut self, settings: LoaderSettings) -> VecSource<T> {
        self.settings = settings;
        self
    }
}

impl<T: Clone> BatchSource for VecSource<T> {
    type Item = T;

    fn settings(&self) -> LoaderSettings {
        self.settings.clone()
    }

    fn batches(&self) -> Box<dyn Iterator<Item = Batch<T>> + '_> {
        Box::new(self.batches.iter().cloned())
    }
}

pub struct CalibrationDataLoader<S> {
    source: S,
    settings: LoaderSettings,
}

impl<S: BatchSource> CalibrationDataLoader<S> {
    pub fn from_source(source: S) -> CalibrationDataLoader<S> {
        let settings = source.settings();
        debug!("Wrapping data loader for calibration: {:?}", settings);
        CalibrationDataLoader { source, settings }
    }

    pub fn settings(&self) -> &LoaderSettings {
        &self.settings
    }

    pub fn into_inner(self) -> S {
        self.source
    }

    pub fn iter(&self) -> CalibrationIter<'_, S::Item> {
        CalibrationIter { inner: self.source.batches() }
    }
}

impl<'a, S: BatchSource> IntoIterator for &'a CalibrationDataLoader<S>
where
    S::Item: Clone,
{
    type Item = Result<(Batch<S::Item>, Option<S::Item>)>;
    type IntoIter = CalibrationIter<'a, S::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct CalibrationIter<'a, T> {
    inner: Box<dyn Iterator<Item = Batch<T>> + 'a>,
}

impl<'a, T: Clone> Iterator for CalibrationIter<'a, T> {
    type Item = Result<(Batch<T>, Option<T>)>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|batch| match batch {
            Batch::Mapping(map) => {
                let label = map.iter().find(|(key, _)| key == LABELS_KEY).map(|(_, value)| value.clone());
                Ok((Batch::Mapping(map), label))
            }
            batch @ Batch::Tuple(_) | batch @ Batch::List(_) => Ok((batch, None)),
            other => Err(BridgeError::type_error(other.kind())),
        })
    }
}
