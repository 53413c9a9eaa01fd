use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[cfg(feature = "blocking")]
pub mod blocking;
pub mod config;
pub mod dataloader;
pub mod fx;
pub mod hub;
pub mod module_tree;
pub mod source;

pub use crate::config::{OptimizedConfig, QuantizationConfig};
pub use crate::dataloader::{Batch, BatchSource, CalibrationDataLoader, LoaderSettings, VecSource};
pub use crate::fx::{cfgs_to_fx_cfgs, FxOpConfigs, ObserverType};
pub use crate::hub::HubDownload;
pub use crate::module_tree::{
    default_type_renames, LayerCategory, Module, ModuleNode, QuantizableOp, QuantizableOpCollector,
};
pub use crate::source::ConfigSource;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("IO Error: {0}")]
    Io(io::Error),
    #[error("Error parsing line: '{0}', error at line index: {1}")]
    EnvParse(String, usize),
    #[error("{0}")]
    EnvVar(std::env::VarError),
    #[error("{0}")]
    Type(String),
    #[error("Unknown observer type: {0}")]
    InvalidObserver(String),
    #[error("Invalid config source '{0}': expected 'repo' or 'repo@revision'")]
    InvalidSource(String),
    #[error("{0} NOT FOUND in HuggingFace Hub")]
    NotFound(String),
    #[error("HubError: {0}")]
    Hub(String),
    #[error("YAML Error: {0}")]
    Yaml(serde_yaml::Error),
    #[error("JSON Error: {0}")]
    Json(serde_json::Error),
    #[error("NOT FOUND optimized configure files in {0}")]
    OptimizedConfigNotFound(PathBuf),
}

pub type Result<T> = std::result::Result<T, BridgeError>;

impl BridgeError {
    pub fn io_error(kind: io::ErrorKind, msg: &str) -> BridgeError {
        BridgeError::Io(io::Error::new(kind, msg.to_string()))
    }

    pub fn type_error(type_name: &str) -> BridgeError {
        BridgeError::Type(format!("Model calibration cannot use input of type {}.", type_name))
    }
}

impl From<dotenv::Error> for BridgeError {
    fn from(e: dotenv::Error) -> Self {
        match e {
            dotenv::Error::Io(e) => BridgeError::Io(e),
            dotenv::Error::LineParse(line, error_idx) => BridgeError::EnvParse(line, error_idx),
            dotenv::Error::EnvVar(e) => BridgeError::EnvVar(e),
            _ => unreachable!(),
        }
    }
}

impl From<io::Error> for BridgeError {
    fn from(e: io::Error) -> Self {
        BridgeError::Io(e)
    }
}

impl From<serde_yaml::Error> for BridgeError {
    fn from(e: serde_yaml::Error) -> Self {
        BridgeError::Yaml(e)
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(e: serde_json::Error) -> Self {
        BridgeError::Json(e)
    }
}
