use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::hub::HubDownload;
use crate::source::ConfigSource;
use crate::{BridgeError, Result};

static BEST_CONFIGURE_YAML: &str = "best_configure.yaml";
static BEST_CONFIGURE_JSON: &str = "best_configure.json";
static BEST_MODEL_WEIGHTS: &str = "best_model_weights.pt";
static BEST_FILE_PREFIX: &str = "best_";

/// Tuning configuration handed to the quantization toolkit.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantizationConfig {
    usr_cfg: Value,
}

impl QuantizationConfig {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<QuantizationConfig> {
        let path = path.as_ref();
        debug!("Loading quantization config from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        QuantizationConfig::from_yaml_str(&text)
    }

    pub fn from_yaml_str(s: &str) -> Result<QuantizationConfig> {
        if is_empty_document(s) {
            return Ok(QuantizationConfig { usr_cfg: Value::Mapping(Mapping::new()) });
        }
        let usr_cfg: Value = serde_yaml::from_str(s)?;
        Ok(QuantizationConfig { usr_cfg })
    }

    /// Resolves `config_name_or_path` (`repo[@revision]` or a local
    /// directory) and loads `config_file_name` from it.
    pub fn from_pretrained_with(
        hub: &dyn HubDownload,
        config_name_or_path: &str,
        config_file_name: &str,
        cache_dir: Option<&Path>,
    ) -> Result<QuantizationConfig> {
        let source = ConfigSource::parse(config_name_or_path)?;

        let local_file = source.as_local_dir().map(|dir| dir.join(config_file_name)).filter(|p| p.is_file());
        let config_file = match local_file {
            Some(path) => path,
            None => hub
                .download(&source.name_or_path, config_file_name, source.revision(), cache_dir)
                .map_err(|e| match e {
                    BridgeError::Hub(msg) => {
                        warn!("{}", msg);
                        BridgeError::NotFound(config_file_name.to_string())
                    }
                    other => other,
                })?,
        };

        info!("Resolved {} to {}", source, config_file.display());
        QuantizationConfig::from_path(config_file)
    }

    #[cfg(feature = "blocking")]
    pub fn from_pretrained(
        config_name_or_path: &str,
        config_file_name: &str,
        cache_dir: Option<&Path>,
    ) -> Result<QuantizationConfig> {
        let hub = crate::blocking::HubClient::new()?;
        QuantizationConfig::from_pretrained_with(&hub, config_name_or_path, config_file_name, cache_dir)
    }

    pub fn usr_cfg(&self) -> &Value {
        &self.usr_cfg
    }

    /// Looks up a dotted path such as `tuning.accuracy_criterion.relative`.
    pub fn get(&self, keys: &str) -> Option<&Value> {
        keys.split('.').try_fold(&self.usr_cfg, |node, key| match node {
            Value::Mapping(map) => map.get(&Value::String(key.to_string())),
            _ => None,
        })
    }

    /// Sets a dotted path, creating the intermediate mappings. A scalar in
    /// the way is replaced by a mapping.
    pub fn set<V: Serialize>(&mut self, keys: &str, value: V) -> Result<()> {
        let value = serde_yaml::to_value(value)?;
        let keys: Vec<&str> = keys.split('.').collect();
        set_path(&mut self.usr_cfg, &keys, value);
        Ok(())
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.usr_cfg)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_yaml_string()?)?;
        Ok(())
    }
}

// Blank lines, comments and a bare `---` hold no document to parse.
fn is_empty_document(s: &str) -> bool {
    s.lines().map(str::trim).all(|line| line.is_empty() || line.starts_with('#') || line == "---")
}

fn set_path(node: &mut Value, keys: &[&str], value: Value) {
    if node.as_mapping().is_none() {
        *node = Value::Mapping(Mapping::new());
    }
    let map = match node.as_mapping_mut() {
        Some(map) => map,
        None => return,
    };

    let key = Value::String(keys[0].to_string());
    if keys.len() == 1 {
        map.insert(key, value);
        return;
    }

    if !map.contains_key(&key) {
        map.insert(key.clone(), Value::Mapping(Mapping::new()));
    }
    if let Some(child) = map.get_mut(&key) {
        set_path(child, &keys[1..], value);
    }
}

/// Output of a finished tuning run: a directory holding the best
/// configuration and weights. The files are read by the toolkit itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptimizedConfig {
    path: PathBuf,
}

impl OptimizedConfig {
    pub fn new<P: Into<PathBuf>>(path: P) -> OptimizedConfig {
        OptimizedConfig { path: path.into() }
    }

    /// Resolves `config_name_or_path` to a directory containing the tuning
    /// results. For a hub repository each known file is fetched; missing
    /// ones are skipped, but at least one `best_*` file must end up in the
    /// resolved directory.
    pub fn from_pretrained_with(
        hub: &dyn HubDownload,
        config_name_or_path: &str,
        cache_dir: Option<&Path>,
    ) -> Result<OptimizedConfig> {
        let source = ConfigSource::parse(config_name_or_path)?;

        let config_path = match source.as_local_dir() {
            Some(dir) => Some(dir.to_path_buf()),
            None => {
                let mut resolved = None;
                for file_name in &[BEST_CONFIGURE_YAML, BEST_CONFIGURE_JSON, BEST_MODEL_WEIGHTS] {
                    match hub.download(&source.name_or_path, file_name, source.revision(), cache_dir) {
                        Ok(path) => resolved = path.parent().map(Path::to_path_buf),
                        Err(BridgeError::Hub(msg)) => {
                            warn!("{} NOT FOUND in HuggingFace Hub: {}", file_name, msg)
                        }
                        Err(e) => return Err(e),
                    }
                }
                resolved
            }
        };

        match config_path {
            Some(path) if has_best_files(&path)? => {
                info!("Resolved optimized config {} to {}", source, path.display());
                Ok(OptimizedConfig { path })
            }
            Some(path) => Err(BridgeError::OptimizedConfigNotFound(path)),
            None => Err(BridgeError::OptimizedConfigNotFound(PathBuf::from(&source.name_or_path))),
        }
    }

    #[cfg(feature = "blocking")]
    pub fn from_pretrained(config_name_or_path: &str, cache_dir: Option<&Path>) -> Result<OptimizedConfig> {
        let hub = crate::blocking::HubClient::new()?;
        OptimizedConfig::from_pretrained_with(&hub, config_name_or_path, cache_dir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn configure_file(&self) -> Option<PathBuf> {
        [BEST_CONFIGURE_YAML, BEST_CONFIGURE_JSON].iter().map(|f| self.path.join(f)).find(|p| p.is_file())
    }

    pub fn weights_file(&self) -> Option<PathBuf> {
        Some(self.path.join(BEST_MODEL_WEIGHTS)).filter(|p| p.is_file())
    }
}

// Same match as the glob `best_*.*`.
fn has_best_files(dir: &Path) -> Result<bool> {
    for entry in std::fs::read_dir(dir)? {
        let name = entry?.file_name();
        let name = name.to_string_lossy();
        if let Some(rest) = name.strip_prefix(BEST_FILE_PREFIX) {
            if rest.contains('.') {
                return Ok(true);
            }
        }
    }
    Ok(false)
}
