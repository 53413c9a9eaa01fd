use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use quant_bridge::hub::model_repo;
use quant_bridge::{BridgeError, HubDownload, Result};

pub static COMMIT: &str = "0123456789abcdef0123456789abcdef01234567";

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Places a file in the hub cache layout: `refs/{revision}` names the
/// commit and the file lives under `snapshots/{commit}`.
pub fn seed_cache(cache_dir: &Path, repo_id: &str, revision: Option<&str>, filename: &str, contents: &str) -> PathBuf {
    let repo = model_repo(repo_id, revision);
    let repo_dir = cache_dir.join(repo.folder_name());

    let ref_path = repo_dir.join("refs").join(repo.revision());
    std::fs::create_dir_all(ref_path.parent().unwrap()).unwrap();
    std::fs::write(&ref_path, COMMIT).unwrap();

    let target = repo_dir.join("snapshots").join(COMMIT).join(filename);
    std::fs::create_dir_all(target.parent().unwrap()).unwrap();
    std::fs::write(&target, contents).unwrap();
    target
}

/// Serves files from memory and caches them the way the real hub client does.
pub struct MockHub {
    files: HashMap<String, String>,
    pub calls: RefCell<Vec<(String, String, Option<String>)>>,
}

impl MockHub {
    pub fn new() -> MockHub {
        MockHub { files: HashMap::new(), calls: RefCell::new(Vec::new()) }
    }

    pub fn file(mut self, name: &str, contents: &str) -> MockHub {
        self.files.insert(name.to_string(), contents.to_string());
        self
    }
}

impl HubDownload for MockHub {
    fn download(
        &self,
        repo_id: &str,
        filename: &str,
        revision: Option<&str>,
        cache_dir: Option<&Path>,
    ) -> Result<PathBuf> {
        self.calls.borrow_mut().push((repo_id.to_string(), filename.to_string(), revision.map(String::from)));

        let contents = self
            .files
            .get(filename)
            .ok_or_else(|| BridgeError::Hub(format!("404 Not Found: {}", filename)))?;
        let cache_dir = cache_dir.expect("tests always pass a cache dir");
        Ok(seed_cache(cache_dir, repo_id, revision, filename, contents))
    }
}
