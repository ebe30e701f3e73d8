#![allow(dead_code, clippy::unwrap_used)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use warden_discovery::{AlwaysRunning, DiscoveryEngine, DiscoveryOutcome, PolicyConfig, StateStore, Unbounded};

/// A throwaway hosting account: `<home>/public_html` is the protected root.
pub struct Site {
    _temp: TempDir,
    pub home: PathBuf,
    pub protected: PathBuf,
}

impl Site {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let home = fs::canonicalize(temp.path()).unwrap();
        let protected = home.join("public_html");
        fs::create_dir_all(&protected).unwrap();
        Self {
            _temp: temp,
            home,
            protected,
        }
    }

    pub fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.home.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    pub fn mkdir(&self, rel: &str) -> PathBuf {
        let path = self.home.join(rel);
        fs::create_dir_all(&path).unwrap();
        path
    }

    pub fn key(&self, rel: &str) -> String {
        self.home.join(rel).to_string_lossy().into_owned()
    }
}

pub fn run_to_completion<S: StateStore>(engine: &DiscoveryEngine<S>, policy: &PolicyConfig) -> Vec<String> {
    let outcome = engine
        .continue_discovery_with_budget(policy, &AlwaysRunning, &mut Unbounded)
        .unwrap();
    assert_eq!(outcome, DiscoveryOutcome::Completed);
    engine.get_result().unwrap().unwrap()
}

pub fn assert_outside(files: &[String], root: &Path) {
    for file in files {
        assert!(
            !Path::new(file).starts_with(root),
            "{} must not be under {}",
            file,
            root.display()
        );
    }
}
