use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const GITMODULES_FILE: &str = ".gitmodules";

/// Git submodules declared by the repository
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Submodules {
    /// Submodule paths, excluded from detection
    pub paths: Vec<String>,

    /// Submodule holding shared scripts and linter configurations
    pub script_path: Option<PathBuf>,
}

impl Submodules {
    pub fn load(repo_root: &Path) -> Self {
        match fs::read_to_string(repo_root.join(GITMODULES_FILE)) {
            Ok(content) => Self::parse(&content),
            Err(_) => Self::default(),
        }
    }

    pub fn parse(content: &str) -> Self {
        let mut submodules = Self::default();

        for line in content.lines() {
            if !line.contains("path = ") {
                continue;
            }

            let Some(path) = line.rsplit('=').next().map(str::trim) else {
                continue;
            };
            if path.is_empty() {
                continue;
            }

            if path.contains("scripts") {
                submodules.script_path = Some(PathBuf::from(path));
            }
            debug!(path, "Found submodule");
            submodules.paths.push(path.to_string());
        }

        submodules
    }

    /// Shared copy of a linter configuration, if the scripts submodule provides one
    pub fn shared_linter_config(&self, repo_root: &Path, config: &str) -> Option<PathBuf> {
        let script_path = self.script_path.as_ref()?;
        let shared = repo_root.join(script_path).join("linters").join(config);
        shared.is_file().then_some(shared)
    }
}
