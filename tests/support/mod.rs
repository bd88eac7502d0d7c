pub mod mocks;

pub use mocks::{RecordingGitHubApi, StaticTemplateSource};

use github_build::catalog::Catalog;
use github_build::config::{CatalogPaths, Defaults};
use github_build::pipeline::Synthesizer;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Bundled rule catalogs shipped with the crate
#[allow(dead_code)]
pub fn config_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config")
}

#[allow(dead_code)]
pub fn synthesizer() -> Synthesizer {
    let paths = CatalogPaths::under(&config_dir());
    let catalog = Catalog::load(&paths).expect("bundled catalogs load");
    Synthesizer::new(Defaults::default(), catalog, paths.bundled_linter_configs())
}

/// Creates `acme/<name>` inside a scratch directory and fills it with `files`
///
/// The parent directory doubles as the organization name.
#[allow(dead_code)]
pub fn create_repo(name: &str, files: &[(&str, &str)]) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let repo = temp_dir.path().join("acme").join(name);
    fs::create_dir_all(&repo).expect("Failed to create repository");
    write_files(&repo, files);
    (temp_dir, repo)
}

#[allow(dead_code)]
pub fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (relative, content) in files {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent");
        }
        fs::write(&path, content).expect("Failed to write file");
    }
}

/// Linters left out so a plain source tree yields no linter job
#[allow(dead_code)]
pub fn all_linters() -> Vec<String> {
    [
        "actionlint",
        "markdownlint",
        "yamllint",
        "shellcheck",
        "hadolint",
        "eslint",
        "golangci",
        "phpcs",
        "flake8",
        "rubocop",
        "swiftlint",
        "semgrep",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Path to the github-build binary built alongside the tests
#[allow(dead_code)]
pub fn github_build_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_github-build"))
}
