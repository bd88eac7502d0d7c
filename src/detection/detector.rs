//! In-process repository scanning
//!
//! Nothing here shells out: file names and manifest contents are matched with compiled
//! regular expressions and literal substring scans, and every miss is reported as an
//! empty result rather than an error.

use crate::config::Defaults;
use ignore::WalkBuilder;
use regex::Regex;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Directory names never descended into unless configured otherwise
pub const ALWAYS_IGNORED_DIRS: &[&str] = &["node_modules", "vendor", ".git", ".hg", ".svn"];

/// Default bound on walk depth
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Recursive, depth-bounded search for files whose name matches `pattern`
///
/// Paths containing any of `excluded` and anything under [`ALWAYS_IGNORED_DIRS`] are
/// skipped. A missing or unreadable root yields an empty list.
pub fn files_matching(
    root: &Path,
    pattern: &Regex,
    excluded: &[String],
    max_depth: Option<usize>,
) -> Vec<PathBuf> {
    let ignored: Vec<String> = ALWAYS_IGNORED_DIRS.iter().map(|d| d.to_string()).collect();
    walk(root, root, pattern, excluded, &ignored, max_depth.unwrap_or(DEFAULT_MAX_DEPTH))
}

/// Whether any line of `path` contains `needle`; unreadable files never match
pub fn file_contains(path: &Path, needle: &str) -> bool {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(_) => return false,
    };

    let mut reader = BufReader::new(file);
    let mut line = Vec::new();
    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line) {
            Ok(0) => return false,
            Ok(_) => {
                if String::from_utf8_lossy(&line).contains(needle) {
                    return true;
                }
            }
            Err(err) => {
                debug!(path = %path.display(), error = %err, "Stopped reading file");
                return false;
            }
        }
    }
}

fn walk(
    repo_root: &Path,
    start: &Path,
    pattern: &Regex,
    excluded: &[String],
    ignored_dirs: &[String],
    max_depth: usize,
) -> Vec<PathBuf> {
    if !start.is_dir() {
        debug!(path = %start.display(), "Search root does not exist");
        return Vec::new();
    }

    let filter_root = repo_root.to_path_buf();
    let filter_excluded = excluded.to_vec();
    let filter_ignored = ignored_dirs.to_vec();

    let walker = WalkBuilder::new(start)
        .standard_filters(false)
        .max_depth(Some(max_depth))
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if is_dir && entry.depth() > 0 {
                let name = entry.file_name().to_string_lossy();
                if filter_ignored.iter().any(|d| *d == name) {
                    return false;
                }
            }
            !is_excluded(&relative(&filter_root, entry.path()), &filter_excluded)
        })
        .build();

    let mut matches = Vec::new();
    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                warn!(error = %err, "Failed to read directory entry");
                continue;
            }
        };

        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if pattern.is_match(&name) {
            matches.push(relative(repo_root, entry.path()));
        }
    }

    matches.sort();
    matches
}

fn relative(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}

fn is_excluded(relative: &Path, excluded: &[String]) -> bool {
    let text = relative.to_string_lossy();
    excluded
        .iter()
        .filter(|needle| !needle.is_empty())
        .any(|needle| text.contains(needle.as_str()))
}

/// Detector bound to one repository and its detection conventions
#[derive(Debug, Clone)]
pub struct Detector {
    root: PathBuf,
    ignored_dirs: Vec<String>,
    max_depth: usize,
}

impl Detector {
    pub fn new(root: impl Into<PathBuf>, defaults: &Defaults) -> Self {
        Self {
            root: root.into(),
            ignored_dirs: defaults.ignored_dirs.clone(),
            max_depth: defaults.max_depth,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a repository-relative path
    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }

    pub fn exists(&self, relative: impl AsRef<Path>) -> bool {
        self.path(relative).exists()
    }

    pub fn is_file(&self, relative: impl AsRef<Path>) -> bool {
        self.path(relative).is_file()
    }

    /// Files under `search_path` whose name matches `pattern`, relative to the repository
    pub fn files_matching(&self, search_path: &str, pattern: &Regex, excluded: &[String]) -> Vec<PathBuf> {
        let start = match search_path.trim_start_matches("./") {
            "" | "." => self.root.clone(),
            path => self.root.join(path),
        };
        walk(&self.root, &start, pattern, excluded, &self.ignored_dirs, self.max_depth)
    }

    pub fn any_matching(&self, search_path: &str, pattern: &Regex, excluded: &[String]) -> bool {
        !self.files_matching(search_path, pattern, excluded).is_empty()
    }

    /// Whether [`Detector::files_matching`] would report `relative` once it exists
    pub fn would_match(&self, relative: &Path, search_path: &str, pattern: &Regex, excluded: &[String]) -> bool {
        let within = match search_path.trim_start_matches("./").trim_end_matches('/') {
            "" | "." => relative,
            path => match relative.strip_prefix(path) {
                Ok(within) => within,
                Err(_) => return false,
            },
        };
        let in_ignored_dir = within.parent().map_or(false, |parent| {
            parent.components().any(|component| {
                let name = component.as_os_str().to_string_lossy();
                self.ignored_dirs.iter().any(|dir| *dir == name)
            })
        });
        let name_matches = relative
            .file_name()
            .map_or(false, |name| pattern.is_match(&name.to_string_lossy()));

        name_matches
            && !in_ignored_dir
            && within.components().count() <= self.max_depth
            && !is_excluded(relative, excluded)
    }

    /// Files named exactly `file_name` anywhere in the repository
    pub fn files_named(&self, file_name: &str, excluded: &[String]) -> Vec<PathBuf> {
        match Regex::new(&format!("^{}$", regex::escape(file_name))) {
            Ok(pattern) => self.files_matching(".", &pattern, excluded),
            Err(_) => Vec::new(),
        }
    }

    pub fn file_contains(&self, relative: impl AsRef<Path>, needle: &str) -> bool {
        file_contains(&self.path(relative), needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_repo() -> TempDir {
        let dir = TempDir::new().unwrap();
        let base = dir.path();

        for (path, content) in [
            ("main.go", "package main"),
            ("go.mod", "module example\nrequire go.mongodb.org/mongo-driver v1.0.0\n"),
            ("pkg/util/util.go", "package util"),
            ("node_modules/lib/index.go", "package ignored"),
            ("vendor/dep/dep.go", "package ignored"),
            (".git/hooks/hook.go", "package ignored"),
            ("third_party/gen/gen.go", "package ignored"),
            ("docs/readme.md", "# docs"),
        ] {
            let path = base.join(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }

        dir
    }

    fn go_files() -> Regex {
        Regex::new(r"^.*\.(go)$").unwrap()
    }

    #[test]
    fn test_files_matching_skips_ignored_directories() {
        let repo = create_test_repo();
        let files = files_matching(repo.path(), &go_files(), &[], None);

        assert_eq!(
            files,
            vec![
                PathBuf::from("main.go"),
                PathBuf::from("pkg/util/util.go"),
                PathBuf::from("third_party/gen/gen.go"),
            ]
        );
    }

    #[test]
    fn test_files_matching_applies_excluded_substrings() {
        let repo = create_test_repo();
        let files = files_matching(repo.path(), &go_files(), &["third_party".to_string()], None);

        assert!(files
            .iter()
            .all(|f| !f.to_string_lossy().contains("third_party")));
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_files_matching_missing_root() {
        let files = files_matching(Path::new("/nonexistent/repository"), &go_files(), &[], None);
        assert!(files.is_empty());
    }

    #[test]
    fn test_files_matching_respects_depth() {
        let repo = create_test_repo();
        let files = files_matching(repo.path(), &go_files(), &[], Some(1));
        assert_eq!(files, vec![PathBuf::from("main.go")]);
    }

    #[test]
    fn test_file_contains() {
        let repo = create_test_repo();
        let manifest = repo.path().join("go.mod");

        assert!(file_contains(&manifest, "mongo-driver"));
        assert!(!file_contains(&manifest, "go-redis"));
        assert!(!file_contains(&repo.path().join("absent.mod"), "mongo-driver"));
    }

    #[test]
    fn test_file_contains_non_utf8() {
        let repo = TempDir::new().unwrap();
        let path = repo.path().join("Gemfile.lock");
        fs::write(&path, b"\xff\xfe binary\nmysql2 (0.5.5)\n").unwrap();
        assert!(file_contains(&path, "mysql2"));
    }

    #[test]
    fn test_detector_search_path_and_names() {
        let repo = create_test_repo();
        let detector = Detector::new(repo.path(), &Defaults::default());

        assert_eq!(
            detector.files_matching("pkg", &go_files(), &[]),
            vec![PathBuf::from("pkg/util/util.go")]
        );
        assert!(!detector.any_matching("missing", &go_files(), &[]));
        assert_eq!(detector.files_named("go.mod", &[]), vec![PathBuf::from("go.mod")]);
        assert!(detector.file_contains("go.mod", "mongo-driver"));
    }

    #[test]
    fn test_would_match_files_not_yet_written() {
        let repo = TempDir::new().unwrap();
        let detector = Detector::new(repo.path(), &Defaults::default());
        let yaml = Regex::new(r"\.ya?ml$").unwrap();
        let build_file = Path::new(".github/workflows/build.yml");

        assert!(detector.would_match(build_file, ".github/workflows", &yaml, &[]));
        assert!(detector.would_match(build_file, ".", &yaml, &[]));
        assert!(!detector.would_match(build_file, "deploy", &yaml, &[]));
        assert!(!detector.would_match(build_file, ".", &go_files(), &[]));
        assert!(!detector.would_match(build_file, ".", &yaml, &[".github".to_string()]));
        assert!(!detector.would_match(Path::new("node_modules/x/a.yml"), ".", &yaml, &[]));
        assert!(!detector.any_matching(".", &yaml, &[]));
    }
}
