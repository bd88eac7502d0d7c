//! `.gitignore` synthesis
//!
//! Templates are chosen from a small catalog by scanning the repository, fetched merged
//! from a template service, then followed by the catalog's custom pattern blocks and
//! whatever was hand-written after the last recognised section of the previous file.

mod source;

pub use source::{HttpTemplateSource, TemplateSource, GITIGNORE_API_URL};

use crate::catalog::read_catalog;
use crate::detection::Detector;
use crate::error::{BuildError, Result};
use crate::fs::write_atomic;
use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info};

pub const GITIGNORE_FILE: &str = ".gitignore";
const SECTION_END: &str = "# End of ";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitignoreCatalog {
    #[serde(default)]
    pub always: Vec<String>,

    /// Template name to an alternation of source extensions
    #[serde(default)]
    pub extensions: IndexMap<String, String>,

    /// Template name to file names that trigger it
    #[serde(default)]
    pub files: IndexMap<String, Vec<String>>,

    #[serde(default)]
    pub packages: IndexMap<String, PackageMarker>,

    /// Block name to ignore patterns appended verbatim
    #[serde(default)]
    pub custom: IndexMap<String, Vec<String>>,
}

/// Template triggered when a manifest at the repository root mentions a package
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PackageMarker {
    pub file: String,
    pub token: String,
}

impl GitignoreCatalog {
    pub fn load(path: &Path) -> Result<Self> {
        read_catalog("gitignore config", path)
    }

    /// Templates applicable to the repository, in catalog order without duplicates
    pub fn detect_templates(&self, detector: &Detector, excluded: &[String]) -> Result<Vec<String>> {
        let mut templates: Vec<String> = Vec::new();
        let mut add = |template: &str| {
            if !templates.iter().any(|t| t == template) {
                templates.push(template.to_string());
            }
        };

        for template in &self.always {
            add(template);
        }

        for (template, extension) in &self.extensions {
            let pattern = format!(r"^.*\.({})$", extension);
            let regex = Regex::new(&pattern)
                .map_err(|source| BuildError::InvalidPattern { pattern, source })?;
            if detector.any_matching(".", &regex, excluded) {
                add(template);
            }
        }

        for (template, names) in &self.files {
            if names
                .iter()
                .any(|name| !detector.files_named(name, excluded).is_empty())
            {
                add(template);
            }
        }

        for (template, marker) in &self.packages {
            if detector.file_contains(&marker.file, &marker.token) {
                add(template);
            }
        }

        debug!(?templates, "Detected gitignore templates");
        Ok(templates)
    }
}

fn blank_runs() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\n{3,}").expect("valid regex"))
}

/// Lines of `previous` after its last section end marker
pub fn trailing_content(previous: &str) -> String {
    let lines: Vec<&str> = previous.lines().collect();
    match lines.iter().rposition(|line| line.contains(SECTION_END)) {
        Some(index) => lines[index + 1..].join("\n").trim().to_string(),
        None => String::new(),
    }
}

/// Assembles the file from the fetched body, custom blocks and preserved trailing content
pub fn render(fetched: &str, custom: &IndexMap<String, Vec<String>>, previous: Option<&str>) -> String {
    let mut content = fetched.trim().to_string();
    content.push('\n');

    for (name, patterns) in custom {
        content.push_str(&format!("\n# Start of custom: {}\n", name));
        for pattern in patterns {
            content.push_str(pattern);
            content.push('\n');
        }
        content.push_str(&format!("{}custom: {}\n", SECTION_END, name));
    }

    if let Some(trailing) = previous.map(trailing_content).filter(|t| !t.is_empty()) {
        content.push('\n');
        content.push_str(&trailing);
        content.push('\n');
    }

    blank_runs().replace_all(&content, "\n\n").into_owned()
}

/// Rewrites the repository's `.gitignore`; returns whether its content changed
pub fn update_gitignore(
    catalog: &GitignoreCatalog,
    source: &dyn TemplateSource,
    detector: &Detector,
    excluded: &[String],
) -> Result<bool> {
    let templates = catalog.detect_templates(detector, excluded)?;
    let fetched = source.fetch(&templates)?;

    let path = detector.path(GITIGNORE_FILE);
    let previous = match fs::read_to_string(&path) {
        Ok(content) => Some(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => return Err(BuildError::io(&path, e)),
    };

    let content = render(&fetched, &catalog.custom, previous.as_deref());
    if previous.as_deref() == Some(content.as_str()) {
        debug!("gitignore unchanged");
        return Ok(false);
    }

    write_atomic(&path, content.as_bytes())?;
    info!(templates = templates.len(), "Updated {}", GITIGNORE_FILE);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Defaults;
    use std::cell::RefCell;
    use tempfile::TempDir;

    struct StaticSource {
        body: String,
        requested: RefCell<Vec<String>>,
    }

    impl TemplateSource for StaticSource {
        fn fetch(&self, templates: &[String]) -> Result<String> {
            *self.requested.borrow_mut() = templates.to_vec();
            Ok(self.body.clone())
        }
    }

    const FETCHED: &str = "# Created by https://example.test/api/macos,go\n\n### macOS ###\n.DS_Store\n\n# End of https://example.test/api/macos,go\n";

    fn catalog() -> GitignoreCatalog {
        serde_yaml::from_str(
            r#"
always: [macos]
extensions:
  go: go
  python: py
files:
  terraform: [main.tf]
packages:
  rails:
    file: Gemfile
    token: rails
custom:
  github-build: [update-packages, '*.zip']
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_detect_templates() {
        let repo = TempDir::new().unwrap();
        fs::create_dir_all(repo.path().join("infra")).unwrap();
        fs::write(repo.path().join("main.go"), "").unwrap();
        fs::write(repo.path().join("infra/main.tf"), "").unwrap();
        fs::write(repo.path().join("Gemfile"), "gem 'rails'\n").unwrap();
        let detector = Detector::new(repo.path(), &Defaults::default());

        let templates = catalog().detect_templates(&detector, &[]).unwrap();

        assert_eq!(templates, vec!["macos", "go", "terraform", "rails"]);
    }

    #[test]
    fn test_render_custom_blocks() {
        let content = render(FETCHED, &catalog().custom, None);

        assert!(content.starts_with("# Created by"));
        assert!(content.ends_with(
            "# Start of custom: github-build\nupdate-packages\n*.zip\n# End of custom: github-build\n"
        ));
        assert!(!content.contains("\n\n\n"));
    }

    #[test]
    fn test_render_preserves_trailing_hand_edits() {
        let previous = "# Created by x\nfoo\n# End of x\n\n# Start of custom: a\nb\n# End of custom: a\n\n# local\n/scratch\n";
        let content = render(FETCHED, &catalog().custom, Some(previous));

        assert!(content.ends_with("# End of custom: github-build\n\n# local\n/scratch\n"));
        // rendering again keeps exactly one copy
        let again = render(FETCHED, &catalog().custom, Some(&content));
        assert_eq!(again, content);
    }

    #[test]
    fn test_trailing_content_without_marker() {
        assert_eq!(trailing_content("target/\n"), "");
    }

    #[test]
    fn test_update_gitignore_writes_once() {
        let repo = TempDir::new().unwrap();
        fs::write(repo.path().join("main.py"), "").unwrap();
        let detector = Detector::new(repo.path(), &Defaults::default());
        let source = StaticSource {
            body: FETCHED.to_string(),
            requested: RefCell::new(Vec::new()),
        };

        assert!(update_gitignore(&catalog(), &source, &detector, &[]).unwrap());
        assert_eq!(*source.requested.borrow(), vec!["macos", "python"]);
        assert!(!update_gitignore(&catalog(), &source, &detector, &[]).unwrap());
    }
}
