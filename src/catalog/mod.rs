//! Rule catalogs
//!
//! Linters, languages and service option bundles are data, loaded once per run from
//! YAML files and never mutated. Catalog order is preserved: jobs are synthesized in
//! the order their rules appear.

mod languages;
mod linters;
mod options;

pub use languages::{DependencyRule, LanguageRule, VersionFile};
pub use linters::{ConfigTransform, LinterRule};
pub use options::{
    env_key, is_version_key, scalar_text, OptionBundle, Service, ServiceOptions, SetupOption,
};

use crate::config::CatalogPaths;
use crate::error::{BuildError, Result};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Every rule consulted by the synthesizer
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub linters: IndexMap<String, LinterRule>,
    pub languages: IndexMap<String, LanguageRule>,
    pub services: ServiceOptions,
}

impl Catalog {
    pub fn load(paths: &CatalogPaths) -> Result<Self> {
        let catalog = Self {
            linters: read_catalog("linters config", &paths.linters)?,
            languages: read_catalog("languages config", &paths.languages)?,
            services: ServiceOptions {
                apt: read_catalog("APT options", &paths.apt)?,
                mongodb: read_catalog("MongoDB options", &paths.mongodb)?,
                mysql: read_catalog("MySQL options", &paths.mysql)?,
                redis: read_catalog("Redis options", &paths.redis)?,
                elasticsearch: read_catalog("Elasticsearch options", &paths.elasticsearch)?,
            },
        };

        debug!(
            linters = catalog.linters.len(),
            languages = catalog.languages.len(),
            "Loaded rule catalogs"
        );
        Ok(catalog)
    }
}

/// Reads one catalog file; an empty file yields the default value
pub fn read_catalog<T>(name: &str, path: &Path) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    if !path.is_file() {
        return Err(BuildError::MissingConfig {
            name: name.to_string(),
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path).map_err(|e| BuildError::io(path, e))?;
    if content.trim().is_empty() {
        return Ok(T::default());
    }

    serde_yaml::from_str(&content).map_err(|source| BuildError::InvalidConfig {
        name: name.to_string(),
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn bundled() -> CatalogPaths {
        CatalogPaths::under(&Path::new(env!("CARGO_MANIFEST_DIR")).join("config"))
    }

    #[test]
    fn test_load_bundled_catalogs() {
        let catalog = Catalog::load(&bundled()).unwrap();

        assert!(catalog.linters.contains_key("semgrep"));
        assert!(catalog.languages.contains_key("go"));
        assert!(!catalog.services.apt.options.is_empty());
        assert!(!catalog.services.for_service(Service::Mysql).is_empty());
    }

    #[test]
    fn test_bundled_linter_patterns_compile() {
        let catalog = Catalog::load(&bundled()).unwrap();
        for rule in catalog.linters.values() {
            assert!(rule.file_pattern().is_ok(), "{}", rule.short_name);
        }
        for rule in catalog.languages.values() {
            assert!(rule.source_pattern().is_ok(), "{}", rule.short_name);
        }
    }

    #[test]
    fn test_bundled_linter_configs_exist() {
        let paths = bundled();
        let catalog = Catalog::load(&paths).unwrap();
        for rule in catalog.linters.values() {
            if let Some(config) = &rule.config {
                assert!(
                    paths.bundled_linter_configs().join(config).is_file(),
                    "missing bundled config {}",
                    config
                );
            }
        }
    }

    #[test]
    fn test_catalog_order_preserved() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("linters.yaml");
        fs::write(
            &path,
            "zeta:\n  short_name: Z\n  long_name: Zeta\n  pattern: z\n  uses: a@b\nalpha:\n  short_name: A\n  long_name: Alpha\n  pattern: a\n  uses: a@b\n",
        )
        .unwrap();

        let linters: IndexMap<String, LinterRule> = read_catalog("linters config", &path).unwrap();
        assert_eq!(linters.keys().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_read_catalog_missing() {
        let err = read_catalog::<OptionBundle>("Redis options", &PathBuf::from("/absent/redis.yaml"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required Redis options file: /absent/redis.yaml"
        );
    }

    #[test]
    fn test_read_catalog_schema_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("languages.yaml");
        fs::write(&path, "go:\n  short_name: go\n").unwrap();

        let err = read_catalog::<IndexMap<String, LanguageRule>>("languages config", &path)
            .unwrap_err();
        assert!(matches!(err, BuildError::InvalidConfig { .. }));
    }
}
