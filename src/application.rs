//! One complete run: validate the configuration, synthesize, then write every output
//!
//! Catalogs and the settings credential are checked before anything is written. Linter
//! configurations and workflow documents are written only once synthesis has succeeded,
//! so a strict version mismatch or a dangling dependency leaves the repository as it
//! was. A failure while writing or in the remote settings step can leave earlier
//! outputs in place.

use crate::catalog::Catalog;
use crate::cli::{args_comment, CliArgs};
use crate::config::{CatalogPaths, Defaults};
use crate::dependabot::DependabotConfig;
use crate::detection::{Detector, Submodules};
use crate::fs::remove_if_exists;
use crate::gitignore::{update_gitignore, GitignoreCatalog, HttpTemplateSource, TemplateSource};
use crate::pipeline::{SynthesisOutput, Synthesizer};
use crate::repository::{GitHubApi, HttpGitHubApi, RepositorySettings, SettingsReport};
use crate::workflow::Workflow;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// What a run changed
#[derive(Debug, Default)]
pub struct RunReport {
    /// Build file written, `None` in dependency-bot-only mode
    pub build_file: Option<PathBuf>,

    pub required_checks: Vec<String>,

    /// The dependency update workflow was written (as opposed to removed)
    pub dependencies_workflow: bool,

    pub dependabot_file: Option<PathBuf>,
    pub settings: Option<SettingsReport>,

    /// `Some(changed)` when the .gitignore collaborator ran
    pub gitignore_changed: Option<bool>,
}

pub struct Application {
    args: CliArgs,
    recorded_args: Vec<String>,
    defaults: Defaults,
    github: Option<Box<dyn GitHubApi>>,
    templates: Option<Box<dyn TemplateSource>>,
}

impl Application {
    /// `recorded_args` are written back into the build file header
    pub fn new(args: CliArgs, recorded_args: Vec<String>) -> Self {
        Self {
            args,
            recorded_args,
            defaults: Defaults::default(),
            github: None,
            templates: None,
        }
    }

    pub fn with_defaults(mut self, defaults: Defaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Replaces the REST client built from `GITHUB_TOKEN`
    pub fn with_github_api(mut self, api: Box<dyn GitHubApi>) -> Self {
        self.github = Some(api);
        self
    }

    /// Replaces the HTTP template service used for `.gitignore`
    pub fn with_template_source(mut self, source: Box<dyn TemplateSource>) -> Self {
        self.templates = Some(source);
        self
    }

    pub fn run(&self) -> Result<RunReport> {
        let start = Instant::now();
        let repo_root = self
            .args
            .path
            .canonicalize()
            .with_context(|| format!("Repository not found: {}", self.args.path.display()))?;
        info!("github-build v{} in {}", crate::VERSION, repo_root.display());

        let paths = self.args.catalog_paths();
        paths.validate().context("Configuration validation failed")?;
        debug!("{}", paths);
        let catalog = Catalog::load(&paths)?;

        let only_dependabot = self.args.only_dependabot;
        let applies_settings = !only_dependabot && !self.args.skip_repository_settings;
        // a missing credential must fail before anything is written
        let http_api = match &self.github {
            None if applies_settings => {
                Some(HttpGitHubApi::from_env().context("Configuration validation failed")?)
            }
            _ => None,
        };

        let build_file = self.args.build_file(&repo_root, &self.defaults);
        let old = Workflow::load(&build_file)?.unwrap_or_default();

        let mut options = self.args.synthesis_options(&repo_root);
        options.generated_files = self.generated_files(&repo_root, &build_file);
        let excluded = self.exclusions(&repo_root);

        let synthesizer = Synthesizer::new(
            self.defaults.clone(),
            catalog.clone(),
            paths.bundled_linter_configs(),
        );
        let output = synthesizer.synthesize(&repo_root, old, options)?;

        let mut report = RunReport {
            required_checks: output.required_checks.clone(),
            ..Default::default()
        };

        if !only_dependabot {
            self.write_workflows(&repo_root, &build_file, &output, &mut report)?;
        }

        let detector = Detector::new(&repo_root, &self.defaults);
        if !self.args.skip_dependabot {
            let dependabot_file = repo_root.join(&self.defaults.dependabot_file);
            DependabotConfig::detect(&detector, &catalog, &excluded)
                .write(&dependabot_file)
                .context("Failed to write dependabot configuration")?;
            report.dependabot_file = Some(dependabot_file);
        }

        if only_dependabot {
            info!("Run complete in {:?}", start.elapsed());
            return Ok(report);
        }

        let settings_api: Option<&dyn GitHubApi> = match (&self.github, &http_api) {
            _ if !applies_settings => None,
            (Some(api), _) => Some(&**api),
            (None, Some(api)) => Some(api as &dyn GitHubApi),
            (None, None) => None,
        };
        if let Some(api) = settings_api {
            report.settings = Some(self.apply_settings(api, &repo_root, &output.required_checks)?);
        }

        if !self.args.skip_gitignore {
            report.gitignore_changed = Some(self.update_gitignore(&paths, &detector, &excluded)?);
        }

        info!("Run complete in {:?}", start.elapsed());
        Ok(report)
    }

    /// Repository-relative documents this run writes after synthesis
    fn generated_files(&self, repo_root: &Path, build_file: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();
        if let Ok(relative) = build_file.strip_prefix(repo_root) {
            files.push(relative.to_path_buf());
        }
        files.push(self.defaults.dependencies_workflow_file.clone());
        if !self.args.skip_dependabot {
            files.push(self.defaults.dependabot_file.clone());
        }
        files
    }

    fn exclusions(&self, repo_root: &Path) -> Vec<String> {
        let mut excluded = self.args.excluded_folders.clone();
        excluded.extend(Submodules::load(repo_root).paths);
        excluded
    }

    fn write_workflows(
        &self,
        repo_root: &Path,
        build_file: &Path,
        output: &SynthesisOutput,
        report: &mut RunReport,
    ) -> Result<()> {
        let header = args_comment(&self.recorded_args);
        output
            .workflow
            .write(build_file, header.as_deref())
            .with_context(|| format!("Failed to write {}", build_file.display()))?;
        info!("Wrote {}", build_file.display());
        report.build_file = Some(build_file.to_path_buf());

        let dependencies_file = repo_root.join(&self.defaults.dependencies_workflow_file);
        match &output.dependencies_workflow {
            Some(workflow) => {
                workflow
                    .write(&dependencies_file, None)
                    .with_context(|| format!("Failed to write {}", dependencies_file.display()))?;
                info!("Wrote {}", dependencies_file.display());
                report.dependencies_workflow = true;
            }
            None => {
                remove_if_exists(&dependencies_file)?;
                debug!("No dependency update workflow");
            }
        }
        Ok(())
    }

    fn apply_settings(
        &self,
        api: &dyn GitHubApi,
        repo_root: &Path,
        required_checks: &[String],
    ) -> Result<SettingsReport> {
        let owner = self.args.organization(repo_root);
        let repository = repo_root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!("Applying repository settings to {}/{}", owner, repository);

        RepositorySettings::new(api, owner, repository)
            .apply(required_checks)
            .context("Repository settings failed")
    }

    fn update_gitignore(
        &self,
        paths: &CatalogPaths,
        detector: &Detector,
        excluded: &[String],
    ) -> Result<bool> {
        let catalog = GitignoreCatalog::load(&paths.gitignore)?;
        let changed = match &self.templates {
            Some(source) => update_gitignore(&catalog, &**source, detector, excluded),
            None => {
                let source = HttpTemplateSource::new()?;
                update_gitignore(&catalog, &source, detector, excluded)
            }
        };
        changed.context("Failed to update .gitignore")
    }
}
