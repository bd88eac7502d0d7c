use super::args_comment::args_from_file;
use crate::config::{default_config_dir, CatalogPaths, Defaults};
use crate::pipeline::SynthesisOptions;
use clap::Parser;
use std::path::{Path, PathBuf};

const PROGRAM: &str = "github-build";

/// GitHub Actions build workflow generator
#[derive(Parser, Debug, Clone)]
#[command(
    name = "github-build",
    about = "Generate the GitHub Actions build workflow of a repository",
    version,
    long_about = "github-build detects the languages, linters and deployment targets of a \
                  repository and writes its GitHub Actions build workflow, merging any \
                  customization found in the previous one. It also maintains the dependabot \
                  configuration, the dependency update workflow, branch protection settings \
                  and the .gitignore file.\n\n\
                  Examples:\n  \
                  github-build\n  \
                  github-build --skip_slack --excluded_folders vendor,generated\n  \
                  github-build --only_dependabot"
)]
pub struct CliArgs {
    #[arg(long = "application_name", value_name = "NAME", help = "CodeDeploy application name")]
    pub application_name: Option<String>,

    #[arg(long = "build_file", value_name = "FILE", help = "Build workflow to write")]
    pub build_file: Option<PathBuf>,

    #[arg(long = "config_dir", value_name = "DIR", help = "Directory holding the rule catalogs")]
    pub config_dir: Option<PathBuf>,

    #[arg(
        long = "excluded_folders",
        value_name = "FOLDERS",
        value_delimiter = ',',
        help = "Comma separated folders excluded from detection"
    )]
    pub excluded_folders: Vec<String>,

    #[arg(
        long = "force_codedeploy_setup",
        help = "Replay language setup before deployment for every language"
    )]
    pub force_codedeploy_setup: bool,

    #[arg(long = "gitignore_config_file", value_name = "FILE")]
    pub gitignore_config_file: Option<PathBuf>,

    #[arg(
        long = "ignored_linters",
        value_name = "LINTERS",
        value_delimiter = ',',
        help = "Comma separated linters never enabled"
    )]
    pub ignored_linters: Vec<String>,

    #[arg(long = "languages_config_file", value_name = "FILE")]
    pub languages_config_file: Option<PathBuf>,

    #[arg(long = "linters_config_file", value_name = "FILE")]
    pub linters_config_file: Option<PathBuf>,

    #[arg(long = "only_dependabot", help = "Only write the dependabot configuration")]
    pub only_dependabot: bool,

    #[arg(long = "options_apt", alias = "options-apt", value_name = "FILE")]
    pub options_apt: Option<PathBuf>,

    #[arg(long = "options_mongodb", alias = "options-mongodb", value_name = "FILE")]
    pub options_mongodb: Option<PathBuf>,

    #[arg(long = "options_mysql", alias = "options-mysql", value_name = "FILE")]
    pub options_mysql: Option<PathBuf>,

    #[arg(long = "options_redis", alias = "options-redis", value_name = "FILE")]
    pub options_redis: Option<PathBuf>,

    #[arg(
        long = "options_elasticsearch",
        alias = "options-elasticsearch",
        value_name = "FILE"
    )]
    pub options_elasticsearch: Option<PathBuf>,

    #[arg(long = "organization", value_name = "ORG", help = "GitHub organization owning the repository")]
    pub organization: Option<String>,

    #[arg(long = "skip_dependabot")]
    pub skip_dependabot: bool,

    #[arg(long = "skip_gitignore")]
    pub skip_gitignore: bool,

    #[arg(long = "skip_license_check")]
    pub skip_license_check: bool,

    #[arg(long = "skip_repository_settings")]
    pub skip_repository_settings: bool,

    #[arg(long = "skip_semgrep")]
    pub skip_semgrep: bool,

    #[arg(long = "skip_slack")]
    pub skip_slack: bool,

    #[arg(
        long = "no_strict_version_check",
        help = "Warn instead of failing on version mismatches"
    )]
    pub no_strict_version_check: bool,

    #[arg(long, value_name = "PATH", default_value = ".", help = "Repository root")]
    pub path: PathBuf,

    #[arg(long, help = "Print the full error chain on failure")]
    pub debug: bool,

    #[arg(long, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

impl CliArgs {
    /// Parses `raw`, replaying the arguments recorded in the build file when it is empty
    ///
    /// Returns the parsed arguments together with the argument list to record again.
    pub fn from_invocation(raw: Vec<String>) -> Result<(Self, Vec<String>), clap::Error> {
        let args = Self::try_parse_from(std::iter::once(PROGRAM.to_string()).chain(raw.iter().cloned()))?;
        if !raw.is_empty() {
            return Ok((args, raw));
        }

        let recorded = args_from_file(&args.build_file(&args.path, &Defaults::default()));
        if recorded.is_empty() {
            return Ok((args, raw));
        }

        let replayed =
            Self::try_parse_from(std::iter::once(PROGRAM.to_string()).chain(recorded.iter().cloned()))?;
        Ok((replayed, recorded))
    }

    /// Build file location under `repo_root`
    pub fn build_file(&self, repo_root: &Path, defaults: &Defaults) -> PathBuf {
        repo_root.join(self.build_file.as_ref().unwrap_or(&defaults.build_file))
    }

    pub fn synthesis_options(&self, repo_root: &Path) -> SynthesisOptions {
        let mut ignored_linters = self.ignored_linters.clone();
        if self.skip_semgrep && !ignored_linters.iter().any(|l| l == "semgrep") {
            ignored_linters.push("semgrep".to_string());
        }

        SynthesisOptions {
            application_name: self.application_name(repo_root),
            excluded_folders: self.excluded_folders.clone(),
            ignored_linters,
            force_codedeploy_setup: self.force_codedeploy_setup,
            only_dependabot: self.only_dependabot,
            skip_license_check: self.skip_license_check,
            skip_slack: self.skip_slack,
            strict_version_check: !self.no_strict_version_check,
            generated_files: Vec::new(),
        }
    }

    /// Catalog locations: the config root with any per-file override applied
    pub fn catalog_paths(&self) -> CatalogPaths {
        let root = self.config_dir.clone().unwrap_or_else(default_config_dir);
        let mut paths = CatalogPaths::under(&root);

        let overrides = [
            (&mut paths.linters, &self.linters_config_file),
            (&mut paths.languages, &self.languages_config_file),
            (&mut paths.gitignore, &self.gitignore_config_file),
            (&mut paths.apt, &self.options_apt),
            (&mut paths.mongodb, &self.options_mongodb),
            (&mut paths.mysql, &self.options_mysql),
            (&mut paths.redis, &self.options_redis),
            (&mut paths.elasticsearch, &self.options_elasticsearch),
        ];
        for (slot, value) in overrides {
            if let Some(path) = value {
                *slot = path.clone();
            }
        }
        paths
    }

    /// Explicit name, else the last `-` segment of the repository directory name
    pub fn application_name(&self, repo_root: &Path) -> String {
        if let Some(name) = &self.application_name {
            return name.clone();
        }
        directory_name(repo_root)
            .rsplit('-')
            .next()
            .unwrap_or_default()
            .to_string()
    }

    /// Explicit organization, else the name of the repository's parent directory
    pub fn organization(&self, repo_root: &Path) -> String {
        if let Some(organization) = &self.organization {
            return organization.clone();
        }
        repo_root
            .parent()
            .map(directory_name)
            .unwrap_or_default()
    }
}

fn directory_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
