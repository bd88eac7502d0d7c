//! State shared by the synthesis phases

use crate::catalog::{Catalog, LinterRule};
use crate::config::Defaults;
use crate::detection::{Detector, Submodules};
use crate::workflow::{Job, JobField, Step, StepField, Workflow};
use serde_yaml::{Mapping, Value};
use std::collections::HashSet;
use std::path::PathBuf;

/// Run-level switches consumed by the synthesizer
#[derive(Debug, Clone)]
pub struct SynthesisOptions {
    /// CodeDeploy application receiving the deployments
    pub application_name: String,

    /// Path substrings excluded from detection
    pub excluded_folders: Vec<String>,

    /// Linter catalog keys never enabled
    pub ignored_linters: Vec<String>,

    /// Replay setup steps before deployment for every language
    pub force_codedeploy_setup: bool,

    /// Skip every phase; only dependency bot wiring is produced
    pub only_dependabot: bool,

    pub skip_license_check: bool,
    pub skip_slack: bool,

    /// Fail on version mismatches instead of warning
    pub strict_version_check: bool,

    /// Repository-relative documents the run writes after synthesis
    ///
    /// Detection treats them as present so a rerun finds the same files.
    pub generated_files: Vec<PathBuf>,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            application_name: String::new(),
            excluded_folders: Vec::new(),
            ignored_linters: Vec::new(),
            force_codedeploy_setup: false,
            only_dependabot: false,
            skip_license_check: false,
            skip_slack: false,
            strict_version_check: true,
            generated_files: Vec::new(),
        }
    }
}

/// Everything a phase reads or writes while building the new workflow
///
/// `old` is only ever read; `new` is the only document mutated.
pub struct SynthesisContext {
    pub defaults: Defaults,
    pub options: SynthesisOptions,
    pub catalog: Catalog,
    pub detector: Detector,
    pub submodules: Submodules,

    /// Directory holding the bundled linter configurations
    pub bundled_linter_configs: PathBuf,

    pub old: Workflow,
    pub new: Workflow,

    /// Setup steps replayed by the deploy job instead of a plain checkout
    pub predeploy_steps: Vec<Step>,

    /// Setup steps needed by the dependency update workflow
    pub dependency_setup_steps: Vec<Step>,

    /// Dependency update commands, one per line of the update script
    pub update_script: Vec<String>,

    /// Shared condition of every unit test job, set by the license phase
    pub unit_test_gate: String,

    /// Environment keys pinned by a version file
    pub pinned_env: HashSet<String>,

    /// Status checks the remote branch protection must require
    pub required_checks: Vec<String>,

    /// Linters whose configuration is installed once every phase has succeeded
    pub linter_configs: Vec<LinterRule>,
}

impl SynthesisContext {
    pub fn new(
        defaults: Defaults,
        options: SynthesisOptions,
        catalog: Catalog,
        repo_root: PathBuf,
        bundled_linter_configs: PathBuf,
        old: Workflow,
    ) -> Self {
        let detector = Detector::new(repo_root.clone(), &defaults);
        let submodules = Submodules::load(&repo_root);

        Self {
            defaults,
            options,
            catalog,
            detector,
            submodules,
            bundled_linter_configs,
            old,
            new: Workflow::default(),
            predeploy_steps: Vec::new(),
            dependency_setup_steps: Vec::new(),
            update_script: Vec::new(),
            unit_test_gate: String::new(),
            pinned_env: HashSet::new(),
            required_checks: Vec::new(),
            linter_configs: Vec::new(),
        }
    }

    /// Path substrings excluded from detection: configured folders plus submodules
    pub fn exclusions(&self) -> Vec<String> {
        self.options
            .excluded_folders
            .iter()
            .chain(self.submodules.paths.iter())
            .cloned()
            .collect()
    }

    /// New job seeded with every field of its previous incarnation
    ///
    /// Jobs without a previous timeout get the default one.
    pub fn seed_job(&self, id: &str) -> Job {
        let mut job = Job::new(id);
        job.copy_fields(self.old.job(id), JobField::ALL);
        if job.timeout_minutes.is_none() {
            job.timeout_minutes = Some(Value::from(self.defaults.job_timeout_minutes));
        }
        job
    }

    /// New step seeded from the same-named step of the previous job
    pub fn seed_step(&self, job_id: &str, name: &str) -> Step {
        let mut step = Step::new(name);
        let previous = self.old.job(job_id).and_then(|job| job.step(name));
        step.copy_fields(previous, StepField::ALL);
        step
    }

    /// Runner of the previous job, else `fallback`
    pub fn previous_runner(&self, id: &str, fallback: &str) -> Value {
        self.old
            .job(id)
            .and_then(|job| job.runs_on.clone())
            .unwrap_or_else(|| Value::from(fallback))
    }

    /// Identifiers of every job inserted so far
    pub fn upstream_jobs(&self) -> Vec<String> {
        self.new.job_ids()
    }
}

/// Applies default parameters only to a step without any
///
/// Any previously customized parameter suppresses every default.
pub fn apply_default_with(step: &mut Step, defaults: Mapping) {
    if step.with.is_empty() {
        step.with = defaults;
    }
}

/// Builds a parameter mapping from string pairs
pub fn with_params(pairs: &[(&str, &str)]) -> Mapping {
    pairs
        .iter()
        .map(|(key, value)| (Value::from(*key), Value::from(*value)))
        .collect()
}
