use super::context::{SynthesisContext, SynthesisOptions};
use super::phase_trait::WorkflowPhase;
use super::phases::{
    aws::AwsPhase, code_deploy::CodeDeployPhase, defaults::DefaultsPhase,
    languages::LanguagesPhase, licenses::LicensesPhase, linters::{install_linter_configs, LintersPhase},
    publish_status::PublishStatusPhase, status_checks::StatusChecksPhase,
    validate::ValidatePhase, variables::VariablesPhase,
};
use crate::catalog::Catalog;
use crate::config::Defaults;
use crate::dependabot::dependencies_workflow;
use crate::workflow::Workflow;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Everything a run produces besides the installed linter configurations
#[derive(Debug, Clone, Default)]
pub struct SynthesisOutput {
    pub workflow: Workflow,

    /// Status checks the remote branch protection must require, in job order
    pub required_checks: Vec<String>,

    /// Dependency-update workflow; `None` means any existing one is obsolete
    pub dependencies_workflow: Option<Workflow>,
}

/// Builds the new workflow from detection results and the previous document
pub struct Synthesizer {
    defaults: Defaults,
    catalog: Catalog,
    bundled_linter_configs: PathBuf,
}

impl Synthesizer {
    pub fn new(defaults: Defaults, catalog: Catalog, bundled_linter_configs: PathBuf) -> Self {
        Self {
            defaults,
            catalog,
            bundled_linter_configs,
        }
    }

    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn phases() -> Vec<(Box<dyn WorkflowPhase>, &'static str)> {
        vec![
            (Box::new(DefaultsPhase), "DefaultsPhase"),
            (Box::new(VariablesPhase), "VariablesPhase"),
            (Box::new(LintersPhase), "LintersPhase"),
            (Box::new(LicensesPhase), "LicensesPhase"),
            (Box::new(LanguagesPhase), "LanguagesPhase"),
            (Box::new(CodeDeployPhase), "CodeDeployPhase"),
            (Box::new(AwsPhase), "AwsPhase"),
            (Box::new(PublishStatusPhase), "PublishStatusPhase"),
            (Box::new(ValidatePhase), "ValidatePhase"),
            (Box::new(StatusChecksPhase), "StatusChecksPhase"),
        ]
    }

    /// Runs every phase in order against `repo_root`
    ///
    /// Linter configurations are installed only after the last phase has succeeded. In
    /// dependency-bot-only mode no phase runs and the output is empty.
    pub fn synthesize(
        &self,
        repo_root: &Path,
        old: Workflow,
        options: SynthesisOptions,
    ) -> Result<SynthesisOutput> {
        let start = Instant::now();
        info!("Synthesizing workflow for: {}", repo_root.display());

        if options.only_dependabot {
            info!("Dependency bot only, skipping workflow synthesis");
            return Ok(SynthesisOutput::default());
        }

        let mut context = SynthesisContext::new(
            self.defaults.clone(),
            options,
            self.catalog.clone(),
            repo_root.to_path_buf(),
            self.bundled_linter_configs.clone(),
            old,
        );

        for (phase, phase_name) in Self::phases() {
            info!("Phase: {}", phase_name);

            let phase_start = Instant::now();
            phase
                .execute(&mut context)
                .with_context(|| format!("Phase {} failed", phase_name))?;

            debug!(
                "Phase {} complete in {:?}",
                phase_name,
                phase_start.elapsed()
            );
        }

        install_linter_configs(&context).context("Failed to install linter configurations")?;
        let dependencies_workflow = dependencies_workflow(&context);

        info!(
            "Synthesis complete: {} jobs, {} required checks in {:?}",
            context.new.jobs.len(),
            context.required_checks.len(),
            start.elapsed()
        );

        Ok(SynthesisOutput {
            workflow: context.new,
            required_checks: context.required_checks,
            dependencies_workflow,
        })
    }
}
