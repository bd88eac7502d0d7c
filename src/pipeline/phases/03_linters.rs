use crate::catalog::LinterRule;
use crate::error::Result;
use crate::fs::{install_config, ConfigSource, InstallOutcome};
use crate::pipeline::context::{apply_default_with, with_params, SynthesisContext};
use crate::pipeline::expressions::{not_skipped, output_reference, wrap, GITHUB_TOKEN, SSH_KEY, VARIABLES_JOB};
use crate::pipeline::phase_trait::WorkflowPhase;
use crate::workflow::serde_helpers::is_blank;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info};

/// One job per linter whose file pattern matches somewhere in the repository
///
/// Detection looks at the repository as the run leaves it: the generated documents and
/// the configuration of every enabled linter count as present even before they are
/// written, so a second run enables the same linters.
pub struct LintersPhase;

impl WorkflowPhase for LintersPhase {
    fn execute(&self, context: &mut SynthesisContext) -> Result<()> {
        let exclusions = context.exclusions();
        let candidates: Vec<(String, LinterRule)> = context
            .catalog
            .linters
            .iter()
            .filter(|(id, _)| {
                let ignored = context.options.ignored_linters.iter().any(|ignored| ignored == *id);
                if ignored {
                    debug!(linter = %id, "Linter ignored by configuration");
                }
                !ignored
            })
            .map(|(id, rule)| (id.clone(), rule.clone()))
            .collect();

        let enabled = enabled_linters(context, &candidates, &exclusions)?;

        for (id, rule) in candidates {
            if !enabled.contains(&id) {
                debug!(linter = %id, pattern = %rule.pattern, "No matching files");
                continue;
            }

            info!("Enabling {}", rule.short_name);
            add_linter_job(context, &id, &rule);
            if rule.config.is_some() {
                context.linter_configs.push(rule);
            }
        }

        Ok(())
    }
}

/// Repeats detection until enabling a linter no longer adds files another one matches
fn enabled_linters(
    context: &SynthesisContext,
    candidates: &[(String, LinterRule)],
    exclusions: &[String],
) -> Result<HashSet<String>> {
    let mut pending: Vec<PathBuf> = context.options.generated_files.clone();
    let mut enabled = HashSet::new();

    loop {
        let mut changed = false;

        for (id, rule) in candidates {
            if enabled.contains(id) {
                continue;
            }

            let pattern = rule.file_pattern()?;
            let found = context.detector.any_matching(&rule.path, &pattern, exclusions)
                || pending
                    .iter()
                    .any(|file| context.detector.would_match(file, &rule.path, &pattern, exclusions));
            if !found {
                continue;
            }

            enabled.insert(id.clone());
            if let Some(config) = &rule.config {
                pending.push(PathBuf::from(config));
            }
            changed = true;
        }

        if !changed {
            return Ok(enabled);
        }
    }
}

/// Installs the configuration of every linter the phase enabled
pub fn install_linter_configs(context: &SynthesisContext) -> Result<()> {
    for rule in &context.linter_configs {
        install_linter_config(context, rule)?;
    }
    Ok(())
}

fn install_linter_config(context: &SynthesisContext, rule: &LinterRule) -> Result<()> {
    let Some(config) = rule.config.as_deref() else {
        return Ok(());
    };

    let target = context.detector.path(config);
    let shared = context
        .submodules
        .shared_linter_config(context.detector.root(), config);
    let bundled = context.bundled_linter_configs.join(config);

    let source = match shared.as_deref() {
        Some(shared) => ConfigSource::Shared(shared),
        None => ConfigSource::Bundled {
            path: &bundled,
            uncomment: rule.applicable_transform(&context.detector),
        },
    };

    let outcome = install_config(&target, source, rule.preserve_config)?;
    if outcome == InstallOutcome::Kept {
        debug!(config, "Keeping existing linter configuration");
    }
    Ok(())
}

fn add_linter_job(context: &mut SynthesisContext, id: &str, rule: &LinterRule) {
    let mut job = context.seed_job(id);
    job.name = Some(rule.long_name.clone());
    job.runs_on = Some(context.previous_runner(id, &context.defaults.ubuntu_runner));
    job.needs = vec![VARIABLES_JOB.to_string()];

    if is_blank(&job.permissions) {
        if let Some(permissions) = &rule.permissions {
            job.permissions = permissions.clone();
        }
    }

    let gate = not_skipped("SKIP_LINTERS");
    job.condition = Some(match &rule.condition {
        Some(extra) => wrap(&format!("{} && {}", gate, extra)),
        None => wrap(&gate),
    });

    let mut step = context.seed_step(id, &rule.short_name);
    step.uses = Some(rule.uses.clone());

    let linters = output_reference("LINTERS");
    let mut defaults = with_params(&[
        ("linters", linters.as_str()),
        ("ssh-key", SSH_KEY),
        ("github_token", GITHUB_TOKEN),
    ]);
    for (key, value) in &rule.options {
        defaults.insert(key.clone(), value.clone());
    }
    apply_default_with(&mut step, defaults);

    job.add_step(step);
    context.new.insert_job(job);
}
