use super::licenses::license_step;
use crate::catalog::{env_key, is_version_key, scalar_text, DependencyRule, LanguageRule, Service, SetupOption};
use crate::error::{BuildError, Result};
use crate::pipeline::context::{apply_default_with, with_params, SynthesisContext};
use crate::pipeline::expressions::{
    wrap, AWS_ACCESS_KEY_ID, AWS_REGION, AWS_SECRET_ACCESS_KEY, SSH_KEY, VARIABLES_JOB,
};
use crate::pipeline::phase_trait::WorkflowPhase;
use serde_yaml::{Mapping, Value};
use std::fs;
use tracing::{debug, info, warn};

pub const SETUP_STEP: &str = "Setup";

/// One unit test job per language with source files and at least one manifest
pub struct LanguagesPhase;

impl WorkflowPhase for LanguagesPhase {
    fn execute(&self, context: &mut SynthesisContext) -> Result<()> {
        let exclusions = context.exclusions();
        let languages: Vec<LanguageRule> = context.catalog.languages.values().cloned().collect();

        for language in languages {
            let Some(pattern) = language.source_pattern()? else {
                continue;
            };

            if !context.detector.any_matching(".", &pattern, &exclusions) {
                debug!(language = %language.short_name, "No source files");
                continue;
            }

            let manifests: Vec<DependencyRule> = language
                .dependencies
                .iter()
                .filter(|dependency| context.detector.is_file(&dependency.dependency_file))
                .cloned()
                .collect();
            if manifests.is_empty() {
                debug!(language = %language.short_name, "Source files without a dependency manifest");
                continue;
            }

            info!("Enabling {}", language.long_name);
            add_language_job(context, &language, &manifests)?;
        }

        Ok(())
    }
}

fn detected_services(context: &SynthesisContext, manifests: &[DependencyRule]) -> Vec<Service> {
    Service::ALL
        .iter()
        .copied()
        .filter(|service| {
            manifests.iter().any(|dependency| {
                dependency
                    .marker(*service)
                    .is_some_and(|marker| context.detector.file_contains(&dependency.dependency_file, marker))
            })
        })
        .collect()
}

/// Pins environment values from version files present in the repository
fn pin_versions(context: &mut SynthesisContext, language: &LanguageRule) {
    for version_file in &language.version_files {
        let path = context.detector.path(&version_file.file);
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        let version = content.trim();
        if version.is_empty() {
            continue;
        }

        let key = env_key(&version_file.option);
        debug!(key = %key, version, file = %version_file.file, "Pinned by version file");
        context.new.env.insert(Value::from(key.as_str()), Value::from(version));
        context.pinned_env.insert(key);
    }
}

/// Merges recommended options into the workflow environment and the setup parameters
///
/// An existing environment value always wins. A mismatch is logged, and fails the run
/// under strict mode when the key names a version. Values pinned by a version file are
/// never reported.
fn add_setup_options(
    context: &mut SynthesisContext,
    setup: &mut Mapping,
    options: &[SetupOption],
) -> Result<()> {
    for option in options {
        let key = env_key(&option.name);
        let env_name = Value::from(key.as_str());
        let recommended = option.value.as_ref().filter(|value| !value.is_null());

        match (context.new.env.get(&env_name), recommended) {
            (Some(existing), Some(recommended)) => {
                let existing = scalar_text(existing);
                let recommended = scalar_text(recommended);
                if existing != recommended && !context.pinned_env.contains(&key) {
                    warn!(
                        "{} is '{}' but '{}' is recommended, keeping current value",
                        key, existing, recommended
                    );
                    if context.options.strict_version_check && is_version_key(&key) {
                        return Err(BuildError::VersionMismatch {
                            field: key,
                            existing,
                            recommended,
                        });
                    }
                }
            }
            (Some(_), None) => {}
            (None, Some(recommended)) => {
                context.new.env.insert(env_name, recommended.clone());
            }
            (None, None) => continue,
        }

        setup.insert(
            Value::from(option.name.as_str()),
            Value::from(format!("${{{{env.{}}}}}", key)),
        );
    }

    Ok(())
}

fn add_language_job(
    context: &mut SynthesisContext,
    language: &LanguageRule,
    manifests: &[DependencyRule],
) -> Result<()> {
    let id = language.job_id();
    let services = detected_services(context, manifests);

    pin_versions(context, language);
    let mut setup = Mapping::new();
    add_setup_options(context, &mut setup, &language.setup_options)?;
    let apt = context.catalog.services.apt.options.clone();
    add_setup_options(context, &mut setup, &apt)?;
    for service in &services {
        debug!(language = %language.short_name, service = service.name(), "Service detected");
        let options = context.catalog.services.for_service(*service).to_vec();
        add_setup_options(context, &mut setup, &options)?;
    }

    let replay = context.defaults.is_predeploy_language(&language.short_name)
        || context.options.force_codedeploy_setup;
    let fallback_runner = language
        .runs_on
        .clone()
        .unwrap_or_else(|| context.defaults.ubuntu_runner.clone());

    let mut job = context.seed_job(&id);
    job.name = Some(language.job_name());
    job.runs_on = Some(context.previous_runner(&id, &fallback_runner));
    job.needs = vec![VARIABLES_JOB.to_string()];
    job.condition = Some(match &language.condition {
        Some(extra) => wrap(&format!("{} || {}", context.unit_test_gate, extra)),
        None => wrap(&context.unit_test_gate),
    });

    let mut setup_step = context.seed_step(&id, SETUP_STEP);
    setup_step.uses = Some(context.defaults.action("setup"));
    let mut defaults = with_params(&[
        ("ssh-key", SSH_KEY),
        ("aws-access-key-id", AWS_ACCESS_KEY_ID),
        ("aws-secret-access-key", AWS_SECRET_ACCESS_KEY),
        ("aws-region", AWS_REGION),
    ]);
    defaults.extend(setup);
    apply_default_with(&mut setup_step, defaults);
    if replay {
        context.predeploy_steps.push(setup_step.clone());
    }

    let updates: Vec<String> = manifests
        .iter()
        .filter_map(|dependency| dependency.package_manager_update.clone())
        .filter(|command| !command.trim().is_empty())
        .collect();
    if !updates.is_empty() {
        context.dependency_setup_steps.push(setup_step.clone());
        context.update_script.extend(updates);
    }
    job.add_step(setup_step);

    for dependency in manifests {
        let mut step = context.seed_step(&id, &dependency.package_manager_name);
        step.shell = Some("bash".to_string());
        if step.run.is_none() {
            step.run = Some(dependency.package_manager_default.clone());
        }
        if replay {
            context.predeploy_steps.push(step.clone());
        }
        job.add_step(step);
    }

    let mut tests = context.seed_step(&id, &language.unit_test_framework_name);
    tests.shell = Some("bash".to_string());
    if tests.run.is_none() {
        tests.run = Some(language.unit_test_framework_default.clone());
    }
    job.add_step(tests);

    if context.detector.exists(&context.defaults.platform_lock_file)
        && !context.options.skip_license_check
    {
        job.add_step(license_step(context, &id));
    }

    context.new.insert_job(job);
    Ok(())
}
