//! Dependency bot configuration and the dependency-update workflow
//!
//! The bot configuration lists one daily update per package ecosystem found in the
//! repository. The dependency-update workflow runs on the bot's branches, replays the
//! language setup steps, refreshes every manifest, rescans licenses and commits the
//! result back to the branch.

use crate::catalog::Catalog;
use crate::detection::Detector;
use crate::error::Result;
use crate::fs::write_atomic;
use crate::pipeline::phases::licenses::{license_params, LICENSES_JOB, LICENSES_STEP};
use crate::pipeline::SynthesisContext;
use crate::workflow::{Job, Step, StepField, Workflow};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::path::Path;
use tracing::{debug, info};

/// Always tracked: the generated workflows themselves reference versioned actions
pub const GITHUB_ACTIONS_ECOSYSTEM: &str = "github-actions";

pub const DEPENDENCIES_WORKFLOW_NAME: &str = "Dependencies";
pub const DEPENDENCIES_JOB: &str = "update_dependencies";
const DEPENDABOT_BRANCHES: &str = "dependabot/**";
const AUTO_COMMIT_ACTION: &str = "stefanzweifel/git-auto-commit-action@v5";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependabotConfig {
    pub version: u8,
    pub updates: Vec<UpdateEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateEntry {
    #[serde(rename = "package-ecosystem")]
    pub package_ecosystem: String,
    pub directory: String,
    pub schedule: Schedule,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub interval: String,
}

impl DependabotConfig {
    /// Daily updates at the repository root for every ecosystem, in order
    pub fn for_ecosystems(ecosystems: &[String]) -> Self {
        Self {
            version: 2,
            updates: ecosystems
                .iter()
                .map(|ecosystem| UpdateEntry {
                    package_ecosystem: ecosystem.clone(),
                    directory: "/".to_string(),
                    schedule: Schedule {
                        interval: "daily".to_string(),
                    },
                })
                .collect(),
        }
    }

    /// Ecosystems whose manifest appears anywhere in the repository
    pub fn detect(detector: &Detector, catalog: &Catalog, excluded: &[String]) -> Self {
        let mut ecosystems = vec![GITHUB_ACTIONS_ECOSYSTEM.to_string()];

        for language in catalog.languages.values() {
            for dependency in &language.dependencies {
                let Some(ecosystem) = dependency.dependabot_ecosystem.as_deref() else {
                    continue;
                };
                if ecosystems.iter().any(|e| e == ecosystem) {
                    continue;
                }
                if !detector.files_named(&dependency.dependency_file, excluded).is_empty() {
                    debug!(ecosystem, manifest = %dependency.dependency_file, "Dependabot ecosystem detected");
                    ecosystems.push(ecosystem.to_string());
                }
            }
        }

        Self::for_ecosystems(&ecosystems)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        write_atomic(path, self.to_yaml()?.as_bytes())?;
        info!(path = %path.display(), ecosystems = self.updates.len(), "Wrote dependabot configuration");
        Ok(())
    }
}

fn dependabot_triggers() -> Value {
    let branches = Value::Sequence(vec![Value::from(DEPENDABOT_BRANCHES)]);
    let mut filter = Mapping::new();
    filter.insert(Value::from("branches"), branches);

    let mut on = Mapping::new();
    on.insert(Value::from("push"), Value::Mapping(filter.clone()));
    on.insert(Value::from("pull_request"), Value::Mapping(filter));
    Value::Mapping(on)
}

/// Workflow refreshing dependencies on the bot's branches
///
/// Built only when the license job exists and at least one manifest has an update
/// command; `None` tells the caller to remove a previously written file.
pub fn dependencies_workflow(context: &SynthesisContext) -> Option<Workflow> {
    let licenses = context.new.job(LICENSES_JOB)?;
    if context.update_script.is_empty() {
        return None;
    }

    let mut workflow = Workflow {
        name: Some(DEPENDENCIES_WORKFLOW_NAME.to_string()),
        on: dependabot_triggers(),
        env: context.new.env.clone(),
        ..Default::default()
    };

    let mut job = Job::new(DEPENDENCIES_JOB);
    job.name = Some("Update Dependencies".to_string());
    job.runs_on = Some(Value::from(context.defaults.macos_runner.as_str()));
    let mut permissions = Mapping::new();
    permissions.insert(Value::from("contents"), Value::from("write"));
    job.permissions = Value::Mapping(permissions);
    job.timeout_minutes = Some(Value::from(context.defaults.job_timeout_minutes));

    for recorded in &context.dependency_setup_steps {
        let mut step = recorded.clone();
        step.condition = None;
        job.add_step(step);
    }

    let mut update = Step::new("Update Dependencies");
    update.shell = Some("bash".to_string());
    update.run = Some(context.update_script.join("\n"));
    job.add_step(update);

    let mut license = Step::new(LICENSES_STEP);
    license.copy_fields(licenses.step(LICENSES_STEP), StepField::ALL);
    license.uses = Some(context.defaults.action("soup"));
    if license.with.is_empty() {
        license.with = license_params();
    }
    job.add_step(license);

    let mut commit = Step::new("Auto Commit Changes");
    commit.uses = Some(AUTO_COMMIT_ACTION.to_string());
    commit.with.insert(Value::from("commit_message"), Value::from("Updated dependencies"));
    job.add_step(commit);

    workflow.insert_job(job);
    debug!(commands = context.update_script.len(), "Built dependency update workflow");
    Some(workflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Defaults;
    use crate::pipeline::test_support::{bundled_catalog, context_with_old};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_detect_ecosystems() {
        let repo = TempDir::new().unwrap();
        fs::create_dir_all(repo.path().join("web/node_modules/pkg")).unwrap();
        fs::write(repo.path().join("go.mod"), "module x\n").unwrap();
        fs::write(repo.path().join("web/package.json"), "{}").unwrap();
        fs::write(repo.path().join("web/node_modules/pkg/composer.json"), "{}").unwrap();
        let detector = Detector::new(repo.path(), &Defaults::default());
        let (catalog, _) = bundled_catalog();

        let config = DependabotConfig::detect(&detector, &catalog, &[]);

        let ecosystems: Vec<&str> = config
            .updates
            .iter()
            .map(|u| u.package_ecosystem.as_str())
            .collect();
        assert_eq!(ecosystems, vec!["github-actions", "gomod", "npm"]);
    }

    #[test]
    fn test_dependabot_yaml() {
        let config = DependabotConfig::for_ecosystems(&["github-actions".to_string()]);
        let yaml = config.to_yaml().unwrap();

        assert!(yaml.starts_with("version: 2\n"));
        assert!(yaml.contains("- package-ecosystem: github-actions\n"));
        assert!(yaml.contains("interval: daily"));
        let parsed: DependabotConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_no_workflow_without_license_job() {
        let (_repo, mut context) = context_with_old("");
        context.update_script.push("npm update".to_string());
        assert!(dependencies_workflow(&context).is_none());
    }

    #[test]
    fn test_no_workflow_without_update_commands() {
        let (_repo, mut context) = context_with_old("");
        context.new.insert_job(Job::new(LICENSES_JOB));
        assert!(dependencies_workflow(&context).is_none());
    }

    #[test]
    fn test_dependencies_workflow() {
        let (_repo, mut context) = context_with_old("");
        let mut licenses = Job::new(LICENSES_JOB);
        let mut scan = Step::new(LICENSES_STEP);
        scan.with.insert(Value::from("parameters"), Value::from("--strict"));
        licenses.add_step(scan);
        context.new.insert_job(licenses);
        context.new.env.insert(Value::from("GO_VERSION"), Value::from("1.22"));

        let mut setup = Step::new("Setup");
        setup.condition = Some("${{false}}".to_string());
        context.dependency_setup_steps.push(setup);
        context.update_script = vec!["go get -u ./...".to_string(), "npm update".to_string()];

        let workflow = dependencies_workflow(&context).unwrap();

        assert_eq!(workflow.name.as_deref(), Some("Dependencies"));
        assert_eq!(workflow.on["push"]["branches"][0], Value::from("dependabot/**"));
        assert_eq!(workflow.env["GO_VERSION"], Value::from("1.22"));

        let job = workflow.job(DEPENDENCIES_JOB).unwrap();
        assert_eq!(job.runs_on, Some(Value::from("macos-latest")));
        assert_eq!(job.permissions["contents"], Value::from("write"));
        let names: Vec<&str> = job.steps.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Setup", "Update Dependencies", "Licenses", "Auto Commit Changes"]
        );
        assert!(job.steps[0].condition.is_none());
        assert_eq!(
            job.step("Update Dependencies").unwrap().run.as_deref(),
            Some("go get -u ./...\nnpm update")
        );
        let license = job.step(LICENSES_STEP).unwrap();
        assert_eq!(license.with["parameters"], Value::from("--strict"));
        assert_eq!(license.uses.as_deref(), Some("cloud-officer/ci-actions/soup@master"));
    }
}
