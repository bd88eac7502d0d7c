//! Condition expressions referenced by generated jobs
//!
//! Every gate reads outputs of the `variables` job, so each generated job that uses one
//! also depends on that job.

use crate::config::Defaults;

pub const VARIABLES_JOB: &str = "variables";

/// Outputs published by the variables job, in emission order
pub const VARIABLE_OUTPUTS: &[&str] = &[
    "BUILD_NAME",
    "BUILD_VERSION",
    "COMMIT_MESSAGE",
    "MODIFIED_GITHUB_RUN_NUMBER",
    "DEPLOY_ON_BETA",
    "DEPLOY_ON_RC",
    "DEPLOY_ON_PROD",
    "DEPLOY_MACOS",
    "DEPLOY_TVOS",
    "DEPLOY_OPTIONS",
    "SKIP_LICENSES",
    "SKIP_LINTERS",
    "SKIP_TESTS",
    "UPDATE_PACKAGES",
    "LINTERS",
];

pub const SSH_KEY: &str = "${{secrets.SSH_KEY}}";
pub const GITHUB_TOKEN: &str = "${{secrets.GITHUB_TOKEN}}";
pub const AWS_ACCESS_KEY_ID: &str = "${{secrets.AWS_ACCESS_KEY_ID}}";
pub const AWS_SECRET_ACCESS_KEY: &str = "${{secrets.AWS_SECRET_ACCESS_KEY}}";
pub const AWS_REGION: &str = "${{secrets.AWS_DEFAULT_REGION}}";
pub const CODEDEPLOY_BUCKET: &str = "${{secrets.CODEDEPLOY_BUCKET}}";
pub const SLACK_WEBHOOK_URL: &str = "${{secrets.SLACK_WEBHOOK_URL}}";

/// Wraps a bare expression in `${{ }}`
pub fn wrap(expression: &str) -> String {
    format!("${{{{{}}}}}", expression)
}

/// `needs.variables.outputs.NAME`
pub fn output(name: &str) -> String {
    format!("needs.{}.outputs.{}", VARIABLES_JOB, name)
}

pub fn output_reference(name: &str) -> String {
    wrap(&output(name))
}

/// Step output the variables job re-exports under the same name
pub fn step_output(name: &str) -> String {
    wrap(&format!("steps.{}.outputs.{}", VARIABLES_JOB, name))
}

pub fn not_skipped(flag: &str) -> String {
    format!("{} != '1'", output(flag))
}

pub fn flag_set(flag: &str) -> String {
    format!("{} == '1'", output(flag))
}

pub fn deploy_flag(environment: &str) -> String {
    format!("DEPLOY_ON_{}", environment.to_uppercase())
}

/// True when any deployment environment was requested
pub fn any_deploy_requested(defaults: &Defaults) -> String {
    let flags: Vec<String> = defaults
        .deploy_environments
        .iter()
        .map(|env| flag_set(&deploy_flag(env)))
        .collect();
    format!("({})", flags.join(" || "))
}

/// Runs after every upstream job when a deployment was requested and nothing failed
pub fn aggregate_gate(defaults: &Defaults, upstream: &[String]) -> String {
    let mut expression = format!("always() && {}", any_deploy_requested(defaults));
    for job in upstream {
        expression.push_str(&format!(" && needs.{}.result != 'failure'", job));
    }
    wrap(&expression)
}

/// Gate of a single environment deployment following the aggregating deploy job
pub fn environment_gate(upstream: &str, environment: &str) -> String {
    wrap(&format!(
        "always() && needs.{}.result == 'success' && {}",
        upstream,
        flag_set(&deploy_flag(environment))
    ))
}

pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("always()"), "${{always()}}");
    }

    #[test]
    fn test_not_skipped() {
        assert_eq!(
            not_skipped("SKIP_LINTERS"),
            "needs.variables.outputs.SKIP_LINTERS != '1'"
        );
    }

    #[test]
    fn test_aggregate_gate() {
        let gate = aggregate_gate(
            &Defaults::default(),
            &["variables".to_string(), "go_unit_tests".to_string()],
        );
        assert_eq!(
            gate,
            "${{always() && (needs.variables.outputs.DEPLOY_ON_BETA == '1' || \
             needs.variables.outputs.DEPLOY_ON_RC == '1' || \
             needs.variables.outputs.DEPLOY_ON_PROD == '1') && \
             needs.variables.result != 'failure' && \
             needs.go_unit_tests.result != 'failure'}}"
        );
    }

    #[test]
    fn test_environment_gate() {
        assert_eq!(
            environment_gate("codedeploy", "rc"),
            "${{always() && needs.codedeploy.result == 'success' && \
             needs.variables.outputs.DEPLOY_ON_RC == '1'}}"
        );
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("beta"), "Beta");
        assert_eq!(capitalize(""), "");
    }
}
