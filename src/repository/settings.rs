use super::api::{ApiResponse, GitHubApi};
use crate::error::{BuildError, Result};
use serde_json::{json, Value};
use std::collections::BTreeSet;
use tracing::{info, warn};

/// Outcome of a successful settings run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsReport {
    pub default_branch: String,

    /// Branch protection did not exist before this run
    pub created_protection: bool,

    pub private: bool,
}

/// Validates and enforces branch protection and security features of one repository
pub struct RepositorySettings<'a, A: GitHubApi + ?Sized> {
    api: &'a A,
    owner: String,
    repository: String,
}

impl<'a, A: GitHubApi + ?Sized> RepositorySettings<'a, A> {
    pub fn new(api: &'a A, owner: impl Into<String>, repository: impl Into<String>) -> Self {
        Self {
            api,
            owner: owner.into(),
            repository: repository.into(),
        }
    }

    fn repo_path(&self) -> String {
        format!("/repos/{}/{}", self.owner, self.repository)
    }

    /// Compares the remote required checks with `expected_checks`, then enforces settings
    ///
    /// A mismatch fails before any mutating call. Missing protection is created.
    pub fn apply(&self, expected_checks: &[String]) -> Result<SettingsReport> {
        let repo_path = self.repo_path();
        let repository = self.api.get(&repo_path)?;
        if repository.status != 200 {
            return Err(repository.unexpected("GET", &repo_path));
        }

        let default_branch = repository
            .body
            .get("default_branch")
            .and_then(Value::as_str)
            .unwrap_or("master")
            .to_string();
        let private = is_private(&repository.body);

        let protection_path = format!("{}/branches/{}/protection", repo_path, default_branch);
        let protection = self.api.get(&protection_path)?;
        let created_protection = match protection.status {
            200 => {
                check_contexts(&default_branch, &protection.body, expected_checks)?;
                false
            }
            404 => {
                info!(branch = %default_branch, "No branch protection yet, creating it");
                true
            }
            _ => return Err(protection.unexpected("GET", &protection_path)),
        };

        self.expect(
            "PUT",
            &protection_path,
            self.api.put(&protection_path, &protection_rules(expected_checks))?,
            &[200],
        )?;

        let alerts_path = format!("{}/vulnerability-alerts", repo_path);
        self.expect("PUT", &alerts_path, self.api.put(&alerts_path, &Value::Null)?, &[204])?;

        let fixes_path = format!("{}/automated-security-fixes", repo_path);
        self.expect("PUT", &fixes_path, self.api.put(&fixes_path, &Value::Null)?, &[204])?;

        self.expect(
            "PATCH",
            &repo_path,
            self.api.patch(&repo_path, &security_features(private))?,
            &[200],
        )?;

        info!(
            repository = %self.repository,
            branch = %default_branch,
            checks = expected_checks.len(),
            "Repository settings up to date"
        );
        Ok(SettingsReport {
            default_branch,
            created_protection,
            private,
        })
    }

    fn expect(
        &self,
        method: &'static str,
        path: &str,
        response: ApiResponse,
        accepted: &[u16],
    ) -> Result<()> {
        if accepted.contains(&response.status) {
            Ok(())
        } else {
            Err(response.unexpected(method, path))
        }
    }
}

fn is_private(repository: &Value) -> bool {
    match repository.get("visibility").and_then(Value::as_str) {
        Some(visibility) => visibility != "public",
        None => repository
            .get("private")
            .and_then(Value::as_bool)
            .unwrap_or(true),
    }
}

fn check_contexts(branch: &str, protection: &Value, expected: &[String]) -> Result<()> {
    let configured: BTreeSet<String> = protection
        .pointer("/required_status_checks/contexts")
        .and_then(Value::as_array)
        .map(|contexts| {
            contexts
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let missing: Vec<String> = expected
        .iter()
        .filter(|check| !configured.contains(*check))
        .cloned()
        .collect();
    let extra: Vec<String> = configured
        .iter()
        .filter(|check| !expected.contains(*check))
        .cloned()
        .collect();

    if missing.is_empty() && extra.is_empty() {
        return Ok(());
    }

    for check in &missing {
        warn!("Missing check {}", check);
    }
    Err(BuildError::StatusCheckMismatch {
        branch: branch.to_string(),
        missing,
        extra,
    })
}

/// Protection rules: exact checks, code-owner and last-push reviews, resolved
/// conversations, no force pushes or deletions
pub fn protection_rules(checks: &[String]) -> Value {
    json!({
        "required_status_checks": {
            "strict": false,
            "contexts": checks,
        },
        "enforce_admins": false,
        "required_pull_request_reviews": {
            "dismiss_stale_reviews": true,
            "require_code_owner_reviews": true,
            "require_last_push_approval": true,
            "required_approving_review_count": 1,
        },
        "restrictions": null,
        "required_linear_history": false,
        "allow_force_pushes": false,
        "allow_deletions": false,
        "block_creations": false,
        "required_conversation_resolution": true,
    })
}

/// Advanced security features are billed on private repositories
pub fn security_features(private: bool) -> Value {
    let status = if private { "disabled" } else { "enabled" };
    json!({
        "security_and_analysis": {
            "advanced_security": { "status": status },
            "secret_scanning": { "status": status },
            "secret_scanning_push_protection": { "status": status },
        }
    })
}
