//! Remote repository settings over the GitHub REST API

mod api;
mod settings;

pub use api::{ApiResponse, GitHubApi, HttpGitHubApi, GITHUB_API_URL, GITHUB_TOKEN_ENV};
pub use settings::{protection_rules, security_features, RepositorySettings, SettingsReport};
