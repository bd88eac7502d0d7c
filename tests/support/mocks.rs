use github_build::error::Result;
use github_build::gitignore::TemplateSource;
use github_build::repository::{ApiResponse, GitHubApi};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// GitHub API answering from a table of `"METHOD path"` keys and recording every call
///
/// Unknown calls answer 200 with an empty body. Clones share the call log, so a clone
/// kept by the test observes calls made through the boxed original.
#[derive(Clone, Default)]
pub struct RecordingGitHubApi {
    responses: Rc<RefCell<HashMap<String, ApiResponse>>>,
    calls: Rc<RefCell<Vec<String>>>,
}

#[allow(dead_code)]
impl RecordingGitHubApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Public repository `owner/name` on `master` with the given protection answer
    ///
    /// The security endpoints answer 204 as the real API does.
    pub fn repository(owner: &str, name: &str, protection: ApiResponse) -> Self {
        let repo_path = format!("/repos/{}/{}", owner, name);
        Self::new()
            .respond(
                "GET",
                &repo_path,
                ApiResponse::new(
                    200,
                    serde_json::json!({"default_branch": "master", "visibility": "public"}),
                ),
            )
            .respond("GET", &format!("{}/branches/master/protection", repo_path), protection)
            .respond("PUT", &format!("{}/vulnerability-alerts", repo_path), ApiResponse::empty(204))
            .respond("PUT", &format!("{}/automated-security-fixes", repo_path), ApiResponse::empty(204))
    }

    pub fn respond(self, method: &str, path: &str, response: ApiResponse) -> Self {
        self.responses
            .borrow_mut()
            .insert(format!("{} {}", method, path), response);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn mutating_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| !call.starts_with("GET "))
            .collect()
    }

    fn answer(&self, method: &str, path: &str) -> ApiResponse {
        let key = format!("{} {}", method, path);
        self.calls.borrow_mut().push(key.clone());
        self.responses
            .borrow()
            .get(&key)
            .cloned()
            .unwrap_or_else(|| ApiResponse::empty(200))
    }
}

impl GitHubApi for RecordingGitHubApi {
    fn get(&self, path: &str) -> Result<ApiResponse> {
        Ok(self.answer("GET", path))
    }

    fn put(&self, path: &str, _body: &Value) -> Result<ApiResponse> {
        Ok(self.answer("PUT", path))
    }

    fn patch(&self, path: &str, _body: &Value) -> Result<ApiResponse> {
        Ok(self.answer("PATCH", path))
    }
}

/// Template service returning a fixed body and remembering the requested templates
#[derive(Clone, Default)]
pub struct StaticTemplateSource {
    body: String,
    requested: Rc<RefCell<Vec<Vec<String>>>>,
}

#[allow(dead_code)]
impl StaticTemplateSource {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            requested: Rc::default(),
        }
    }

    pub fn requested(&self) -> Vec<Vec<String>> {
        self.requested.borrow().clone()
    }
}

impl TemplateSource for StaticTemplateSource {
    fn fetch(&self, templates: &[String]) -> Result<String> {
        self.requested.borrow_mut().push(templates.to_vec());
        Ok(self.body.clone())
    }
}
