use crate::error::{BuildError, Result};
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::debug;

pub const GITIGNORE_API_URL: &str = "https://www.toptal.com/developers/gitignore/api";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Service merging named ignore templates into one file body
pub trait TemplateSource {
    fn fetch(&self, templates: &[String]) -> Result<String>;
}

pub struct HttpTemplateSource {
    client: Client,
    base_url: String,
}

impl HttpTemplateSource {
    pub fn new() -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: GITIGNORE_API_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self, templates: &[String]) -> String {
        format!("{}/{}", self.base_url, templates.join(","))
    }
}

impl TemplateSource for HttpTemplateSource {
    fn fetch(&self, templates: &[String]) -> Result<String> {
        let url = self.url(templates);
        debug!(url = %url, "Fetching gitignore templates");

        let response = self.client.get(&url).send()?;
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(BuildError::Remote {
                method: "GET",
                path: url,
                status: status.as_u16(),
                message: body.lines().next().unwrap_or_default().to_string(),
            });
        }

        Ok(body)
    }
}
