//! GitHub REST API client.
//!
//! Only the calls a release needs: checking what the token may do with the
//! repository, creating a release, and attaching built distributions.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};

use crate::config::RemoteConfig;
use crate::error::{MonorelError, Result};
use crate::secrets::Token;

/// Public GitHub API.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const API_VERSION: &str = "2022-11-28";

/// API base URL: `GITHUB_API_URL`, then the configured URL, then the public API.
pub fn api_base_url(remote: &RemoteConfig) -> String {
    std::env::var("GITHUB_API_URL")
        .ok()
        .filter(|v| !v.is_empty())
        .or_else(|| remote.api_url.clone())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
        .trim_end_matches('/')
        .to_string()
}

/// What the token may do with a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoAccess {
    pub full_name: String,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub permissions: Permissions,
}

/// Repository permissions as reported for the authenticated token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub push: bool,
    #[serde(default)]
    pub pull: bool,
}

impl RepoAccess {
    /// Whether the token can push tags and create releases.
    pub fn can_release(&self) -> bool {
        self.permissions.push || self.permissions.admin
    }
}

/// Body of a create-release request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRelease {
    pub tag_name: String,
    pub name: String,
    pub body: String,
    pub draft: bool,
    pub prerelease: bool,
}

/// A created release.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    pub id: u64,
    pub tag_name: String,
    pub html_url: String,
    /// Upload endpoint template, e.g. `https://uploads.github.com/.../assets{?name,label}`.
    #[serde(default)]
    pub upload_url: String,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    message: String,
}

/// Blocking client for the hosting API.
pub struct GitHubClient {
    base_url: String,
    client: Client,
}

impl GitHubClient {
    /// Create a client authenticated with `token`.
    pub fn new(base_url: impl Into<String>, token: &Token) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(API_VERSION),
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("monorel/", env!("CARGO_PKG_VERSION"))),
        );
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.expose()))
            .context("Hosting token contains characters not allowed in a header")?;
        auth.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, auth);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Fetch repository metadata, including the token's permissions.
    pub fn repo_access(&self, slug: &str) -> Result<RepoAccess> {
        let endpoint = format!("/repos/{}", slug);
        let response = self
            .client
            .get(self.url(&endpoint))
            .send()
            .with_context(|| format!("Failed to reach {}", self.base_url))?;
        let response = check(response, &endpoint)?;
        Ok(response
            .json()
            .with_context(|| format!("Unexpected response from {}", endpoint))?)
    }

    /// Create a release for an existing tag.
    pub fn create_release(&self, slug: &str, release: &NewRelease) -> Result<Release> {
        let endpoint = format!("/repos/{}/releases", slug);
        tracing::debug!("creating release {} in {}", release.tag_name, slug);
        let response = self
            .client
            .post(self.url(&endpoint))
            .json(release)
            .send()
            .with_context(|| format!("Failed to reach {}", self.base_url))?;
        let response = check(response, &endpoint)?;
        Ok(response
            .json()
            .with_context(|| format!("Unexpected response from {}", endpoint))?)
    }

    /// Attach a file to a release.
    pub fn upload_asset(&self, release: &Release, file: &Path) -> Result<()> {
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let base = release
            .upload_url
            .split('{')
            .next()
            .filter(|u| !u.is_empty())
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("Release {} has no upload URL", release.tag_name))?;
        let bytes = std::fs::read(file)?;

        tracing::debug!("uploading {} to release {}", name, release.tag_name);
        let response = self
            .client
            .post(&base)
            .query(&[("name", name.as_str())])
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .send()
            .with_context(|| format!("Failed to upload {}", name))?;
        check(response, &base)?;
        Ok(())
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }
}

fn check(response: Response, endpoint: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    let message = serde_json::from_str::<ApiMessage>(&body)
        .map(|m| m.message)
        .unwrap_or(body);
    Err(MonorelError::HostingApi {
        endpoint: endpoint.to_string(),
        status: status.as_u16(),
        message,
    })
}
