//! GitHub runner registration-token exchange
//!
//! Self-hosted runners attach with a short-lived registration token, not the
//! operator's PAT. This module performs the one HTTPS call that swaps the
//! PAT for a registration (or removal) token. The runner protocol itself is
//! GitHub's; nothing beyond the token endpoints is touched here.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

/// GitHub API version header value
const API_VERSION: &str = "2022-11-28";

/// Errors from the token exchange.
#[derive(Debug, thiserror::Error)]
pub enum GithubError {
    /// `GITHUB_URL` does not name an organization or repository
    #[error("cannot derive a runner scope from '{0}': expected https://github.com/<org> or https://github.com/<owner>/<repo>")]
    InvalidUrl(String),

    /// GitHub answered with a non-success status
    #[error("GitHub API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure, surfaced verbatim
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Where the runner attaches, derived from `GITHUB_URL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationTarget {
    Organization { host: String, org: String },
    Repository {
        host: String,
        owner: String,
        repo: String,
    },
}

impl RegistrationTarget {
    /// Parse a `GITHUB_URL` like `https://github.com/acme` or
    /// `https://github.com/acme/widgets`.
    pub fn from_url(url: &str) -> Result<Self, GithubError> {
        let invalid = || GithubError::InvalidUrl(url.to_string());

        let rest = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"))
            .ok_or_else(invalid)?;

        let mut parts = rest.trim_end_matches('/').split('/');
        let host = parts.next().filter(|h| !h.is_empty()).ok_or_else(invalid)?;
        let segments: Vec<&str> = parts.filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [org] => Ok(RegistrationTarget::Organization {
                host: host.to_string(),
                org: (*org).to_string(),
            }),
            [owner, repo] => Ok(RegistrationTarget::Repository {
                host: host.to_string(),
                owner: (*owner).to_string(),
                repo: (*repo).to_string(),
            }),
            _ => Err(invalid()),
        }
    }

    /// REST base for the host: api.github.com for github.com, the `/api/v3`
    /// prefix for GitHub Enterprise Server.
    fn api_base(&self) -> String {
        let host = match self {
            RegistrationTarget::Organization { host, .. } => host,
            RegistrationTarget::Repository { host, .. } => host,
        };
        if host == "github.com" {
            "https://api.github.com".to_string()
        } else {
            format!("https://{host}/api/v3")
        }
    }

    /// Endpoint for one of the token actions (`registration-token` or
    /// `remove-token`).
    fn token_endpoint(&self, action: &str) -> String {
        let base = self.api_base();
        match self {
            RegistrationTarget::Organization { org, .. } => {
                format!("{base}/orgs/{org}/actions/runners/{action}")
            }
            RegistrationTarget::Repository { owner, repo, .. } => {
                format!("{base}/repos/{owner}/{repo}/actions/runners/{action}")
            }
        }
    }
}

/// A short-lived runner credential returned by GitHub.
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerToken {
    pub token: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Exchange the PAT for a registration token.
pub async fn registration_token(
    http: &reqwest::Client,
    github_url: &str,
    pat: &str,
) -> Result<RunnerToken, GithubError> {
    fetch_token(http, github_url, pat, "registration-token").await
}

/// Exchange the PAT for a removal token.
pub async fn remove_token(
    http: &reqwest::Client,
    github_url: &str,
    pat: &str,
) -> Result<RunnerToken, GithubError> {
    fetch_token(http, github_url, pat, "remove-token").await
}

async fn fetch_token(
    http: &reqwest::Client,
    github_url: &str,
    pat: &str,
    action: &str,
) -> Result<RunnerToken, GithubError> {
    let target = RegistrationTarget::from_url(github_url)?;
    let endpoint = target.token_endpoint(action);
    debug!("Requesting {} from {}", action, endpoint);

    let response = http
        .post(&endpoint)
        .bearer_auth(pat)
        .header("Accept", "application/vnd.github+json")
        .header("X-GitHub-Api-Version", API_VERSION)
        .header("User-Agent", format!("runner-fleet/{}", crate::get_version()))
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
            .unwrap_or(body);
        return Err(GithubError::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(response.json::<RunnerToken>().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn org_url_parses() {
        let target = RegistrationTarget::from_url("https://github.com/acme").unwrap();
        assert_eq!(
            target,
            RegistrationTarget::Organization {
                host: "github.com".to_string(),
                org: "acme".to_string(),
            }
        );
    }

    #[test]
    fn repo_url_parses() {
        let target = RegistrationTarget::from_url("https://github.com/acme/widgets/").unwrap();
        assert_eq!(
            target,
            RegistrationTarget::Repository {
                host: "github.com".to_string(),
                owner: "acme".to_string(),
                repo: "widgets".to_string(),
            }
        );
    }

    #[test]
    fn deep_paths_rejected() {
        assert!(RegistrationTarget::from_url("https://github.com/a/b/c").is_err());
        assert!(RegistrationTarget::from_url("https://github.com/").is_err());
        assert!(RegistrationTarget::from_url("github.com/acme").is_err());
    }

    #[test]
    fn org_token_endpoint() {
        let target = RegistrationTarget::from_url("https://github.com/acme").unwrap();
        assert_eq!(
            target.token_endpoint("registration-token"),
            "https://api.github.com/orgs/acme/actions/runners/registration-token"
        );
    }

    #[test]
    fn repo_token_endpoint() {
        let target = RegistrationTarget::from_url("https://github.com/acme/widgets").unwrap();
        assert_eq!(
            target.token_endpoint("remove-token"),
            "https://api.github.com/repos/acme/widgets/actions/runners/remove-token"
        );
    }

    #[test]
    fn enterprise_host_uses_v3_prefix() {
        let target = RegistrationTarget::from_url("https://ghe.example.com/acme").unwrap();
        assert_eq!(
            target.token_endpoint("registration-token"),
            "https://ghe.example.com/api/v3/orgs/acme/actions/runners/registration-token"
        );
    }

    #[test]
    fn token_response_parses() {
        let token: RunnerToken = serde_json::from_str(
            r#"{"token": "AABBCC", "expires_at": "2026-08-07T12:00:00.000Z"}"#,
        )
        .unwrap();
        assert_eq!(token.token, "AABBCC");
        assert!(token.expires_at.is_some());
    }
}
