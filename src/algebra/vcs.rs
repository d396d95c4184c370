use crate::domain::{ErrorKind, Outcome};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::warn;

/// Repository checks against the hosting VCS. `repo_accessible` gates
/// publication; `features` and `ping_webhook` are only ever called from
/// post-response hooks, so their failures never reach a client.
#[async_trait]
pub trait VcsExt: Send + Sync {
    async fn repo_accessible(&self, repo: &str, token: &str) -> Outcome;
    async fn features(&self, repo: &str, token: &str) -> Outcome;
    async fn ping_webhook(&self, repo: &str, token: &str) -> Outcome;
}

fn bad_repo(detail: &str) -> Outcome {
    Outcome::failure()
        .with_short(ErrorKind::BadRepo)
        .with_content(json!(detail))
}

pub struct GithubVcs {
    client: Client,
    api_base: String,
}

impl GithubVcs {
    pub fn new(client: Client, api_base: &str) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    async fn get(&self, path: &str, token: &str) -> Result<(StatusCode, Value), String> {
        let response = self
            .client
            .get(format!("{}{}", self.api_base, path))
            .header("Authorization", format!("Bearer {}", token))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "registry-api")
            .send()
            .await
            .map_err(|e| {
                warn!("VCS request failed: {}", e);
                format!("VCS request failed: {}", e)
            })?;

        let status = response.status();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);

        Ok((status, body))
    }

    async fn post(&self, path: &str, token: &str, body: &Value) -> Result<StatusCode, String> {
        let response = self
            .client
            .post(format!("{}{}", self.api_base, path))
            .header("Authorization", format!("Bearer {}", token))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "registry-api")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!("VCS request failed: {}", e);
                format!("VCS request failed: {}", e)
            })?;

        Ok(response.status())
    }
}

#[async_trait]
impl VcsExt for GithubVcs {
    async fn repo_accessible(&self, repo: &str, token: &str) -> Outcome {
        match self.get(&format!("/repos/{}", repo), token).await {
            Ok((status, body)) if status == StatusCode::OK => Outcome::success(body),
            Ok((status, _))
                if status == StatusCode::NOT_FOUND || status == StatusCode::FORBIDDEN =>
            {
                bad_repo(&format!("Repository {} is not accessible", repo))
            }
            Ok((status, _)) => Outcome::failure()
                .with_short(ErrorKind::ServerError)
                .with_content(json!(format!(
                    "Unexpected VCS status {} for {}",
                    status, repo
                ))),
            Err(detail) => Outcome::failure()
                .with_short(ErrorKind::ServerError)
                .with_content(json!(detail)),
        }
    }

    async fn features(&self, repo: &str, token: &str) -> Outcome {
        match self.get(&format!("/repos/{}/tags", repo), token).await {
            Ok((status, body)) if status == StatusCode::OK => Outcome::success(body),
            Ok((status, _)) => bad_repo(&format!(
                "Feature detection got status {} for {}",
                status, repo
            )),
            Err(detail) => Outcome::failure()
                .with_short(ErrorKind::ServerError)
                .with_content(json!(detail)),
        }
    }

    async fn ping_webhook(&self, repo: &str, token: &str) -> Outcome {
        let body = json!({"event_type": "package_published"});
        match self
            .post(&format!("/repos/{}/dispatches", repo), token, &body)
            .await
        {
            Ok(status) if status.is_success() => Outcome::success(json!({"delivered": true})),
            Ok(status) => Outcome::failure()
                .with_short(ErrorKind::ServerError)
                .with_content(json!(format!(
                    "Webhook ping got status {} for {}",
                    status, repo
                ))),
            Err(detail) => Outcome::failure()
                .with_short(ErrorKind::ServerError)
                .with_content(json!(detail)),
        }
    }
}

/// Allowlist stand-in for tests and development environments. Webhook pings
/// are recorded instead of delivered so assertions can observe them.
#[derive(Debug, Default)]
pub struct StaticVcs {
    repos: HashMap<String, Value>,
    pings: Mutex<Vec<String>>,
}

impl StaticVcs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repo(mut self, repo: &str) -> Self {
        self.repos
            .insert(repo.to_string(), json!({"full_name": repo}));
        self
    }

    pub fn pings(&self) -> Vec<String> {
        self.pings
            .lock()
            .map(|pings| pings.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl VcsExt for StaticVcs {
    async fn repo_accessible(&self, repo: &str, _token: &str) -> Outcome {
        match self.repos.get(repo) {
            Some(body) => Outcome::success(body.clone()),
            None => bad_repo(&format!("Repository {} is not accessible", repo)),
        }
    }

    async fn features(&self, repo: &str, _token: &str) -> Outcome {
        match self.repos.get(repo) {
            Some(_) => Outcome::success(json!([])),
            None => bad_repo(&format!("Repository {} is not accessible", repo)),
        }
    }

    async fn ping_webhook(&self, repo: &str, _token: &str) -> Outcome {
        if !self.repos.contains_key(repo) {
            return bad_repo(&format!("Repository {} is not accessible", repo));
        }

        if let Ok(mut pings) = self.pings.lock() {
            pings.push(repo.to_string());
        }

        Outcome::success(json!({"delivered": true}))
    }
}
