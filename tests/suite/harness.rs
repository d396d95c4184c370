use once_cell::sync::Lazy;
use registry_api::prelude::{
    AppState, Collaborators, Config, MemoryStorage, Metrics, StaticAuth, StaticVcs, User,
};
use registry_api::Application;
use reqwest::header::HeaderMap;
use reqwest::{redirect, Client, Response};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

pub static TOKEN: Lazy<String> = Lazy::new(|| format!("ghp_{}", Uuid::new_v4().simple()));

pub const LOGIN: &str = "octocat";

pub struct TestApp {
    client: Client,
    address: String,
}

impl TestApp {
    /// Boots a real server on an ephemeral port, backed by in-memory
    /// collaborators: a fixture token table and a repository allowlist.
    pub async fn spawn(repos: &[&str]) -> Self {
        let configuration = Config::from(HashMap::from([
            ("HOST", "localhost"),
            ("PORT", "0"),
            ("ENVIRONMENT", "test"),
        ]));

        let mut vcs = StaticVcs::new();
        for repo in repos {
            vcs = vcs.with_repo(repo);
        }

        let collaborators = Collaborators::new(
            Arc::new(MemoryStorage::new()),
            Arc::new(StaticAuth::new().with_user(&TOKEN, User::new(LOGIN))),
            Arc::new(vcs),
            Metrics::disabled(),
        );
        let state = AppState::with_collaborators(configuration.clone(), collaborators);

        let application = Application::start_with(&configuration, state)
            .await
            .expect("Failed to start app");
        let address = format!("http://localhost:{}", application.port());
        tokio::spawn(application.spawn());

        // Redirects stay visible to the assertions.
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .build()
            .expect("Failed to build client");

        Self { client, address }
    }

    pub async fn get<T: Into<String>>(&self, path: T) -> Response {
        self.client
            .get(format!("{}/api/{}", self.address, path.into()))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post<T: Into<String>>(
        &self,
        path: T,
        body: Value,
        token: Option<&str>,
    ) -> Response {
        self.client
            .post(format!("{}/api/{}", self.address, path.into()))
            .headers(Self::auth_headers(token))
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn delete<T: Into<String>>(&self, path: T, token: Option<&str>) -> Response {
        self.client
            .delete(format!("{}/api/{}", self.address, path.into()))
            .headers(Self::auth_headers(token))
            .send()
            .await
            .expect("Failed to execute request")
    }

    fn auth_headers(token: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(token) = token {
            headers.insert(
                "Authorization",
                format!("Bearer {}", token)
                    .parse()
                    .expect("Failed to build auth header"),
            );
        }
        headers
    }
}
