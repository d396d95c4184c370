use serde::{Deserialize, Serialize};

/// Authenticated registry user, as resolved by the auth collaborator from a
/// bearer token. Mirrors the fields the GitHub user endpoint returns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub login: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl User {
    pub fn new(login: &str) -> Self {
        Self {
            login: login.to_string(),
            avatar_url: None,
        }
    }
}
