use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Package names mirror the rules enforced at publication time by the
/// registry: lowercase, url-safe, bounded length.
pub const MAX_PACKAGE_NAME_LENGTH: usize = 214;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub name: String,
    /// `owner/name` slug of the backing repository.
    pub repository: String,
    /// Login of the publishing user.
    pub owner: String,
    pub created_at: DateTime<Utc>,
    pub downloads: u64,
    pub stargazers_count: u64,
}

impl Package {
    pub fn new(name: &str, repository: &str, owner: &str) -> Self {
        Self {
            name: name.to_string(),
            repository: repository.to_string(),
            owner: owner.to_string(),
            created_at: Utc::now(),
            downloads: 0,
            stargazers_count: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PackageVersion {
    pub version: String,
    pub tarball_url: String,
    pub published_at: DateTime<Utc>,
}

impl PackageVersion {
    pub fn new(version: &str, tarball_url: &str) -> Self {
        Self {
            version: version.to_string(),
            tarball_url: tarball_url.to_string(),
            published_at: Utc::now(),
        }
    }
}

pub fn valid_package_name(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_PACKAGE_NAME_LENGTH {
        return false;
    }

    if name.starts_with('.') || name.starts_with('_') || name.starts_with('-') {
        return false;
    }

    name.chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '.'))
}

/// Extracts the package name from an `owner/name` repository slug. Returns
/// `None` when the slug is not exactly two non-empty segments.
pub fn package_name_from_repository(repository: &str) -> Option<&str> {
    let mut segments = repository.split('/');

    match (segments.next(), segments.next(), segments.next()) {
        (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty() => Some(name),
        _ => None,
    }
}
