use crate::domain::{ErrorKind, Outcome, Package, PackageVersion};
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::{json, Value};
use std::collections::BTreeSet;
use tokio::sync::RwLock;
use tracing::warn;

/// Load-bearing contract between procedures and the data store. Every
/// operation returns an [`Outcome`]; the engine behind it (and its query
/// language) is deliberately out of the procedures' sight.
#[async_trait]
pub trait StorageExt: Send + Sync {
    async fn get_package(&self, name: &str) -> Outcome;
    async fn search(&self, query: &str, page: u64, limit: u64) -> Outcome;
    async fn create_package(&self, package: &Package) -> Outcome;
    async fn add_version(&self, name: &str, version: &PackageVersion) -> Outcome;
    async fn get_version(&self, name: &str, version: &str) -> Outcome;
    async fn delete_package(&self, name: &str) -> Outcome;
    async fn delete_version(&self, name: &str, version: &str) -> Outcome;
    async fn star(&self, name: &str, login: &str) -> Outcome;
    async fn unstar(&self, name: &str, login: &str) -> Outcome;
    async fn stars_for_user(&self, login: &str) -> Outcome;
    async fn record_download(&self, name: &str, version: &str) -> Outcome;
}

#[derive(Debug, Clone)]
struct PackageRecord {
    package: Package,
    versions: IndexMap<String, PackageVersion>,
    stargazers: BTreeSet<String>,
}

impl PackageRecord {
    fn to_value(&self) -> Value {
        let mut value = match serde_json::to_value(&self.package) {
            Ok(value) => value,
            Err(error) => {
                warn!("Failed to serialize package record: {}", error);
                json!({})
            }
        };

        value["versions"] = json!(self.versions.values().collect::<Vec<_>>());
        value
    }
}

/// Insertion-ordered in-memory store. Packages live behind one async lock;
/// each operation takes the lock once and returns a fresh outcome, so no
/// state leaks between requests.
pub struct MemoryStorage {
    inner: RwLock<IndexMap<String, PackageRecord>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(IndexMap::new()),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found(name: &str) -> Outcome {
    Outcome::failure()
        .with_short(ErrorKind::NotFound)
        .with_content(json!(format!("Package {} not found", name)))
}

#[async_trait]
impl StorageExt for MemoryStorage {
    async fn get_package(&self, name: &str) -> Outcome {
        let packages = self.inner.read().await;

        match packages.get(name) {
            Some(record) => Outcome::success(record.to_value()),
            None => not_found(name),
        }
    }

    async fn search(&self, query: &str, page: u64, limit: u64) -> Outcome {
        let packages = self.inner.read().await;
        let needle = query.to_lowercase();

        let matches: Vec<&PackageRecord> = packages
            .values()
            .filter(|record| needle.is_empty() || record.package.name.contains(&needle))
            .collect();

        let total = matches.len() as u64;
        let offset = page.saturating_sub(1).saturating_mul(limit) as usize;
        let rows: Vec<Value> = matches
            .into_iter()
            .skip(offset)
            .take(limit as usize)
            .map(|record| record.to_value())
            .collect();

        Outcome::success(json!({
            "data": rows,
            "total": total,
        }))
    }

    async fn create_package(&self, package: &Package) -> Outcome {
        let mut packages = self.inner.write().await;

        if packages.contains_key(&package.name) {
            return Outcome::failure()
                .with_short(ErrorKind::PackageExists)
                .with_content(json!(format!("Package {} already exists", package.name)));
        }

        let record = PackageRecord {
            package: package.clone(),
            versions: IndexMap::new(),
            stargazers: BTreeSet::new(),
        };
        let value = record.to_value();
        packages.insert(package.name.clone(), record);

        Outcome::success(value)
    }

    async fn add_version(&self, name: &str, version: &PackageVersion) -> Outcome {
        let mut packages = self.inner.write().await;

        let Some(record) = packages.get_mut(name) else {
            return not_found(name);
        };

        if record.versions.contains_key(&version.version) {
            return Outcome::failure()
                .with_short(ErrorKind::BadVersion)
                .with_content(json!(format!(
                    "Version {} of {} already exists",
                    version.version, name
                )));
        }

        record
            .versions
            .insert(version.version.clone(), version.clone());

        Outcome::success_with_status(json!(version), 201)
    }

    async fn get_version(&self, name: &str, version: &str) -> Outcome {
        let packages = self.inner.read().await;

        let Some(record) = packages.get(name) else {
            return not_found(name);
        };

        match record.versions.get(version) {
            Some(found) => Outcome::success(json!(found)),
            None => Outcome::failure()
                .with_short(ErrorKind::NotFound)
                .with_content(json!(format!("Version {} of {} not found", version, name))),
        }
    }

    async fn delete_package(&self, name: &str) -> Outcome {
        let mut packages = self.inner.write().await;

        match packages.shift_remove(name) {
            Some(_) => Outcome::success(json!({"deleted": name})),
            None => not_found(name),
        }
    }

    async fn delete_version(&self, name: &str, version: &str) -> Outcome {
        let mut packages = self.inner.write().await;

        let Some(record) = packages.get_mut(name) else {
            return not_found(name);
        };

        match record.versions.shift_remove(version) {
            Some(_) => Outcome::success(json!({"deleted": version})),
            None => Outcome::failure()
                .with_short(ErrorKind::NotFound)
                .with_content(json!(format!("Version {} of {} not found", version, name))),
        }
    }

    async fn star(&self, name: &str, login: &str) -> Outcome {
        let mut packages = self.inner.write().await;

        let Some(record) = packages.get_mut(name) else {
            return not_found(name);
        };

        // Set insert is a no-op for an existing stargazer, which is exactly
        // the idempotence the domain asks for.
        record.stargazers.insert(login.to_string());
        record.package.stargazers_count = record.stargazers.len() as u64;

        Outcome::success(record.to_value())
    }

    async fn unstar(&self, name: &str, login: &str) -> Outcome {
        let mut packages = self.inner.write().await;

        let Some(record) = packages.get_mut(name) else {
            return not_found(name);
        };

        record.stargazers.remove(login);
        record.package.stargazers_count = record.stargazers.len() as u64;

        Outcome::success(record.to_value())
    }

    async fn stars_for_user(&self, login: &str) -> Outcome {
        let packages = self.inner.read().await;

        let starred: Vec<Value> = packages
            .values()
            .filter(|record| record.stargazers.contains(login))
            .map(|record| record.to_value())
            .collect();

        Outcome::success(json!(starred))
    }

    async fn record_download(&self, name: &str, version: &str) -> Outcome {
        let mut packages = self.inner.write().await;

        let Some(record) = packages.get_mut(name) else {
            return not_found(name);
        };

        if !record.versions.contains_key(version) {
            return Outcome::failure()
                .with_short(ErrorKind::NotFound)
                .with_content(json!(format!("Version {} of {} not found", version, name)));
        }

        record.package.downloads += 1;

        Outcome::success(json!({"downloads": record.package.downloads}))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorKind;

    fn package(name: &str) -> Package {
        Package::new(name, &format!("octocat/{}", name), "octocat")
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let storage = MemoryStorage::new();

        let created = storage.create_package(&package("hello")).await;
        assert!(created.ok());

        let fetched = storage.get_package("hello").await;
        assert!(fetched.ok());
        assert_eq!(fetched.content()["name"], json!("hello"));
        assert_eq!(fetched.content()["versions"], json!([]));
    }

    #[tokio::test]
    async fn duplicate_create_is_package_exists() {
        let storage = MemoryStorage::new();
        storage.create_package(&package("hello")).await;

        let duplicate = storage.create_package(&package("hello")).await;
        assert!(!duplicate.ok());
        assert_eq!(duplicate.short(), Some(ErrorKind::PackageExists));
    }

    #[tokio::test]
    async fn missing_package_is_not_found() {
        let storage = MemoryStorage::new();

        let outcome = storage.get_package("ghost").await;
        assert!(!outcome.ok());
        assert_eq!(outcome.short(), Some(ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn versions_are_added_and_fetched() {
        let storage = MemoryStorage::new();
        storage.create_package(&package("hello")).await;

        let added = storage
            .add_version("hello", &PackageVersion::new("1.0.0", "https://example.com/1.0.0.tgz"))
            .await;
        assert!(added.ok());
        assert_eq!(added.success_status(), 201);

        let fetched = storage.get_version("hello", "1.0.0").await;
        assert!(fetched.ok());
        assert_eq!(
            fetched.content()["tarballUrl"],
            json!("https://example.com/1.0.0.tgz")
        );

        let again = storage
            .add_version("hello", &PackageVersion::new("1.0.0", "https://example.com/dup.tgz"))
            .await;
        assert_eq!(again.short(), Some(ErrorKind::BadVersion));
    }

    #[tokio::test]
    async fn star_and_unstar_maintain_counts() {
        let storage = MemoryStorage::new();
        storage.create_package(&package("hello")).await;

        let starred = storage.star("hello", "octocat").await;
        assert_eq!(starred.content()["stargazersCount"], json!(1));

        // Starring twice stays at one.
        let starred = storage.star("hello", "octocat").await;
        assert_eq!(starred.content()["stargazersCount"], json!(1));

        let unstarred = storage.unstar("hello", "octocat").await;
        assert_eq!(unstarred.content()["stargazersCount"], json!(0));

        // Unstarring again is still a success.
        let unstarred = storage.unstar("hello", "octocat").await;
        assert!(unstarred.ok());
    }

    #[tokio::test]
    async fn search_paginates_and_counts() {
        let storage = MemoryStorage::new();
        for i in 0..5 {
            storage
                .create_package(&package(&format!("pkg-{}", i)))
                .await;
        }
        storage.create_package(&package("other")).await;

        let outcome = storage.search("pkg", 2, 2).await;
        assert!(outcome.ok());
        assert_eq!(outcome.content()["total"], json!(5));
        let rows = outcome.content()["data"].as_array().cloned().unwrap_or_default();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["name"], json!("pkg-2"));
    }

    #[tokio::test]
    async fn download_counts_accumulate() {
        let storage = MemoryStorage::new();
        storage.create_package(&package("hello")).await;
        storage
            .add_version("hello", &PackageVersion::new("1.0.0", "https://example.com/t.tgz"))
            .await;

        storage.record_download("hello", "1.0.0").await;
        let outcome = storage.record_download("hello", "1.0.0").await;
        assert_eq!(outcome.content()["downloads"], json!(2));

        let missing = storage.record_download("hello", "9.9.9").await;
        assert_eq!(missing.short(), Some(ErrorKind::NotFound));
    }

    #[tokio::test]
    async fn stars_for_user_lists_only_their_packages() {
        let storage = MemoryStorage::new();
        storage.create_package(&package("one")).await;
        storage.create_package(&package("two")).await;
        storage.star("one", "octocat").await;

        let outcome = storage.stars_for_user("octocat").await;
        let rows = outcome.content().as_array().cloned().unwrap_or_default();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], json!("one"));
    }
}
