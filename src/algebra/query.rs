use crate::algebra::{resolve, Collaborators, Sequence};
use crate::domain::{ErrorKind, FollowUp, Outcome, PageInfo};
use serde_json::Value;
use tracing::warn;

/// Looks up a single package with its versions.
#[tracing::instrument(name = "Get package", skip(collaborators))]
pub async fn get_package(name: String, collaborators: &Collaborators) -> Outcome {
    let mut sequence = Sequence::new();

    let result = sequence
        .step("db.get_package", collaborators.storage().get_package(&name))
        .await;

    match result {
        Ok(package) => sequence.finish(Outcome::success(package)),
        Err(failure) => failure.with_short(ErrorKind::NotFound),
    }
}

/// Looks up one published version of a package.
#[tracing::instrument(name = "Get version", skip(collaborators))]
pub async fn get_version(name: String, version: String, collaborators: &Collaborators) -> Outcome {
    let mut sequence = Sequence::new();

    let result = sequence
        .step(
            "db.get_version",
            collaborators.storage().get_version(&name, &version),
        )
        .await;

    match result {
        Ok(found) => sequence.finish(Outcome::success(found)),
        Err(failure) => failure.with_short(ErrorKind::NotFound),
    }
}

/// Paginated listing/search. Page-cursor fields are attached to the outcome
/// so the paginated renderer can emit `Link`/`Query-Total`/`Query-Limit`
/// headers; page and limit arrive already normalized by the handler.
#[tracing::instrument(name = "Search packages", skip(collaborators))]
pub async fn search_packages(
    query: String,
    page: u64,
    limit: u64,
    collaborators: &Collaborators,
) -> Outcome {
    let mut sequence = Sequence::new();

    let result = sequence
        .step(
            "db.search",
            collaborators.storage().search(&query, page, limit),
        )
        .await;

    match result {
        Ok(found) => {
            let total = found["total"].as_u64().unwrap_or(0);
            let rows = found
                .get("data")
                .cloned()
                .unwrap_or_else(|| Value::Array(vec![]));

            sequence
                .finish(Outcome::success(rows))
                .with_page(PageInfo { page, limit, total })
        }
        Err(failure) => failure.with_short(ErrorKind::ServerError),
    }
}

/// Resolves the tarball target for a version. The success content is the
/// redirect location; the download-count increment is deferred to run after
/// the response, so a slow or failed write never delays the redirect.
#[tracing::instrument(name = "Download version", skip(collaborators))]
pub async fn download(
    name: String,
    version: String,
    collaborators: &Collaborators,
) -> (Outcome, Option<FollowUp>) {
    let mut sequence = Sequence::new();
    let outcome = resolve(download_inner(&mut sequence, &name, &version, collaborators).await);

    if !outcome.ok() {
        return (outcome, None);
    }

    let storage = collaborators.storage().clone();
    let metrics = collaborators.metrics().clone();
    let follow_up: FollowUp = Box::pin(async move {
        let recorded = storage.record_download(&name, &version).await;
        if recorded.ok() {
            metrics.add_downloads(1);
        } else {
            warn!(
                package = %name,
                version = %version,
                content = %recorded.content(),
                "Failed to record download"
            );
        }
    });

    (outcome, Some(follow_up))
}

async fn download_inner(
    sequence: &mut Sequence,
    name: &str,
    version: &str,
    collaborators: &Collaborators,
) -> Result<Outcome, Box<Outcome>> {
    let found = sequence
        .step(
            "db.get_version",
            collaborators.storage().get_version(name, version),
        )
        .await
        .map_err(|failure| Box::new(failure.with_short(ErrorKind::NotFound)))?;

    let Some(tarball) = found["tarballUrl"].as_str() else {
        let failure = Outcome::failure()
            .with_short(ErrorKind::ServerError)
            .with_message("version record has no tarball target")
            .with_trace(sequence.trace().clone());
        return Err(Box::new(failure));
    };

    Ok(Outcome::success(Value::String(tarball.to_string()))
        .with_trace(sequence.trace().clone()))
}
