use crate::algebra::{resolve, Collaborators, Sequence};
use crate::domain::{
    package_name_from_repository, valid_package_name, ErrorKind, FollowUp, Outcome, Package,
    PackageVersion,
};
use semver::Version;
use serde_json::{json, Value};
use tracing::{info, warn};

fn login_of(user: &Value) -> String {
    user["login"].as_str().unwrap_or_default().to_string()
}

/// Registers a new package from a repository slug. Cheap syntax checks run
/// before any collaborator is touched; then authentication, repository
/// accessibility and the store write happen strictly in that order. On
/// success a deferred feature-detection hook is handed back to run after the
/// response has been sent.
#[tracing::instrument(name = "Publish package", skip(token, collaborators))]
pub async fn publish_package(
    token: Option<String>,
    repository: String,
    collaborators: &Collaborators,
) -> (Outcome, Option<FollowUp>) {
    let Some(name) = package_name_from_repository(&repository).map(str::to_string) else {
        let outcome = Outcome::failure()
            .with_short(ErrorKind::BadRepo)
            .with_message("repository must be in owner/name form");
        return (outcome, None);
    };

    if !valid_package_name(&name) {
        let outcome = Outcome::failure()
            .with_short(ErrorKind::BadPackageName)
            .with_content(json!(name));
        return (outcome, None);
    }

    let mut sequence = Sequence::new();
    let outcome = resolve(
        publish_package_inner(&mut sequence, &token, &repository, &name, collaborators).await,
    );

    if !outcome.ok() {
        return (outcome, None);
    }

    collaborators.metrics().add_published(1);

    // Feature detection and the webhook ping are non-critical; they must
    // never block or alter the response, so they run after rendering and
    // only ever log.
    let vcs = collaborators.vcs().clone();
    let token = token.unwrap_or_default();
    let follow_up: FollowUp = Box::pin(async move {
        match vcs.features(&repository, &token).await {
            features if features.ok() => {
                info!(repository = %repository, "Feature detection completed");
            }
            features => {
                warn!(
                    repository = %repository,
                    content = %features.content(),
                    "Feature detection failed"
                );
            }
        }

        let ping = vcs.ping_webhook(&repository, &token).await;
        if ping.ok() {
            info!(repository = %repository, "Webhook ping delivered");
        } else {
            warn!(
                repository = %repository,
                content = %ping.content(),
                "Webhook ping failed"
            );
        }
    });

    (outcome, Some(follow_up))
}

async fn publish_package_inner(
    sequence: &mut Sequence,
    token: &Option<String>,
    repository: &str,
    name: &str,
    collaborators: &Collaborators,
) -> Result<Outcome, Box<Outcome>> {
    let user = sequence
        .step(
            "auth.authenticate",
            collaborators.auth().authenticate(token.as_deref()),
        )
        .await
        .map_err(|failure| Box::new(failure.with_short(ErrorKind::Unauthorized)))?;

    sequence
        .step(
            "vcs.repo_accessible",
            collaborators
                .vcs()
                .repo_accessible(repository, token.as_deref().unwrap_or_default()),
        )
        .await
        .map_err(|failure| Box::new(failure.with_short(ErrorKind::BadRepo)))?;

    let package = Package::new(name, repository, &login_of(&user));
    let created = sequence
        .step(
            "db.create_package",
            collaborators.storage().create_package(&package),
        )
        .await
        .map_err(|failure| Box::new(failure.with_short(ErrorKind::ServerError)))?;

    Ok(Outcome::success_with_status(created, 201).with_trace(sequence.trace().clone()))
}

/// Publishes one version of an existing package. The version string is
/// validated before anything remote is called; only the package owner may
/// publish.
#[tracing::instrument(name = "Publish version", skip(token, collaborators))]
pub async fn publish_version(
    token: Option<String>,
    name: String,
    version: String,
    tarball_url: Option<String>,
    collaborators: &Collaborators,
) -> Outcome {
    if Version::parse(&version).is_err() {
        return Outcome::failure()
            .with_short(ErrorKind::BadVersion)
            .with_content(json!(version));
    }

    let mut sequence = Sequence::new();
    resolve(
        publish_version_inner(
            &mut sequence,
            &token,
            &name,
            &version,
            tarball_url,
            collaborators,
        )
        .await,
    )
}

async fn publish_version_inner(
    sequence: &mut Sequence,
    token: &Option<String>,
    name: &str,
    version: &str,
    tarball_url: Option<String>,
    collaborators: &Collaborators,
) -> Result<Outcome, Box<Outcome>> {
    let user = sequence
        .step(
            "auth.authenticate",
            collaborators.auth().authenticate(token.as_deref()),
        )
        .await
        .map_err(|failure| Box::new(failure.with_short(ErrorKind::Unauthorized)))?;

    let package = sequence
        .step("db.get_package", collaborators.storage().get_package(name))
        .await
        .map_err(|failure| Box::new(failure.with_short(ErrorKind::NotFound)))?;

    if package["owner"] != json!(login_of(&user)) {
        let failure = Outcome::failure()
            .with_short(ErrorKind::Unauthorized)
            .with_message("only the package owner may publish versions")
            .with_trace(sequence.trace().clone());
        return Err(Box::new(failure));
    }

    let tarball = tarball_url
        .unwrap_or_else(|| format!("https://codeload.test/{}/tar.gz/{}", name, version));
    let record = PackageVersion::new(version, &tarball);
    let added = sequence
        .step(
            "db.add_version",
            collaborators.storage().add_version(name, &record),
        )
        .await
        .map_err(|failure| Box::new(failure.with_short(ErrorKind::ServerError)))?;

    collaborators.metrics().add_published(1);

    Ok(Outcome::success_with_status(added, 201).with_trace(sequence.trace().clone()))
}

/// Removes a package. Deleting a package that is already gone is a success;
/// clients retrying a delete must not see an error for reaching the state
/// they asked for.
#[tracing::instrument(name = "Unpublish package", skip(token, collaborators))]
pub async fn unpublish_package(
    token: Option<String>,
    name: String,
    collaborators: &Collaborators,
) -> Outcome {
    let mut sequence = Sequence::new();
    resolve(unpublish_package_inner(&mut sequence, &token, &name, collaborators).await)
}

async fn unpublish_package_inner(
    sequence: &mut Sequence,
    token: &Option<String>,
    name: &str,
    collaborators: &Collaborators,
) -> Result<Outcome, Box<Outcome>> {
    sequence
        .step(
            "auth.authenticate",
            collaborators.auth().authenticate(token.as_deref()),
        )
        .await
        .map_err(|failure| Box::new(failure.with_short(ErrorKind::Unauthorized)))?;

    match sequence
        .step(
            "db.delete_package",
            collaborators.storage().delete_package(name),
        )
        .await
    {
        Ok(_) => {}
        // Already gone: the requested end state holds.
        Err(failure) if failure.short() == Some(ErrorKind::NotFound) => {}
        Err(failure) => return Err(failure),
    }

    Ok(Outcome::success_with_status(Value::Bool(false), 204).with_trace(sequence.trace().clone()))
}

/// Removes one version, with the same idempotence policy as
/// [`unpublish_package`].
#[tracing::instrument(name = "Unpublish version", skip(token, collaborators))]
pub async fn unpublish_version(
    token: Option<String>,
    name: String,
    version: String,
    collaborators: &Collaborators,
) -> Outcome {
    let mut sequence = Sequence::new();
    resolve(unpublish_version_inner(&mut sequence, &token, &name, &version, collaborators).await)
}

async fn unpublish_version_inner(
    sequence: &mut Sequence,
    token: &Option<String>,
    name: &str,
    version: &str,
    collaborators: &Collaborators,
) -> Result<Outcome, Box<Outcome>> {
    sequence
        .step(
            "auth.authenticate",
            collaborators.auth().authenticate(token.as_deref()),
        )
        .await
        .map_err(|failure| Box::new(failure.with_short(ErrorKind::Unauthorized)))?;

    match sequence
        .step(
            "db.delete_version",
            collaborators.storage().delete_version(name, version),
        )
        .await
    {
        Ok(_) => {}
        Err(failure) if failure.short() == Some(ErrorKind::NotFound) => {}
        Err(failure) => return Err(failure),
    }

    Ok(Outcome::success_with_status(Value::Bool(false), 204).with_trace(sequence.trace().clone()))
}
