use crate::algebra::{resolve, Collaborators, Sequence};
use crate::domain::{ErrorKind, Outcome};
use serde_json::Value;

fn login_of(user: &Value) -> String {
    user["login"].as_str().unwrap_or_default().to_string()
}

/// Stars a package for the authenticated user. Starring a package that is
/// already starred returns success: the end state matches the request.
#[tracing::instrument(name = "Star package", skip(token, collaborators))]
pub async fn star_package(
    token: Option<String>,
    name: String,
    collaborators: &Collaborators,
) -> Outcome {
    let mut sequence = Sequence::new();
    let outcome = resolve(star_inner(&mut sequence, &token, &name, collaborators).await);

    if outcome.ok() {
        collaborators.metrics().add_starred(1);
    }

    outcome
}

async fn star_inner(
    sequence: &mut Sequence,
    token: &Option<String>,
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

    let starred = sequence
        .step(
            "db.star",
            collaborators.storage().star(name, &login_of(&user)),
        )
        .await
        .map_err(|failure| Box::new(failure.with_short(ErrorKind::NotFound)))?;

    Ok(Outcome::success(starred).with_trace(sequence.trace().clone()))
}

/// Removes the authenticated user's star. Unstarring a package that was
/// never starred is also a success.
#[tracing::instrument(name = "Unstar package", skip(token, collaborators))]
pub async fn unstar_package(
    token: Option<String>,
    name: String,
    collaborators: &Collaborators,
) -> Outcome {
    let mut sequence = Sequence::new();
    resolve(unstar_inner(&mut sequence, &token, &name, collaborators).await)
}

async fn unstar_inner(
    sequence: &mut Sequence,
    token: &Option<String>,
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

    let unstarred = sequence
        .step(
            "db.unstar",
            collaborators.storage().unstar(name, &login_of(&user)),
        )
        .await
        .map_err(|failure| Box::new(failure.with_short(ErrorKind::NotFound)))?;

    Ok(Outcome::success(unstarred).with_trace(sequence.trace().clone()))
}

/// Lists the packages a user has starred. Public, no authentication.
#[tracing::instrument(name = "List user stars", skip(collaborators))]
pub async fn list_user_stars(login: String, collaborators: &Collaborators) -> Outcome {
    let mut sequence = Sequence::new();

    let result = sequence
        .step(
            "db.stars_for_user",
            collaborators.storage().stars_for_user(&login),
        )
        .await;

    match result {
        Ok(starred) => sequence.finish(Outcome::success(starred)),
        Err(failure) => failure.with_short(ErrorKind::ServerError),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra::{
        publish_package, MemoryStorage, Metrics, StaticAuth, StaticVcs, StorageExt,
    };
    use crate::domain::User;
    use serde_json::json;
    use std::sync::Arc;

    fn collaborators() -> Collaborators {
        Collaborators::new(
            Arc::new(MemoryStorage::new()),
            Arc::new(StaticAuth::new().with_user("good-token", User::new("octocat"))),
            Arc::new(StaticVcs::new().with_repo("octocat/hello")),
            Metrics::disabled(),
        )
    }

    async fn with_package(collaborators: &Collaborators) {
        let (outcome, _) = publish_package(
            Some("good-token".into()),
            "octocat/hello".into(),
            collaborators,
        )
        .await;
        assert!(outcome.ok());
    }

    #[tokio::test]
    async fn failing_auth_propagates_unauthorized_with_one_trace_entry() {
        let collaborators = collaborators();

        let outcome = star_package(Some("bad-token".into()), "hello".into(), &collaborators).await;

        assert!(!outcome.ok());
        // The collaborator's own classification survives, not an overwrite.
        assert_eq!(outcome.short(), Some(ErrorKind::Unauthorized));
        assert_eq!(outcome.trace().names(), vec!["init", "auth.authenticate"]);
    }

    #[tokio::test]
    async fn starring_twice_is_idempotent() {
        let collaborators = collaborators();
        with_package(&collaborators).await;

        let first = star_package(Some("good-token".into()), "hello".into(), &collaborators).await;
        let second = star_package(Some("good-token".into()), "hello".into(), &collaborators).await;

        assert!(first.ok());
        assert!(second.ok());
        assert_eq!(second.content()["stargazersCount"], json!(1));
    }

    #[tokio::test]
    async fn unstarring_a_never_starred_package_is_a_success() {
        let collaborators = collaborators();
        with_package(&collaborators).await;

        let outcome =
            unstar_package(Some("good-token".into()), "hello".into(), &collaborators).await;

        assert!(outcome.ok());
        assert_eq!(outcome.content()["stargazersCount"], json!(0));
    }

    #[tokio::test]
    async fn starring_a_missing_package_is_not_found() {
        let collaborators = collaborators();

        let outcome = star_package(Some("good-token".into()), "ghost".into(), &collaborators).await;

        assert_eq!(outcome.short(), Some(ErrorKind::NotFound));
        assert_eq!(
            outcome.trace().names(),
            vec!["init", "auth.authenticate", "db.star"]
        );
    }

    #[tokio::test]
    async fn listing_stars_reflects_storage() {
        let collaborators = collaborators();
        with_package(&collaborators).await;
        collaborators.storage().star("hello", "octocat").await;

        let outcome = list_user_stars("octocat".into(), &collaborators).await;

        assert!(outcome.ok());
        let rows = outcome.content().as_array().cloned().unwrap_or_default();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], json!("hello"));
    }
}
