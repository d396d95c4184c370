use crate::harness::{TestApp, TOKEN};
use serde_json::{json, Value};

#[actix_web::test]
async fn publish_fetch_and_search_round_trip() {
    let application = TestApp::spawn(&["octocat/hello", "octocat/linter"]).await;

    let response = application
        .post("packages", json!({"repository": "octocat/hello"}), Some(&TOKEN))
        .await;
    assert_eq!(response.status().as_u16(), 201);

    let response = application
        .post("packages", json!({"repository": "octocat/linter"}), Some(&TOKEN))
        .await;
    assert_eq!(response.status().as_u16(), 201);

    let response = application.get("packages/hello").await;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.expect("Failed to read body");
    assert_eq!(body["name"], "hello");
    assert_eq!(body["owner"], "octocat");

    let response = application.get("packages/search?q=linter").await;
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response
            .headers()
            .get("Query-Total")
            .and_then(|v| v.to_str().ok()),
        Some("1")
    );
    assert_eq!(
        response
            .headers()
            .get("Query-Limit")
            .and_then(|v| v.to_str().ok()),
        Some("30")
    );
    let link = response
        .headers()
        .get("Link")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(link.contains("rel=\"self\""));
    let body: Value = response.json().await.expect("Failed to read body");
    assert_eq!(body[0]["name"], "linter");
}

#[actix_web::test]
async fn publish_without_a_token_is_unauthorized() {
    let application = TestApp::spawn(&["octocat/hello"]).await;

    let response = application
        .post("packages", json!({"repository": "octocat/hello"}), None)
        .await;

    assert_eq!(response.status().as_u16(), 401);
    let body: Value = response.json().await.expect("Failed to read body");
    assert_eq!(body["message"], "Unauthorized");
}

#[actix_web::test]
async fn publish_of_an_inaccessible_repo_is_rejected() {
    let application = TestApp::spawn(&["octocat/hello"]).await;

    let response = application
        .post("packages", json!({"repository": "octocat/ghost"}), Some(&TOKEN))
        .await;

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.expect("Failed to read body");
    assert_eq!(body["message"], "That repo does not exist, or is inaccessible");
}

#[actix_web::test]
async fn duplicate_publish_conflicts() {
    let application = TestApp::spawn(&["octocat/hello"]).await;
    application
        .post("packages", json!({"repository": "octocat/hello"}), Some(&TOKEN))
        .await;

    let response = application
        .post("packages", json!({"repository": "octocat/hello"}), Some(&TOKEN))
        .await;

    assert_eq!(response.status().as_u16(), 409);
    let body: Value = response.json().await.expect("Failed to read body");
    assert_eq!(body["message"], "A Package by that name already exists");
}

#[actix_web::test]
async fn missing_package_is_not_found() {
    let application = TestApp::spawn(&[]).await;

    let response = application.get("packages/ghost").await;

    assert_eq!(response.status().as_u16(), 404);
    let body: Value = response.json().await.expect("Failed to read body");
    assert_eq!(body["message"], "Not Found");
}

#[actix_web::test]
async fn version_publish_download_and_delete() {
    let application = TestApp::spawn(&["octocat/hello"]).await;
    application
        .post("packages", json!({"repository": "octocat/hello"}), Some(&TOKEN))
        .await;

    let response = application
        .post(
            "packages/hello/versions",
            json!({"version": "1.2.3", "tarballUrl": "https://example.com/hello-1.2.3.tgz"}),
            Some(&TOKEN),
        )
        .await;
    assert_eq!(response.status().as_u16(), 201);

    let response = application
        .post(
            "packages/hello/versions",
            json!({"version": "not-semver"}),
            Some(&TOKEN),
        )
        .await;
    assert_eq!(response.status().as_u16(), 400);

    let response = application.get("packages/hello/versions/1.2.3").await;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.expect("Failed to read body");
    assert_eq!(body["tarballUrl"], "https://example.com/hello-1.2.3.tgz");

    let response = application
        .get("packages/hello/versions/1.2.3/tarball")
        .await;
    assert_eq!(response.status().as_u16(), 302);
    assert_eq!(
        response
            .headers()
            .get("Location")
            .and_then(|v| v.to_str().ok()),
        Some("https://example.com/hello-1.2.3.tgz")
    );

    let response = application
        .delete("packages/hello/versions/1.2.3", Some(&TOKEN))
        .await;
    assert_eq!(response.status().as_u16(), 204);
    let body = response.text().await.expect("Failed to read body");
    assert!(body.is_empty());
}

#[actix_web::test]
async fn unpublish_is_idempotent() {
    let application = TestApp::spawn(&["octocat/hello"]).await;
    application
        .post("packages", json!({"repository": "octocat/hello"}), Some(&TOKEN))
        .await;

    let response = application.delete("packages/hello", Some(&TOKEN)).await;
    assert_eq!(response.status().as_u16(), 204);

    // Deleting again still succeeds; the end state already holds.
    let response = application.delete("packages/hello", Some(&TOKEN)).await;
    assert_eq!(response.status().as_u16(), 204);

    let response = application.get("packages/hello").await;
    assert_eq!(response.status().as_u16(), 404);
}
