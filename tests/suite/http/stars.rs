use crate::harness::{TestApp, LOGIN, TOKEN};
use serde_json::{json, Value};

#[actix_web::test]
async fn star_and_unstar_are_idempotent() {
    let application = TestApp::spawn(&["octocat/hello"]).await;
    application
        .post("packages", json!({"repository": "octocat/hello"}), Some(&TOKEN))
        .await;

    let response = application
        .post("packages/hello/star", json!({}), Some(&TOKEN))
        .await;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.expect("Failed to read body");
    assert_eq!(body["stargazersCount"], 1);

    // Starring twice does not error and does not double count.
    let response = application
        .post("packages/hello/star", json!({}), Some(&TOKEN))
        .await;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.expect("Failed to read body");
    assert_eq!(body["stargazersCount"], 1);

    let response = application
        .delete("packages/hello/star", Some(&TOKEN))
        .await;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.expect("Failed to read body");
    assert_eq!(body["stargazersCount"], 0);

    // Unstarring a package that was never starred is still a success.
    let response = application
        .delete("packages/hello/star", Some(&TOKEN))
        .await;
    assert_eq!(response.status().as_u16(), 200);
}

#[actix_web::test]
async fn star_without_a_token_is_unauthorized() {
    let application = TestApp::spawn(&["octocat/hello"]).await;
    application
        .post("packages", json!({"repository": "octocat/hello"}), Some(&TOKEN))
        .await;

    let response = application
        .post("packages/hello/star", json!({}), None)
        .await;

    assert_eq!(response.status().as_u16(), 401);
}

#[actix_web::test]
async fn starred_packages_show_up_under_the_user() {
    let application = TestApp::spawn(&["octocat/hello", "octocat/linter"]).await;
    for repo in ["octocat/hello", "octocat/linter"] {
        application
            .post("packages", json!({ "repository": repo }), Some(&TOKEN))
            .await;
    }
    application
        .post("packages/hello/star", json!({}), Some(&TOKEN))
        .await;

    let response = application.get(format!("users/{}/stars", LOGIN)).await;
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.expect("Failed to read body");
    let starred = body.as_array().cloned().unwrap_or_default();
    assert_eq!(starred.len(), 1);
    assert_eq!(starred[0]["name"], "hello");
}
