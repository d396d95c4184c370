use crate::harness::TestApp;
use serde_json::Value;

#[actix_web::test]
async fn health_check_works() {
    // Arrange
    let application = TestApp::spawn(&[]).await;
    // Act
    let response = application.get("health_check").await;
    // Assert
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to read body");
    assert_eq!(body["message"], "I'm alive!");
}
