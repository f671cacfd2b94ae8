mod harness;

use harness::config::ConfigBuilder;
use harness::server::TestServer;

async fn server() -> TestServer {
    TestServer::start(ConfigBuilder::new().build()).await.unwrap()
}

fn submission(name: &str, message: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "email": "visitor@example.com",
        "message": message,
    })
}

#[tokio::test]
async fn unconfigured_transport_accepts_in_demo_mode() {
    let server = server().await;

    let resp = server
        .post_json("/contact", &submission("Ada", "I would like ten shirts"))
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert!(body["message"].as_str().unwrap().contains("Demo mode"));
}

#[tokio::test]
async fn name_length_boundaries() {
    let server = server().await;
    let message = "I would like ten shirts";

    let resp = server.post_json("/contact", &submission("A", message)).await.unwrap();
    assert_eq!(resp.status(), 400);

    let resp = server.post_json("/contact", &submission("Al", message)).await.unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn message_length_boundaries() {
    let server = server().await;

    let resp = server
        .post_json("/contact", &submission("Ada", &"m".repeat(9)))
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let resp = server
        .post_json("/contact", &submission("Ada", &"m".repeat(1000)))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = server
        .post_json("/contact", &submission("Ada", &"m".repeat(1001)))
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("between 10 and 1000")
    );
}

#[tokio::test]
async fn invalid_email_is_rejected() {
    let server = server().await;

    let resp = server
        .post_json(
            "/contact",
            &serde_json::json!({
                "name": "Ada",
                "email": "not-an-email",
                "message": "I would like ten shirts",
            }),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("valid email"));
}

#[tokio::test]
async fn missing_fields_are_rejected() {
    let server = server().await;

    let resp = server
        .post_json("/contact", &serde_json::json!({ "name": "Ada" }))
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "All fields are required");
}
