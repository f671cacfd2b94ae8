mod harness;

use harness::config::ConfigBuilder;
use harness::server::TestServer;

async fn server() -> TestServer {
    TestServer::start(ConfigBuilder::new().build()).await.unwrap()
}

#[tokio::test]
async fn valid_color_round_trips_with_full_geometry() {
    let server = server().await;

    let resp = server
        .post_json(
            "/generate-tshirt-mockup",
            &serde_json::json!({
                "meme_url": "https://img.example/meme.png",
                "tshirt_color": "navy"
            }),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["tshirt_color"], "navy");
    assert_eq!(body["provider"], "template");
    assert_eq!(body["meme_overlay"], "https://img.example/meme.png");

    let position = &body["overlay_position"];
    for field in ["top", "left", "width", "height"] {
        assert!(position.get(field).is_some(), "missing geometry field {field}");
    }
    assert_eq!(position["transform"], "translate(-50%, -50%)");
}

#[tokio::test]
async fn unknown_color_degrades_to_the_placeholder() {
    let server = server().await;

    let resp = server
        .post_json(
            "/generate-tshirt-mockup",
            &serde_json::json!({
                "meme_url": "https://img.example/meme.png",
                "tshirt_color": "tartan"
            }),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["provider"], "placeholder");
    assert_eq!(body["tshirt_color"], "white");
}

#[tokio::test]
async fn missing_meme_url_is_rejected() {
    let server = server().await;

    let resp = server
        .post_json(
            "/generate-tshirt-mockup",
            &serde_json::json!({ "tshirt_color": "black" }),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("Meme URL"));
}
