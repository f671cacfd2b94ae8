use axum::Json;
use rand::Rng;
use rand::distr::Alphanumeric;
use serde::Serialize;

/// Demo order response; no payment or fulfillment exists yet
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    success: bool,
    message: &'static str,
    #[serde(rename = "orderId")]
    order_id: String,
    details: &'static str,
    status: &'static str,
}

/// Order stub handler
///
/// Accepts any body and acknowledges it with a generated demo order ID.
pub async fn process_order_handler() -> Json<OrderResponse> {
    let order_id = generate_order_id();

    tracing::info!(%order_id, "demo order accepted");

    Json(OrderResponse {
        success: true,
        message: "Coming soon!",
        order_id,
        details: "Payment processing and print-on-demand fulfillment will be available soon. \
                  Your meme design has been saved!",
        status: "demo_mode",
    })
}

fn generate_order_id() -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(char::from)
        .collect();
    format!("MEME_{}", suffix.to_uppercase())
}
