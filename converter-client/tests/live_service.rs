//! Integration tests against a local stub of the live rate service.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use converter_client::{CurrencyLayerClient, CurrencyLayerConfig};
use converter_types::{CatalogSource, CurrencyCode, RateError, RateSource};

type Seen = Arc<Mutex<Vec<HashMap<String, String>>>>;

async fn live(
    State(seen): State<Seen>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    seen.lock().unwrap().push(params.clone());

    if params.get("access_key").map(String::as_str) != Some("good-key") {
        return Json(serde_json::json!({
            "success": false,
            "error": {"code": 101, "info": "You have not supplied a valid API Access Key."}
        }));
    }

    Json(serde_json::json!({
        "success": true,
        "source": "USD",
        "quotes": {"USDUSD": 1.0, "USDEUR": 0.9, "USDGBP": 0.8}
    }))
}

async fn list() -> impl IntoResponse {
    Json(serde_json::json!({
        "success": true,
        "currencies": {"EUR": "Euro", "GBP": "British Pound Sterling"}
    }))
}

async fn spawn_stub() -> (String, Seen) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/live", get(live))
        .route("/list", get(list))
        .route(
            "/broken/live",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }),
        )
        .with_state(seen.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), seen)
}

fn client(base_url: &str, key: &str) -> CurrencyLayerClient {
    CurrencyLayerClient::new(CurrencyLayerConfig::new(key).with_base_url(base_url))
}

fn code(s: &str) -> CurrencyCode {
    s.parse().unwrap()
}

#[tokio::test]
async fn test_fetch_live_rates() {
    let (url, seen) = spawn_stub().await;
    let targets = BTreeSet::from([code("EUR"), code("GBP")]);

    let table = client(&url, "good-key")
        .fetch(&code("USD"), &targets)
        .await
        .unwrap();

    assert_eq!(table.rate(&code("EUR")), Some(0.9));
    assert_eq!(table.rate(&code("GBP")), Some(0.8));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0]["currencies"], "EUR,GBP");
    assert_eq!(seen[0]["source"], "USD");
    assert_eq!(seen[0]["format"], "1");
}

#[tokio::test]
async fn test_fetch_surfaces_api_error() {
    let (url, seen) = spawn_stub().await;

    let err = client(&url, "bad-key")
        .fetch(&code("USD"), &BTreeSet::new())
        .await
        .unwrap_err();

    assert!(
        matches!(err, RateError::Api(msg) if msg == "You have not supplied a valid API Access Key.")
    );
    assert!(!seen.lock().unwrap()[0].contains_key("currencies"));
}

#[tokio::test]
async fn test_fetch_http_failure() {
    let (url, _) = spawn_stub().await;

    let err = client(&format!("{}/broken", url), "good-key")
        .fetch(&code("USD"), &BTreeSet::new())
        .await
        .unwrap_err();

    assert!(matches!(err, RateError::Api(msg) if msg.contains("503")));
}

#[tokio::test]
async fn test_fetch_network_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{}", addr), "good-key")
        .fetch(&code("USD"), &BTreeSet::new())
        .await
        .unwrap_err();

    assert!(matches!(err, RateError::Network(_)));
}

#[tokio::test]
async fn test_list_currencies() {
    let (url, _) = spawn_stub().await;

    let catalog = client(&url, "good-key").list_currencies().await.unwrap();

    let codes: Vec<String> = catalog.codes().into_iter().map(String::from).collect();
    assert_eq!(codes, vec!["EUR", "GBP", "USD"]);
}
