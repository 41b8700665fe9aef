//! Wire-level tests for the Google Sheets store against a local stub server.

use axum::Router;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::IntoResponse;
use homehub_core::error::StoreError;
use homehub_core::sheet::SheetStore;
use homehub_tools::{GoogleSheetsStore, RefreshingToken, SheetsAuth};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct Seen {
    method: Method,
    uri: String,
    auth: String,
    body: String,
}

async fn stub(seen: Arc<Mutex<Vec<Seen>>>) -> String {
    let app = Router::new().fallback(
        move |method: Method, uri: Uri, headers: HeaderMap, body: String| {
            let seen = seen.clone();
            async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                let path = uri.path().to_string();
                seen.lock().unwrap().push(Seen {
                    method: method.clone(),
                    uri: uri.to_string(),
                    auth,
                    body,
                });

                if path.contains("Missing") {
                    return (
                        StatusCode::BAD_REQUEST,
                        r#"{"error":{"message":"Unable to parse range: 'Missing'"}}"#,
                    )
                        .into_response();
                }
                if method == Method::GET {
                    axum::Json(json!({
                        "range": "Chores!A1:D3",
                        "majorDimension": "ROWS",
                        "values": [
                            ["Task", "Frequency", "Last Done", "Next Due"],
                            ["Dishes", "daily"],
                            ["Mow lawn", "weekly", "2026-10-01", "2026-10-08"]
                        ]
                    }))
                    .into_response()
                } else {
                    axum::Json(json!({})).into_response()
                }
            }
        },
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn read_all_splits_header_row() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let base = stub(seen.clone()).await;
    let store = GoogleSheetsStore::new("sheet-1", "ya29.token").with_base_url(base);

    let sheet = store.read_all("Chores").await.unwrap();
    assert_eq!(sheet.headers.len(), 4);
    assert_eq!(sheet.rows.len(), 2);
    assert_eq!(sheet.cell(0, "Next Due"), Some(""));
    assert_eq!(sheet.cell(1, "last_done"), Some("2026-10-01"));

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].method, Method::GET);
    assert_eq!(seen[0].uri, "/v4/spreadsheets/sheet-1/values/'Chores'");
    assert_eq!(seen[0].auth, "Bearer ya29.token");
}

#[tokio::test]
async fn write_cell_puts_a1_range() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let base = stub(seen.clone()).await;
    let store = GoogleSheetsStore::new("sheet-1", "tok").with_base_url(base);

    store
        .write_cell("Weekly Meal Plan", 4, 5, "Tacos")
        .await
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].method, Method::PUT);
    assert_eq!(
        seen[0].uri,
        "/v4/spreadsheets/sheet-1/values/'Weekly%20Meal%20Plan'!E4?valueInputOption=USER_ENTERED"
    );
    let body: Value = serde_json::from_str(&seen[0].body).unwrap();
    assert_eq!(body["values"], json!([["Tacos"]]));
}

#[tokio::test]
async fn append_row_posts_to_append_endpoint() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let base = stub(seen.clone()).await;
    let store = GoogleSheetsStore::new("sheet-1", "tok").with_base_url(base);

    store
        .append_row(
            "Reminders",
            vec!["Vet".into(), "10/22/2026".into(), "".into(), "Pending".into()],
        )
        .await
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].method, Method::POST);
    assert!(
        seen[0]
            .uri
            .starts_with("/v4/spreadsheets/sheet-1/values/'Reminders':append?")
    );
    assert!(seen[0].uri.contains("valueInputOption=USER_ENTERED"));
    let body: Value = serde_json::from_str(&seen[0].body).unwrap();
    assert_eq!(body["values"][0][3], "Pending");
}

#[tokio::test]
async fn unknown_tab_maps_to_tab_not_found() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let base = stub(seen).await;
    let store = GoogleSheetsStore::new("sheet-1", "tok").with_base_url(base);

    let err = store.read_all("Missing").await.unwrap_err();
    assert!(matches!(err, StoreError::TabNotFound(t) if t == "Missing"));
}

// ── Refresh-token auth ───────────────────────────────────────────────────

struct TokenStub {
    base: String,
    grants: Arc<Mutex<Vec<String>>>,
    bearers: Arc<Mutex<Vec<String>>>,
}

/// Token endpoint handing out `ya29.t1`, `ya29.t2`, ... plus a values
/// endpoint that rejects the tokens listed in `rejected` with 401.
async fn token_stub(expires_in: u64, rejected: &'static [&'static str]) -> TokenStub {
    let grants = Arc::new(Mutex::new(Vec::new()));
    let bearers = Arc::new(Mutex::new(Vec::new()));

    let issued = grants.clone();
    let used = bearers.clone();
    let app = Router::new()
        .route(
            "/token",
            axum::routing::post(move |body: String| {
                let issued = issued.clone();
                async move {
                    let mut issued = issued.lock().unwrap();
                    issued.push(body);
                    axum::Json(json!({
                        "access_token": format!("ya29.t{}", issued.len()),
                        "expires_in": expires_in,
                        "token_type": "Bearer"
                    }))
                }
            }),
        )
        .fallback(move |headers: HeaderMap| {
            let used = used.clone();
            async move {
                let bearer = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                used.lock().unwrap().push(bearer.clone());
                if rejected.iter().any(|t| bearer == format!("Bearer {t}")) {
                    return (StatusCode::UNAUTHORIZED, r#"{"error":{"status":"UNAUTHENTICATED"}}"#)
                        .into_response();
                }
                axum::Json(json!({"values": [["Task", "Frequency"], ["Dishes", "daily"]]}))
                    .into_response()
            }
        });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TokenStub {
        base: format!("http://{addr}"),
        grants,
        bearers,
    }
}

fn refreshing_store(stub: &TokenStub) -> GoogleSheetsStore {
    let auth = SheetsAuth::Refreshing(
        RefreshingToken::new("cid", "csecret", "1//refresh")
            .with_token_url(format!("{}/token", stub.base)),
    );
    GoogleSheetsStore::with_auth("sheet-1", auth).with_base_url(&stub.base)
}

#[tokio::test]
async fn refreshed_token_is_reused_until_due() {
    let stub = token_stub(3599, &[]).await;
    let store = refreshing_store(&stub);

    store.read_all("Chores").await.unwrap();
    store.read_all("Chores").await.unwrap();

    let grants = stub.grants.lock().unwrap();
    assert_eq!(grants.len(), 1);
    assert!(grants[0].contains("grant_type=refresh_token"));
    assert!(grants[0].contains("client_id=cid"));
    assert!(grants[0].contains("refresh_token=1%2F%2Frefresh"));
    assert_eq!(
        *stub.bearers.lock().unwrap(),
        ["Bearer ya29.t1", "Bearer ya29.t1"]
    );
}

#[tokio::test]
async fn short_lived_token_is_refreshed_every_call() {
    // Lifetimes under the renewal margin are already due when issued.
    let stub = token_stub(30, &[]).await;
    let store = refreshing_store(&stub);

    store.read_all("Chores").await.unwrap();
    store.read_all("Chores").await.unwrap();

    assert_eq!(stub.grants.lock().unwrap().len(), 2);
    assert_eq!(
        *stub.bearers.lock().unwrap(),
        ["Bearer ya29.t1", "Bearer ya29.t2"]
    );
}

#[tokio::test]
async fn rejected_token_is_dropped_and_replaced() {
    let stub = token_stub(3599, &["ya29.t1"]).await;
    let store = refreshing_store(&stub);

    let err = store.read_all("Chores").await.unwrap_err();
    assert!(matches!(err, StoreError::Backend(_)), "{err:?}");

    let sheet = store.read_all("Chores").await.unwrap();
    assert_eq!(sheet.rows.len(), 1);
    assert_eq!(stub.grants.lock().unwrap().len(), 2);
    assert_eq!(
        *stub.bearers.lock().unwrap(),
        ["Bearer ya29.t1", "Bearer ya29.t2"]
    );
}
