//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives `ApiClient` over real
//! HTTP with the bundled ureq transport. Session storage is shared with the
//! test so login and logout can be simulated between calls.

use std::sync::Arc;

use axum::{http::StatusCode, routing::get, Router};

use mock_server::InventoryItem as SeedItem;
use pharmacy_core::{
    ApiClient, ApiError, Body, Config, MemoryStorage, NewPharmacy, PharmacyPatch, SESSION_KEY,
};
use uuid::Uuid;

/// Serve `app` on a random local port and return its base URL.
fn start_server(app: Router) -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run_app(listener, app).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn seed(pharmacy_id: &str, name: &str, quantity: u32) -> SeedItem {
    SeedItem {
        id: Uuid::new_v4(),
        pharmacy_id: pharmacy_id.to_string(),
        name: name.to_string(),
        quantity,
    }
}

fn client(base_url: &str, storage: Arc<MemoryStorage>) -> ApiClient {
    ApiClient::new(&Config::new(base_url).unwrap(), storage)
}

#[test]
fn session_flow() {
    // Step 1: start mock server with some stock.
    let base_url = start_server(mock_server::app_with_inventory(vec![
        seed("ph-1", "Aspirin", 40),
        seed("ph-2", "Ibuprofen", 12),
        seed("ph-1", "Insulin", 3),
    ]));
    let storage = Arc::new(MemoryStorage::new());
    let client = client(&base_url, storage.clone());

    // Step 2: text endpoint resolves to the raw string.
    let body = client.get("/api/health", &[]).unwrap();
    assert_eq!(body, Body::Text("ok".to_string()));

    // Step 3: logged out, authenticated routes answer 401 with a body message.
    let err = client.get("/api/whoami", &[]).unwrap_err();
    assert_eq!(err.to_string(), mock_server::MISSING_TOKEN);
    assert_eq!(err.status(), Some(401));

    // Step 4: log in by writing a session with a legacy pharmacy id spelling.
    storage.set(
        SESSION_KEY,
        r#"{"role":"pharmacist","pharmacy_id":"ph-1","user":{"shopName":"Corner"},"token":"abc123"}"#,
    );
    let session = client.session();
    assert_eq!(session.pharmacy_id.as_deref(), Some("ph-1"));
    assert_eq!(session.pharmacy_name, "Corner");

    // Step 5: the token reaches the server.
    let body = client.get("/api/whoami", &[]).unwrap();
    assert_eq!(body.as_text(), Some("abc123"));

    // Step 6: inventory filtered by the session's pharmacy.
    let items = client.list_inventory(session.pharmacy_id.as_deref()).unwrap();
    let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["Aspirin", "Insulin"]);

    // Step 7: unfiltered inventory as raw JSON.
    let body = client.get("/api/inventory", &[]).unwrap();
    assert_eq!(body.as_json().and_then(|v| v.as_array()).map(Vec::len), Some(3));

    // Step 8: create a pharmacy.
    let created = client
        .create_pharmacy(&NewPharmacy {
            name: "Corner".to_string(),
            address: "1 Main St".to_string(),
            contact: "555-0100".to_string(),
        })
        .unwrap();
    assert_eq!(created.name, "Corner");

    // Step 9: patch one field.
    let updated = client
        .update_pharmacy(
            created.id,
            &PharmacyPatch {
                contact: Some("555-0199".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.name, "Corner");
    assert_eq!(updated.contact, "555-0199");
    assert_eq!(updated.created_at, created.created_at);

    // Step 10: patch an unknown id, empty 404 body gives the generic message.
    let err = client
        .update_pharmacy(Uuid::nil(), &PharmacyPatch::default())
        .unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 404, .. }));
    assert_eq!(err.to_string(), "HTTP 404");

    // Step 11: an empty PATCH body is an empty record the server accepts.
    let body = client
        .patch_empty(&format!("/api/pharmacies/{}", created.id))
        .unwrap();
    assert_eq!(body.as_json().and_then(|v| v["contact"].as_str()), Some("555-0199"));

    // Step 12: list.
    let all = client.list_pharmacies().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, created.id);

    // Step 13: log out, writes are rejected again.
    storage.remove(SESSION_KEY);
    let err = client
        .create_pharmacy(&NewPharmacy {
            name: "Late".to_string(),
            address: "2 Side St".to_string(),
            contact: "555-0111".to_string(),
        })
        .unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 401, .. }));
}

#[test]
fn corrupt_session_sends_anonymous_requests() {
    let base_url = start_server(mock_server::app());
    let storage = Arc::new(MemoryStorage::new());
    storage.set(SESSION_KEY, "{not json");
    let client = client(&base_url, storage);

    let err = client.get("/api/whoami", &[]).unwrap_err();
    assert_eq!(err.status(), Some(401));
}

#[test]
fn unreachable_server_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client(&format!("http://{addr}"), Arc::new(MemoryStorage::new()));
    let err = client.get("/api/health", &[]).unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}

#[test]
fn empty_token_is_trimmed_on_the_wire() {
    let base_url = start_server(mock_server::app());
    let storage = Arc::new(MemoryStorage::new());
    storage.set(SESSION_KEY, r#"{"token":""}"#);
    let client = client(&base_url, storage);

    // `Bearer ` loses its trailing space in transit, so the server sees no token.
    let err = client.get("/api/whoami", &[]).unwrap_err();
    assert_eq!(err.status(), Some(401));
}

/// Routes answering with bytes that are not valid UTF-8.
fn binary_routes() -> Router {
    Router::new()
        .route(
            "/broken",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, vec![0xff_u8, 0xfe, b'x']) }),
        )
        .route("/blob", get(|| async { vec![0xff_u8, 0xfe, b'x'] }))
}

#[test]
fn invalid_utf8_error_body_is_still_a_status_error() {
    let base_url = start_server(binary_routes());
    let client = client(&base_url, Arc::new(MemoryStorage::new()));

    let err = client.get("/broken", &[]).unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 500, .. }), "got {err:?}");
    assert_eq!(err.to_string(), "\u{FFFD}\u{FFFD}x");
}

#[test]
fn invalid_utf8_success_body_decodes_lossily() {
    let base_url = start_server(binary_routes());
    let client = client(&base_url, Arc::new(MemoryStorage::new()));

    let body = client.get("/blob", &[]).unwrap();
    assert_eq!(body, Body::Text("\u{FFFD}\u{FFFD}x".to_string()));
}
