use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PharmacyDetails {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub contact: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct NewPharmacy {
    pub name: String,
    pub address: String,
    pub contact: String,
}

#[derive(Deserialize)]
pub struct PharmacyPatch {
    pub name: Option<String>,
    pub address: Option<String>,
    pub contact: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: Uuid,
    pub pharmacy_id: String,
    pub name: String,
    pub quantity: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryQuery {
    pub pharmacy_id: Option<String>,
}

#[derive(Default)]
pub struct Store {
    pub pharmacies: RwLock<HashMap<Uuid, PharmacyDetails>>,
    pub inventory: RwLock<Vec<InventoryItem>>,
}

pub type Db = Arc<Store>;

pub const MISSING_TOKEN: &str = "missing bearer token";

pub fn app() -> Router {
    app_with_inventory(Vec::new())
}

/// Same routes as [`app`], with the inventory pre-seeded.
pub fn app_with_inventory(items: Vec<InventoryItem>) -> Router {
    let db: Db = Arc::new(Store {
        pharmacies: RwLock::new(HashMap::new()),
        inventory: RwLock::new(items),
    });
    Router::new()
        .route("/api/health", get(health))
        .route("/api/whoami", get(whoami))
        .route("/api/inventory", get(list_inventory))
        .route("/api/pharmacies", get(list_pharmacies).post(create_pharmacy))
        .route("/api/pharmacies/{id}", patch(update_pharmacy))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_app(listener, app()).await
}

pub async fn run_app(listener: TcpListener, app: Router) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!("mock backend serving on {addr}");
    }
    axum::serve(listener, app).await
}

/// Token carried by an `Authorization: Bearer <token>` header, if any.
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, MISSING_TOKEN).into_response()
}

async fn health() -> &'static str {
    "ok"
}

async fn whoami(headers: HeaderMap) -> Response {
    match bearer_token(&headers) {
        Some(token) => token.into_response(),
        None => unauthorized(),
    }
}

async fn list_inventory(
    State(db): State<Db>,
    Query(query): Query<InventoryQuery>,
) -> Json<Vec<InventoryItem>> {
    let items = db.inventory.read().await;
    let filtered = items
        .iter()
        .filter(|item| {
            query
                .pharmacy_id
                .as_deref()
                .is_none_or(|id| item.pharmacy_id == id)
        })
        .cloned()
        .collect();
    Json(filtered)
}

async fn list_pharmacies(State(db): State<Db>) -> Json<Vec<PharmacyDetails>> {
    let pharmacies = db.pharmacies.read().await;
    let mut all: Vec<PharmacyDetails> = pharmacies.values().cloned().collect();
    all.sort_by_key(|p| p.created_at);
    Json(all)
}

async fn create_pharmacy(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<NewPharmacy>,
) -> Response {
    if bearer_token(&headers).is_none() {
        return unauthorized();
    }
    let pharmacy = PharmacyDetails {
        id: Uuid::new_v4(),
        name: input.name,
        address: input.address,
        contact: input.contact,
        created_at: Utc::now(),
    };
    debug!(id = %pharmacy.id, "created pharmacy");
    db.pharmacies.write().await.insert(pharmacy.id, pharmacy.clone());
    (StatusCode::CREATED, Json(pharmacy)).into_response()
}

async fn update_pharmacy(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(input): Json<PharmacyPatch>,
) -> Response {
    if bearer_token(&headers).is_none() {
        return unauthorized();
    }
    let mut pharmacies = db.pharmacies.write().await;
    let Some(pharmacy) = pharmacies.get_mut(&id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if let Some(name) = input.name {
        pharmacy.name = name;
    }
    if let Some(address) = input.address {
        pharmacy.address = address;
    }
    if let Some(contact) = input.contact {
        pharmacy.contact = contact;
    }
    Json(pharmacy.clone()).into_response()
}
