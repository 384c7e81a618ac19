// Bill Splitter - Web Server
// REST API with Axum; one in-memory ledger per session

use anyhow::Context;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post, put},
    Router,
};
use bill_splitter::{
    format_currency, BillSummary, Config, DishEntry, LedgerError, NewEntryForm, Session,
    SessionStore, ValidationError,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Shared application state
#[derive(Clone)]
struct AppState {
    sessions: Arc<Mutex<SessionStore>>,
    default_party_size: usize,
}

impl AppState {
    fn new(default_party_size: usize) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(SessionStore::new())),
            default_party_size,
        }
    }

    fn store(&self) -> MutexGuard<'_, SessionStore> {
        // A handler that panicked mid-request leaves the store usable
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    validation: Vec<ValidationError>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Response {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
            validation: vec![],
        })
        .into_response()
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(message.into()),
            validation: vec![],
        }),
    )
        .into_response()
}

fn validation_response(errors: Vec<ValidationError>) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some("validation failed".to_string()),
            validation: errors,
        }),
    )
        .into_response()
}

fn session_not_found(id: Uuid) -> Response {
    error_response(StatusCode::NOT_FOUND, format!("session {} not found", id))
}

// ============================================================================
// Request / Response types
// ============================================================================

#[derive(Deserialize, Default)]
struct CreateSessionRequest {
    party_size: Option<usize>,
}

#[derive(Deserialize)]
struct PartySizeRequest {
    party_size: usize,
}

#[derive(Deserialize)]
struct RosterRequest {
    names: Vec<String>,
}

#[derive(Deserialize)]
struct RatesQuery {
    #[serde(default)]
    tax: f64,
    #[serde(default)]
    tip: f64,
}

/// Session response
#[derive(Serialize, Deserialize)]
struct SessionResponse {
    id: Uuid,
    created_at: DateTime<Utc>,
    party_size: usize,
    roster: Vec<String>,
    entry_count: usize,
}

impl From<&Session> for SessionResponse {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id(),
            created_at: session.created_at(),
            party_size: session.party_size(),
            roster: session.roster().names().to_vec(),
            entry_count: session.ledger().len(),
        }
    }
}

/// Entry response (position plus display strings)
#[derive(Serialize, Deserialize)]
struct EntryResponse {
    index: usize,
    name: String,
    price: f64,
    price_display: String,
    participants: Vec<String>,
}

impl EntryResponse {
    fn new(index: usize, entry: &DishEntry) -> Self {
        Self {
            index,
            name: entry.name.clone(),
            price: entry.price,
            price_display: format_currency(entry.price),
            participants: entry.participants.clone(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct ShareResponse {
    name: String,
    amount: f64,
    amount_display: String,
}

/// Summary response
#[derive(Serialize, Deserialize)]
struct SummaryResponse {
    tax_percent: f64,
    tip_percent: f64,
    subtotal: f64,
    tax_amount: f64,
    tip_amount: f64,
    grand_total: f64,
    shares: Vec<ShareResponse>,
    display: SummaryDisplay,
}

#[derive(Serialize, Deserialize)]
struct SummaryDisplay {
    subtotal: String,
    tax_amount: String,
    tip_amount: String,
    grand_total: String,
}

impl SummaryResponse {
    fn new(summary: BillSummary, rates: &RatesQuery) -> Self {
        Self {
            tax_percent: rates.tax,
            tip_percent: rates.tip,
            subtotal: summary.subtotal,
            tax_amount: summary.tax_amount,
            tip_amount: summary.tip_amount,
            grand_total: summary.grand_total,
            display: SummaryDisplay {
                subtotal: format_currency(summary.subtotal),
                tax_amount: format_currency(summary.tax_amount),
                tip_amount: format_currency(summary.tip_amount),
                grand_total: format_currency(summary.grand_total),
            },
            shares: summary
                .shares
                .into_iter()
                .map(|(name, amount)| ShareResponse {
                    name,
                    amount,
                    amount_display: format_currency(amount),
                })
                .collect(),
        }
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    ApiResponse::ok("OK")
}

/// POST /api/sessions - Start a session with an empty ledger
async fn create_session(
    State(state): State<AppState>,
    body: Option<Json<CreateSessionRequest>>,
) -> Response {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let party_size = request.party_size.unwrap_or(state.default_party_size);

    let mut store = state.store();
    let session = store.create(party_size);
    (StatusCode::CREATED, ApiResponse::ok(SessionResponse::from(&*session))).into_response()
}

/// GET /api/sessions/:id - Session details
async fn get_session(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state.store().get(&id) {
        Some(session) => ApiResponse::ok(SessionResponse::from(session)),
        None => session_not_found(id),
    }
}

/// DELETE /api/sessions/:id - End a session and discard its ledger
async fn end_session(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    match state.store().end(&id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => session_not_found(id),
    }
}

/// PUT /api/sessions/:id/party-size
async fn set_party_size(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<PartySizeRequest>,
) -> Response {
    let mut store = state.store();
    let Some(session) = store.get_mut(&id) else {
        return session_not_found(id);
    };

    match session.set_party_size(request.party_size) {
        Ok(()) => ApiResponse::ok(SessionResponse::from(&*session)),
        Err(e) => validation_response(vec![e]),
    }
}

/// PUT /api/sessions/:id/roster
async fn declare_roster(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<RosterRequest>,
) -> Response {
    let mut store = state.store();
    let Some(session) = store.get_mut(&id) else {
        return session_not_found(id);
    };

    match session.declare_roster(request.names) {
        Ok(()) => ApiResponse::ok(SessionResponse::from(&*session)),
        Err(errors) => validation_response(errors),
    }
}

/// GET /api/sessions/:id/entries - Current entries by position
async fn list_entries(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let store = state.store();
    let Some(session) = store.get(&id) else {
        return session_not_found(id);
    };

    let entries: Vec<EntryResponse> = session
        .ledger()
        .entries()
        .iter()
        .enumerate()
        .map(|(i, entry)| EntryResponse::new(i, entry))
        .collect();
    ApiResponse::ok(entries)
}

/// POST /api/sessions/:id/entries - Validate and append a dish
async fn add_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(form): Json<NewEntryForm>,
) -> Response {
    let mut store = state.store();
    let Some(session) = store.get_mut(&id) else {
        return session_not_found(id);
    };

    match session.add_dish(&form) {
        Ok(index) => match session.ledger().get(index) {
            Some(entry) => {
                (StatusCode::CREATED, ApiResponse::ok(EntryResponse::new(index, entry)))
                    .into_response()
            }
            None => {
                error!(session = %id, index, "appended entry missing from ledger");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "entry was not stored")
            }
        },
        Err(errors) => {
            warn!(session = %id, errors = errors.len(), "rejected dish submission");
            validation_response(errors)
        }
    }
}

/// DELETE /api/sessions/:id/entries/:index - Remove by position
async fn remove_entry(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> Response {
    let mut store = state.store();
    let Some(session) = store.get_mut(&id) else {
        return session_not_found(id);
    };

    match session.remove_dish(index) {
        Ok(entry) => ApiResponse::ok(EntryResponse::new(index, &entry)),
        Err(e @ LedgerError::OutOfRange { .. }) => {
            error_response(StatusCode::NOT_FOUND, e.to_string())
        }
    }
}

/// GET /api/sessions/:id/summary?tax=&tip= - Totals at the given rates
async fn get_summary(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(rates): Query<RatesQuery>,
) -> Response {
    let store = state.store();
    let Some(session) = store.get(&id) else {
        return session_not_found(id);
    };

    match session.summary(rates.tax, rates.tip) {
        Ok(summary) => ApiResponse::ok(SummaryResponse::new(summary, &rates)),
        Err(errors) => validation_response(errors),
    }
}

fn app(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/sessions", post(create_session))
        .route("/sessions/:id", get(get_session).delete(end_session))
        .route("/sessions/:id/party-size", put(set_party_size))
        .route("/sessions/:id/roster", put(declare_roster))
        .route("/sessions/:id/entries", get(list_entries).post(add_entry))
        .route("/sessions/:id/entries/:index", delete(remove_entry))
        .route("/sessions/:id/summary", get(get_summary))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let config = Config::load()?;
    let addr = std::env::var("BILL_SPLITTER_ADDRESS").unwrap_or(config.server.address.clone());

    let state = AppState::new(config.party_size);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!(%addr, "bill splitter server listening");
    info!("API: http://{}/api/health", addr);

    axum::serve(listener, app(state))
        .await
        .context("Server stopped unexpectedly")
}
