//! HTTP API over the record store and the flat user table.
//!
//! The session mechanism is the original backend's placeholder contract: a
//! bare numeric user id in the `x-user-id` header, checked against the user
//! table. It is not a security boundary and must be replaced with signed,
//! expiring tokens before this surface faces untrusted clients.

mod auth;
mod records;
mod users;

pub use users::{Registration, UserStore};

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::error::{Error, Result};
use crate::models::PublicUser;
use crate::persist::PersistenceAdapter;
use crate::store::RecordStore;

/// Shared server state. Each mutation holds the store's write lock across
/// the in-memory apply and the persistence write, which keeps the
/// single-writer semantics of the data model under a concurrent server.
#[derive(Clone)]
pub struct AppState {
    store: Arc<RwLock<RecordStore>>,
    users: Arc<RwLock<UserStore>>,
}

impl AppState {
    pub fn new(adapter: Arc<dyn PersistenceAdapter>) -> Result<Self> {
        let store = RecordStore::open(Arc::clone(&adapter))?;
        let users = UserStore::open(adapter)?;
        Ok(Self {
            store: Arc::new(RwLock::new(store)),
            users: Arc::new(RwLock::new(users)),
        })
    }

    fn store(&self) -> RwLockReadGuard<'_, RecordStore> {
        self.store.read().unwrap_or_else(|e| e.into_inner())
    }

    fn store_mut(&self) -> RwLockWriteGuard<'_, RecordStore> {
        self.store.write().unwrap_or_else(|e| e.into_inner())
    }

    fn users(&self) -> RwLockReadGuard<'_, UserStore> {
        self.users.read().unwrap_or_else(|e| e.into_inner())
    }

    fn users_mut(&self) -> RwLockWriteGuard<'_, UserStore> {
        self.users.write().unwrap_or_else(|e| e.into_inner())
    }
}

/// The user resolved from the `x-user-id` header. Extraction fails with 401
/// when the header is absent, malformed, or names no known user.
pub struct CurrentUser(pub PublicUser);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<u64>().ok())
            .ok_or(Error::Unauthorized)?;

        let users = state.users();
        let user = users.by_id(id).ok_or(Error::Unauthorized)?;
        Ok(CurrentUser(PublicUser::from(user)))
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Duplicate(_) => StatusCode::CONFLICT,
            Error::Persistence(_) | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(%self, "request failed");
        }
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))
        .route("/api/me", get(auth::me))
        .route("/api/user", put(auth::update_user))
        .route(
            "/api/clients",
            get(records::list_clients).post(records::create_client),
        )
        .route(
            "/api/clients/{id}",
            put(records::update_client).delete(records::delete_client),
        )
        .route(
            "/api/orders",
            get(records::list_orders).post(records::create_order),
        )
        .route(
            "/api/orders/{id}",
            put(records::update_order).delete(records::delete_order),
        )
        .route(
            "/api/estimates",
            get(records::list_estimates).post(records::create_estimate),
        )
        .route(
            "/api/estimates/{id}",
            put(records::update_estimate).delete(records::delete_estimate),
        )
        .route("/api/reports/dashboard", get(records::dashboard))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn run(state: AppState, bind_addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
