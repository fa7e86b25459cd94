use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::error::Result;
use crate::models::{
    Client, ClientDraft, ClientPatch, Estimate, EstimateDraft, EstimatePatch, Order, OrderDraft,
    OrderPatch, OrderStatus,
};
use crate::reports::{self, MonthBucket};

use super::{AppState, CurrentUser};

const DASHBOARD_WINDOW_MONTHS: usize = 6;

// Clients

pub async fn list_clients(State(state): State<AppState>, _user: CurrentUser) -> Json<Vec<Client>> {
    Json(state.store().clients().to_vec())
}

pub async fn create_client(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(draft): Json<ClientDraft>,
) -> Result<(StatusCode, Json<Client>)> {
    let client = state.store_mut().add_client(draft)?;
    Ok((StatusCode::CREATED, Json(client)))
}

pub async fn update_client(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
    Json(patch): Json<ClientPatch>,
) -> Result<Json<Client>> {
    let client = state.store_mut().update_client(&id, patch)?;
    Ok(Json(client))
}

pub async fn delete_client(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.store_mut().remove_client(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

// Orders

pub async fn list_orders(State(state): State<AppState>, _user: CurrentUser) -> Json<Vec<Order>> {
    Json(state.store().orders().to_vec())
}

pub async fn create_order(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(draft): Json<OrderDraft>,
) -> Result<(StatusCode, Json<Order>)> {
    let order = state.store_mut().add_order(draft)?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn update_order(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
    Json(patch): Json<OrderPatch>,
) -> Result<Json<Order>> {
    let order = state.store_mut().update_order(&id, patch)?;
    Ok(Json(order))
}

pub async fn delete_order(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.store_mut().remove_order(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

// Estimates

pub async fn list_estimates(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Json<Vec<Estimate>> {
    Json(state.store().estimates().to_vec())
}

pub async fn create_estimate(
    State(state): State<AppState>,
    _user: CurrentUser,
    Json(draft): Json<EstimateDraft>,
) -> Result<(StatusCode, Json<Estimate>)> {
    let estimate = state.store_mut().add_estimate(draft)?;
    Ok((StatusCode::CREATED, Json(estimate)))
}

pub async fn update_estimate(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
    Json(patch): Json<EstimatePatch>,
) -> Result<Json<Estimate>> {
    let estimate = state.store_mut().update_estimate(&id, patch)?;
    Ok(Json(estimate))
}

pub async fn delete_estimate(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.store_mut().remove_estimate(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

// Dashboard

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
    pub monthly_revenue: Vec<MonthBucket>,
    pub current_month_revenue: String,
    pub order_status_counts: BTreeMap<OrderStatus, usize>,
}

pub async fn dashboard(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Json<DashboardReport> {
    let store = state.store();
    Json(DashboardReport {
        monthly_revenue: reports::monthly_revenue(store.estimates(), DASHBOARD_WINDOW_MONTHS),
        current_month_revenue: reports::current_month_revenue(store.estimates()),
        order_status_counts: reports::order_status_counts(store.orders()),
    })
}
