use std::path::Path;
use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Json, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, get_service, post, put};
use axum::Router;
use parking_lot::Mutex;
use rusqlite::Connection;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::db;
use crate::error::{AppError, AppResult};
use crate::item::{CommonResult, IdQuery, Item, PageParams, PageResult};
use crate::metric::{Metric, MetricsLog, Operation, Sample};

pub const BASE_PATH: &str = "/infra/demo-crud";

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub metrics: MetricsLog,
}

impl AppState {
    pub fn new(conn: Connection, metrics: MetricsLog) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            metrics,
        }
    }
}

type ApiJson<T> = AppResult<Json<CommonResult<T>>>;

// GET /infra/demo-crud/page
async fn page_demo(
    State(state): State<AppState>,
    headers: HeaderMap,
    params: Result<Query<PageParams>, QueryRejection>,
) -> ApiJson<PageResult<Item>> {
    let Query(params) = params?;
    params.validate().map_err(AppError::BadRequest)?;
    let sample = Sample::start(Operation::Page, &headers);
    let result = db::page(&state.db.lock(), &params)?;
    state.metrics.record(sample);
    Ok(Json(CommonResult::success(result)))
}

// GET /infra/demo-crud/get?id=
async fn get_demo(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> ApiJson<Item> {
    let Query(IdQuery { id }) = query?;
    let sample = Sample::start(Operation::Get, &headers);
    let maybe = db::get(&state.db.lock(), id)?;
    state.metrics.record(sample);
    match maybe {
        Some(item) => Ok(Json(CommonResult::success(item))),
        None => Err(AppError::NotFound),
    }
}

// POST /infra/demo-crud/create
async fn create_demo(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<Item>, JsonRejection>,
) -> ApiJson<i64> {
    let Json(item) = body?;
    let sample = Sample::start(Operation::Create, &headers);
    let id = db::insert(&state.db.lock(), &item)?;
    state.metrics.record(sample);
    tracing::info!(id, "demo item created");
    Ok(Json(CommonResult::success(id)))
}

// PUT /infra/demo-crud/update
async fn update_demo(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<Item>, JsonRejection>,
) -> ApiJson<bool> {
    let Json(item) = body?;
    let id = item
        .id
        .ok_or_else(|| AppError::BadRequest("id is required".to_string()))?;
    let sample = Sample::start(Operation::Update, &headers);
    let changed = db::update(&state.db.lock(), id, &item)?;
    state.metrics.record(sample);
    if changed {
        tracing::info!(id, "demo item updated");
        Ok(Json(CommonResult::success(true)))
    } else {
        Err(AppError::NotFound)
    }
}

// DELETE /infra/demo-crud/delete?id=
async fn delete_demo(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> ApiJson<bool> {
    let Query(IdQuery { id }) = query?;
    let sample = Sample::start(Operation::Delete, &headers);
    let removed = db::delete(&state.db.lock(), id)?;
    state.metrics.record(sample);
    if removed {
        tracing::info!(id, "demo item deleted");
        Ok(Json(CommonResult::success(true)))
    } else {
        Err(AppError::NotFound)
    }
}

// GET /infra/demo-crud/metrics
async fn get_metrics(State(state): State<AppState>) -> Json<CommonResult<Vec<Metric>>> {
    Json(CommonResult::success(state.metrics.snapshot()))
}

/// API routes only, nested under [`BASE_PATH`].
pub fn demo_routes(state: AppState) -> Router {
    let api = Router::new()
        .route("/page", get(page_demo))
        .route("/get", get(get_demo))
        .route("/create", post(create_demo))
        .route("/update", put(update_demo))
        .route("/delete", delete(delete_demo))
        .route("/metrics", get(get_metrics))
        .with_state(state);

    Router::new().nest(BASE_PATH, api)
}

pub fn create_app(state: AppState, static_dir: &Path) -> Router {
    // serve the built front end for everything outside the API
    let static_files = get_service(ServeDir::new(static_dir)).handle_error(|err| async move {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Unhandled internal error: {}", err),
        )
    });

    demo_routes(state)
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
}
