use crate::infra::AppState;
use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::{DateTime, Utc};
use ldap_provisioning::directory::UserView;
use ldap_provisioning::error::AppError;
use ldap_provisioning::workflows::accounts::{
    delete_all_users, delete_user, describe_user, list_users, DeletionReport,
};
use ldap_provisioning::workflows::provisioning::report::ReportSummary;
use ldap_provisioning::{BatchImporter, Outcome, RecordParser};
use serde::Serialize;
use serde_json::json;

#[derive(Debug, Serialize)]
pub(crate) struct ImportResponse {
    pub(crate) processed_at: DateTime<Utc>,
    pub(crate) record_count: usize,
    pub(crate) outcomes: Vec<Outcome>,
    pub(crate) report: ReportSummary,
    /// The report rendered as the CLI prints it.
    pub(crate) message: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct UserListResponse {
    pub(crate) base: String,
    pub(crate) users: Vec<UserView>,
}

pub(crate) fn router() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/users/import", post(import_endpoint))
        .route(
            "/api/v1/users",
            get(list_users_endpoint).delete(delete_all_users_endpoint),
        )
        .route(
            "/api/v1/users/:id",
            get(show_user_endpoint).delete(delete_user_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// The body is the batch file itself. It is parsed before any directory
/// session is opened.
pub(crate) async fn import_endpoint(
    Extension(state): Extension<AppState>,
    body: String,
) -> Result<Json<ImportResponse>, AppError> {
    let records = RecordParser::from_reader(body.as_bytes())?;
    let importer = BatchImporter::new(state.layout.clone());

    let report = state
        .with_directory(move |directory, _| Ok(importer.run(&records, directory)))
        .await?;

    Ok(Json(ImportResponse {
        processed_at: Utc::now(),
        record_count: report.record_count(),
        message: report.summary.to_string(),
        outcomes: report.outcomes,
        report: report.summary,
    }))
}

pub(crate) async fn list_users_endpoint(
    Extension(state): Extension<AppState>,
) -> Result<Json<UserListResponse>, AppError> {
    let users = state
        .with_directory(|directory, layout| Ok(list_users(directory, layout)?))
        .await?;

    Ok(Json(UserListResponse {
        base: state.layout.users_base(),
        users,
    }))
}

pub(crate) async fn show_user_endpoint(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserView>, AppError> {
    let user = state
        .with_directory(move |directory, layout| Ok(describe_user(directory, layout, &id)?))
        .await?;
    Ok(Json(user))
}

pub(crate) async fn delete_user_endpoint(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state
        .with_directory(move |directory, layout| Ok(delete_user(directory, layout, &id)?))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn delete_all_users_endpoint(
    Extension(state): Extension<AppState>,
) -> Result<Json<DeletionReport>, AppError> {
    let report = state
        .with_directory(|directory, layout| Ok(delete_all_users(directory, layout)?))
        .await?;
    Ok(Json(report))
}
