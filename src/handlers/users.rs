//! User CRUD handlers. The password column never leaves the database layer.

use crate::error::AppError;
use crate::handlers::{conflict_on_unique, text_field, ListParams};
use crate::state::AppState;
use crate::validation::{validate_payload, FieldSpec, FieldType};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

#[derive(Serialize, sqlx::FromRow, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const USER_COLUMNS: &str = "id, email, name, created_at, updated_at";

const USER_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "email",
        ty: FieldType::Email,
        required: true,
        max_length: Some(255),
    },
    FieldSpec {
        name: "password",
        ty: FieldType::Text,
        required: true,
        max_length: Some(255),
    },
    FieldSpec {
        name: "name",
        ty: FieldType::Text,
        required: true,
        max_length: Some(100),
    },
];

#[utoipa::path(
    get,
    path = "/api/users",
    responses((status = 200, body = [User])),
    tag = "students",
    security(("bearer" = []))
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<User>>, AppError> {
    let (limit, offset) = params.window();
    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        USER_COLUMNS
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(users))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    responses((status = 200, body = User), (status = 404)),
    tag = "students",
    security(("bearer" = []))
)]
pub async fn read_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE id = $1",
        USER_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("user {}", id)))?;
    Ok(Json(user))
}

#[utoipa::path(
    post,
    path = "/api/users",
    responses((status = 201, body = User), (status = 400), (status = 409)),
    tag = "students",
    security(("bearer" = []))
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let map = validate_payload(body, USER_FIELDS, &state.policy, false)?;
    let user = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (email, password, name) VALUES ($1, $2, $3) RETURNING {}",
        USER_COLUMNS
    ))
    .bind(text_field(&map, "email"))
    .bind(text_field(&map, "password"))
    .bind(text_field(&map, "name"))
    .fetch_one(&state.pool)
    .await
    .map_err(|e| conflict_on_unique(e, "user email"))?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    responses((status = 204), (status = 404)),
    tag = "students",
    security(("bearer" = []))
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("user {}", id)));
    }
    Ok(StatusCode::NO_CONTENT)
}
