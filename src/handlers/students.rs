//! Student CRUD handlers.

use crate::error::AppError;
use crate::handlers::{conflict_on_unique, int_field, text_field, uuid_field, ListParams};
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
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

#[derive(Serialize, sqlx::FromRow, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub age: Option<i32>,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const STUDENT_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "firstName",
        ty: FieldType::Text,
        required: true,
        max_length: Some(100),
    },
    FieldSpec {
        name: "lastName",
        ty: FieldType::Text,
        required: true,
        max_length: Some(100),
    },
    FieldSpec {
        name: "email",
        ty: FieldType::Email,
        required: true,
        max_length: Some(255),
    },
    FieldSpec {
        name: "age",
        ty: FieldType::Integer,
        required: false,
        max_length: None,
    },
    FieldSpec {
        name: "userId",
        ty: FieldType::Uuid,
        required: false,
        max_length: None,
    },
];

/// GET /students — newest first.
#[utoipa::path(
    get,
    path = "/api/students",
    responses((status = 200, body = [Student])),
    tag = "students",
    security(("bearer" = []))
)]
pub async fn list_students(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Student>>, AppError> {
    let (limit, offset) = params.window();
    let students = sqlx::query_as::<_, Student>(
        "SELECT * FROM students ORDER BY created_at DESC LIMIT $1 OFFSET $2",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool)
    .await?;
    Ok(Json(students))
}

#[utoipa::path(
    get,
    path = "/api/students/{id}",
    responses((status = 200, body = Student), (status = 404)),
    tag = "students",
    security(("bearer" = []))
)]
pub async fn read_student(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Student>, AppError> {
    let student = sqlx::query_as::<_, Student>("SELECT * FROM students WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("student {}", id)))?;
    Ok(Json(student))
}

#[utoipa::path(
    post,
    path = "/api/students",
    responses((status = 201, body = Student), (status = 400), (status = 409)),
    tag = "students",
    security(("bearer" = []))
)]
pub async fn create_student(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Student>), AppError> {
    let map = validate_payload(body, STUDENT_FIELDS, &state.policy, false)?;
    let student = sqlx::query_as::<_, Student>(
        "INSERT INTO students (first_name, last_name, email, age, user_id) \
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(text_field(&map, "firstName"))
    .bind(text_field(&map, "lastName"))
    .bind(text_field(&map, "email"))
    .bind(int_field(&map, "age"))
    .bind(uuid_field(&map, "userId"))
    .fetch_one(&state.pool)
    .await
    .map_err(|e| conflict_on_unique(e, "student email"))?;
    Ok((StatusCode::CREATED, Json(student)))
}

/// PATCH semantics: only fields present in the body change. An explicit
/// null clears a nullable field (age, userId) and is rejected for required
/// ones.
#[utoipa::path(
    patch,
    path = "/api/students/{id}",
    responses((status = 200, body = Student), (status = 400), (status = 404)),
    tag = "students",
    security(("bearer" = []))
)]
pub async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> Result<Json<Student>, AppError> {
    let map = validate_payload(body, STUDENT_FIELDS, &state.policy, true)?;
    for key in ["firstName", "lastName", "email"] {
        if matches!(map.get(key), Some(Value::Null)) {
            return Err(AppError::Validation(format!("{} cannot be null", key)));
        }
    }

    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE students SET updated_at = NOW()");
    if map.contains_key("firstName") {
        qb.push(", first_name = ");
        qb.push_bind(text_field(&map, "firstName"));
    }
    if map.contains_key("lastName") {
        qb.push(", last_name = ");
        qb.push_bind(text_field(&map, "lastName"));
    }
    if map.contains_key("email") {
        qb.push(", email = ");
        qb.push_bind(text_field(&map, "email"));
    }
    if map.contains_key("age") {
        qb.push(", age = ");
        qb.push_bind(int_field(&map, "age"));
    }
    if map.contains_key("userId") {
        qb.push(", user_id = ");
        qb.push_bind(uuid_field(&map, "userId"));
    }
    qb.push(" WHERE id = ");
    qb.push_bind(id);
    qb.push(" RETURNING *");

    let student = qb
        .build_query_as::<Student>()
        .fetch_optional(&state.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "student email"))?
        .ok_or_else(|| AppError::NotFound(format!("student {}", id)))?;
    Ok(Json(student))
}

#[utoipa::path(
    delete,
    path = "/api/students/{id}",
    responses((status = 204), (status = 404)),
    tag = "students",
    security(("bearer" = []))
)]
pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let result = sqlx::query("DELETE FROM students WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("student {}", id)));
    }
    Ok(StatusCode::NO_CONTENT)
}
