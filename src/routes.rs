//! Route table for the module graph the lifecycle mounts at startup.

use crate::handlers::{health, students, users};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route(
            "/students",
            get(students::list_students).post(students::create_student),
        )
        .route(
            "/students/:id",
            get(students::read_student)
                .patch(students::update_student)
                .delete(students::delete_student),
        )
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/:id",
            get(users::read_user).delete(users::delete_user),
        )
        .with_state(state)
}
