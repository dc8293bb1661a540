use crate::api::{push_field_error, validation_failed, ErrorResponse, FieldErrors};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::User;
use crate::schema::users;
use crate::validation::{validate_email, validate_name, validate_username};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::response::{user_response, UserResponse};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not the profile owner", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_user(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<i32>,
    Json(req): Json<UpdateUserRequest>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    let exists: bool = match diesel::select(diesel::dsl::exists(users::table.find(id)))
        .get_result(&mut conn)
    {
        Ok(e) => e,
        Err(e) => {
            tracing::error!("Failed to fetch user: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to update user".to_string(),
                }),
            )
                .into_response();
        }
    };
    if !exists {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "User not found".to_string(),
            }),
        )
            .into_response();
    }
    if id != user.id {
        return (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                error: "You can only edit your own profile".to_string(),
            }),
        )
            .into_response();
    }

    let mut errors = FieldErrors::new();
    if let Err(message) = validate_email(&req.email) {
        push_field_error(&mut errors, "email", message);
    }
    if let Err(message) = validate_username(&req.username) {
        push_field_error(&mut errors, "username", message);
    }
    if let Err(message) = validate_name(&req.first_name) {
        push_field_error(&mut errors, "first_name", message);
    }
    if let Err(message) = validate_name(&req.last_name) {
        push_field_error(&mut errors, "last_name", message);
    }
    if !errors.is_empty() {
        return validation_failed(errors);
    }

    let updated: User = match diesel::update(users::table.find(user.id))
        .set((
            users::email.eq(&req.email),
            users::username.eq(&req.username),
            users::first_name.eq(&req.first_name),
            users::last_name.eq(&req.last_name),
        ))
        .returning(User::as_returning())
        .get_result(&mut conn)
    {
        Ok(u) => u,
        Err(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        )) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "A user with that username or email already exists".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to update user: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to update user".to_string(),
                }),
            )
                .into_response();
        }
    };

    (StatusCode::OK, Json(user_response(&updated, false))).into_response()
}
