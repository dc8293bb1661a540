use crate::api::{field_error, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::images;
use crate::schema::users;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AvatarRequest {
    /// Inline image as a `data:image/...;base64,...` URI
    #[serde(default)]
    pub avatar: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AvatarResponse {
    pub avatar: String,
}

#[utoipa::path(
    put,
    path = "/api/users/me/avatar",
    tag = "users",
    request_body = AvatarRequest,
    responses(
        (status = 200, description = "Avatar updated", body = AvatarResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn put_avatar(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Json(req): Json<AvatarRequest>,
) -> impl IntoResponse {
    let image = match images::parse_data_uri(&req.avatar) {
        Ok(image) => image,
        Err(message) => return field_error("avatar", message),
    };

    let stored = match images::save_image("avatars", &image) {
        Ok(path) => path,
        Err(e) => {
            tracing::error!("Failed to store avatar: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to store avatar".to_string(),
                }),
            )
                .into_response();
        }
    };

    let mut conn = get_conn!(pool);

    match diesel::update(users::table.find(user.id))
        .set(users::avatar.eq(&stored))
        .execute(&mut conn)
    {
        Ok(_) => {}
        Err(e) => {
            tracing::error!("Failed to update avatar: {}", e);
            images::delete_image(&stored);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to update avatar".to_string(),
                }),
            )
                .into_response();
        }
    }

    // Drop the previous file once the row points at the new one
    if let Some(old) = user.avatar.as_deref() {
        images::delete_image(old);
    }

    (
        StatusCode::OK,
        Json(AvatarResponse {
            avatar: images::media_url(&stored),
        }),
    )
        .into_response()
}

#[utoipa::path(
    delete,
    path = "/api/users/me/avatar",
    tag = "users",
    responses(
        (status = 204, description = "Avatar removed"),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_avatar(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    match diesel::update(users::table.find(user.id))
        .set(users::avatar.eq(None::<String>))
        .execute(&mut conn)
    {
        Ok(_) => {
            if let Some(old) = user.avatar.as_deref() {
                images::delete_image(old);
            }
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => {
            tracing::error!("Failed to remove avatar: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to remove avatar".to_string(),
                }),
            )
                .into_response()
        }
    }
}
