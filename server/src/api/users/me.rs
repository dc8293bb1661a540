use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use axum::{http::StatusCode, response::IntoResponse, Json};

use super::response::{user_response, UserResponse};

#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "users",
    responses(
        (status = 200, description = "The requesting user's profile", body = UserResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_me(AuthUser(user): AuthUser) -> impl IntoResponse {
    // Nobody follows themselves, so is_subscribed is always false here
    (StatusCode::OK, Json(user_response(&user, false))).into_response()
}
