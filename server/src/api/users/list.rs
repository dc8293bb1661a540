use crate::api::pagination::{paginate, PageParams, Paginated};
use crate::api::ErrorResponse;
use crate::auth::OptionalUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::User;
use crate::schema::users;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use std::sync::Arc;

use super::response::{subscribed_author_ids, user_response, UserResponse};

#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    params(PageParams),
    responses(
        (status = 200, description = "Paginated list of users", body = Paginated<UserResponse>)
    )
)]
pub async fn list_users(
    OptionalUser(viewer): OptionalUser,
    State(pool): State<Arc<DbPool>>,
    Query(params): Query<PageParams>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    let count: i64 = match users::table.count().get_result(&mut conn) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to count users: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch users".to_string(),
                }),
            )
                .into_response();
        }
    };

    let page: Vec<User> = match users::table
        .order(users::username.asc())
        .limit(params.limit())
        .offset(params.offset())
        .select(User::as_select())
        .load(&mut conn)
    {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Failed to fetch users: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch users".to_string(),
                }),
            )
                .into_response();
        }
    };

    let ids: Vec<i32> = page.iter().map(|u| u.id).collect();
    let followed = match subscribed_author_ids(&mut conn, viewer.as_ref().map(|u| u.id), &ids) {
        Ok(set) => set,
        Err(e) => {
            tracing::error!("Failed to fetch subscriptions: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch users".to_string(),
                }),
            )
                .into_response();
        }
    };

    let results: Vec<UserResponse> = page
        .iter()
        .map(|user| user_response(user, followed.contains(&user.id)))
        .collect();

    (
        StatusCode::OK,
        Json(paginate("/api/users", &params, count, results)),
    )
        .into_response()
}
