use crate::api::ErrorResponse;
use crate::db::DbPool;
use crate::get_conn;
use crate::schema::recipes;
use crate::shortlink;
use crate::AppState;
use axum::routing::get;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json, Router,
};
use diesel::prelude::*;
use std::sync::Arc;
use utoipa::OpenApi;

/// Returns the router for short-link resolution (mounted at the root)
pub fn router() -> Router<AppState> {
    Router::new().route("/{token}", get(resolve_short_link))
}

fn link_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "Short link not found".to_string(),
        }),
    )
        .into_response()
}

#[utoipa::path(
    get,
    path = "/{token}",
    tag = "links",
    params(("token" = String, Path, description = "Short-link token")),
    responses(
        (status = 302, description = "Redirect to the recipe page"),
        (status = 404, description = "Unknown or malformed token", body = ErrorResponse)
    )
)]
pub async fn resolve_short_link(
    State(pool): State<Arc<DbPool>>,
    Path(token): Path<String>,
) -> impl IntoResponse {
    let Some(id) = shortlink::CODEC.decode(&token) else {
        return link_not_found();
    };

    let mut conn = get_conn!(pool);

    match recipes::table.find(id).select(recipes::id).first::<i32>(&mut conn) {
        Ok(id) => Redirect::temporary(&format!("/recipes/{}", id)).into_response(),
        Err(diesel::NotFound) => link_not_found(),
        Err(e) => {
            tracing::error!("Failed to resolve short link: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to resolve short link".to_string(),
                }),
            )
                .into_response()
        }
    }
}

#[derive(OpenApi)]
#[openapi(paths(resolve_short_link))]
pub struct ApiDoc;
