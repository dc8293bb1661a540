use crate::api::ErrorResponse;
use crate::config;
use crate::db::DbPool;
use crate::get_conn;
use crate::schema::recipes;
use crate::shortlink;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ShortLinkResponse {
    #[serde(rename = "short-link")]
    pub short_link: String,
}

#[utoipa::path(
    get,
    path = "/api/recipes/{id}/get-link",
    tag = "recipes",
    params(("id" = i32, Path, description = "Recipe ID")),
    responses(
        (status = 200, description = "Shareable short link for the recipe", body = ShortLinkResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
pub async fn get_link(State(pool): State<Arc<DbPool>>, Path(id): Path<i32>) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    let recipe_id: i32 = match recipes::table.find(id).select(recipes::id).first(&mut conn) {
        Ok(id) => id,
        Err(diesel::NotFound) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "Recipe not found".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to fetch recipe: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to build short link".to_string(),
                }),
            )
                .into_response();
        }
    };

    let token = shortlink::CODEC.encode(recipe_id);

    (
        StatusCode::OK,
        Json(ShortLinkResponse {
            short_link: format!("{}/{}", *config::BASE_URL, token),
        }),
    )
        .into_response()
}
