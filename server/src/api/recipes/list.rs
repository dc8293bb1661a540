use crate::api::pagination::{paginate, PageParams, Paginated};
use crate::api::ErrorResponse;
use crate::auth::OptionalUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::Recipe;
use crate::schema::{favorites, recipe_tags, recipes, shopping_carts, tags};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum_extra::extract::Query;
use chrono::{DateTime, Utc};
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

use super::response::{load_recipe_responses, RecipeResponse};

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListRecipesParams {
    /// 1-based page number (default: 1)
    pub page: Option<i64>,
    /// Items per page (default: 6, max: 100)
    pub limit: Option<i64>,
    /// Tag slugs; repeatable, recipes matching any of them are returned
    #[serde(default)]
    pub tags: Vec<String>,
    /// Filter by author id
    pub author: Option<i32>,
    /// 1 = only recipes the requester favorited (ignored for anonymous)
    pub is_favorited: Option<i32>,
    /// 1 = only recipes in the requester's shopping cart (ignored for anonymous)
    pub is_in_shopping_cart: Option<i32>,
}

// Page row plus the window-function total, so one query serves both the
// results and the count.
#[derive(Queryable)]
struct RecipeRow {
    id: i32,
    author_id: i32,
    name: String,
    image: String,
    text: String,
    cooking_time: i32,
    pub_date: DateTime<Utc>,
    total_count: i64,
}

#[utoipa::path(
    get,
    path = "/api/recipes",
    tag = "recipes",
    params(ListRecipesParams),
    responses(
        (status = 200, description = "Paginated list of recipes", body = Paginated<RecipeResponse>)
    )
)]
pub async fn list_recipes(
    OptionalUser(viewer): OptionalUser,
    State(pool): State<Arc<DbPool>>,
    Query(params): Query<ListRecipesParams>,
) -> impl IntoResponse {
    let page_params = PageParams {
        page: params.page,
        limit: params.limit,
    };
    let viewer_id = viewer.as_ref().map(|u| u.id);

    let mut conn = get_conn!(pool);

    let mut query = recipes::table.into_boxed();

    if let Some(author) = params.author {
        query = query.filter(recipes::author_id.eq(author));
    }

    if !params.tags.is_empty() {
        query = query.filter(
            recipes::id.eq_any(
                recipe_tags::table
                    .inner_join(tags::table)
                    .filter(tags::slug.eq_any(&params.tags))
                    .select(recipe_tags::recipe_id),
            ),
        );
    }

    if params.is_favorited.unwrap_or(0) == 1 {
        if let Some(uid) = viewer_id {
            query = query.filter(
                recipes::id.eq_any(
                    favorites::table
                        .filter(favorites::user_id.eq(uid))
                        .select(favorites::recipe_id),
                ),
            );
        }
    }

    if params.is_in_shopping_cart.unwrap_or(0) == 1 {
        if let Some(uid) = viewer_id {
            query = query.filter(
                recipes::id.eq_any(
                    shopping_carts::table
                        .filter(shopping_carts::user_id.eq(uid))
                        .select(shopping_carts::recipe_id),
                ),
            );
        }
    }

    // COUNT(*) OVER() gives the total across all matching rows without
    // rebuilding the filters for a second query
    let rows: Vec<RecipeRow> = match query
        .order(recipes::pub_date.desc())
        .limit(page_params.limit())
        .offset(page_params.offset())
        .select((
            recipes::id,
            recipes::author_id,
            recipes::name,
            recipes::image,
            recipes::text,
            recipes::cooking_time,
            recipes::pub_date,
            sql::<BigInt>("COUNT(*) OVER()"),
        ))
        .load(&mut conn)
    {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!("Failed to fetch recipes: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch recipes".to_string(),
                }),
            )
                .into_response();
        }
    };

    let count = rows.first().map(|r| r.total_count).unwrap_or(0);
    let page: Vec<Recipe> = rows
        .into_iter()
        .map(|r| Recipe {
            id: r.id,
            author_id: r.author_id,
            name: r.name,
            image: r.image,
            text: r.text,
            cooking_time: r.cooking_time,
            pub_date: r.pub_date,
        })
        .collect();

    let results = match load_recipe_responses(&mut conn, page, viewer.as_ref()) {
        Ok(results) => results,
        Err(e) => {
            tracing::error!("Failed to serialize recipes: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch recipes".to_string(),
                }),
            )
                .into_response();
        }
    };

    (
        StatusCode::OK,
        Json(paginate("/api/recipes", &page_params, count, results)),
    )
        .into_response()
}
