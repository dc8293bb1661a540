use crate::api::{push_field_error, validation_failed, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::images;
use crate::models::{NewRecipeIngredient, NewRecipeTag, Recipe};
use crate::schema::{recipe_ingredients, recipe_tags, recipes};
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

use super::create::{check_references_exist, validate_recipe_payload, IngredientAmount};
use super::response::load_recipe_response;

// Same payload as create, except the image may be omitted to keep the
// current one.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateRecipeRequest {
    #[serde(default)]
    pub ingredients: Vec<IngredientAmount>,
    #[serde(default)]
    pub tags: Vec<i32>,
    /// Inline image as a `data:image/...;base64,...` URI
    pub image: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub cooking_time: i32,
}

#[utoipa::path(
    patch,
    path = "/api/recipes/{id}",
    tag = "recipes",
    params(("id" = i32, Path, description = "Recipe ID")),
    request_body = UpdateRecipeRequest,
    responses(
        (status = 200, description = "Recipe updated", body = super::response::RecipeResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not the recipe's author", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<i32>,
    Json(req): Json<UpdateRecipeRequest>,
) -> impl IntoResponse {
    let mut conn = get_conn!(pool);

    let recipe: Recipe = match recipes::table
        .find(id)
        .select(Recipe::as_select())
        .first(&mut conn)
    {
        Ok(r) => r,
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
                    error: "Failed to update recipe".to_string(),
                }),
            )
                .into_response();
        }
    };

    if recipe.author_id != user.id {
        return (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                error: "Only the author can edit this recipe".to_string(),
            }),
        )
            .into_response();
    }

    let mut errors = validate_recipe_payload(
        &req.name,
        &req.text,
        req.cooking_time,
        &req.tags,
        &req.ingredients,
    );

    // Absent image keeps the stored one; present image must decode
    let new_image = match req.image.as_deref() {
        Some(uri) => match images::parse_data_uri(uri) {
            Ok(image) => Some(image),
            Err(message) => {
                push_field_error(&mut errors, "image", message);
                None
            }
        },
        None => None,
    };

    if errors.is_empty() {
        if let Err(e) = check_references_exist(&mut conn, &req.tags, &req.ingredients, &mut errors)
        {
            tracing::error!("Failed to check recipe references: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to update recipe".to_string(),
                }),
            )
                .into_response();
        }
    }

    if !errors.is_empty() {
        return validation_failed(errors);
    }

    let stored = match new_image {
        Some(image) => match images::save_image("recipes", &image) {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::error!("Failed to store recipe image: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: "Failed to store image".to_string(),
                    }),
                )
                    .into_response();
            }
        },
        None => None,
    };
    let image_path = stored.as_deref().unwrap_or(&recipe.image).to_string();

    // Ingredient lines and tag links are replaced wholesale
    let result: Result<Recipe, diesel::result::Error> = conn.transaction(|conn| {
        let updated: Recipe = diesel::update(recipes::table.find(recipe.id))
            .set((
                recipes::name.eq(&req.name),
                recipes::text.eq(&req.text),
                recipes::cooking_time.eq(req.cooking_time),
                recipes::image.eq(&image_path),
            ))
            .returning(Recipe::as_returning())
            .get_result(conn)?;

        diesel::delete(
            recipe_ingredients::table.filter(recipe_ingredients::recipe_id.eq(recipe.id)),
        )
        .execute(conn)?;
        let lines: Vec<NewRecipeIngredient> = req
            .ingredients
            .iter()
            .map(|i| NewRecipeIngredient {
                recipe_id: recipe.id,
                ingredient_id: i.id,
                amount: i.amount,
            })
            .collect();
        diesel::insert_into(recipe_ingredients::table)
            .values(&lines)
            .execute(conn)?;

        diesel::delete(recipe_tags::table.filter(recipe_tags::recipe_id.eq(recipe.id)))
            .execute(conn)?;
        let links: Vec<NewRecipeTag> = req
            .tags
            .iter()
            .map(|&tag_id| NewRecipeTag {
                recipe_id: recipe.id,
                tag_id,
            })
            .collect();
        diesel::insert_into(recipe_tags::table)
            .values(&links)
            .execute(conn)?;

        Ok(updated)
    });

    let updated = match result {
        Ok(updated) => {
            // The old file is dead once the row points at the new one
            if stored.is_some() {
                images::delete_image(&recipe.image);
            }
            updated
        }
        Err(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        )) => {
            if let Some(stored) = stored.as_deref() {
                images::delete_image(stored);
            }
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "You already have a recipe with this name and text".to_string(),
                }),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!("Failed to update recipe: {}", e);
            if let Some(stored) = stored.as_deref() {
                images::delete_image(stored);
            }
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to update recipe".to_string(),
                }),
            )
                .into_response();
        }
    };

    match load_recipe_response(&mut conn, updated, Some(&user)) {
        Ok(Some(response)) => (StatusCode::OK, Json(response)).into_response(),
        Ok(None) | Err(_) => {
            tracing::error!("Failed to serialize updated recipe");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch updated recipe".to_string(),
                }),
            )
                .into_response()
        }
    }
}
