use crate::api::{push_field_error, validation_failed, ErrorResponse, FieldErrors};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::images;
use crate::models::{NewRecipe, NewRecipeIngredient, NewRecipeTag, Recipe};
use crate::schema::{ingredients, recipe_ingredients, recipe_tags, recipes, tags};
use crate::validation::{MAX_LENGTH_RECIPE_NAME, MIN_COOKING_TIME, MIN_INGREDIENT_AMOUNT};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use diesel::prelude::*;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use utoipa::ToSchema;

use super::response::load_recipe_response;

/// Ingredient reference in a recipe write payload: an existing ingredient id
/// plus the required amount.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct IngredientAmount {
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    pub amount: i32,
}

// Fields default so missing ones surface as field-keyed validation errors.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateRecipeRequest {
    #[serde(default)]
    pub ingredients: Vec<IngredientAmount>,
    #[serde(default)]
    pub tags: Vec<i32>,
    /// Inline image as a `data:image/...;base64,...` URI
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub cooking_time: i32,
}

/// Field checks shared by create and update.
pub(super) fn validate_recipe_payload(
    name: &str,
    text: &str,
    cooking_time: i32,
    tag_ids: &[i32],
    ingredient_amounts: &[IngredientAmount],
) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if name.trim().is_empty() {
        push_field_error(&mut errors, "name", "This field may not be blank.".to_string());
    } else if name.chars().count() > MAX_LENGTH_RECIPE_NAME {
        push_field_error(
            &mut errors,
            "name",
            format!(
                "Ensure this field has no more than {} characters.",
                MAX_LENGTH_RECIPE_NAME
            ),
        );
    }

    if text.trim().is_empty() {
        push_field_error(&mut errors, "text", "This field may not be blank.".to_string());
    }

    if cooking_time < MIN_COOKING_TIME {
        push_field_error(
            &mut errors,
            "cooking_time",
            format!("Cooking time must be at least {} minute.", MIN_COOKING_TIME),
        );
    }

    if tag_ids.is_empty() {
        push_field_error(&mut errors, "tags", "At least one tag is required.".to_string());
    } else if tag_ids.len() != tag_ids.iter().collect::<HashSet<_>>().len() {
        push_field_error(&mut errors, "tags", "Tags must not repeat.".to_string());
    }

    if ingredient_amounts.is_empty() {
        push_field_error(
            &mut errors,
            "ingredients",
            "At least one ingredient is required.".to_string(),
        );
    } else {
        let ids: HashSet<i32> = ingredient_amounts.iter().map(|i| i.id).collect();
        if ids.len() != ingredient_amounts.len() {
            push_field_error(
                &mut errors,
                "ingredients",
                "Ingredients must not repeat.".to_string(),
            );
        }
        if ingredient_amounts
            .iter()
            .any(|i| i.amount < MIN_INGREDIENT_AMOUNT)
        {
            push_field_error(
                &mut errors,
                "ingredients",
                format!("Ingredient amount must be at least {}.", MIN_INGREDIENT_AMOUNT),
            );
        }
    }

    errors
}

/// Adds field errors for referenced tag/ingredient ids that do not exist.
pub(super) fn check_references_exist(
    conn: &mut PgConnection,
    tag_ids: &[i32],
    ingredient_amounts: &[IngredientAmount],
    errors: &mut FieldErrors,
) -> QueryResult<()> {
    let found_tags: HashSet<i32> = tags::table
        .filter(tags::id.eq_any(tag_ids))
        .select(tags::id)
        .load::<i32>(conn)?
        .into_iter()
        .collect();
    for id in tag_ids {
        if !found_tags.contains(id) {
            push_field_error(errors, "tags", format!("Tag with id {} not found.", id));
        }
    }

    let ingredient_ids: Vec<i32> = ingredient_amounts.iter().map(|i| i.id).collect();
    let found_ingredients: HashSet<i32> = ingredients::table
        .filter(ingredients::id.eq_any(&ingredient_ids))
        .select(ingredients::id)
        .load::<i32>(conn)?
        .into_iter()
        .collect();
    for id in &ingredient_ids {
        if !found_ingredients.contains(id) {
            push_field_error(
                errors,
                "ingredients",
                format!("Ingredient with id {} not found.", id),
            );
        }
    }

    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/recipes",
    tag = "recipes",
    request_body = CreateRecipeRequest,
    responses(
        (status = 201, description = "Recipe created successfully", body = super::response::RecipeResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Json(req): Json<CreateRecipeRequest>,
) -> impl IntoResponse {
    let mut errors = validate_recipe_payload(
        &req.name,
        &req.text,
        req.cooking_time,
        &req.tags,
        &req.ingredients,
    );

    let image = match images::parse_data_uri(&req.image) {
        Ok(image) => Some(image),
        Err(message) => {
            push_field_error(&mut errors, "image", message);
            None
        }
    };

    let mut conn = get_conn!(pool);

    if errors.is_empty() {
        if let Err(e) = check_references_exist(&mut conn, &req.tags, &req.ingredients, &mut errors)
        {
            tracing::error!("Failed to check recipe references: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to create recipe".to_string(),
                }),
            )
                .into_response();
        }
    }

    if !errors.is_empty() {
        return validation_failed(errors);
    }

    let image = image.expect("image validated above");
    let stored = match images::save_image("recipes", &image) {
        Ok(path) => path,
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
    };

    // Recipe row, ingredient lines and tag links go in atomically
    let result: Result<Recipe, diesel::result::Error> = conn.transaction(|conn| {
        let new_recipe = NewRecipe {
            author_id: user.id,
            name: &req.name,
            image: &stored,
            text: &req.text,
            cooking_time: req.cooking_time,
        };

        let recipe: Recipe = diesel::insert_into(recipes::table)
            .values(&new_recipe)
            .returning(Recipe::as_returning())
            .get_result(conn)?;

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

        Ok(recipe)
    });

    let recipe = match result {
        Ok(recipe) => recipe,
        Err(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        )) => {
            images::delete_image(&stored);
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "You already have a recipe with this name and text".to_string(),
                }),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!("Failed to create recipe: {}", e);
            images::delete_image(&stored);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to create recipe".to_string(),
                }),
            )
                .into_response();
        }
    };

    match load_recipe_response(&mut conn, recipe, Some(&user)) {
        Ok(Some(response)) => (StatusCode::CREATED, Json(response)).into_response(),
        Ok(None) | Err(_) => {
            tracing::error!("Failed to serialize created recipe");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch created recipe".to_string(),
                }),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ingredient(id: i32, amount: i32) -> IngredientAmount {
        IngredientAmount { id, amount }
    }

    #[test]
    fn test_valid_payload_passes() {
        let errors = validate_recipe_payload(
            "Borscht",
            "Chop, boil, serve.",
            45,
            &[1, 2],
            &[ingredient(1, 200), ingredient(2, 3)],
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn test_duplicate_tags_flagged_on_tags_field() {
        let errors =
            validate_recipe_payload("Borscht", "Text", 45, &[1, 1], &[ingredient(1, 200)]);
        assert!(errors.contains_key("tags"));
        assert!(!errors.contains_key("ingredients"));
    }

    #[test]
    fn test_duplicate_ingredients_flagged_on_ingredients_field() {
        let errors = validate_recipe_payload(
            "Borscht",
            "Text",
            45,
            &[1],
            &[ingredient(1, 200), ingredient(1, 100)],
        );
        assert!(errors.contains_key("ingredients"));
        assert!(!errors.contains_key("tags"));
    }

    #[test]
    fn test_missing_collections_required() {
        let errors = validate_recipe_payload("Borscht", "Text", 45, &[], &[]);
        assert!(errors.contains_key("tags"));
        assert!(errors.contains_key("ingredients"));
    }

    #[test]
    fn test_amount_and_cooking_time_minimums() {
        let errors = validate_recipe_payload("Borscht", "Text", 0, &[1], &[ingredient(1, 0)]);
        assert!(errors.contains_key("cooking_time"));
        assert!(errors.contains_key("ingredients"));
    }

    #[test]
    fn test_blank_name_and_text() {
        let errors = validate_recipe_payload("  ", "", 10, &[1], &[ingredient(1, 1)]);
        assert!(errors.contains_key("name"));
        assert!(errors.contains_key("text"));
    }
}
