use crate::api::tags::TagResponse;
use crate::api::users::response::{subscribed_author_ids, user_response, UserResponse};
use crate::images;
use crate::models::{Recipe, Tag, User};
use crate::schema::{
    favorites, ingredients, recipe_ingredients, recipe_tags, shopping_carts, tags, users,
};
use diesel::prelude::*;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use utoipa::ToSchema;

/// Ingredient line in a recipe response, with the ingredient's name and
/// unit flattened in next to the amount.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeIngredientResponse {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

/// Full read representation of a recipe.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeResponse {
    pub id: i32,
    pub tags: Vec<TagResponse>,
    pub author: UserResponse,
    pub ingredients: Vec<RecipeIngredientResponse>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

/// Compact recipe shape used by favorites, the shopping cart and
/// subscription payloads.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ShortRecipeResponse {
    pub id: i32,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

pub fn short_recipe_response(recipe: &Recipe) -> ShortRecipeResponse {
    ShortRecipeResponse {
        id: recipe.id,
        name: recipe.name.clone(),
        image: images::media_url(&recipe.image),
        cooking_time: recipe.cooking_time,
    }
}

/// Builds read representations for a page of recipes with batched lookups
/// (authors, tags, ingredient lines, viewer associations) instead of
/// per-recipe queries.
pub fn load_recipe_responses(
    conn: &mut PgConnection,
    page: Vec<Recipe>,
    viewer: Option<&User>,
) -> QueryResult<Vec<RecipeResponse>> {
    if page.is_empty() {
        return Ok(Vec::new());
    }

    let recipe_ids: Vec<i32> = page.iter().map(|r| r.id).collect();
    let author_ids: Vec<i32> = page.iter().map(|r| r.author_id).collect();

    let authors: HashMap<i32, User> = users::table
        .filter(users::id.eq_any(&author_ids))
        .select(User::as_select())
        .load::<User>(conn)?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let mut tags_by_recipe: HashMap<i32, Vec<TagResponse>> = HashMap::new();
    let tag_rows: Vec<(i32, Tag)> = recipe_tags::table
        .inner_join(tags::table)
        .filter(recipe_tags::recipe_id.eq_any(&recipe_ids))
        .order(tags::name.asc())
        .select((recipe_tags::recipe_id, Tag::as_select()))
        .load(conn)?;
    for (recipe_id, tag) in tag_rows {
        tags_by_recipe
            .entry(recipe_id)
            .or_default()
            .push(TagResponse::from(tag));
    }

    let mut ingredients_by_recipe: HashMap<i32, Vec<RecipeIngredientResponse>> = HashMap::new();
    let ingredient_rows: Vec<(i32, i32, String, String, i32)> = recipe_ingredients::table
        .inner_join(ingredients::table)
        .filter(recipe_ingredients::recipe_id.eq_any(&recipe_ids))
        .order(ingredients::name.asc())
        .select((
            recipe_ingredients::recipe_id,
            ingredients::id,
            ingredients::name,
            ingredients::measurement_unit,
            recipe_ingredients::amount,
        ))
        .load(conn)?;
    for (recipe_id, id, name, measurement_unit, amount) in ingredient_rows {
        ingredients_by_recipe
            .entry(recipe_id)
            .or_default()
            .push(RecipeIngredientResponse {
                id,
                name,
                measurement_unit,
                amount,
            });
    }

    let viewer_id = viewer.map(|u| u.id);
    let favorited: HashSet<i32> = match viewer_id {
        Some(uid) => favorites::table
            .filter(favorites::user_id.eq(uid))
            .filter(favorites::recipe_id.eq_any(&recipe_ids))
            .select(favorites::recipe_id)
            .load::<i32>(conn)?
            .into_iter()
            .collect(),
        None => HashSet::new(),
    };
    let in_cart: HashSet<i32> = match viewer_id {
        Some(uid) => shopping_carts::table
            .filter(shopping_carts::user_id.eq(uid))
            .filter(shopping_carts::recipe_id.eq_any(&recipe_ids))
            .select(shopping_carts::recipe_id)
            .load::<i32>(conn)?
            .into_iter()
            .collect(),
        None => HashSet::new(),
    };
    let followed = subscribed_author_ids(conn, viewer_id, &author_ids)?;

    Ok(page
        .into_iter()
        .filter_map(|recipe| {
            let author = authors.get(&recipe.author_id)?;
            Some(RecipeResponse {
                id: recipe.id,
                tags: tags_by_recipe.remove(&recipe.id).unwrap_or_default(),
                author: user_response(author, followed.contains(&author.id)),
                ingredients: ingredients_by_recipe.remove(&recipe.id).unwrap_or_default(),
                is_favorited: favorited.contains(&recipe.id),
                is_in_shopping_cart: in_cart.contains(&recipe.id),
                name: recipe.name,
                image: images::media_url(&recipe.image),
                text: recipe.text,
                cooking_time: recipe.cooking_time,
            })
        })
        .collect())
}

/// Single-recipe convenience wrapper around [`load_recipe_responses`].
pub fn load_recipe_response(
    conn: &mut PgConnection,
    recipe: Recipe,
    viewer: Option<&User>,
) -> QueryResult<Option<RecipeResponse>> {
    Ok(load_recipe_responses(conn, vec![recipe], viewer)?.into_iter().next())
}
