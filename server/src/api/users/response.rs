use crate::api::recipes::response::{short_recipe_response, ShortRecipeResponse};
use crate::images;
use crate::models::{Recipe, User};
use crate::schema::{recipes, subscriptions};
use diesel::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use utoipa::ToSchema;

/// User shape returned by the profile endpoints and nested in recipes.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub email: String,
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    /// Whether the requesting user follows this user
    pub is_subscribed: bool,
    pub avatar: Option<String>,
}

pub fn user_response(user: &User, is_subscribed: bool) -> UserResponse {
    UserResponse {
        email: user.email.clone(),
        id: user.id,
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        is_subscribed,
        avatar: user.avatar.as_deref().map(images::media_url),
    }
}

/// True when `viewer` follows `author`; anonymous viewers follow nobody.
pub fn is_subscribed(
    conn: &mut PgConnection,
    viewer: Option<i32>,
    author: i32,
) -> QueryResult<bool> {
    let Some(viewer) = viewer else {
        return Ok(false);
    };
    diesel::select(diesel::dsl::exists(
        subscriptions::table
            .filter(subscriptions::user_id.eq(viewer))
            .filter(subscriptions::author_id.eq(author)),
    ))
    .get_result(conn)
}

/// Authors among `author_ids` that `viewer` follows, in one query.
pub fn subscribed_author_ids(
    conn: &mut PgConnection,
    viewer: Option<i32>,
    author_ids: &[i32],
) -> QueryResult<HashSet<i32>> {
    let Some(viewer) = viewer else {
        return Ok(HashSet::new());
    };
    let ids = subscriptions::table
        .filter(subscriptions::user_id.eq(viewer))
        .filter(subscriptions::author_id.eq_any(author_ids))
        .select(subscriptions::author_id)
        .load::<i32>(conn)?;
    Ok(ids.into_iter().collect())
}

/// Subscription payload: the followed user's profile plus their recipes.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubscribedUserResponse {
    pub email: String,
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    pub avatar: Option<String>,
    pub recipes: Vec<ShortRecipeResponse>,
    pub recipes_count: i64,
}

/// Builds the payload for a followed `author`; `recipes_limit` caps the
/// embedded recipe list without affecting `recipes_count`.
pub fn subscribed_user_response(
    conn: &mut PgConnection,
    author: &User,
    recipes_limit: Option<i64>,
) -> QueryResult<SubscribedUserResponse> {
    let mut query = recipes::table
        .filter(recipes::author_id.eq(author.id))
        .order(recipes::pub_date.desc())
        .into_boxed();
    if let Some(limit) = recipes_limit {
        query = query.limit(limit.max(0));
    }
    let author_recipes: Vec<Recipe> = query.select(Recipe::as_select()).load(conn)?;

    let recipes_count: i64 = recipes::table
        .filter(recipes::author_id.eq(author.id))
        .count()
        .get_result(conn)?;

    Ok(SubscribedUserResponse {
        email: author.email.clone(),
        id: author.id,
        username: author.username.clone(),
        first_name: author.first_name.clone(),
        last_name: author.last_name.clone(),
        is_subscribed: true,
        avatar: author.avatar.as_deref().map(images::media_url),
        recipes: author_recipes.iter().map(short_recipe_response).collect(),
        recipes_count,
    })
}
