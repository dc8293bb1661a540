pub mod create;
pub mod delete;
pub mod download_shopping_cart;
pub mod favorite;
pub mod get;
pub mod get_link;
pub mod list;
pub mod response;
pub mod shopping_cart;
pub mod update;

use crate::api::pagination::Paginated;
use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/recipes endpoints (mounted at /api/recipes)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list_recipes).post(create::create_recipe))
        .route(
            "/download_shopping_cart",
            get(download_shopping_cart::download_shopping_cart),
        )
        .route(
            "/{id}",
            get(get::get_recipe)
                .patch(update::update_recipe)
                .delete(delete::delete_recipe),
        )
        .route(
            "/{id}/favorite",
            post(favorite::post_favorite).delete(favorite::delete_favorite),
        )
        .route(
            "/{id}/shopping_cart",
            post(shopping_cart::post_shopping_cart).delete(shopping_cart::delete_shopping_cart),
        )
        .route("/{id}/get-link", get(get_link::get_link))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        create::create_recipe,
        list::list_recipes,
        get::get_recipe,
        update::update_recipe,
        delete::delete_recipe,
        favorite::post_favorite,
        favorite::delete_favorite,
        shopping_cart::post_shopping_cart,
        shopping_cart::delete_shopping_cart,
        download_shopping_cart::download_shopping_cart,
        get_link::get_link,
    ),
    components(schemas(
        create::CreateRecipeRequest,
        create::IngredientAmount,
        update::UpdateRecipeRequest,
        get_link::ShortLinkResponse,
        response::RecipeResponse,
        response::RecipeIngredientResponse,
        response::ShortRecipeResponse,
        Paginated<response::RecipeResponse>,
    ))
)]
pub struct ApiDoc;
