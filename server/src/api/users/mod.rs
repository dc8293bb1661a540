pub mod avatar;
pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod me;
pub mod response;
pub mod set_password;
pub mod subscribe;
pub mod subscriptions;
pub mod update;

use crate::api::pagination::Paginated;
use crate::AppState;
use axum::routing::{get, post, put};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/users endpoints (mounted at /api/users)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list_users).post(create::create_user))
        .route("/subscriptions", get(subscriptions::list_subscriptions))
        .route("/me", get(me::get_me))
        .route(
            "/me/avatar",
            put(avatar::put_avatar).delete(avatar::delete_avatar),
        )
        .route("/set_password", post(set_password::set_password))
        .route(
            "/{id}",
            get(get::get_user)
                .put(update::update_user)
                .delete(delete::delete_user),
        )
        .route(
            "/{id}/subscribe",
            post(subscribe::post_subscribe).delete(subscribe::delete_subscribe),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        create::create_user,
        list::list_users,
        get::get_user,
        me::get_me,
        update::update_user,
        delete::delete_user,
        avatar::put_avatar,
        avatar::delete_avatar,
        set_password::set_password,
        subscribe::post_subscribe,
        subscribe::delete_subscribe,
        subscriptions::list_subscriptions,
    ),
    components(schemas(
        create::CreateUserRequest,
        create::RegistrationResponse,
        avatar::AvatarRequest,
        avatar::AvatarResponse,
        set_password::SetPasswordRequest,
        set_password::SetPasswordResponse,
        update::UpdateUserRequest,
        response::UserResponse,
        response::SubscribedUserResponse,
        Paginated<response::UserResponse>,
        Paginated<response::SubscribedUserResponse>,
    ))
)]
pub struct ApiDoc;
