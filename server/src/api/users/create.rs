use crate::api::{push_field_error, validation_failed, ErrorResponse, FieldErrors};
use crate::auth::hash_password;
use crate::db::DbPool;
use crate::get_conn;
use crate::models::{NewUser, User};
use crate::schema::users;
use crate::validation::{validate_email, validate_name, validate_password, validate_username};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

// Fields default to empty strings so a missing field surfaces as a
// field-keyed validation error rather than a deserialization failure.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RegistrationResponse {
    pub email: String,
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

fn validate_registration(req: &CreateUserRequest) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if let Err(message) = validate_email(&req.email) {
        push_field_error(&mut errors, "email", message);
    }
    if let Err(message) = validate_username(&req.username) {
        push_field_error(&mut errors, "username", message);
    }
    if let Err(message) = validate_name(&req.first_name) {
        push_field_error(&mut errors, "first_name", message);
    }
    if let Err(message) = validate_name(&req.last_name) {
        push_field_error(&mut errors, "last_name", message);
    }
    if let Err(message) = validate_password(&req.password) {
        push_field_error(&mut errors, "password", message);
    }
    errors
}

#[utoipa::path(
    post,
    path = "/api/users",
    tag = "users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created successfully", body = RegistrationResponse),
        (status = 400, description = "Validation error")
    )
)]
pub async fn create_user(
    State(pool): State<Arc<DbPool>>,
    Json(req): Json<CreateUserRequest>,
) -> impl IntoResponse {
    let mut errors = validate_registration(&req);

    let mut conn = get_conn!(pool);

    // Pre-checks give field-keyed errors; the unique constraints below stay
    // as the race backstop.
    if !errors.contains_key("username") {
        match diesel::select(diesel::dsl::exists(
            users::table.filter(users::username.eq(&req.username)),
        ))
        .get_result::<bool>(&mut conn)
        {
            Ok(true) => push_field_error(
                &mut errors,
                "username",
                "A user with that username already exists.".to_string(),
            ),
            Ok(false) => {}
            Err(e) => {
                tracing::error!("Failed to check username: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: "Failed to create user".to_string(),
                    }),
                )
                    .into_response();
            }
        }
    }
    if !errors.contains_key("email") {
        match diesel::select(diesel::dsl::exists(
            users::table.filter(users::email.eq(&req.email)),
        ))
        .get_result::<bool>(&mut conn)
        {
            Ok(true) => push_field_error(
                &mut errors,
                "email",
                "A user with that email already exists.".to_string(),
            ),
            Ok(false) => {}
            Err(e) => {
                tracing::error!("Failed to check email: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: "Failed to create user".to_string(),
                    }),
                )
                    .into_response();
            }
        }
    }

    if !errors.is_empty() {
        return validation_failed(errors);
    }

    let password_hash = match hash_password(&req.password) {
        Ok(h) => h,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to hash password".to_string(),
                }),
            )
                .into_response()
        }
    };

    let new_user = NewUser {
        username: &req.username,
        email: &req.email,
        first_name: &req.first_name,
        last_name: &req.last_name,
        password_hash: &password_hash,
    };

    let user: User = match diesel::insert_into(users::table)
        .values(&new_user)
        .returning(User::as_returning())
        .get_result(&mut conn)
    {
        Ok(u) => u,
        Err(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        )) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "A user with that username or email already exists".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Failed to create user: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to create user".to_string(),
                }),
            )
                .into_response();
        }
    };

    (
        StatusCode::CREATED,
        Json(RegistrationResponse {
            email: user.email,
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: &str, email: &str, password: &str) -> CreateUserRequest {
        CreateUserRequest {
            email: email.to_string(),
            username: username.to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_valid_registration_passes() {
        let errors = validate_registration(&request("ada", "ada@example.com", "p4ssw0rd!"));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_reserved_username_is_field_keyed() {
        let errors = validate_registration(&request("Me", "ada@example.com", "p4ssw0rd!"));
        assert!(errors.contains_key("username"));
        assert!(!errors.contains_key("email"));
    }

    #[test]
    fn test_missing_fields_collect_per_field() {
        let errors = validate_registration(&CreateUserRequest {
            email: String::new(),
            username: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            password: String::new(),
        });
        for field in ["email", "username", "first_name", "last_name", "password"] {
            assert!(errors.contains_key(field), "missing error for {}", field);
        }
    }

    #[test]
    fn test_numeric_password_rejected() {
        let errors = validate_registration(&request("ada", "ada@example.com", "12345678"));
        assert!(errors.contains_key("password"));
    }
}
