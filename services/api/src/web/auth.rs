//! services/api/src/web/auth.rs
//!
//! Registration, login, and the current-user profile endpoints. Successful
//! auth hands back a mock bearer token of the form `mock-token-<user id>`.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use goggins_core::domain::{Character, User};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::password;
use crate::web::state::AppState;

/// New accounts start with a small grubstake so the reward economy is usable
/// from day one.
const SIGNUP_BONUS: f64 = 5.0;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub password: Option<String>,
    #[serde(default, alias = "apiKey")]
    pub api_key: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: Option<String>,
    #[serde(default, alias = "apiKey")]
    pub api_key: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Serialize, ToSchema)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub api_key: Option<String>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username,
            api_key: user.api_key,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateMeRequest {
    #[serde(default, alias = "apiKey")]
    pub api_key: Option<String>,
}

fn auth_response(user: User) -> AuthResponse {
    AuthResponse {
        token: format!("mock-token-{}", user.id),
        user: user.into(),
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/register - Create a new user account
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User created", body = AuthResponse),
        (status = 400, description = "Username already exists"),
        (status = 500, description = "Internal server error")
    ),
    tag = "auth"
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let password_hash = match &req.password {
        Some(plain) => Some(password::hash(plain)?),
        None => None,
    };

    let user = state
        .db
        .create_user(&req.username, password_hash.as_deref(), req.api_key.as_deref())
        .await?;

    // Fund the new account.
    state
        .db
        .put_character(
            user.id,
            Character {
                spent: 0.0,
                bonuses: SIGNUP_BONUS,
            },
        )
        .await?;

    Ok(Json(auth_response(user)))
}

/// POST /auth/login - Log in with an existing account
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let credentials = state.db.get_user_credentials(&req.username).await?;

    // A wrong password is indistinguishable from an unknown user on purpose.
    if let Some(digest) = &credentials.password_hash {
        let supplied = req.password.as_deref().unwrap_or("");
        if !password::verify(supplied, digest) {
            return Err(ApiError::Port(goggins_core::ports::PortError::NotFound(
                "User not found".to_string(),
            )));
        }
    }

    let user = match req.api_key.as_deref() {
        Some(key) => state.db.set_user_api_key(credentials.id, Some(key)).await?,
        None => credentials.into_user(),
    };

    Ok(Json(auth_response(user)))
}

/// GET /auth/me - Current user's profile
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current profile", body = UserProfile),
        (status = 401, description = "Not authenticated")
    ),
    tag = "auth"
)]
pub async fn me_handler(Extension(user): Extension<User>) -> impl IntoResponse {
    Json(UserProfile::from(user))
}

/// PUT /auth/me - Update the current user's stored API key
#[utoipa::path(
    put,
    path = "/auth/me",
    request_body = UpdateMeRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserProfile),
        (status = 401, description = "Not authenticated")
    ),
    tag = "auth"
)]
pub async fn update_me_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(req): Json<UpdateMeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = match req.api_key.as_deref() {
        Some(key) => state.db.set_user_api_key(user.id, Some(key)).await?,
        None => user,
    };
    Ok((StatusCode::OK, Json(UserProfile::from(updated))))
}
