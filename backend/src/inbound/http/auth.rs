//! Authentication API handlers.
//!
//! ```text
//! POST /api/v1/auth/register {"name":"Ada","email":"ada@example.com","password":"correct-horse"}
//! POST /api/v1/auth/login    {"email":"ada@example.com","password":"correct-horse"}
//! ```
//!
//! A successful register or login establishes the cookie session; the
//! external-token route does the same for provider-verified identities.

use actix_web::{HttpResponse, get, post, web};
use serde::Deserialize;

use crate::domain::ports::UserProfilePayload;
use crate::domain::{EmailAddress, Error, UserName};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, invalid_field_error};

const PASSWORD_MIN: usize = 8;

/// Registration request body.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login request body.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

/// External identity token body.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenBody {
    pub token: String,
}

fn parse_email(raw: &str) -> Result<EmailAddress, Error> {
    EmailAddress::new(raw).map_err(|err| invalid_field_error(FieldName::new("email"), err))
}

fn check_password(raw: &str) -> Result<(), Error> {
    if raw.chars().count() < PASSWORD_MIN {
        return Err(invalid_field_error(
            FieldName::new("password"),
            format!("password must be at least {PASSWORD_MIN} characters"),
        ));
    }
    Ok(())
}

/// Register a local account and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterBody,
    responses(
        (status = 201, description = "Account created", body = UserProfilePayload),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email already registered", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/auth/register")]
pub async fn register(
    session: SessionContext,
    state: web::Data<HttpState>,
    payload: web::Json<RegisterBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let name = UserName::new(&body.name)
        .map_err(|err| invalid_field_error(FieldName::new("name"), err))?;
    let email = parse_email(&body.email)?;
    check_password(&body.password)?;

    let profile = state
        .auth
        .register(crate::domain::ports::RegisterRequest {
            name,
            email,
            password: body.password,
        })
        .await?;
    session.persist_user(&profile.id)?;
    Ok(HttpResponse::Created().json(profile))
}

/// Authenticate local credentials and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginBody,
    responses(
        (status = 200, description = "Login success", body = UserProfilePayload),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    session: SessionContext,
    state: web::Data<HttpState>,
    payload: web::Json<LoginBody>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let email = parse_email(&body.email)?;
    let profile = state
        .auth
        .login(crate::domain::ports::LoginRequest {
            email,
            password: body.password,
        })
        .await?;
    session.persist_user(&profile.id)?;
    Ok(HttpResponse::Ok().json(profile))
}

/// Authenticate a provider-verified token and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/token",
    request_body = TokenBody,
    responses(
        (status = 200, description = "Login success", body = UserProfilePayload),
        (status = 401, description = "Token rejected", body = Error),
        (status = 503, description = "Identity provider unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "loginWithToken",
    security([])
)]
#[post("/auth/token")]
pub async fn token(
    session: SessionContext,
    state: web::Data<HttpState>,
    payload: web::Json<TokenBody>,
) -> ApiResult<HttpResponse> {
    let profile = state.auth.login_external(&payload.token).await?;
    session.persist_user(&profile.id)?;
    Ok(HttpResponse::Ok().json(profile))
}

/// End the current session.
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 204, description = "Session ended"),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/auth/logout")]
pub async fn logout(session: SessionContext) -> ApiResult<HttpResponse> {
    session.clear();
    Ok(HttpResponse::NoContent().finish())
}

/// Profile behind the current session.
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserProfilePayload),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["auth"],
    operation_id = "currentUser"
)]
#[get("/auth/me")]
pub async fn me(
    session: SessionContext,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<UserProfilePayload>> {
    let actor = session.require_user_id()?;
    let profile = state.auth.current_user(actor).await?;
    Ok(web::Json(profile))
}
