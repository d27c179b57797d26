use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use dgas_identity::Session;
use dgas_shared::{Error, identity::Role};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{config::JwtConfig, error::AppError, routes::AppState};

pub const AUTH_COOKIE_NAME: &str = "auth_token";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    aud: String,
    exp: u64,
    iat: u64,
    iss: String,
    /// Account id.
    pub sub: String,
    /// Session id. The session row decides whether the token still counts.
    pub sid: String,
    pub role: Role,
}

pub fn generate_token(config: &JwtConfig, session: &Session) -> anyhow::Result<String> {
    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
    let claims = Claims {
        aud: config.audience.to_owned(),
        exp: u64::try_from(session.expire_at)?,
        iat: now,
        iss: config.issuer.to_owned(),
        sub: session.account_id.to_owned(),
        sid: session.id.to_owned(),
        role: session.role,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )?;

    Ok(token)
}

pub fn decode_token(config: &JwtConfig, token: &str) -> anyhow::Result<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[config.issuer.to_owned()]);
    validation.set_audience(&[config.audience.to_owned()]);

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}

pub fn build_cookie<'a>(config: &JwtConfig, session: &Session) -> anyhow::Result<Cookie<'a>> {
    let token = generate_token(config, session)?;

    Ok(Cookie::build((AUTH_COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .build())
}

/// Cookie that, once removed from the jar, clears the session cookie.
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE_NAME, "")).path("/").build()
}

/// Resolves the live session carried by the request cookie, if any.
pub async fn current_session(
    state: &AppState,
    jar: &CookieJar,
) -> Result<Option<Session>, AppError> {
    let Some(token) = jar.get(AUTH_COOKIE_NAME).map(|cookie| cookie.value()) else {
        return Ok(None);
    };

    let claims = match decode_token(&state.config.jwt, token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::warn!(err = %e, "invalid auth token");
            return Ok(None);
        }
    };

    let Some(session) = state.identity.session(&claims.sid).await? else {
        return Ok(None);
    };

    if session.account_id != claims.sub {
        tracing::warn!(session_id = %session.id, "auth token subject does not own its session");
        return Ok(None);
    }

    Ok(Some(session))
}

/// Loads the session behind the `auth_token` cookie into the request
/// extensions. Requests without a live session get 401.
pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(session) = current_session(&state, &jar).await? else {
        return Err(AppError::Unauthenticated);
    };

    tracing::debug!(account_id = %session.account_id, role = %session.role, "authenticated");
    req.extensions_mut().insert(session);

    Ok(next.run(req).await)
}

async fn require_role(role: Role, req: Request, next: Next) -> Result<Response, AppError> {
    let Some(session) = req.extensions().get::<Session>() else {
        return Err(AppError::Unauthenticated);
    };

    if session.role != role {
        tracing::warn!(
            account_id = %session.account_id,
            role = %session.role,
            required = %role,
            "role not allowed on route"
        );

        return Err(Error::AccessDenied.into());
    }

    Ok(next.run(req).await)
}

pub async fn require_customer(req: Request, next: Next) -> Result<Response, AppError> {
    require_role(Role::Customer, req, next).await
}

pub async fn require_delivery_partner(req: Request, next: Next) -> Result<Response, AppError> {
    require_role(Role::DeliveryPartner, req, next).await
}

pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    require_role(Role::Admin, req, next).await
}
