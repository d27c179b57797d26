use axum::{
    Extension, Json,
    extract::State,
    http::{HeaderMap, StatusCode, header::USER_AGENT},
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use dgas_identity::{LoginInput, Session};
use dgas_shared::{Error, identity::Role};
use serde::Deserialize;

use super::AppState;
use crate::{
    auth::{build_cookie, current_session, removal_cookie},
    error::{AppError, AppResult},
};

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// POST /login
pub async fn customer(
    State(app): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    Json(form): Json<LoginForm>,
) -> AppResult<Response> {
    login_through(app, jar, headers, form, Role::Customer).await
}

/// POST /delivery/login
pub async fn delivery_partner(
    State(app): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    Json(form): Json<LoginForm>,
) -> AppResult<Response> {
    login_through(app, jar, headers, form, Role::DeliveryPartner).await
}

/// POST /admin/login
pub async fn admin(
    State(app): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    Json(form): Json<LoginForm>,
) -> AppResult<Response> {
    login_through(app, jar, headers, form, Role::Admin).await
}

async fn login_through(
    app: AppState,
    jar: CookieJar,
    headers: HeaderMap,
    form: LoginForm,
    portal: Role,
) -> AppResult<Response> {
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_owned();

    let result = app
        .identity
        .login(LoginInput {
            email: form.email,
            password: form.password,
            portal,
            user_agent,
        })
        .await;

    match result {
        Ok(session) => {
            let cookie = build_cookie(&app.config.jwt, &session)?;

            Ok((jar.add(cookie), Json(session)).into_response())
        }
        Err(Error::AccessDenied) => {
            // Nothing from a refused portal login may survive in the browser.
            if let Some(previous) = current_session(&app, &jar).await? {
                app.identity.logout(&previous.id).await?;
            }

            Ok((
                jar.remove(removal_cookie()),
                AppError::from(Error::AccessDenied),
            )
                .into_response())
        }
        Err(err) => Err(err.into()),
    }
}

/// POST /logout
pub async fn logout(
    State(app): State<AppState>,
    Extension(session): Extension<Session>,
    jar: CookieJar,
) -> AppResult<(CookieJar, StatusCode)> {
    app.identity.logout(&session.id).await?;

    Ok((jar.remove(removal_cookie()), StatusCode::NO_CONTENT))
}

/// POST /session/refresh
pub async fn refresh(
    State(app): State<AppState>,
    Extension(session): Extension<Session>,
    jar: CookieJar,
) -> AppResult<Response> {
    match app.identity.refresh(&session.id).await {
        Ok(session) => {
            let cookie = build_cookie(&app.config.jwt, &session)?;

            Ok((jar.add(cookie), Json(session)).into_response())
        }
        Err(Error::AccessDenied) => Ok((
            jar.remove(removal_cookie()),
            AppError::from(Error::AccessDenied),
        )
            .into_response()),
        Err(err) => Err(err.into()),
    }
}
