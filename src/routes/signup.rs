use axum::{Json, extract::State, http::StatusCode};
use dgas_identity::{AdminSignupInput, SignupInput};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::error::AppResult;

#[derive(Deserialize)]
pub struct SignupForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: String,
}

impl From<SignupForm> for SignupInput {
    fn from(form: SignupForm) -> Self {
        SignupInput {
            email: form.email,
            password: form.password,
            full_name: form.full_name,
        }
    }
}

#[derive(Deserialize)]
pub struct AdminSignupForm {
    pub email: String,
    pub password: String,
    pub employee_id: String,
    pub signup_code: String,
}

#[derive(Serialize)]
pub struct Created {
    pub id: String,
}

/// POST /signup
pub async fn customer(
    State(app): State<AppState>,
    Json(form): Json<SignupForm>,
) -> AppResult<(StatusCode, Json<Created>)> {
    let id = app.identity.signup_customer(form.into()).await?;

    Ok((StatusCode::CREATED, Json(Created { id })))
}

/// POST /delivery/signup
pub async fn delivery_partner(
    State(app): State<AppState>,
    Json(form): Json<SignupForm>,
) -> AppResult<(StatusCode, Json<Created>)> {
    let id = app.identity.signup_delivery_partner(form.into()).await?;

    Ok((StatusCode::CREATED, Json(Created { id })))
}

/// POST /admin/signup
pub async fn admin(
    State(app): State<AppState>,
    Json(form): Json<AdminSignupForm>,
) -> AppResult<(StatusCode, Json<Created>)> {
    let id = app
        .identity
        .signup_admin(AdminSignupInput {
            email: form.email,
            password: form.password,
            employee_id: form.employee_id,
            signup_code: form.signup_code,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(Created { id })))
}
