use axum::{Extension, Json, extract::State, http::StatusCode};
use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use dgas_identity::Session;
use dgas_order::{BookingInput, CardInput, Order};
use dgas_shared::{Error, order::card_total};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::error::AppResult;

pub const DRAFT_COOKIE_NAME: &str = "booking_draft";

/// Draft plus the figures shown before payment. Nothing here is trusted
/// on the way back; the order is priced again when it is created.
#[derive(Serialize)]
pub struct DraftView {
    #[serde(flatten)]
    pub booking: BookingInput,
    pub cylinder_label: &'static str,
    pub slot_window: &'static str,
    pub card_total: i64,
}

impl From<BookingInput> for DraftView {
    fn from(booking: BookingInput) -> Self {
        Self {
            cylinder_label: booking.cylinder_type.label(),
            slot_window: booking.delivery_slot.window(),
            card_total: card_total(booking.cylinder_type, booking.delivery_slot),
            booking,
        }
    }
}

fn encode_draft(booking: &BookingInput) -> anyhow::Result<String> {
    Ok(URL_SAFE_NO_PAD.encode(serde_json::to_vec(booking)?))
}

fn decode_draft(value: &str) -> Option<BookingInput> {
    let bytes = URL_SAFE_NO_PAD.decode(value).ok()?;

    serde_json::from_slice(&bytes).ok()
}

fn read_draft(jar: &CookieJar) -> Option<BookingInput> {
    jar.get(DRAFT_COOKIE_NAME)
        .and_then(|cookie| decode_draft(cookie.value()))
}

fn draft_removal() -> Cookie<'static> {
    Cookie::build((DRAFT_COOKIE_NAME, "")).path("/").build()
}

/// POST /booking - keep the selection until payment.
pub async fn save_draft(
    jar: CookieJar,
    Json(booking): Json<BookingInput>,
) -> AppResult<(CookieJar, Json<DraftView>)> {
    booking.check()?;

    let cookie = Cookie::build((DRAFT_COOKIE_NAME, encode_draft(&booking)?))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::minutes(30))
        .build();

    Ok((jar.add(cookie), Json(booking.into())))
}

/// GET /booking
pub async fn draft(jar: CookieJar) -> AppResult<Json<DraftView>> {
    let Some(booking) = read_draft(&jar) else {
        return Err(Error::NotFound("booking draft".to_owned()).into());
    };

    Ok(Json(booking.into()))
}

#[derive(Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum PaymentForm {
    Subscription,
    Card { card: CardInput },
}

/// POST /payment - turn the draft into an order.
pub async fn payment(
    State(app): State<AppState>,
    Extension(session): Extension<Session>,
    jar: CookieJar,
    Json(form): Json<PaymentForm>,
) -> AppResult<(StatusCode, CookieJar, Json<Order>)> {
    let Some(booking) = read_draft(&jar) else {
        return Err(Error::User("No booking in progress, pick a cylinder first".to_owned()).into());
    };

    let order = match form {
        PaymentForm::Subscription => {
            app.order_command
                .book_with_subscription(&session.account_id, booking)
                .await?
        }
        PaymentForm::Card { card } => {
            app.order_command
                .checkout(&session.account_id, booking, card)
                .await?
        }
    };

    Ok((StatusCode::CREATED, jar.remove(draft_removal()), Json(order)))
}
