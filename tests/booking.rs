use axum::http::StatusCode;
use serde_json::json;

mod helpers;

#[tokio::test]
async fn test_subscription_booking_flow() -> anyhow::Result<()> {
    let app = helpers::setup_test_app().await?;
    let (id, cookie) = app.customer("john", Some("12 Lake Road")).await?;

    let draft = app
        .post(
            "/booking",
            &[&cookie],
            json!({
                "cylinder_type": "family",
                "delivery_date": helpers::tomorrow(),
                "delivery_slot": "morning",
            }),
        )
        .await?;
    assert_eq!(draft.status, StatusCode::OK);
    assert_eq!(draft.body["card_total"], 900);
    let draft_cookie = draft.cookie("booking_draft").unwrap();

    let shown = app.get("/booking", &[&cookie, &draft_cookie]).await?;
    assert_eq!(shown.status, StatusCode::OK);
    assert_eq!(shown.body["cylinder_type"], "family");
    assert_eq!(shown.body["slot_window"], "10 AM - 12 PM");

    let paid = app
        .post(
            "/payment",
            &[&cookie, &draft_cookie],
            json!({ "method": "subscription" }),
        )
        .await?;
    assert_eq!(paid.status, StatusCode::CREATED, "{}", paid.body);
    assert_eq!(paid.body["status"], "PendingApproval");
    assert_eq!(paid.body["payment"], "Subscription");
    assert_eq!(paid.body["total"], 0);
    assert_eq!(paid.body["account_id"], id.as_str());
    assert_eq!(paid.body["address"], "12 Lake Road");
    assert!(paid.body["order_number"].as_str().unwrap().starts_with("DGAS"));
    assert!(paid.cleared("booking_draft"));

    let ledger = app.get("/subscription", &[&cookie]).await?;
    assert_eq!(ledger.body["barrels_remaining"], 0);

    let track = app.get("/track", &[&cookie]).await?;
    assert_eq!(track.body["order"]["id"], paid.body["id"]);
    assert_eq!(track.body["steps"][0]["reached"], true);
    assert_eq!(track.body["steps"][1]["reached"], false);

    let history = app.get("/profile/orders", &[&cookie]).await?;
    assert_eq!(history.body.as_array().unwrap().len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_booking_without_credit_creates_no_order() -> anyhow::Result<()> {
    let app = helpers::setup_test_app().await?;
    let (_, cookie) = app.customer("john", Some("12 Lake Road")).await?;

    let first = app
        .book(&cookie, "single", "evening", json!({ "method": "subscription" }))
        .await?;
    assert_eq!(first.status, StatusCode::CREATED);

    let second = app
        .book(&cookie, "single", "evening", json!({ "method": "subscription" }))
        .await?;
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert_eq!(second.body["error"], "insufficient_credit");

    let history = app.get("/profile/orders", &[&cookie]).await?;
    assert_eq!(history.body.as_array().unwrap().len(), 1);

    let ledger = app.get("/subscription", &[&cookie]).await?;
    assert_eq!(ledger.body["barrels_remaining"], 0);

    Ok(())
}

#[tokio::test]
async fn test_card_checkout_leaves_ledger_untouched() -> anyhow::Result<()> {
    let app = helpers::setup_test_app().await?;
    let (_, cookie) = app.customer("john", Some("12 Lake Road")).await?;

    let paid = app
        .book(
            &cookie,
            "single",
            "morning",
            json!({
                "method": "card",
                "card": {
                    "name": "John Doe",
                    "number": "4242 4242 4242 4242",
                    "expiry": "12/99",
                    "cvv": "123",
                },
            }),
        )
        .await?;

    assert_eq!(paid.status, StatusCode::CREATED, "{}", paid.body);
    assert_eq!(paid.body["status"], "Confirmed");
    assert_eq!(paid.body["payment"], "Card");
    assert_eq!(paid.body["total"], 500);

    let ledger = app.get("/subscription", &[&cookie]).await?;
    assert_eq!(ledger.body["barrels_remaining"], 1);

    Ok(())
}

#[tokio::test]
async fn test_invalid_card_is_refused() -> anyhow::Result<()> {
    let app = helpers::setup_test_app().await?;
    let (_, cookie) = app.customer("john", Some("12 Lake Road")).await?;

    let paid = app
        .book(
            &cookie,
            "family",
            "evening",
            json!({
                "method": "card",
                "card": { "name": "John Doe", "number": "4242", "expiry": "12/99", "cvv": "123" },
            }),
        )
        .await?;

    assert_eq!(paid.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(paid.body["error"], "validation_failed");

    let history = app.get("/profile/orders", &[&cookie]).await?;
    assert!(history.body.as_array().unwrap().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_booking_requires_address() -> anyhow::Result<()> {
    let app = helpers::setup_test_app().await?;
    let (_, cookie) = app.customer("john", None).await?;

    let paid = app
        .book(&cookie, "family", "morning", json!({ "method": "subscription" }))
        .await?;

    assert_eq!(paid.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(paid.body["error"], "address_missing");

    let ledger = app.get("/subscription", &[&cookie]).await?;
    assert_eq!(ledger.body["barrels_remaining"], 1);

    Ok(())
}

#[tokio::test]
async fn test_payment_needs_a_draft() -> anyhow::Result<()> {
    let app = helpers::setup_test_app().await?;
    let (_, cookie) = app.customer("john", Some("12 Lake Road")).await?;

    let response = app
        .post("/payment", &[&cookie], json!({ "method": "subscription" }))
        .await?;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app.get("/booking", &[&cookie]).await?;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_draft_in_the_past_is_refused() -> anyhow::Result<()> {
    let app = helpers::setup_test_app().await?;
    let (_, cookie) = app.customer("john", Some("12 Lake Road")).await?;

    let response = app
        .post(
            "/booking",
            &[&cookie],
            json!({
                "cylinder_type": "family",
                "delivery_date": "2000-01-01",
                "delivery_slot": "morning",
            }),
        )
        .await?;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.cookie("booking_draft").is_none());

    Ok(())
}
