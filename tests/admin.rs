use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use dgas_shared::Topic;
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

mod helpers;

#[tokio::test]
async fn test_reject_refunds_once() -> anyhow::Result<()> {
    let app = helpers::setup_test_app().await?;
    let (id, cookie) = app.customer("john", Some("12 Lake Road")).await?;
    let admin = app.root_admin().await?;

    let order = app
        .book(&cookie, "family", "morning", json!({ "method": "subscription" }))
        .await?;
    let order_id = order.body["id"].as_str().unwrap().to_owned();
    let status_uri = format!("/admin/orders/{order_id}/status");

    let rejected = app
        .post(&status_uri, &[&admin], json!({ "status": "Rejected" }))
        .await?;
    assert_eq!(rejected.status, StatusCode::OK, "{}", rejected.body);
    assert_eq!(rejected.body["status"], "Rejected");
    assert_eq!(rejected.body["refunded"], true);

    let ledger = app.get(&format!("/admin/subscriptions/{id}"), &[&admin]).await?;
    assert_eq!(ledger.body["barrels_remaining"], 1);

    let again = app
        .post(&status_uri, &[&admin], json!({ "status": "Rejected" }))
        .await?;
    assert_eq!(again.status, StatusCode::OK);

    let ledger = app.get("/subscription", &[&cookie]).await?;
    assert_eq!(ledger.body["barrels_remaining"], 1);

    let reopened = app
        .post(&status_uri, &[&admin], json!({ "status": "Confirmed" }))
        .await?;
    assert_eq!(reopened.status, StatusCode::CONFLICT);
    assert_eq!(reopened.body["error"], "invalid_transition");

    Ok(())
}

#[tokio::test]
async fn test_delivery_partner_closes_out_orders() -> anyhow::Result<()> {
    let app = helpers::setup_test_app().await?;
    let (_, cookie) = app.customer("john", Some("12 Lake Road")).await?;
    let admin = app.root_admin().await?;
    let partner = app.delivery_partner("dave").await?;

    let order = app
        .book(&cookie, "commercial", "afternoon", json!({ "method": "subscription" }))
        .await?;
    let order_id = order.body["id"].as_str().unwrap().to_owned();
    let delivered_uri = format!("/delivery/orders/{order_id}/delivered");

    // Not out for delivery yet.
    let early = app.post(&delivered_uri, &[&partner], json!({})).await?;
    assert_eq!(early.status, StatusCode::FORBIDDEN);

    for status in ["Confirmed", "Processing", "Out for Delivery"] {
        let response = app
            .post(
                &format!("/admin/orders/{order_id}/status"),
                &[&admin],
                json!({ "status": status }),
            )
            .await?;
        assert_eq!(response.status, StatusCode::OK, "{status}");
    }

    let queue = app.get("/delivery/orders", &[&partner]).await?;
    let queue = queue.body.as_array().unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0]["id"], order_id.as_str());
    assert_eq!(queue[0]["customer_name"], "john");

    let delivered = app.post(&delivered_uri, &[&partner], json!({})).await?;
    assert_eq!(delivered.status, StatusCode::OK);
    assert_eq!(delivered.body["status"], "Delivered");

    let queue = app.get("/delivery/orders", &[&partner]).await?;
    assert!(queue.body.as_array().unwrap().is_empty());

    let track = app.get("/track", &[&cookie]).await?;
    assert_eq!(track.body["order"]["status"], "Delivered");

    Ok(())
}

#[tokio::test]
async fn test_unknown_status_and_order() -> anyhow::Result<()> {
    let app = helpers::setup_test_app().await?;
    let admin = app.root_admin().await?;

    let response = app
        .post(
            "/admin/orders/01J0NOPE/status",
            &[&admin],
            json!({ "status": "Confirmed" }),
        )
        .await?;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .post(
            "/admin/orders/01J0NOPE/status",
            &[&admin],
            json!({ "status": "Lost" }),
        )
        .await?;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.body["error"], "invalid_status");

    Ok(())
}

#[tokio::test]
async fn test_inventory_is_clamped() -> anyhow::Result<()> {
    let app = helpers::setup_test_app().await?;
    let admin = app.root_admin().await?;

    let listed = app.get("/admin/inventory", &[&admin]).await?;
    let skus = listed
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|stock| stock["sku"].as_str().unwrap().to_owned())
        .collect::<Vec<_>>();
    assert_eq!(skus, vec!["single", "family", "commercial"]);

    let adjusted = app
        .post(
            "/admin/inventory/family/adjust",
            &[&admin],
            json!({ "delta": -150 }),
        )
        .await?;
    assert_eq!(adjusted.status, StatusCode::OK);
    assert_eq!(adjusted.body["count"], 0);

    let set = app
        .post("/admin/inventory/Single", &[&admin], json!({ "count": 7 }))
        .await?;
    assert_eq!(set.status, StatusCode::OK);
    assert_eq!(set.body["count"], 7);

    let negative = app
        .post("/admin/inventory/single", &[&admin], json!({ "count": -1 }))
        .await?;
    assert_eq!(negative.status, StatusCode::UNPROCESSABLE_ENTITY);

    let huge = app
        .post(
            "/admin/inventory/family/adjust",
            &[&admin],
            json!({ "delta": i64::MAX }),
        )
        .await?;
    assert_eq!(huge.status, StatusCode::UNPROCESSABLE_ENTITY);

    let listed = app.get("/admin/inventory", &[&admin]).await?;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.body[1]["count"], 0);

    let unknown = app
        .post("/admin/inventory/jumbo/adjust", &[&admin], json!({ "delta": 1 }))
        .await?;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_feeds_list_newest_first() -> anyhow::Result<()> {
    let app = helpers::setup_test_app().await?;
    let admin = app.root_admin().await?;
    let (_, cookie) = app.customer("john", None).await?;

    for title in ["Holiday hours", "New depot"] {
        let response = app
            .post(
                "/admin/notifications",
                &[&admin],
                json!({ "title": title, "description": "Details inside." }),
            )
            .await?;
        assert_eq!(response.status, StatusCode::CREATED);
    }

    let promo = app
        .post(
            "/admin/promotions",
            &[&admin],
            json!({ "title": "  10% off  ", "description": "This week only." }),
        )
        .await?;
    assert_eq!(promo.body["title"], "10% off");

    let empty = app
        .post(
            "/admin/promotions",
            &[&admin],
            json!({ "title": "   ", "description": "No title." }),
        )
        .await?;
    assert_eq!(empty.status, StatusCode::UNPROCESSABLE_ENTITY);

    let notifications = app.get("/notifications", &[&cookie]).await?;
    let titles = notifications
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["title"].as_str().unwrap().to_owned())
        .collect::<Vec<_>>();
    assert_eq!(titles, vec!["New depot", "Holiday hours"]);

    let promotions = app.get("/promotions", &[&cookie]).await?;
    assert_eq!(promotions.body.as_array().unwrap().len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_subscription_administration() -> anyhow::Result<()> {
    let app = helpers::setup_test_app().await?;
    let admin = app.root_admin().await?;
    let (id, cookie) = app.customer("john", Some("12 Lake Road")).await?;

    let deactivated = app
        .post(
            &format!("/admin/subscriptions/{id}/deactivate"),
            &[&admin],
            json!({}),
        )
        .await?;
    assert_eq!(deactivated.body["status"], "Inactive");

    let refused = app
        .book(&cookie, "single", "evening", json!({ "method": "subscription" }))
        .await?;
    assert_eq!(refused.status, StatusCode::CONFLICT);
    assert_eq!(refused.body["error"], "subscription_inactive");

    app.post(
        &format!("/admin/subscriptions/{id}/activate"),
        &[&admin],
        json!({}),
    )
    .await?;

    let renewed = app
        .post(
            &format!("/admin/subscriptions/{id}/renew"),
            &[&admin],
            json!({ "barrels": 5, "validity_days": 30 }),
        )
        .await?;
    assert_eq!(renewed.status, StatusCode::OK);
    assert_eq!(renewed.body["barrels_remaining"], 6);
    assert_eq!(renewed.body["status"], "Active");

    let missing = app
        .get("/admin/subscriptions/01J0NOBODY", &[&admin])
        .await?;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_event_stream_announces_changes() -> anyhow::Result<()> {
    let app = helpers::setup_test_app().await?;
    let admin = app.root_admin().await?;

    let request = Request::builder()
        .uri("/events")
        .header(header::COOKIE, &admin)
        .body(Body::empty())?;
    let response = app.router.clone().oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/event-stream"
    );

    let seq = app.state.state.changes.publish(Topic::Inventory, "Family");

    let mut body = response.into_body();
    let frame = tokio::time::timeout(Duration::from_secs(5), body.frame())
        .await?
        .ok_or_else(|| anyhow::anyhow!("event stream ended"))??;
    let data = frame
        .into_data()
        .map_err(|_| anyhow::anyhow!("expected a data frame"))?;
    let text = String::from_utf8(data.to_vec())?;

    assert!(text.contains("inventory"), "{text}");
    assert!(text.contains(&format!("\"seq\":{seq}")), "{text}");
    assert!(text.contains("\"id\":\"Family\""), "{text}");

    Ok(())
}
