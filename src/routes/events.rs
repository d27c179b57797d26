use std::convert::Infallible;

use axum::{
    Extension,
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use dgas_identity::Session;
use dgas_shared::{Change, Topic, identity::Role};
use futures::{Stream, stream};
use tokio::sync::broadcast::error::RecvError;

use super::AppState;

/// GET /events - Server-sent change feed.
///
/// Each event names the topic that changed; clients refetch the matching
/// view and keep the highest `seq` seen. A `resync` event means events
/// were dropped and every view should be refetched.
pub async fn stream(
    State(app): State<AppState>,
    Extension(session): Extension<Session>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = app.state.changes.subscribe();
    let role = session.role;

    tracing::debug!(account_id = %session.account_id, "change feed opened");

    let events = stream::unfold(receiver, move |mut receiver| async move {
        loop {
            let event = match receiver.recv().await {
                Ok(change) => match visible(change, role) {
                    Some(change) => to_event(&change),
                    None => continue,
                },
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "change feed lagged");
                    Event::default().event("resync").data(skipped.to_string())
                }
                Err(RecvError::Closed) => return None,
            };

            return Some((Ok(event), receiver));
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Customers see that orders moved, not which ones; inventory is staff
/// only.
fn visible(change: Change, role: Role) -> Option<Change> {
    match (role, change.topic) {
        (Role::Customer, Topic::Inventory) => None,
        (Role::Customer, Topic::Orders) => Some(Change {
            id: String::new(),
            ..change
        }),
        _ => Some(change),
    }
}

fn to_event(change: &Change) -> Event {
    let event = Event::default()
        .event(change.topic.as_ref())
        .id(change.seq.to_string());

    match event.json_data(change) {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!(err = %e, seq = change.seq, "change could not be encoded");
            Event::default().event("resync")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(topic: Topic) -> Change {
        Change {
            seq: 7,
            topic,
            id: "01J0ORDER".to_owned(),
        }
    }

    #[test]
    fn test_customers_do_not_see_order_ids_or_stock() {
        let orders = visible(change(Topic::Orders), Role::Customer).unwrap();
        assert_eq!(orders.id, "");
        assert_eq!(orders.seq, 7);

        assert!(visible(change(Topic::Inventory), Role::Customer).is_none());
        assert!(visible(change(Topic::Promotions), Role::Customer).is_some());
    }

    #[test]
    fn test_staff_see_everything() {
        let orders = visible(change(Topic::Orders), Role::Admin).unwrap();
        assert_eq!(orders.id, "01J0ORDER");
        assert!(visible(change(Topic::Inventory), Role::DeliveryPartner).is_some());
    }
}
