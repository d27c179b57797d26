use dgas_shared::{
    Error, Topic,
    identity::Role,
    order::{OrderStatus, Payment},
};

use super::Order;
use crate::repository;

/// Decides whether `actor` may move an order from `from` to `to`.
///
/// `Ok(false)` means the order is already there and nothing should
/// happen. Orders only move forward along the fulfilment path, possibly
/// skipping steps. Delivered and Rejected are final, and an order can
/// only be rejected before processing starts. Delivery partners can only
/// close out an order that is out for delivery.
pub fn check_transition(
    from: OrderStatus,
    to: OrderStatus,
    actor: Role,
) -> dgas_shared::Result<bool> {
    match actor {
        Role::Customer => return Err(Error::AccessDenied),
        Role::DeliveryPartner => {
            let allowed = to == OrderStatus::Delivered
                && matches!(from, OrderStatus::OutForDelivery | OrderStatus::Delivered);

            if !allowed {
                return Err(Error::AccessDenied);
            }
        }
        Role::Admin => {}
    }

    if from == to {
        return Ok(false);
    }

    if from.is_terminal() {
        return Err(Error::InvalidTransition { from, to });
    }

    let allowed = match (from.step(), to.step()) {
        (_, None) => matches!(from, OrderStatus::PendingApproval | OrderStatus::Confirmed),
        (Some(current), Some(next)) => next > current,
        (None, Some(_)) => false,
    };

    if !allowed {
        return Err(Error::InvalidTransition { from, to });
    }

    Ok(true)
}

impl super::Command {
    /// Applies a status change requested by staff. `status` is either a
    /// variant name or its display label.
    ///
    /// Rejecting a subscription order credits its barrel back in the same
    /// transaction. The refund is keyed on the order's `refunded` flag, so
    /// it happens at most once however often the rejection is repeated.
    pub async fn set_status(
        &self,
        order_id: impl AsRef<str>,
        status: impl AsRef<str>,
        actor: Role,
    ) -> dgas_shared::Result<Order> {
        let order_id = order_id.as_ref();
        let to = OrderStatus::parse(status.as_ref())?;

        // The status update only lands if nobody moved the order since it
        // was read. States only move forward, so this loop ends.
        loop {
            let mut conn = self.read_db.acquire().await?;
            let Some(current) = repository::find(&mut conn, order_id).await? else {
                dgas_shared::not_found!("order");
            };
            drop(conn);

            let from = current.status.0;
            if !check_transition(from, to, actor)? {
                return Ok(current.into());
            }

            let mut tx = self.write_db.begin().await?;

            if !repository::update_status(&mut tx, order_id, from, to).await? {
                tracing::debug!(order_id, %from, %to, "order moved concurrently, retrying");
                continue;
            }

            let mut refunded = false;
            if to == OrderStatus::Rejected
                && current.payment.0 == Payment::Subscription
                && repository::mark_refunded(&mut tx, order_id).await?
            {
                dgas_subscription::refund_barrel(&mut tx, &current.account_id).await?;
                refunded = true;
            }

            let Some(updated) = repository::find(&mut tx, order_id).await? else {
                dgas_shared::not_found!("order");
            };

            tx.commit().await?;

            self.changes.publish(Topic::Orders, order_id);

            tracing::info!(order_id, %from, %to, %actor, refunded, "order status changed");

            return Ok(updated.into());
        }
    }
}
