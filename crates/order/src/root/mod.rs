use std::ops::Deref;

use dgas_shared::order::{CylinderType, DeliverySlot, OrderStatus, Payment};
use serde::Serialize;

use crate::repository::OrderRow;

mod book;
mod status;

pub use book::{BookingInput, CardInput};
pub use status::check_transition;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: String,
    pub order_number: String,
    pub account_id: String,
    pub cylinder_type: CylinderType,
    pub delivery_date: String,
    pub delivery_slot: DeliverySlot,
    pub address: String,
    pub payment: Payment,
    pub total: i64,
    pub status: OrderStatus,
    pub refunded: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    pub fn status_label(&self) -> &'static str {
        self.status.label()
    }

    pub fn slot_window(&self) -> &'static str {
        self.delivery_slot.window()
    }
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            order_number: row.order_number,
            account_id: row.account_id,
            cylinder_type: row.cylinder_type.0,
            delivery_date: row.delivery_date,
            delivery_slot: row.delivery_slot.0,
            address: row.address,
            payment: row.payment.0,
            total: row.total,
            status: row.status.0,
            refunded: row.refunded,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct Command {
    state: dgas_shared::State,
}

impl Deref for Command {
    type Target = dgas_shared::State;

    fn deref(&self) -> &Self::Target {
        &self.state
    }
}

impl Command {
    pub fn new(state: dgas_shared::State) -> Self {
        Self { state }
    }
}
