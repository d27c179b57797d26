use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumString, VariantArray};

#[derive(
    EnumString,
    VariantArray,
    Display,
    AsRefStr,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum CylinderType {
    Single,
    Family,
    Commercial,
}

impl CylinderType {
    pub fn label(&self) -> &'static str {
        match self {
            CylinderType::Single => "Single (5kg)",
            CylinderType::Family => "Family (14.2kg)",
            CylinderType::Commercial => "Commercial (19kg)",
        }
    }

    /// Listed price in whole rupees.
    pub fn price(&self) -> i64 {
        match self {
            CylinderType::Single => 450,
            CylinderType::Family => 850,
            CylinderType::Commercial => 1200,
        }
    }
}

#[derive(
    EnumString,
    VariantArray,
    Display,
    AsRefStr,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum DeliverySlot {
    Morning,
    Afternoon,
    Evening,
}

impl DeliverySlot {
    pub fn window(&self) -> &'static str {
        match self {
            DeliverySlot::Morning => "10 AM - 12 PM",
            DeliverySlot::Afternoon => "2 PM - 4 PM",
            DeliverySlot::Evening => "6 PM - 8 PM",
        }
    }

    pub fn surcharge(&self) -> i64 {
        match self {
            DeliverySlot::Morning => 50,
            DeliverySlot::Afternoon | DeliverySlot::Evening => 0,
        }
    }
}

/// Amount charged for a paid (non subscription) checkout.
pub fn card_total(cylinder: CylinderType, slot: DeliverySlot) -> i64 {
    cylinder.price() + slot.surcharge()
}

#[derive(
    EnumString,
    VariantArray,
    Display,
    AsRefStr,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
)]
pub enum Payment {
    Subscription,
    Card,
}

#[derive(
    EnumString,
    VariantArray,
    Display,
    AsRefStr,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum OrderStatus {
    PendingApproval,
    Confirmed,
    Processing,
    OutForDelivery,
    Delivered,
    Rejected,
}

impl OrderStatus {
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::PendingApproval => "Pending Approval",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Processing => "Processing",
            OrderStatus::OutForDelivery => "Out for Delivery",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Rejected => "Rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Rejected)
    }

    /// Position on the fulfilment path. `Rejected` is off the path.
    pub fn step(&self) -> Option<u8> {
        match self {
            OrderStatus::PendingApproval => Some(0),
            OrderStatus::Confirmed => Some(1),
            OrderStatus::Processing => Some(2),
            OrderStatus::OutForDelivery => Some(3),
            OrderStatus::Delivered => Some(4),
            OrderStatus::Rejected => None,
        }
    }

    /// Parses either the variant name ("OutForDelivery") or the display
    /// label ("Out for Delivery"). "Approved" is accepted as `Confirmed`.
    pub fn parse(value: &str) -> crate::Result<Self> {
        let value = value.trim();

        if let Ok(status) = OrderStatus::from_str(value) {
            return Ok(status);
        }

        if value.eq_ignore_ascii_case("approved") {
            return Ok(OrderStatus::Confirmed);
        }

        OrderStatus::VARIANTS
            .iter()
            .find(|s| s.label().eq_ignore_ascii_case(value))
            .copied()
            .ok_or_else(|| crate::Error::InvalidStatus(value.to_owned()))
    }
}
