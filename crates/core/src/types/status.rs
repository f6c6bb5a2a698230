//! Enums exchanged with the order API.
//!
//! The backend stores these as Russian display strings, so the serde
//! representation is the exact wire value rather than the variant name.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a short code does not name a known variant.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

/// How the buyer intends to pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "банковская карта")]
    BankCard,
    /// Faster Payments System transfer.
    #[serde(rename = "СБП")]
    Sbp,
    #[serde(rename = "наличные")]
    Cash,
}

impl PaymentMethod {
    /// The string the order API expects.
    #[must_use]
    pub const fn wire_value(self) -> &'static str {
        match self {
            Self::BankCard => "банковская карта",
            Self::Sbp => "СБП",
            Self::Cash => "наличные",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = UnknownVariant;

    /// Accepts the short codes used by the checkout form (`card`, `sbp`,
    /// `cash`) as well as the wire values.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "card" | "банковская карта" => Ok(Self::BankCard),
            "sbp" | "СБП" => Ok(Self::Sbp),
            "cash" | "наличные" => Ok(Self::Cash),
            other => Err(UnknownVariant {
                kind: "payment method",
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_value())
    }
}

/// How the vehicle reaches the buyer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryType {
    #[serde(rename = "самовывоз")]
    Pickup,
    #[serde(rename = "доставка")]
    Delivery,
}

impl DeliveryType {
    /// The string the order API expects.
    #[must_use]
    pub const fn wire_value(self) -> &'static str {
        match self {
            Self::Pickup => "самовывоз",
            Self::Delivery => "доставка",
        }
    }
}

impl FromStr for DeliveryType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pickup" | "самовывоз" => Ok(Self::Pickup),
            "delivery" | "доставка" => Ok(Self::Delivery),
            other => Err(UnknownVariant {
                kind: "delivery type",
                value: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for DeliveryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_value())
    }
}

/// Processing status of an order request on the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RequestStatus {
    #[default]
    #[serde(rename = "заявка создана")]
    Created,
    #[serde(rename = "заявка обрабатывается")]
    Processing,
    #[serde(rename = "заявка получена")]
    Received,
    #[serde(rename = "заявка выполнена")]
    Completed,
}

impl RequestStatus {
    #[must_use]
    pub const fn wire_value(self) -> &'static str {
        match self {
            Self::Created => "заявка создана",
            Self::Processing => "заявка обрабатывается",
            Self::Received => "заявка получена",
            Self::Completed => "заявка выполнена",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_value())
    }
}
