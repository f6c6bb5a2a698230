//! Order drafts: an owned snapshot of the cart plus validated contact details.

use chrono::{Local, NaiveDateTime};
use rand::Rng;

use heavyline_core::{Cart, CartLine, DeliveryType, PaymentMethod, Price, ProductId, Quantity};

use super::form::{ContactDetails, ValidForm};

/// Upper bound (exclusive) for generated correlation ids.
const CORRELATION_ID_RANGE: u32 = 1_000_000;

/// One line of an order, copied out of the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub name: String,
    pub price: Price,
}

impl From<&CartLine> for OrderLine {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id,
            quantity: line.quantity,
            name: line.title.clone(),
            price: line.unit_price,
        }
    }
}

/// Everything the create-order call sends.
///
/// Built once per submission attempt and never persisted. `correlation_id`
/// only ties the request to log lines on both ends; it is not a credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub contact: ContactDetails,
    pub payment_method: PaymentMethod,
    pub delivery_type: DeliveryType,
    pub lines: Vec<OrderLine>,
    pub total_price: Price,
    pub correlation_id: u32,
    pub requested_at: NaiveDateTime,
}

impl OrderDraft {
    /// Snapshot `cart` together with a validated form.
    #[must_use]
    pub fn compose(cart: &Cart, form: ValidForm) -> Self {
        let lines: Vec<OrderLine> = cart.lines().iter().map(OrderLine::from).collect();
        let correlation_id = rand::rng().random_range(0..CORRELATION_ID_RANGE);

        Self {
            contact: form.contact,
            payment_method: form.payment_method,
            delivery_type: form.delivery_type,
            total_price: cart.total_price(),
            lines,
            correlation_id,
            requested_at: Local::now().naive_local(),
        }
    }

    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity.get())).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use heavyline_core::{Email, Product};

    use super::*;

    fn valid_form() -> ValidForm {
        ValidForm {
            contact: ContactDetails {
                full_name: "Сидоров Илья".to_string(),
                email: Email::parse("sidorov@example.ru").unwrap(),
                phone: "+7 912 345-67-89".to_string(),
                city: "Екатеринбург".to_string(),
                company_name: Some("ООО Карьер".to_string()),
                message: None,
            },
            payment_method: PaymentMethod::Sbp,
            delivery_type: DeliveryType::Delivery,
        }
    }

    fn product(id: i32, roubles: i64) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Экскаватор {id}"),
            unit_price: Price::from_roubles(roubles).unwrap(),
            image_ref: None,
        }
    }

    #[test]
    fn test_compose_projects_lines_and_total() {
        let mut cart = Cart::new();
        cart.add_line(product(1, 1000));
        cart.add_line(product(1, 1000));
        cart.add_line(product(2, 500));

        let draft = OrderDraft::compose(&cart, valid_form());
        assert_eq!(draft.lines.len(), 2);
        assert_eq!(draft.lines[0].quantity.get(), 2);
        assert_eq!(draft.lines[0].name, "Экскаватор 1");
        assert_eq!(draft.total_price, Price::from_roubles(2500).unwrap());
        assert_eq!(draft.item_count(), 3);
        assert!(draft.correlation_id < CORRELATION_ID_RANGE);
    }

    #[test]
    fn test_draft_is_unaffected_by_later_cart_changes() {
        let mut cart = Cart::new();
        cart.add_line(product(1, 1000));
        let draft = OrderDraft::compose(&cart, valid_form());

        cart.add_line(product(1, 1000));
        cart.add_line(product(3, 700));

        assert_eq!(draft.lines.len(), 1);
        assert_eq!(draft.lines[0].quantity, Quantity::ONE);
        assert_eq!(draft.total_price, Price::from_roubles(1000).unwrap());
    }
}
