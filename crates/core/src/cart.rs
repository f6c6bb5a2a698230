//! The shopping cart and its mutation rules.
//!
//! A [`Cart`] is an ordered list of [`CartLine`]s with at most one line per
//! [`ProductId`]. Insertion order is display order. All mutation goes through
//! the methods here, which keep two invariants:
//!
//! - one line per product: adding a product that is already present bumps its
//!   quantity instead of creating a second row;
//! - every quantity is at least 1: a request to set a smaller quantity is
//!   rejected and leaves the cart untouched;
//! - the total fits in a [`Price`]: a change that would overflow it is
//!   refused, and a persisted cart whose total overflows does not parse.
//!
//! Persistence and the auth-driven lifecycle live in the storefront crate.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// Number of units on a cart line. Always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Quantity(u32);

impl Quantity {
    /// A single unit.
    pub const ONE: Self = Self(1);

    /// Create a quantity, or `None` if `n` is below 1 or does not fit in a `u32`.
    #[must_use]
    pub fn new(n: i64) -> Option<Self> {
        u32::try_from(n).ok().filter(|&n| n >= 1).map(Self)
    }

    /// Get the underlying value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    const fn incremented(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl TryFrom<i64> for Quantity {
    type Error = String;

    fn try_from(n: i64) -> Result<Self, Self::Error> {
        Self::new(n).ok_or_else(|| format!("quantity must be at least 1 (got {n})"))
    }
}

impl From<Quantity> for u32 {
    fn from(q: Quantity) -> Self {
        q.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Catalog data needed to put a vehicle in the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub unit_price: Price,
    pub image_ref: Option<String>,
}

/// One product entry in the cart with its quantity.
///
/// Field names on the wire match the shape the storefront has always kept in
/// local storage (`id`, `name`, `price`, `quantity`, `imageUrl`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(rename = "id")]
    pub product_id: ProductId,
    #[serde(rename = "name")]
    pub title: String,
    #[serde(rename = "price")]
    pub unit_price: Price,
    pub quantity: Quantity,
    #[serde(rename = "imageUrl", default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
}

impl CartLine {
    /// A fresh line for `product` with quantity 1.
    #[must_use]
    pub fn new(product: Product) -> Self {
        Self {
            product_id: product.id,
            title: product.title,
            unit_price: product.unit_price,
            quantity: Quantity::ONE,
            image_ref: product.image_ref,
        }
    }

    /// `unit_price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity.get())
    }
}

/// Outcome of [`Cart::set_quantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum QuantityUpdate {
    /// The line now has the requested quantity.
    Updated,
    /// The requested quantity was below 1, or the cart total would no longer
    /// fit in a price; nothing changed.
    Rejected,
    /// No line for that product; nothing changed.
    NotFound,
}

/// A cart that cannot be built from a list of lines.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    #[error("cart total does not fit in a price")]
    TotalOverflow,
}

/// An ordered shopping cart with one line per product.
///
/// Serializes as a bare JSON array of lines. Deserializing merges any
/// duplicate product IDs into a single line so a hand-edited or stale
/// persisted value cannot break the one-line-per-product invariant, and
/// rejects lines whose total overflows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CartLine>", into = "Vec<CartLine>")]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Lines in display order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Look up the line for a product.
    #[must_use]
    pub fn line(&self, id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product_id == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add one unit of `product`.
    ///
    /// If the product is already in the cart its quantity goes up by one and
    /// its position is kept; otherwise a new line is appended. Returns `false`
    /// and leaves the cart untouched if the total would overflow.
    pub fn add_line(&mut self, product: Product) -> bool {
        let existing = self.lines.iter().any(|line| line.product_id == product.id);
        let total = if existing {
            checked_total(self.lines.iter().map(|line| {
                if line.product_id == product.id {
                    (line.unit_price, line.quantity.incremented())
                } else {
                    (line.unit_price, line.quantity)
                }
            }))
        } else {
            checked_total(
                self.lines
                    .iter()
                    .map(|line| (line.unit_price, line.quantity))
                    .chain([(product.unit_price, Quantity::ONE)]),
            )
        };
        if total.is_none() {
            return false;
        }

        match self.lines.iter_mut().find(|line| line.product_id == product.id) {
            Some(line) => line.quantity = line.quantity.incremented(),
            None => self.lines.push(CartLine::new(product)),
        }
        true
    }

    /// Remove the line for `id`. Returns whether a line was removed.
    pub fn remove_line(&mut self, id: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.product_id != id);
        self.lines.len() != before
    }

    /// Replace the quantity of the line for `id`, keeping its position.
    ///
    /// Quantities below 1 are rejected rather than treated as a removal.
    pub fn set_quantity(&mut self, id: ProductId, quantity: i64) -> QuantityUpdate {
        let Some(quantity) = Quantity::new(quantity) else {
            return QuantityUpdate::Rejected;
        };
        if self.line(id).is_none() {
            return QuantityUpdate::NotFound;
        }
        let total = checked_total(self.lines.iter().map(|line| {
            let q = if line.product_id == id { quantity } else { line.quantity };
            (line.unit_price, q)
        }));
        if total.is_none() {
            return QuantityUpdate::Rejected;
        }

        match self.lines.iter_mut().find(|line| line.product_id == id) {
            Some(line) => {
                line.quantity = quantity;
                QuantityUpdate::Updated
            }
            None => QuantityUpdate::NotFound,
        }
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Total number of units (sum of quantities, not number of lines).
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines
            .iter()
            .map(|line| u64::from(line.quantity.get()))
            .sum()
    }

    /// Sum of `unit_price * quantity` over all lines.
    ///
    /// Exact: every way of building a cart keeps this sum representable.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.lines.iter().map(CartLine::line_total).sum()
    }
}

fn checked_total(lines: impl IntoIterator<Item = (Price, Quantity)>) -> Option<Price> {
    lines.into_iter().try_fold(Price::ZERO, |sum, (price, quantity)| {
        price
            .checked_times(quantity.get())
            .and_then(|line_total| sum.checked_add(line_total))
    })
}

impl TryFrom<Vec<CartLine>> for Cart {
    type Error = CartError;

    fn try_from(lines: Vec<CartLine>) -> Result<Self, Self::Error> {
        let mut merged: Vec<CartLine> = Vec::with_capacity(lines.len());
        for line in lines {
            match merged.iter_mut().find(|m| m.product_id == line.product_id) {
                Some(existing) => {
                    existing.quantity =
                        Quantity(existing.quantity.get().saturating_add(line.quantity.get()));
                }
                None => merged.push(line),
            }
        }
        checked_total(merged.iter().map(|line| (line.unit_price, line.quantity)))
            .ok_or(CartError::TotalOverflow)?;
        Ok(Self { lines: merged })
    }
}

impl From<Cart> for Vec<CartLine> {
    fn from(cart: Cart) -> Self {
        cart.lines
    }
}
