//! Catalog reads used to build cart lines.
//!
//! A vehicle becomes a [`Product`] by pairing `GET /vehicles/{id}` with the
//! first entry of its price list. Vehicles without a price cannot be bought.

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::instrument;

use heavyline_core::{Product, ProductId};

use crate::api::types::validate_price;
use crate::api::{ApiClient, ApiError};

/// Errors from catalog lookups.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("vehicle {0} not found")]
    NotFound(ProductId),

    #[error("vehicle {0} has no price")]
    NoPrice(ProductId),

    #[error("vehicle {id} has an invalid price: {price}")]
    InvalidPrice { id: ProductId, price: Decimal },

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl CatalogError {
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api(e) if e.is_unauthorized())
    }
}

/// Read-only view of the vehicle catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    api: ApiClient,
}

impl Catalog {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Look up a vehicle and its current price.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` for an unknown vehicle,
    /// `CatalogError::NoPrice` if its price list is empty and
    /// `CatalogError::InvalidPrice` if the listed price is negative.
    #[instrument(skip(self), fields(vehicle_id = %id))]
    pub async fn product(&self, id: ProductId) -> Result<Product, CatalogError> {
        let vehicle = self.api.vehicle(id).await.map_err(|e| match e {
            ApiError::NotFound(_) => CatalogError::NotFound(id),
            other => CatalogError::Api(other),
        })?;

        let prices = match self.api.vehicle_prices(id).await {
            Ok(prices) => prices,
            Err(ApiError::NotFound(_)) => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        let raw = prices.first().ok_or(CatalogError::NoPrice(id))?.price;
        let unit_price =
            validate_price(raw).map_err(|price| CatalogError::InvalidPrice { id, price })?;

        let image_ref = vehicle.image_ref().map(str::to_owned);
        Ok(Product {
            id: vehicle.vehicle_id,
            title: vehicle.title,
            unit_price,
            image_ref,
        })
    }
}
