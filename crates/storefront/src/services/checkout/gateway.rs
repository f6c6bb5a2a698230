//! The order submission port and its REST implementation.

use std::future::Future;

use thiserror::Error;
use uuid::Uuid;

use heavyline_core::{OrderId, RequestStatus};

use super::OrderDraft;
use crate::api::types::OrderPayload;
use crate::api::{ApiClient, ApiError};

/// Why a submission failed. Shown to the user only as a generic message.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// The request never got a response.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with an error status.
    #[error("order rejected ({status}): {detail}")]
    Api { status: u16, detail: String },

    /// The backend accepted the order but the response was unreadable.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl From<ApiError> for SubmissionError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Http(e) => Self::Http(e),
            ApiError::Unauthorized => Self::Api {
                status: 401,
                detail: "Unauthorized".to_string(),
            },
            ApiError::NotFound(what) => Self::Api {
                status: 404,
                detail: format!("{what} not found"),
            },
            ApiError::Api { status, detail } => Self::Api { status, detail },
            ApiError::Parse(msg) => Self::Decode(msg),
            ApiError::Url(e) => Self::Decode(e.to_string()),
        }
    }
}

/// What the backend hands back for an accepted order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderReceipt {
    pub request_id: OrderId,
    pub status: RequestStatus,
}

/// Places orders. One call, one attempt.
pub trait OrderGateway {
    fn submit_order(
        &self,
        draft: &OrderDraft,
    ) -> impl Future<Output = Result<OrderReceipt, SubmissionError>> + Send;
}

impl OrderGateway for ApiClient {
    async fn submit_order(&self, draft: &OrderDraft) -> Result<OrderReceipt, SubmissionError> {
        let payload = OrderPayload::from(draft);
        let record = self.create_order(&payload, Uuid::new_v4()).await?;
        Ok(OrderReceipt {
            request_id: record.request_id,
            status: record.status,
        })
    }
}
