use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::{NotSet, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::required;
use crate::entities::{product_order, OrderStatus};
use crate::errors::ServiceError;

/// Order an invoice may be attached to
#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductOrder {
    pub id: Option<i64>,
    #[validate(required)]
    pub placed_date: Option<DateTime<Utc>>,
    #[validate(required)]
    pub status: Option<OrderStatus>,
    #[validate(required, length(min = 1))]
    pub code: Option<String>,
}

impl ProductOrder {
    pub fn new(placed_date: DateTime<Utc>, status: OrderStatus, code: impl Into<String>) -> Self {
        Self {
            id: None,
            placed_date: Some(placed_date),
            status: Some(status),
            code: Some(code.into()),
        }
    }

    /// A reference carrying only the primary key
    pub fn with_id(id: i64) -> Self {
        Self {
            id: Some(id),
            ..Default::default()
        }
    }

    pub(crate) fn to_active_model(&self) -> Result<product_order::ActiveModel, ServiceError> {
        Ok(product_order::ActiveModel {
            id: self.id.map_or(NotSet, Set),
            placed_date: Set(required(&self.placed_date, "productOrder", "placedDate")?),
            status: Set(required(&self.status, "productOrder", "status")?),
            code: Set(required(&self.code, "productOrder", "code")?),
        })
    }
}

impl PartialEq for ProductOrder {
    fn eq(&self, other: &Self) -> bool {
        self.id.is_some() && self.id == other.id
    }
}
