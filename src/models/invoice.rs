use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::ActiveValue::{NotSet, Set};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::{required, ProductOrder, Shipment};
use crate::entities::{invoice, InvoiceStatus, PaymentMethod};
use crate::errors::ServiceError;

#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: Option<i64>,
    #[validate(required)]
    pub date: Option<DateTime<Utc>>,
    pub details: Option<String>,
    #[validate(required)]
    pub status: Option<InvoiceStatus>,
    #[validate(required)]
    pub payment_method: Option<PaymentMethod>,
    #[validate(required)]
    pub payment_date: Option<DateTime<Utc>>,
    /// Stored with trailing zeros stripped
    #[validate(required)]
    #[serde(default, deserialize_with = "normalized_amount")]
    #[schema(value_type = Option<String>, example = "149.9")]
    payment_amount: Option<Decimal>,
    #[serde(default)]
    order: Option<ProductOrder>,
    #[serde(skip)]
    order_id: Option<i64>,
}

fn normalized_amount<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Decimal>::deserialize(deserializer)?.map(|amount| amount.normalize()))
}

impl Invoice {
    pub fn new(
        date: DateTime<Utc>,
        status: InvoiceStatus,
        payment_method: PaymentMethod,
        payment_date: DateTime<Utc>,
        payment_amount: Decimal,
    ) -> Self {
        let mut invoice = Self {
            date: Some(date),
            status: Some(status),
            payment_method: Some(payment_method),
            payment_date: Some(payment_date),
            ..Default::default()
        };
        invoice.set_payment_amount(Some(payment_amount));
        invoice
    }

    /// A reference carrying only the primary key
    pub fn with_id(id: i64) -> Self {
        Self {
            id: Some(id),
            ..Default::default()
        }
    }

    pub fn payment_amount(&self) -> Option<Decimal> {
        self.payment_amount
    }

    pub fn set_payment_amount(&mut self, amount: Option<Decimal>) {
        self.payment_amount = amount.map(|a| a.normalize());
    }

    pub fn order(&self) -> Option<&ProductOrder> {
        self.order.as_ref()
    }

    /// Foreign key to the order; follows the attached order when there is one
    pub fn order_id(&self) -> Option<i64> {
        match &self.order {
            Some(order) => order.id,
            None => self.order_id,
        }
    }

    /// Attaches or clears the order, keeping the foreign key in step
    pub fn set_order(&mut self, order: Option<ProductOrder>) {
        self.order_id = order.as_ref().and_then(|o| o.id);
        self.order = order;
    }

    pub fn with_order(mut self, order: ProductOrder) -> Self {
        self.set_order(Some(order));
        self
    }

    /// Sets the bare foreign key; a loaded order with another id is dropped
    pub(crate) fn set_order_id(&mut self, order_id: Option<i64>) {
        if self.order.as_ref().map(|o| o.id) != Some(order_id) {
            self.order = None;
        }
        self.order_id = order_id;
    }

    /// Points `shipment` at this invoice
    pub fn add_shipment(&self, shipment: &mut Shipment) {
        shipment.set_invoice(Some(self.clone()));
    }

    /// Detaches `shipment` if it currently points at this invoice
    pub fn remove_shipment(&self, shipment: &mut Shipment) {
        if self.id.is_some() && shipment.invoice_id() == self.id {
            shipment.set_invoice(None);
        }
    }

    /// Moves the back-references from `current` to `replacement`
    pub fn set_shipments(&self, current: &mut [Shipment], replacement: &mut [Shipment]) {
        for shipment in current.iter_mut() {
            self.remove_shipment(shipment);
        }
        for shipment in replacement.iter_mut() {
            self.add_shipment(shipment);
        }
    }

    /// Copies every field present in `patch` onto `self`
    pub fn merge_from(&mut self, patch: &Invoice) {
        if patch.date.is_some() {
            self.date = patch.date;
        }
        if patch.details.is_some() {
            self.details.clone_from(&patch.details);
        }
        if patch.status.is_some() {
            self.status = patch.status;
        }
        if patch.payment_method.is_some() {
            self.payment_method = patch.payment_method;
        }
        if patch.payment_date.is_some() {
            self.payment_date = patch.payment_date;
        }
        if patch.payment_amount.is_some() {
            self.set_payment_amount(patch.payment_amount);
        }
        if let Some(order) = &patch.order {
            self.set_order(Some(order.clone()));
        }
    }

    pub(crate) fn to_active_model(&self) -> Result<invoice::ActiveModel, ServiceError> {
        Ok(invoice::ActiveModel {
            id: self.id.map_or(NotSet, Set),
            date: Set(required(&self.date, "invoice", "date")?),
            details: Set(self.details.clone()),
            status: Set(required(&self.status, "invoice", "status")?),
            payment_method: Set(required(&self.payment_method, "invoice", "paymentMethod")?),
            payment_date: Set(required(&self.payment_date, "invoice", "paymentDate")?),
            payment_amount: Set(required(&self.payment_amount, "invoice", "paymentAmount")?),
            order_id: Set(self.order_id()),
        })
    }
}

impl PartialEq for Invoice {
    fn eq(&self, other: &Self) -> bool {
        self.id.is_some() && self.id == other.id
    }
}
