use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::{NotSet, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::{required, Invoice};
use crate::entities::shipment;
use crate::errors::ServiceError;

#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Shipment {
    pub id: Option<i64>,
    pub tracking_code: Option<String>,
    #[validate(required)]
    pub date: Option<DateTime<Utc>>,
    pub details: Option<String>,
    #[serde(default)]
    invoice: Option<Invoice>,
    #[serde(skip)]
    invoice_id: Option<i64>,
}

impl Shipment {
    pub fn new(date: DateTime<Utc>) -> Self {
        Self {
            date: Some(date),
            ..Default::default()
        }
    }

    pub fn with_tracking_code(mut self, code: impl Into<String>) -> Self {
        self.tracking_code = Some(code.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_invoice(mut self, invoice: Invoice) -> Self {
        self.set_invoice(Some(invoice));
        self
    }

    pub fn invoice(&self) -> Option<&Invoice> {
        self.invoice.as_ref()
    }

    /// Foreign key to the invoice; follows the attached invoice when there is one
    pub fn invoice_id(&self) -> Option<i64> {
        match &self.invoice {
            Some(invoice) => invoice.id,
            None => self.invoice_id,
        }
    }

    /// Attaches or clears the invoice, keeping the foreign key in step
    pub fn set_invoice(&mut self, invoice: Option<Invoice>) {
        self.invoice_id = invoice.as_ref().and_then(|i| i.id);
        self.invoice = invoice;
    }

    pub(crate) fn set_invoice_id(&mut self, invoice_id: Option<i64>) {
        if self.invoice.as_ref().map(|i| i.id) != Some(invoice_id) {
            self.invoice = None;
        }
        self.invoice_id = invoice_id;
    }

    /// Copies every field present in `patch` onto `self`
    pub fn merge_from(&mut self, patch: &Shipment) {
        if patch.tracking_code.is_some() {
            self.tracking_code.clone_from(&patch.tracking_code);
        }
        if patch.date.is_some() {
            self.date = patch.date;
        }
        if patch.details.is_some() {
            self.details.clone_from(&patch.details);
        }
        if let Some(invoice) = &patch.invoice {
            self.set_invoice(Some(invoice.clone()));
        }
    }

    pub(crate) fn to_active_model(&self) -> Result<shipment::ActiveModel, ServiceError> {
        Ok(shipment::ActiveModel {
            id: self.id.map_or(NotSet, Set),
            tracking_code: Set(self.tracking_code.clone()),
            date: Set(required(&self.date, "shipment", "date")?),
            details: Set(self.details.clone()),
            invoice_id: Set(self.invoice_id()),
        })
    }
}

impl PartialEq for Shipment {
    fn eq(&self, other: &Self) -> bool {
        self.id.is_some() && self.id == other.id
    }
}
