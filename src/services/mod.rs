//! Business operations behind the REST resources. Services own the
//! repositories and turn repository outcomes into the error kinds the
//! HTTP layer maps to status codes.

pub mod invoices;
pub mod shipments;

use futures::TryStreamExt;

use crate::db::{Criteria, Page, Pageable};
use crate::errors::ServiceError;
use crate::repositories::EntityRepository;

pub use invoices::InvoiceService;
pub use shipments::ShipmentService;

/// One page of `repository` rows matching `criteria`, plus the total count
/// across all pages.
pub(crate) async fn load_page<R>(
    repository: &R,
    pageable: &Pageable,
    criteria: Option<&Criteria>,
) -> Result<Page<R::Entity>, ServiceError>
where
    R: EntityRepository,
{
    let content: Vec<R::Entity> = repository
        .find_all_by_criteria(Some(pageable), criteria)
        .try_collect()
        .await?;
    let total = repository.count_by(criteria).await?;
    Ok(Page::new(content, pageable, total))
}
