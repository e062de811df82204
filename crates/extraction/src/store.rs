//! Persistence port for extraction records.

use std::sync::Arc;

use procureiq_core::{CompanyId, DomainResult};

use crate::record::{ExtractionId, ExtractionRecord};

pub trait ExtractionStore: Send + Sync {
    fn insert(&self, record: ExtractionRecord) -> DomainResult<()>;

    fn get(&self, company_id: CompanyId, id: ExtractionId) -> DomainResult<Option<ExtractionRecord>>;

    fn update(&self, record: &ExtractionRecord) -> DomainResult<()>;
}

impl<S> ExtractionStore for Arc<S>
where
    S: ExtractionStore + ?Sized,
{
    fn insert(&self, record: ExtractionRecord) -> DomainResult<()> {
        (**self).insert(record)
    }

    fn get(&self, company_id: CompanyId, id: ExtractionId) -> DomainResult<Option<ExtractionRecord>> {
        (**self).get(company_id, id)
    }

    fn update(&self, record: &ExtractionRecord) -> DomainResult<()> {
        (**self).update(record)
    }
}
