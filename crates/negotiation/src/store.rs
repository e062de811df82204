//! Persistence port for negotiation sessions.
//!
//! The store is the durability authority: every mutating copilot call
//! writes through here synchronously, so losing the in-process cache never
//! loses committed state.

use std::sync::Arc;

use procureiq_core::{CompanyId, DomainResult};
use procureiq_procurement::VendorId;

use crate::session::{NegotiationSession, SessionId};

pub trait SessionStore: Send + Sync {
    fn insert_session(&self, session: NegotiationSession) -> DomainResult<()>;

    fn session(&self, company_id: CompanyId, id: SessionId)
    -> DomainResult<Option<NegotiationSession>>;

    fn update_session(&self, session: &NegotiationSession) -> DomainResult<()>;

    /// Prior `Accepted` sessions with the vendor, newest first, at most
    /// `limit`. Used as negotiation precedent.
    fn accepted_sessions_for_vendor(
        &self,
        company_id: CompanyId,
        vendor_id: VendorId,
        limit: usize,
    ) -> DomainResult<Vec<NegotiationSession>>;
}

impl<S> SessionStore for Arc<S>
where
    S: SessionStore + ?Sized,
{
    fn insert_session(&self, session: NegotiationSession) -> DomainResult<()> {
        (**self).insert_session(session)
    }

    fn session(
        &self,
        company_id: CompanyId,
        id: SessionId,
    ) -> DomainResult<Option<NegotiationSession>> {
        (**self).session(company_id, id)
    }

    fn update_session(&self, session: &NegotiationSession) -> DomainResult<()> {
        (**self).update_session(session)
    }

    fn accepted_sessions_for_vendor(
        &self,
        company_id: CompanyId,
        vendor_id: VendorId,
        limit: usize,
    ) -> DomainResult<Vec<NegotiationSession>> {
        (**self).accepted_sessions_for_vendor(company_id, vendor_id, limit)
    }
}
