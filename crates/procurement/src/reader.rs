//! Read port over the external data store.
//!
//! The engines consume this trait; the production implementation lives in
//! the surrounding application (relational store), and
//! `procureiq-store` provides an in-memory implementation for tests/dev.
//! All reads are point-in-time snapshots; no implementation may hold a lock
//! across calls.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use procureiq_core::{CompanyId, DomainResult};

use crate::delivery::Delivery;
use crate::ids::{ItemId, QuoteId, RfqId, VendorId};
use crate::item::Item;
use crate::order::PurchaseOrder;
use crate::price_history::PricePoint;
use crate::quote::Quote;
use crate::rfq::Rfq;
use crate::vendor::Vendor;

pub trait ProcurementReader: Send + Sync {
    fn vendor(&self, company_id: CompanyId, id: VendorId) -> DomainResult<Option<Vendor>>;

    fn active_vendors(&self, company_id: CompanyId) -> DomainResult<Vec<Vendor>>;

    fn item(&self, company_id: CompanyId, id: ItemId) -> DomainResult<Option<Item>>;

    fn rfq(&self, company_id: CompanyId, id: RfqId) -> DomainResult<Option<Rfq>>;

    fn quote(&self, company_id: CompanyId, id: QuoteId) -> DomainResult<Option<Quote>>;

    fn quotes_for_rfq(&self, company_id: CompanyId, rfq_id: RfqId) -> DomainResult<Vec<Quote>>;

    /// The vendor's most recent quotes, newest first, at most `limit`.
    fn recent_quotes_for_vendor(
        &self,
        company_id: CompanyId,
        vendor_id: VendorId,
        limit: usize,
    ) -> DomainResult<Vec<Quote>>;

    /// The vendor's most recent purchase orders, newest first, at most `limit`.
    fn recent_orders_for_vendor(
        &self,
        company_id: CompanyId,
        vendor_id: VendorId,
        limit: usize,
    ) -> DomainResult<Vec<PurchaseOrder>>;

    fn deliveries_for_vendor(
        &self,
        company_id: CompanyId,
        vendor_id: VendorId,
    ) -> DomainResult<Vec<Delivery>>;

    /// The most recent `limit` price points for an item, returned in
    /// chronological (oldest → newest) order so callers can fit against the
    /// observation index directly.
    fn price_window(
        &self,
        company_id: CompanyId,
        item_id: ItemId,
        limit: usize,
    ) -> DomainResult<Vec<PricePoint>>;

    /// All price points recorded at or after `since`, chronological order.
    fn price_history_since(
        &self,
        company_id: CompanyId,
        item_id: ItemId,
        since: DateTime<Utc>,
    ) -> DomainResult<Vec<PricePoint>>;
}

impl<S> ProcurementReader for Arc<S>
where
    S: ProcurementReader + ?Sized,
{
    fn vendor(&self, company_id: CompanyId, id: VendorId) -> DomainResult<Option<Vendor>> {
        (**self).vendor(company_id, id)
    }

    fn active_vendors(&self, company_id: CompanyId) -> DomainResult<Vec<Vendor>> {
        (**self).active_vendors(company_id)
    }

    fn item(&self, company_id: CompanyId, id: ItemId) -> DomainResult<Option<Item>> {
        (**self).item(company_id, id)
    }

    fn rfq(&self, company_id: CompanyId, id: RfqId) -> DomainResult<Option<Rfq>> {
        (**self).rfq(company_id, id)
    }

    fn quote(&self, company_id: CompanyId, id: QuoteId) -> DomainResult<Option<Quote>> {
        (**self).quote(company_id, id)
    }

    fn quotes_for_rfq(&self, company_id: CompanyId, rfq_id: RfqId) -> DomainResult<Vec<Quote>> {
        (**self).quotes_for_rfq(company_id, rfq_id)
    }

    fn recent_quotes_for_vendor(
        &self,
        company_id: CompanyId,
        vendor_id: VendorId,
        limit: usize,
    ) -> DomainResult<Vec<Quote>> {
        (**self).recent_quotes_for_vendor(company_id, vendor_id, limit)
    }

    fn recent_orders_for_vendor(
        &self,
        company_id: CompanyId,
        vendor_id: VendorId,
        limit: usize,
    ) -> DomainResult<Vec<PurchaseOrder>> {
        (**self).recent_orders_for_vendor(company_id, vendor_id, limit)
    }

    fn deliveries_for_vendor(
        &self,
        company_id: CompanyId,
        vendor_id: VendorId,
    ) -> DomainResult<Vec<Delivery>> {
        (**self).deliveries_for_vendor(company_id, vendor_id)
    }

    fn price_window(
        &self,
        company_id: CompanyId,
        item_id: ItemId,
        limit: usize,
    ) -> DomainResult<Vec<PricePoint>> {
        (**self).price_window(company_id, item_id, limit)
    }

    fn price_history_since(
        &self,
        company_id: CompanyId,
        item_id: ItemId,
        since: DateTime<Utc>,
    ) -> DomainResult<Vec<PricePoint>> {
        (**self).price_history_since(company_id, item_id, since)
    }
}
