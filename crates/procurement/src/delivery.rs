use chrono::{DateTime, Utc};
use procureiq_core::CompanyId;
use serde::{Deserialize, Serialize};

use crate::ids::{DeliveryId, PurchaseOrderId, VendorId};

/// Delivery snapshot against a purchase order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    pub id: DeliveryId,
    pub company_id: CompanyId,
    pub vendor_id: VendorId,
    pub order_id: PurchaseOrderId,
    pub expected_date: DateTime<Utc>,
    pub received_date: Option<DateTime<Utc>>,
    /// Goods were rejected on receipt (quality failure).
    pub rejected: bool,
}

impl Delivery {
    pub fn is_received(&self) -> bool {
        self.received_date.is_some()
    }

    /// Whether the delivery arrived within `grace_days` of the expected
    /// date. `None` until the delivery has been received.
    pub fn is_on_time(&self, grace_days: i64) -> Option<bool> {
        self.received_date
            .map(|received| (received - self.expected_date).num_days() <= grace_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use procureiq_core::RecordId;

    fn delivery(expected_day: u32, received_day: Option<u32>) -> Delivery {
        let date = |d| Utc.with_ymd_and_hms(2025, 3, d, 12, 0, 0).unwrap();
        Delivery {
            id: DeliveryId::new(RecordId::new()),
            company_id: CompanyId::new(),
            vendor_id: VendorId::generate(),
            order_id: PurchaseOrderId::generate(),
            expected_date: date(expected_day),
            received_date: received_day.map(date),
            rejected: false,
        }
    }

    #[test]
    fn on_time_within_grace_window() {
        assert_eq!(delivery(10, Some(12)).is_on_time(2), Some(true));
        assert_eq!(delivery(10, Some(13)).is_on_time(2), Some(false));
    }

    #[test]
    fn early_delivery_is_on_time() {
        assert_eq!(delivery(10, Some(8)).is_on_time(2), Some(true));
    }

    #[test]
    fn pending_delivery_has_no_verdict() {
        assert_eq!(delivery(10, None).is_on_time(2), None);
    }
}
