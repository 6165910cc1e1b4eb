use serde::{Deserialize, Serialize};

use crate::db_types::{OrderId, OrderStatusType};

/// Broadcast to subscribers of an order whenever its status changes. Carries exactly the payload the realtime
/// fan-out needs: the order's external id and the status it just reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChangedEvent {
    pub order_id: OrderId,
    pub status: OrderStatusType,
}

impl StatusChangedEvent {
    pub fn new(order_id: OrderId, status: OrderStatusType) -> Self {
        Self { order_id, status }
    }
}
