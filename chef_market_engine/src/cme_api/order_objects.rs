use serde::{Deserialize, Serialize};

use crate::db_types::{LedgerEntry, Order, StatusTransition};

/// The composite view of an order: the aggregate row plus its escrow ledger (oldest first) and its status
/// history (newest first).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResult {
    pub order: Order,
    pub ledger: Vec<LedgerEntry>,
    pub history: Vec<StatusTransition>,
}

/// The result of a status change: the updated order and the transition row that was created, or, in the
/// idempotent same-status case, the latest existing row for that status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChange {
    pub order: Order,
    pub transition: Option<StatusTransition>,
}
