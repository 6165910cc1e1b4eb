use cmb_common::Money;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{Order, StatusTransition},
    escrow::PaymentSplit,
};

/// The escrow split to record during an `accepted` transition when the order's ledger turned out to be empty.
/// The backend applies it only after re-checking emptiness inside the transaction.
#[derive(Debug, Clone)]
pub struct SplitBackfill {
    pub split: PaymentSplit,
    /// The gateway hold token the backfilled ledger entries should carry.
    pub reference: String,
    /// True when the hold succeeded at the gateway, marking the order as paid.
    pub paid: bool,
}

/// A gateway release the caller should attempt now that the transition's bookkeeping is durable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoutInstruction {
    pub reference: String,
    pub amount: Money,
}

/// The result of a status transition as reported by the backend.
///
/// In the idempotent degenerate case (`new_status == current_status`) no row is written and `transition` carries
/// the latest existing row for that status instead.
#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    pub order: Order,
    pub transition: Option<StatusTransition>,
    /// False in the idempotent same-status case, where nothing was written.
    pub changed: bool,
    /// Present only when the transition reached `delivered` and a final payout is due at the gateway.
    pub payout_due: Option<PayoutInstruction>,
}
