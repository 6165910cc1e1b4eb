//! Payment gateway implementations.
//!
//! The real processor integration lives outside this crate; [`LogOnlyGateway`] is the demo-mode stand-in that
//! records intent in the logs and always succeeds. Tests use the recording gateway in `test_utils`.

use cmb_common::Money;
use log::info;

use crate::{
    db_types::OrderId,
    traits::{GatewayError, PaymentGateway},
};

/// Builds the hold reference token the demo gateway hands out, and the fallback reference used when a hold
/// could not be created.
pub fn hold_reference(order_id: &OrderId) -> String {
    format!("HOLD-{}", order_id.as_str())
}

/// A gateway that logs every hold and release without moving any money. Demo mode only.
#[derive(Debug, Clone, Default)]
pub struct LogOnlyGateway;

impl PaymentGateway for LogOnlyGateway {
    async fn create_hold(&self, order_id: &OrderId, amount: Money) -> Result<String, GatewayError> {
        let reference = hold_reference(order_id);
        info!("💰️ Holding {amount} for order {order_id} under {reference}");
        Ok(reference)
    }

    async fn release(&self, reference: &str, amount: Money) -> Result<(), GatewayError> {
        info!("💰️ Releasing {amount} for reference {reference}");
        Ok(())
    }
}
