use std::sync::{Arc, Mutex};

use cmb_common::Money;

use chef_market_engine::{
    db_types::OrderId,
    gateway::hold_reference,
    GatewayError,
    PaymentGateway,
};

/// A payment gateway that records every call so tests can assert on holds and releases. Optionally fails all
/// calls to exercise the degraded paths.
#[derive(Debug, Clone, Default)]
pub struct RecordingGateway {
    calls: Arc<Mutex<Vec<GatewayCall>>>,
    fail: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    Hold { order_id: OrderId, amount: Money },
    Release { reference: String, amount: Money },
}

impl RecordingGateway {
    pub fn failing() -> Self {
        Self { calls: Arc::default(), fail: true }
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn holds(&self) -> Vec<GatewayCall> {
        self.calls().into_iter().filter(|c| matches!(c, GatewayCall::Hold { .. })).collect()
    }

    pub fn releases(&self) -> Vec<GatewayCall> {
        self.calls().into_iter().filter(|c| matches!(c, GatewayCall::Release { .. })).collect()
    }
}

impl PaymentGateway for RecordingGateway {
    async fn create_hold(&self, order_id: &OrderId, amount: Money) -> Result<String, GatewayError> {
        if self.fail {
            return Err(GatewayError::Unavailable("recording gateway is configured to fail".to_string()));
        }
        self.calls.lock().unwrap().push(GatewayCall::Hold { order_id: order_id.clone(), amount });
        Ok(hold_reference(order_id))
    }

    async fn release(&self, reference: &str, amount: Money) -> Result<(), GatewayError> {
        if self.fail {
            return Err(GatewayError::Unavailable("recording gateway is configured to fail".to_string()));
        }
        self.calls.lock().unwrap().push(GatewayCall::Release { reference: reference.to_string(), amount });
        Ok(())
    }
}
