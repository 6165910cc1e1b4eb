//! The escrow split calculator.
//!
//! An order's total is divided three ways: an upfront grocery advance, the platform fee, and the final payout
//! released to the chef on delivery. The calculator is a pure function; ratios arrive as an explicit
//! [`SplitRatios`] value from configuration, never from ambient state.

use cmb_common::Money;
use serde::{Deserialize, Serialize};

pub const DEFAULT_GROCERY_ADVANCE_RATIO: f64 = 0.40;
pub const DEFAULT_PLATFORM_FEE_RATIO: f64 = 0.12;

/// The configured fractions of an order total that go to the grocery advance and the platform fee.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SplitRatios {
    pub grocery_advance: f64,
    pub platform_fee: f64,
}

impl Default for SplitRatios {
    fn default() -> Self {
        Self { grocery_advance: DEFAULT_GROCERY_ADVANCE_RATIO, platform_fee: DEFAULT_PLATFORM_FEE_RATIO }
    }
}

/// The three-way division of an order total. Invariant: the three parts always sum to exactly the total they
/// were calculated from, because the payout is the remainder and is never rounded independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSplit {
    pub grocery_advance: Money,
    pub platform_fee: Money,
    pub final_payout: Money,
}

impl PaymentSplit {
    pub fn total(&self) -> Money {
        self.grocery_advance + self.platform_fee + self.final_payout
    }
}

/// Computes the escrow split for an order total. The advance and fee are rounded half-up to whole cents; the
/// final payout is the exact remainder.
pub fn calculate_split(total_price: Money, ratios: SplitRatios) -> PaymentSplit {
    let grocery_advance = round_ratio(total_price, ratios.grocery_advance);
    let platform_fee = round_ratio(total_price, ratios.platform_fee);
    let final_payout = total_price - grocery_advance - platform_fee;
    PaymentSplit { grocery_advance, platform_fee, final_payout }
}

// f64 round() is half-away-from-zero, which is half-up for the non-negative totals seen here.
fn round_ratio(amount: Money, ratio: f64) -> Money {
    #[allow(clippy::cast_possible_truncation)]
    Money::from_cents((amount.value() as f64 * ratio).round() as i64)
}

#[cfg(test)]
mod test {
    use cmb_common::Money;
    use rand::{thread_rng, Rng};

    use super::{calculate_split, SplitRatios};

    #[test]
    fn default_ratios_on_142_dollars() {
        let split = calculate_split(Money::from_dollars(142), SplitRatios::default());
        assert_eq!(split.grocery_advance, Money::from_cents(5680));
        assert_eq!(split.platform_fee, Money::from_cents(1704));
        assert_eq!(split.final_payout, Money::from_cents(6816));
        assert_eq!(split.total(), Money::from_dollars(142));
    }

    #[test]
    fn zero_total_yields_all_zero_split() {
        let split = calculate_split(Money::default(), SplitRatios::default());
        assert!(split.grocery_advance.is_zero());
        assert!(split.platform_fee.is_zero());
        assert!(split.final_payout.is_zero());
    }

    #[test]
    fn fee_rounds_half_up() {
        // $0.125 platform fee on $1.04 charges the extra cent to the fee, not the payout.
        let split = calculate_split(Money::from_cents(104), SplitRatios { grocery_advance: 0.0, platform_fee: 0.12 });
        assert_eq!(split.platform_fee, Money::from_cents(12));
        let split = calculate_split(Money::from_cents(104), SplitRatios { grocery_advance: 0.0, platform_fee: 0.125 });
        assert_eq!(split.platform_fee, Money::from_cents(13));
    }

    #[test]
    fn split_always_sums_to_total() {
        let mut rng = thread_rng();
        for _ in 0..10_000 {
            let total = Money::from_cents(rng.gen_range(0..5_000_000));
            let ratios = SplitRatios {
                grocery_advance: rng.gen_range(0.0..0.7),
                platform_fee: rng.gen_range(0.0..0.3),
            };
            let split = calculate_split(total, ratios);
            assert_eq!(split.total(), total, "split {split:?} does not sum to {total}");
        }
    }
}
