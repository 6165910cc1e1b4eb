//! Small helper functions shared across the engine.

use rand::{distributions::Alphanumeric, thread_rng, Rng};

use crate::db_types::OrderId;

/// Generates a new external order id of the form `ORD-<tag>-ER`, where `<tag>` is 5 to 10 uppercase alphanumeric
/// characters. Uniqueness is enforced by the database; at these lengths a collision is a curiosity, not a plan.
pub fn new_order_id() -> OrderId {
    let mut rng = thread_rng();
    let len = rng.gen_range(5..=10);
    let tag = (&mut rng)
        .sample_iter(Alphanumeric)
        .take(len)
        .map(|c| (c as char).to_ascii_uppercase())
        .collect::<String>();
    OrderId(format!("ORD-{tag}-ER"))
}

#[cfg(test)]
mod test {
    use super::new_order_id;

    #[test]
    fn order_id_format() {
        for _ in 0..100 {
            let id = new_order_id();
            let tag = id.as_str().strip_prefix("ORD-").and_then(|s| s.strip_suffix("-ER")).expect("bad envelope");
            assert!((5..=10).contains(&tag.len()));
            assert!(tag.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        }
    }
}
