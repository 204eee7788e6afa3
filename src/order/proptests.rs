//! Property-based tests for the order store

use super::*;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

struct NullSink;

impl FulfillmentSink for NullSink {
    fn submit(&self, _lines: &[String]) {}
}

fn arb_title() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 :']{1,30}"
}

fn arb_options() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("[a-z-]{1,10}", 0..3)
}

fn arb_items() -> impl Strategy<Value = Vec<(String, Vec<String>)>> {
    proptest::collection::vec((arb_title(), arb_options()), 0..8)
}

fn expected_line(title: &str, options: &[String]) -> String {
    if options.is_empty() {
        format!("{title} (standard edition)")
    } else {
        format!("{title} ({})", options.join(", "))
    }
}

proptest! {
    #[test]
    fn get_returns_added_lines_in_order(items in arb_items()) {
        let mut order = OrderStore::new();
        for (title, options) in &items {
            order.add(title, options);
        }

        let expected: Vec<String> = items.iter().map(|(t, o)| expected_line(t, o)).collect();
        if expected.is_empty() {
            prop_assert_eq!(order.get(), EMPTY_ORDER);
        } else {
            prop_assert_eq!(order.get(), expected.join("\n"));
        }
        prop_assert_eq!(order.lines(), expected.as_slice());
    }

    #[test]
    fn clear_always_yields_sentinel(items in arb_items()) {
        let mut order = OrderStore::new();
        for (title, options) in &items {
            order.add(title, options);
        }
        order.clear();
        prop_assert_eq!(order.get(), EMPTY_ORDER);
        prop_assert!(order.is_empty());
    }

    #[test]
    fn place_on_empty_never_places(seed in any::<u64>()) {
        let order = OrderStore::new();
        let before = order.clone();
        let outcome = order.place(&NullSink, &mut StdRng::seed_from_u64(seed));
        prop_assert!(!outcome.placed);
        prop_assert_eq!(order, before);
    }

    #[test]
    fn place_on_non_empty_estimates_one_to_seven_days(
        items in proptest::collection::vec((arb_title(), arb_options()), 1..6),
        seed in any::<u64>(),
    ) {
        let mut order = OrderStore::new();
        for (title, options) in &items {
            order.add(title, options);
        }
        let before = order.clone();

        let outcome = order.place(&NullSink, &mut StdRng::seed_from_u64(seed));

        prop_assert!(outcome.placed);
        let days = outcome.delivery_days.unwrap_or(0);
        prop_assert!((1..=7).contains(&days));
        prop_assert_eq!(order, before);
    }
}
