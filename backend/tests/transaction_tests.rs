//! Transaction processing tests
//!
//! Tests for applying stock movements including:
//! - Status changes as stock is drawn down
//! - Insufficient stock leaving the ledger untouched
//! - Adjustments, transfers, waste and idempotent retries
//! - Log replay matching the cached quantity

mod common;

use common::*;
use proptest::prelude::*;
use rust_decimal::Decimal;
use stock_backend::error::AppError;
use stock_backend::models::{
    derive_status, AdjustmentDirection, StockStatus, TransactionType, WasteReason,
};
use stock_backend::services::inventory::create_item;
use stock_backend::services::processor::{
    apply_transaction, calculate_usage_rate, reconcile, TransactionRequest,
};
use stock_backend::Ledger;
use uuid::Uuid;

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_draw_down_walks_through_statuses() {
        let mut ledger = Ledger::new();
        let item = add_item(&mut ledger, "Tomatoes", "10", "5");
        assert_eq!(item.status, StockStatus::InStock);

        let applied = apply(&mut ledger, item.id, TransactionType::Out, "3").unwrap();
        assert_eq!(applied.item.quantity, dec("7"));
        assert_eq!(applied.item.status, StockStatus::InStock);

        let applied = apply(&mut ledger, item.id, TransactionType::Out, "3").unwrap();
        assert_eq!(applied.item.quantity, dec("4"));
        assert_eq!(applied.item.status, StockStatus::LowStock);

        let applied = apply(&mut ledger, item.id, TransactionType::Out, "4").unwrap();
        assert_eq!(applied.item.quantity, Decimal::ZERO);
        assert_eq!(applied.item.status, StockStatus::OutOfStock);
        assert_eq!(applied.item.total_value, Decimal::ZERO);
    }

    #[test]
    fn test_insufficient_stock_leaves_ledger_unchanged() {
        let mut ledger = Ledger::new();
        let item = add_item(&mut ledger, "Onions", "2", "1");
        let before = ledger.item(item.id).unwrap().clone();
        let log_len = ledger.transactions().len();

        let result = apply(&mut ledger, item.id, TransactionType::Out, "3");

        match result {
            Err(AppError::InsufficientStock {
                requested,
                available,
                ..
            }) => {
                assert_eq!(requested, dec("3"));
                assert_eq!(available, dec("2"));
            }
            other => panic!("expected insufficient stock, got {:?}", other.map(|a| a.item.quantity)),
        }
        assert_eq!(ledger.item(item.id).unwrap(), &before);
        assert_eq!(ledger.transactions().len(), log_len);
    }

    #[test]
    fn test_non_positive_quantities_are_rejected() {
        let mut ledger = Ledger::new();
        let item = add_item(&mut ledger, "Garlic", "5", "1");

        for (transaction_type, quantity) in [
            (TransactionType::In, "0"),
            (TransactionType::Out, "-1"),
            (TransactionType::Waste, "0"),
        ] {
            let result = apply(&mut ledger, item.id, transaction_type, quantity);
            assert!(matches!(result, Err(AppError::Validation { .. })));
        }
        assert_eq!(ledger.transactions_for(item.id).count(), 1);
    }

    #[test]
    fn test_in_transaction_records_cost_and_restock_time() {
        let mut ledger = Ledger::new();
        let item = add_item(&mut ledger, "Rice", "0", "2");
        let later = now() + chrono::Duration::hours(3);

        let applied = apply_at(&mut ledger, item.id, TransactionType::In, "5", later).unwrap();

        assert_eq!(applied.transaction.cost, dec("10"));
        assert_eq!(applied.transaction.user_name, "chef");
        assert_eq!(applied.item.last_restocked, later);
        assert_eq!(applied.item.version, item.version + 1);
    }

    #[test]
    fn test_initial_stock_is_logged() {
        let mut ledger = Ledger::new();
        let item = add_item(&mut ledger, "Lentils", "8", "2");

        let history: Vec<_> = ledger.transactions_for(item.id).collect();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].transaction_type, TransactionType::In);
        assert_eq!(history[0].quantity, dec("8"));
        assert_eq!(history[0].reason.as_deref(), Some("Initial stock"));
    }

    #[test]
    fn test_adjustment_records_delta_and_direction() {
        let mut ledger = Ledger::new();
        let item = add_item(&mut ledger, "Flour", "10", "2");

        let request = TransactionRequest::new(TransactionType::Adjustment, dec("7"))
            .with_reason("stock count");
        let applied =
            apply_transaction(&mut ledger, item.id, &request, &chef(), &settings(), now()).unwrap();

        assert_eq!(applied.item.quantity, dec("7"));
        assert_eq!(applied.transaction.quantity, dec("3"));
        assert_eq!(
            applied.transaction.adjustment_direction,
            Some(AdjustmentDirection::Decrease)
        );
        assert_eq!(
            applied.transaction.reason.as_deref(),
            Some("Adjustment (decrease): stock count")
        );

        let applied = apply(&mut ledger, item.id, TransactionType::Adjustment, "12").unwrap();
        assert_eq!(applied.transaction.quantity, dec("5"));
        assert_eq!(
            applied.transaction.adjustment_direction,
            Some(AdjustmentDirection::Increase)
        );
        assert!(reconcile(&ledger).is_empty());
    }

    #[test]
    fn test_adjustment_to_current_quantity_is_rejected() {
        let mut ledger = Ledger::new();
        let item = add_item(&mut ledger, "Sugar", "4", "1");

        let result = apply(&mut ledger, item.id, TransactionType::Adjustment, "4");
        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[test]
    fn test_transfer_moves_item_and_draws_down() {
        let mut ledger = Ledger::new();
        let fridge = add_location(&mut ledger, "Fridge", 5);
        let freezer = add_location(&mut ledger, "Freezer", 5);
        let mut input = item_input("Chicken", "Meat", "10", "2");
        input.location_id = Some(fridge.id);
        let item = create_item(&mut ledger, &input, &chef(), &settings(), now()).unwrap();

        let request = TransactionRequest {
            destination: Some(freezer.id),
            ..TransactionRequest::new(TransactionType::Transfer, dec("4"))
        };
        let applied =
            apply_transaction(&mut ledger, item.id, &request, &chef(), &settings(), now()).unwrap();

        assert_eq!(applied.item.quantity, dec("6"));
        assert_eq!(applied.item.location_id, Some(freezer.id));
        assert_eq!(applied.transaction.source, Some(fridge.id));
        assert_eq!(applied.transaction.destination, Some(freezer.id));
        assert!(!ledger.location(fridge.id).unwrap().contains(item.id));
        assert!(ledger.location(freezer.id).unwrap().contains(item.id));
    }

    #[test]
    fn test_transfer_needs_a_new_destination() {
        let mut ledger = Ledger::new();
        let fridge = add_location(&mut ledger, "Fridge", 5);
        let mut input = item_input("Beef", "Meat", "10", "2");
        input.location_id = Some(fridge.id);
        let item = create_item(&mut ledger, &input, &chef(), &settings(), now()).unwrap();

        let missing = apply(&mut ledger, item.id, TransactionType::Transfer, "1");
        assert!(matches!(missing, Err(AppError::Validation { .. })));

        let same = TransactionRequest {
            destination: Some(fridge.id),
            ..TransactionRequest::new(TransactionType::Transfer, dec("1"))
        };
        let result = apply_transaction(&mut ledger, item.id, &same, &chef(), &settings(), now());
        assert!(matches!(result, Err(AppError::Validation { .. })));

        let unknown = TransactionRequest {
            destination: Some(Uuid::new_v4()),
            ..TransactionRequest::new(TransactionType::Transfer, dec("1"))
        };
        let result = apply_transaction(&mut ledger, item.id, &unknown, &chef(), &settings(), now());
        assert!(matches!(result, Err(AppError::ReferentialIntegrity(_))));

        assert_eq!(ledger.item(item.id).unwrap().quantity, dec("10"));
    }

    #[test]
    fn test_waste_reason_defaults_to_other() {
        let mut ledger = Ledger::new();
        let item = add_item(&mut ledger, "Lettuce", "6", "1");

        let applied = apply(&mut ledger, item.id, TransactionType::Waste, "1").unwrap();
        assert_eq!(applied.transaction.waste_reason, Some(WasteReason::Other));

        let request = TransactionRequest {
            waste_reason: Some(WasteReason::Spoiled),
            ..TransactionRequest::new(TransactionType::Waste, dec("2"))
        };
        let applied =
            apply_transaction(&mut ledger, item.id, &request, &chef(), &settings(), now()).unwrap();
        assert_eq!(applied.transaction.waste_reason, Some(WasteReason::Spoiled));
        assert_eq!(applied.transaction.cost, dec("4"));
        assert_eq!(applied.item.quantity, dec("3"));
    }

    #[test]
    fn test_retry_with_same_id_is_applied_once() {
        let mut ledger = Ledger::new();
        let item = add_item(&mut ledger, "Cheese", "10", "2");
        let request = TransactionRequest {
            id: Some(Uuid::new_v4()),
            ..TransactionRequest::new(TransactionType::Out, dec("3"))
        };

        let first =
            apply_transaction(&mut ledger, item.id, &request, &chef(), &settings(), now()).unwrap();
        let second =
            apply_transaction(&mut ledger, item.id, &request, &chef(), &settings(), now()).unwrap();

        assert!(!first.replayed);
        assert!(second.replayed);
        assert_eq!(first.transaction.id, second.transaction.id);
        assert_eq!(second.item.quantity, dec("7"));
        assert_eq!(ledger.transactions_for(item.id).count(), 2);
    }

    #[test]
    fn test_reused_id_on_other_item_is_rejected() {
        let mut ledger = Ledger::new();
        let cheese = add_item(&mut ledger, "Cheese", "10", "2");
        let ham = add_item(&mut ledger, "Ham", "10", "2");
        let request = TransactionRequest {
            id: Some(Uuid::new_v4()),
            ..TransactionRequest::new(TransactionType::Out, dec("1"))
        };

        apply_transaction(&mut ledger, cheese.id, &request, &chef(), &settings(), now()).unwrap();
        let result = apply_transaction(&mut ledger, ham.id, &request, &chef(), &settings(), now());

        assert!(matches!(result, Err(AppError::DuplicateEntry(_))));
        assert_eq!(ledger.item(ham.id).unwrap().quantity, dec("10"));
    }

    #[test]
    fn test_usage_rate_counts_only_recent_outs() {
        let mut ledger = Ledger::new();
        let item = add_item(&mut ledger, "Potatoes", "100", "5");

        apply_at(&mut ledger, item.id, TransactionType::Out, "30", days_ago(45)).unwrap();
        let applied = apply(&mut ledger, item.id, TransactionType::Out, "15").unwrap();

        assert_eq!(applied.item.usage_rate, calculate_usage_rate(dec("15"), 30));
        assert_eq!(applied.item.usage_rate, dec("0.5"));
    }

    #[test]
    fn test_reconcile_reports_drift() {
        let mut ledger = Ledger::new();
        let item = add_item(&mut ledger, "Oil", "5", "1");

        let mut tampered = ledger.item(item.id).unwrap().clone();
        tampered.quantity = dec("9");
        ledger.update_item(tampered).unwrap();

        let drift = reconcile(&ledger);
        assert_eq!(drift.len(), 1);
        assert_eq!(drift[0].cached, dec("9"));
        assert_eq!(drift[0].replayed, dec("5"));
    }

    #[test]
    fn test_oversized_opening_stock_is_rejected_cleanly() {
        let mut ledger = Ledger::new();
        let mut input = item_input("Salt", "Pantry", "70000000000000000000000000000", "1");
        input.unit_price = dec("10");

        let result = create_item(&mut ledger, &input, &chef(), &settings(), now());

        assert!(matches!(result, Err(AppError::Validation { ref field, .. }) if field == "quantity"));
        assert_eq!(ledger.item_count(), 0);
        assert!(ledger.transactions().is_empty());
    }

    #[test]
    fn test_restock_past_the_bound_leaves_ledger_unchanged() {
        let mut ledger = Ledger::new();
        let item = add_item(&mut ledger, "Sugar", "999999999", "1");
        let before = ledger.item(item.id).unwrap().clone();

        let result = apply(&mut ledger, item.id, TransactionType::In, "5");

        assert!(matches!(result, Err(AppError::Validation { .. })));
        assert_eq!(ledger.item(item.id).unwrap(), &before);
        assert_eq!(ledger.transactions().len(), 1);
    }

    #[test]
    fn test_oversized_movement_is_a_validation_error() {
        let mut ledger = Ledger::new();
        let item = add_item(&mut ledger, "Pepper", "5", "1");

        let result = apply(&mut ledger, item.id, TransactionType::In, "79228162514264337593543950335");

        assert!(matches!(result, Err(AppError::Validation { .. })));
        assert_eq!(ledger.item(item.id).unwrap().quantity, dec("5"));
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for generating quantities (0.1 to 50.0)
    fn quantity_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=500i64).prop_map(|n| Decimal::new(n, 1))
    }

    fn type_strategy() -> impl Strategy<Value = TransactionType> {
        prop_oneof![
            Just(TransactionType::In),
            Just(TransactionType::Out),
            Just(TransactionType::Waste),
            Just(TransactionType::Adjustment),
            Just(TransactionType::Transfer),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The cached quantity always equals the replayed log, never goes
        /// negative, value and status stay derived from it, and every
        /// location's occupancy matches its item set
        #[test]
        fn prop_cached_quantity_matches_log(
            operations in prop::collection::vec((type_strategy(), quantity_strategy()), 1..30)
        ) {
            let mut ledger = Ledger::new();
            let walk_in = add_location(&mut ledger, "Walk-in", 5);
            let pantry = add_location(&mut ledger, "Pantry", 5);
            let mut input = item_input("Stock", "Produce", "20", "5");
            input.location_id = Some(walk_in.id);
            let item = create_item(&mut ledger, &input, &chef(), &settings(), now()).unwrap();

            for (transaction_type, quantity) in operations {
                let held_at = ledger.item(item.id).unwrap().location_id;
                let destination = if held_at == Some(walk_in.id) { pantry.id } else { walk_in.id };
                let request = TransactionRequest {
                    destination: (transaction_type == TransactionType::Transfer).then_some(destination),
                    ..TransactionRequest::new(transaction_type, quantity)
                };
                let result = apply_transaction(&mut ledger, item.id, &request, &chef(), &settings(), now());

                let current = ledger.item(item.id).unwrap();
                prop_assert!(current.quantity >= Decimal::ZERO);
                prop_assert_eq!(current.total_value, current.quantity * current.unit_price);
                prop_assert_eq!(
                    current.status,
                    derive_status(current.quantity, current.minimum_stock, current.expiry_date, now())
                );
                if transaction_type == TransactionType::Transfer && result.is_ok() {
                    prop_assert_eq!(current.location_id, Some(destination));
                }

                let held_at = current.location_id;
                for location in ledger.locations() {
                    prop_assert_eq!(location.current_occupancy as usize, location.items.len());
                    prop_assert_eq!(
                        location.items.contains(&item.id),
                        held_at == Some(location.id)
                    );
                }
            }

            prop_assert!(reconcile(&ledger).is_empty());
        }

        /// A rejected movement never changes the item or the log
        #[test]
        fn prop_overdraw_is_atomic(
            held in quantity_strategy(),
            extra in quantity_strategy()
        ) {
            let mut ledger = Ledger::new();
            let item = add_item(&mut ledger, "Stock", &held.to_string(), "1");
            let before = ledger.item(item.id).unwrap().clone();

            let request = TransactionRequest::new(TransactionType::Out, held + extra);
            let result = apply_transaction(&mut ledger, item.id, &request, &chef(), &settings(), now());

            let is_insufficient = matches!(result, Err(AppError::InsufficientStock { .. }));
            prop_assert!(is_insufficient);
            prop_assert_eq!(ledger.item(item.id).unwrap(), &before);
            prop_assert_eq!(ledger.transactions().len(), 1);
        }
    }
}
