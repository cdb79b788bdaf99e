//! Purchase order tests
//!
//! Tests for the order workflow including:
//! - Status transitions and their guards
//! - Receiving applying one `in` movement per line
//! - Line edits limited to drafts

mod common;

use common::*;
use proptest::prelude::*;
use rust_decimal::Decimal;
use stock_backend::error::AppError;
use stock_backend::models::{
    calculate_order_total, PaymentStatus, PurchaseOrderLine, PurchaseOrderStatus, StockItem,
    SupplierStatus, TransactionType,
};
use stock_backend::services::purchase_order::{
    create_purchase_order, replace_lines, transition_order, update_payment,
    CreatePurchaseOrderInput, OrderLineInput,
};
use stock_backend::Ledger;
use uuid::Uuid;

struct Fixture {
    ledger: Ledger,
    supplier_id: Uuid,
    oil: StockItem,
    flour: StockItem,
}

fn fixture() -> Fixture {
    let mut ledger = Ledger::new();
    let supplier = add_supplier(&mut ledger, "Mill & Press", SupplierStatus::Active);
    let oil = add_item(&mut ledger, "Olive oil", "5", "2");
    let flour = add_item(&mut ledger, "Flour", "10", "5");
    Fixture {
        ledger,
        supplier_id: supplier.id,
        oil,
        flour,
    }
}

fn line(item_id: Uuid, quantity: &str, unit_price: &str) -> OrderLineInput {
    OrderLineInput {
        item_id,
        quantity: dec(quantity),
        unit_price: Some(dec(unit_price)),
    }
}

fn order_input(supplier_id: Uuid, lines: Vec<OrderLineInput>) -> CreatePurchaseOrderInput {
    CreatePurchaseOrderInput {
        supplier_id,
        expected_delivery: None,
        lines,
        notes: None,
    }
}

fn advance(
    ledger: &mut Ledger,
    order_id: Uuid,
    to: PurchaseOrderStatus,
) -> Result<stock_backend::services::purchase_order::OrderTransition, AppError> {
    transition_order(ledger, order_id, to, &chef(), &settings(), now())
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_new_order_is_numbered_draft() {
        let mut f = fixture();
        let first = create_purchase_order(
            &mut f.ledger,
            &order_input(f.supplier_id, vec![line(f.oil.id, "10", "40")]),
            now(),
        )
        .unwrap();
        let second = create_purchase_order(&mut f.ledger, &order_input(f.supplier_id, vec![]), now())
            .unwrap();

        assert_eq!(first.status, PurchaseOrderStatus::Draft);
        assert_eq!(first.payment_status, PaymentStatus::Pending);
        assert_eq!(first.document_number, "PO-2026-0001");
        assert_eq!(second.document_number, "PO-2026-0002");
        assert_eq!(first.total_value, dec("400"));
    }

    #[test]
    fn test_line_price_defaults_to_item_price() {
        let mut f = fixture();
        let input = order_input(
            f.supplier_id,
            vec![OrderLineInput {
                item_id: f.flour.id,
                quantity: dec("3"),
                unit_price: None,
            }],
        );
        let order = create_purchase_order(&mut f.ledger, &input, now()).unwrap();

        assert_eq!(order.lines[0].unit_price, f.flour.unit_price);
        assert_eq!(order.lines[0].total_price, dec("6"));
    }

    #[test]
    fn test_order_rejects_bad_references() {
        let mut f = fixture();
        let unknown_supplier = order_input(Uuid::new_v4(), vec![]);
        assert!(matches!(
            create_purchase_order(&mut f.ledger, &unknown_supplier, now()),
            Err(AppError::ReferentialIntegrity(_))
        ));

        let unknown_item = order_input(f.supplier_id, vec![line(Uuid::new_v4(), "1", "1")]);
        assert!(matches!(
            create_purchase_order(&mut f.ledger, &unknown_item, now()),
            Err(AppError::ReferentialIntegrity(_))
        ));

        let inactive = add_supplier(&mut f.ledger, "Closed Dairy", SupplierStatus::Inactive);
        assert!(matches!(
            create_purchase_order(&mut f.ledger, &order_input(inactive.id, vec![]), now()),
            Err(AppError::Validation { .. })
        ));
        assert_eq!(f.ledger.purchase_orders().count(), 0);
    }

    #[test]
    fn test_draft_cannot_skip_to_confirmed() {
        let mut f = fixture();
        let order = create_purchase_order(
            &mut f.ledger,
            &order_input(f.supplier_id, vec![line(f.oil.id, "1", "1")]),
            now(),
        )
        .unwrap();

        let result = advance(&mut f.ledger, order.id, PurchaseOrderStatus::Confirmed);

        assert!(matches!(result, Err(AppError::InvalidStateTransition(_))));
        assert_eq!(
            f.ledger.purchase_order(order.id).unwrap().status,
            PurchaseOrderStatus::Draft
        );
    }

    #[test]
    fn test_empty_order_cannot_be_sent() {
        let mut f = fixture();
        let order =
            create_purchase_order(&mut f.ledger, &order_input(f.supplier_id, vec![]), now()).unwrap();

        let result = advance(&mut f.ledger, order.id, PurchaseOrderStatus::Sent);
        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[test]
    fn test_receiving_applies_every_line() {
        let mut f = fixture();
        let order = create_purchase_order(
            &mut f.ledger,
            &order_input(
                f.supplier_id,
                vec![line(f.oil.id, "10", "40"), line(f.flour.id, "20", "30")],
            ),
            now(),
        )
        .unwrap();
        assert_eq!(order.total_value, dec("1000"));
        let log_len = f.ledger.transactions().len();

        for status in [PurchaseOrderStatus::Sent, PurchaseOrderStatus::Confirmed] {
            let step = advance(&mut f.ledger, order.id, status).unwrap();
            assert!(step.transactions.is_empty());
        }
        let received = advance(&mut f.ledger, order.id, PurchaseOrderStatus::Received).unwrap();

        assert_eq!(received.order.status, PurchaseOrderStatus::Received);
        assert_eq!(received.order.actual_delivery, Some(now()));
        assert_eq!(received.transactions.len(), 2);
        assert_eq!(f.ledger.transactions().len(), log_len + 2);
        for tx in &received.transactions {
            assert_eq!(tx.transaction_type, TransactionType::In);
            assert_eq!(tx.reference.as_deref(), Some(order.document_number.as_str()));
        }
        assert_eq!(received.transactions[0].cost, dec("400"));
        assert_eq!(received.transactions[1].cost, dec("600"));

        assert_eq!(f.ledger.item(f.oil.id).unwrap().quantity, dec("15"));
        assert_eq!(f.ledger.item(f.flour.id).unwrap().quantity, dec("30"));
    }

    #[test]
    fn test_order_can_be_received_straight_from_sent() {
        let mut f = fixture();
        let order = create_purchase_order(
            &mut f.ledger,
            &order_input(f.supplier_id, vec![line(f.oil.id, "2", "40")]),
            now(),
        )
        .unwrap();

        advance(&mut f.ledger, order.id, PurchaseOrderStatus::Sent).unwrap();
        let received = advance(&mut f.ledger, order.id, PurchaseOrderStatus::Received).unwrap();

        assert_eq!(received.transactions.len(), 1);
        assert_eq!(f.ledger.item(f.oil.id).unwrap().quantity, dec("7"));
    }

    #[test]
    fn test_receiving_past_the_stock_bound_applies_nothing() {
        let mut f = fixture();
        let order = create_purchase_order(
            &mut f.ledger,
            &order_input(
                f.supplier_id,
                vec![
                    line(f.flour.id, "1", "1"),
                    line(f.oil.id, "600000000", "1"),
                    line(f.oil.id, "600000000", "1"),
                ],
            ),
            now(),
        )
        .unwrap();
        advance(&mut f.ledger, order.id, PurchaseOrderStatus::Sent).unwrap();
        let log_len = f.ledger.transactions().len();

        let result = advance(&mut f.ledger, order.id, PurchaseOrderStatus::Received);

        assert!(matches!(result, Err(AppError::Validation { .. })));
        assert_eq!(f.ledger.transactions().len(), log_len);
        assert_eq!(f.ledger.item(f.flour.id).unwrap().quantity, dec("10"));
        assert_eq!(f.ledger.item(f.oil.id).unwrap().quantity, dec("5"));
        assert_eq!(
            f.ledger.purchase_order(order.id).unwrap().status,
            PurchaseOrderStatus::Sent
        );
    }

    #[test]
    fn test_terminal_orders_stay_put() {
        let mut f = fixture();
        let order = create_purchase_order(
            &mut f.ledger,
            &order_input(f.supplier_id, vec![line(f.oil.id, "1", "1")]),
            now(),
        )
        .unwrap();
        advance(&mut f.ledger, order.id, PurchaseOrderStatus::Cancelled).unwrap();

        for next in [
            PurchaseOrderStatus::Sent,
            PurchaseOrderStatus::Received,
            PurchaseOrderStatus::Draft,
        ] {
            let result = advance(&mut f.ledger, order.id, next);
            assert!(matches!(result, Err(AppError::InvalidStateTransition(_))));
        }
        assert!(matches!(
            update_payment(&mut f.ledger, order.id, PaymentStatus::Paid, now()),
            Err(AppError::InvalidStateTransition(_))
        ));
    }

    #[test]
    fn test_lines_editable_only_in_draft() {
        let mut f = fixture();
        let order = create_purchase_order(
            &mut f.ledger,
            &order_input(f.supplier_id, vec![line(f.oil.id, "1", "10")]),
            now(),
        )
        .unwrap();

        let edited = replace_lines(
            &mut f.ledger,
            order.id,
            &[line(f.oil.id, "2", "10"), line(f.flour.id, "1", "5")],
            now(),
        )
        .unwrap();
        assert_eq!(edited.lines.len(), 2);
        assert_eq!(edited.total_value, dec("25"));

        advance(&mut f.ledger, order.id, PurchaseOrderStatus::Sent).unwrap();
        let result = replace_lines(&mut f.ledger, order.id, &[line(f.oil.id, "9", "10")], now());

        assert!(matches!(result, Err(AppError::InvalidStateTransition(_))));
        assert_eq!(f.ledger.purchase_order(order.id).unwrap().total_value, dec("25"));
    }

    #[test]
    fn test_payment_status_updates() {
        let mut f = fixture();
        let order =
            create_purchase_order(&mut f.ledger, &order_input(f.supplier_id, vec![]), now()).unwrap();

        let overdue = update_payment(&mut f.ledger, order.id, PaymentStatus::Overdue, now()).unwrap();
        assert_eq!(overdue.payment_status, PaymentStatus::Overdue);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn line_strategy() -> impl Strategy<Value = (Decimal, Decimal)> {
        (
            (1i64..=1000i64).prop_map(|n| Decimal::new(n, 1)),
            (0i64..=10000i64).prop_map(|n| Decimal::new(n, 2)),
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Order total is always the sum of line totals
        #[test]
        fn prop_order_total_is_sum_of_lines(
            lines in prop::collection::vec(line_strategy(), 0..10)
        ) {
            let lines: Vec<PurchaseOrderLine> = lines
                .into_iter()
                .map(|(quantity, unit_price)| PurchaseOrderLine::new(Uuid::nil(), quantity, unit_price))
                .collect();

            let expected: Decimal = lines.iter().map(|l| l.quantity * l.unit_price).sum();
            prop_assert_eq!(calculate_order_total(&lines), expected);
            for line in &lines {
                prop_assert_eq!(line.total_price, line.quantity * line.unit_price);
            }
        }
    }
}
