use super::*;
use std::sync::Arc;

#[test]
fn test_two_buyers_race_for_last_unit() {
    let manager = Arc::new(create_test_manager());
    let item_id = seed_item(&manager, "user:seller", "Desk lamp", Decimal::from(10), 1);

    let results: Vec<Result<(Order, String), CheckoutError>> = std::thread::scope(|scope| {
        let handles: Vec<_> = ["user:alice", "user:bob"]
            .into_iter()
            .map(|buyer| {
                let manager = manager.clone();
                let item_id = item_id.clone();
                scope.spawn(move || manager.create_order(buyer, &[line(&item_id, 1)]))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    assert!(results.iter().any(|r| matches!(
        r,
        Err(CheckoutError::InsufficientStock { available: 0, .. })
    )));
    assert_eq!(stock_of(&manager, &item_id), 0);
}

#[test]
fn test_exactly_stock_many_reservations_succeed() {
    // stock = 4, 10 concurrent buyers of one unit each: exactly 4 orders
    // commit and together they consume exactly the initial stock.
    let manager = Arc::new(create_test_manager());
    let item_id = seed_item(&manager, "user:seller", "Notebook", Decimal::ONE, 4);

    let results: Vec<Result<(Order, String), CheckoutError>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..10)
            .map(|i| {
                let manager = manager.clone();
                let item_id = item_id.clone();
                scope.spawn(move || {
                    manager.create_order(&format!("user:buyer-{}", i), &[line(&item_id, 1)])
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let committed: Vec<&(Order, String)> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(committed.len(), 4);
    let reserved: u32 = committed
        .iter()
        .flat_map(|(order, _)| order.lines.iter())
        .map(|l| l.quantity)
        .sum();
    assert_eq!(reserved, 4);
    assert_eq!(stock_of(&manager, &item_id), 0);

    for result in &results {
        if let Err(err) = result {
            assert!(matches!(err, CheckoutError::InsufficientStock { .. }));
        }
    }
}

#[test]
fn test_concurrent_verifies_complete_exactly_once() {
    let manager = Arc::new(create_test_manager());
    let item_id = seed_item(&manager, "user:seller", "Desk lamp", Decimal::ONE, 1);
    let (order, code) = manager
        .create_order("user:buyer", &[line(&item_id, 1)])
        .unwrap();
    let order_id = order.id.unwrap();

    let results: Vec<CheckoutResult<HandoffResult>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..2)
            .map(|_| {
                let manager = manager.clone();
                let order_id = order_id.clone();
                let code = code.clone();
                scope.spawn(move || manager.verify_handoff(&order_id, "user:seller", &code))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    assert!(results.iter().any(|r| matches!(
        r,
        Err(CheckoutError::OrderNotPending {
            status: OrderStatus::Completed,
            ..
        })
    )));

    let order = manager.get_order(&order_id, "user:seller").unwrap();
    assert_eq!(order.status, OrderStatus::Completed);
}

#[test]
fn test_verify_and_regenerate_never_both_succeed_with_old_code() {
    let manager = Arc::new(create_test_manager());
    let item_id = seed_item(&manager, "user:seller", "Desk lamp", Decimal::ONE, 1);
    let (order, code) = manager
        .create_order("user:buyer", &[line(&item_id, 1)])
        .unwrap();
    let order_id = order.id.unwrap();

    let (verify_result, regen_result) = std::thread::scope(|scope| {
        let verify = {
            let manager = manager.clone();
            let order_id = order_id.clone();
            let code = code.clone();
            scope.spawn(move || manager.verify_handoff(&order_id, "user:seller", &code))
        };
        let regen = {
            let manager = manager.clone();
            let order_id = order_id.clone();
            scope.spawn(move || manager.regenerate_code(&order_id, "user:buyer"))
        };
        (verify.join().unwrap(), regen.join().unwrap())
    });

    let order = manager.get_order(&order_id, "user:buyer").unwrap();
    match (&verify_result, &regen_result) {
        // Verification won the race: the order is complete and the
        // regeneration was rejected on the terminal state.
        (Ok(_), Err(CheckoutError::OrderNotPending { .. })) => {
            assert_eq!(order.status, OrderStatus::Completed);
        }
        // Regeneration won: the old code must no longer verify, but the
        // fresh one must.
        (Err(CheckoutError::InvalidHandoffCode), Ok(new_code)) => {
            assert_eq!(order.status, OrderStatus::Pending);
            assert!(matches!(
                manager.verify_handoff(&order_id, "user:seller", &code),
                Err(CheckoutError::InvalidHandoffCode)
            ));
            manager
                .verify_handoff(&order_id, "user:seller", new_code)
                .unwrap();
        }
        other => panic!("verify/regenerate race produced an inconsistent pair: {:?}", other),
    }
}
