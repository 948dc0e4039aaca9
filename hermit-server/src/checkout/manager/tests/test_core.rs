use super::*;

#[test]
fn test_create_order_computes_amount_and_decrements_stock() {
    let manager = create_test_manager();
    let item_id = seed_item(&manager, "user:seller", "Desk lamp", Decimal::from(10), 5);

    let (order, code) = manager
        .create_order("user:buyer", &[line(&item_id, 3)])
        .unwrap();

    assert_eq!(order.amount, Decimal::from(30));
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.buyer, "user:buyer");
    assert_eq!(order.seller, "user:seller");
    assert_eq!(order.lines.len(), 1);
    assert_eq!(order.lines[0].quantity, 3);
    assert_eq!(order.lines[0].price, Decimal::from(10));
    assert!(!code.is_empty());
    assert_eq!(stock_of(&manager, &item_id), 2);
}

#[test]
fn test_create_order_insufficient_stock_preserves_state() {
    let manager = create_test_manager();
    let item_id = seed_item(&manager, "user:seller", "Desk lamp", Decimal::from(10), 5);

    manager
        .create_order("user:buyer", &[line(&item_id, 3)])
        .unwrap();
    assert_eq!(stock_of(&manager, &item_id), 2);

    let err = manager
        .create_order("user:buyer", &[line(&item_id, 6)])
        .unwrap_err();
    assert!(matches!(
        err,
        CheckoutError::InsufficientStock {
            requested: 6,
            available: 2,
            ..
        }
    ));

    // Stock untouched, no second order persisted
    assert_eq!(stock_of(&manager, &item_id), 2);
    let orders = manager
        .list_orders("user:buyer", OrderRole::Buyer)
        .unwrap();
    assert_eq!(orders.len(), 1);
}

#[test]
fn test_create_order_rejects_empty_lines() {
    let manager = create_test_manager();
    assert!(matches!(
        manager.create_order("user:buyer", &[]),
        Err(CheckoutError::EmptyOrder)
    ));
}

#[test]
fn test_create_order_rejects_zero_quantity() {
    let manager = create_test_manager();
    let item_id = seed_item(&manager, "user:seller", "Desk lamp", Decimal::ONE, 5);

    assert!(matches!(
        manager.create_order("user:buyer", &[line(&item_id, 0)]),
        Err(CheckoutError::InvalidQuantity(_))
    ));
    assert_eq!(stock_of(&manager, &item_id), 5);
}

#[test]
fn test_create_order_rejects_unknown_item() {
    let manager = create_test_manager();
    assert!(matches!(
        manager.create_order("user:buyer", &[line("item:missing", 1)]),
        Err(CheckoutError::ItemNotFound(_))
    ));
}

#[test]
fn test_create_order_merges_duplicate_lines() {
    let manager = create_test_manager();
    let item_id = seed_item(&manager, "user:seller", "Notebook", Decimal::from(2), 10);

    let (order, _) = manager
        .create_order("user:buyer", &[line(&item_id, 1), line(&item_id, 2)])
        .unwrap();

    assert_eq!(order.lines.len(), 1);
    assert_eq!(order.lines[0].quantity, 3);
    assert_eq!(order.amount, Decimal::from(6));
    assert_eq!(stock_of(&manager, &item_id), 7);
}

#[test]
fn test_create_order_rejects_own_listing() {
    let manager = create_test_manager();
    let item_id = seed_item(&manager, "user:seller", "Desk lamp", Decimal::ONE, 5);

    assert!(matches!(
        manager.create_order("user:seller", &[line(&item_id, 1)]),
        Err(CheckoutError::SelfPurchase(_))
    ));
    assert_eq!(stock_of(&manager, &item_id), 5);
}

#[test]
fn test_create_order_rejects_multiple_sellers() {
    let manager = create_test_manager();
    let first = seed_item(&manager, "user:alice", "Desk lamp", Decimal::ONE, 5);
    let second = seed_item(&manager, "user:bob", "Kettle", Decimal::ONE, 5);

    let err = manager
        .create_order("user:buyer", &[line(&first, 1), line(&second, 1)])
        .unwrap_err();
    assert!(matches!(err, CheckoutError::MultipleSellers { .. }));

    // Nothing was reserved
    assert_eq!(stock_of(&manager, &first), 5);
    assert_eq!(stock_of(&manager, &second), 5);
}

#[test]
fn test_multi_line_failure_rolls_back_all_reservations() {
    let manager = create_test_manager();
    let plenty = seed_item(&manager, "user:seller", "Desk lamp", Decimal::ONE, 5);
    let scarce = seed_item(&manager, "user:seller", "Kettle", Decimal::ONE, 1);

    let err = manager
        .create_order("user:buyer", &[line(&plenty, 2), line(&scarce, 3)])
        .unwrap_err();
    assert!(matches!(err, CheckoutError::InsufficientStock { .. }));

    // The first line's reservation must not survive the failed commit
    assert_eq!(stock_of(&manager, &plenty), 5);
    assert_eq!(stock_of(&manager, &scarce), 1);
    assert!(manager
        .list_orders("user:buyer", OrderRole::Buyer)
        .unwrap()
        .is_empty());
}

#[test]
fn test_checkout_cart_consumes_and_clears_cart() {
    let manager = create_test_manager();
    let lamp = seed_item(&manager, "user:seller", "Desk lamp", Decimal::from(10), 5);
    let kettle = seed_item(&manager, "user:seller", "Kettle", Decimal::from(4), 3);

    manager.cart().add("user:buyer", &lamp, 2).unwrap();
    manager.cart().add("user:buyer", &kettle, 1).unwrap();

    let (order, _) = manager.checkout_cart("user:buyer").unwrap();

    assert_eq!(order.lines.len(), 2);
    assert_eq!(order.amount, Decimal::from(24));
    assert_eq!(stock_of(&manager, &lamp), 3);
    assert_eq!(stock_of(&manager, &kettle), 2);
    assert!(manager.cart().entries("user:buyer").unwrap().is_empty());
}

#[test]
fn test_checkout_empty_cart_rejected() {
    let manager = create_test_manager();
    assert!(matches!(
        manager.checkout_cart("user:buyer"),
        Err(CheckoutError::EmptyOrder)
    ));
}

#[test]
fn test_failed_checkout_leaves_cart_intact() {
    let manager = create_test_manager();
    let lamp = seed_item(&manager, "user:seller", "Desk lamp", Decimal::ONE, 5);

    manager.cart().add("user:buyer", &lamp, 4).unwrap();
    // Another buyer takes most of the stock directly
    manager
        .create_order("user:other", &[line(&lamp, 3)])
        .unwrap();

    assert!(matches!(
        manager.checkout_cart("user:buyer"),
        Err(CheckoutError::InsufficientStock { .. })
    ));
    // Cart survives for the buyer to adjust
    assert_eq!(manager.cart().entries("user:buyer").unwrap().len(), 1);
}

#[test]
fn test_amount_invariant_over_random_carts() {
    use rand::Rng;

    let manager = create_test_manager();
    let mut rng = rand::thread_rng();

    let mut items = Vec::new();
    for i in 0..6 {
        let price = Decimal::new(rng.gen_range(50..5000), 2);
        let id = seed_item(&manager, "user:seller", &format!("Item {}", i), price, 100);
        items.push((id, price));
    }

    for _ in 0..10 {
        let count = rng.gen_range(1..=items.len());
        let mut lines = Vec::new();
        let mut expected = Decimal::ZERO;
        for (id, price) in items.iter().take(count) {
            let quantity = rng.gen_range(1..=3u32);
            expected += *price * Decimal::from(quantity);
            lines.push(line(id, quantity));
        }
        let (order, _) = manager.create_order("user:buyer", &lines).unwrap();
        assert_eq!(order.amount, expected);
    }
}

#[test]
fn test_list_orders_filters_by_role_and_resolves_names() {
    let manager = create_test_manager();
    seed_user(&manager, "user:alice", "Alice", "Ngo");
    seed_user(&manager, "user:bob", "Bob", "Iyer");
    let item_id = seed_item(&manager, "user:alice", "Desk lamp", Decimal::ONE, 10);

    manager
        .create_order("user:bob", &[line(&item_id, 1)])
        .unwrap();
    manager
        .create_order("user:carol", &[line(&item_id, 2)])
        .unwrap();

    let bought = manager.list_orders("user:bob", OrderRole::Buyer).unwrap();
    assert_eq!(bought.len(), 1);
    assert_eq!(bought[0].buyer.first_name, "Bob");
    assert_eq!(bought[0].seller.first_name, "Alice");

    let sold = manager.list_orders("user:alice", OrderRole::Seller).unwrap();
    assert_eq!(sold.len(), 2);
    // user:carol has no display record; listing degrades to id-only
    let carol_order = sold.iter().find(|o| o.buyer.id == "user:carol").unwrap();
    assert!(carol_order.buyer.first_name.is_empty());

    assert!(manager
        .list_orders("user:bob", OrderRole::Seller)
        .unwrap()
        .is_empty());
}

#[test]
fn test_list_orders_newest_first() {
    let manager = create_test_manager();
    let item_id = seed_item(&manager, "user:seller", "Desk lamp", Decimal::ONE, 10);

    let (first, _) = manager
        .create_order("user:buyer", &[line(&item_id, 1)])
        .unwrap();
    std::thread::sleep(std::time::Duration::from_millis(5));
    let (second, _) = manager
        .create_order("user:buyer", &[line(&item_id, 1)])
        .unwrap();

    let orders = manager.list_orders("user:buyer", OrderRole::Buyer).unwrap();
    assert_eq!(orders[0].id, second.id.unwrap());
    assert_eq!(orders[1].id, first.id.unwrap());
}

#[test]
fn test_get_order_limited_to_parties() {
    let manager = create_test_manager();
    let item_id = seed_item(&manager, "user:seller", "Desk lamp", Decimal::ONE, 5);
    let (order, _) = manager
        .create_order("user:buyer", &[line(&item_id, 1)])
        .unwrap();
    let order_id = order.id.unwrap();

    assert!(manager.get_order(&order_id, "user:buyer").is_ok());
    assert!(manager.get_order(&order_id, "user:seller").is_ok());
    assert!(matches!(
        manager.get_order(&order_id, "user:snoop"),
        Err(CheckoutError::NotOrderParty(_))
    ));
    assert!(matches!(
        manager.get_order("order:missing", "user:buyer"),
        Err(CheckoutError::OrderNotFound(_))
    ));
}

#[test]
fn test_transaction_ids_are_unique_across_orders() {
    let manager = create_test_manager();
    let item_id = seed_item(&manager, "user:seller", "Notebook", Decimal::ONE, 50);

    let mut seen = std::collections::HashSet::new();
    for _ in 0..5 {
        let (order, _) = manager
            .create_order("user:buyer", &[line(&item_id, 1)])
            .unwrap();
        assert!(seen.insert(order.transaction_id));
    }
}

#[test]
fn test_create_item_rejects_negative_price() {
    let manager = create_test_manager();
    let err = manager
        .create_item(
            "user:seller",
            ItemCreate {
                name: "Bad listing".to_string(),
                description: "negative price".to_string(),
                category: "misc".to_string(),
                price: Decimal::from(-1),
                stock: 1,
            },
        )
        .unwrap_err();
    assert!(matches!(err, CheckoutError::InvalidPrice(_)));
}
