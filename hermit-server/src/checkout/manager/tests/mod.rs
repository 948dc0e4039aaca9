use super::*;
use rust_decimal::Decimal;
use shared::models::{ItemCreate, User};

mod test_concurrency;
mod test_core;

fn create_test_manager() -> CheckoutManager {
    let storage = CheckoutStorage::open_in_memory().unwrap();
    CheckoutManager::with_storage(storage)
}

fn seed_item(
    manager: &CheckoutManager,
    seller: &str,
    name: &str,
    price: Decimal,
    stock: u32,
) -> String {
    let item = manager
        .create_item(
            seller,
            ItemCreate {
                name: name.to_string(),
                description: format!("{} in good condition", name),
                category: "misc".to_string(),
                price,
                stock,
            },
        )
        .unwrap();
    item.id.unwrap()
}

fn seed_user(manager: &CheckoutManager, id: &str, first_name: &str, last_name: &str) {
    manager
        .upsert_user(User {
            id: Some(id.to_string()),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: format!("{}@campus.test", first_name.to_lowercase()),
            contact_number: "5550100".to_string(),
            created_at: shared::util::now_millis(),
        })
        .unwrap();
}

fn line(item_id: &str, quantity: u32) -> OrderLineInput {
    OrderLineInput {
        item_id: item_id.to_string(),
        quantity,
    }
}

fn stock_of(manager: &CheckoutManager, item_id: &str) -> u32 {
    manager.get_item(item_id).unwrap().stock
}
