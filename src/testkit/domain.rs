//! Builders for domain values used across tests.

use chrono::Utc;
use rust_decimal::Decimal;

use crate::domain::{
    NewProduct, OrderCreated, OrderCreatedItem, OrderId, OrderLine, Product, ProductId, UserId,
};

/// A creatable product in category `general`.
pub fn new_product(name: &str, price: Decimal, stock: u64) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        category: "general".to_string(),
        price,
        stock,
    }
}

/// A stored product with id `id`, timestamped now.
pub fn product(id: u64, name: &str, price: Decimal, stock: u64) -> Product {
    new_product(name, price, stock).into_product(ProductId::new(id), Utc::now())
}

/// Request line for `quantity` units of product `product_id`.
pub fn line(product_id: u64, quantity: i64) -> OrderLine {
    OrderLine {
        product_id: ProductId::new(product_id),
        quantity,
    }
}

/// Order-created event from `(product_id, quantity)` pairs.
pub fn order_created(order_id: u64, user_id: u64, items: &[(u64, u64)]) -> OrderCreated {
    OrderCreated {
        order_id: OrderId::new(order_id),
        user_id: UserId::new(user_id),
        items: items
            .iter()
            .map(|&(product_id, quantity)| OrderCreatedItem {
                product_id: ProductId::new(product_id),
                quantity,
            })
            .collect(),
    }
}
