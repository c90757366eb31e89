//! Handlers for `stockflow order`.

use std::path::Path;

use tabled::Tabled;

use super::command::OrderCommand;
use super::{open, output, page_request};
use crate::domain::{Order, UserId};
use crate::error::Result;

#[derive(Tabled)]
struct OrderRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "User")]
    user: u64,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Items")]
    items: usize,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl From<&Order> for OrderRow {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.value(),
            user: order.user_id.value(),
            status: order.status.to_string(),
            items: order.items.len(),
            total: order.total_amount.to_string(),
            created: order.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "Product")]
    product: u64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Qty")]
    quantity: u64,
    #[tabled(rename = "Total")]
    total: String,
}

pub async fn execute(config_path: &Path, command: OrderCommand) -> Result<()> {
    let (_, services) = open(config_path)?;
    let orders = &services.orders;

    match command {
        OrderCommand::Create(args) => {
            let order = orders
                .create_order(UserId::new(args.user), &args.items)
                .await?;
            show(&order, &format!("Created order {}", order.id));
        }
        OrderCommand::Get(selector) => {
            let order = orders.get_order(&selector.filter()).await?;
            show(&order, "");
        }
        OrderCommand::List(args) => {
            let page = page_request(args.page)?;
            let found = orders.list_orders(&args.selector.filter(), page).await?;
            if !output::record("orders", &found) {
                output::table(found.items.iter().map(OrderRow::from));
                output::field(
                    "Showing",
                    format!(
                        "{} of {} (page {})",
                        found.items.len(),
                        found.total,
                        found.page
                    ),
                );
            }
        }
        OrderCommand::Update(args) => {
            let order = orders
                .update_order(&args.selector.filter(), args.status)
                .await?;
            show(&order, &format!("Order {} is now {}", order.id, order.status));
        }
        OrderCommand::Delete(selector) => {
            orders.delete_order(&selector.filter()).await?;
            if !output::record("deleted", &serde_json::json!({ "entity": "order" })) {
                output::success("Deleted order");
            }
        }
    }
    Ok(())
}

fn show(order: &Order, message: &str) {
    if output::record("order", order) {
        return;
    }
    if !message.is_empty() {
        output::success(message);
    }
    output::table([OrderRow::from(order)]);
    output::section("Items");
    output::table(order.items.iter().map(|item| ItemRow {
        product: item.product_id.value(),
        name: item.name.clone(),
        price: item.price.to_string(),
        quantity: item.quantity,
        total: item.total_price.to_string(),
    }));
}
