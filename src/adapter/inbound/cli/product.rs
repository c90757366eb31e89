//! Handlers for `stockflow product`.

use std::path::Path;

use tabled::Tabled;

use super::command::{ProductAddArgs, ProductCommand, ProductListArgs, ProductUpdateArgs};
use super::{open, output, page_request};
use crate::domain::{NewProduct, Product, ProductFilter, ProductId, ProductUpdate};
use crate::error::Result;

#[derive(Tabled)]
struct ProductRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Stock")]
    stock: u64,
}

impl From<&Product> for ProductRow {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.value(),
            name: product.name.clone(),
            category: product.category.clone(),
            price: product.price.to_string(),
            stock: product.stock,
        }
    }
}

pub async fn execute(config_path: &Path, command: ProductCommand) -> Result<()> {
    let (_, services) = open(config_path)?;
    let catalog = &services.catalog;

    match command {
        ProductCommand::Add(args) => {
            let product = catalog.create_product(new_product(args)).await?;
            show(&product, &format!("Created product {}", product.id));
        }
        ProductCommand::Get(arg) => {
            let product = catalog.get_product(arg.id()).await?;
            show(&product, "");
        }
        ProductCommand::List(args) => {
            let page = page_request(args.page)?;
            let filter = list_filter(&args);
            let products = catalog.list_products(&filter, page).await?;
            if !output::record("products", &products) {
                output::table(products.items.iter().map(ProductRow::from));
                output::field(
                    "Showing",
                    format!(
                        "{} of {} (page {})",
                        products.items.len(),
                        products.total,
                        products.page
                    ),
                );
            }
        }
        ProductCommand::Update(args) => {
            let id = ProductId::new(args.id);
            let product = catalog.update_product(id, product_update(args)).await?;
            show(&product, &format!("Updated product {}", product.id));
        }
        ProductCommand::Delete(arg) => {
            let product = catalog.delete_product(arg.id()).await?;
            show(&product, &format!("Deleted product {}", product.id));
        }
    }
    Ok(())
}

fn show(product: &Product, message: &str) {
    if output::record("product", product) {
        return;
    }
    if !message.is_empty() {
        output::success(message);
    }
    output::table([ProductRow::from(product)]);
}

fn new_product(args: ProductAddArgs) -> NewProduct {
    NewProduct {
        name: args.name,
        category: args.category,
        price: args.price,
        stock: args.stock,
    }
}

fn list_filter(args: &ProductListArgs) -> ProductFilter {
    ProductFilter {
        id: None,
        name: args.name.clone(),
        category: args.category.clone(),
    }
}

fn product_update(args: ProductUpdateArgs) -> ProductUpdate {
    ProductUpdate {
        name: args.name,
        category: args.category,
        price: args.price,
        stock: args.stock,
        updated_at: None,
    }
}
