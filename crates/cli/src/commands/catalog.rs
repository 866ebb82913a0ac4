//! Order history and catalog commands.

use digi_core::{OrderId, ProductId};
use digi_storefront::api::types::ProductFilter;
use digi_storefront::{AppContext, Result};

use crate::terminal::{notify, order_line, product_line};
use crate::{OrdersAction, ProductsAction};

pub async fn orders(ctx: &AppContext, action: OrdersAction) -> Result<()> {
    match action {
        OrdersAction::List { status } => {
            let notice = ctx.account().orders(status).await?;
            if notice.value.is_empty() {
                println!("No orders found");
            }
            for order in &notice.value {
                println!("{}", order_line(order));
            }
        }
        OrdersAction::Show { id } => {
            let order = ctx.account().order(&OrderId::new(id)).await?.value;
            println!("{}", order_line(&order));
            for (key, value) in &order.details {
                println!("  {key}: {value}");
            }
        }
    }
    Ok(())
}

pub async fn products(ctx: &AppContext, action: ProductsAction) -> Result<()> {
    match action {
        ProductsAction::Home => {
            let dashboard = ctx.catalog().home().await?;

            println!("Latest Products");
            for product in &dashboard.latest_products {
                println!("  {}", product_line(product));
            }
            println!("Top Rated Products");
            for product in &dashboard.top_sold_products {
                println!("  {}", product_line(product));
            }
        }
        ProductsAction::Show { id } => {
            let product = ctx.catalog().product(&ProductId::new(id)).await?;

            println!("{}", product.product_name);
            if let Some(description) = &product.description {
                println!("{description}");
            }
            for sku in &product.sku_details {
                let validity = if sku.lifetime {
                    "lifetime".to_string()
                } else {
                    sku.validity
                        .map_or_else(String::new, |years| format!("{years} year(s)"))
                };
                println!("  {}  {}  {}  {validity}", sku.id, sku.sku_name, sku.price);
            }
        }
        ProductsAction::Search { query, limit } => {
            let filter = ProductFilter {
                search: Some(query),
                limit,
                ..ProductFilter::default()
            };
            let notice = ctx.catalog().search(&filter).await?;
            notify(&notice.message);
            for product in &notice.value {
                println!("{}", product_line(product));
            }
        }
    }
    Ok(())
}
