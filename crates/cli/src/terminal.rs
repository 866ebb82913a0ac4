//! Terminal side effects: navigation and output formatting.

use digi_core::{LineItem, Order};
use digi_storefront::api::types::Product;
use digi_storefront::navigation::Navigator;

/// Announces navigation instead of routing.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, path: &str) {
        println!("-> {path}");
    }
}

/// Print a success notification, skipping empty ones.
pub fn notify(message: &str) {
    if !message.is_empty() {
        println!("{message}");
    }
}

/// One-line product summary.
pub fn product_line(product: &Product) -> String {
    let price = product
        .starting_price()
        .map_or_else(String::new, |price| format!("  from {price}"));
    format!("{}  {}{price}", product.id, product.product_name)
}

/// One-line order summary.
pub fn order_line(order: &Order) -> String {
    format!(
        "{}  {}  {}  {}  {}",
        order.id,
        order.order_id,
        order.order_date.format("%Y-%m-%d %H:%M"),
        order.order_status.as_str().to_uppercase(),
        order.payment_info.payment_amount
    )
}

/// One-line cart summary.
pub fn cart_line(item: &LineItem) -> String {
    format!(
        "{}  {} x{}  {}",
        item.sku_id,
        item.product_ref.name,
        item.quantity,
        item.line_total()
    )
}
