//! Cart and checkout commands.

use digi_core::{ProductId, SkuId};
use digi_storefront::services::CheckoutService;
use digi_storefront::{AppContext, Result};

use crate::CartCommand;
use crate::terminal::{cart_line, notify};

pub async fn run(ctx: &AppContext, command: CartCommand) -> Result<()> {
    let checkout = ctx.checkout();

    match command {
        CartCommand::List => {
            let items = checkout.items();
            if items.is_empty() {
                println!("Your cart is empty");
                return Ok(());
            }
            for item in &items {
                println!("{}", cart_line(item));
            }
            let summary = checkout.summary();
            println!(
                "{} item(s), {} unit(s), subtotal {}",
                summary.lines, summary.units, summary.subtotal
            );
        }
        CartCommand::Add {
            product_id,
            sku_id,
            quantity,
        } => {
            let product = ctx.catalog().product(&ProductId::new(product_id)).await?;
            let line = CheckoutService::line_for(&product, &SkuId::new(sku_id), quantity)?;
            let added = cart_line(&line);
            checkout.add(line)?;
            println!("Added {added}");
        }
        CartCommand::Update { sku_id, quantity } => {
            if !checkout.set_quantity(&SkuId::new(sku_id.as_str()), quantity)? {
                println!("{sku_id} is not in the cart");
            }
        }
        CartCommand::Remove { sku_id } => checkout.remove(&SkuId::new(sku_id)),
        CartCommand::Clear => checkout.clear(),
    }
    Ok(())
}

pub async fn checkout(ctx: &AppContext) -> Result<()> {
    let notice = ctx.checkout().checkout().await?;
    notify(&notice.message);
    println!("Complete your payment at {}", notice.value);
    Ok(())
}
