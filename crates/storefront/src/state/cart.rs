//! Cart reducer.

use serde::{Deserialize, Serialize};

use digi_core::{LineItem, Price, SkuId};

use super::{Action, Reducer};

/// Cart line items in display order.
pub type CartState = Vec<LineItem>;

/// Cart transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CartAction {
    /// Append a line at the end.
    AddToCart(LineItem),
    /// Drop the line with this SKU.
    RemoveFromCart {
        #[serde(rename = "skuId")]
        sku_id: SkuId,
    },
    /// Replace the first line with the same SKU, keeping its position.
    UpdateCart(LineItem),
    /// Replace the whole cart. Used to hydrate from storage.
    GetCartItems(Vec<LineItem>),
    /// Empty the cart.
    ClearCart,
}

/// What the persisted cart entry should do after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartWrite {
    /// Mirror the new state.
    Store,
    /// Delete the entry.
    Delete,
    /// Leave storage untouched.
    Skip,
}

impl CartAction {
    /// Persistence effect of this action.
    #[must_use]
    pub const fn write(&self) -> CartWrite {
        match self {
            Self::AddToCart(_) | Self::RemoveFromCart { .. } | Self::UpdateCart(_) => {
                CartWrite::Store
            }
            Self::ClearCart => CartWrite::Delete,
            Self::GetCartItems(_) => CartWrite::Skip,
        }
    }
}

impl Action for CartAction {
    fn kind(&self) -> &'static str {
        match self {
            Self::AddToCart(_) => "ADD_TO_CART",
            Self::RemoveFromCart { .. } => "REMOVE_FROM_CART",
            Self::UpdateCart(_) => "UPDATE_CART",
            Self::GetCartItems(_) => "GET_CART_ITEMS",
            Self::ClearCart => "CLEAR_CART",
        }
    }

    fn detail(&self) -> Option<Vec<(&'static str, String)>> {
        match self {
            Self::AddToCart(item) | Self::UpdateCart(item) => Some(vec![
                ("sku_id", item.sku_id.to_string()),
                ("quantity", item.quantity.to_string()),
            ]),
            Self::RemoveFromCart { sku_id } => Some(vec![("sku_id", sku_id.to_string())]),
            Self::GetCartItems(items) => Some(vec![("lines", items.len().to_string())]),
            Self::ClearCart => None,
        }
    }
}

/// Reducer for [`CartState`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CartReducer;

impl Reducer for CartReducer {
    type State = CartState;
    type Action = CartAction;

    fn reduce(state: &CartState, action: &CartAction) -> CartState {
        match action {
            CartAction::AddToCart(item) => {
                let mut next = state.clone();
                next.push(item.clone());
                next
            }
            CartAction::RemoveFromCart { sku_id } => state
                .iter()
                .filter(|item| &item.sku_id != sku_id)
                .cloned()
                .collect(),
            CartAction::UpdateCart(update) => {
                let mut next = state.clone();
                if let Some(slot) = next.iter_mut().find(|item| item.sku_id == update.sku_id) {
                    *slot = update.clone();
                }
                next
            }
            CartAction::GetCartItems(items) => items.clone(),
            CartAction::ClearCart => Vec::new(),
        }
    }
}

/// Sum of all line totals.
#[must_use]
pub fn subtotal(items: &[LineItem]) -> Price {
    items.iter().map(LineItem::line_total).sum()
}

/// Total number of units across all lines, saturating at `u32::MAX`.
#[must_use]
pub fn unit_count(items: &[LineItem]) -> u32 {
    items
        .iter()
        .fold(0u32, |units, item| units.saturating_add(item.quantity))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use digi_core::{ProductId, ProductRef};
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::state::CartStore;

    fn item(sku: &str, quantity: u32) -> LineItem {
        LineItem {
            sku_id: SkuId::new(sku),
            quantity,
            price: Price::from_paise(10_000),
            product_ref: ProductRef {
                id: ProductId::new(format!("product-{sku}")),
                name: format!("Product {sku}"),
                image: None,
            },
        }
    }

    #[test]
    fn test_add_then_update_keeps_length() {
        let cart = CartReducer::reduce(&Vec::new(), &CartAction::AddToCart(item("sku1", 1)));
        let cart = CartReducer::reduce(&cart, &CartAction::AddToCart(item("sku2", 1)));
        let cart = CartReducer::reduce(&cart, &CartAction::UpdateCart(item("sku1", 5)));

        assert_eq!(cart.len(), 2);
        assert_eq!(cart[0], item("sku1", 5));
        assert_eq!(cart[1], item("sku2", 1));
    }

    #[test]
    fn test_update_of_unknown_sku_is_a_no_op() {
        let cart = vec![item("sku1", 1)];
        let next = CartReducer::reduce(&cart, &CartAction::UpdateCart(item("sku9", 3)));
        assert_eq!(next, cart);
    }

    #[test]
    fn test_remove_excludes_matching_sku() {
        let cart = vec![item("sku1", 1), item("sku2", 2), item("sku3", 3)];
        let next = CartReducer::reduce(
            &cart,
            &CartAction::RemoveFromCart {
                sku_id: SkuId::new("sku2"),
            },
        );
        assert_eq!(next, vec![item("sku1", 1), item("sku3", 3)]);
    }

    #[test]
    fn test_get_cart_items_replaces_state() {
        let payload = vec![item("a", 1), item("b", 2)];
        let next = CartReducer::reduce(
            &vec![item("old", 1)],
            &CartAction::GetCartItems(payload.clone()),
        );
        assert_eq!(next, payload);
    }

    #[test]
    fn test_clear_cart() {
        let next = CartReducer::reduce(&vec![item("a", 1)], &CartAction::ClearCart);
        assert!(next.is_empty());
    }

    #[test]
    fn test_write_effects() {
        assert_eq!(CartAction::AddToCart(item("a", 1)).write(), CartWrite::Store);
        assert_eq!(CartAction::ClearCart.write(), CartWrite::Delete);
        assert_eq!(CartAction::GetCartItems(vec![]).write(), CartWrite::Skip);
    }

    #[test]
    fn test_totals() {
        let cart = vec![item("a", 1), item("b", 2)];
        assert_eq!(subtotal(&cart), Price::from_paise(30_000));
        assert_eq!(unit_count(&cart), 3);
    }

    #[test]
    fn test_unit_count_saturates() {
        let cart = vec![item("a", u32::MAX), item("b", 1), item("c", u32::MAX)];
        assert_eq!(unit_count(&cart), u32::MAX);
    }

    #[test]
    fn test_breadcrumb_detail() {
        let detail = CartAction::AddToCart(item("sku1", 2)).detail().unwrap();
        assert_eq!(
            detail,
            vec![("sku_id", "sku1".to_string()), ("quantity", "2".to_string())]
        );
        assert!(CartAction::ClearCart.detail().is_none());
    }

    #[test]
    fn test_decodes_remove_payload() {
        let store = CartStore::new(vec![item("sku1", 1), item("sku2", 1)]);
        assert!(store.dispatch_json(json!({
            "type": "REMOVE_FROM_CART",
            "payload": {"skuId": "sku1"}
        })));
        assert_eq!(store.state(), vec![item("sku2", 1)]);

        assert!(!store.dispatch_json(json!({"type": "APPLY_COUPON", "payload": "SAVE10"})));
        assert_eq!(store.state().len(), 1);
    }

    proptest! {
        #[test]
        fn prop_distinct_adds_preserve_order(skus in prop::collection::hash_set("[a-z0-9]{1,8}", 0..20)) {
            let skus: Vec<String> = skus.into_iter().collect();
            let mut cart = CartState::new();
            for sku in &skus {
                cart = CartReducer::reduce(&cart, &CartAction::AddToCart(item(sku, 1)));
            }

            prop_assert_eq!(cart.len(), skus.len());
            let order: Vec<&str> = cart.iter().map(|line| line.sku_id.as_str()).collect();
            let expected: Vec<&str> = skus.iter().map(String::as_str).collect();
            prop_assert_eq!(order, expected);
        }

        #[test]
        fn prop_remove_leaves_no_matching_line(
            skus in prop::collection::vec("[a-c]", 0..12),
            target in "[a-c]",
        ) {
            let cart: CartState = skus.iter().map(|sku| item(sku, 1)).collect();
            let next = CartReducer::reduce(
                &cart,
                &CartAction::RemoveFromCart { sku_id: SkuId::new(target.clone()) },
            );

            prop_assert!(next.iter().all(|line| line.sku_id.as_str() != target));
            prop_assert_eq!(
                next.len(),
                cart.iter().filter(|line| line.sku_id.as_str() != target).count()
            );
        }
    }
}
