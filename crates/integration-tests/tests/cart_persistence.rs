//! Cart mirroring into a file-backed store and hydration on the next start.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use digi_core::SkuId;
use digi_integration_tests::{TestContext, line};
use digi_storefront::state::persistence::load_cart;
use digi_storefront::storage::{FileStore, KeyValueStore, keys};
use tempfile::TempDir;

fn file_store(dir: &TempDir) -> Arc<FileStore> {
    Arc::new(FileStore::open(dir.path()).unwrap())
}

#[tokio::test]
async fn concurrent_adds_are_all_persisted() {
    let dir = TempDir::new().unwrap();
    let t = TestContext::with_storage(file_store(&dir)).await;

    std::thread::scope(|scope| {
        for sku in ["sku1", "sku2"] {
            let checkout = t.ctx.checkout();
            scope.spawn(move || checkout.add(line(sku)).unwrap());
        }
    });

    let mut persisted: Vec<String> = load_cart(t.storage.as_ref())
        .unwrap()
        .unwrap()
        .into_iter()
        .map(|item| item.sku_id.to_string())
        .collect();
    persisted.sort();
    assert_eq!(persisted, vec!["sku1", "sku2"]);

    // A fresh process over the same directory sees both lines
    let restarted = TestContext::with_storage(file_store(&dir)).await;
    assert_eq!(restarted.ctx.restore_cart(), 2);
    assert_eq!(restarted.ctx.checkout().summary().units, 2);
}

#[tokio::test]
async fn restore_does_not_rewrite_storage() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir);
    let raw = serde_json::to_string_pretty(&vec![line("sku1")]).unwrap();
    store.set(keys::CART, &raw).unwrap();

    let t = TestContext::with_storage(store).await;
    assert_eq!(t.ctx.restore_cart(), 1);

    assert_eq!(t.ctx.checkout().items(), vec![line("sku1")]);
    assert_eq!(t.storage.get(keys::CART).unwrap(), Some(raw));
}

#[tokio::test]
async fn unreadable_cart_restores_empty() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir);
    store.set(keys::CART, "not json").unwrap();

    let t = TestContext::with_storage(store).await;

    assert_eq!(t.ctx.restore_cart(), 0);
    assert!(t.ctx.checkout().items().is_empty());
}

#[tokio::test]
async fn quantity_changes_and_clear_reach_disk() {
    let dir = TempDir::new().unwrap();
    let t = TestContext::with_storage(file_store(&dir)).await;
    let checkout = t.ctx.checkout();

    checkout.add(line("sku1")).unwrap();
    checkout.add(line("sku1")).unwrap();
    assert!(checkout.set_quantity(&SkuId::new("sku1"), 5).unwrap());

    let restarted = TestContext::with_storage(file_store(&dir)).await;
    restarted.ctx.restore_cart();
    let items = restarted.ctx.checkout().items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 5);

    checkout.clear();
    assert!(!dir.path().join(format!("{}.json", keys::CART)).exists());
}
