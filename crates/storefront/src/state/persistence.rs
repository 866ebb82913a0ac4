//! Synchronization between the stores and the persisted key-value store.
//!
//! The cart is mirrored by an [`Observer`] after every mutating dispatch.
//! The session is only written on explicit login, so it exposes plain
//! helpers instead of an observer.

use digi_core::{LineItem, User};
use tracing::{error, warn};

use super::cart::CartWrite;
use super::{CartAction, CartReducer, CartState, Observer, SessionAction, SessionStore};
use crate::storage::{KeyValueStore, Storage, StorageError, keys, read_json, write_json};

/// Mirrors the cart into [`keys::CART`].
///
/// Writes synchronously while the cart's write lock is held, so every other
/// cart access waits for the store. The built-in stores write a small local
/// file at most; back it with something slower only behind a buffer.
pub struct CartPersistence {
    storage: Storage,
}

impl CartPersistence {
    #[must_use]
    pub const fn new(storage: Storage) -> Self {
        Self { storage }
    }
}

impl Observer<CartReducer> for CartPersistence {
    fn after_dispatch(&self, action: &CartAction, state: &CartState) {
        let result = match action.write() {
            CartWrite::Store => write_json(self.storage.as_ref(), keys::CART, state),
            CartWrite::Delete => self.storage.remove(keys::CART),
            CartWrite::Skip => return,
        };

        // The in-memory cart stays authoritative; a failed write only costs
        // the copy that would survive a restart.
        if let Err(e) = result {
            let event_id = sentry::capture_error(&e);
            error!(
                error = %e,
                sentry_event_id = %event_id,
                "Failed to persist cart"
            );
        }
    }
}

/// Persist the logged-in user.
///
/// # Errors
///
/// Returns an error if the store cannot be written.
pub fn save_user(storage: &dyn KeyValueStore, user: &User) -> Result<(), StorageError> {
    write_json(storage, keys::USER, user)
}

/// Delete the persisted user.
///
/// # Errors
///
/// Returns an error if the store cannot be written.
pub fn forget_user(storage: &dyn KeyValueStore) -> Result<(), StorageError> {
    storage.remove(keys::USER)
}

/// Read the persisted user.
///
/// A value that is present but does not decode to a [`User`] is reported
/// as an error; an absent key is `Ok(None)`.
///
/// # Errors
///
/// Returns an error if the store cannot be read or the value is corrupt.
pub fn load_user(storage: &dyn KeyValueStore) -> Result<Option<User>, StorageError> {
    read_json(storage, keys::USER)
}

/// Read the persisted cart.
///
/// # Errors
///
/// Returns an error if the store cannot be read or the value is corrupt.
pub fn load_cart(storage: &dyn KeyValueStore) -> Result<Option<Vec<LineItem>>, StorageError> {
    read_json(storage, keys::CART)
}

/// Restore the session from storage.
///
/// Dispatches `Login` with the persisted user, or with `None` when nothing
/// usable is stored. Running it again yields the same state as long as
/// storage has not changed in between.
pub fn bootstrap_session(session: &SessionStore, storage: &dyn KeyValueStore) {
    let user = load_user(storage).unwrap_or_else(|e| {
        warn!(error = %e, "Discarding unreadable persisted session");
        None
    });
    session.dispatch(SessionAction::Login(user));
}
