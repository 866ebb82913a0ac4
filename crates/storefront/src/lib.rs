//! Digi Storefront client library.
//!
//! Everything a Digi front end needs besides rendering:
//!
//! - [`state`] - session and cart reducers, stores and persistence observers
//! - [`storage`] - the persisted key-value store (`_digi_user`, `_digi_cart`)
//! - [`api`] - REST client with CSRF bootstrap and the 401 interceptor
//! - [`recovery`] - logout-and-redirect sequence run on authorization failure
//! - [`services`] - auth, account, catalog and checkout flows
//! - [`context`] - the provider value wiring all of the above together

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod navigation;
pub mod recovery;
pub mod services;
pub mod state;
pub mod storage;

pub use context::AppContext;
pub use error::{AppError, Result};
