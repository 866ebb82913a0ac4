//! Digi Core - Shared domain types.
//!
//! This crate provides the types shared by every Digi component:
//! - `storefront` - Client library (state container, API client, services)
//! - `cli` - Terminal front end
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no persistence, no HTTP
//! clients. This keeps it lightweight and usable from any front end.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, prices, roles, users, cart line items
//!   and orders

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
